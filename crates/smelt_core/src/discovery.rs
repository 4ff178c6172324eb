//! Turning entries of the addons directory into loaded addons.
//!
//! Each immediate subdirectory of the addons directory is a candidate whose
//! directory name is the addon name. Loaders are asked in order; the first
//! that recognizes the candidate wins.

use crate::addon::Addon;
use crate::error::AddonError;
use crate::manifest::AddonManifest;
use crate::system::System;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// File name of a declarative addon manifest.
pub const MANIFEST_FILE: &str = "addon.toml";

/// Loads the addon stored in one candidate directory.
pub trait AddonLoader: Send + Sync {
    /// Returns `Ok(None)` if this loader does not recognize the candidate,
    /// and an error if it does but the addon is malformed.
    fn load(
        &self,
        system: &dyn System,
        name: &str,
        dir: &Path,
    ) -> Result<Option<Arc<dyn Addon>>, AddonError>;
}

/// Addons compiled into the host, published under a name.
///
/// A registered addon is only discovered when the addons directory holds a
/// `<name>/` directory with an `addon.*` entry file, the same layout
/// scripted addons use, so the directory stays the single source of truth
/// for which addons exist.
#[derive(Default)]
pub struct StaticLoader {
    addons: HashMap<String, Arc<dyn Addon>>,
}

impl StaticLoader {
    /// Creates a loader with no addons.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes `addon` under `name`.
    pub fn with_addon(mut self, name: impl Into<String>, addon: impl Addon + 'static) -> Self {
        self.addons.insert(name.into(), Arc::new(addon));
        self
    }
}

impl AddonLoader for StaticLoader {
    fn load(
        &self,
        system: &dyn System,
        name: &str,
        dir: &Path,
    ) -> Result<Option<Arc<dyn Addon>>, AddonError> {
        let Some(addon) = self.addons.get(name) else {
            return Ok(None);
        };
        let has_entry = system.read_directory(dir)?.iter().any(|entry| {
            !entry.is_dir && Path::new(&entry.name).file_stem().is_some_and(|stem| stem == "addon")
        });
        Ok(has_entry.then(|| Arc::clone(addon)))
    }
}

/// Loads declarative addons from `<name>/addon.toml`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ManifestLoader;

impl AddonLoader for ManifestLoader {
    fn load(
        &self,
        system: &dyn System,
        _name: &str,
        dir: &Path,
    ) -> Result<Option<Arc<dyn Addon>>, AddonError> {
        let manifest_path = dir.join(MANIFEST_FILE);
        if !system.file_exists(&manifest_path) {
            return Ok(None);
        }
        let manifest = AddonManifest::parse(&system.read_file(&manifest_path)?)?;
        Ok(Some(Arc::new(manifest)))
    }
}
