//! The addon registry: which addons exist and which apply to a target.

use crate::addon::AddonDescriptor;
use crate::discovery::{AddonLoader, ManifestLoader};
use crate::system::System;
use smelt_common::join_names;
use smelt_config::{target_config, CompilationConfig};
use smelt_diagnostics::{Diagnostic, DiagnosticCode, Reporter};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Available addons, the requested addon names, and per-target lookups.
///
/// `available` is filled by [`discover`](Self::discover) and
/// [`register`](Self::register) before the registry is shared;
/// [`get_addons`](Self::get_addons) only reads it.
pub struct AddonRegistry {
    system: Arc<dyn System>,
    reporter: Arc<dyn Reporter>,
    config: Option<CompilationConfig>,
    requested: Vec<String>,
    addons_dir: Option<PathBuf>,
    available: HashMap<String, AddonDescriptor>,
    loaders: Vec<Box<dyn AddonLoader>>,
    reported: Mutex<HashSet<String>>,
}

impl AddonRegistry {
    /// Creates an empty registry.
    pub fn new(system: Arc<dyn System>, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            system,
            reporter,
            config: None,
            requested: Vec::new(),
            addons_dir: None,
            available: HashMap::new(),
            loaders: Vec::new(),
            reported: Mutex::new(HashSet::new()),
        }
    }

    /// Adds a loader consulted before the built-in manifest loader.
    pub fn with_loader(mut self, loader: impl AddonLoader + 'static) -> Self {
        self.loaders.push(Box::new(loader));
        self
    }

    /// Adds boxed loaders, in order.
    pub fn with_loaders(mut self, loaders: impl IntoIterator<Item = Box<dyn AddonLoader>>) -> Self {
        self.loaders.extend(loaders);
        self
    }

    /// Sets the globally requested addon names, keeping the first occurrence
    /// of duplicates.
    pub fn with_requested<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        let mut seen = HashSet::new();
        self.requested = names
            .into_iter()
            .map(Into::into)
            .filter(|name| seen.insert(name.clone()))
            .collect();
        self
    }

    /// Sets the configuration per-target addon lists are read from.
    pub fn with_config(mut self, config: Option<CompilationConfig>) -> Self {
        self.config = config;
        self
    }

    /// Makes `descriptor` available, replacing any addon with the same name.
    pub fn register(&mut self, descriptor: AddonDescriptor) {
        tracing::debug!(addon = descriptor.name(), "addon registered");
        self.available.insert(descriptor.name().to_string(), descriptor);
    }

    /// Scans the immediate subdirectories of `dir` for addons.
    ///
    /// A relative `dir` is resolved against the system's working directory;
    /// diagnostics name it as given.
    ///
    /// Each subdirectory name is a candidate addon name, offered to the
    /// registered loaders and then to [`ManifestLoader`]. The first loader
    /// that recognizes it wins. A candidate that a loader recognizes but
    /// cannot load is skipped with a warning; it never aborts discovery.
    pub fn discover(&mut self, dir: &Path) {
        let resolved = self.system.resolve_path(dir);
        self.addons_dir = Some(resolved.clone());
        if !self.system.directory_exists(&resolved) {
            self.report(Diagnostic::warning(
                DiagnosticCode::MISSING_ADDONS_DIR,
                format!("Addons directory \"{}\" does not exist.", dir.display()),
            ));
            return;
        }

        let entries = match self.system.read_directory(&resolved) {
            Ok(entries) => entries,
            Err(err) => {
                self.report(Diagnostic::warning(
                    DiagnosticCode::MISSING_ADDONS_DIR,
                    format!("Addons directory \"{}\" could not be read: {err}", dir.display()),
                ));
                return;
            }
        };

        for entry in entries.into_iter().filter(|entry| entry.is_dir) {
            match self.load_candidate(&entry.name, &entry.path) {
                Ok(Some(descriptor)) => self.register(descriptor),
                Ok(None) => tracing::debug!(candidate = %entry.name, "not an addon, skipped"),
                Err(reason) => self.report(Diagnostic::warning(
                    DiagnosticCode::ADDON_LOAD_FAILED,
                    format!("Addon \"{}\" could not be loaded: {reason}", entry.name),
                )),
            }
        }
        tracing::debug!(dir = %resolved.display(), count = self.available.len(), "addon discovery finished");
    }

    fn load_candidate(
        &self,
        name: &str,
        dir: &Path,
    ) -> Result<Option<AddonDescriptor>, crate::error::AddonError> {
        let system = self.system.as_ref();
        for loader in &self.loaders {
            if let Some(addon) = loader.load(system, name, dir)? {
                return Ok(Some(AddonDescriptor::from_arc(name, addon)));
            }
        }
        Ok(ManifestLoader
            .load(system, name, dir)?
            .map(|addon| AddonDescriptor::from_arc(name, addon)))
    }

    /// Returns the addons that apply to `target`, in request order.
    ///
    /// The globally requested addons come first, followed by the target's own
    /// `addons` not already included. Requested names that are not available
    /// are left out and reported once per distinct message.
    pub fn get_addons(&self, target: Option<&str>) -> Vec<AddonDescriptor> {
        let mut result: Vec<AddonDescriptor> = Vec::new();

        let missing = self.collect(&self.requested, &mut result);
        if !missing.is_empty() {
            self.report_once(Diagnostic::warning(
                DiagnosticCode::MISSING_ADDONS,
                format!("Missing addons: \"{}\".", join_names(&missing)),
            ));
        }

        if let Some(target) = target {
            let target_addons = target_config(self.config.as_ref(), target).addons;
            let missing = self.collect(&target_addons, &mut result);
            if !missing.is_empty() {
                self.report_once(Diagnostic::warning(
                    DiagnosticCode::MISSING_TARGET_ADDONS,
                    format!(
                        "Missing addons for target \"{target}\": \"{}\".",
                        join_names(&missing)
                    ),
                ));
            }
        }

        result
    }

    /// Appends the available addons among `names` to `result` and returns
    /// the unavailable names in order.
    fn collect(&self, names: &[String], result: &mut Vec<AddonDescriptor>) -> Vec<String> {
        let mut missing = Vec::new();
        for name in names {
            match self.available.get(name) {
                Some(descriptor) => {
                    if !result.iter().any(|d| d.name() == name) {
                        result.push(descriptor.clone());
                    }
                }
                None => {
                    if !missing.contains(name) {
                        missing.push(name.clone());
                    }
                }
            }
        }
        missing
    }

    /// Names of all available addons, sorted.
    pub fn available_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.available.keys().cloned().collect();
        names.sort();
        names
    }

    /// The globally requested addon names.
    pub fn requested(&self) -> &[String] {
        &self.requested
    }

    /// The resolved directory last scanned by [`discover`](Self::discover).
    pub fn addons_dir(&self) -> Option<&Path> {
        self.addons_dir.as_deref()
    }

    fn report(&self, diagnostic: Diagnostic) {
        self.reporter.report_diagnostic(diagnostic);
    }

    fn report_once(&self, diagnostic: Diagnostic) {
        let first = self
            .reported
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(diagnostic.message.clone());
        if first {
            self.report(diagnostic);
        }
    }
}

impl fmt::Debug for AddonRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddonRegistry")
            .field("requested", &self.requested)
            .field("available", &self.available_names())
            .field("addons_dir", &self.addons_dir)
            .finish_non_exhaustive()
    }
}
