//! The single-target compiler driven by a bundler loader.

use crate::compiler::Compiler;
use crate::error::{AddonError, CompilerError};
use crate::fragment::select_fragment_target;
use crate::language::Program;
use crate::options::{CompilerArguments, CompilerOptions};
use crate::system::{normalize_path, System};
use serde::{Deserialize, Serialize};
use smelt_common::{split_names, WILDCARD_TARGET};
use smelt_diagnostics::{Diagnostic, DiagnosticCode};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

/// Options a bundler plugin is configured with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginOptions {
    /// Compilation config file.
    pub config: Option<PathBuf>,
    /// Comma-separated addon names.
    pub addons: Option<String>,
    /// Addons directory.
    pub addons_dir: Option<PathBuf>,
    /// Output directory.
    pub build_dir: Option<PathBuf>,
    /// Debug mode.
    pub debug: bool,
    /// Project file.
    pub project: Option<PathBuf>,
    /// Source map generation.
    pub source_map: bool,
    /// Comma-separated target names; at most one is supported.
    pub targets: Option<String>,
    /// The target the bundler asks fragments for.
    pub webpack_target: String,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            config: None,
            addons: None,
            addons_dir: None,
            build_dir: None,
            debug: false,
            project: None,
            source_map: false,
            targets: None,
            webpack_target: WILDCARD_TARGET.to_string(),
        }
    }
}

impl PluginOptions {
    /// The equivalent compiler arguments.
    pub fn to_arguments(&self) -> CompilerArguments {
        CompilerArguments {
            addons: self.addons.clone(),
            addons_dir: self.addons_dir.clone(),
            build_dir: self.build_dir.clone(),
            config: self.config.clone(),
            debug: self.debug,
            project: self.project.clone(),
            source_map: self.source_map,
            targets: self.targets.clone(),
            ..CompilerArguments::default()
        }
    }

    /// The requested fragment target, `"*"` when blank.
    pub fn webpack_target(&self) -> &str {
        match self.webpack_target.trim() {
            "" => WILDCARD_TARGET,
            target => target,
        }
    }
}

/// A [`Compiler`] that emits every file through one selected target and
/// keeps the last result as its fragment.
///
/// Each construction takes the next value of a process-wide version
/// counter, so hosts can tell a fresh instance from a reused one.
pub struct LiteCompiler {
    compiler: Compiler,
    plugin: PluginOptions,
    fragment_target: String,
    version: u64,
    bound_system: Option<Arc<dyn System>>,
    fragment: Mutex<Option<String>>,
}

impl LiteCompiler {
    /// Builds the compiler and selects its fragment target.
    ///
    /// Fails if more than one target is requested or no target can serve
    /// the plugin's `webpack_target`; both are also reported.
    pub fn new(options: CompilerOptions, plugin: PluginOptions) -> Result<Self, CompilerError> {
        let requested = plugin.targets.as_deref().map(split_names).unwrap_or_default();
        if requested.len() > 1 {
            let err = CompilerError::MultipleTargets;
            options
                .reporter
                .report_diagnostic(Diagnostic::error(DiagnosticCode::MULTIPLE_TARGETS, err.to_string()));
            return Err(err);
        }

        let system = Arc::clone(&options.system);
        let compiler = Compiler::new(options);
        let fragment_target = select_fragment_target(
            plugin.webpack_target(),
            compiler.targets(),
            compiler.get_options().config.as_ref(),
            compiler.get_reporter().as_ref(),
        )?;
        let version = NEXT_VERSION.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(version, fragment_target = %fragment_target, "lite compiler created");

        Ok(Self {
            compiler,
            plugin,
            fragment_target,
            version,
            bound_system: Some(system),
            fragment: Mutex::new(None),
        })
    }

    /// Emits one bundler resource through the fragment target.
    ///
    /// Backslashes in `resource_path` are normalized to forward slashes.
    /// Fails with [`CompilerError::InactiveSystem`] unless the compiler's own
    /// system is the bound one.
    pub fn build(&self, resource_path: &str, content: &str) -> Result<String, CompilerError> {
        let own = &self.compiler.get_options().system;
        if !self
            .bound_system
            .as_ref()
            .is_some_and(|bound| Arc::ptr_eq(bound, own))
        {
            return Err(CompilerError::InactiveSystem);
        }

        let file = normalize_path(Path::new(&resource_path.replace('\\', "/")));
        let result = self.emit_source_file(&file, content, &self.fragment_target)?;
        *self.fragment.lock().unwrap_or_else(PoisonError::into_inner) = Some(result.clone());
        Ok(result)
    }

    /// Runs `content` through `target`'s pipeline; see [`Compiler::emit_source_file`].
    pub fn emit_source_file(&self, file: &Path, content: &str, target: &str) -> Result<String, AddonError> {
        self.compiler.emit_source_file(file, content, target)
    }

    /// Binds the system `build` runs against; `None` unbinds.
    pub fn bind_system(&mut self, system: Option<Arc<dyn System>>) {
        self.bound_system = system;
    }

    /// The selected fragment target.
    pub fn fragment_target(&self) -> &str {
        &self.fragment_target
    }

    /// The last result of [`build`](Self::build).
    pub fn fragment(&self) -> Option<String> {
        self.fragment.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// This instance's version.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The plugin options this instance was created with.
    pub fn plugin_options(&self) -> &PluginOptions {
        &self.plugin
    }

    /// The wrapped multi-target compiler.
    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    /// See [`Compiler::get_options`].
    pub fn get_options(&self) -> &CompilerOptions {
        self.compiler.get_options()
    }

    /// A program snapshot of the fragment target.
    pub fn get_program(&self) -> Option<Program> {
        self.compiler
            .context(&self.fragment_target)
            .map(|ctx| ctx.program())
    }
}

impl fmt::Debug for LiteCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiteCompiler")
            .field("fragment_target", &self.fragment_target)
            .field("version", &self.version)
            .field("plugin", &self.plugin)
            .finish_non_exhaustive()
    }
}
