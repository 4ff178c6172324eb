//! Compiler options: what a [`Compiler`](crate::Compiler) is constructed from,
//! and how they are assembled from command-line arguments and config files.

use crate::discovery::AddonLoader;
use crate::registry::AddonRegistry;
use crate::system::{recursive_find_by_filter, System};
use smelt_common::{split_names, WILDCARD_TARGET};
use smelt_config::{
    has_invalid_targets, invalid_targets_message, load_config_from_str, load_project_from_str,
    CompilationConfig, CompilerOptionMap, ConfigError, ProjectConfig, DEFAULT_CONFIG_FILE,
    DEFAULT_PROJECT_FILE,
};
use smelt_diagnostics::{Diagnostic, DiagnosticCode, Reporter};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Name of the addons directory used when none is configured.
pub const DEFAULT_ADDONS_DIR: &str = "addons";

/// Extensions of source files picked up when the project lists no files.
const SOURCE_EXTENSIONS: [&str; 4] = ["ts", "tsx", "js", "jsx"];

/// Raw compiler arguments, as given on the command line or by a bundler plugin.
#[derive(Debug, Clone, Default)]
pub struct CompilerArguments {
    /// Comma-separated addon names; overrides the config's `addons`.
    pub addons: Option<String>,
    /// Addons directory; overrides the config's `addonsDir`.
    pub addons_dir: Option<PathBuf>,
    /// Output directory.
    pub build_dir: Option<PathBuf>,
    /// Compilation config file.
    pub config: Option<PathBuf>,
    /// Enables debug logging.
    pub debug: bool,
    /// Project file.
    pub project: Option<PathBuf>,
    /// Requests source maps from the language service.
    pub source_map: bool,
    /// Comma-separated target names.
    pub targets: Option<String>,
    /// Skips type checking.
    pub transpile_only: bool,
    /// Keeps compiling on change.
    pub watch: bool,
    /// Unrecognized `--key value` arguments, passed to the language service.
    pub additional_arguments: CompilerOptionMap,
}

/// Everything a compiler is constructed from.
#[derive(Clone)]
pub struct CompilerOptions {
    /// Available and requested addons.
    pub addons: Arc<AddonRegistry>,
    /// Directory outputs are written below.
    pub build_dir: PathBuf,
    /// The project file: base compiler options and root files.
    pub project: ProjectConfig,
    /// The compilation config, if one was found.
    pub config: Option<CompilationConfig>,
    /// Where warnings and errors go.
    pub reporter: Arc<dyn Reporter>,
    /// Filesystem capability.
    pub system: Arc<dyn System>,
    /// Active target names; empty means `["*"]`.
    pub targets: Vec<String>,
    /// The project's root source files.
    pub root_files: Vec<PathBuf>,
    /// Debug mode.
    pub debug: bool,
    /// Source map generation.
    pub source_map: bool,
    /// Watch mode.
    pub watch: bool,
    /// Transpile without type checking.
    pub transpile_only: bool,
    /// Extra options passed through to the language service.
    pub additional_arguments: CompilerOptionMap,
}

impl CompilerOptions {
    /// Options with no config, no addons and the `"*"` target.
    pub fn new(system: Arc<dyn System>, reporter: Arc<dyn Reporter>) -> Self {
        let build_dir = system.current_directory();
        Self {
            addons: Arc::new(AddonRegistry::new(Arc::clone(&system), Arc::clone(&reporter))),
            build_dir,
            project: ProjectConfig::default(),
            config: None,
            reporter,
            system,
            targets: vec![WILDCARD_TARGET.to_string()],
            root_files: Vec::new(),
            debug: false,
            source_map: false,
            watch: false,
            transpile_only: false,
            additional_arguments: CompilerOptionMap::new(),
        }
    }

    /// The project root: the config file's directory, else the project
    /// file's directory, else the working directory.
    pub fn project_dir(&self) -> PathBuf {
        let config_dir = self.config.as_ref().and_then(CompilationConfig::config_dir);
        let project_dir = self
            .project
            .config_file_path
            .as_deref()
            .and_then(Path::parent);
        config_dir
            .into_iter()
            .chain(project_dir)
            .find(|dir| !dir.as_os_str().is_empty())
            .map(|dir| self.system.resolve_path(dir))
            .unwrap_or_else(|| self.system.current_directory())
    }

    /// Base compiler options: the project's options overlaid with the
    /// additional arguments.
    pub fn base_options(&self) -> CompilerOptionMap {
        smelt_config::merge_options(&self.project.compiler_options, &self.additional_arguments)
    }
}

impl fmt::Debug for CompilerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilerOptions")
            .field("addons", &self.addons)
            .field("build_dir", &self.build_dir)
            .field("config", &self.config)
            .field("targets", &self.targets)
            .field("root_files", &self.root_files)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

/// Assembles compiler options from `args`.
///
/// Problems with the configuration are reported through `reporter` and
/// never fail construction: an unreadable config is treated as absent,
/// missing addons and unknown targets degrade the pipeline.
pub fn create_options(
    args: &CompilerArguments,
    system: Arc<dyn System>,
    reporter: Arc<dyn Reporter>,
    loaders: Vec<Box<dyn AddonLoader>>,
) -> CompilerOptions {
    let cwd = system.current_directory();

    let config = find_file(system.as_ref(), args.config.as_deref(), DEFAULT_CONFIG_FILE).and_then(
        |path| match read_config(system.as_ref(), &path) {
            Ok(config) => Some(config),
            Err(reason) => {
                reporter.report_diagnostic(
                    Diagnostic::error(
                        DiagnosticCode::CONFIG_UNREADABLE,
                        format!("Could not load configuration \"{}\": {reason}", path.display()),
                    )
                    .with_file(&path),
                );
                None
            }
        },
    );

    let project = find_file(system.as_ref(), args.project.as_deref(), DEFAULT_PROJECT_FILE)
        .and_then(|path| match read_project(system.as_ref(), &path) {
            Ok(project) => Some(project),
            Err(reason) => {
                reporter.report_diagnostic(
                    Diagnostic::error(
                        DiagnosticCode::CONFIG_UNREADABLE,
                        format!("Could not load project \"{}\": {reason}", path.display()),
                    )
                    .with_file(&path),
                );
                None
            }
        })
        .unwrap_or_default();

    let requested = match &args.addons {
        Some(list) => split_names(list),
        None => config.as_ref().map(|c| c.addons.clone()).unwrap_or_default(),
    };

    let mut registry = AddonRegistry::new(Arc::clone(&system), Arc::clone(&reporter))
        .with_loaders(loaders)
        .with_config(config.clone())
        .with_requested(requested);
    match configured_addons_dir(args, config.as_ref()) {
        Some(dir) => registry.discover(&dir),
        None => {
            let dir = cwd.join(DEFAULT_ADDONS_DIR);
            if system.directory_exists(&dir) {
                registry.discover(&dir);
            } else {
                tracing::debug!(dir = %dir.display(), "no addons directory");
            }
        }
    }

    let targets = resolve_targets(args.targets.as_deref(), config.as_ref(), reporter.as_ref());

    let mut options = CompilerOptions {
        addons: Arc::new(registry),
        build_dir: args
            .build_dir
            .as_deref()
            .map(|dir| system.resolve_path(dir))
            .unwrap_or_else(|| cwd.clone()),
        project,
        config,
        reporter,
        system,
        targets,
        root_files: Vec::new(),
        debug: args.debug,
        source_map: args.source_map,
        watch: args.watch,
        transpile_only: args.transpile_only,
        additional_arguments: args.additional_arguments.clone(),
    };
    options.root_files = find_root_files(&options);
    tracing::debug!(?options, "compiler options created");
    options
}

/// The explicit path if given, else `default` in the working directory when
/// it exists.
fn find_file(system: &dyn System, explicit: Option<&Path>, default: &str) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(system.resolve_path(path)),
        None => {
            let path = system.current_directory().join(default);
            system.file_exists(&path).then_some(path)
        }
    }
}

fn read_config(system: &dyn System, path: &Path) -> Result<CompilationConfig, ConfigError> {
    let content = system.read_file(path)?;
    load_config_from_str(&content, path)
}

fn read_project(system: &dyn System, path: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = system.read_file(path)?;
    load_project_from_str(&content, path)
}

/// The addons directory named by the arguments or the config, if any.
///
/// The config's `addonsDir` is relative to the config file.
fn configured_addons_dir(args: &CompilerArguments, config: Option<&CompilationConfig>) -> Option<PathBuf> {
    if let Some(dir) = &args.addons_dir {
        return Some(dir.clone());
    }
    let config = config?;
    let dir = config.addons_dir.as_deref()?;
    Some(match config.config_dir() {
        Some(base) => base.join(dir),
        None => PathBuf::from(dir),
    })
}

/// The CLI list if given, else the configured target names, else `["*"]`.
fn resolve_targets(
    requested: Option<&str>,
    config: Option<&CompilationConfig>,
    reporter: &dyn Reporter,
) -> Vec<String> {
    if let Some(list) = requested.map(split_names).filter(|list| !list.is_empty()) {
        if has_invalid_targets(&list, config) {
            reporter.report_diagnostic(Diagnostic::warning(
                DiagnosticCode::INVALID_TARGETS,
                invalid_targets_message(&list),
            ));
        }
        return list;
    }
    let configured = config.map(CompilationConfig::target_names).unwrap_or_default();
    if configured.is_empty() {
        vec![WILDCARD_TARGET.to_string()]
    } else {
        configured
    }
}

/// The project's `files`, else every source file under `<projectDir>/src`.
fn find_root_files(options: &CompilerOptions) -> Vec<PathBuf> {
    if !options.project.files.is_empty() {
        return options
            .project
            .file_names()
            .iter()
            .map(|file| options.system.resolve_path(file))
            .collect();
    }
    let src = options.project_dir().join("src");
    recursive_find_by_filter(options.system.as_ref(), &src, |path| {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
    })
}
