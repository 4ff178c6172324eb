//! Per-target compilation state: the hook pipeline and everything an addon
//! needs while registering hooks.

use crate::error::AddonError;
use crate::language::{LanguageHost, LanguageService, Program};
use crate::system::System;
use smelt_config::{CompilerOptionMap, TargetConfig};
use smelt_diagnostics::Reporter;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A side-effecting hook run for every file; its result never alters content.
pub type Generator = Box<dyn Fn(&Path, &str) -> Result<(), AddonError> + Send + Sync>;

/// A content-rewriting hook; its output feeds the next processor.
pub type Processor = Box<dyn Fn(&Path, &str) -> Result<String, AddonError> + Send + Sync>;

/// Everything a context is constructed from.
pub struct ContextParams {
    /// The target name.
    pub target: String,
    /// Directory outputs are written below.
    pub build_dir: PathBuf,
    /// The project root directory.
    pub project_dir: PathBuf,
    /// Base project options merged with the target's overrides.
    pub options: CompilerOptionMap,
    /// The target's raw configuration.
    pub config: TargetConfig,
    /// The project's root source files.
    pub root_files: Vec<PathBuf>,
    /// Shared filesystem capability.
    pub system: Arc<dyn System>,
    /// Shared language service.
    pub service: Arc<dyn LanguageService>,
    /// Shared reporter.
    pub reporter: Arc<dyn Reporter>,
}

/// The pipeline of one target plus the handles its addons may use.
///
/// Generators and processors run in registration order, which is addon
/// activation order.
pub struct CompilationContext {
    target: String,
    build_dir: PathBuf,
    project_dir: PathBuf,
    config: TargetConfig,
    system: Arc<dyn System>,
    service: Arc<dyn LanguageService>,
    reporter: Arc<dyn Reporter>,
    language_host: LanguageHost,
    generators: Vec<Generator>,
    processors: Vec<Processor>,
}

impl CompilationContext {
    /// Creates a context with an empty pipeline.
    pub fn new(params: ContextParams) -> Self {
        let language_host = LanguageHost::new(params.target.clone(), params.root_files, params.options);
        Self {
            target: params.target,
            build_dir: params.build_dir,
            project_dir: params.project_dir,
            config: params.config,
            system: params.system,
            service: params.service,
            reporter: params.reporter,
            language_host,
            generators: Vec::new(),
            processors: Vec::new(),
        }
    }

    /// The target this context belongs to.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Directory outputs are written below.
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// The project root directory.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// The merged compiler options of this target.
    pub fn options(&self) -> &CompilerOptionMap {
        self.language_host.options()
    }

    /// The target's raw configuration.
    pub fn config(&self) -> &TargetConfig {
        &self.config
    }

    /// The project's root source files.
    pub fn root_files(&self) -> &[PathBuf] {
        self.language_host.root_files()
    }

    /// The shared filesystem capability.
    pub fn system(&self) -> &Arc<dyn System> {
        &self.system
    }

    /// The shared reporter.
    pub fn reporter(&self) -> &Arc<dyn Reporter> {
        &self.reporter
    }

    /// This target's language host.
    pub fn language_host(&self) -> &LanguageHost {
        &self.language_host
    }

    /// A program snapshot for this target.
    pub fn program(&self) -> Program {
        self.service.program(&self.language_host)
    }

    /// Appends a generator to the pipeline.
    pub fn register_generator<F>(&mut self, generator: F)
    where
        F: Fn(&Path, &str) -> Result<(), AddonError> + Send + Sync + 'static,
    {
        self.generators.push(Box::new(generator));
    }

    /// Appends a processor to the pipeline.
    pub fn register_processor<F>(&mut self, processor: F)
    where
        F: Fn(&Path, &str) -> Result<String, AddonError> + Send + Sync + 'static,
    {
        self.processors.push(Box::new(processor));
    }

    /// The registered generators, in order.
    pub fn generators(&self) -> &[Generator] {
        &self.generators
    }

    /// The registered processors, in order.
    pub fn processors(&self) -> &[Processor] {
        &self.processors
    }

    /// Runs the pipeline over one file.
    ///
    /// The document is submitted to the language service first, through this
    /// context's host. Every generator sees the original content; processors
    /// are threaded left to right. The first failing hook aborts the call and
    /// its error is returned as is; the context stays usable.
    pub fn emit(&self, file: &Path, content: &str) -> Result<String, AddonError> {
        self.service.update_document(&self.language_host, file, content);

        for generator in &self.generators {
            generator(file, content)?;
        }

        let mut content = content.to_string();
        for processor in &self.processors {
            content = processor(file, &content)?;
        }
        Ok(content)
    }

    /// Current hook counts, used to undo a failed activation.
    pub(crate) fn hook_marks(&self) -> (usize, usize) {
        (self.generators.len(), self.processors.len())
    }

    /// Drops hooks registered after `marks` was taken.
    pub(crate) fn truncate_hooks(&mut self, marks: (usize, usize)) {
        self.generators.truncate(marks.0);
        self.processors.truncate(marks.1);
    }
}

impl fmt::Debug for CompilationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilationContext")
            .field("target", &self.target)
            .field("build_dir", &self.build_dir)
            .field("generators", &self.generators.len())
            .field("processors", &self.processors.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::language::SharedLanguageService;
    use crate::system::MemorySystem;
    use smelt_diagnostics::NoReporter;
    use std::sync::Mutex;

    pub(crate) fn make_context(target: &str) -> CompilationContext {
        CompilationContext::new(ContextParams {
            target: target.to_string(),
            build_dir: PathBuf::from("/build"),
            project_dir: PathBuf::from("/"),
            options: CompilerOptionMap::new(),
            config: TargetConfig::default(),
            root_files: Vec::new(),
            system: Arc::new(MemorySystem::new()),
            service: Arc::new(SharedLanguageService::new()),
            reporter: Arc::new(NoReporter),
        })
    }

    #[test]
    fn empty_pipeline_is_identity() {
        let ctx = make_context("*");
        assert_eq!(ctx.emit(Path::new("a.ts"), "const a = 1;").unwrap(), "const a = 1;");
    }

    #[test]
    fn processors_compose_left_to_right() {
        let mut ctx = make_context("*");
        ctx.register_processor(|_, c| Ok(format!("{c}1")));
        ctx.register_processor(|_, c| Ok(format!("{c}2")));
        assert_eq!(ctx.emit(Path::new("a.ts"), "x").unwrap(), "x12");
    }

    #[test]
    fn generators_see_original_content_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut ctx = make_context("*");
        for tag in ["g1", "g2"] {
            let seen = Arc::clone(&seen);
            ctx.register_generator(move |f, c| {
                seen.lock().unwrap().push(format!("{tag}:{}:{c}", f.display()));
                Ok(())
            });
        }
        ctx.register_processor(|_, c| Ok(c.to_uppercase()));

        let out = ctx.emit(Path::new("a.ts"), "src").unwrap();
        assert_eq!(out, "SRC");
        assert_eq!(*seen.lock().unwrap(), vec!["g1:a.ts:src", "g2:a.ts:src"]);
    }

    #[test]
    fn failing_processor_stops_pipeline_and_context_survives() {
        let mut ctx = make_context("*");
        ctx.register_processor(|f, c| {
            if f.ends_with("bad.ts") {
                Err(AddonError::new("cannot rewrite"))
            } else {
                Ok(c.to_string())
            }
        });
        ctx.register_processor(|_, c| Ok(format!("{c}!")));

        let err = ctx.emit(Path::new("bad.ts"), "x").unwrap_err();
        assert_eq!(err.to_string(), "cannot rewrite");
        assert_eq!(ctx.emit(Path::new("good.ts"), "x").unwrap(), "x!");
    }

    #[test]
    fn emit_submits_document() {
        let ctx = make_context("web");
        ctx.emit(Path::new("/a.ts"), "one").unwrap();
        ctx.emit(Path::new("/a.ts"), "two").unwrap();
        assert_eq!(ctx.program().versions[Path::new("/a.ts")], 2);
        assert_eq!(ctx.program().target, "web");
    }

    #[test]
    fn truncate_drops_later_hooks() {
        let mut ctx = make_context("*");
        ctx.register_processor(|_, c| Ok(c.to_string()));
        let marks = ctx.hook_marks();
        ctx.register_processor(|_, c| Ok(c.to_string()));
        ctx.register_generator(|_, _| Ok(()));
        ctx.truncate_hooks(marks);
        assert_eq!(ctx.processors().len(), 1);
        assert!(ctx.generators().is_empty());
    }
}
