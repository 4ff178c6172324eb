//! The multi-target orchestrator.

use crate::context::{CompilationContext, ContextParams};
use crate::error::{AddonError, CompilerError};
use crate::language::{LanguageService, Program, SharedLanguageService};
use crate::options::CompilerOptions;
use smelt_common::WILDCARD_TARGET;
use smelt_config::resolve_target;
use smelt_diagnostics::{Diagnostic, DiagnosticCode, Reporter};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One file emitted through one target's pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFile {
    /// The target whose pipeline produced the content.
    pub target: String,
    /// The source file.
    pub source: PathBuf,
    /// Where the content was written, for writing targets.
    pub output: Option<PathBuf>,
    /// The transformed content.
    pub content: String,
}

/// The outcome of [`Compiler::compile`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileReport {
    /// Every emitted file, grouped by target in target order.
    pub files: Vec<EmittedFile>,
}

impl CompileReport {
    /// Files emitted through `target`.
    pub fn for_target<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a EmittedFile> + 'a {
        self.files.iter().filter(move |f| f.target == target)
    }

    /// Number of files written to disk.
    pub fn written(&self) -> usize {
        self.files.iter().filter(|f| f.output.is_some()).count()
    }
}

/// Owns one [`CompilationContext`] per active target and runs files through
/// them.
pub struct Compiler {
    options: CompilerOptions,
    targets: Vec<String>,
    contexts: HashMap<String, CompilationContext>,
    service: Arc<dyn LanguageService>,
}

impl Compiler {
    /// Creates a compiler with its own language service.
    pub fn new(options: CompilerOptions) -> Self {
        Self::with_service(options, Arc::new(SharedLanguageService::new()))
    }

    /// Creates a compiler sharing `service`.
    ///
    /// Every active target's context is built and its addons activated here.
    pub fn with_service(mut options: CompilerOptions, service: Arc<dyn LanguageService>) -> Self {
        if options.targets.is_empty() {
            options.targets = vec![WILDCARD_TARGET.to_string()];
        }
        let targets = options.targets.clone();
        let mut contexts = HashMap::new();
        create_target_contexts(&options, &service, &targets, &mut contexts);
        Self {
            options,
            targets,
            contexts,
            service,
        }
    }

    /// The options this compiler was built from.
    pub fn get_options(&self) -> &CompilerOptions {
        &self.options
    }

    /// The shared reporter.
    pub fn get_reporter(&self) -> &Arc<dyn Reporter> {
        &self.options.reporter
    }

    /// The shared language service.
    pub fn service(&self) -> &Arc<dyn LanguageService> {
        &self.service
    }

    /// The active targets, in order, including duplicates as requested.
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// The context of `target`, if it is active.
    pub fn context(&self, target: &str) -> Option<&CompilationContext> {
        self.contexts.get(target)
    }

    /// A program snapshot of the first active target.
    pub fn get_program(&self) -> Option<Program> {
        self.targets
            .first()
            .and_then(|target| self.context(target))
            .map(CompilationContext::program)
    }

    /// Runs `content` through `target`'s pipeline.
    ///
    /// An inactive target has an empty pipeline: the content is returned
    /// unchanged. Hook failures are returned as raised.
    pub fn emit_source_file(&self, file: &Path, content: &str, target: &str) -> Result<String, AddonError> {
        match self.contexts.get(target) {
            Some(ctx) => {
                tracing::debug!(file = %file.display(), target_name = target, "emitting");
                ctx.emit(file, content)
            }
            None => Ok(content.to_string()),
        }
    }

    /// Emits every root file through every active target.
    ///
    /// Writing targets store their output under
    /// `<buildDir>/<target>/<path relative to the project dir>`, the `"*"`
    /// target directly under `<buildDir>`. Read and write failures are
    /// reported and the remaining files still compile; hook failures abort.
    pub fn compile(&self) -> Result<CompileReport, CompilerError> {
        let system = &self.options.system;
        let project_dir = self.options.project_dir();
        let mut report = CompileReport::default();

        for target in unique(&self.targets) {
            let Some(ctx) = self.contexts.get(target) else {
                continue;
            };
            let out_dir = if target == WILDCARD_TARGET {
                self.options.build_dir.clone()
            } else {
                self.options.build_dir.join(target)
            };

            for file in &self.options.root_files {
                let content = match system.read_file(file) {
                    Ok(content) => content,
                    Err(err) => {
                        self.report_io(file, "read", &err);
                        continue;
                    }
                };
                let content = ctx.emit(file, &content)?;

                let mut output = None;
                if ctx.config().write_file {
                    let dest = out_dir.join(relative_to(file, &project_dir));
                    match system.write_file(&dest, &content) {
                        Ok(()) => output = Some(dest),
                        Err(err) => self.report_io(&dest, "write", &err),
                    }
                }
                report.files.push(EmittedFile {
                    target: target.clone(),
                    source: file.clone(),
                    output,
                    content,
                });
            }
        }

        tracing::debug!(files = report.files.len(), written = report.written(), "compilation finished");
        Ok(report)
    }

    fn report_io(&self, path: &Path, action: &str, err: &std::io::Error) {
        self.options.reporter.report_diagnostic(
            Diagnostic::error(
                DiagnosticCode::EMIT_FAILED,
                format!("Could not {action} \"{}\": {err}", path.display()),
            )
            .with_file(path),
        );
    }
}

/// Builds a context for every target not yet in `contexts` and activates
/// its addons against it.
///
/// An addon whose activation fails is reported, its partially registered
/// hooks are dropped, and the remaining addons still activate.
pub(crate) fn create_target_contexts(
    options: &CompilerOptions,
    service: &Arc<dyn LanguageService>,
    targets: &[String],
    contexts: &mut HashMap<String, CompilationContext>,
) {
    let base = options.base_options();
    let project_dir = options.project_dir();

    for target in targets {
        if contexts.contains_key(target) {
            continue;
        }

        let resolved = resolve_target(&base, options.config.as_ref(), target);
        let mut ctx = CompilationContext::new(ContextParams {
            target: resolved.name,
            build_dir: options.build_dir.clone(),
            project_dir: project_dir.clone(),
            options: resolved.options,
            config: resolved.config,
            root_files: options.root_files.clone(),
            system: Arc::clone(&options.system),
            service: Arc::clone(service),
            reporter: Arc::clone(&options.reporter),
        });

        for addon in options.addons.get_addons(Some(target)) {
            let marks = ctx.hook_marks();
            match addon.activate(&mut ctx) {
                Ok(()) => tracing::debug!(addon = addon.name(), target_name = %target, "addon activated"),
                Err(err) => {
                    ctx.truncate_hooks(marks);
                    options.reporter.report_diagnostic(
                        Diagnostic::error(
                            DiagnosticCode::ACTIVATION_FAILED,
                            format!(
                                "Addon \"{}\" failed to activate for target \"{target}\": {err}",
                                addon.name()
                            ),
                        )
                        .with_note(format!("hooks registered by \"{}\" were discarded", addon.name())),
                    );
                }
            }
        }

        tracing::debug!(target_name = %target, ?ctx, "target context created");
        contexts.insert(target.clone(), ctx);
    }
}

fn unique(targets: &[String]) -> impl Iterator<Item = &String> {
    targets
        .iter()
        .enumerate()
        .filter(move |&(i, t)| !targets[..i].contains(t))
        .map(|(_, t)| t)
}

/// `file` relative to `base`, or just its file name when it lies elsewhere.
fn relative_to(file: &Path, base: &Path) -> PathBuf {
    match file.strip_prefix(base) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) => file.file_name().map(PathBuf::from).unwrap_or_default(),
    }
}
