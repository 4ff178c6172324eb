//! The addon pipeline: target contexts, addon discovery, and per-file emission.
//!
//! A [`Compiler`] owns one [`CompilationContext`] per active target. Addons
//! found by the [`AddonRegistry`] are activated against each context and
//! register generators (side effects) and processors (content rewrites).
//! Every incoming `(file, content)` pair is then run through the pipeline of
//! one target. [`LiteCompiler`] is the single-target variant driven by a
//! bundler loader, with instances shared across calls through
//! [`smelt_cache::InstanceCache`].

#![warn(missing_docs)]

pub mod addon;
pub mod compiler;
pub mod context;
pub mod discovery;
pub mod error;
pub mod fragment;
pub mod language;
pub mod lite;
pub mod loader;
pub mod manifest;
pub mod options;
pub mod registry;
pub mod system;

pub use addon::{Addon, AddonDescriptor};
pub use compiler::{CompileReport, Compiler, EmittedFile};
pub use context::{CompilationContext, ContextParams, Generator, Processor};
pub use discovery::{AddonLoader, ManifestLoader, StaticLoader};
pub use error::{AddonError, CompilerError};
pub use fragment::select_fragment_target;
pub use language::{DocumentRegistry, LanguageHost, LanguageService, Program, SharedLanguageService};
pub use lite::{LiteCompiler, PluginOptions};
pub use loader::{initialize_instance, run_loader, LiteCache, LoaderContext, LoaderOutput};
pub use manifest::{AddonManifest, ReplaceRule};
pub use options::{create_options, CompilerArguments, CompilerOptions};
pub use registry::AddonRegistry;
pub use system::{normalize_path, recursive_find_by_filter, DirEntry, MemorySystem, OsSystem, System};
