//! The per-file loader entry point a bundler calls for every resource.

use crate::error::CompilerError;
use crate::lite::{LiteCompiler, PluginOptions};
use crate::options::CompilerOptions;
use smelt_cache::{cache_name, HostId, InstanceCache};
use std::sync::Arc;

/// Compilers shared across loader calls, keyed by host and build session.
pub type LiteCache = InstanceCache<LiteCompiler>;

/// What the bundler tells the loader about one call.
#[derive(Debug, Clone)]
pub struct LoaderContext {
    /// The build-tool instance making the call.
    pub host: HostId,
    /// The current build session's hash, if the host has one.
    pub session_hash: Option<String>,
    /// The resource being loaded.
    pub resource_path: String,
    /// The plugin's options.
    pub plugin: PluginOptions,
}

impl LoaderContext {
    /// The instance cache key for this call's session.
    pub fn cache_key(&self) -> String {
        cache_name(self.session_hash.as_deref())
    }
}

/// The loader's result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderOutput {
    /// The transformed resource.
    pub content: String,
    /// Version of the compiler that produced it.
    pub version: u64,
}

/// Returns the session's compiler, constructing it on the first call.
///
/// `make_options` only runs on a cache miss. A failed construction is not
/// cached.
pub fn initialize_instance(
    cache: &LiteCache,
    ctx: &LoaderContext,
    make_options: impl FnOnce(&PluginOptions) -> CompilerOptions,
) -> Result<Arc<LiteCompiler>, CompilerError> {
    cache.get_or_try_create(ctx.host, &ctx.cache_key(), || {
        LiteCompiler::new(make_options(&ctx.plugin), ctx.plugin.clone())
    })
}

/// Transforms one resource through the session's compiler.
pub fn run_loader(
    cache: &LiteCache,
    ctx: &LoaderContext,
    content: &str,
    make_options: impl FnOnce(&PluginOptions) -> CompilerOptions,
) -> Result<LoaderOutput, CompilerError> {
    let instance = initialize_instance(cache, ctx, make_options)?;
    let content = instance.build(&ctx.resource_path, content)?;
    Ok(LoaderOutput {
        content,
        version: instance.version(),
    })
}
