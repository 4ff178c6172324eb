//! The addon capability: something that registers hooks on a context.

use crate::context::CompilationContext;
use crate::error::AddonError;
use std::fmt;
use std::sync::Arc;

/// A pluggable unit of behavior.
///
/// `activate` is called exactly once per target context and may register any
/// number of generators and processors. Closures with the matching signature
/// are addons too.
pub trait Addon: Send + Sync {
    /// Registers this addon's hooks on `ctx`.
    fn activate(&self, ctx: &mut CompilationContext) -> Result<(), AddonError>;
}

impl<F> Addon for F
where
    F: Fn(&mut CompilationContext) -> Result<(), AddonError> + Send + Sync,
{
    fn activate(&self, ctx: &mut CompilationContext) -> Result<(), AddonError> {
        self(ctx)
    }
}

/// A named, loaded addon. Immutable once created.
#[derive(Clone)]
pub struct AddonDescriptor {
    name: String,
    addon: Arc<dyn Addon>,
}

impl AddonDescriptor {
    /// Wraps `addon` under `name`.
    pub fn new(name: impl Into<String>, addon: impl Addon + 'static) -> Self {
        Self::from_arc(name, Arc::new(addon))
    }

    /// Wraps a closure under `name`.
    pub fn from_fn<F>(name: impl Into<String>, activate: F) -> Self
    where
        F: Fn(&mut CompilationContext) -> Result<(), AddonError> + Send + Sync + 'static,
    {
        Self::new(name, activate)
    }

    /// Wraps an already shared addon under `name`.
    pub fn from_arc(name: impl Into<String>, addon: Arc<dyn Addon>) -> Self {
        Self {
            name: name.into(),
            addon,
        }
    }

    /// The addon's unique name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Activates the addon against `ctx`.
    pub fn activate(&self, ctx: &mut CompilationContext) -> Result<(), AddonError> {
        self.addon.activate(ctx)
    }
}

impl fmt::Debug for AddonDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddonDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::make_context;
    use std::path::Path;

    struct Suffix(&'static str);

    impl Addon for Suffix {
        fn activate(&self, ctx: &mut CompilationContext) -> Result<(), AddonError> {
            let suffix = self.0;
            ctx.register_processor(move |_, c| Ok(format!("{c}{suffix}")));
            Ok(())
        }
    }

    #[test]
    fn struct_addon_registers_hooks() {
        let descriptor = AddonDescriptor::new("suffix", Suffix(";"));
        let mut ctx = make_context("*");
        descriptor.activate(&mut ctx).unwrap();
        assert_eq!(descriptor.name(), "suffix");
        assert_eq!(ctx.emit(Path::new("a.ts"), "x").unwrap(), "x;");
    }

    #[test]
    fn closure_is_an_addon() {
        let descriptor = AddonDescriptor::from_fn("noop", |ctx| {
            ctx.register_generator(|_, _| Ok(()));
            Ok(())
        });
        let mut ctx = make_context("*");
        descriptor.activate(&mut ctx).unwrap();
        assert_eq!(ctx.generators().len(), 1);
    }

    #[test]
    fn activation_error_is_returned() {
        let descriptor =
            AddonDescriptor::from_fn("broken", |_| Err(AddonError::new("not today")));
        let err = descriptor.activate(&mut make_context("*")).unwrap_err();
        assert_eq!(err.to_string(), "not today");
    }

    #[test]
    fn debug_shows_name() {
        let descriptor = AddonDescriptor::from_fn("zip", |_| Ok(()));
        assert!(format!("{descriptor:?}").contains("\"zip\""));
    }
}
