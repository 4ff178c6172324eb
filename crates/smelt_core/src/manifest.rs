//! Declarative addons described by an `addon.toml` manifest.
//!
//! ```toml
//! banner = "// built by smelt"
//! copy_to = "originals"
//!
//! [[replace]]
//! from = "__VERSION__"
//! to = "1.4.0"
//! ```
//!
//! `banner` and `replace` become processors, `copy_to` becomes a generator
//! writing each incoming file below `<buildDir>/<copy_to>/`.

use crate::addon::Addon;
use crate::context::CompilationContext;
use crate::error::AddonError;
use serde::Deserialize;

/// A literal text replacement.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplaceRule {
    /// Text to look for; must not be empty.
    pub from: String,
    /// Replacement text.
    pub to: String,
}

/// A parsed `addon.toml`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddonManifest {
    /// Line prepended to every file.
    #[serde(default)]
    pub banner: Option<String>,
    /// Replacements applied in order.
    #[serde(default)]
    pub replace: Vec<ReplaceRule>,
    /// Build-dir subdirectory receiving a copy of every incoming file.
    #[serde(default)]
    pub copy_to: Option<String>,
}

impl AddonManifest {
    /// Parses and validates manifest text.
    pub fn parse(content: &str) -> Result<Self, AddonError> {
        let manifest: AddonManifest =
            toml::from_str(content).map_err(|e| AddonError::Manifest(e.to_string()))?;
        if manifest.replace.iter().any(|rule| rule.from.is_empty()) {
            return Err(AddonError::Manifest(
                "replace rule with empty `from`".to_string(),
            ));
        }
        if manifest.copy_to.as_deref().is_some_and(|dir| dir.trim().is_empty()) {
            return Err(AddonError::Manifest("empty `copy_to`".to_string()));
        }
        Ok(manifest)
    }
}

impl Addon for AddonManifest {
    fn activate(&self, ctx: &mut CompilationContext) -> Result<(), AddonError> {
        if let Some(dir) = &self.copy_to {
            let out_dir = ctx.build_dir().join(dir);
            let system = ctx.system().clone();
            ctx.register_generator(move |file, content| {
                let name = file
                    .file_name()
                    .ok_or_else(|| AddonError::new(format!("{} has no file name", file.display())))?;
                system.write_file(&out_dir.join(name), content)?;
                Ok(())
            });
        }

        if !self.replace.is_empty() {
            let rules = self.replace.clone();
            ctx.register_processor(move |_, content| {
                Ok(rules
                    .iter()
                    .fold(content.to_string(), |acc, rule| acc.replace(&rule.from, &rule.to)))
            });
        }

        if let Some(banner) = &self.banner {
            let banner = banner.clone();
            ctx.register_processor(move |_, content| Ok(format!("{banner}\n{content}")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::make_context;
    use std::path::Path;

    #[test]
    fn parse_full_manifest() {
        let manifest = AddonManifest::parse(
            r#"
banner = "// hi"
copy_to = "copies"

[[replace]]
from = "a"
to = "b"
"#,
        )
        .unwrap();
        assert_eq!(manifest.banner.as_deref(), Some("// hi"));
        assert_eq!(manifest.copy_to.as_deref(), Some("copies"));
        assert_eq!(manifest.replace.len(), 1);
    }

    #[test]
    fn empty_manifest_is_a_noop_addon() {
        let manifest = AddonManifest::parse("").unwrap();
        let mut ctx = make_context("*");
        manifest.activate(&mut ctx).unwrap();
        assert!(ctx.processors().is_empty());
        assert!(ctx.generators().is_empty());
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = AddonManifest::parse("activate = true").unwrap_err();
        assert!(matches!(err, AddonError::Manifest(_)));
    }

    #[test]
    fn empty_from_is_rejected() {
        let err = AddonManifest::parse("[[replace]]\nfrom = \"\"\nto = \"x\"").unwrap_err();
        assert!(matches!(err, AddonError::Manifest(_)));
    }

    #[test]
    fn replace_runs_before_banner() {
        let manifest = AddonManifest::parse(
            "banner = \"// __V__\"\n[[replace]]\nfrom = \"__V__\"\nto = \"1.0\"",
        )
        .unwrap();
        let mut ctx = make_context("*");
        manifest.activate(&mut ctx).unwrap();

        let out = ctx.emit(Path::new("a.ts"), "v = \"__V__\";").unwrap();
        assert_eq!(out, "// __V__\nv = \"1.0\";");
    }

    #[test]
    fn copy_to_writes_original_content() {
        let manifest = AddonManifest::parse("copy_to = \"copies\"\nbanner = \"//\"").unwrap();
        let mut ctx = make_context("*");
        manifest.activate(&mut ctx).unwrap();

        ctx.emit(Path::new("/p/src/one.ts"), "one").unwrap();
        let copied = ctx.system().read_file(Path::new("/build/copies/one.ts")).unwrap();
        assert_eq!(copied, "one");
    }
}
