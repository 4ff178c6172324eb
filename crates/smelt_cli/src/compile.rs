//! `smelt compile`: runs every root file through every active target.
//!
//! 1. Assemble compiler options from the arguments and config files
//! 2. Discover addons and activate them per target
//! 3. Emit and write every root file
//! 4. Render diagnostics

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use smelt_core::{create_options, Compiler, CompilerArguments, OsSystem};
use smelt_diagnostics::{DiagnosticRenderer, DiagnosticSink, TerminalRenderer};

use crate::{CompileArgs, GlobalArgs};

/// Runs the `smelt compile` command.
///
/// Returns exit code 0 if no errors were reported, 1 otherwise.
pub fn run(args: &CompileArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let arguments = to_arguments(args);
    let sink = Arc::new(DiagnosticSink::new());

    let options = create_options(&arguments, Arc::new(OsSystem), sink.clone(), Vec::new());
    if options.watch {
        tracing::warn!("watch mode is driven by the build host; compiling once");
    }

    let compiler = Compiler::new(options);
    let result = compiler.compile();

    let renderer = TerminalRenderer::new(global.color);
    for diag in sink.take_all() {
        if global.quiet && !diag.severity.is_error() {
            continue;
        }
        eprint!("{}", renderer.render(&diag));
    }

    let report = result?;
    if !global.quiet {
        for target in unique_targets(compiler.targets()) {
            let files = report.for_target(target).count();
            eprintln!("   Compiled {files} file(s) for target \"{target}\"");
        }
    }

    Ok(if sink.has_errors() { 1 } else { 0 })
}

/// Converts parsed CLI flags into compiler arguments.
pub fn to_arguments(args: &CompileArgs) -> CompilerArguments {
    CompilerArguments {
        addons: args.addons.clone(),
        addons_dir: args.addons_dir.clone(),
        build_dir: args.build_dir.clone(),
        config: args.config.clone(),
        debug: args.debug,
        project: args.project.clone(),
        source_map: args.source_map,
        targets: args.targets.clone(),
        transpile_only: args.transpile_only,
        watch: args.watch,
        additional_arguments: parse_additional_arguments(&args.extra),
    }
}

/// Collects `--key value` pairs into compiler options.
///
/// Values are parsed as JSON when possible and kept as strings otherwise;
/// a key without a value is `true`. Tokens not introduced by a key are
/// ignored.
pub fn parse_additional_arguments(extra: &[String]) -> BTreeMap<String, Value> {
    let mut options = BTreeMap::new();
    let mut tokens = extra.iter().peekable();
    while let Some(token) = tokens.next() {
        let Some(key) = token.strip_prefix("--").filter(|k| !k.is_empty()) else {
            tracing::debug!(token = %token, "ignoring stray argument");
            continue;
        };
        let value = match tokens.next_if(|next| !next.starts_with("--")) {
            Some(raw) => serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone())),
            None => Value::Bool(true),
        };
        options.insert(key.to_string(), value);
    }
    options
}

fn unique_targets(targets: &[String]) -> Vec<&str> {
    let mut seen = Vec::new();
    for target in targets {
        if !seen.contains(&target.as_str()) {
            seen.push(target.as_str());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn strings(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn additional_arguments_parse_json_values() {
        let options = parse_additional_arguments(&strings(&[
            "--strict",
            "--target",
            "es5",
            "--maxNodeModuleJsDepth",
            "2",
            "--paths",
            r#"{"@/*":["src/*"]}"#,
            "--allowJs",
            "false",
        ]));
        assert_eq!(options["strict"], json!(true));
        assert_eq!(options["target"], json!("es5"));
        assert_eq!(options["maxNodeModuleJsDepth"], json!(2));
        assert_eq!(options["paths"], json!({"@/*": ["src/*"]}));
        assert_eq!(options["allowJs"], json!(false));
    }

    #[test]
    fn stray_tokens_are_ignored() {
        let options = parse_additional_arguments(&strings(&["stray", "--", "--flag"]));
        assert_eq!(options.len(), 1);
        assert_eq!(options["flag"], json!(true));
    }

    #[test]
    fn arguments_carry_every_flag() {
        let args = CompileArgs {
            addons: Some("zip".into()),
            targets: Some("web".into()),
            debug: true,
            watch: true,
            extra: strings(&["--noEmit"]),
            ..CompileArgs::default()
        };
        let arguments = to_arguments(&args);
        assert_eq!(arguments.addons.as_deref(), Some("zip"));
        assert_eq!(arguments.targets.as_deref(), Some("web"));
        assert!(arguments.debug);
        assert!(arguments.watch);
        assert_eq!(arguments.additional_arguments["noEmit"], json!(true));
    }

    #[test]
    fn run_compiles_project_on_disk() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("addons/banner")).unwrap();
        fs::write(root.join("src/main.ts"), "main();\n").unwrap();
        fs::write(root.join("addons/banner/addon.toml"), "banner = \"// built\"\n").unwrap();
        fs::write(
            root.join("smelt.config.json"),
            r#"{ "addons": ["banner"], "addonsDir": "addons", "targets": { "out": { "writeFile": true } } }"#,
        )
        .unwrap();

        let args = CompileArgs {
            config: Some(root.join("smelt.config.json")),
            build_dir: Some(root.join("build")),
            ..CompileArgs::default()
        };
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
        };
        let code = run(&args, &global).unwrap();

        assert_eq!(code, 0);
        assert_eq!(
            fs::read_to_string(root.join("build/out/src/main.ts")).unwrap(),
            "// built\nmain();\n"
        );
    }

    #[test]
    fn run_fails_on_unreadable_config() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("smelt.config.json"), "{ broken").unwrap();
        let args = CompileArgs {
            config: Some(dir.path().join("smelt.config.json")),
            build_dir: Some(dir.path().join("build")),
            ..CompileArgs::default()
        };
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
        };
        assert_eq!(run(&args, &global).unwrap(), 1);
    }
}
