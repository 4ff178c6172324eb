//! Tests against the real filesystem and through the loader entry point.

use smelt_cache::HostId;
use smelt_core::{
    create_options, run_loader, Compiler, CompilerArguments, LiteCache, LoaderContext, OsSystem,
    PluginOptions,
};
use smelt_diagnostics::{DiagnosticSink, NoReporter};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        root,
        "smelt.config.json",
        r#"{
            "addons": "stamp",
            "targets": {
                "dist": { "writeFile": true },
                "preview": { "addons": ["shout"] }
            }
        }"#,
    );
    write(root, "addons/stamp/addon.toml", "banner = \"/* stamped */\"\n");
    write(
        root,
        "addons/shout/addon.toml",
        "[[replace]]\nfrom = \"hello\"\nto = \"HELLO\"\n",
    );
    write(root, "src/index.ts", "export const greet = 'hello';\n");
    write(root, "src/util/math.ts", "export const one = 1;\n");
    write(root, "src/readme.md", "not a source file\n");
    dir
}

fn arguments(root: &Path) -> CompilerArguments {
    CompilerArguments {
        config: Some(root.join("smelt.config.json")),
        addons_dir: Some(root.join("addons")),
        build_dir: Some(root.join("build")),
        ..CompilerArguments::default()
    }
}

#[test]
fn compile_writes_writing_targets_to_build_dir() {
    let dir = project();
    let root = dir.path();
    let sink = Arc::new(DiagnosticSink::new());
    let options = create_options(&arguments(root), Arc::new(OsSystem), sink.clone(), Vec::new());
    assert_eq!(options.root_files.len(), 2);

    let compiler = Compiler::new(options);
    let report = compiler.compile().unwrap();

    assert!(sink.diagnostics().is_empty(), "{:?}", sink.messages());
    assert_eq!(report.files.len(), 4);
    assert_eq!(report.written(), 2);
    assert_eq!(
        fs::read_to_string(root.join("build/dist/src/index.ts")).unwrap(),
        "/* stamped */\nexport const greet = 'hello';\n"
    );
    assert!(root.join("build/dist/src/util/math.ts").is_file());
    assert!(!root.join("build/preview").exists());

    let preview: Vec<_> = report.for_target("preview").collect();
    assert_eq!(preview.len(), 2);
    assert!(preview
        .iter()
        .any(|f| f.content == "/* stamped */\nexport const greet = 'HELLO';\n"));
}

#[test]
fn loader_reuses_compiler_per_session() {
    let dir = project();
    let root = dir.path().to_path_buf();
    let cache = LiteCache::new();
    let host = HostId::next();
    let plugin = PluginOptions {
        config: Some(root.join("smelt.config.json")),
        addons_dir: Some(root.join("addons")),
        ..PluginOptions::default()
    };
    let make_options = |plugin: &PluginOptions| {
        create_options(&plugin.to_arguments(), Arc::new(OsSystem), Arc::new(NoReporter), Vec::new())
    };

    let ctx = LoaderContext {
        host,
        session_hash: Some("abc".into()),
        resource_path: root.join("src/index.ts").display().to_string(),
        plugin,
    };
    let first = run_loader(&cache, &ctx, "say('hello')", make_options).unwrap();
    let second = run_loader(&cache, &ctx, "say('hello again')", make_options).unwrap();

    // "preview" is the only non-writing target.
    assert_eq!(first.content, "/* stamped */\nsay('HELLO')");
    assert_eq!(second.content, "/* stamped */\nsay('HELLO again')");
    assert_eq!(first.version, second.version);
    assert_eq!(cache.len(host), 1);

    assert_eq!(cache.teardown(host), 1);
    assert!(cache.is_empty(host));
}
