#![allow(non_snake_case)]

use super::*;
use std::fs;

const STRUCT: &str = r#"{"ty": "struct", "name": "DemoStruct", "mod_name": "demo",
  "crate_name": "demo",
  "fields": [{"name": "arg1", "ty": "Int", "origin_ty": "i32"}]}"#;

fn args(dir: &Path) -> GenerateArgs {
    let ast_dir = dir.join("ast");
    fs::create_dir_all(&ast_dir).unwrap();
    fs::write(ast_dir.join("demo_struct.json"), STRUCT).unwrap();

    GenerateArgs {
        ast_dir,
        module_name: "demo".into(),
        output_dir: dir.join("out"),
        lang: None,
        config: None,
        ext_libs: None,
    }
}

// resolve_config tests

#[test]
fn resolve_config___no_file___defaults_to_swift() {
    let dir = tempfile::tempdir().unwrap();

    let config = resolve_config(&args(dir.path())).unwrap();

    assert_eq!(config.lang, Lang::Swift);
    assert_eq!(config.module_name, "demo");
}

#[test]
fn resolve_config___flags_override_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rsbind.toml");
    fs::write(&path, "lang = \"kotlin\"\nmodule_name = \"ignored\"\nindent = 2\n").unwrap();
    let mut args = args(dir.path());
    args.config = Some(path);

    let from_file = resolve_config(&args).unwrap();
    args.lang = Some(Lang::Swift);
    let overridden = resolve_config(&args).unwrap();

    assert_eq!(from_file.lang, Lang::Kotlin);
    assert_eq!(from_file.module_name, "demo");
    assert_eq!(from_file.indent, 2);
    assert_eq!(overridden.lang, Lang::Swift);
}

#[test]
fn resolve_config___ext_libs___appended_after_file_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rsbind.toml");
    fs::write(&path, "extra_libraries = [\"ssl\"]\n").unwrap();
    let mut args = args(dir.path());
    args.config = Some(path);
    args.ext_libs = Some("c++_shared,, crypto".into());

    let config = resolve_config(&args).unwrap();

    assert_eq!(config.extra_libraries, ["ssl", "c++_shared", "crypto"]);
}

#[test]
fn resolve_config___invalid_module_name___is_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut args = args(dir.path());
    args.module_name = "not a module".into();

    let err = resolve_config(&args).unwrap_err();

    assert!(format!("{err:#}").contains("Invalid generation settings"));
}

#[test]
fn resolve_config___missing_file___is_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut args = args(dir.path());
    args.config = Some(dir.path().join("absent.toml"));

    let err = resolve_config(&args).unwrap_err();

    assert!(err.to_string().starts_with("Failed to load settings"));
}

// run tests

#[test]
fn run___swift___writes_artifact() {
    let dir = tempfile::tempdir().unwrap();

    let path = run(args(dir.path())).unwrap();

    assert_eq!(path, dir.path().join("out").join("demo.swift"));
    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.contains("public struct DemoStruct: Codable {"));
}

#[test]
fn run___kotlin___writes_named_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut args = args(dir.path());
    args.module_name = "com.example.demo".into();
    args.lang = Some(Lang::Kotlin);

    let path = run(args).unwrap();

    assert!(path.ends_with("out/Demo.kt"));
}

#[test]
fn run___kotlin_ext_libs___loaded_after_crate_library() {
    let dir = tempfile::tempdir().unwrap();
    let mut args = args(dir.path());
    args.ast_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../rsbind-codegen/tests/fixtures/demo");
    args.lang = Some(Lang::Kotlin);
    args.ext_libs = Some("c++_shared,ssl".into());

    let contents = fs::read_to_string(run(args).unwrap()).unwrap();

    assert!(contents.contains(
        "    init {\n        System.loadLibrary(\"demo\")\n        System.loadLibrary(\"c++_shared\")\n        System.loadLibrary(\"ssl\")\n    }\n"
    ), "{contents}");
}

#[test]
fn run___broken_ast___leaves_output_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let args = args(dir.path());
    fs::write(args.ast_dir.join("broken.json"), "{").unwrap();
    fs::create_dir_all(&args.output_dir).unwrap();
    fs::write(args.output_dir.join("keep.swift"), "old").unwrap();

    let err = run(args.clone()).unwrap_err();

    assert!(err.to_string().starts_with("Failed to generate bindings"));
    assert!(args.output_dir.join("keep.swift").exists());
}
