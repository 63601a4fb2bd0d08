#![allow(non_snake_case)]

use super::*;
use crate::config::Lang;
use rsbind_ir::{ArgDesc, AstType, MethodDesc, StructDesc, TraitDesc};
use std::fs;
use test_case::test_case;

fn trait_desc(name: &str, is_callback: bool, methods: Vec<MethodDesc>) -> TraitDesc {
    TraitDesc {
        name: name.into(),
        module: "demo".into(),
        crate_name: "demo".into(),
        is_callback,
        methods,
    }
}

fn returning(name: &str, return_type: AstType) -> MethodDesc {
    MethodDesc {
        name: name.into(),
        return_type,
        origin_return_ty: String::new(),
        args: Vec::new(),
    }
}

fn plain_struct() -> StructDesc {
    StructDesc {
        name: "DemoStruct".into(),
        module: "demo".into(),
        crate_name: "demo".into(),
        fields: vec![ArgDesc {
            name: "arg1".into(),
            ty: AstType::Int,
            origin_ty: "i32".into(),
        }],
    }
}

fn callback_ast() -> AstResult {
    let callback = trait_desc(
        "DemoCallback",
        true,
        vec![returning("on_event", AstType::Void)],
    );
    let first = trait_desc(
        "FirstService",
        false,
        vec![returning("make", AstType::Callback("DemoCallback".into()))],
    );
    let second = trait_desc(
        "SecondService",
        false,
        vec![returning("make_too", AstType::Callback("DemoCallback".into()))],
    );
    AstResult::new(vec![callback, first, second], Vec::new())
}

#[test]
fn BindingGenerator___generate___rejects_invalid_config() {
    let ast = AstResult::new(Vec::new(), vec![plain_struct()]);

    let err = BindingGenerator::new(GenConfig::new("")).generate(&ast).unwrap_err();

    assert!(matches!(err, CodegenError::Config(_)));
}

#[test]
fn BindingGenerator___generate___rejects_invalid_ast() {
    let service = trait_desc(
        "DemoTrait",
        false,
        vec![returning("make", AstType::Callback("Missing".into()))],
    );
    let ast = AstResult::new(vec![service], Vec::new());

    let err = BindingGenerator::new(GenConfig::new("demo"))
        .generate(&ast)
        .unwrap_err();

    assert!(matches!(err, CodegenError::Ir(_)), "{err}");
}

fn taking(name: &str, args: &[&str]) -> MethodDesc {
    MethodDesc {
        args: args
            .iter()
            .map(|arg| ArgDesc {
                name: arg.to_string(),
                ty: AstType::Int,
                origin_ty: "i32".into(),
            })
            .collect(),
        ..returning(name, AstType::Void)
    }
}

fn collision(ast: &AstResult, lang: Lang) -> (String, String, String, String) {
    let config = GenConfig::new("demo").with_lang(lang);
    match BindingGenerator::new(config).generate(ast) {
        Err(CodegenError::NameCollision { scope, first, second, name }) => {
            (scope, first, second, name)
        }
        other => panic!("expected a name collision, got {other:?}"),
    }
}

#[test_case(Lang::Swift ; "swift")]
#[test_case(Lang::Kotlin ; "kotlin")]
fn BindingGenerator___generate___camel_case_argument_collision___rejected(lang: Lang) {
    let service = trait_desc("DemoTrait", false, vec![taking("test_pair", &["foo_bar", "fooBar"])]);
    let ast = AstResult::new(vec![service], Vec::new());

    let (scope, first, second, name) = collision(&ast, lang);

    assert_eq!(scope, "DemoTrait.test_pair");
    assert_eq!((first.as_str(), second.as_str()), ("foo_bar", "fooBar"));
    assert_eq!(name, "fooBar");
}

#[test]
fn BindingGenerator___generate___camel_case_method_collision___rejected() {
    let service = trait_desc(
        "DemoTrait",
        false,
        vec![taking("do_it", &[]), taking("doIt", &[])],
    );
    let ast = AstResult::new(vec![service], Vec::new());

    let (scope, _, _, name) = collision(&ast, Lang::Kotlin);

    assert_eq!(scope, "DemoTrait");
    assert_eq!(name, "doIt");
}

#[test]
fn BindingGenerator___generate___callback_argument_collision___rejected() {
    let callback = trait_desc("DemoCallback", true, vec![taking("on_pair", &["_id", "id"])]);
    let ast = AstResult::new(vec![callback], Vec::new());

    let (scope, _, _, name) = collision(&ast, Lang::Swift);

    assert_eq!(scope, "DemoCallback.on_pair");
    assert_eq!(name, "id");
}

#[test]
fn BindingGenerator___generate___duplicate_struct_field___rejected() {
    let mut desc = plain_struct();
    desc.fields.push(desc.fields[0].clone());
    let ast = AstResult::new(Vec::new(), vec![desc]);

    let (scope, _, _, name) = collision(&ast, Lang::Swift);

    assert_eq!(scope, "DemoStruct");
    assert_eq!(name, "arg1");
}

#[test]
fn BindingGenerator___generate___suffixed_argument_names___accepted() {
    let service = trait_desc(
        "DemoTrait",
        false,
        vec![taking("test_pair", &["x", "x_handle", "x_buf"])],
    );
    let ast = AstResult::new(vec![service], Vec::new());

    let artifact = BindingGenerator::new(GenConfig::new("demo"))
        .generate(&ast)
        .unwrap();

    assert!(artifact.contents.contains("x: Int32, xHandle: Int32, xBuf: Int32"), "{}", artifact.contents);
}

#[test]
fn BindingGenerator___generate___no_registry_without_callbacks() {
    let ast = AstResult::new(Vec::new(), vec![plain_struct()]);

    let artifact = BindingGenerator::new(GenConfig::new("demo"))
        .generate(&ast)
        .unwrap();

    assert_eq!(artifact.file_name, "demo.swift");
    assert!(!artifact.contents.contains("CallbackRegistry"));
    assert!(!artifact.contents.contains("NSLock"));
}

#[test]
fn BindingGenerator___generate___proxy_owned_by_first_service() {
    let artifact = BindingGenerator::new(GenConfig::new("demo"))
        .generate(&callback_ast())
        .unwrap();

    assert_eq!(
        artifact.contents.matches("class DemoCallbackProxy").count(),
        1
    );
    let first = artifact.contents.find("class FirstService").unwrap();
    let proxy = artifact.contents.find("class DemoCallbackProxy").unwrap();
    let second = artifact.contents.find("class SecondService").unwrap();
    assert!(first < proxy && proxy < second);
}

#[test]
fn BindingGenerator___generate___kotlin_file_layout() {
    let config = GenConfig::new("com.example.demo")
        .with_lang(Lang::Kotlin)
        .with_header("Generated by rsbind. Do not edit.");

    let artifact = BindingGenerator::new(config)
        .generate(&callback_ast())
        .unwrap();

    assert_eq!(artifact.file_name, "Demo.kt");
    assert!(artifact.contents.starts_with(
        "// Generated by rsbind. Do not edit.\n\npackage com.example.demo\n\nimport java.util.concurrent.ConcurrentHashMap\n"
    ));
    assert!(artifact.contents.contains("internal val demoCallbackRegistry: CallbackRegistry<DemoCallback> = CallbackRegistry()"));
    assert!(artifact.contents.contains("System.loadLibrary(\"demo\")"));
    assert!(!artifact.contents.contains("System.loadLibrary(\"com.example.demo\")"));
}

#[test]
fn BindingGenerator___generate___declaration_order() {
    let mut traits = callback_ast().traits().to_vec();
    traits.truncate(2);
    let ast = AstResult::new(traits, vec![plain_struct()]);

    let contents = BindingGenerator::new(GenConfig::new("demo"))
        .generate(&ast)
        .unwrap()
        .contents;

    let registry = contents.find("private let demoCallbackRegistry").unwrap();
    let record = contents.find("public struct DemoStruct").unwrap();
    let callback = contents.find("public protocol DemoCallback").unwrap();
    let service = contents.find("public final class FirstService").unwrap();
    assert!(registry < record && record < callback && callback < service);
}

#[test]
fn write_artifact___replaces_output_directory() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("stale.swift"), "old").unwrap();
    let artifact = Artifact {
        file_name: "demo.swift".into(),
        contents: "import Foundation\n".into(),
    };

    let path = write_artifact(&out, &artifact).unwrap();

    assert_eq!(path, out.join("demo.swift"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "import Foundation\n");
    assert!(!out.join("stale.swift").exists());
}

#[test]
fn generate_dir___missing_directory_is_error() {
    let dir = tempfile::tempdir().unwrap();

    let result = generate_dir(&dir.path().join("absent"), GenConfig::new("demo"));

    assert!(result.is_err());
}
