#![allow(non_snake_case)]

use super::*;
use serde_json::json;
use test_case::test_case;

fn trait_doc(ty: Value, origin: &str) -> Value {
    json!({
        "ty": "trait",
        "name": "DemoTrait",
        "mod_name": "demo",
        "crate_name": "demo-lib",
        "is_callback": false,
        "methods": [{
            "name": "run",
            "return_type": "Void",
            "origin_return_ty": "()",
            "args": [{ "name": "x", "ty": ty, "origin_ty": origin }]
        }]
    })
}

fn first_arg_type(doc: &Value) -> IrResult<AstType> {
    match AstEntity::from_value(doc)? {
        AstEntity::Trait(desc) => Ok(desc.methods[0].args[0].ty.clone()),
        AstEntity::Struct(_) => panic!("expected a trait"),
    }
}

// Trait parsing

#[test]
fn AstEntity___parse_str___trait_with_methods() {
    let json = r#"{
        "ty": "trait",
        "name": "DemoTrait",
        "mod_name": "demo",
        "crate_name": "demo-lib",
        "is_callback": false,
        "methods": [
            {
                "name": "test_return_vec_struct",
                "return_type": { "Vec": "Struct" },
                "origin_return_ty": "Vec<DemoStruct>",
                "args": []
            },
            {
                "name": "test_u8_1",
                "return_type": "Byte",
                "origin_return_ty": "u8",
                "args": [
                    { "name": "arg", "ty": "Byte", "origin_ty": "u8" },
                    { "name": "arg2", "ty": "Byte", "origin_ty": "u8" }
                ]
            }
        ]
    }"#;

    let entity = AstEntity::parse_str(json).unwrap();

    let AstEntity::Trait(desc) = entity else {
        panic!("expected a trait");
    };
    assert_eq!(desc.name, "DemoTrait");
    assert_eq!(desc.module, "demo");
    assert_eq!(desc.crate_name, "demo-lib");
    assert!(!desc.is_callback);
    assert_eq!(desc.methods.len(), 2);
    assert_eq!(
        desc.methods[0].return_type,
        AstType::Vec(AstBaseType::Struct("DemoStruct".into()))
    );
    assert_eq!(desc.methods[0].origin_return_ty, "Vec<DemoStruct>");
    assert_eq!(desc.methods[1].args[1].name, "arg2");
    assert_eq!(desc.methods[1].args[1].ty, AstType::Byte);
}

#[test]
fn AstEntity___parse_str___callback_flag() {
    let json = r#"{
        "ty": "trait", "name": "DemoCallback", "mod_name": "demo",
        "crate_name": "demo", "is_callback": true, "methods": []
    }"#;

    let AstEntity::Trait(desc) = AstEntity::parse_str(json).unwrap() else {
        panic!("expected a trait");
    };

    assert!(desc.is_callback);
}

// Struct parsing

#[test]
fn AstEntity___parse_str___struct_keeps_field_order() {
    let json = r#"{
        "ty": "struct", "name": "DemoStruct", "mod_name": "demo", "crate_name": "demo",
        "fields": [
            { "name": "arg1", "ty": "Int", "origin_ty": "i32" },
            { "name": "arg2", "ty": "Byte", "origin_ty": "i8" },
            { "name": "arg3", "ty": "Short", "origin_ty": "i16" },
            { "name": "arg7_str", "ty": "String", "origin_ty": "String" },
            { "name": "arg8_false", "ty": "Boolean", "origin_ty": "bool" }
        ]
    }"#;

    let AstEntity::Struct(desc) = AstEntity::parse_str(json).unwrap() else {
        panic!("expected a struct");
    };

    let names: Vec<_> = desc.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["arg1", "arg2", "arg3", "arg7_str", "arg8_false"]);
    assert_eq!(desc.fields[2].ty, AstType::Short);
}

// Type decoding

#[test_case("Void", AstType::Void)]
#[test_case("Byte", AstType::Byte)]
#[test_case("Short", AstType::Short)]
#[test_case("Int", AstType::Int)]
#[test_case("Long", AstType::Long)]
#[test_case("Float", AstType::Float)]
#[test_case("Double", AstType::Double)]
#[test_case("String", AstType::String)]
#[test_case("Boolean", AstType::Boolean)]
fn parse_type___primitive_tags(tag: &str, expected: AstType) {
    let doc = trait_doc(json!(tag), "ignored");

    assert_eq!(first_arg_type(&doc).unwrap(), expected);
}

#[test]
fn parse_type___callback___name_from_origin() {
    let doc = trait_doc(json!("Callback"), "Box<dyn DemoCallback>");

    assert_eq!(
        first_arg_type(&doc).unwrap(),
        AstType::Callback("DemoCallback".into())
    );
}

#[test]
fn parse_type___struct___name_from_origin() {
    let doc = trait_doc(json!("Struct"), "DemoStruct");

    assert_eq!(
        first_arg_type(&doc).unwrap(),
        AstType::Struct("DemoStruct".into())
    );
}

#[test]
fn parse_type___vec_of_primitive() {
    let doc = trait_doc(json!({ "Vec": "Long" }), "Vec<i64>");

    assert_eq!(
        first_arg_type(&doc).unwrap(),
        AstType::Vec(AstBaseType::Long)
    );
}

#[test]
fn parse_type___unknown_tag___is_fatal_not_void() {
    let doc = trait_doc(json!("Frobnicate"), "Frobnicate");

    let err = first_arg_type(&doc).unwrap_err();

    match err {
        IrError::UnknownType { ty, context } => {
            assert_eq!(ty, "Frobnicate");
            assert!(context.contains("DemoTrait::run"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn parse_type___unknown_vec_element___is_fatal() {
    let doc = trait_doc(json!({ "Vec": "Frobnicate" }), "Vec<Frobnicate>");

    assert!(matches!(
        first_arg_type(&doc),
        Err(IrError::UnknownType { .. })
    ));
}

#[test]
fn parse_type___nested_vec_object___rejected() {
    let doc = trait_doc(json!({ "Vec": { "Vec": "Int" } }), "Vec<Vec<i32>>");

    assert!(matches!(first_arg_type(&doc), Err(IrError::NestedVec(_))));
}

#[test]
fn parse_type___vec_tag_as_element___rejected() {
    let doc = trait_doc(json!({ "Vec": "Vec" }), "Vec<Vec<i32>>");

    assert!(matches!(first_arg_type(&doc), Err(IrError::NestedVec(_))));
}

#[test]
fn parse_type___vec_struct_with_nested_origin___rejected() {
    let doc = trait_doc(json!({ "Vec": "Struct" }), "Vec<Vec<DemoStruct>>");

    assert!(matches!(first_arg_type(&doc), Err(IrError::NestedVec(_))));
}

#[test_case("Callback")]
#[test_case("Void")]
fn parse_type___vec_of_unsupported_element___rejected(tag: &str) {
    let doc = trait_doc(json!({ "Vec": tag }), "Vec<Box<dyn DemoCallback>>");

    assert!(matches!(
        first_arg_type(&doc),
        Err(IrError::UnsupportedShape(_))
    ));
}

#[test_case(json!(42))]
#[test_case(json!(["Int"]))]
#[test_case(json!({ "Option": "Int" }))]
#[test_case(json!({ "Vec": "Int", "extra": 1 }))]
fn parse_type___wrong_shape___rejected(ty: Value) {
    let doc = trait_doc(ty, "i32");

    assert!(matches!(
        first_arg_type(&doc),
        Err(IrError::WrongShape { .. })
    ));
}

// Required keys

#[test_case("name")]
#[test_case("mod_name")]
#[test_case("crate_name")]
#[test_case("is_callback")]
#[test_case("methods")]
fn AstEntity___from_value___missing_trait_key___fatal(key: &str) {
    let mut doc = trait_doc(json!("Int"), "i32");
    doc.as_object_mut().unwrap().remove(key);

    let err = AstEntity::from_value(&doc).unwrap_err();

    assert!(
        matches!(&err, IrError::MissingKey { key: k, .. } if k == key),
        "{err:?}"
    );
}

#[test_case("args")]
#[test_case("return_type")]
#[test_case("origin_return_ty")]
fn AstEntity___from_value___missing_method_key___fatal(key: &str) {
    let mut doc = trait_doc(json!("Int"), "i32");
    doc["methods"][0].as_object_mut().unwrap().remove(key);

    let err = AstEntity::from_value(&doc).unwrap_err();

    assert!(matches!(&err, IrError::MissingKey { key: k, .. } if k == key));
}

#[test_case("ty")]
#[test_case("origin_ty")]
#[test_case("name")]
fn AstEntity___from_value___missing_arg_key___fatal(key: &str) {
    let mut doc = trait_doc(json!("Int"), "i32");
    doc["methods"][0]["args"][0]
        .as_object_mut()
        .unwrap()
        .remove(key);

    let err = AstEntity::from_value(&doc).unwrap_err();

    assert!(matches!(&err, IrError::MissingKey { key: k, .. } if k == key));
}

#[test]
fn AstEntity___from_value___is_callback_not_bool___wrong_shape() {
    let mut doc = trait_doc(json!("Int"), "i32");
    doc["is_callback"] = json!("yes");

    assert!(matches!(
        AstEntity::from_value(&doc),
        Err(IrError::WrongShape { .. })
    ));
}

#[test]
fn AstEntity___from_value___unknown_kind___fatal() {
    let doc = json!({ "ty": "enum", "name": "E" });

    assert!(matches!(
        AstEntity::from_value(&doc),
        Err(IrError::UnknownEntity(kind)) if kind == "enum"
    ));
}

#[test]
fn AstEntity___parse_str___invalid_json___fatal() {
    assert!(matches!(
        AstEntity::parse_str("{ not json"),
        Err(IrError::Json(_))
    ));
}

// Files and directories

#[test]
fn AstEntity___parse_file___error_carries_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, trait_doc(json!("Frobnicate"), "x").to_string()).unwrap();

    let err = AstEntity::parse_file(&path).unwrap_err();

    assert!(err.to_string().contains("broken.json"));
    assert!(matches!(err.root(), IrError::UnknownType { .. }));
}

#[test]
fn list_ast_files___sorted_and_json_only() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["c.json", "a.json", "notes.txt", "b.json"] {
        fs::write(dir.path().join(name), "{}").unwrap();
    }

    let files = list_ast_files(dir.path()).unwrap();

    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.json", "b.json", "c.json"]);
}

#[test]
fn AstResult___load_dir___missing_directory___io_error() {
    let err = AstResult::load_dir(Path::new("/definitely/not/here")).unwrap_err();

    assert!(matches!(err, IrError::Io { .. }));
}
