#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

// parse_origin tests

#[test]
fn parse_origin___simple_ident___single_segment() {
    let expr = parse_origin("DemoStruct").unwrap();

    assert_eq!(expr.path, vec!["DemoStruct"]);
    assert!(expr.args.is_empty());
}

#[test]
fn parse_origin___qualified_path___keeps_segments() {
    let expr = parse_origin("crate::demo::DemoStruct").unwrap();

    assert_eq!(expr.path, vec!["crate", "demo", "DemoStruct"]);
    assert_eq!(expr.base_name(), "DemoStruct");
}

#[test]
fn parse_origin___nested_generics___builds_tree() {
    let expr = parse_origin("HashMap<String, Vec<i32>>").unwrap();

    assert_eq!(expr.base_name(), "HashMap");
    assert_eq!(expr.args.len(), 2);
    assert_eq!(expr.args[1].base_name(), "Vec");
    assert_eq!(expr.args[1].args[0].base_name(), "i32");
}

#[test]
fn parse_origin___reference_with_lifetime___is_transparent() {
    let expr = parse_origin("&'static str").unwrap();

    assert_eq!(expr.base_name(), "str");
}

#[test]
fn parse_origin___dyn_with_bounds___keeps_first_bound() {
    let expr = parse_origin("Box<dyn DemoCallback + Send + Sync>").unwrap();

    assert_eq!(expr.args[0].base_name(), "DemoCallback");
}

#[test_case("Vec<i32"; "unbalanced bracket")]
#[test_case("Vec<>"; "empty generics")]
#[test_case("Vec<i32> extra"; "trailing tokens")]
#[test_case(""; "empty")]
#[test_case("a:b"; "single colon")]
#[test_case("[u8; 4]"; "array syntax")]
fn parse_origin___malformed___returns_invalid_origin(origin: &str) {
    let err = parse_origin(origin).unwrap_err();

    assert!(matches!(err, IrError::InvalidOrigin { .. }), "{err:?}");
}

// vec_element_name tests

#[test]
fn vec_element_name___vec_of_struct___returns_element() {
    assert_eq!(vec_element_name("Vec<DemoStruct>").unwrap(), "DemoStruct");
}

#[test]
fn vec_element_name___qualified_element___returns_last_segment() {
    assert_eq!(
        vec_element_name("Vec<crate::model::DemoStruct>").unwrap(),
        "DemoStruct"
    );
}

#[test]
fn vec_element_name___nested_vec___returns_nested_vec_error() {
    let err = vec_element_name("Vec<Vec<DemoStruct>>").unwrap_err();

    assert!(matches!(err, IrError::NestedVec(_)));
}

#[test]
fn vec_element_name___not_a_vec___returns_invalid_origin() {
    let err = vec_element_name("DemoStruct").unwrap_err();

    assert!(matches!(err, IrError::InvalidOrigin { .. }));
}

// callback_trait_name tests

#[test_case("Box<dyn DemoCallback>", "DemoCallback")]
#[test_case("Arc<dyn DemoCallback>", "DemoCallback")]
#[test_case("Box<dyn DemoCallback + Send>", "DemoCallback")]
#[test_case("&dyn DemoCallback", "DemoCallback")]
#[test_case("DemoCallback", "DemoCallback")]
fn callback_trait_name___unwraps_wrappers(origin: &str, expected: &str) {
    assert_eq!(callback_trait_name(origin).unwrap(), expected);
}

#[test]
fn callback_trait_name___generic_trait___returns_unsupported() {
    let err = callback_trait_name("Box<dyn Handler<i32>>").unwrap_err();

    assert!(matches!(err, IrError::UnsupportedShape(_)));
}

// struct_type_name tests

#[test]
fn struct_type_name___plain___returns_name() {
    assert_eq!(struct_type_name("DemoStruct").unwrap(), "DemoStruct");
}

#[test]
fn struct_type_name___vec_spelling___returns_unsupported() {
    let err = struct_type_name("Vec<DemoStruct>").unwrap_err();

    assert!(matches!(err, IrError::UnsupportedShape(_)));
}
