#![allow(non_snake_case)]

use super::*;
use rsbind_ir::AstBaseType;
use test_case::test_case;

fn swift() -> MarshalEngine {
    MarshalEngine::new(StringOwnership::NativeFreed)
}

fn kotlin() -> MarshalEngine {
    MarshalEngine::new(StringOwnership::Managed)
}

fn arg(name: &str, ty: AstType) -> ArgDesc {
    ArgDesc {
        name: name.into(),
        ty,
        origin_ty: String::new(),
    }
}

fn method(args: Vec<ArgDesc>, return_type: AstType) -> MethodDesc {
    MethodDesc {
        name: "test_arg_callback_16".into(),
        return_type,
        origin_return_ty: String::new(),
        args,
    }
}

#[test_case(AstType::Byte, WireType::I8)]
#[test_case(AstType::Short, WireType::I16)]
#[test_case(AstType::Int, WireType::I32)]
#[test_case(AstType::Long, WireType::I64)]
#[test_case(AstType::Float, WireType::F32)]
#[test_case(AstType::Double, WireType::F64)]
#[test_case(AstType::Boolean, WireType::I32)]
#[test_case(AstType::String, WireType::Str)]
#[test_case(AstType::Vec(AstBaseType::Int), WireType::Str)]
#[test_case(AstType::Vec(AstBaseType::Byte), WireType::Bytes)]
#[test_case(AstType::Struct("DemoStruct".into()), WireType::Str)]
#[test_case(AstType::Void, WireType::Void)]
fn MarshalEngine___wire_type___value_types(ty: AstType, expected: WireType) {
    assert_eq!(swift().wire_type(&ty, Position::Argument).unwrap(), expected);
    assert_eq!(kotlin().wire_type(&ty, Position::Return).unwrap(), expected);
}

#[test]
fn MarshalEngine___wire_type___callback_depends_on_position() {
    let ty = AstType::Callback("DemoCallback".into());

    assert_eq!(
        swift().wire_type(&ty, Position::Argument).unwrap(),
        WireType::Model("DemoCallback".into())
    );
    assert_eq!(
        swift().wire_type(&ty, Position::Return).unwrap(),
        WireType::Handle
    );
}

#[test_case(Position::CallbackArgument)]
#[test_case(Position::CallbackReturn)]
fn MarshalEngine___plan___callback_inside_callback___unsupported(position: Position) {
    let err = swift()
        .plan(&AstType::Callback("DemoCallback".into()), position)
        .unwrap_err();

    assert!(matches!(err, CodegenError::UnsupportedShape(_)));
}

#[test_case(AstType::Boolean, Position::Argument, Conversion::BoolToWire)]
#[test_case(AstType::Boolean, Position::Return, Conversion::WireToBool)]
#[test_case(AstType::Boolean, Position::CallbackArgument, Conversion::WireToBool)]
#[test_case(AstType::Boolean, Position::CallbackReturn, Conversion::BoolToWire)]
#[test_case(AstType::Long, Position::Argument, Conversion::Cast)]
#[test_case(AstType::Double, Position::Return, Conversion::Cast)]
#[test_case(AstType::String, Position::Argument, Conversion::PassThrough)]
#[test_case(AstType::String, Position::Return, Conversion::CopyString)]
#[test_case(AstType::Struct("S".into()), Position::Argument, Conversion::JsonEncode)]
#[test_case(AstType::Vec(AstBaseType::Long), Position::CallbackArgument, Conversion::JsonDecode)]
#[test_case(AstType::Vec(AstBaseType::Byte), Position::Argument, Conversion::BytesToWire)]
#[test_case(AstType::Vec(AstBaseType::Byte), Position::Return, Conversion::WireToBytes)]
#[test_case(AstType::Vec(AstBaseType::Byte), Position::CallbackArgument, Conversion::WireToBytes)]
#[test_case(AstType::Vec(AstBaseType::Byte), Position::CallbackReturn, Conversion::BytesToWire)]
#[test_case(AstType::Void, Position::Return, Conversion::None)]
fn MarshalEngine___plan___conversion_table(ty: AstType, position: Position, expected: Conversion) {
    assert_eq!(swift().plan(&ty, position).unwrap().conversion, expected);
}

#[test]
fn MarshalEngine___plan___returned_native_string_is_freed_on_c_abi() {
    for ty in [
        AstType::String,
        AstType::Struct("DemoStruct".into()),
        AstType::Vec(AstBaseType::Struct("DemoStruct".into())),
    ] {
        let plan = swift().plan(&ty, Position::Return).unwrap();
        assert!(plan.frees_native_buffer, "{ty}");
        assert!(!plan.transfers_ownership, "{ty}");
    }
}

#[test]
fn MarshalEngine___plan___byte_buffers_follow_string_ownership() {
    let ty = AstType::Vec(AstBaseType::Byte);

    let returned = swift().plan(&ty, Position::Return).unwrap();
    let borrowed = swift().plan(&ty, Position::CallbackArgument).unwrap();
    let handed_over = swift().plan(&ty, Position::CallbackReturn).unwrap();
    let managed = kotlin().plan(&ty, Position::Return).unwrap();

    assert!(returned.frees_native_buffer);
    assert!(!borrowed.frees_native_buffer);
    assert!(handed_over.transfers_ownership);
    assert!(!managed.frees_native_buffer);
}

#[test]
fn MarshalEngine___plan___borrowed_callback_string_is_not_freed() {
    let plan = swift()
        .plan(&AstType::String, Position::CallbackArgument)
        .unwrap();

    assert!(!plan.frees_native_buffer);
}

#[test]
fn MarshalEngine___plan___callback_return_string_transfers_ownership() {
    let plan = swift()
        .plan(&AstType::String, Position::CallbackReturn)
        .unwrap();

    assert!(plan.transfers_ownership);
    assert_eq!(plan.conversion, Conversion::PassThrough);
}

#[test]
fn MarshalEngine___plan___managed_strings_never_freed() {
    for position in [
        Position::Argument,
        Position::Return,
        Position::CallbackArgument,
        Position::CallbackReturn,
    ] {
        let plan = kotlin().plan(&AstType::String, position).unwrap();
        assert!(!plan.frees_native_buffer);
        assert!(!plan.transfers_ownership);
    }
}

#[test]
fn MarshalEngine___plan___scalars_never_touch_strings() {
    let plan = swift().plan(&AstType::Int, Position::Return).unwrap();

    assert!(!plan.frees_native_buffer);
    assert!(!plan.transfers_ownership);
}

#[test]
fn MarshalEngine___native_call___registers_callback_argument() {
    let desc = method(
        vec![arg("arg", AstType::Callback("DemoCallback".into()))],
        AstType::Byte,
    );

    let plan = swift().native_call(&desc).unwrap();

    assert_eq!(plan.args.len(), 1);
    assert_eq!(
        plan.args[0].marshal.conversion,
        Conversion::RegisterCallback("DemoCallback".into())
    );
    assert_eq!(plan.ret.wire, WireType::I8);
    assert_eq!(plan.ret.conversion, Conversion::Cast);
    assert_eq!(
        plan.registered_callbacks().collect::<Vec<_>>(),
        vec!["DemoCallback"]
    );
}

#[test]
fn MarshalEngine___native_call___drops_void_arguments() {
    let desc = method(
        vec![arg("nothing", AstType::Void), arg("x", AstType::Int)],
        AstType::Void,
    );

    let plan = kotlin().native_call(&desc).unwrap();

    assert_eq!(plan.args.len(), 1);
    assert_eq!(plan.args[0].arg.name, "x");
    assert!(plan.ret.is_void());
}

#[test]
fn MarshalEngine___native_call___returned_callback_wraps_proxy() {
    let desc = method(vec![], AstType::Callback("DemoCallback".into()));

    let plan = kotlin().native_call(&desc).unwrap();

    assert_eq!(plan.ret.wire, WireType::Handle);
    assert_eq!(
        plan.ret.conversion,
        Conversion::WrapCallbackProxy("DemoCallback".into())
    );
}

#[test]
fn MarshalEngine___trampoline___exit_converts_args_and_entry_converts_result() {
    let desc = method(
        vec![arg("flag", AstType::Boolean), arg("name", AstType::String)],
        AstType::Boolean,
    );

    let plan = swift().trampoline(&desc).unwrap();

    assert_eq!(plan.args[0].marshal.direction(), Direction::Exit);
    assert_eq!(plan.args[0].marshal.conversion, Conversion::WireToBool);
    assert_eq!(plan.args[1].marshal.conversion, Conversion::CopyString);
    assert_eq!(plan.ret.direction(), Direction::Entry);
    assert_eq!(plan.ret.conversion, Conversion::BoolToWire);
}

#[test]
fn MarshalEngine___trampoline___callback_argument___error_names_method() {
    let desc = method(
        vec![arg("cb", AstType::Callback("DemoCallback".into()))],
        AstType::Void,
    );

    let err = swift().trampoline(&desc).unwrap_err();

    assert!(err.to_string().contains("test_arg_callback_16"), "{err}");
}
