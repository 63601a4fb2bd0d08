//! Marshaling engine.
//!
//! Decides, once for every target, how each [`AstType`] crosses the native
//! boundary: the wire representation and the conversion applied on each
//! side. Backends only spell the resulting [`Conversion`]s.
//!
//! | AstType | Wire | Entry (host to wire) | Exit (wire to host) |
//! |---------|------|----------------------|---------------------|
//! | `Boolean` | `I32` | `BoolToWire` | `WireToBool` |
//! | `Byte`..`Double` | `I8`..`F64` | `Cast` | `Cast` |
//! | `String` | `Str` | `PassThrough` | `CopyString` |
//! | `Vec<Byte>` | `Bytes` | `BytesToWire` | `WireToBytes` |
//! | other `Vec`, `Struct` | `Str` | `JsonEncode` | `JsonDecode` |
//! | `Callback` argument | `Model` | `RegisterCallback` | unsupported |
//! | `Callback` return | `Handle` | unsupported | `WrapCallbackProxy` |
//! | `Void` | `Void` | `None` | `None` |

use crate::error::{CodegenError, CodegenResult};
use rsbind_ir::{ArgDesc, AstBaseType, AstType, MethodDesc};

/// Representation of a value on the native boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireType {
    Void,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    /// NUL-terminated UTF-8 (C ABI) or a managed string (JNI)
    Str,
    /// Pointer and length of a byte buffer (C ABI) or a `byte[]` (JNI)
    Bytes,
    /// A native-owned callback object returned to the host
    Handle,
    /// The registration bundle for a host callback of the named interface
    Model(String),
}

/// The conversion applied to one value in one direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    None,
    PassThrough,
    /// Numeric cast to the wire type (entry) or host type (exit)
    Cast,
    BoolToWire,
    WireToBool,
    JsonEncode,
    JsonDecode,
    CopyString,
    /// Host byte array into a wire buffer
    BytesToWire,
    /// Wire buffer copied into a host byte array
    WireToBytes,
    RegisterCallback(String),
    WrapCallbackProxy(String),
}

/// Which side produced the value being converted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Host value becoming a wire value
    Entry,
    /// Wire value becoming a host value
    Exit,
}

/// Where a value appears in a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Argument of a host-to-native call
    Argument,
    /// Result of a host-to-native call
    Return,
    /// Argument a trampoline receives from native code
    CallbackArgument,
    /// Result a trampoline hands back to native code
    CallbackReturn,
}

impl Position {
    pub fn direction(self) -> Direction {
        match self {
            Position::Argument | Position::CallbackReturn => Direction::Entry,
            Position::Return | Position::CallbackArgument => Direction::Exit,
        }
    }
}

/// Who releases string and byte buffers produced on the other side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringOwnership {
    /// Buffers are raw native memory; the receiver of a returned buffer
    /// frees it through the native free function
    NativeFreed,
    /// Strings and byte arrays are managed objects of the host runtime
    Managed,
}

/// The marshaling decision for one value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marshal {
    pub ty: AstType,
    pub wire: WireType,
    pub position: Position,
    pub conversion: Conversion,
    /// The exit conversion must release the native buffer after copying it
    pub frees_native_buffer: bool,
    /// The entry conversion must hand native code a buffer it will own
    pub transfers_ownership: bool,
}

impl Marshal {
    pub fn direction(&self) -> Direction {
        self.position.direction()
    }

    pub fn is_void(&self) -> bool {
        self.wire == WireType::Void
    }
}

/// One argument together with its marshaling decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgPlan<'a> {
    pub arg: &'a ArgDesc,
    pub marshal: Marshal,
}

/// Marshaling decisions for a whole method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodPlan<'a> {
    pub method: &'a MethodDesc,
    /// Wire arguments only; `Void` arguments are dropped
    pub args: Vec<ArgPlan<'a>>,
    pub ret: Marshal,
}

impl MethodPlan<'_> {
    /// Callback interfaces registered by this call, in argument order
    pub fn registered_callbacks(&self) -> impl Iterator<Item = &str> {
        self.args.iter().filter_map(|plan| match &plan.marshal.conversion {
            Conversion::RegisterCallback(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

/// Computes [`Marshal`] decisions for a target's string ownership model
#[derive(Debug, Clone, Copy)]
pub struct MarshalEngine {
    strings: StringOwnership,
}

impl MarshalEngine {
    pub fn new(strings: StringOwnership) -> Self {
        Self { strings }
    }

    /// Wire representation of `ty` at `position`
    pub fn wire_type(&self, ty: &AstType, position: Position) -> CodegenResult<WireType> {
        let wire = match ty {
            AstType::Void => WireType::Void,
            AstType::Byte => WireType::I8,
            AstType::Short => WireType::I16,
            AstType::Int | AstType::Boolean => WireType::I32,
            AstType::Long => WireType::I64,
            AstType::Float => WireType::F32,
            AstType::Double => WireType::F64,
            AstType::Vec(AstBaseType::Byte) => WireType::Bytes,
            AstType::String | AstType::Vec(_) | AstType::Struct(_) => WireType::Str,
            AstType::Callback(name) => match position {
                Position::Argument => WireType::Model(name.clone()),
                Position::Return => WireType::Handle,
                Position::CallbackArgument | Position::CallbackReturn => {
                    return Err(CodegenError::UnsupportedShape(format!(
                        "callback `{name}` passed through another callback"
                    )));
                }
            },
        };
        Ok(wire)
    }

    /// Full marshaling decision for `ty` at `position`
    pub fn plan(&self, ty: &AstType, position: Position) -> CodegenResult<Marshal> {
        let wire = self.wire_type(ty, position)?;
        let direction = position.direction();

        let conversion = match (ty, direction) {
            (AstType::Void, _) => Conversion::None,
            (AstType::Boolean, Direction::Entry) => Conversion::BoolToWire,
            (AstType::Boolean, Direction::Exit) => Conversion::WireToBool,
            (
                AstType::Byte
                | AstType::Short
                | AstType::Int
                | AstType::Long
                | AstType::Float
                | AstType::Double,
                _,
            ) => Conversion::Cast,
            (AstType::String, Direction::Entry) => Conversion::PassThrough,
            (AstType::String, Direction::Exit) => Conversion::CopyString,
            (AstType::Vec(AstBaseType::Byte), Direction::Entry) => Conversion::BytesToWire,
            (AstType::Vec(AstBaseType::Byte), Direction::Exit) => Conversion::WireToBytes,
            (AstType::Vec(_) | AstType::Struct(_), Direction::Entry) => Conversion::JsonEncode,
            (AstType::Vec(_) | AstType::Struct(_), Direction::Exit) => Conversion::JsonDecode,
            (AstType::Callback(name), Direction::Entry) => {
                Conversion::RegisterCallback(name.clone())
            }
            (AstType::Callback(name), Direction::Exit) => {
                Conversion::WrapCallbackProxy(name.clone())
            }
        };

        let native_buffer = self.strings == StringOwnership::NativeFreed
            && matches!(wire, WireType::Str | WireType::Bytes);

        Ok(Marshal {
            ty: ty.clone(),
            wire,
            position,
            conversion,
            frees_native_buffer: native_buffer && position == Position::Return,
            transfers_ownership: native_buffer && position == Position::CallbackReturn,
        })
    }

    /// Plan a call from the host into native code
    pub fn native_call<'a>(&self, method: &'a MethodDesc) -> CodegenResult<MethodPlan<'a>> {
        self.method(method, Position::Argument, Position::Return)
    }

    /// Plan a trampoline invoked by native code on a host callback
    pub fn trampoline<'a>(&self, method: &'a MethodDesc) -> CodegenResult<MethodPlan<'a>> {
        self.method(method, Position::CallbackArgument, Position::CallbackReturn)
    }

    fn method<'a>(
        &self,
        method: &'a MethodDesc,
        arg_position: Position,
        ret_position: Position,
    ) -> CodegenResult<MethodPlan<'a>> {
        let args = method
            .wire_args()
            .map(|arg| {
                Ok(ArgPlan {
                    arg,
                    marshal: self.plan(&arg.ty, arg_position).map_err(|e| {
                        context_error(e, &format!("argument `{}` of `{}`", arg.name, method.name))
                    })?,
                })
            })
            .collect::<CodegenResult<Vec<_>>>()?;

        let ret = self
            .plan(&method.return_type, ret_position)
            .map_err(|e| context_error(e, &format!("return type of `{}`", method.name)))?;

        Ok(MethodPlan { method, args, ret })
    }
}

fn context_error(err: CodegenError, context: &str) -> CodegenError {
    match err {
        CodegenError::UnsupportedShape(msg) => {
            CodegenError::UnsupportedShape(format!("{msg} in {context}"))
        }
        other => other,
    }
}

#[cfg(test)]
#[path = "marshal/marshal_tests.rs"]
mod marshal_tests;
