//! The closed type set that can cross the native boundary.
//!
//! | Tag | Native spellings | Notes |
//! |-----|------------------|-------|
//! | `Void` | `()` | return position only |
//! | `Byte` | `u8`, `i8` | |
//! | `Short` | `u16`, `i16` | |
//! | `Int` | `u32`, `i32`, `usize`, `isize` | |
//! | `Long` | `u64`, `i64` | |
//! | `Float` / `Double` | `f32` / `f64` | |
//! | `String` | `String`, `&str` | |
//! | `Boolean` | `bool` | |
//! | `Vec` | `Vec<T>` | exactly one level, `T` is an [`AstBaseType`] |
//! | `Callback` | `Box<dyn Trait>` | trait must be a callback interface |
//! | `Struct` | any other name | serialized as JSON |

use std::fmt;

/// Element types allowed inside a vector.
///
/// This is [`AstType`] minus `Void`, `Vec` and `Callback`, so a vector of
/// vectors or a vector of callbacks cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AstBaseType {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    Boolean,
    /// A struct element, named after the element of the origin spelling.
    Struct(String),
}

/// A type that can appear as an argument, field or return value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AstType {
    Void,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    Boolean,
    Vec(AstBaseType),
    /// A callback interface, by trait name.
    Callback(String),
    /// A plain data struct, by struct name.
    Struct(String),
}

impl AstBaseType {
    /// The JSON tag for this element type
    pub fn tag(&self) -> &'static str {
        match self {
            AstBaseType::Byte => "Byte",
            AstBaseType::Short => "Short",
            AstBaseType::Int => "Int",
            AstBaseType::Long => "Long",
            AstBaseType::Float => "Float",
            AstBaseType::Double => "Double",
            AstBaseType::String => "String",
            AstBaseType::Boolean => "Boolean",
            AstBaseType::Struct(_) => "Struct",
        }
    }
}

impl AstType {
    /// The JSON tag for this type
    pub fn tag(&self) -> &'static str {
        match self {
            AstType::Void => "Void",
            AstType::Byte => "Byte",
            AstType::Short => "Short",
            AstType::Int => "Int",
            AstType::Long => "Long",
            AstType::Float => "Float",
            AstType::Double => "Double",
            AstType::String => "String",
            AstType::Boolean => "Boolean",
            AstType::Vec(_) => "Vec",
            AstType::Callback(_) => "Callback",
            AstType::Struct(_) => "Struct",
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, AstType::Void)
    }

    /// Whether values of this type are numbers or booleans on the wire
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            AstType::Byte
                | AstType::Short
                | AstType::Int
                | AstType::Long
                | AstType::Float
                | AstType::Double
                | AstType::Boolean
        )
    }

    /// Whether values of this type cross the boundary as a JSON document
    pub fn is_json(&self) -> bool {
        matches!(self, AstType::Vec(_) | AstType::Struct(_))
    }

    pub fn is_callback(&self) -> bool {
        matches!(self, AstType::Callback(_))
    }

    /// The callback interface name, if this is a callback
    pub fn callback_name(&self) -> Option<&str> {
        match self {
            AstType::Callback(name) => Some(name),
            _ => None,
        }
    }

    /// The struct this type refers to, directly or as a vector element
    pub fn struct_name(&self) -> Option<&str> {
        match self {
            AstType::Struct(name) | AstType::Vec(AstBaseType::Struct(name)) => Some(name),
            _ => None,
        }
    }
}

impl From<AstBaseType> for AstType {
    fn from(base: AstBaseType) -> Self {
        match base {
            AstBaseType::Byte => AstType::Byte,
            AstBaseType::Short => AstType::Short,
            AstBaseType::Int => AstType::Int,
            AstBaseType::Long => AstType::Long,
            AstBaseType::Float => AstType::Float,
            AstBaseType::Double => AstType::Double,
            AstBaseType::String => AstType::String,
            AstBaseType::Boolean => AstType::Boolean,
            AstBaseType::Struct(name) => AstType::Struct(name),
        }
    }
}

impl fmt::Display for AstBaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AstBaseType::Struct(name) => write!(f, "Struct({name})"),
            other => f.write_str(other.tag()),
        }
    }
}

impl fmt::Display for AstType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AstType::Vec(base) => write!(f, "Vec<{base}>"),
            AstType::Callback(name) => write!(f, "Callback({name})"),
            AstType::Struct(name) => write!(f, "Struct({name})"),
            other => f.write_str(other.tag()),
        }
    }
}
