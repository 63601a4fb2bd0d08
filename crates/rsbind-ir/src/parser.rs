//! JSON AST parser.
//!
//! Each AST document describes one entity, discriminated by its `ty` key:
//!
//! ```json
//! { "ty": "trait", "name": "DemoTrait", "mod_name": "demo", "crate_name": "demo-lib",
//!   "is_callback": false,
//!   "methods": [ { "name": "test_u8_1", "return_type": "Byte", "origin_return_ty": "u8",
//!                  "args": [ { "name": "arg", "ty": "Byte", "origin_ty": "u8" } ] } ] }
//! ```
//!
//! Every key is required. Type values are either a tag string or a
//! single-key object `{"Vec": "<tag>"}`; `Struct` and `Callback` names come
//! from the origin spelling.

use crate::desc::{ArgDesc, AstEntity, AstResult, MethodDesc, StructDesc, TraitDesc};
use crate::error::{IrError, IrResult};
use crate::origin::{callback_trait_name, struct_type_name, vec_element_name};
use crate::types::{AstBaseType, AstType};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

type Object = Map<String, Value>;

impl AstEntity {
    /// Parse one AST file, attaching the path to any error.
    pub fn parse_file(path: &Path) -> IrResult<AstEntity> {
        tracing::debug!("Loading AST document {}", path.display());

        let content = fs::read_to_string(path).map_err(|source| IrError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse_str(&content).map_err(|e| e.in_file(path))
    }

    /// Parse one AST document from a JSON string.
    pub fn parse_str(json: &str) -> IrResult<AstEntity> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Parse one AST document from a decoded JSON value.
    pub fn from_value(value: &Value) -> IrResult<AstEntity> {
        let obj = value.as_object().ok_or_else(|| IrError::WrongShape {
            key: "<root>".into(),
            context: "AST document".into(),
            expected: "an object",
        })?;

        let kind = str_field(obj, "ty", "AST document")?;
        match kind.as_str() {
            "trait" => parse_trait(obj).map(AstEntity::Trait),
            "struct" => parse_struct(obj).map(AstEntity::Struct),
            _ => Err(IrError::UnknownEntity(kind)),
        }
    }
}

impl AstResult {
    /// Load every `*.json` document in `dir`, in lexicographic path order,
    /// and validate cross references.
    pub fn load_dir(dir: &Path) -> IrResult<AstResult> {
        let files = list_ast_files(dir)?;

        let entities = files
            .iter()
            .map(|path| AstEntity::parse_file(path))
            .collect::<IrResult<Vec<_>>>()?;

        let result = AstResult::from_entities(entities);
        result.validate()?;

        tracing::info!(
            traits = result.traits().len(),
            structs = result.structs().len(),
            "Loaded AST from {}",
            dir.display()
        );

        Ok(result)
    }
}

/// List AST documents in `dir`, sorted so repeated runs see the same order.
pub fn list_ast_files(dir: &Path) -> IrResult<Vec<PathBuf>> {
    let io_err = |source| IrError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            files.push(path);
        } else {
            tracing::warn!("Skipping non-JSON file {}", path.display());
        }
    }

    files.sort();
    Ok(files)
}

fn parse_trait(obj: &Object) -> IrResult<TraitDesc> {
    let name = str_field(obj, "name", "trait")?;
    let context = format!("trait {name}");

    let methods = array_field(obj, "methods", &context)?
        .iter()
        .map(|method| parse_method(method, &name))
        .collect::<IrResult<Vec<_>>>()?;

    Ok(TraitDesc {
        module: str_field(obj, "mod_name", &context)?,
        crate_name: str_field(obj, "crate_name", &context)?,
        is_callback: bool_field(obj, "is_callback", &context)?,
        name,
        methods,
    })
}

fn parse_method(value: &Value, trait_name: &str) -> IrResult<MethodDesc> {
    let obj = as_object(value, "methods[]", &format!("trait {trait_name}"))?;
    let name = str_field(obj, "name", &format!("trait {trait_name} method"))?;
    let context = format!("{trait_name}::{name}");

    let origin_return_ty = str_field(obj, "origin_return_ty", &context)?;
    let return_type = parse_type(
        field(obj, "return_type", &context)?,
        &origin_return_ty,
        &format!("{context} return type"),
    )?;

    let args = array_field(obj, "args", &context)?
        .iter()
        .map(|arg| parse_arg(arg, &context))
        .collect::<IrResult<Vec<_>>>()?;

    Ok(MethodDesc {
        name,
        return_type,
        origin_return_ty,
        args,
    })
}

fn parse_struct(obj: &Object) -> IrResult<StructDesc> {
    let name = str_field(obj, "name", "struct")?;
    let context = format!("struct {name}");

    let fields = array_field(obj, "fields", &context)?
        .iter()
        .map(|f| parse_arg(f, &context))
        .collect::<IrResult<Vec<_>>>()?;

    Ok(StructDesc {
        module: str_field(obj, "mod_name", &context)?,
        crate_name: str_field(obj, "crate_name", &context)?,
        name,
        fields,
    })
}

fn parse_arg(value: &Value, owner: &str) -> IrResult<ArgDesc> {
    let obj = as_object(value, "args[]", owner)?;
    let name = str_field(obj, "name", owner)?;
    let context = format!("{owner} `{name}`");

    let origin_ty = str_field(obj, "origin_ty", &context)?;
    let ty = parse_type(field(obj, "ty", &context)?, &origin_ty, &context)?;

    Ok(ArgDesc {
        name,
        ty,
        origin_ty,
    })
}

/// Decode a type value: a tag string or `{"Vec": "<tag>"}`.
fn parse_type(value: &Value, origin: &str, context: &str) -> IrResult<AstType> {
    match value {
        Value::String(tag) => parse_tag(tag, origin, context),
        Value::Object(map) => {
            let inner = match (map.len(), map.get("Vec")) {
                (1, Some(inner)) => inner,
                _ => return Err(type_shape_error(context)),
            };
            match inner {
                Value::String(tag) => parse_base_tag(tag, origin, context).map(AstType::Vec),
                Value::Object(nested) if nested.contains_key("Vec") => {
                    Err(IrError::NestedVec(format!("{origin} in {context}")))
                }
                _ => Err(type_shape_error(context)),
            }
        }
        _ => Err(type_shape_error(context)),
    }
}

fn parse_tag(tag: &str, origin: &str, context: &str) -> IrResult<AstType> {
    let ty = match tag {
        "Void" => AstType::Void,
        "Byte" => AstType::Byte,
        "Short" => AstType::Short,
        "Int" => AstType::Int,
        "Long" => AstType::Long,
        "Float" => AstType::Float,
        "Double" => AstType::Double,
        "String" => AstType::String,
        "Boolean" => AstType::Boolean,
        "Struct" => AstType::Struct(struct_type_name(origin)?),
        "Callback" => AstType::Callback(callback_trait_name(origin)?),
        "Vec" => {
            return Err(IrError::UnsupportedShape(format!(
                "bare `Vec` tag without element type in {context}"
            )));
        }
        other => {
            return Err(IrError::UnknownType {
                ty: other.to_string(),
                context: context.to_string(),
            });
        }
    };
    Ok(ty)
}

fn parse_base_tag(tag: &str, origin: &str, context: &str) -> IrResult<AstBaseType> {
    let base = match tag {
        "Byte" => AstBaseType::Byte,
        "Short" => AstBaseType::Short,
        "Int" => AstBaseType::Int,
        "Long" => AstBaseType::Long,
        "Float" => AstBaseType::Float,
        "Double" => AstBaseType::Double,
        "String" => AstBaseType::String,
        "Boolean" => AstBaseType::Boolean,
        "Struct" => AstBaseType::Struct(vec_element_name(origin)?),
        "Vec" => return Err(IrError::NestedVec(format!("{origin} in {context}"))),
        "Void" | "Callback" => {
            return Err(IrError::UnsupportedShape(format!(
                "Vec<{tag}> in {context}"
            )));
        }
        other => {
            return Err(IrError::UnknownType {
                ty: other.to_string(),
                context: context.to_string(),
            });
        }
    };
    Ok(base)
}

fn type_shape_error(context: &str) -> IrError {
    IrError::WrongShape {
        key: "ty".into(),
        context: context.to_string(),
        expected: "a type tag string or a single-key {\"Vec\": <tag>} object",
    }
}

fn field<'v>(obj: &'v Object, key: &str, context: &str) -> IrResult<&'v Value> {
    obj.get(key).ok_or_else(|| IrError::MissingKey {
        key: key.to_string(),
        context: context.to_string(),
    })
}

fn str_field(obj: &Object, key: &str, context: &str) -> IrResult<String> {
    field(obj, key, context)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| IrError::WrongShape {
            key: key.to_string(),
            context: context.to_string(),
            expected: "a string",
        })
}

fn bool_field(obj: &Object, key: &str, context: &str) -> IrResult<bool> {
    field(obj, key, context)?
        .as_bool()
        .ok_or_else(|| IrError::WrongShape {
            key: key.to_string(),
            context: context.to_string(),
            expected: "a boolean",
        })
}

fn array_field<'v>(obj: &'v Object, key: &str, context: &str) -> IrResult<&'v Vec<Value>> {
    field(obj, key, context)?
        .as_array()
        .ok_or_else(|| IrError::WrongShape {
            key: key.to_string(),
            context: context.to_string(),
            expected: "an array",
        })
}

fn as_object<'v>(value: &'v Value, key: &str, context: &str) -> IrResult<&'v Object> {
    value.as_object().ok_or_else(|| IrError::WrongShape {
        key: key.to_string(),
        context: context.to_string(),
        expected: "an object",
    })
}

#[cfg(test)]
#[path = "parser/parser_tests.rs"]
mod parser_tests;
