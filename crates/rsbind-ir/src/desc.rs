//! Descriptions of the entities declared by the native library.
//!
//! A generation run parses one [`AstEntity`] per JSON document and
//! aggregates them into an [`AstResult`], which is immutable afterwards.

use crate::error::{IrError, IrResult};
use crate::types::AstType;
use std::collections::BTreeSet;

/// A method argument or struct field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgDesc {
    pub name: String,
    pub ty: AstType,
    /// Native spelling, e.g. `Vec<DemoStruct>` or `Box<dyn DemoCallback>`
    pub origin_ty: String,
}

/// A trait method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDesc {
    pub name: String,
    pub return_type: AstType,
    pub origin_return_ty: String,
    pub args: Vec<ArgDesc>,
}

impl MethodDesc {
    /// Arguments that cross the boundary (`Void` arguments are omitted)
    pub fn wire_args(&self) -> impl Iterator<Item = &ArgDesc> {
        self.args.iter().filter(|arg| !arg.ty.is_void())
    }

    /// Whether any argument or the return value is a callback
    pub fn uses_callbacks(&self) -> bool {
        self.return_type.is_callback() || self.args.iter().any(|arg| arg.ty.is_callback())
    }
}

/// A native trait: either a service surface or a callback interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitDesc {
    pub name: String,
    pub module: String,
    pub crate_name: String,
    /// Callback interfaces are implemented by the host, never natively.
    pub is_callback: bool,
    pub methods: Vec<MethodDesc>,
}

impl TraitDesc {
    /// Callback interfaces taken as arguments, in order of first use
    pub fn callback_args(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for method in &self.methods {
            for arg in &method.args {
                if let Some(name) = arg.ty.callback_name() {
                    if !seen.contains(&name) {
                        seen.push(name);
                    }
                }
            }
        }
        seen
    }

    /// Callback interfaces returned by methods, in order of first use
    pub fn callback_returns(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for method in &self.methods {
            if let Some(name) = method.return_type.callback_name() {
                if !seen.contains(&name) {
                    seen.push(name);
                }
            }
        }
        seen
    }
}

/// A plain data struct, always serialized as JSON across the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDesc {
    pub name: String,
    pub module: String,
    pub crate_name: String,
    /// Fields in declaration order
    pub fields: Vec<ArgDesc>,
}

/// One parsed AST document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstEntity {
    Trait(TraitDesc),
    Struct(StructDesc),
}

impl AstEntity {
    pub fn name(&self) -> &str {
        match self {
            AstEntity::Trait(desc) => &desc.name,
            AstEntity::Struct(desc) => &desc.name,
        }
    }
}

/// All entities of one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AstResult {
    traits: Vec<TraitDesc>,
    structs: Vec<StructDesc>,
}

impl AstResult {
    pub fn new(traits: Vec<TraitDesc>, structs: Vec<StructDesc>) -> Self {
        Self { traits, structs }
    }

    /// Aggregate entities, keeping their order
    pub fn from_entities(entities: impl IntoIterator<Item = AstEntity>) -> Self {
        let mut result = Self::default();
        for entity in entities {
            match entity {
                AstEntity::Trait(desc) => result.traits.push(desc),
                AstEntity::Struct(desc) => result.structs.push(desc),
            }
        }
        result
    }

    pub fn traits(&self) -> &[TraitDesc] {
        &self.traits
    }

    pub fn structs(&self) -> &[StructDesc] {
        &self.structs
    }

    /// Callback-interface traits
    pub fn callbacks(&self) -> impl Iterator<Item = &TraitDesc> {
        self.traits.iter().filter(|desc| desc.is_callback)
    }

    /// Service traits backed by native functions
    pub fn services(&self) -> impl Iterator<Item = &TraitDesc> {
        self.traits.iter().filter(|desc| !desc.is_callback)
    }

    /// Look up a callback interface by name
    pub fn callback(&self, name: &str) -> Option<&TraitDesc> {
        self.callbacks().find(|desc| desc.name == name)
    }

    /// Look up a struct by name
    pub fn struct_desc(&self, name: &str) -> Option<&StructDesc> {
        self.structs.iter().find(|desc| desc.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.traits.is_empty() && self.structs.is_empty()
    }

    /// Check the cross-reference invariants.
    ///
    /// - entity names are unique
    /// - every `Callback(name)` resolves to a callback-interface trait
    /// - every struct reference resolves to a parsed struct
    /// - callback interfaces and struct fields do not nest callbacks
    pub fn validate(&self) -> IrResult<()> {
        let mut names = BTreeSet::new();
        let all_names = self
            .traits
            .iter()
            .map(|desc| &desc.name)
            .chain(self.structs.iter().map(|desc| &desc.name));
        for name in all_names {
            if !names.insert(name.as_str()) {
                return Err(IrError::DuplicateEntity(name.clone()));
            }
        }

        for desc in &self.traits {
            for method in &desc.methods {
                let owner = format!("{}::{}", desc.name, method.name);
                let types = method
                    .args
                    .iter()
                    .map(|arg| &arg.ty)
                    .chain(std::iter::once(&method.return_type));

                for ty in types {
                    if let Some(callback) = ty.callback_name() {
                        if desc.is_callback {
                            return Err(IrError::UnsupportedShape(format!(
                                "callback interface {owner} passes callback `{callback}`"
                            )));
                        }
                        if self.callback(callback).is_none() {
                            return Err(IrError::UnresolvedCallback {
                                callback: callback.to_string(),
                                trait_name: desc.name.clone(),
                                method: method.name.clone(),
                            });
                        }
                    }
                    self.check_struct_ref(ty, &owner)?;
                }
            }
        }

        for desc in &self.structs {
            for field in &desc.fields {
                let owner = format!("{}.{}", desc.name, field.name);
                if field.ty.is_void() || field.ty.is_callback() {
                    return Err(IrError::UnsupportedShape(format!(
                        "struct field {owner} of type {}",
                        field.ty
                    )));
                }
                self.check_struct_ref(&field.ty, &owner)?;
            }
        }

        Ok(())
    }

    fn check_struct_ref(&self, ty: &AstType, owner: &str) -> IrResult<()> {
        match ty.struct_name() {
            Some(name) if self.struct_desc(name).is_none() => Err(IrError::UnresolvedStruct {
                name: name.to_string(),
                owner: owner.to_string(),
            }),
            _ => Ok(()),
        }
    }
}
