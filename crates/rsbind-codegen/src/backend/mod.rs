//! Per-language backends.
//!
//! A backend has two halves:
//! - [`Syntax`], used by the [`Renderer`](crate::render::Renderer) to spell
//!   declarations, modifiers, imports and types
//! - [`Backend`], used by the generators to spell the statements of the
//!   marshaling protocol and the few declarations whose shape differs per
//!   language (registries, trampolines, proxy release)
//!
//! Everything else (which conversions run, in what order, which trampolines
//! exist) is decided once in [`marshal`](crate::marshal) and
//! [`generator`](crate::generator).

mod kotlin;
mod swift;

pub use kotlin::KotlinBackend;
pub use swift::SwiftBackend;

use crate::config::{GenConfig, Lang};
use crate::error::CodegenResult;
use crate::marshal::{Marshal, StringOwnership};
use crate::model::{CodeBlock, FieldSpec, Member, MethodSpec, Modifier, ParamSpec, TypeRef, TypeSpec, TypeSpecBuilder};
use crate::naming::{decapitalize, escape_keyword, to_camel_case};
use rsbind_ir::{AstResult, AstType, TraitDesc};

/// Create the backend for `lang`
pub fn for_lang(lang: Lang) -> Box<dyn Backend> {
    match lang {
        Lang::Swift => Box::new(SwiftBackend),
        Lang::Kotlin => Box::new(KotlinBackend),
    }
}

/// Opening line(s) of a type declaration.
///
/// When `params` is non-empty the renderer emits `lead(`, one indented
/// parameter per line, then `)tail`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeHeader {
    pub lead: String,
    pub params: Vec<String>,
    pub tail: String,
}

/// Declaration syntax of a target language
pub trait Syntax {
    /// Types every file can name without declaring or importing them
    fn is_builtin(&self, name: &str) -> bool;

    fn render_type(&self, ty: &TypeRef) -> String;

    fn import_line(&self, import: &str) -> String {
        format!("import {import}")
    }

    fn package_line(&self, _package: &str) -> Option<String> {
        None
    }

    fn comment(&self, text: &str) -> String {
        format!("// {text}")
    }

    fn doc_lines(&self, docs: &[String]) -> Vec<String>;

    fn annotation(&self, annotation: &TypeRef) -> String {
        format!("@{}", self.render_type(annotation))
    }

    fn type_header(&self, spec: &TypeSpec) -> TypeHeader;

    /// Members implied by constructor properties, rendered before the
    /// declared members
    fn synthesized_members(&self, spec: &TypeSpec) -> Vec<Member>;

    /// Whether a type with no body members is rendered without braces
    fn omit_empty_body(&self, spec: &TypeSpec) -> bool;

    /// Annotation lines followed by the signature, without the opening brace
    fn method_header(&self, spec: &MethodSpec) -> Vec<String>;

    /// Field declaration without its initializer
    fn field_decl(&self, spec: &FieldSpec) -> String;

    /// Opening of a closure literal taking `params`
    fn closure_open(&self, params: &[String]) -> String;
}

/// Native symbol a generated call targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeSymbol<'a> {
    /// Native implementation of a service method
    Method(&'a str),
    /// Native implementation of a method on a native-owned callback object
    CallbackMethod { callback: &'a str, method: &'a str },
    /// Releases a native-owned callback object
    CallbackFree(&'a str),
    /// Releases a string buffer returned by native code
    FreeString,
    /// Releases a byte buffer returned by native code
    FreeBytes,
}

/// What the generators know about the entity being generated
#[derive(Debug, Clone, Copy)]
pub struct BindingContext<'a> {
    pub ast: &'a AstResult,
    pub config: &'a GenConfig,
    /// Native module of the trait (`mod_name`)
    pub native_module: &'a str,
    /// Crate that exports the native functions
    pub crate_name: &'a str,
    /// Host type that owns trampolines and native declarations
    pub owner: &'a str,
}

impl<'a> BindingContext<'a> {
    pub fn for_trait(ast: &'a AstResult, config: &'a GenConfig, desc: &'a TraitDesc) -> Self {
        Self {
            ast,
            config,
            native_module: &desc.module,
            crate_name: &desc.crate_name,
            owner: &desc.name,
        }
    }

    /// Same context, with native declarations owned by `owner`
    pub fn with_owner(self, owner: &'a str) -> Self {
        Self { owner, ..self }
    }
}

/// An argument of a generated call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallArg {
    /// Swift argument label
    pub label: Option<String>,
    pub value: String,
}

impl CallArg {
    pub fn positional(value: impl Into<String>) -> Self {
        Self {
            label: None,
            value: value.into(),
        }
    }

    pub fn labeled(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            value: value.into(),
        }
    }
}

/// Statement spelling and language-specific declarations
pub trait Backend: Syntax {
    fn lang(&self) -> Lang;

    /// Name of the single artifact for `module_name`
    fn file_name(&self, module_name: &str) -> String;

    fn string_ownership(&self) -> StringOwnership;

    fn keywords(&self) -> &'static [&'static str];

    /// Imports every artifact needs regardless of content
    fn file_imports(&self, config: &GenConfig) -> Vec<String>;

    fn package(&self, _config: &GenConfig) -> Option<String> {
        None
    }

    /// Host-facing type for `ty`
    fn host_type(&self, ty: &AstType) -> TypeRef;

    /// Wire-level type for a planned value; `None` for `Void`
    fn wire_type(&self, ctx: &BindingContext<'_>, marshal: &Marshal) -> Option<TypeRef>;

    /// Type of a callback handle on the boundary
    fn handle_type(&self) -> TypeRef;

    /// Mark a record type as JSON-serializable
    fn serializable(&self, spec: TypeSpecBuilder) -> TypeSpecBuilder;

    /// Host-facing identifier for a native name
    fn host_name(&self, native: &str) -> String {
        escape_keyword(&to_camel_case(native), self.keywords())
    }

    /// Identifier used in declarations for a native symbol
    fn native_name(&self, ctx: &BindingContext<'_>, symbol: NativeSymbol<'_>) -> String;

    /// Expression used to call a native symbol from generated code
    fn native_callee(&self, ctx: &BindingContext<'_>, symbol: NativeSymbol<'_>) -> String {
        self.native_name(ctx, symbol)
    }

    /// Immutable local binding
    fn bind(&self, name: &str, expr: &str) -> String;

    fn call(&self, callee: &str, args: &[CallArg]) -> String;

    /// Statements binding `output` to `input` converted per `marshal`
    fn convert(
        &self,
        ctx: &BindingContext<'_>,
        marshal: &Marshal,
        input: &str,
        output: &str,
    ) -> CodegenResult<CodeBlock>;

    /// Registry helper type; every registry instance issues its own handles
    fn registry_prelude(&self) -> Vec<Member>;

    /// Registry instance for one callback interface
    fn registry_declaration(&self, callback: &str) -> Member;

    /// Runs once when the service type is loaded
    fn namespace_init(&self, _ctx: &BindingContext<'_>) -> Option<MethodSpec> {
        None
    }

    /// Declaration of a native function, when the language needs one
    fn native_declaration(
        &self,
        name: String,
        visibility: Modifier,
        params: Vec<ParamSpec>,
        returns: Option<TypeRef>,
    ) -> Option<MethodSpec>;

    /// A function native code can call with a callback handle
    fn trampoline(
        &self,
        name: String,
        params: Vec<ParamSpec>,
        returns: Option<TypeRef>,
        body: CodeBlock,
    ) -> Member;

    /// Extra supertypes of a callback proxy
    fn proxy_supertypes(&self) -> Vec<TypeRef> {
        Vec::new()
    }

    /// Members that free the native handle exactly once
    fn proxy_release(&self, free_call: &str) -> Vec<Member>;
}

/// C symbol exported by `rsbind-runtime` that releases returned strings
pub const FREE_STRING_SYMBOL: &str = "rsbind_free_str";

/// C symbol exported by `rsbind-runtime` that releases returned byte buffers
pub const FREE_BYTES_SYMBOL: &str = "rsbind_free_bytes";

/// Registry instance holding host callbacks of one interface
pub fn registry_name(callback: &str) -> String {
    format!("{}Registry", decapitalize(callback))
}

/// Trampoline invoking `method` on a registered callback
pub fn trampoline_name(callback: &str, method: &str) -> String {
    format!("invoke_{callback}_{method}")
}

/// Trampoline removing a registered callback
pub fn free_trampoline_name(callback: &str) -> String {
    format!("free_{callback}")
}

/// Host type wrapping a native-owned callback object
pub fn proxy_name(callback: &str) -> String {
    format!("{callback}Proxy")
}

/// Render `modifiers` in the order given by `spell`, dropping the ones it
/// maps to `None`. The result is empty or ends with a space.
pub(crate) fn modifier_prefix(
    modifiers: &[Modifier],
    spell: impl Fn(Modifier) -> Option<(u8, &'static str)>,
) -> String {
    let mut words: Vec<(u8, &str)> = modifiers.iter().filter_map(|m| spell(*m)).collect();
    words.sort();
    words.dedup();

    words.iter().map(|(_, word)| format!("{word} ")).collect()
}
