//! Kotlin backend.
//!
//! Bindings go through JNI: the service type is an `object` that loads the
//! native library on first use and declares its native functions as
//! `external`. Strings and byte arrays are managed by the JVM, so nothing is
//! freed by hand; a `ByteArray` reaches JNI as a `byte[]` without a JSON
//! detour.
//! A registered callback is handed to native code as its `Long` handle.

use super::{
    modifier_prefix, proxy_name, registry_name, Backend, BindingContext, CallArg, NativeSymbol,
    Syntax, TypeHeader,
};
use crate::config::{GenConfig, Lang};
use crate::error::CodegenResult;
use crate::marshal::{Conversion, Direction, Marshal, StringOwnership, WireType};
use crate::model::{
    CodeBlock, FieldSpec, Member, MethodKind, MethodSpec, Modifier, ParamSpec, TypeKind,
    TypeParam, TypeRef, TypeSpec, TypeSpecBuilder,
};
use crate::naming::to_pascal_case;
use rsbind_ir::{AstBaseType, AstType};

const KEYWORDS: &[&str] = &[
    "as", "break", "class", "continue", "do", "else", "false", "for", "fun", "if", "in",
    "interface", "is", "null", "object", "package", "return", "super", "this", "throw", "true",
    "try", "typealias", "typeof", "val", "var", "when", "while",
];

const BUILTINS: &[&str] = &[
    "Byte",
    "Short",
    "Int",
    "Long",
    "Float",
    "Double",
    "Boolean",
    "String",
    "ByteArray",
    "Unit",
    "Any",
    "List",
    "Map",
    "AutoCloseable",
];

const JSON: &str = "kotlinx.serialization.json.Json";

/// Generates Kotlin bindings over JNI
#[derive(Debug, Clone, Copy, Default)]
pub struct KotlinBackend;

impl KotlinBackend {
    fn modifiers(modifiers: &[Modifier]) -> String {
        modifier_prefix(modifiers, |m| match m {
            Modifier::Internal => Some((0, "internal")),
            Modifier::Private => Some((0, "private")),
            Modifier::Override => Some((1, "override")),
            Modifier::External => Some((2, "external")),
            Modifier::Public | Modifier::Final | Modifier::Static => None,
        })
    }

    fn params(&self, params: &[ParamSpec]) -> String {
        params
            .iter()
            .map(|p| format!("{}: {}", p.name, self.render_type(&p.ty)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn type_params(&self, params: &[TypeParam]) -> String {
        if params.is_empty() {
            return String::new();
        }
        let rendered: Vec<String> = params
            .iter()
            .map(|p| match &p.bound {
                Some(bound) => format!("{} : {}", p.name, self.render_type(bound)),
                None => p.name.clone(),
            })
            .collect();
        format!("<{}>", rendered.join(", "))
    }

    fn host_base(base: &AstBaseType) -> TypeRef {
        Self::host(&AstType::from(base.clone()))
    }

    fn host(ty: &AstType) -> TypeRef {
        match ty {
            AstType::Void => TypeRef::named("Unit"),
            AstType::Byte => TypeRef::named("Byte"),
            AstType::Short => TypeRef::named("Short"),
            AstType::Int => TypeRef::named("Int"),
            AstType::Long => TypeRef::named("Long"),
            AstType::Float => TypeRef::named("Float"),
            AstType::Double => TypeRef::named("Double"),
            AstType::String => TypeRef::named("String"),
            AstType::Boolean => TypeRef::named("Boolean"),
            AstType::Vec(AstBaseType::Byte) => TypeRef::named("ByteArray"),
            AstType::Vec(base) => TypeRef::array(Self::host_base(base)),
            AstType::Callback(name) | AstType::Struct(name) => TypeRef::named(name.as_str()),
        }
    }
}

impl Syntax for KotlinBackend {
    fn is_builtin(&self, name: &str) -> bool {
        BUILTINS.contains(&name)
    }

    fn render_type(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Named { name, args, .. } if args.is_empty() => name.clone(),
            TypeRef::Named { name, args, .. } => {
                let args: Vec<String> = args.iter().map(|a| self.render_type(a)).collect();
                format!("{name}<{}>", args.join(", "))
            }
            TypeRef::Array(element) => format!("List<{}>", self.render_type(element)),
            TypeRef::Map(key, value) => {
                format!("Map<{}, {}>", self.render_type(key), self.render_type(value))
            }
            TypeRef::Optional(inner) => format!("{}?", self.render_type(inner)),
            TypeRef::Function { params, ret, .. } => {
                let params: Vec<String> = params.iter().map(|p| self.render_type(p)).collect();
                format!("({}) -> {}", params.join(", "), self.render_type(ret))
            }
        }
    }

    fn package_line(&self, package: &str) -> Option<String> {
        Some(format!("package {package}"))
    }

    fn doc_lines(&self, docs: &[String]) -> Vec<String> {
        match docs {
            [] => Vec::new(),
            [single] => vec![format!("/** {single} */")],
            lines => {
                let mut out = vec!["/**".to_string()];
                out.extend(lines.iter().map(|line| format!(" * {line}")));
                out.push(" */".to_string());
                out
            }
        }
    }

    fn type_header(&self, spec: &TypeSpec) -> TypeHeader {
        let mods = Self::modifiers(&spec.modifiers);
        let type_params = self.type_params(&spec.type_params);

        let lead = match spec.kind {
            TypeKind::Record => format!("{mods}data class {}{type_params}", spec.name),
            TypeKind::Interface => format!("{mods}interface {}{type_params}", spec.name),
            TypeKind::Namespace => format!("{mods}object {}", spec.name),
            TypeKind::Class => {
                let ctor = Self::modifiers(&spec.constructor_modifiers);
                if spec.properties.is_empty() || ctor.is_empty() {
                    format!("{mods}class {}{type_params}", spec.name)
                } else {
                    format!("{mods}class {}{type_params} {ctor}constructor", spec.name)
                }
            }
        };

        let params = spec
            .properties
            .iter()
            .map(|p| self.field_decl(p))
            .collect();

        let supertypes: Vec<String> = spec
            .supertypes
            .iter()
            .map(|s| self.render_type(s))
            .collect();
        let tail = if supertypes.is_empty() {
            String::new()
        } else {
            format!(" : {}", supertypes.join(", "))
        };

        TypeHeader { lead, params, tail }
    }

    fn synthesized_members(&self, _spec: &TypeSpec) -> Vec<Member> {
        Vec::new()
    }

    fn omit_empty_body(&self, spec: &TypeSpec) -> bool {
        spec.kind == TypeKind::Record && spec.members.is_empty()
    }

    fn method_header(&self, spec: &MethodSpec) -> Vec<String> {
        let mut lines: Vec<String> = spec.annotations.iter().map(|a| self.annotation(a)).collect();
        if spec.has_modifier(Modifier::Static) {
            lines.push("@JvmStatic".to_string());
        }
        let mods = Self::modifiers(&spec.modifiers);

        let signature = match spec.kind {
            MethodKind::Function => {
                let ret = spec
                    .returns
                    .as_ref()
                    .map(|r| format!(": {}", self.render_type(r)))
                    .unwrap_or_default();
                format!("{mods}fun {}({}){ret}", spec.name, self.params(&spec.params))
            }
            MethodKind::Constructor => format!("{mods}constructor({})", self.params(&spec.params)),
            MethodKind::Deinit => "protected fun finalize()".to_string(),
            MethodKind::InitBlock => "init".to_string(),
        };
        lines.push(signature);
        lines
    }

    fn field_decl(&self, spec: &FieldSpec) -> String {
        let keyword = if spec.mutable { "var" } else { "val" };
        format!(
            "{}{keyword} {}: {}",
            Self::modifiers(&spec.modifiers),
            spec.name,
            self.render_type(&spec.ty)
        )
    }

    fn closure_open(&self, params: &[String]) -> String {
        if params.is_empty() {
            "{".to_string()
        } else {
            format!("{{ {} ->", params.join(", "))
        }
    }
}

impl Backend for KotlinBackend {
    fn lang(&self) -> Lang {
        Lang::Kotlin
    }

    /// `com.example.demo` becomes `Demo.kt`
    fn file_name(&self, module_name: &str) -> String {
        let last = module_name.rsplit('.').next().unwrap_or(module_name);
        format!("{}.kt", to_pascal_case(last))
    }

    fn string_ownership(&self) -> StringOwnership {
        StringOwnership::Managed
    }

    fn keywords(&self) -> &'static [&'static str] {
        KEYWORDS
    }

    fn file_imports(&self, _config: &GenConfig) -> Vec<String> {
        Vec::new()
    }

    fn package(&self, config: &GenConfig) -> Option<String> {
        Some(config.module_name.clone())
    }

    fn host_type(&self, ty: &AstType) -> TypeRef {
        Self::host(ty)
    }

    fn wire_type(&self, _ctx: &BindingContext<'_>, marshal: &Marshal) -> Option<TypeRef> {
        let name = match &marshal.wire {
            WireType::Void => return None,
            WireType::I8 => "Byte",
            WireType::I16 => "Short",
            WireType::I32 => "Int",
            WireType::I64 | WireType::Handle | WireType::Model(_) => "Long",
            WireType::F32 => "Float",
            WireType::F64 => "Double",
            WireType::Str => "String",
            WireType::Bytes => "ByteArray",
        };
        Some(TypeRef::named(name))
    }

    fn handle_type(&self) -> TypeRef {
        TypeRef::named("Long")
    }

    fn serializable(&self, spec: TypeSpecBuilder) -> TypeSpecBuilder {
        spec.annotation(TypeRef::imported(
            "Serializable",
            "kotlinx.serialization.Serializable",
        ))
    }

    fn native_name(&self, _ctx: &BindingContext<'_>, symbol: NativeSymbol<'_>) -> String {
        match symbol {
            NativeSymbol::Method(method) => format!("native_{method}"),
            NativeSymbol::CallbackMethod { callback, method } => {
                format!("native_{callback}_{method}")
            }
            NativeSymbol::CallbackFree(callback) => format!("native_{callback}_free"),
            NativeSymbol::FreeString => "native_free_str".to_string(),
            NativeSymbol::FreeBytes => "native_free_bytes".to_string(),
        }
    }

    fn native_callee(&self, ctx: &BindingContext<'_>, symbol: NativeSymbol<'_>) -> String {
        format!("{}.{}", ctx.owner, self.native_name(ctx, symbol))
    }

    fn bind(&self, name: &str, expr: &str) -> String {
        format!("val {name} = {expr}")
    }

    fn call(&self, callee: &str, args: &[CallArg]) -> String {
        let args: Vec<&str> = args.iter().map(|a| a.value.as_str()).collect();
        format!("{callee}({})", args.join(", "))
    }

    fn convert(
        &self,
        ctx: &BindingContext<'_>,
        marshal: &Marshal,
        input: &str,
        output: &str,
    ) -> CodegenResult<CodeBlock> {
        let block = CodeBlock::builder();

        let block = match &marshal.conversion {
            Conversion::None => block,
            Conversion::PassThrough
            | Conversion::CopyString
            | Conversion::BytesToWire
            | Conversion::WireToBytes => block.line(self.bind(output, input)),
            Conversion::Cast => {
                let target = match marshal.direction() {
                    Direction::Entry => self.wire_type(ctx, marshal),
                    Direction::Exit => Some(self.host_type(&marshal.ty)),
                };
                let target = target.map(|t| self.render_type(&t)).unwrap_or_default();
                block.line(self.bind(output, &format!("{input}.to{target}()")))
            }
            Conversion::BoolToWire => {
                block.line(self.bind(output, &format!("if ({input}) 1 else 0")))
            }
            Conversion::WireToBool => block.line(self.bind(output, &format!("{input} > 0"))),
            Conversion::JsonEncode => block
                .import(JSON)
                .import("kotlinx.serialization.encodeToString")
                .line(self.bind(output, &format!("Json.encodeToString({input})"))),
            Conversion::JsonDecode => {
                let host = self.render_type(&self.host_type(&marshal.ty));
                block
                    .import(JSON)
                    .import("kotlinx.serialization.decodeFromString")
                    .line(self.bind(output, &format!("Json.decodeFromString<{host}>({input})")))
            }
            Conversion::RegisterCallback(callback) => block.line(self.bind(
                output,
                &self.call(
                    &format!("{}.register", registry_name(callback)),
                    &[CallArg::positional(input)],
                ),
            )),
            Conversion::WrapCallbackProxy(callback) => block.line(self.bind(
                output,
                &self.call(&proxy_name(callback), &[CallArg::positional(input)]),
            )),
        };

        Ok(block.build())
    }

    fn registry_prelude(&self) -> Vec<Member> {
        let long = || TypeRef::named("Long");
        let t = || TypeRef::named("T");

        let registry = TypeSpec::builder(TypeKind::Class, "CallbackRegistry")
            .modifier(Modifier::Internal)
            .type_param(TypeParam::bounded("T", TypeRef::named("Any")))
            .field(
                FieldSpec::builder(
                    "lastHandle",
                    TypeRef::imported("AtomicLong", "java.util.concurrent.atomic.AtomicLong"),
                )
                .modifier(Modifier::Private)
                .initializer("AtomicLong(0)")
                .build(),
            )
            .field(
                FieldSpec::builder(
                    "entries",
                    TypeRef::imported(
                        "ConcurrentHashMap",
                        "java.util.concurrent.ConcurrentHashMap",
                    )
                    .with_args(vec![long(), t()]),
                )
                .modifier(Modifier::Private)
                .initializer("ConcurrentHashMap()")
                .build(),
            )
            .method(
                MethodSpec::builder("register")
                    .param(ParamSpec::new("callback", t()))
                    .returns(long())
                    .body(
                        CodeBlock::builder()
                            .line("val handle = lastHandle.incrementAndGet()")
                            .line("entries[handle] = callback")
                            .line("return handle")
                            .build(),
                    )
                    .build(),
            )
            .method(
                MethodSpec::builder("lookup")
                    .param(ParamSpec::new("handle", long()))
                    .returns(t())
                    .body(
                        CodeBlock::builder()
                            .line("return entries[handle]")
                            .line(r#"    ?: throw IllegalStateException("callback handle $handle is not registered")"#)
                            .build(),
                    )
                    .build(),
            )
            .method(
                MethodSpec::builder("remove")
                    .param(ParamSpec::new("handle", long()))
                    .body(CodeBlock::builder().line("entries.remove(handle)").build())
                    .build(),
            )
            .build();

        vec![registry.into()]
    }

    fn registry_declaration(&self, callback: &str) -> Member {
        let ty = TypeRef::named("CallbackRegistry").with_args(vec![TypeRef::named(callback)]);
        FieldSpec::builder(registry_name(callback), ty)
            .modifier(Modifier::Internal)
            .initializer("CallbackRegistry()")
            .build()
            .into()
    }

    fn namespace_init(&self, ctx: &BindingContext<'_>) -> Option<MethodSpec> {
        let config = ctx.config;
        let main = config.library_name(ctx.crate_name);
        let body = std::iter::once(main.as_str())
            .chain(config.extra_libraries())
            .fold(CodeBlock::builder(), |block, library| {
                block.line(format!("System.loadLibrary(\"{library}\")"))
            });
        Some(MethodSpec::init_block(body.build()))
    }

    fn native_declaration(
        &self,
        name: String,
        visibility: Modifier,
        params: Vec<ParamSpec>,
        returns: Option<TypeRef>,
    ) -> Option<MethodSpec> {
        Some(
            MethodSpec::builder(name)
                .modifier(visibility)
                .modifier(Modifier::Static)
                .modifier(Modifier::External)
                .params(params)
                .returns_opt(returns)
                .build(),
        )
    }

    fn trampoline(
        &self,
        name: String,
        params: Vec<ParamSpec>,
        returns: Option<TypeRef>,
        body: CodeBlock,
    ) -> Member {
        MethodSpec::builder(name)
            .modifier(Modifier::Static)
            .params(params)
            .returns_opt(returns)
            .body(body)
            .build()
            .into()
    }

    fn proxy_supertypes(&self) -> Vec<TypeRef> {
        vec![TypeRef::named("AutoCloseable")]
    }

    fn proxy_release(&self, free_call: &str) -> Vec<Member> {
        let released = FieldSpec::builder(
            "is_released",
            TypeRef::imported("AtomicBoolean", "java.util.concurrent.atomic.AtomicBoolean"),
        )
        .modifier(Modifier::Private)
        .initializer("AtomicBoolean(false)")
        .build();

        let close = MethodSpec::builder("close")
            .modifier(Modifier::Override)
            .body(
                CodeBlock::builder()
                    .block(
                        "if (is_released.compareAndSet(false, true))",
                        CodeBlock::builder().line(free_call).build(),
                    )
                    .build(),
            )
            .build();

        vec![released.into(), close.into()]
    }
}
