//! Swift backend.
//!
//! Native functions are imported from the C module named after the
//! generated module, so no native declarations are emitted. Strings cross
//! the boundary as `malloc`ed C buffers: returned buffers are copied and
//! released through the runtime's `rsbind_free_str`, buffers handed to
//! native code from a callback are `strdup`ed. Byte vectors travel the same
//! way as a `WireBytes` pointer and length, released through
//! `rsbind_free_bytes`.

use super::{
    Backend, BindingContext, CallArg, FREE_BYTES_SYMBOL, FREE_STRING_SYMBOL, NativeSymbol, Syntax,
    TypeHeader, free_trampoline_name, modifier_prefix, proxy_name, registry_name,
    trampoline_name,
};
use crate::config::{GenConfig, Lang};
use crate::error::{CodegenError, CodegenResult};
use crate::marshal::{Conversion, Direction, Marshal, Position, StringOwnership, WireType};
use crate::model::{
    CodeBlock, FieldSpec, Member, MethodKind, MethodSpec, Modifier, ParamSpec, TypeKind,
    TypeParam, TypeRef, TypeSpec, TypeSpecBuilder,
};
use rsbind_ir::{AstBaseType, AstType};

const KEYWORDS: &[&str] = &[
    "Any", "Self", "as", "associatedtype", "break", "case", "catch", "class", "continue",
    "default", "defer", "deinit", "do", "else", "enum", "extension", "fallthrough", "false",
    "fileprivate", "for", "func", "guard", "if", "import", "in", "init", "inout", "internal", "is",
    "let", "nil", "open", "operator", "private", "protocol", "public", "repeat", "rethrows",
    "return", "self", "static", "struct", "subscript", "super", "switch", "throw", "throws", "true",
    "try", "typealias", "var", "where", "while",
];

const BUILTINS: &[&str] = &[
    "Int8",
    "Int16",
    "Int32",
    "Int64",
    "UInt8",
    "Float",
    "Double",
    "Bool",
    "String",
    "Void",
    "CChar",
    "UnsafePointer",
    "UnsafeMutablePointer",
    "Data",
    "Codable",
];

const FOUNDATION: &str = "Foundation";

/// Generates Swift bindings over the C ABI
#[derive(Debug, Clone, Copy, Default)]
pub struct SwiftBackend;

impl SwiftBackend {
    fn modifiers(modifiers: &[Modifier]) -> String {
        modifier_prefix(modifiers, |m| match m {
            Modifier::Public => Some((0, "public")),
            Modifier::Private => Some((0, "private")),
            Modifier::Final => Some((1, "final")),
            Modifier::Static => Some((3, "static")),
            Modifier::Internal | Modifier::Override | Modifier::External => None,
        })
    }

    fn params(&self, params: &[ParamSpec]) -> String {
        params
            .iter()
            .map(|p| match &p.label {
                Some(label) => format!("{label} {}: {}", p.name, self.render_type(&p.ty)),
                None => format!("{}: {}", p.name, self.render_type(&p.ty)),
            })
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
                Some(bound) => format!("{}: {}", p.name, self.render_type(bound)),
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
            AstType::Void => TypeRef::named("Void"),
            AstType::Byte => TypeRef::named("Int8"),
            AstType::Short => TypeRef::named("Int16"),
            AstType::Int => TypeRef::named("Int32"),
            AstType::Long => TypeRef::named("Int64"),
            AstType::Float => TypeRef::named("Float"),
            AstType::Double => TypeRef::named("Double"),
            AstType::String => TypeRef::named("String"),
            AstType::Boolean => TypeRef::named("Bool"),
            AstType::Vec(base) => TypeRef::array(Self::host_base(base)),
            AstType::Callback(name) | AstType::Struct(name) => TypeRef::named(name.as_str()),
        }
    }

    /// `expr`, copied into a buffer native code will own when required
    fn owned(marshal: &Marshal, expr: String) -> String {
        if marshal.transfers_ownership {
            format!("strdup({expr})")
        } else {
            expr
        }
    }

    fn free_string(&self, ctx: &BindingContext<'_>, input: &str) -> String {
        let free = self.native_callee(ctx, NativeSymbol::FreeString);
        self.call(&free, &[CallArg::positional(input)])
    }

    /// Copy a host `[Int8]` into a `malloc`ed wire buffer. Unless native
    /// code takes the buffer over, it is freed when the enclosing scope ends.
    fn bytes_to_wire(
        &self,
        ctx: &BindingContext<'_>,
        marshal: &Marshal,
        input: &str,
        output: &str,
    ) -> CodeBlock {
        let buffer = format!("{output}_buf");
        let block = CodeBlock::builder()
            .line(self.bind(
                &buffer,
                &format!("malloc(max({input}.count, 1))!.assumingMemoryBound(to: Int8.self)"),
            ))
            .line(format!("{buffer}.initialize(from: {input}, count: {input}.count)"));
        let block = if marshal.transfers_ownership {
            block
        } else {
            block.line(format!("defer {{ free({buffer}) }}"))
        };
        let wire = self
            .wire_type(ctx, marshal)
            .map(|t| self.render_type(&t))
            .unwrap_or_default();

        block
            .line(self.bind(
                output,
                &self.call(
                    &wire,
                    &[
                        CallArg::labeled("ptr", buffer.as_str()),
                        CallArg::labeled("len", format!("Int32({input}.count)")),
                    ],
                ),
            ))
            .build()
    }

    fn wire_to_bytes(
        &self,
        ctx: &BindingContext<'_>,
        marshal: &Marshal,
        input: &str,
        output: &str,
    ) -> CodeBlock {
        let block = CodeBlock::builder().line(self.bind(
            output,
            &format!("[Int8](UnsafeBufferPointer(start: {input}.ptr, count: Int({input}.len)))"),
        ));
        if marshal.frees_native_buffer {
            let free = self.native_callee(ctx, NativeSymbol::FreeBytes);
            block.line(self.call(&free, &[CallArg::positional(input)])).build()
        } else {
            block.build()
        }
    }

    fn register_callback(
        &self,
        ctx: &BindingContext<'_>,
        callback: &str,
        input: &str,
        output: &str,
    ) -> CodegenResult<CodeBlock> {
        let desc = ctx.ast.callback(callback).ok_or_else(|| {
            CodegenError::UnsupportedShape(format!("callback `{callback}` is not declared"))
        })?;

        let handle = format!("{output}_handle");
        let mut args: Vec<CallArg> = desc
            .methods
            .iter()
            .map(|m| {
                CallArg::labeled(
                    m.name.as_str(),
                    format!("{}.{}", ctx.owner, trampoline_name(callback, &m.name)),
                )
            })
            .collect();
        args.push(CallArg::labeled(
            "free_callback",
            format!("{}.{}", ctx.owner, free_trampoline_name(callback)),
        ));
        args.push(CallArg::labeled("index", handle.as_str()));

        let register = self.call(
            &format!("{}.register", registry_name(callback)),
            &[CallArg::positional(input)],
        );
        let model = self.call(&model_name(ctx, callback), &args);

        Ok(CodeBlock::builder()
            .line(self.bind(&handle, &register))
            .line(self.bind(output, &model))
            .build())
    }
}

/// C struct bundling the trampolines of one callback interface
fn model_name(ctx: &BindingContext<'_>, callback: &str) -> String {
    format!("{}_{callback}_Model", ctx.native_module)
}

impl Syntax for SwiftBackend {
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
            TypeRef::Array(element) => format!("[{}]", self.render_type(element)),
            TypeRef::Map(key, value) => {
                format!("[{}: {}]", self.render_type(key), self.render_type(value))
            }
            TypeRef::Optional(inner) => format!("{}?", self.render_type(inner)),
            TypeRef::Function {
                params,
                ret,
                native,
            } => {
                let params: Vec<String> = params.iter().map(|p| self.render_type(p)).collect();
                let convention = if *native { "@convention(c) " } else { "" };
                format!(
                    "{convention}({}) -> {}",
                    params.join(", "),
                    self.render_type(ret)
                )
            }
        }
    }

    fn doc_lines(&self, docs: &[String]) -> Vec<String> {
        docs.iter().map(|line| format!("/// {line}")).collect()
    }

    fn type_header(&self, spec: &TypeSpec) -> TypeHeader {
        let keyword = match spec.kind {
            TypeKind::Record => "struct",
            TypeKind::Interface => "protocol",
            TypeKind::Namespace | TypeKind::Class => "class",
        };
        let supertypes: Vec<String> = spec
            .supertypes
            .iter()
            .map(|s| self.render_type(s))
            .collect();

        TypeHeader {
            lead: format!(
                "{}{keyword} {}{}",
                Self::modifiers(&spec.modifiers),
                spec.name,
                self.type_params(&spec.type_params)
            ),
            params: Vec::new(),
            tail: if supertypes.is_empty() {
                String::new()
            } else {
                format!(": {}", supertypes.join(", "))
            },
        }
    }

    fn synthesized_members(&self, spec: &TypeSpec) -> Vec<Member> {
        let mut members: Vec<Member> = spec
            .properties
            .iter()
            .cloned()
            .map(Member::Field)
            .collect();

        let needs_init = spec.kind == TypeKind::Class || !spec.constructor_modifiers.is_empty();
        if needs_init && !spec.properties.is_empty() {
            let body = CodeBlock::builder()
                .lines(
                    spec.properties
                        .iter()
                        .map(|p| format!("self.{0} = {0}", p.name)),
                )
                .build();
            let init = MethodSpec::constructor()
                .modifiers(spec.constructor_modifiers.iter().copied())
                .params(
                    spec.properties
                        .iter()
                        .map(|p| ParamSpec::new(p.name.as_str(), p.ty.clone())),
                )
                .body(body)
                .build();
            members.push(init.into());
        }

        members
    }

    fn omit_empty_body(&self, _spec: &TypeSpec) -> bool {
        false
    }

    fn method_header(&self, spec: &MethodSpec) -> Vec<String> {
        let mut lines: Vec<String> = spec.annotations.iter().map(|a| self.annotation(a)).collect();
        let mods = Self::modifiers(&spec.modifiers);

        let signature = match spec.kind {
            MethodKind::Function => {
                let ret = spec
                    .returns
                    .as_ref()
                    .map(|r| format!(" -> {}", self.render_type(r)))
                    .unwrap_or_default();
                format!("{mods}func {}({}){ret}", spec.name, self.params(&spec.params))
            }
            MethodKind::Constructor => format!("{mods}init({})", self.params(&spec.params)),
            MethodKind::Deinit => "deinit".to_string(),
            MethodKind::InitBlock => format!("{mods}init()"),
        };
        lines.push(signature);
        lines
    }

    fn field_decl(&self, spec: &FieldSpec) -> String {
        let keyword = if spec.mutable { "var" } else { "let" };
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
            format!("{{ {} in", params.join(", "))
        }
    }
}

impl Backend for SwiftBackend {
    fn lang(&self) -> Lang {
        Lang::Swift
    }

    fn file_name(&self, module_name: &str) -> String {
        format!("{module_name}.swift")
    }

    fn string_ownership(&self) -> StringOwnership {
        StringOwnership::NativeFreed
    }

    fn keywords(&self) -> &'static [&'static str] {
        KEYWORDS
    }

    fn file_imports(&self, config: &GenConfig) -> Vec<String> {
        vec![FOUNDATION.to_string(), config.module_name.clone()]
    }

    fn host_type(&self, ty: &AstType) -> TypeRef {
        Self::host(ty)
    }

    fn wire_type(&self, ctx: &BindingContext<'_>, marshal: &Marshal) -> Option<TypeRef> {
        let ty = match &marshal.wire {
            WireType::Void => return None,
            WireType::I8 => TypeRef::named("Int8"),
            WireType::I16 => TypeRef::named("Int16"),
            WireType::I32 => TypeRef::named("Int32"),
            WireType::I64 | WireType::Handle => TypeRef::named("Int64"),
            WireType::F32 => TypeRef::named("Float"),
            WireType::F64 => TypeRef::named("Double"),
            WireType::Str => {
                let pointer = match marshal.position {
                    Position::Argument | Position::CallbackArgument => "UnsafePointer",
                    Position::Return | Position::CallbackReturn => "UnsafeMutablePointer",
                };
                TypeRef::optional(
                    TypeRef::named(pointer).with_args(vec![TypeRef::named("CChar")]),
                )
            }
            WireType::Bytes => TypeRef::imported("WireBytes", ctx.config.module_name.as_str()),
            WireType::Model(callback) => {
                TypeRef::imported(model_name(ctx, callback), ctx.config.module_name.as_str())
            }
        };
        Some(ty)
    }

    fn handle_type(&self) -> TypeRef {
        TypeRef::named("Int64")
    }

    fn serializable(&self, spec: TypeSpecBuilder) -> TypeSpecBuilder {
        spec.supertype(TypeRef::named("Codable"))
    }

    fn native_name(&self, ctx: &BindingContext<'_>, symbol: NativeSymbol<'_>) -> String {
        let module = ctx.native_module;
        match symbol {
            NativeSymbol::Method(method) => format!("{module}_{method}"),
            NativeSymbol::CallbackMethod { callback, method } => {
                format!("{module}_{callback}_{method}")
            }
            NativeSymbol::CallbackFree(callback) => format!("{module}_{callback}_free"),
            NativeSymbol::FreeString => FREE_STRING_SYMBOL.to_string(),
            NativeSymbol::FreeBytes => FREE_BYTES_SYMBOL.to_string(),
        }
    }

    fn bind(&self, name: &str, expr: &str) -> String {
        format!("let {name} = {expr}")
    }

    fn call(&self, callee: &str, args: &[CallArg]) -> String {
        let args: Vec<String> = args
            .iter()
            .map(|a| match &a.label {
                Some(label) => format!("{label}: {}", a.value),
                None => a.value.clone(),
            })
            .collect();
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
            Conversion::PassThrough => {
                block.line(self.bind(output, &Self::owned(marshal, input.to_string())))
            }
            Conversion::Cast => {
                let target = match marshal.direction() {
                    Direction::Entry => self.wire_type(ctx, marshal),
                    Direction::Exit => Some(self.host_type(&marshal.ty)),
                };
                let target = target.map(|t| self.render_type(&t)).unwrap_or_default();
                block.line(self.bind(output, &format!("{target}({input})")))
            }
            Conversion::BoolToWire => block.line(format!("let {output}: Int32 = {input} ? 1 : 0")),
            Conversion::WireToBool => block.line(self.bind(output, &format!("{input} > 0"))),
            Conversion::JsonEncode => {
                let json = format!("String(decoding: try! JSONEncoder().encode({input}), as: UTF8.self)");
                block.line(self.bind(output, &Self::owned(marshal, json)))
            }
            Conversion::CopyString => {
                let block = block.line(self.bind(output, &format!("String(cString: {input}!)")));
                if marshal.frees_native_buffer {
                    block.line(self.free_string(ctx, input))
                } else {
                    block
                }
            }
            Conversion::JsonDecode => {
                let json = format!("{output}_json");
                let block = block.line(self.bind(&json, &format!("String(cString: {input}!)")));
                let block = if marshal.frees_native_buffer {
                    block.line(self.free_string(ctx, input))
                } else {
                    block
                };
                let host = self.render_type(&self.host_type(&marshal.ty));
                block.line(self.bind(
                    output,
                    &format!("try! JSONDecoder().decode({host}.self, from: Data({json}.utf8))"),
                ))
            }
            Conversion::BytesToWire => block.append(self.bytes_to_wire(ctx, marshal, input, output)),
            Conversion::WireToBytes => block.append(self.wire_to_bytes(ctx, marshal, input, output)),
            Conversion::RegisterCallback(callback) => {
                block.append(self.register_callback(ctx, callback, input, output)?)
            }
            Conversion::WrapCallbackProxy(callback) => block.line(self.bind(
                output,
                &self.call(
                    &proxy_name(callback),
                    &[CallArg::labeled("native_handle", input)],
                ),
            )),
        };

        Ok(block.build())
    }

    fn registry_prelude(&self) -> Vec<Member> {
        let int64 = || TypeRef::named("Int64");
        let locked = |body: CodeBlock| {
            CodeBlock::builder()
                .line("lock.lock()")
                .line("defer { lock.unlock() }")
                .append(body)
                .build()
        };

        let registry = TypeSpec::builder(TypeKind::Class, "CallbackRegistry")
            .modifier(Modifier::Private)
            .modifier(Modifier::Final)
            .type_param(TypeParam::new("T"))
            .field(
                FieldSpec::builder("lock", TypeRef::imported("NSLock", FOUNDATION))
                    .modifier(Modifier::Private)
                    .initializer("NSLock()")
                    .build(),
            )
            .field(
                FieldSpec::builder("lastHandle", int64())
                    .modifier(Modifier::Private)
                    .mutable()
                    .initializer("0")
                    .build(),
            )
            .field(
                FieldSpec::builder("entries", TypeRef::map(int64(), TypeRef::named("T")))
                    .modifier(Modifier::Private)
                    .mutable()
                    .initializer("[:]")
                    .build(),
            )
            .method(
                MethodSpec::builder("register")
                    .param(ParamSpec::new("callback", TypeRef::named("T")).unlabeled())
                    .returns(int64())
                    .body(locked(
                        CodeBlock::builder()
                            .line("lastHandle += 1")
                            .line("entries[lastHandle] = callback")
                            .line("return lastHandle")
                            .build(),
                    ))
                    .build(),
            )
            .method(
                MethodSpec::builder("lookup")
                    .param(ParamSpec::new("handle", int64()).unlabeled())
                    .returns(TypeRef::named("T"))
                    .body(locked(
                        CodeBlock::builder()
                            .block(
                                "guard let callback = entries[handle] else",
                                CodeBlock::builder()
                                    .line(r#"fatalError("callback handle \(handle) is not registered")"#)
                                    .build(),
                            )
                            .line("return callback")
                            .build(),
                    ))
                    .build(),
            )
            .method(
                MethodSpec::builder("remove")
                    .param(ParamSpec::new("handle", int64()).unlabeled())
                    .body(locked(
                        CodeBlock::builder()
                            .line("entries.removeValue(forKey: handle)")
                            .build(),
                    ))
                    .build(),
            )
            .build();

        vec![registry.into()]
    }

    fn registry_declaration(&self, callback: &str) -> Member {
        let ty = TypeRef::named("CallbackRegistry").with_args(vec![TypeRef::named(callback)]);
        FieldSpec::builder(registry_name(callback), ty)
            .modifier(Modifier::Private)
            .initializer(format!("CallbackRegistry<{callback}>()"))
            .build()
            .into()
    }

    fn native_declaration(
        &self,
        _name: String,
        _visibility: Modifier,
        _params: Vec<ParamSpec>,
        _returns: Option<TypeRef>,
    ) -> Option<MethodSpec> {
        None
    }

    fn trampoline(
        &self,
        name: String,
        params: Vec<ParamSpec>,
        returns: Option<TypeRef>,
        body: CodeBlock,
    ) -> Member {
        let names = params.iter().map(|p| p.name.clone()).collect();
        let ty = TypeRef::native_function(
            params.into_iter().map(|p| p.ty).collect(),
            returns.unwrap_or_else(|| TypeRef::named("Void")),
        );

        FieldSpec::builder(name, ty)
            .modifier(Modifier::Private)
            .modifier(Modifier::Static)
            .closure(names, body)
            .build()
            .into()
    }

    fn proxy_release(&self, free_call: &str) -> Vec<Member> {
        vec![MethodSpec::deinit(CodeBlock::builder().line(free_call).build()).into()]
    }
}
