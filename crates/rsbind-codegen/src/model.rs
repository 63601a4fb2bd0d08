//! Structured code model.
//!
//! Generators never concatenate whole files. They assemble a tree of
//! [`FileSpec`], [`TypeSpec`], [`MethodSpec`], [`FieldSpec`] and
//! [`CodeBlock`] nodes with by-value builders and hand the finished tree to
//! the [`Renderer`](crate::render::Renderer). Nodes are immutable once built.
//!
//! ```
//! use rsbind_codegen::model::{CodeBlock, MethodSpec, Modifier, ParamSpec, TypeKind, TypeRef, TypeSpec};
//!
//! let method = MethodSpec::builder("answer")
//!     .modifier(Modifier::Public)
//!     .param(ParamSpec::new("x", TypeRef::named("Int32")))
//!     .returns(TypeRef::named("Int32"))
//!     .body(CodeBlock::builder().line("return x").build())
//!     .build();
//!
//! let service = TypeSpec::builder(TypeKind::Namespace, "Demo")
//!     .method(method)
//!     .build();
//! assert_eq!(service.name(), "Demo");
//! ```

/// A reference to a type, optionally carrying the import that provides it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Named {
        name: String,
        args: Vec<TypeRef>,
        import: Option<String>,
    },
    Array(Box<TypeRef>),
    Map(Box<TypeRef>, Box<TypeRef>),
    Optional(Box<TypeRef>),
    /// A function type; `native` marks a C calling convention
    Function {
        params: Vec<TypeRef>,
        ret: Box<TypeRef>,
        native: bool,
    },
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args: Vec::new(),
            import: None,
        }
    }

    /// A named type that must be imported from `import`
    pub fn imported(name: impl Into<String>, import: impl Into<String>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args: Vec::new(),
            import: Some(import.into()),
        }
    }

    /// Attach generic arguments to a named type
    pub fn with_args(self, new_args: Vec<TypeRef>) -> Self {
        match self {
            TypeRef::Named { name, import, .. } => TypeRef::Named {
                name,
                args: new_args,
                import,
            },
            other => other,
        }
    }

    pub fn array(element: TypeRef) -> Self {
        TypeRef::Array(Box::new(element))
    }

    pub fn map(key: TypeRef, value: TypeRef) -> Self {
        TypeRef::Map(Box::new(key), Box::new(value))
    }

    pub fn optional(inner: TypeRef) -> Self {
        TypeRef::Optional(Box::new(inner))
    }

    pub fn native_function(params: Vec<TypeRef>, ret: TypeRef) -> Self {
        TypeRef::Function {
            params,
            ret: Box::new(ret),
            native: true,
        }
    }

    /// Visit this reference and every reference nested in it
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a TypeRef)) {
        visit(self);
        match self {
            TypeRef::Named { args, .. } => args.iter().for_each(|arg| arg.walk(visit)),
            TypeRef::Array(inner) | TypeRef::Optional(inner) => inner.walk(visit),
            TypeRef::Map(key, value) => {
                key.walk(visit);
                value.walk(visit);
            }
            TypeRef::Function { params, ret, .. } => {
                params.iter().for_each(|param| param.walk(visit));
                ret.walk(visit);
            }
        }
    }
}

/// Declaration modifiers. Each backend spells, orders or drops them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    Public,
    Internal,
    Private,
    Override,
    Static,
    Final,
    External,
}

/// What kind of type declaration a [`TypeSpec`] is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Plain serializable data (Swift `struct`, Kotlin `data class`)
    Record,
    /// Host-implemented interface (Swift `protocol`, Kotlin `interface`)
    Interface,
    /// Holder of static members (Swift `final class`, Kotlin `object`)
    Namespace,
    /// Ordinary class with instance state
    Class,
}

/// A generic type parameter with an optional upper bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    pub name: String,
    pub bound: Option<TypeRef>,
}

impl TypeParam {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bound: None,
        }
    }

    pub fn bounded(name: impl Into<String>, bound: TypeRef) -> Self {
        Self {
            name: name.into(),
            bound: Some(bound),
        }
    }
}

/// A method parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    /// Swift argument label; `None` means the name doubles as the label
    pub label: Option<String>,
    pub ty: TypeRef,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            label: None,
            ty,
        }
    }

    /// Parameter passed without an argument label
    pub fn unlabeled(mut self) -> Self {
        self.label = Some("_".into());
        self
    }
}

/// One element of a [`CodeBlock`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeItem {
    Line(String),
    /// `header {` + indented body + `}`
    Block { header: String, body: CodeBlock },
    Blank,
}

/// A sequence of statements, possibly with nested indented blocks.
///
/// Blocks record the imports their statements need so that the renderer can
/// collect them bottom-up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeBlock {
    pub(crate) items: Vec<CodeItem>,
    pub(crate) imports: Vec<String>,
}

impl CodeBlock {
    pub fn builder() -> CodeBlockBuilder {
        CodeBlockBuilder::default()
    }

    pub fn items(&self) -> &[CodeItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Imports required by this block and every nested block
    pub fn all_imports(&self) -> Vec<&str> {
        let mut imports: Vec<&str> = self.imports.iter().map(String::as_str).collect();
        for item in &self.items {
            if let CodeItem::Block { body, .. } = item {
                imports.extend(body.all_imports());
            }
        }
        imports
    }
}

#[derive(Debug, Default)]
pub struct CodeBlockBuilder {
    block: CodeBlock,
}

impl CodeBlockBuilder {
    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.block.items.push(CodeItem::Line(line.into()));
        self
    }

    pub fn lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.block
            .items
            .extend(lines.into_iter().map(|line| CodeItem::Line(line.into())));
        self
    }

    pub fn block(mut self, header: impl Into<String>, body: CodeBlock) -> Self {
        self.block.items.push(CodeItem::Block {
            header: header.into(),
            body,
        });
        self
    }

    pub fn blank(mut self) -> Self {
        self.block.items.push(CodeItem::Blank);
        self
    }

    /// Append every statement and import of `other`
    pub fn append(mut self, other: CodeBlock) -> Self {
        self.block.items.extend(other.items);
        self.block.imports.extend(other.imports);
        self
    }

    pub fn import(mut self, import: impl Into<String>) -> Self {
        self.block.imports.push(import.into());
        self
    }

    pub fn build(self) -> CodeBlock {
        self.block
    }
}

/// How a field is initialized
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Initializer {
    Expr(String),
    /// A closure literal; `params` are the closure's parameter names
    Closure { params: Vec<String>, body: CodeBlock },
}

/// A stored property, constant or constructor property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub(crate) name: String,
    pub(crate) ty: TypeRef,
    pub(crate) modifiers: Vec<Modifier>,
    pub(crate) mutable: bool,
    pub(crate) initializer: Option<Initializer>,
    pub(crate) docs: Vec<String>,
}

impl FieldSpec {
    pub fn builder(name: impl Into<String>, ty: TypeRef) -> FieldSpecBuilder {
        FieldSpecBuilder {
            spec: FieldSpec {
                name: name.into(),
                ty,
                modifiers: Vec::new(),
                mutable: false,
                initializer: None,
                docs: Vec::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }
}

#[derive(Debug)]
pub struct FieldSpecBuilder {
    spec: FieldSpec,
}

impl FieldSpecBuilder {
    pub fn modifier(mut self, modifier: Modifier) -> Self {
        self.spec.modifiers.push(modifier);
        self
    }

    pub fn mutable(mut self) -> Self {
        self.spec.mutable = true;
        self
    }

    pub fn initializer(mut self, expr: impl Into<String>) -> Self {
        self.spec.initializer = Some(Initializer::Expr(expr.into()));
        self
    }

    pub fn closure(mut self, params: Vec<String>, body: CodeBlock) -> Self {
        self.spec.initializer = Some(Initializer::Closure { params, body });
        self
    }

    pub fn doc(mut self, line: impl Into<String>) -> Self {
        self.spec.docs.push(line.into());
        self
    }

    pub fn build(self) -> FieldSpec {
        self.spec
    }
}

/// What kind of callable a [`MethodSpec`] declares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Function,
    Constructor,
    /// Runs when the instance is released (Swift `deinit`)
    Deinit,
    /// Runs when the type is first loaded (Kotlin `init`)
    InitBlock,
}

/// A method, constructor or initializer block
///
/// A method without a body is an abstract or external declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSpec {
    pub(crate) kind: MethodKind,
    pub(crate) name: String,
    pub(crate) modifiers: Vec<Modifier>,
    pub(crate) annotations: Vec<TypeRef>,
    pub(crate) params: Vec<ParamSpec>,
    pub(crate) returns: Option<TypeRef>,
    pub(crate) body: Option<CodeBlock>,
    pub(crate) docs: Vec<String>,
}

impl MethodSpec {
    pub fn builder(name: impl Into<String>) -> MethodSpecBuilder {
        Self::with_kind(MethodKind::Function, name)
    }

    pub fn constructor() -> MethodSpecBuilder {
        Self::with_kind(MethodKind::Constructor, "init")
    }

    pub fn deinit(body: CodeBlock) -> MethodSpec {
        Self::with_kind(MethodKind::Deinit, "deinit").body(body).build()
    }

    pub fn init_block(body: CodeBlock) -> MethodSpec {
        Self::with_kind(MethodKind::InitBlock, "init")
            .body(body)
            .build()
    }

    fn with_kind(kind: MethodKind, name: impl Into<String>) -> MethodSpecBuilder {
        MethodSpecBuilder {
            spec: MethodSpec {
                kind,
                name: name.into(),
                modifiers: Vec::new(),
                annotations: Vec::new(),
                params: Vec::new(),
                returns: None,
                body: None,
                docs: Vec::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MethodKind {
        self.kind
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub fn returns(&self) -> Option<&TypeRef> {
        self.returns.as_ref()
    }

    pub fn body(&self) -> Option<&CodeBlock> {
        self.body.as_ref()
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

#[derive(Debug)]
pub struct MethodSpecBuilder {
    spec: MethodSpec,
}

impl MethodSpecBuilder {
    pub fn modifier(mut self, modifier: Modifier) -> Self {
        self.spec.modifiers.push(modifier);
        self
    }

    pub fn modifiers(mut self, modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        self.spec.modifiers.extend(modifiers);
        self
    }

    pub fn annotation(mut self, annotation: TypeRef) -> Self {
        self.spec.annotations.push(annotation);
        self
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.spec.params.push(param);
        self
    }

    pub fn params(mut self, params: impl IntoIterator<Item = ParamSpec>) -> Self {
        self.spec.params.extend(params);
        self
    }

    /// Set the return type; leaving it unset declares a void method
    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.spec.returns = Some(ty);
        self
    }

    pub fn returns_opt(mut self, ty: Option<TypeRef>) -> Self {
        self.spec.returns = ty;
        self
    }

    pub fn body(mut self, body: CodeBlock) -> Self {
        self.spec.body = Some(body);
        self
    }

    pub fn doc(mut self, line: impl Into<String>) -> Self {
        self.spec.docs.push(line.into());
        self
    }

    pub fn build(self) -> MethodSpec {
        self.spec
    }
}

/// A member of a type or a top-level declaration of a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Type(TypeSpec),
    Field(FieldSpec),
    Method(MethodSpec),
}

impl From<TypeSpec> for Member {
    fn from(spec: TypeSpec) -> Self {
        Member::Type(spec)
    }
}

impl From<FieldSpec> for Member {
    fn from(spec: FieldSpec) -> Self {
        Member::Field(spec)
    }
}

impl From<MethodSpec> for Member {
    fn from(spec: MethodSpec) -> Self {
        Member::Method(spec)
    }
}

/// A type declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub(crate) kind: TypeKind,
    pub(crate) name: String,
    pub(crate) modifiers: Vec<Modifier>,
    pub(crate) annotations: Vec<TypeRef>,
    pub(crate) type_params: Vec<TypeParam>,
    pub(crate) supertypes: Vec<TypeRef>,
    /// Properties initialized from constructor arguments, in order
    pub(crate) properties: Vec<FieldSpec>,
    pub(crate) constructor_modifiers: Vec<Modifier>,
    pub(crate) members: Vec<Member>,
    pub(crate) docs: Vec<String>,
}

impl TypeSpec {
    pub fn builder(kind: TypeKind, name: impl Into<String>) -> TypeSpecBuilder {
        TypeSpecBuilder {
            spec: TypeSpec {
                kind,
                name: name.into(),
                modifiers: Vec::new(),
                annotations: Vec::new(),
                type_params: Vec::new(),
                supertypes: Vec::new(),
                properties: Vec::new(),
                constructor_modifiers: Vec::new(),
                members: Vec::new(),
                docs: Vec::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn properties(&self) -> &[FieldSpec] {
        &self.properties
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Methods declared directly on this type, in order
    pub fn methods(&self) -> impl Iterator<Item = &MethodSpec> {
        self.members.iter().filter_map(|member| match member {
            Member::Method(method) => Some(method),
            _ => None,
        })
    }

    /// Fields declared directly on this type, in order
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.members.iter().filter_map(|member| match member {
            Member::Field(field) => Some(field),
            _ => None,
        })
    }
}

#[derive(Debug)]
pub struct TypeSpecBuilder {
    spec: TypeSpec,
}

impl TypeSpecBuilder {
    pub fn modifier(mut self, modifier: Modifier) -> Self {
        self.spec.modifiers.push(modifier);
        self
    }

    pub fn annotation(mut self, annotation: TypeRef) -> Self {
        self.spec.annotations.push(annotation);
        self
    }

    pub fn type_param(mut self, param: TypeParam) -> Self {
        self.spec.type_params.push(param);
        self
    }

    pub fn supertype(mut self, ty: TypeRef) -> Self {
        self.spec.supertypes.push(ty);
        self
    }

    pub fn property(mut self, field: FieldSpec) -> Self {
        self.spec.properties.push(field);
        self
    }

    pub fn constructor_modifier(mut self, modifier: Modifier) -> Self {
        self.spec.constructor_modifiers.push(modifier);
        self
    }

    pub fn member(mut self, member: impl Into<Member>) -> Self {
        self.spec.members.push(member.into());
        self
    }

    pub fn members(mut self, members: impl IntoIterator<Item = Member>) -> Self {
        self.spec.members.extend(members);
        self
    }

    pub fn field(self, field: FieldSpec) -> Self {
        self.member(field)
    }

    pub fn method(self, method: MethodSpec) -> Self {
        self.member(method)
    }

    pub fn doc(mut self, line: impl Into<String>) -> Self {
        self.spec.docs.push(line.into());
        self
    }

    pub fn build(self) -> TypeSpec {
        self.spec
    }
}

/// One generated source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpec {
    pub(crate) name: String,
    pub(crate) header: Option<String>,
    pub(crate) package: Option<String>,
    pub(crate) imports: Vec<String>,
    pub(crate) members: Vec<Member>,
}

impl FileSpec {
    pub fn builder(name: impl Into<String>) -> FileSpecBuilder {
        FileSpecBuilder {
            spec: FileSpec {
                name: name.into(),
                header: None,
                package: None,
                imports: Vec::new(),
                members: Vec::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Top-level types, in declaration order
    pub fn types(&self) -> impl Iterator<Item = &TypeSpec> {
        self.members.iter().filter_map(|member| match member {
            Member::Type(spec) => Some(spec),
            _ => None,
        })
    }
}

#[derive(Debug)]
pub struct FileSpecBuilder {
    spec: FileSpec,
}

impl FileSpecBuilder {
    pub fn header(mut self, header: Option<String>) -> Self {
        self.spec.header = header;
        self
    }

    pub fn package(mut self, package: impl Into<String>) -> Self {
        self.spec.package = Some(package.into());
        self
    }

    /// An import that no type reference implies, such as the native module
    pub fn import(mut self, import: impl Into<String>) -> Self {
        self.spec.imports.push(import.into());
        self
    }

    pub fn member(mut self, member: impl Into<Member>) -> Self {
        self.spec.members.push(member.into());
        self
    }

    pub fn members(mut self, members: impl IntoIterator<Item = Member>) -> Self {
        self.spec.members.extend(members);
        self
    }

    pub fn build(self) -> FileSpec {
        self.spec
    }
}
