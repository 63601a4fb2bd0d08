//! Renders a [`FileSpec`] to source text.
//!
//! Rendering is a pure function of the file spec and the backend syntax:
//! every call starts from a fresh output buffer and indentation stack.
//! Type references are checked before any text is produced, so a file that
//! names an unknown type yields [`CodegenError::UnresolvedType`] and no
//! partial output.

use crate::backend::Syntax;
use crate::error::{CodegenError, CodegenResult};
use crate::model::{
    CodeBlock, CodeItem, FieldSpec, FileSpec, Initializer, Member, MethodSpec, TypeRef, TypeSpec,
};
use std::collections::BTreeSet;

/// Renders file specs with one backend's syntax
pub struct Renderer<'a> {
    syntax: &'a dyn Syntax,
    indent_width: usize,
}

impl<'a> Renderer<'a> {
    pub fn new(syntax: &'a dyn Syntax, indent_width: usize) -> Self {
        Self {
            syntax,
            indent_width,
        }
    }

    pub fn render(&self, file: &FileSpec) -> CodegenResult<String> {
        self.check_types(file)?;
        let imports = collect_imports(file);

        let mut out = Output::new(self.indent_width);

        if let Some(header) = &file.header {
            for line in header.lines() {
                out.line(self.syntax.comment(line));
            }
            out.blank();
        }

        if let Some(package) = file
            .package
            .as_deref()
            .and_then(|p| self.syntax.package_line(p))
        {
            out.line(package);
            out.blank();
        }

        if !imports.is_empty() {
            for import in &imports {
                out.line(self.syntax.import_line(import));
            }
            out.blank();
        }

        self.members(&mut out, &file.members);

        Ok(out.finish())
    }

    // ------------------------------------------------------------------
    // Type checking
    // ------------------------------------------------------------------

    fn check_types(&self, file: &FileSpec) -> CodegenResult<()> {
        let mut declared = BTreeSet::new();
        collect_declared(&file.members, &mut declared);

        let mut scope = Vec::new();
        self.check_members(&file.members, &declared, &mut scope, file.name())
    }

    fn check_members(
        &self,
        members: &[Member],
        declared: &BTreeSet<&str>,
        type_params: &mut Vec<String>,
        context: &str,
    ) -> CodegenResult<()> {
        for member in members {
            match member {
                Member::Type(spec) => {
                    let pushed = spec.type_params.len();
                    type_params.extend(spec.type_params.iter().map(|p| p.name.clone()));

                    let refs = spec
                        .supertypes
                        .iter()
                        .chain(spec.annotations.iter())
                        .chain(spec.type_params.iter().filter_map(|p| p.bound.as_ref()))
                        .chain(spec.properties.iter().map(|f| &f.ty));
                    for ty in refs {
                        self.check_type(ty, declared, type_params, &spec.name)?;
                    }
                    self.check_members(&spec.members, declared, type_params, &spec.name)?;

                    type_params.truncate(type_params.len() - pushed);
                }
                Member::Field(field) => {
                    self.check_type(&field.ty, declared, type_params, context)?;
                }
                Member::Method(method) => {
                    let refs = method
                        .params
                        .iter()
                        .map(|p| &p.ty)
                        .chain(method.returns.iter())
                        .chain(method.annotations.iter());
                    for ty in refs {
                        self.check_type(ty, declared, type_params, context)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn check_type(
        &self,
        ty: &TypeRef,
        declared: &BTreeSet<&str>,
        type_params: &[String],
        context: &str,
    ) -> CodegenResult<()> {
        let mut unresolved = None;
        ty.walk(&mut |node| {
            if let TypeRef::Named { name, import, .. } = node {
                let known = import.is_some()
                    || declared.contains(name.as_str())
                    || type_params.iter().any(|p| p == name)
                    || self.syntax.is_builtin(name);
                if !known && unresolved.is_none() {
                    unresolved = Some(name.clone());
                }
            }
        });

        match unresolved {
            Some(name) => Err(CodegenError::UnresolvedType {
                name,
                context: context.to_string(),
            }),
            None => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn members(&self, out: &mut Output, members: &[Member]) {
        let mut previous: Option<&Member> = None;
        for member in members {
            if let Some(prev) = previous {
                if !(is_single_line_field(prev) && is_single_line_field(member)) {
                    out.blank();
                }
            }
            self.member(out, member);
            previous = Some(member);
        }
    }

    fn member(&self, out: &mut Output, member: &Member) {
        match member {
            Member::Type(spec) => self.type_spec(out, spec),
            Member::Field(field) => self.field(out, field),
            Member::Method(method) => self.method(out, method),
        }
    }

    fn docs(&self, out: &mut Output, docs: &[String]) {
        for line in self.syntax.doc_lines(docs) {
            out.line(line);
        }
    }

    fn type_spec(&self, out: &mut Output, spec: &TypeSpec) {
        self.docs(out, &spec.docs);
        for annotation in &spec.annotations {
            out.line(self.syntax.annotation(annotation));
        }

        let mut members = self.syntax.synthesized_members(spec);
        members.extend(spec.members.iter().cloned());

        let header = self.syntax.type_header(spec);
        let open = if members.is_empty() && self.syntax.omit_empty_body(spec) {
            ""
        } else {
            " {"
        };

        if header.params.is_empty() {
            out.line(format!("{}{}{open}", header.lead, header.tail));
        } else {
            out.line(format!("{}(", header.lead));
            out.push();
            for param in &header.params {
                out.line(format!("{param},"));
            }
            out.pop();
            out.line(format!("){}{open}", header.tail));
        }

        if open.is_empty() {
            return;
        }

        out.push();
        self.members(out, &members);
        out.pop();
        out.line("}");
    }

    fn field(&self, out: &mut Output, field: &FieldSpec) {
        self.docs(out, &field.docs);
        let decl = self.syntax.field_decl(field);

        match &field.initializer {
            None => out.line(decl),
            Some(Initializer::Expr(expr)) => out.line(format!("{decl} = {expr}")),
            Some(Initializer::Closure { params, body }) => {
                out.line(format!("{decl} = {}", self.syntax.closure_open(params)));
                out.push();
                self.code(out, body);
                out.pop();
                out.line("}");
            }
        }
    }

    fn method(&self, out: &mut Output, method: &MethodSpec) {
        self.docs(out, &method.docs);

        let mut header = self.syntax.method_header(method);
        let signature = header.pop().unwrap_or_default();
        for line in header {
            out.line(line);
        }

        match &method.body {
            None => out.line(signature),
            Some(body) => {
                out.line(format!("{signature} {{"));
                out.push();
                self.code(out, body);
                out.pop();
                out.line("}");
            }
        }
    }

    fn code(&self, out: &mut Output, block: &CodeBlock) {
        for item in &block.items {
            match item {
                CodeItem::Line(line) => out.line(line.as_str()),
                CodeItem::Blank => out.blank(),
                CodeItem::Block { header, body } => {
                    out.line(format!("{header} {{"));
                    out.push();
                    self.code(out, body);
                    out.pop();
                    out.line("}");
                }
            }
        }
    }
}

fn is_single_line_field(member: &Member) -> bool {
    matches!(
        member,
        Member::Field(FieldSpec {
            initializer: None | Some(Initializer::Expr(_)),
            docs,
            ..
        }) if docs.is_empty()
    )
}

fn collect_declared<'a>(members: &'a [Member], declared: &mut BTreeSet<&'a str>) {
    for member in members {
        if let Member::Type(spec) = member {
            declared.insert(spec.name.as_str());
            collect_declared(&spec.members, declared);
        }
    }
}

/// Every import the file needs, deduplicated and sorted
fn collect_imports(file: &FileSpec) -> BTreeSet<String> {
    let mut imports: BTreeSet<String> = file.imports.iter().cloned().collect();
    member_imports(&file.members, &mut imports);
    imports
}

fn member_imports(members: &[Member], imports: &mut BTreeSet<String>) {
    for member in members {
        match member {
            Member::Type(spec) => {
                spec.supertypes
                    .iter()
                    .chain(spec.annotations.iter())
                    .chain(spec.type_params.iter().filter_map(|p| p.bound.as_ref()))
                    .chain(spec.properties.iter().map(|f| &f.ty))
                    .for_each(|ty| type_imports(ty, imports));
                member_imports(&spec.members, imports);
            }
            Member::Field(field) => {
                type_imports(&field.ty, imports);
                if let Some(Initializer::Closure { body, .. }) = &field.initializer {
                    block_imports(body, imports);
                }
            }
            Member::Method(method) => {
                method
                    .params
                    .iter()
                    .map(|p| &p.ty)
                    .chain(method.returns.iter())
                    .chain(method.annotations.iter())
                    .for_each(|ty| type_imports(ty, imports));
                if let Some(body) = &method.body {
                    block_imports(body, imports);
                }
            }
        }
    }
}

fn type_imports(ty: &TypeRef, imports: &mut BTreeSet<String>) {
    ty.walk(&mut |node| {
        if let TypeRef::Named {
            import: Some(import),
            ..
        } = node
        {
            imports.insert(import.clone());
        }
    });
}

fn block_imports(block: &CodeBlock, imports: &mut BTreeSet<String>) {
    imports.extend(block.all_imports().into_iter().map(String::from));
}

/// Output buffer with an explicit indentation stack
struct Output {
    text: String,
    unit: String,
    stack: Vec<String>,
}

impl Output {
    fn new(indent_width: usize) -> Self {
        Self {
            text: String::new(),
            unit: " ".repeat(indent_width),
            stack: vec![String::new()],
        }
    }

    fn current(&self) -> &str {
        self.stack.last().map(String::as_str).unwrap_or_default()
    }

    fn push(&mut self) {
        let next = format!("{}{}", self.current(), self.unit);
        self.stack.push(next);
    }

    fn pop(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    fn line(&mut self, line: impl AsRef<str>) {
        let indent = self.current().to_string();
        self.text.push_str(&indent);
        self.text.push_str(line.as_ref());
        self.text.push('\n');
    }

    fn blank(&mut self) {
        if !self.text.is_empty() && !self.text.ends_with("\n\n") {
            self.text.push('\n');
        }
    }

    fn finish(mut self) -> String {
        while self.text.ends_with("\n\n") {
            self.text.pop();
        }
        self.text
    }
}
