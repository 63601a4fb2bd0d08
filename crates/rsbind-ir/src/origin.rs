//! Recursive-descent parser for native type spellings.
//!
//! The AST producer records the original Rust spelling of every type
//! (`origin_ty`). Struct and callback names, and the element name of
//! `Vec<Struct>`, are recovered from that spelling here.
//!
//! Grammar:
//!
//! ```text
//! type     := "&" lifetime? "mut"? type
//!           | "dyn" bounds
//!           | path generics?
//! bounds   := type ("+" type)*
//! path     := ident ("::" ident)*
//! generics := "<" type ("," type)* ","? ">"
//! ```

use crate::error::{IrError, IrResult};

/// A parsed type spelling: a path plus its generic arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeExpr {
    /// Path segments, e.g. `["std", "vec", "Vec"]`
    pub path: Vec<String>,
    /// Generic arguments in declaration order
    pub args: Vec<TypeExpr>,
}

impl TypeExpr {
    /// The last path segment
    pub fn base_name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    pub fn is_generic(&self) -> bool {
        !self.args.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Lifetime,
    Lt,
    Gt,
    Comma,
    PathSep,
    Amp,
    Plus,
}

fn invalid(origin: &str, reason: impl Into<String>) -> IrError {
    IrError::InvalidOrigin {
        origin: origin.to_string(),
        reason: reason.into(),
    }
}

fn tokenize(origin: &str) -> IrResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = origin.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '<' => {
                chars.next();
                tokens.push(Token::Lt);
            }
            '>' => {
                chars.next();
                tokens.push(Token::Gt);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '&' => {
                chars.next();
                tokens.push(Token::Amp);
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            ':' => {
                chars.next();
                if chars.next() != Some(':') {
                    return Err(invalid(origin, "single `:`"));
                }
                tokens.push(Token::PathSep);
            }
            '\'' => {
                chars.next();
                while chars.peek().is_some_and(|c| c.is_alphanumeric() || *c == '_') {
                    chars.next();
                }
                tokens.push(Token::Lifetime);
            }
            c if c.is_alphanumeric() || c == '_' => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => return Err(invalid(origin, format!("unexpected character `{other}`"))),
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    origin: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_type(&mut self) -> IrResult<TypeExpr> {
        if self.eat(&Token::Amp) {
            self.eat(&Token::Lifetime);
            if self.peek() == Some(&Token::Ident("mut".into())) {
                self.pos += 1;
            }
            return self.parse_type();
        }

        if self.peek() == Some(&Token::Ident("dyn".into())) {
            self.pos += 1;
            let first = self.parse_type()?;
            // Auto-trait bounds (`+ Send + Sync`) do not affect the name
            while self.eat(&Token::Plus) {
                self.parse_type()?;
            }
            return Ok(first);
        }

        let mut path = vec![self.parse_ident()?];
        while self.eat(&Token::PathSep) {
            path.push(self.parse_ident()?);
        }

        let mut args = Vec::new();
        if self.eat(&Token::Lt) {
            loop {
                if self.eat(&Token::Gt) {
                    break;
                }
                args.push(self.parse_type()?);
                if self.eat(&Token::Comma) {
                    continue;
                }
                if !self.eat(&Token::Gt) {
                    return Err(invalid(self.origin, "unbalanced `<`"));
                }
                break;
            }
            if args.is_empty() {
                return Err(invalid(self.origin, "empty generic argument list"));
            }
        }

        Ok(TypeExpr { path, args })
    }

    fn parse_ident(&mut self) -> IrResult<String> {
        match self.next() {
            Some(Token::Ident(ident)) => Ok(ident),
            Some(other) => Err(invalid(
                self.origin,
                format!("expected identifier, found {other:?}"),
            )),
            None => Err(invalid(self.origin, "unexpected end of type")),
        }
    }
}

/// Parse a native type spelling into a [`TypeExpr`].
pub fn parse_origin(origin: &str) -> IrResult<TypeExpr> {
    let tokens = tokenize(origin)?;
    if tokens.is_empty() {
        return Err(invalid(origin, "empty type"));
    }

    let mut parser = Parser {
        origin,
        tokens,
        pos: 0,
    };
    let expr = parser.parse_type()?;

    if parser.pos != parser.tokens.len() {
        return Err(invalid(origin, "trailing tokens"));
    }

    Ok(expr)
}

/// Element struct name of a `Vec<T>` spelling.
///
/// `Vec<Vec<T>>` is rejected with [`IrError::NestedVec`], never flattened.
pub fn vec_element_name(origin: &str) -> IrResult<String> {
    let expr = parse_origin(origin)?;
    if expr.base_name() != "Vec" || expr.args.len() != 1 {
        return Err(invalid(origin, "expected `Vec<T>`"));
    }

    let element = &expr.args[0];
    if element.base_name() == "Vec" {
        return Err(IrError::NestedVec(origin.to_string()));
    }
    if element.is_generic() {
        return Err(IrError::UnsupportedShape(format!(
            "generic vector element in `{origin}`"
        )));
    }

    Ok(element.base_name().to_string())
}

/// Callback interface name of a `Box<dyn T>` spelling.
///
/// Accepts `Box`, `Arc` and `Rc` wrappers, `dyn` and references.
pub fn callback_trait_name(origin: &str) -> IrResult<String> {
    let mut expr = parse_origin(origin)?;
    while matches!(expr.base_name(), "Box" | "Arc" | "Rc") && expr.args.len() == 1 {
        expr = expr.args.remove(0);
    }

    if expr.is_generic() {
        return Err(IrError::UnsupportedShape(format!(
            "generic callback interface `{origin}`"
        )));
    }

    Ok(expr.base_name().to_string())
}

/// Struct name of a plain (non-generic) spelling.
pub fn struct_type_name(origin: &str) -> IrResult<String> {
    let expr = parse_origin(origin)?;
    if expr.base_name() == "Vec" {
        return Err(IrError::UnsupportedShape(format!(
            "`{origin}` tagged as Struct"
        )));
    }
    if expr.is_generic() {
        return Err(IrError::UnsupportedShape(format!(
            "generic struct `{origin}`"
        )));
    }

    Ok(expr.base_name().to_string())
}

#[cfg(test)]
#[path = "origin/origin_tests.rs"]
mod origin_tests;
