//! rsbind-ir - Intermediate representation for FFI binding generation
//!
//! This crate turns the JSON AST emitted by the native-side producer into a
//! validated, immutable IR:
//! - [`AstType`] / [`AstBaseType`], the closed set of boundary types
//! - [`TraitDesc`], [`StructDesc`], [`MethodDesc`], [`ArgDesc`]
//! - [`AstEntity`] parsing (one document per entity) and [`AstResult`]
//!   aggregation with cross-reference validation
//! - [`origin`], a recursive-descent parser for native type spellings
//!
//! # Example
//!
//! ```rust,no_run
//! use rsbind_ir::AstResult;
//! use std::path::Path;
//!
//! let ast = AstResult::load_dir(Path::new("target/ast")).unwrap();
//! for service in ast.services() {
//!     println!("{} ({} methods)", service.name, service.methods.len());
//! }
//! ```

mod desc;
mod error;
pub mod origin;
mod parser;
mod types;

pub use desc::{ArgDesc, AstEntity, AstResult, MethodDesc, StructDesc, TraitDesc};
pub use error::{IrError, IrResult};
pub use parser::list_ast_files;
pub use types::{AstBaseType, AstType};
