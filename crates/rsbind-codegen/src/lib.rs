//! rsbind-codegen - Host-language binding generation
//!
//! Turns a validated [`rsbind_ir::AstResult`] into one Swift or Kotlin
//! source file:
//! - [`marshal`] decides how every value crosses the native boundary
//! - [`generator`] builds a [`model`] tree per entity
//! - [`backend`] spells that tree and the marshaling statements per language
//! - [`render`] prints the tree
//! - [`BindingGenerator`] ties the steps together
//!
//! # Example
//!
//! ```rust,no_run
//! use rsbind_codegen::{GenConfig, Lang, generate_dir, write_artifact};
//! use std::path::Path;
//!
//! let config = GenConfig::new("demo").with_lang(Lang::Kotlin);
//! let artifact = generate_dir(Path::new("target/ast"), config).unwrap();
//! write_artifact(Path::new("bindings"), &artifact).unwrap();
//! ```

pub mod backend;
mod config;
mod error;
mod generate;
pub mod generator;
pub mod marshal;
pub mod model;
pub mod naming;
pub mod render;

pub use config::{GenConfig, Lang};
pub use error::{CodegenError, CodegenResult};
pub use generate::{Artifact, BindingGenerator, generate_dir, write_artifact};
