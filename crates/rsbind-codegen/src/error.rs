//! Error types for binding generation

use rsbind_ir::IrError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for code generation
pub type CodegenResult<T> = Result<T, CodegenError>;

/// Error type for code generation
#[derive(Error, Debug)]
pub enum CodegenError {
    /// Parsing or validating the AST failed
    #[error(transparent)]
    Ir(#[from] IrError),

    /// A code model node names a type that is neither declared, builtin nor imported
    #[error("unresolved type `{name}` referenced by {context}")]
    UnresolvedType { name: String, context: String },

    /// A type combination outside what the marshaling protocol supports
    #[error("unsupported shape: {0}")]
    UnsupportedShape(String),

    /// Two IR names map to the same host identifier
    #[error("`{first}` and `{second}` both map to `{name}` in {scope}")]
    NameCollision {
        scope: String,
        first: String,
        second: String,
        name: String,
    },

    /// Invalid generation settings
    #[error("configuration error: {0}")]
    Config(String),

    /// Failed to write the generated artifact
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CodegenError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> CodegenError {
        let path = path.into();
        move |source| CodegenError::Io { path, source }
    }
}
