//! Error types for AST parsing and IR validation

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for IR operations
pub type IrResult<T> = Result<T, IrError>;

/// Error type for AST parsing and IR validation
///
/// Every variant is fatal: a generation run stops at the first error and
/// nothing is written.
#[derive(Error, Debug)]
pub enum IrError {
    /// Failed to read an AST file or directory
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A required key is absent
    #[error("missing required key `{key}` in {context}")]
    MissingKey { key: String, context: String },

    /// A key is present but holds the wrong JSON shape
    #[error("key `{key}` in {context} must be {expected}")]
    WrongShape {
        key: String,
        context: String,
        expected: &'static str,
    },

    /// The `ty` discriminator is neither `trait` nor `struct`
    #[error("unknown entity kind: {0}")]
    UnknownEntity(String),

    /// A type tag outside the closed type set
    #[error("unknown type `{ty}` in {context}")]
    UnknownType { ty: String, context: String },

    /// A vector whose element is itself a vector
    #[error("nested vectors are not supported: {0}")]
    NestedVec(String),

    /// A type combination outside the supported set (vector of callback, ...)
    #[error("unsupported type shape: {0}")]
    UnsupportedShape(String),

    /// The native type spelling could not be tokenized
    #[error("invalid origin type `{origin}`: {reason}")]
    InvalidOrigin { origin: String, reason: String },

    /// A callback argument names an interface that was never parsed
    #[error("unresolved callback `{callback}` referenced by {trait_name}::{method}")]
    UnresolvedCallback {
        callback: String,
        trait_name: String,
        method: String,
    },

    /// A struct type names a struct that was never parsed
    #[error("unresolved struct `{name}` referenced by {owner}")]
    UnresolvedStruct { name: String, owner: String },

    /// Two entities share a name
    #[error("duplicate entity name: {0}")]
    DuplicateEntity(String),

    /// Wraps an error with the AST file it came from
    #[error("{path}: {source}")]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<IrError>,
    },
}

impl IrError {
    /// Attach the offending file path to this error
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            already @ IrError::InFile { .. } => already,
            other => IrError::InFile {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }

    /// Returns the innermost error, skipping file context wrappers
    pub fn root(&self) -> &IrError {
        match self {
            IrError::InFile { source, .. } => source.root(),
            other => other,
        }
    }
}
