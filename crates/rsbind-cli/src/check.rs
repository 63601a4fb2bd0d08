//! `rsbind check`

use anyhow::{Context, Result};
use rsbind_ir::AstResult;
use std::fmt;
use std::path::Path;

/// Entity counts of a valid AST directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckSummary {
    pub services: usize,
    pub callbacks: usize,
    pub structs: usize,
}

impl fmt::Display for CheckSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AST is valid: {} service(s), {} callback(s), {} struct(s)",
            self.services, self.callbacks, self.structs
        )
    }
}

/// Load every AST document in `ast_dir`; loading validates cross references
pub fn run(ast_dir: &Path) -> Result<CheckSummary> {
    let ast = AstResult::load_dir(ast_dir)
        .with_context(|| format!("Failed to load AST from {}", ast_dir.display()))?;

    if ast.is_empty() {
        tracing::warn!(dir = %ast_dir.display(), "AST directory holds no entities");
    }

    Ok(CheckSummary {
        services: ast.services().count(),
        callbacks: ast.callbacks().count(),
        structs: ast.structs().len(),
    })
}
