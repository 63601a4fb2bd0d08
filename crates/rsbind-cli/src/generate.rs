//! `rsbind generate`

use anyhow::{Context, Result};
use rsbind_codegen::{GenConfig, Lang, generate_dir, write_artifact};
use std::path::{Path, PathBuf};

/// Arguments of one `generate` invocation
#[derive(Debug, Clone)]
pub struct GenerateArgs {
    pub ast_dir: PathBuf,
    pub module_name: String,
    pub output_dir: PathBuf,
    pub lang: Option<Lang>,
    pub config: Option<PathBuf>,
    /// Comma-separated libraries loaded after the main one
    pub ext_libs: Option<String>,
}

/// Generate bindings and return the path of the written artifact
pub fn run(args: GenerateArgs) -> Result<PathBuf> {
    let config = resolve_config(&args)?;
    tracing::info!(
        lang = %config.lang,
        module = %config.module_name,
        ast_dir = %args.ast_dir.display(),
        "generating bindings"
    );

    let artifact = generate_dir(&args.ast_dir, config)
        .with_context(|| format!("Failed to generate bindings from {}", args.ast_dir.display()))?;

    write_artifact(&args.output_dir, &artifact)
        .with_context(|| format!("Failed to write {}", args.output_dir.display()))
}

/// Settings file first, then command-line overrides
fn resolve_config(args: &GenerateArgs) -> Result<GenConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => GenConfig::default(),
    };

    config.module_name = args.module_name.clone();
    if let Some(lang) = args.lang {
        config.lang = lang;
    }
    if let Some(list) = &args.ext_libs {
        config = config.with_extra_libraries(list);
    }

    config.validate().context("Invalid generation settings")?;
    Ok(config)
}

fn load_config(path: &Path) -> Result<GenConfig> {
    GenConfig::from_file(path)
        .with_context(|| format!("Failed to load settings: {}", path.display()))
}

#[cfg(test)]
#[path = "generate/generate_tests.rs"]
mod generate_tests;
