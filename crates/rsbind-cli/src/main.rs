//! rsbind CLI - Swift/Kotlin binding generator
//!
//! Commands:
//! - `rsbind generate` - Generate bindings from a directory of AST JSON files
//! - `rsbind check` - Parse and validate an AST directory without writing

use clap::{Parser, Subcommand};
use rsbind_codegen::Lang;
use std::path::PathBuf;

mod check;
mod generate;
mod logging;

use logging::LogLevel;

#[derive(Parser)]
#[command(name = "rsbind")]
#[command(author, version, about = "Generate Swift and Kotlin bindings for Rust crates", long_about = None)]
struct Cli {
    /// Log verbosity (RUST_LOG overrides)
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate host language bindings
    Generate {
        /// Directory holding the AST JSON documents
        ast_dir: PathBuf,

        /// Native module to import (Swift) or package to declare (Kotlin)
        module_name: String,

        /// Output directory, recreated on every run
        output_dir: PathBuf,

        /// Target language (swift, kotlin)
        #[arg(short, long)]
        lang: Option<Lang>,

        /// Path to an rsbind.toml with generation settings
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Extra libraries for Kotlin to load after the main one (comma-separated)
        #[arg(long)]
        ext_libs: Option<String>,
    },

    /// Validate an AST directory
    Check {
        /// Directory holding the AST JSON documents
        ast_dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level);

    match cli.command {
        Commands::Generate {
            ast_dir,
            module_name,
            output_dir,
            lang,
            config,
            ext_libs,
        } => {
            let path = generate::run(generate::GenerateArgs {
                ast_dir,
                module_name,
                output_dir,
                lang,
                config,
                ext_libs,
            })?;
            println!("Generated {}", path.display());
        }
        Commands::Check { ast_dir } => {
            let summary = check::run(&ast_dir)?;
            println!("{summary}");
        }
    }

    Ok(())
}
