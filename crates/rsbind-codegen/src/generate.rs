//! Generation orchestrator.
//!
//! Runs the generators over a validated [`AstResult`] and renders the single
//! output artifact. Nothing touches the filesystem until
//! [`write_artifact`], so a failed run never leaves partial output behind.

use crate::backend::{Backend, BindingContext, for_lang};
use crate::config::GenConfig;
use crate::error::{CodegenError, CodegenResult};
use crate::generator::{CallbackGenerator, StructGenerator, TraitGenerator};
use crate::model::{FileSpec, Member};
use crate::render::Renderer;
use rsbind_ir::AstResult;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// One generated source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub contents: String,
}

/// Generates the bindings artifact for one target language
pub struct BindingGenerator {
    config: GenConfig,
    backend: Box<dyn Backend>,
}

impl BindingGenerator {
    pub fn new(config: GenConfig) -> Self {
        let backend = for_lang(config.lang);
        Self { config, backend }
    }

    pub fn config(&self) -> &GenConfig {
        &self.config
    }

    /// Generate the artifact for `ast`
    pub fn generate(&self, ast: &AstResult) -> CodegenResult<Artifact> {
        self.config.validate()?;
        ast.validate()?;
        self.check_host_names(ast)?;

        let backend = self.backend.as_ref();
        let config = &self.config;

        let mut file = FileSpec::builder(backend.file_name(&config.module_name))
            .header(config.header.clone());
        if let Some(package) = backend.package(config) {
            file = file.package(package);
        }
        for import in backend.file_imports(config) {
            file = file.import(import);
        }

        file = file.members(self.registries(ast));

        let structs = StructGenerator::new(backend);
        for desc in ast.structs() {
            tracing::debug!(name = %desc.name, "generating struct");
            file = file.member(structs.generate(desc));
        }

        let callbacks = CallbackGenerator::new(backend);
        for desc in ast.callbacks() {
            tracing::debug!(name = %desc.name, "generating callback interface");
            file = file.member(callbacks.generate(desc));
        }

        let services = TraitGenerator::new(backend);
        let mut claimed = BTreeSet::new();
        for desc in ast.services() {
            let proxies: Vec<&str> = desc
                .callback_returns()
                .into_iter()
                .filter(|name| claimed.insert(name.to_string()))
                .collect();

            let ctx = BindingContext::for_trait(ast, config, desc);
            for spec in services.generate(&ctx, desc, &proxies)? {
                file = file.member(spec);
            }
        }

        let file = file.build();
        let contents = Renderer::new(backend, config.indent).render(&file)?;

        tracing::info!(
            lang = %config.lang,
            file = %file.name(),
            structs = ast.structs().len(),
            callbacks = ast.callbacks().count(),
            services = ast.services().count(),
            "generated bindings"
        );

        Ok(Artifact {
            file_name: file.name().to_string(),
            contents,
        })
    }

    /// Reject methods, arguments and fields whose host names coincide
    fn check_host_names(&self, ast: &AstResult) -> CodegenResult<()> {
        let host_name = |name: &str| self.backend.host_name(name);

        for desc in ast.traits() {
            let methods = desc.methods.iter().map(|m| m.name.as_str());
            unique_host_names(&desc.name, methods, host_name)?;

            for method in &desc.methods {
                let scope = format!("{}.{}", desc.name, method.name);
                let args = method.wire_args().map(|arg| arg.name.as_str());
                unique_host_names(&scope, args, host_name)?;
            }
        }

        for desc in ast.structs() {
            let fields = desc.fields.iter().map(|field| field.name.as_str());
            unique_host_names(&desc.name, fields, |name| name.to_string())?;
        }

        Ok(())
    }

    /// Registry helper type and one registry per callback kind
    fn registries(&self, ast: &AstResult) -> Vec<Member> {
        let mut callbacks = ast.callbacks().peekable();
        if callbacks.peek().is_none() {
            return Vec::new();
        }

        let mut members = self.backend.registry_prelude();
        members.extend(callbacks.map(|desc| self.backend.registry_declaration(&desc.name)));
        members
    }
}

fn unique_host_names<'a>(
    scope: &str,
    names: impl Iterator<Item = &'a str>,
    host_name: impl Fn(&str) -> String,
) -> CodegenResult<()> {
    let mut seen = BTreeMap::new();
    for name in names {
        let mapped = host_name(name);
        if let Some(first) = seen.insert(mapped.clone(), name) {
            return Err(CodegenError::NameCollision {
                scope: scope.to_string(),
                first: first.to_string(),
                second: name.to_string(),
                name: mapped,
            });
        }
    }
    Ok(())
}

/// Load every AST document in `ast_dir` and generate the artifact
pub fn generate_dir(ast_dir: &Path, config: GenConfig) -> CodegenResult<Artifact> {
    let ast = AstResult::load_dir(ast_dir)?;
    tracing::debug!(
        dir = %ast_dir.display(),
        traits = ast.traits().len(),
        structs = ast.structs().len(),
        "loaded AST"
    );

    BindingGenerator::new(config).generate(&ast)
}

/// Recreate `out_dir` and write `artifact` into it.
///
/// Any existing contents of `out_dir` are deleted first.
pub fn write_artifact(out_dir: &Path, artifact: &Artifact) -> CodegenResult<PathBuf> {
    if out_dir.exists() {
        fs::remove_dir_all(out_dir).map_err(CodegenError::io(out_dir))?;
    }
    fs::create_dir_all(out_dir).map_err(CodegenError::io(out_dir))?;

    let path = out_dir.join(&artifact.file_name);
    fs::write(&path, &artifact.contents).map_err(CodegenError::io(&path))?;

    tracing::info!(path = %path.display(), bytes = artifact.contents.len(), "wrote artifact");
    Ok(path)
}

#[cfg(test)]
#[path = "generate/generate_tests.rs"]
mod generate_tests;
