//! Generation settings
//!
//! Settings come from an optional `rsbind.toml`; command-line flags override
//! individual keys afterwards.
//!
//! ```toml
//! lang = "kotlin"
//! module_name = "demo"
//! library_name = "demo_jni"
//! extra_libraries = ["c++_shared", "ssl"]
//! indent = 4
//! header = "Generated by rsbind. Do not edit."
//! ```

use crate::error::{CodegenError, CodegenResult};
use crate::naming::to_symbol;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Target language of a generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    /// Swift over the C ABI
    #[default]
    Swift,
    /// Kotlin over JNI
    Kotlin,
}

impl Lang {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lang::Swift => "swift",
            Lang::Kotlin => "kotlin",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lang {
    type Err = CodegenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "swift" => Ok(Lang::Swift),
            "kotlin" | "kt" => Ok(Lang::Kotlin),
            other => Err(CodegenError::Config(format!(
                "unknown target language `{other}` (expected swift or kotlin)"
            ))),
        }
    }
}

/// Settings for one generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenConfig {
    /// Target backend
    #[serde(default)]
    pub lang: Lang,

    /// Native module imported by Swift, package name for Kotlin
    #[serde(default)]
    pub module_name: String,

    /// Library passed to `System.loadLibrary` (defaults to the trait's crate)
    #[serde(default)]
    pub library_name: Option<String>,

    /// Libraries loaded after the main one, in order
    #[serde(default)]
    pub extra_libraries: Vec<String>,

    /// Spaces per indentation level
    #[serde(default = "default_indent")]
    pub indent: usize,

    /// Comment line placed at the top of the artifact
    #[serde(default)]
    pub header: Option<String>,
}

fn default_indent() -> usize {
    4
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            lang: Lang::default(),
            module_name: String::new(),
            library_name: None,
            extra_libraries: Vec::new(),
            indent: default_indent(),
            header: None,
        }
    }
}

impl GenConfig {
    /// Create a configuration for `module_name` with default settings
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            ..Self::default()
        }
    }

    pub fn with_lang(mut self, lang: Lang) -> Self {
        self.lang = lang;
        self
    }

    pub fn with_library_name(mut self, library: impl Into<String>) -> Self {
        self.library_name = Some(library.into());
        self
    }

    /// Append libraries from a comma-separated list; blank entries are skipped
    pub fn with_extra_libraries(mut self, list: &str) -> Self {
        self.extra_libraries.extend(
            list.split(',')
                .map(str::trim)
                .filter(|lib| !lib.is_empty())
                .map(String::from),
        );
        self
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Load settings from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> CodegenResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(CodegenError::io(path))?;

        Self::from_str(&content)
            .map_err(|e| CodegenError::Config(format!("{}: {e}", path.display())))
    }

    /// Parse settings from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> CodegenResult<Self> {
        toml::from_str(content).map_err(|e| CodegenError::Config(e.to_string()))
    }

    /// Check that the settings can produce a usable artifact
    pub fn validate(&self) -> CodegenResult<()> {
        if self.module_name.trim().is_empty() {
            return Err(CodegenError::Config("module name cannot be empty".into()));
        }

        if !is_identifier_path(&self.module_name) {
            return Err(CodegenError::Config(format!(
                "module name `{}` must be an identifier (dots allowed for packages)",
                self.module_name
            )));
        }

        if self.indent == 0 {
            return Err(CodegenError::Config("indent must be at least 1".into()));
        }

        if let Some(library) = &self.library_name
            && library.trim().is_empty()
        {
            return Err(CodegenError::Config("library name cannot be empty".into()));
        }

        Ok(())
    }

    /// Native library name, falling back to the cdylib of `crate_name`
    pub fn library_name(&self, crate_name: &str) -> String {
        match &self.library_name {
            Some(library) => library.clone(),
            None => to_symbol(crate_name),
        }
    }

    /// Extra libraries to load, without blank entries
    pub fn extra_libraries(&self) -> impl Iterator<Item = &str> {
        self.extra_libraries
            .iter()
            .map(|lib| lib.trim())
            .filter(|lib| !lib.is_empty())
    }
}

fn is_identifier_path(name: &str) -> bool {
    name.split('.').all(|segment| {
        let mut chars = segment.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}
