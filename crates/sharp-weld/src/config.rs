//! Generator configuration
//!
//! Every value the pipeline consults is carried here and passed down
//! explicitly. A `sharpweld.toml` file may override any field; omitted
//! sections fall back to the defaults for the simdjson bindings.
//!
//! ```toml
//! [paths]
//! declarations = "native/simdjson.decl.json"
//!
//! [generator]
//! namespace = "SimdJsonSharp"
//! ignore = ["padded_string", "basic_ostream"]
//! constructors = "first-declared"
//!
//! [[generator.renames]]
//! from = "GetType"
//! to = "GetTokenType"
//! ```

use crate::parser::ParserOptions;
use crate::policy::{default_renames, ConstructorPolicy, IgnoreFilter, NamingPolicy, RenameRule};
use crate::ir::TypeMapper;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("failed to parse config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings that shape the generated documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// C# namespace wrapping every wrapper class
    pub namespace: String,
    /// Hand-written class holding the native library name
    pub main_class: String,
    /// Constant on `main_class` with the library name
    pub native_lib: String,
    /// Header included by the glue translation unit
    pub header_include: String,
    /// Denylist of native names
    pub ignore: IgnoreFilter,
    /// Native names that map to generated wrapper names
    pub type_aliases: BTreeMap<String, String>,
    /// Fixed member renames
    pub renames: Vec<RenameRule>,
    /// Which constructors are bound
    pub constructors: ConstructorPolicy,
    /// Prefix that turns zero-parameter functions into properties
    pub property_prefix: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let mut type_aliases = BTreeMap::new();
        type_aliases.insert("iterator".to_string(), "ParsedJsonIteratorN".to_string());
        type_aliases.insert("ParsedJson".to_string(), "ParsedJsonN".to_string());

        Self {
            namespace: "SimdJsonSharp".to_string(),
            main_class: "SimdJsonN".to_string(),
            native_lib: "NativeLib".to_string(),
            header_include: "simdjson.h".to_string(),
            ignore: IgnoreFilter::default(),
            type_aliases,
            renames: default_renames(),
            constructors: ConstructorPolicy::FirstDeclared,
            property_prefix: "is".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// `MainClass.NativeLib` expression used in every `[DllImport]`
    pub fn native_lib_ref(&self) -> String {
        format!("{}.{}", self.main_class, self.native_lib)
    }

    /// Type mapper over the configured aliases
    pub fn type_mapper(&self) -> TypeMapper {
        TypeMapper::new(self.type_aliases.clone())
    }

    /// Naming policy over the configured renames
    pub fn naming(&self) -> NamingPolicy {
        NamingPolicy::new(self.renames.clone(), self.property_prefix.clone())
    }

    /// Set the namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the header include
    pub fn with_header_include(mut self, header: impl Into<String>) -> Self {
        self.header_include = header.into();
        self
    }

    /// Replace the denylist
    pub fn with_ignore(mut self, ignore: IgnoreFilter) -> Self {
        self.ignore = ignore;
        self
    }

    /// Add a type alias
    pub fn with_alias(mut self, native: impl Into<String>, host: impl Into<String>) -> Self {
        self.type_aliases.insert(native.into(), host.into());
        self
    }

    /// Set the constructor policy
    pub fn with_constructors(mut self, policy: ConstructorPolicy) -> Self {
        self.constructors = policy;
        self
    }
}

/// Input and output locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Native header the declarations were parsed from
    pub header: PathBuf,
    /// Serialized declaration tree
    pub declarations: PathBuf,
    /// Generated C++ glue translation unit
    pub glue_output: PathBuf,
    /// Generated C# bindings
    pub binding_output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        let native = Path::new("../../src/BindingsForNativeLib/SimdJsonNative");
        Self {
            header: native.join("simdjson.h"),
            declarations: native.join("simdjson.decl.json"),
            glue_output: native.join("bindings.cpp"),
            binding_output: Path::new("../../src/BindingsForNativeLib/SimdJsonSharp.Bindings")
                .join("Bindings.Generated.cs"),
        }
    }
}

/// Full contents of a `sharpweld.toml` file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProjectConfig {
    pub paths: PathsConfig,
    pub parser: ParserOptions,
    pub generator: GeneratorConfig,
}

impl ProjectConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }
}
