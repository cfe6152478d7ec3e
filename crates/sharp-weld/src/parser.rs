//! Header parsing interface
//!
//! Turning C++ source into a [`DeclTree`] is the job of an external parser.
//! Generation only depends on the [`HeaderParser`] trait; the bundled
//! [`JsonDeclParser`] reads a tree that such a parser serialized to JSON.

use crate::ir::{DeclTree, DeclValidationError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Target CPU the header is parsed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TargetCpu {
    X86,
    #[default]
    X86_64,
    Arm,
    Arm64,
}

impl TargetCpu {
    fn triple_arch(&self) -> &'static str {
        match self {
            TargetCpu::X86 => "i686",
            TargetCpu::X86_64 => "x86_64",
            TargetCpu::Arm => "armv7",
            TargetCpu::Arm64 => "aarch64",
        }
    }
}

/// Calling convention / ABI profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AbiProfile {
    #[default]
    Msvc,
    Gnu,
}

/// Options handed to the header parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    pub target_cpu: TargetCpu,
    pub abi: AbiProfile,
    /// Language standard, e.g. `c++17`
    pub language_standard: String,
    /// Expand and record macros
    pub macros: bool,
    /// Extra arguments passed through to the compiler front end
    pub additional_arguments: Vec<String>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            target_cpu: TargetCpu::X86_64,
            abi: AbiProfile::Msvc,
            language_standard: "c++17".to_string(),
            macros: true,
            additional_arguments: Vec::new(),
        }
    }
}

impl ParserOptions {
    /// Clang-style command line describing these options.
    ///
    /// Intended for the external tool that produces the declaration tree;
    /// nothing in this crate invokes a compiler with it. The generator only
    /// logs it.
    pub fn compiler_args(&self) -> Vec<String> {
        let triple = match self.abi {
            AbiProfile::Msvc => format!("{}-pc-windows-msvc", self.target_cpu.triple_arch()),
            AbiProfile::Gnu => format!("{}-unknown-linux-gnu", self.target_cpu.triple_arch()),
        };

        let mut args = vec![
            "-x".to_string(),
            "c++".to_string(),
            format!("--target={}", triple),
            format!("-std={}", self.language_standard),
        ];
        if self.abi == AbiProfile::Msvc {
            args.push("-fms-extensions".to_string());
            args.push("-fms-compatibility".to_string());
        }
        if self.macros {
            args.push("-Xclang".to_string());
            args.push("-detailed-preprocessing-record".to_string());
        }
        args.extend(self.additional_arguments.iter().cloned());
        args
    }
}

/// Errors reported by a header parser
#[derive(Debug, Error)]
pub enum ParseError {
    /// Input could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialized declarations are malformed
    #[error("malformed declarations in {path} at line {line}, column {column}: {message}")]
    Json {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// Declarations parsed but are structurally invalid
    #[error("invalid declarations: {0}")]
    Invalid(#[from] DeclValidationError),
}

/// Source of declaration trees
pub trait HeaderParser {
    /// Parse `header` into a declaration tree
    fn parse(&self, header: &Path, options: &ParserOptions) -> Result<DeclTree, ParseError>;
}

/// Reads a declaration tree serialized as JSON
#[derive(Debug, Clone)]
pub struct JsonDeclParser {
    declarations: PathBuf,
}

impl JsonDeclParser {
    /// Create a parser reading `declarations`
    pub fn new(declarations: impl Into<PathBuf>) -> Self {
        Self {
            declarations: declarations.into(),
        }
    }

    /// Path of the serialized tree
    pub fn declarations(&self) -> &Path {
        &self.declarations
    }

    /// Parse a serialized tree; `origin` names the input in errors
    pub fn parse_str(json: &str, origin: &Path) -> Result<DeclTree, ParseError> {
        let tree: DeclTree = serde_json::from_str(json).map_err(|e| ParseError::Json {
            path: origin.to_path_buf(),
            line: e.line(),
            column: e.column(),
            message: e.to_string(),
        })?;

        let tree = tree.normalize();
        tree.validate()?;
        Ok(tree)
    }
}

impl HeaderParser for JsonDeclParser {
    fn parse(&self, header: &Path, options: &ParserOptions) -> Result<DeclTree, ParseError> {
        debug!(
            header = %header.display(),
            declarations = %self.declarations.display(),
            args = ?options.compiler_args(),
            "sharp_weld.parse"
        );

        let json = fs::read_to_string(&self.declarations).map_err(|source| ParseError::Io {
            path: self.declarations.clone(),
            source,
        })?;
        let tree = Self::parse_str(&json, &self.declarations)?;

        if let (Some(recorded), Some(requested)) = (tree.header.as_deref(), header.file_name()) {
            let recorded_name = Path::new(recorded).file_name();
            if recorded_name != Some(requested) {
                warn!(
                    recorded = %recorded,
                    requested = %header.display(),
                    "declaration tree was parsed from a different header"
                );
            }
        }

        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_compiler_args() {
        let args = ParserOptions::default().compiler_args();
        assert!(args.contains(&"--target=x86_64-pc-windows-msvc".to_string()));
        assert!(args.contains(&"-std=c++17".to_string()));
        assert!(args.contains(&"-fms-extensions".to_string()));

        let gnu = ParserOptions {
            target_cpu: TargetCpu::Arm64,
            abi: AbiProfile::Gnu,
            macros: false,
            ..ParserOptions::default()
        };
        let args = gnu.compiler_args();
        assert!(args.contains(&"--target=aarch64-unknown-linux-gnu".to_string()));
        assert!(!args.contains(&"-fms-extensions".to_string()));
        assert!(!args.contains(&"-detailed-preprocessing-record".to_string()));
    }

    #[test]
    fn test_parse_str_reports_position() {
        let err = JsonDeclParser::parse_str("{ \"classes\": [ { \"name\": } ] }", Path::new("x.json"))
            .unwrap_err();
        match err {
            ParseError::Json { line, column, .. } => {
                assert_eq!(line, 1);
                assert!(column > 0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_str_validates() {
        let err = JsonDeclParser::parse_str(
            r#"{ "classes": [ { "name": "A" }, { "name": "A" } ] }"#,
            Path::new("x.json"),
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::Invalid(DeclValidationError::DuplicateClass { .. })));
    }

    #[test]
    fn test_parse_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "header": "simdjson.h", "classes": [ {{ "name": "ParsedJson", "constructors": [ {{ "name": "ParsedJson" }} ] }} ] }}"#
        )
        .unwrap();

        let parser = JsonDeclParser::new(file.path());
        let tree = parser
            .parse(Path::new("include/simdjson.h"), &ParserOptions::default())
            .unwrap();

        assert_eq!(tree.classes.len(), 1);
        assert!(tree.classes[0].constructors[0].is_constructor());
    }

    #[test]
    fn test_parse_missing_file() {
        let parser = JsonDeclParser::new("/nonexistent/decls.json");
        let err = parser
            .parse(Path::new("simdjson.h"), &ParserOptions::default())
            .unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
    }
}
