//! BindingsBuilder for generator entry points
//!
//! Runs parser, generator and output writing in one call. Both documents are
//! produced in memory first; nothing is written unless generation succeeds.

use crate::config::{GeneratorConfig, PathsConfig, ProjectConfig};
use crate::generate::{GenerateError, GeneratedBindings, GenerationReport, Generator};
use crate::parser::{HeaderParser, JsonDeclParser, ParseError, ParserOptions};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while building bindings
#[derive(Debug, Error)]
pub enum BuildError {
    /// Declarations could not be obtained
    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),

    /// Generation aborted
    #[error("generation failed: {0}")]
    Generate(#[from] GenerateError),

    /// An output file could not be written
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Builder for the glue and binding files
///
/// # Example
/// ```ignore
/// use sharp_weld::build::BindingsBuilder;
/// use sharp_weld::config::GeneratorConfig;
///
/// let output = BindingsBuilder::new(GeneratorConfig::default())
///     .declarations("native/simdjson.decl.json")
///     .glue_output("native/bindings.cpp")
///     .binding_output("managed/Bindings.Generated.cs")
///     .build()?;
/// println!("{}", output.report);
/// ```
pub struct BindingsBuilder {
    config: GeneratorConfig,
    parser_options: ParserOptions,
    paths: PathsConfig,
    parser: Option<Box<dyn HeaderParser>>,
}

impl BindingsBuilder {
    /// Create a builder with default paths and parser options
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            parser_options: ParserOptions::default(),
            paths: PathsConfig::default(),
            parser: None,
        }
    }

    /// Create a builder from a loaded `sharpweld.toml`
    pub fn from_project(project: ProjectConfig) -> Self {
        Self {
            config: project.generator,
            parser_options: project.parser,
            paths: project.paths,
            parser: None,
        }
    }

    /// Set the native header path
    pub fn header(mut self, path: impl AsRef<Path>) -> Self {
        self.paths.header = path.as_ref().to_path_buf();
        self
    }

    /// Set the serialized declaration tree path
    pub fn declarations(mut self, path: impl AsRef<Path>) -> Self {
        self.paths.declarations = path.as_ref().to_path_buf();
        self
    }

    /// Use a custom header parser instead of reading the declaration tree
    pub fn parser(mut self, parser: impl HeaderParser + 'static) -> Self {
        self.parser = Some(Box::new(parser));
        self
    }

    /// Set the parser options
    pub fn parser_options(mut self, options: ParserOptions) -> Self {
        self.parser_options = options;
        self
    }

    /// Set the glue output path
    pub fn glue_output(mut self, path: impl AsRef<Path>) -> Self {
        self.paths.glue_output = path.as_ref().to_path_buf();
        self
    }

    /// Set the bindings output path
    pub fn binding_output(mut self, path: impl AsRef<Path>) -> Self {
        self.paths.binding_output = path.as_ref().to_path_buf();
        self
    }

    /// Configured paths
    pub fn paths(&self) -> &PathsConfig {
        &self.paths
    }

    /// Parse and generate without touching the filesystem outputs
    pub fn generate(&self) -> Result<GeneratedBindings, BuildError> {
        let tree = match &self.parser {
            Some(parser) => parser.parse(&self.paths.header, &self.parser_options)?,
            None => JsonDeclParser::new(&self.paths.declarations)
                .parse(&self.paths.header, &self.parser_options)?,
        };

        Ok(Generator::new(&self.config).generate(&tree)?)
    }

    /// Generate and write both documents
    ///
    /// Each document is staged next to its destination and renamed into
    /// place once both have been staged.
    pub fn build(self) -> Result<BuildOutput, BuildError> {
        let generated = self.generate()?;

        let glue_stage = stage(&self.paths.glue_output, &generated.glue)?;
        let binding_stage = match stage(&self.paths.binding_output, &generated.bindings) {
            Ok(path) => path,
            Err(e) => {
                let _ = fs::remove_file(&glue_stage);
                return Err(e);
            }
        };

        commit(&glue_stage, &self.paths.glue_output)?;
        commit(&binding_stage, &self.paths.binding_output)?;

        info!(
            glue = %self.paths.glue_output.display(),
            bindings = %self.paths.binding_output.display(),
            "wrote bindings"
        );

        Ok(BuildOutput {
            glue: self.paths.glue_output,
            bindings: self.paths.binding_output,
            report: generated.report,
        })
    }
}

/// Output of a successful build
#[derive(Debug)]
pub struct BuildOutput {
    /// Path to the written glue translation unit
    pub glue: PathBuf,
    /// Path to the written bindings file
    pub bindings: PathBuf,
    pub report: GenerationReport,
}

fn staging_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    dest.with_file_name(name)
}

fn stage(dest: &Path, content: &str) -> Result<PathBuf, BuildError> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| BuildError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let staged = staging_path(dest);
    fs::write(&staged, content).map_err(|source| BuildError::Io {
        path: staged.clone(),
        source,
    })?;
    debug!(path = %staged.display(), bytes = content.len(), "staged");
    Ok(staged)
}

fn commit(staged: &Path, dest: &Path) -> Result<(), BuildError> {
    fs::rename(staged, dest).map_err(|source| BuildError::Io {
        path: dest.to_path_buf(),
        source,
    })
}
