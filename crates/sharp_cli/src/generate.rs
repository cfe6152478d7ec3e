//! `sharpweld generate` and `sharpweld check`
//!
//! Both commands load the project configuration, apply flag overrides and
//! run the generator; only `generate` writes files.

use anyhow::{bail, Context, Result};
use sharp_weld::build::BindingsBuilder;
use sharp_weld::config::ProjectConfig;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = "sharpweld.toml";

/// What to do with the generated documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Write,
    Check,
}

/// Run a generation command with the given arguments
pub fn run(args: &[String], mode: Mode) -> Result<()> {
    let cmd = GenerateCommand::parse(args)?;
    let project = cmd.load_project()?;

    let mut builder = BindingsBuilder::from_project(project);
    if let Some(ref path) = cmd.header {
        builder = builder.header(path);
    }
    if let Some(ref path) = cmd.declarations {
        builder = builder.declarations(path);
    }
    if let Some(ref path) = cmd.glue_out {
        builder = builder.glue_output(path);
    }
    if let Some(ref path) = cmd.bindings_out {
        builder = builder.binding_output(path);
    }

    match mode {
        Mode::Check => {
            let generated = builder.generate().with_context(|| {
                format!(
                    "generating bindings from {}",
                    builder.paths().declarations.display()
                )
            })?;
            print!("{}", generated.report);
        }
        Mode::Write => {
            let declarations = builder.paths().declarations.clone();
            let output = builder
                .build()
                .with_context(|| format!("generating bindings from {}", declarations.display()))?;
            println!("Wrote {}", output.glue.display());
            println!("Wrote {}", output.bindings.display());
            print!("{}", output.report);
        }
    }

    Ok(())
}

/// Flags shared by `generate` and `check`
#[derive(Debug, Default)]
struct GenerateCommand {
    config: Option<PathBuf>,
    header: Option<PathBuf>,
    declarations: Option<PathBuf>,
    glue_out: Option<PathBuf>,
    bindings_out: Option<PathBuf>,
}

impl GenerateCommand {
    fn parse(args: &[String]) -> Result<Self> {
        let mut cmd = GenerateCommand::default();

        let mut i = 0;
        while i < args.len() {
            let slot = match args[i].as_str() {
                "--config" | "-c" => &mut cmd.config,
                "--header" => &mut cmd.header,
                "--declarations" | "-d" => &mut cmd.declarations,
                "--glue-out" => &mut cmd.glue_out,
                "--bindings-out" => &mut cmd.bindings_out,
                _ => bail!("Unknown flag: {}", args[i]),
            };
            match args.get(i + 1) {
                Some(value) => *slot = Some(PathBuf::from(value)),
                None => bail!("{} requires a path", args[i]),
            }
            i += 2;
        }

        Ok(cmd)
    }

    /// Explicit config must exist; the default one is optional
    fn load_project(&self) -> Result<ProjectConfig> {
        match &self.config {
            Some(path) => ProjectConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display())),
            None if Path::new(DEFAULT_CONFIG).exists() => {
                ProjectConfig::from_file(Path::new(DEFAULT_CONFIG)).context("loading sharpweld.toml")
            }
            None => Ok(ProjectConfig::default()),
        }
    }
}
