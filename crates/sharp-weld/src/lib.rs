//! Sharp-Weld: C glue and C# binding generation for native C++ classes
//!
//! Takes a parsed tree of C++ class declarations and produces two documents:
//! a C++ translation unit exporting every bindable constructor and member
//! function with C linkage, and a C# file with `[DllImport]` declarations and
//! disposable, handle-owning wrapper classes calling those exports.
//!
//! # Architecture
//!
//! - `ir`: Declaration model, class collection, type mapping and generated symbols
//! - `policy`: Denylist, rename rules, constructor policy and function validation
//! - `codegen`: Glue and binding emitters plus document assembly
//! - `generate`: The generation pass and its report
//! - `parser`: Header parser interface and the JSON declaration reader
//! - `config`: `sharpweld.toml` configuration
//! - `build`: File output for generator entry points
//!
//! # Usage
//!
//! ```rust,ignore
//! use sharp_weld::build::BindingsBuilder;
//! use sharp_weld::config::ProjectConfig;
//!
//! let project = ProjectConfig::from_file("sharpweld.toml".as_ref())?;
//! let output = BindingsBuilder::from_project(project).build()?;
//! println!("{}", output.report);
//! ```

pub mod ir;
pub mod policy;
pub mod config;
pub mod parser;
pub mod codegen;
pub mod generate;
pub mod build;

// Re-export commonly used types
pub use ir::{
    ClassDecl, DeclTree, DeclValidationError, FunctionDecl, FunctionKind, ParameterDecl,
    SourceLocation, TypeDescriptor, TypeMapper, ClassIndex, CollectedClass, collect_classes,
};
pub use policy::{ConstructorPolicy, IgnoreFilter, NamingPolicy, RenameRule, SkipReason};
pub use config::{ConfigError, GeneratorConfig, PathsConfig, ProjectConfig};
pub use parser::{HeaderParser, JsonDeclParser, ParseError, ParserOptions};
pub use codegen::{BindingDocument, BindingEmitter, GlueDocument, GlueEmitter};
pub use generate::{generate, GenerateError, GeneratedBindings, GenerationReport, Generator};
pub use build::{BindingsBuilder, BuildError, BuildOutput};
