//! Binding generation
//!
//! [`Generator`] drives the whole transform: it collects classes, decides
//! which classes and functions are eligible, and feeds each surviving
//! function through the glue and binding emitters together so both output
//! documents always describe the same set of exports.

use crate::codegen::{BindingDocument, BindingEmitter, GlueDocument, GlueEmitter};
use crate::config::GeneratorConfig;
use crate::ir::{
    collect_classes, BindingClass, ClassIndex, CollectedClass, DeclTree, DeclValidationError,
    FunctionDecl, GlueClass, TypeMapper,
};
use crate::policy::{ConstructorPolicy, FunctionValidator, NamingPolicy, SkipReason};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that abort generation
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The declaration tree is structurally invalid
    #[error("invalid declaration tree: {0}")]
    Invalid(#[from] DeclValidationError),
}

/// A class that produced output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassReport {
    /// Qualified native name
    pub name: String,
    /// Generated wrapper class name
    pub wrapper: String,
    /// Glue export names in emission order, dispose last
    pub exports: Vec<String>,
}

/// A class or function that produced no output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipRecord {
    /// Qualified native class name
    pub class: String,
    /// Native function name, `None` when the whole class was skipped
    pub function: Option<String>,
    pub reason: SkipReason,
}

/// What a generation run emitted and what it left out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub classes: Vec<ClassReport>,
    pub skipped: Vec<SkipRecord>,
}

impl GenerationReport {
    /// Total number of glue exports, dispose exports included
    pub fn export_count(&self) -> usize {
        self.classes.iter().map(|c| c.exports.len()).sum()
    }

    /// Skip records for one class, function-level and class-level
    pub fn skipped_in<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a SkipRecord> + 'a {
        self.skipped.iter().filter(move |s| s.class == class)
    }

    fn skip(&mut self, class: &str, function: Option<&FunctionDecl>, reason: SkipReason) {
        debug!(
            class = %class,
            function = function.map(|f| f.name.as_str()).unwrap_or("-"),
            reason = %reason,
            "skipped"
        );
        self.skipped.push(SkipRecord {
            class: class.to_string(),
            function: function.map(|f| f.name.clone()),
            reason,
        });
    }
}

impl fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} classes, {} exports, {} skipped",
            self.classes.len(),
            self.export_count(),
            self.skipped.len()
        )?;
        for class in &self.classes {
            writeln!(f, "  {} -> {} ({} exports)", class.name, class.wrapper, class.exports.len())?;
        }
        for skip in &self.skipped {
            match &skip.function {
                Some(function) => writeln!(f, "  skipped {}::{}: {}", skip.class, function, skip.reason)?,
                None => writeln!(f, "  skipped {}: {}", skip.class, skip.reason)?,
            }
        }
        Ok(())
    }
}

/// The two generated documents plus the run report
#[derive(Debug, Clone)]
pub struct GeneratedBindings {
    /// C++ glue translation unit
    pub glue: String,
    /// C# bindings file
    pub bindings: String,
    pub report: GenerationReport,
}

/// Generator turning a declaration tree into glue and bindings
pub struct Generator<'c> {
    config: &'c GeneratorConfig,
    mapper: TypeMapper,
    naming: NamingPolicy,
}

impl<'c> Generator<'c> {
    /// Create a generator over an immutable configuration
    pub fn new(config: &'c GeneratorConfig) -> Self {
        Self {
            config,
            mapper: config.type_mapper(),
            naming: config.naming(),
        }
    }

    /// Generate both documents for `tree`
    pub fn generate(&self, tree: &DeclTree) -> Result<GeneratedBindings, GenerateError> {
        tree.validate()?;

        let collected = collect_classes(tree);
        let mut report = GenerationReport::default();
        let mut exports: HashSet<String> = HashSet::new();

        let eligible = self.eligible_classes(&collected, &mut report, &mut exports);

        let mut index = ClassIndex::new();
        for class in &eligible {
            index.insert(class, self.mapper.map(class.name()));
        }

        let glue_emitter = GlueEmitter::new(&index);
        let binding_emitter = BindingEmitter::new(&self.mapper, &self.naming, &index);
        let validator = FunctionValidator::new(&self.config.ignore, &index);

        let mut glue_doc = GlueDocument::new(&self.config.header_include);
        let mut binding_doc = BindingDocument::new(&self.config.namespace, self.config.native_lib_ref());

        for class in &eligible {
            let wrapper_name = binding_emitter.wrapper_name(class);
            let mut glue_functions = Vec::new();
            let mut methods = Vec::new();

            for function in self.bound_functions(class, &mut report) {
                if let Err(reason) = validator.validate(function) {
                    report.skip(&class.qualified_name, Some(function), reason);
                    continue;
                }

                let export = GlueEmitter::export_name(class, function);
                if !exports.insert(export.clone()) {
                    report.skip(
                        &class.qualified_name,
                        Some(function),
                        SkipReason::DuplicateExport { export },
                    );
                    continue;
                }

                let glue = glue_emitter.emit(class, function);
                let method = binding_emitter.emit(class, function, &glue.export_name);
                debug!(class = %class.qualified_name, export = %glue.export_name, "emitted");

                glue_functions.push(glue);
                methods.push(method);
            }

            let dispose = glue_emitter.dispose(class);
            let mut class_exports: Vec<String> =
                glue_functions.iter().map(|f| f.export_name.clone()).collect();
            class_exports.push(dispose.export_name.clone());

            report.classes.push(ClassReport {
                name: class.qualified_name.clone(),
                wrapper: wrapper_name.clone(),
                exports: class_exports,
            });

            glue_doc.class(GlueClass {
                qualified_name: class.qualified_name.clone(),
                functions: glue_functions,
                dispose,
            });
            binding_doc.class(BindingClass {
                wrapper_name,
                methods,
                dispose: binding_emitter.dispose(class),
            });
        }

        info!(
            classes = report.classes.len(),
            exports = report.export_count(),
            skipped = report.skipped.len(),
            "generated bindings"
        );

        Ok(GeneratedBindings {
            glue: glue_doc.build(),
            bindings: binding_doc.build(),
            report,
        })
    }

    /// Drop denylisted classes, their nested classes, and classes whose
    /// dispose export would collide with an earlier one
    fn eligible_classes<'t>(
        &self,
        collected: &[CollectedClass<'t>],
        report: &mut GenerationReport,
        exports: &mut HashSet<String>,
    ) -> Vec<CollectedClass<'t>> {
        let mut ignored: HashSet<String> = HashSet::new();
        let mut eligible = Vec::new();

        for class in collected {
            let inside_ignored = class.ancestors().iter().any(|a| ignored.contains(a));
            let denylisted = class
                .scoped_names()
                .iter()
                .any(|name| self.config.ignore.is_ignored(name));

            if inside_ignored || denylisted {
                ignored.insert(class.qualified_name.clone());
                report.skip(&class.qualified_name, None, SkipReason::Ignored);
                continue;
            }

            let dispose = GlueEmitter::dispose_name(class);
            if !exports.insert(dispose.clone()) {
                report.skip(
                    &class.qualified_name,
                    None,
                    SkipReason::DuplicateExport { export: dispose },
                );
                continue;
            }

            eligible.push(class.clone());
        }

        eligible
    }

    /// Constructors admitted by the policy followed by member functions;
    /// dropped constructors are recorded
    fn bound_functions<'t>(
        &self,
        class: &CollectedClass<'t>,
        report: &mut GenerationReport,
    ) -> Vec<&'t FunctionDecl> {
        let policy = self.config.constructors;
        let (first, dropped) = policy.select(&class.decl.constructors);

        let reason = match policy {
            ConstructorPolicy::FirstDeclared => SkipReason::ExtraConstructor,
            ConstructorPolicy::None => SkipReason::ConstructorPolicy,
        };
        for ctor in dropped {
            report.skip(&class.qualified_name, Some(ctor), reason.clone());
        }

        first.into_iter().chain(class.decl.functions.iter()).collect()
    }
}

/// Generate with a one-off [`Generator`]
pub fn generate(config: &GeneratorConfig, tree: &DeclTree) -> Result<GeneratedBindings, GenerateError> {
    Generator::new(config).generate(tree)
}
