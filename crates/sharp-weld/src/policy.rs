//! Generation policies
//!
//! Declarative rule tables that decide what gets bound and under which name:
//! the denylist, rename rules, the constructor policy and the property rule.
//! All of them are plain values owned by the configuration.

use crate::ir::{to_pascal_case, ClassIndex, FunctionDecl};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Native names excluded from generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IgnoreFilter {
    names: Vec<String>,
}

impl IgnoreFilter {
    /// Create a filter from a list of names
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact match against a fully qualified class name
    pub fn is_ignored(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Substring match against a type display name
    pub fn contains_ignored(&self, type_name: &str) -> bool {
        self.first_match(type_name).is_some()
    }

    /// First denylist entry contained in `type_name`
    pub fn first_match(&self, type_name: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|n| type_name.contains(n.as_str()))
            .map(String::as_str)
    }

    /// Denylist entries
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl Default for IgnoreFilter {
    fn default() -> Self {
        Self::new([
            "iterator::scopeindex_t",
            "simdjson",
            "ParsedJson::InvalidJSON",
            "basic_ostream",
            "padded_string",
        ])
    }
}

/// Which functions a rename rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RenameScope {
    #[default]
    Any,
    Static,
    Instance,
}

/// Fixed rename of a PascalCase member name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenameRule {
    /// PascalCase name produced from the native name
    pub from: String,
    /// Replacement name
    pub to: String,
    /// Restriction on static/instance functions
    #[serde(default)]
    pub scope: RenameScope,
}

impl RenameRule {
    /// Create a rule applying to every function
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            scope: RenameScope::Any,
        }
    }

    /// Restrict to static functions
    pub fn static_only(mut self) -> Self {
        self.scope = RenameScope::Static;
        self
    }

    /// Restrict to instance functions
    pub fn instance_only(mut self) -> Self {
        self.scope = RenameScope::Instance;
        self
    }

    /// Check whether the rule rewrites `name`
    pub fn applies(&self, name: &str, is_static: bool) -> bool {
        let scope_matches = match self.scope {
            RenameScope::Any => true,
            RenameScope::Static => is_static,
            RenameScope::Instance => !is_static,
        };
        scope_matches && self.from == name
    }
}

/// Default rename table.
///
/// The static `is_object_or_array` predicate shares its native name with an
/// instance method, and `GetType` would hide `object.GetType()`.
pub fn default_renames() -> Vec<RenameRule> {
    vec![
        RenameRule::new("IsObjectOrArray", "IsObjectOrArrayStatic").static_only(),
        RenameRule::new("GetType", "GetTokenType"),
    ]
}

/// Which declared constructors are bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ConstructorPolicy {
    /// Only the first constructor in declaration order
    #[default]
    FirstDeclared,
    /// No constructors; wrappers are built from existing handles only
    None,
}

impl ConstructorPolicy {
    /// Split constructors into the bound one and the dropped rest
    pub fn select<'a>(
        &self,
        constructors: &'a [FunctionDecl],
    ) -> (Option<&'a FunctionDecl>, &'a [FunctionDecl]) {
        match self {
            ConstructorPolicy::FirstDeclared => match constructors.split_first() {
                Some((first, rest)) => (Some(first), rest),
                None => (None, constructors),
            },
            ConstructorPolicy::None => (None, constructors),
        }
    }
}

/// Naming rules for wrapper members
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingPolicy {
    renames: Vec<RenameRule>,
    property_prefix: String,
}

impl NamingPolicy {
    /// Create a naming policy
    pub fn new(renames: Vec<RenameRule>, property_prefix: impl Into<String>) -> Self {
        Self {
            renames,
            property_prefix: property_prefix.into(),
        }
    }

    /// PascalCase member name with the first matching rename applied
    pub fn member_name(&self, native_name: &str, is_static: bool) -> String {
        let name = to_pascal_case(native_name);
        self.renames
            .iter()
            .find(|rule| rule.applies(&name, is_static))
            .map(|rule| rule.to.clone())
            .unwrap_or(name)
    }

    /// Zero-parameter, value-returning `is*` functions become properties
    pub fn is_property(&self, function: &FunctionDecl) -> bool {
        !function.is_constructor()
            && function.params.is_empty()
            && !function.return_type.is_void()
            && function.name.starts_with(self.property_prefix.as_str())
    }
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self::new(default_renames(), "is")
    }
}

/// Why a declaration produced no output
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// Class name is on the denylist
    Ignored,
    /// A parameter type contains a denylisted name
    IgnoredParameter {
        parameter: String,
        type_name: String,
        entry: String,
    },
    /// Return type contains a denylisted name
    IgnoredReturn { type_name: String, entry: String },
    /// Operator overloads are never bound
    Operator,
    /// Constructor after the first one
    ExtraConstructor,
    /// Constructor dropped because constructors are disabled
    ConstructorPolicy,
    /// Parameter passed by a reference form that cannot cross the boundary
    UnsupportedReference { parameter: String, type_name: String },
    /// Return type that cannot cross the boundary
    UnsupportedReturn { type_name: String },
    /// Export name already taken by an earlier declaration
    DuplicateExport { export: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Ignored => write!(f, "on the denylist"),
            SkipReason::IgnoredParameter {
                parameter,
                type_name,
                entry,
            } => write!(
                f,
                "parameter `{}` of type `{}` matches denylist entry `{}`",
                parameter, type_name, entry
            ),
            SkipReason::IgnoredReturn { type_name, entry } => write!(
                f,
                "return type `{}` matches denylist entry `{}`",
                type_name, entry
            ),
            SkipReason::Operator => write!(f, "operator overload"),
            SkipReason::ExtraConstructor => write!(f, "only the first constructor is bound"),
            SkipReason::ConstructorPolicy => write!(f, "constructors are not bound"),
            SkipReason::UnsupportedReference {
                parameter,
                type_name,
            } => write!(
                f,
                "parameter `{}` has unsupported reference type `{}`",
                parameter, type_name
            ),
            SkipReason::UnsupportedReturn { type_name } => {
                write!(f, "unsupported return type `{}`", type_name)
            }
            SkipReason::DuplicateExport { export } => {
                write!(f, "export `{}` is already defined", export)
            }
        }
    }
}

/// Per-function validation, run before any text is produced
pub struct FunctionValidator<'a> {
    filter: &'a IgnoreFilter,
    classes: &'a ClassIndex,
}

impl<'a> FunctionValidator<'a> {
    /// Create a validator
    pub fn new(filter: &'a IgnoreFilter, classes: &'a ClassIndex) -> Self {
        Self { filter, classes }
    }

    /// Decide whether a function can be bound in both layers
    pub fn validate(&self, function: &FunctionDecl) -> Result<(), SkipReason> {
        if function.is_operator() {
            return Err(SkipReason::Operator);
        }

        for param in &function.params {
            let type_name = param.ty.display_name();
            if let Some(entry) = self.filter.first_match(type_name) {
                return Err(SkipReason::IgnoredParameter {
                    parameter: param.name.clone(),
                    type_name: type_name.to_string(),
                    entry: entry.to_string(),
                });
            }

            let wrapped_indirection =
                self.classes.is_wrapped(&param.ty) && param.ty.pointer_depth() > 1;
            // `T*&` has no single-level pointer form on either side
            let reference_to_pointer = param.ty.is_reference() && param.ty.pointer_depth() > 0;
            if param.ty.is_rvalue_reference() || wrapped_indirection || reference_to_pointer {
                return Err(SkipReason::UnsupportedReference {
                    parameter: param.name.clone(),
                    type_name: type_name.to_string(),
                });
            }
        }

        if function.is_constructor() {
            return Ok(());
        }

        let ret = &function.return_type;
        if let Some(entry) = self.filter.first_match(ret.display_name()) {
            return Err(SkipReason::IgnoredReturn {
                type_name: ret.display_name().to_string(),
                entry: entry.to_string(),
            });
        }

        let wrapped_by_value = self.classes.is_wrapped(ret) && ret.pointer_depth() != 1;
        if ret.is_reference() || ret.is_rvalue_reference() || wrapped_by_value {
            return Err(SkipReason::UnsupportedReturn {
                type_name: ret.display_name().to_string(),
            });
        }

        Ok(())
    }
}
