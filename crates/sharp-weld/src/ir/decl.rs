//! Native declaration model
//!
//! This module provides the read-only class tree produced by the header
//! parsing step: classes with their nested classes, constructors, member
//! functions, parameters and display-name type strings.
//!
//! The tree is immutable for the duration of a generation run. Builders are
//! provided for constructing trees by hand (mostly in tests); parsers produce
//! them through serde.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Source location for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct SourceLocation {
    /// Header file the declaration came from
    #[serde(default)]
    pub file: Option<String>,
    /// 1-based line
    #[serde(default)]
    pub line: u32,
    /// 1-based column
    #[serde(default)]
    pub column: u32,
}

impl SourceLocation {
    /// Create a location in a named file
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: Some(file.into()),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = self.file.as_deref().unwrap_or("<unknown>");
        write!(f, "{}:{}:{}", file, self.line, self.column)
    }
}

/// A native type as the parser displays it.
///
/// Pointer and reference types carry a trailing `*` or `&`, so the display
/// name of a pointer-to-X is X's display name followed by `*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeDescriptor {
    display_name: String,
}

impl TypeDescriptor {
    /// Create a type from its display name
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
        }
    }

    /// The `void` type
    pub fn void() -> Self {
        Self::new("void")
    }

    /// Pointer to `inner`
    pub fn pointer_to(inner: &TypeDescriptor) -> Self {
        Self::new(format!("{}*", inner.display_name))
    }

    /// Lvalue reference to `inner`
    pub fn reference_to(inner: &TypeDescriptor) -> Self {
        Self::new(format!("{}&", inner.display_name))
    }

    /// Display name exactly as parsed
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Check for a trailing `*`
    pub fn is_pointer(&self) -> bool {
        self.display_name.trim_end().ends_with('*')
    }

    /// Check for a trailing single `&` (lvalue reference)
    pub fn is_reference(&self) -> bool {
        self.display_name.trim_end().ends_with('&') && !self.is_rvalue_reference()
    }

    /// Check for a trailing `&&`
    pub fn is_rvalue_reference(&self) -> bool {
        self.display_name.trim_end().ends_with("&&")
    }

    /// Check if this is `void`
    pub fn is_void(&self) -> bool {
        self.display_name.trim() == "void"
    }

    /// Number of trailing pointer levels, ignoring a final reference
    pub fn pointer_depth(&self) -> usize {
        let s = self.display_name.trim_end();
        let s = s.strip_suffix('&').unwrap_or(s);
        strip_cv(s).chars().rev().take_while(|c| *c == '*' || c.is_whitespace()).filter(|c| *c == '*').count()
    }

    /// The underlying named type with pointer, reference and `const`
    /// decorations removed (`const ParsedJson &` -> `ParsedJson`).
    pub fn base_name(&self) -> &str {
        let mut s = self.display_name.trim();
        loop {
            let trimmed = s.trim_end();
            if let Some(rest) = trimmed.strip_suffix('*').or_else(|| trimmed.strip_suffix('&')) {
                s = rest;
                continue;
            }
            let stripped = strip_cv(trimmed);
            if stripped.len() != trimmed.len() {
                s = stripped;
                continue;
            }
            s = trimmed;
            break;
        }
        s.strip_prefix("const ").unwrap_or(s).trim()
    }
}

/// Remove one trailing `const` qualifier (`char *const` -> `char *`)
fn strip_cv(s: &str) -> &str {
    let trimmed = s.trim_end();
    match trimmed.strip_suffix("const") {
        Some(rest) if rest.ends_with(|c: char| c.is_whitespace() || c == '*' || c == '&') => {
            rest.trim_end()
        }
        _ => trimmed,
    }
}

impl From<&str> for TypeDescriptor {
    fn from(s: &str) -> Self {
        TypeDescriptor::new(s)
    }
}

impl From<String> for TypeDescriptor {
    fn from(s: String) -> Self {
        TypeDescriptor::new(s)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}

/// Function parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterDecl {
    /// Parameter name (may be empty for unnamed parameters)
    #[serde(default)]
    pub name: String,
    /// Parameter type
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
}

impl ParameterDecl {
    /// Create a new parameter
    pub fn new(name: impl Into<String>, ty: impl Into<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// Distinguishes constructors from ordinary member functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    #[default]
    Method,
    Constructor,
}

/// A member function or constructor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    /// Native function name (constructors carry the class name)
    pub name: String,
    /// Declared return type (ignored for constructors)
    #[serde(default = "TypeDescriptor::void")]
    pub return_type: TypeDescriptor,
    /// Parameters in declaration order
    #[serde(default)]
    pub params: Vec<ParameterDecl>,
    /// Constructor or method
    #[serde(default)]
    pub kind: FunctionKind,
    /// `static` storage qualifier
    #[serde(default)]
    pub is_static: bool,
    /// Doc comment attached to the declaration
    #[serde(default)]
    pub doc: Option<String>,
    /// Operator overload flag as reported by the parser
    #[serde(default)]
    pub is_operator: bool,
    /// Where the function was declared
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl FunctionDecl {
    /// Create an instance method
    pub fn method(name: impl Into<String>, return_type: impl Into<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
            params: Vec::new(),
            kind: FunctionKind::Method,
            is_static: false,
            doc: None,
            is_operator: false,
            location: None,
        }
    }

    /// Create a constructor
    pub fn constructor(class_name: impl Into<String>) -> Self {
        Self {
            kind: FunctionKind::Constructor,
            ..Self::method(class_name, TypeDescriptor::void())
        }
    }

    /// Add a parameter
    pub fn param(mut self, param: ParameterDecl) -> Self {
        self.params.push(param);
        self
    }

    /// Mark as static
    pub fn static_fn(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Mark as an operator overload
    pub fn operator(mut self) -> Self {
        self.is_operator = true;
        self
    }

    /// Set documentation
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Set source location
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Check if this is a constructor
    pub fn is_constructor(&self) -> bool {
        self.kind == FunctionKind::Constructor
    }

    /// Check if this is an operator overload, by flag or by name
    pub fn is_operator(&self) -> bool {
        self.is_operator || self.name.starts_with("operator")
    }

    /// Instance method: neither static nor a constructor
    pub fn is_instance(&self) -> bool {
        !self.is_static && !self.is_constructor()
    }
}

/// A class or struct declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDecl {
    /// Unqualified class name
    pub name: String,
    /// Constructors in declaration order
    #[serde(default)]
    pub constructors: Vec<FunctionDecl>,
    /// Member functions in declaration order
    #[serde(default)]
    pub functions: Vec<FunctionDecl>,
    /// Nested classes in declaration order
    #[serde(default)]
    pub classes: Vec<ClassDecl>,
    /// Doc comment attached to the class
    #[serde(default)]
    pub doc: Option<String>,
    /// Where the class was declared
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl ClassDecl {
    /// Create an empty class
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constructors: Vec::new(),
            functions: Vec::new(),
            classes: Vec::new(),
            doc: None,
            location: None,
        }
    }

    /// Add a constructor
    pub fn constructor(mut self, mut ctor: FunctionDecl) -> Self {
        ctor.kind = FunctionKind::Constructor;
        self.constructors.push(ctor);
        self
    }

    /// Add a member function
    pub fn function(mut self, function: FunctionDecl) -> Self {
        self.functions.push(function);
        self
    }

    /// Add a nested class
    pub fn class(mut self, nested: ClassDecl) -> Self {
        self.classes.push(nested);
        self
    }

    /// Set documentation
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Set source location
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    fn normalize(&mut self) {
        for ctor in &mut self.constructors {
            ctor.kind = FunctionKind::Constructor;
        }
        for nested in &mut self.classes {
            nested.normalize();
        }
    }
}

/// Root of a parsed header: the top-level classes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DeclTree {
    /// Header the tree was parsed from
    #[serde(default)]
    pub header: Option<String>,
    /// Top-level classes in declaration order
    #[serde(default)]
    pub classes: Vec<ClassDecl>,
}

impl DeclTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the originating header
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Add a top-level class
    pub fn class(mut self, class: ClassDecl) -> Self {
        self.classes.push(class);
        self
    }

    /// Mark everything listed under `constructors` as a constructor,
    /// whatever kind the serialized form carried
    pub fn normalize(mut self) -> Self {
        for class in &mut self.classes {
            class.normalize();
        }
        self
    }

    /// Validate the structural invariants every generator relies on
    pub fn validate(&self) -> Result<(), DeclValidationError> {
        validate_scope(&self.classes, ROOT_SCOPE)
    }
}

const ROOT_SCOPE: &str = "<root>";

fn validate_scope(classes: &[ClassDecl], scope: &str) -> Result<(), DeclValidationError> {
    let mut seen = HashSet::new();
    for class in classes {
        if class.name.trim().is_empty() {
            return Err(DeclValidationError::EmptyClassName {
                scope: scope.to_string(),
                location: class.location.clone(),
            });
        }
        if !seen.insert(class.name.as_str()) {
            return Err(DeclValidationError::DuplicateClass {
                scope: scope.to_string(),
                name: class.name.clone(),
                location: class.location.clone(),
            });
        }

        let qualified = if scope == ROOT_SCOPE {
            class.name.clone()
        } else {
            format!("{}::{}", scope, class.name)
        };

        for function in class.constructors.iter().chain(&class.functions) {
            validate_function(function, &qualified)?;
        }
        validate_scope(&class.classes, &qualified)?;
    }
    Ok(())
}

fn validate_function(function: &FunctionDecl, class: &str) -> Result<(), DeclValidationError> {
    if function.name.trim().is_empty() {
        return Err(DeclValidationError::EmptyFunctionName {
            class: class.to_string(),
            location: function.location.clone(),
        });
    }

    let return_missing =
        !function.is_constructor() && function.return_type.display_name().trim().is_empty();
    let param_missing = function
        .params
        .iter()
        .any(|p| p.ty.display_name().trim().is_empty());

    if return_missing || param_missing {
        return Err(DeclValidationError::EmptyTypeName {
            class: class.to_string(),
            function: function.name.clone(),
            location: function.location.clone(),
        });
    }
    Ok(())
}

fn display_location(location: &Option<SourceLocation>) -> String {
    match location {
        Some(loc) => format!("{}: ", loc),
        None => String::new(),
    }
}

/// Structural defects in a declaration tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclValidationError {
    /// A class has no name
    #[error("{}class with an empty name in `{scope}`", display_location(.location))]
    EmptyClassName {
        scope: String,
        location: Option<SourceLocation>,
    },

    /// Two classes in one scope share a name
    #[error("{}duplicate class `{name}` in `{scope}`", display_location(.location))]
    DuplicateClass {
        scope: String,
        name: String,
        location: Option<SourceLocation>,
    },

    /// A function has no name
    #[error("{}function with an empty name in class `{class}`", display_location(.location))]
    EmptyFunctionName {
        class: String,
        location: Option<SourceLocation>,
    },

    /// A return or parameter type could not be resolved to a name
    #[error("{}unresolvable type in `{class}::{function}`", display_location(.location))]
    EmptyTypeName {
        class: String,
        function: String,
        location: Option<SourceLocation>,
    },
}
