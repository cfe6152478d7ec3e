//! Declaration collection
//!
//! Flattens the nested class forest into the order generation walks it and
//! indexes the classes that end up with a generated wrapper.

use crate::ir::{ClassDecl, DeclTree, TypeDescriptor};
use std::collections::HashMap;

/// A class together with its position in the nesting hierarchy
#[derive(Debug, Clone)]
pub struct CollectedClass<'a> {
    /// The declaration itself
    pub decl: &'a ClassDecl,
    /// Names of the enclosing classes, outermost first
    pub enclosing: Vec<&'a str>,
    /// `Outer::Inner` form, computed once at collection time
    pub qualified_name: String,
}

impl<'a> CollectedClass<'a> {
    fn new(decl: &'a ClassDecl, enclosing: Vec<&'a str>) -> Self {
        let qualified_name = enclosing
            .iter()
            .copied()
            .chain(std::iter::once(decl.name.as_str()))
            .collect::<Vec<_>>()
            .join("::");
        Self {
            decl,
            enclosing,
            qualified_name,
        }
    }

    /// Unqualified class name
    pub fn name(&self) -> &'a str {
        &self.decl.name
    }

    /// Whether the class is nested inside another class
    pub fn is_nested(&self) -> bool {
        !self.enclosing.is_empty()
    }

    /// Every scoped spelling from the full chain down to the bare name
    /// (`A::B::C`, `B::C`, `C`)
    pub fn scoped_names(&self) -> Vec<String> {
        let chain: Vec<&str> = self
            .enclosing
            .iter()
            .copied()
            .chain(std::iter::once(self.name()))
            .collect();
        (0..chain.len()).map(|start| chain[start..].join("::")).collect()
    }

    /// Qualified names of the enclosing classes, outermost first
    /// (`A`, `A::B` for `A::B::C`)
    pub fn ancestors(&self) -> Vec<String> {
        (1..=self.enclosing.len())
            .map(|end| self.enclosing[..end].join("::"))
            .collect()
    }
}

/// Collect every class in the tree, depth-first pre-order.
///
/// Each class precedes its nested classes and siblings keep declaration
/// order. Only the nesting relation is followed.
pub fn collect_classes(tree: &DeclTree) -> Vec<CollectedClass<'_>> {
    let mut out = Vec::new();
    for class in &tree.classes {
        visit(&mut out, class, Vec::new());
    }
    out
}

fn visit<'a>(out: &mut Vec<CollectedClass<'a>>, class: &'a ClassDecl, enclosing: Vec<&'a str>) {
    let mut nested_scope = enclosing.clone();
    nested_scope.push(class.name.as_str());

    out.push(CollectedClass::new(class, enclosing));
    for nested in &class.classes {
        visit(out, nested, nested_scope.clone());
    }
}

/// Lookup from native class names to generated wrapper names.
///
/// Both the qualified and the unqualified spelling resolve, since member
/// signatures inside a class usually refer to siblings by their short name.
#[derive(Debug, Clone, Default)]
pub struct ClassIndex {
    wrappers: HashMap<String, String>,
}

impl ClassIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class that receives a wrapper
    pub fn insert(&mut self, class: &CollectedClass<'_>, wrapper_name: impl Into<String>) {
        let wrapper_name = wrapper_name.into();
        self.wrappers
            .entry(class.name().to_string())
            .or_insert_with(|| wrapper_name.clone());
        self.wrappers
            .insert(class.qualified_name.clone(), wrapper_name);
    }

    /// Wrapper name for the class a type refers to, if any
    pub fn wrapper_for(&self, ty: &TypeDescriptor) -> Option<&str> {
        self.wrappers.get(ty.base_name()).map(String::as_str)
    }

    /// Check whether a type refers to a wrapped class
    pub fn is_wrapped(&self, ty: &TypeDescriptor) -> bool {
        self.wrapper_for(ty).is_some()
    }

    /// Number of registered names
    pub fn len(&self) -> usize {
        self.wrappers.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.wrappers.is_empty()
    }
}
