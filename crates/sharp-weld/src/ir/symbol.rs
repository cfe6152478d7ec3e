//! Generated symbol metadata
//!
//! This module provides the structures the emitters produce: exported glue
//! functions on the C++ side, `[DllImport]` declarations and wrapper members
//! on the C# side. Each structure renders its own fragment; the document
//! builders in `codegen` only arrange fragments.

use serde::{Deserialize, Serialize};

/// Parameter of an exported glue function
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlueParam {
    /// C++ type as it appears in the exported signature
    pub ty: String,
    /// Parameter name
    pub name: String,
}

impl GlueParam {
    /// Create a parameter
    pub fn new(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            name: name.into(),
        }
    }

    /// `Type name` declaration
    pub fn to_cpp(&self) -> String {
        format!("{} {}", self.ty, self.name)
    }
}

/// What an exported glue function forwards to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlueCall {
    /// `new Class(args)`
    Construct { class: String },
    /// `Class::function(args)`
    Static { class: String, function: String },
    /// `target->function(args)`
    Instance { function: String },
    /// `delete target`
    Delete,
}

/// One exported, C-linkage function in the glue layer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlueFunction {
    /// Exported symbol name (`Class_method`, `Class_s_static`)
    pub export_name: String,
    /// C++ return type
    pub return_type: String,
    /// Exported parameters, including a synthetic leading `target`
    pub params: Vec<GlueParam>,
    /// Forwarding target
    pub call: GlueCall,
    /// Call-site arguments, in parameter order (`*ref` for adapted references)
    pub args: Vec<String>,
}

impl GlueFunction {
    /// Whether the forwarded call produces a value
    pub fn returns_value(&self) -> bool {
        match self.call {
            GlueCall::Construct { .. } => true,
            GlueCall::Delete => false,
            _ => self.return_type.trim() != "void",
        }
    }

    /// Render as a single `EXPORTS(...)` definition line
    pub fn to_cpp(&self) -> String {
        let params: Vec<String> = self.params.iter().map(GlueParam::to_cpp).collect();
        let args = self.args.join(", ");
        let ret = if self.returns_value() { "return " } else { "" };

        let statement = match &self.call {
            GlueCall::Construct { class } => format!("return new {}({});", class, args),
            GlueCall::Static { class, function } => {
                format!("{}{}::{}({});", ret, class, function, args)
            }
            GlueCall::Instance { function } => format!("{}target->{}({});", ret, function, args),
            GlueCall::Delete => "delete target;".to_string(),
        };

        format!(
            "EXPORTS({}) {}({}) {{ {} }}",
            self.return_type,
            self.export_name,
            params.join(", "),
            statement
        )
    }
}

/// Glue functions of one class, dispose export last
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlueClass {
    /// `Outer::Inner` name used in the banner comment
    pub qualified_name: String,
    /// Exported constructor and member functions
    pub functions: Vec<GlueFunction>,
    /// The unconditional `Class_Dispose` export
    pub dispose: GlueFunction,
}

/// Parameter of a `[DllImport]` declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportParam {
    /// C# type at the marshaling boundary
    pub ty: String,
    /// Parameter name
    pub name: String,
    /// Optional `[MarshalAs(...)]` attribute argument
    pub marshal_as: Option<String>,
}

impl ImportParam {
    /// Create a blittable parameter
    pub fn new(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            name: name.into(),
            marshal_as: None,
        }
    }

    /// Attach a `[MarshalAs]` attribute
    pub fn marshal_as(mut self, unmanaged: impl Into<String>) -> Self {
        self.marshal_as = Some(unmanaged.into());
        self
    }

    /// Get the C# parameter declaration
    pub fn to_csharp(&self) -> String {
        match &self.marshal_as {
            Some(unmanaged) => format!("[MarshalAs({})] {} {}", unmanaged, self.ty, self.name),
            None => format!("{} {}", self.ty, self.name),
        }
    }
}

/// A low-level `[DllImport]` declaration mirroring one glue export
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportDecl {
    /// Must equal the glue function's export name
    pub export_name: String,
    /// C# return type at the marshaling boundary
    pub return_type: String,
    /// Parameters, in glue order
    pub params: Vec<ImportParam>,
}

impl ImportDecl {
    /// Render the attribute line and the `extern` declaration line
    pub fn to_csharp(&self, native_lib: &str) -> String {
        let params: Vec<String> = self.params.iter().map(ImportParam::to_csharp).collect();
        format!(
            "[DllImport({}, CallingConvention = CallingConvention.Cdecl)]\nprivate static extern {} {}({});",
            native_lib,
            self.return_type,
            self.export_name,
            params.join(", ")
        )
    }
}

/// Surface shape of a wrapper member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WrapperKind {
    /// `public Foo(...) => this.Handle = ...;`
    Constructor,
    /// `public T Name(...) => ...;`
    Method,
    /// `public T Name => ...;`
    Property,
}

/// Conversion applied to the raw import result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ResultConversion {
    #[default]
    None,
    /// One-byte integer back to `bool` via `> 0`
    Bool,
    /// Pointer-width integer widened with `(long)`
    Long,
}

/// Parameter of a wrapper member
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WrapperParam {
    /// C# type seen by callers
    pub ty: String,
    /// Parameter name
    pub name: String,
}

impl WrapperParam {
    /// Create a parameter
    pub fn new(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            name: name.into(),
        }
    }
}

/// A high-level wrapper member calling one import
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WrapperMethod {
    /// PascalCase member name
    pub name: String,
    /// Member shape
    pub kind: WrapperKind,
    /// `static` member
    pub is_static: bool,
    /// Declared C# return type (`None` for constructors)
    pub return_type: Option<String>,
    /// Caller-visible parameters
    pub params: Vec<WrapperParam>,
    /// Import being called
    pub target: String,
    /// Arguments passed to the import (`this.Handle`, `x.Handle`, `(IntPtr)n`)
    pub args: Vec<String>,
    /// Conversion applied to the import result
    pub conversion: ResultConversion,
    /// Doc comment lines
    pub doc: Option<String>,
}

impl WrapperMethod {
    /// Expression-bodied member declaration (one line)
    pub fn to_csharp_signature(&self) -> String {
        let mut decl = String::from("public");
        if self.is_static {
            decl.push_str(" static");
        }
        if let Some(ret) = &self.return_type {
            decl.push(' ');
            decl.push_str(ret);
        }
        decl.push(' ');
        decl.push_str(&self.name);

        if self.kind != WrapperKind::Property {
            let params: Vec<String> = self
                .params
                .iter()
                .map(|p| format!("{} {}", p.ty, p.name))
                .collect();
            decl.push('(');
            decl.push_str(&params.join(", "));
            decl.push(')');
        }

        let call = format!("{}({})", self.target, self.args.join(", "));
        let body = match (self.kind, self.conversion) {
            (WrapperKind::Constructor, _) => format!("this.Handle = {}", call),
            (_, ResultConversion::Bool) => format!("{} > 0", call),
            (_, ResultConversion::Long) => format!("(long){}", call),
            (_, ResultConversion::None) => call,
        };

        format!("{} => {};", decl, body)
    }

    /// Summary comment followed by the declaration
    pub fn to_csharp(&self) -> String {
        let mut output = summary_comment(self.doc.as_deref());
        output.push_str(&self.to_csharp_signature());
        output
    }
}

/// Import plus wrapper for one successfully emitted glue function
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BindingMethod {
    pub import: ImportDecl,
    pub wrapper: WrapperMethod,
}

/// A disposable, handle-owning C# wrapper type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingClass {
    /// C# class name
    pub wrapper_name: String,
    /// Members in glue order
    pub methods: Vec<BindingMethod>,
    /// Import of the class's dispose export
    pub dispose: ImportDecl,
}

/// `/// <summary>` block, emitted even when there is no doc text
pub fn summary_comment(doc: Option<&str>) -> String {
    let mut output = String::from("/// <summary>\n");
    if let Some(doc) = doc.filter(|d| !d.trim().is_empty()) {
        for line in doc.lines() {
            output.push_str(&format!("/// {}\n", line.trim_end()));
        }
    }
    output.push_str("/// </summary>\n");
    output
}

// Helper functions

/// Convert snake_case to PascalCase (`is_valid` -> `IsValid`)
pub fn to_pascal_case(s: &str) -> String {
    s.split('_')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

const CSHARP_KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// Prefix C# keywords with `@` so they can be used as identifiers
pub fn escape_csharp_identifier(name: &str) -> String {
    if CSHARP_KEYWORDS.contains(&name) {
        format!("@{}", name)
    } else {
        name.to_string()
    }
}

/// Name of the leading handle parameter on instance exports
pub const TARGET_PARAM: &str = "target";

/// Declared parameter name, or `argN` for unnamed parameters.
///
/// A declared `target` becomes `target_` so it cannot shadow the handle
/// parameter of instance exports.
pub fn parameter_name(name: &str, index: usize) -> String {
    let name = name.trim();
    if name.is_empty() {
        format!("arg{}", index)
    } else if name == TARGET_PARAM {
        format!("{}_", TARGET_PARAM)
    } else {
        name.to_string()
    }
}
