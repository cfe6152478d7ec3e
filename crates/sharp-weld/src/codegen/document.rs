//! Output document assembly
//!
//! [`CodeWriter`] is a small indentation-aware line buffer. The two document
//! builders wrap emitted fragments with the fixed preamble and closing text
//! of each output file.

use crate::ir::{BindingClass, GlueClass};
use crate::codegen::binding::BindingClassRenderer;

const INDENT: &str = "    ";

/// Marker on the first line of every generated file
pub const AUTOGENERATED_BANNER: &str = "// THIS FILE IS AUTOGENERATED!";

/// Indentation-aware text buffer
#[derive(Debug, Default)]
pub struct CodeWriter {
    buf: String,
    depth: usize,
}

impl CodeWriter {
    /// Create an empty writer at depth zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer that starts `depth` levels in
    pub fn indented(depth: usize) -> Self {
        Self {
            buf: String::new(),
            depth,
        }
    }

    /// Write one line at the current depth
    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            self.buf.push('\n');
            return;
        }
        for _ in 0..self.depth {
            self.buf.push_str(INDENT);
        }
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    /// Write an empty line
    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    /// Write every line of `text` at the current depth; empty lines stay empty
    pub fn block(&mut self, text: &str) {
        for line in text.lines() {
            self.line(line);
        }
    }

    /// Write `text` and indent what follows
    pub fn open(&mut self, text: impl AsRef<str>) {
        self.line(text);
        self.depth += 1;
    }

    /// Dedent and write `text`
    pub fn close(&mut self, text: impl AsRef<str>) {
        self.depth = self.depth.saturating_sub(1);
        self.line(text);
    }

    /// Consume the writer
    pub fn finish(self) -> String {
        self.buf
    }
}

/// Builder for the C++ glue translation unit
#[derive(Debug)]
pub struct GlueDocument {
    header_include: String,
    classes: Vec<GlueClass>,
}

impl GlueDocument {
    /// Create a document including `header_include`
    pub fn new(header_include: impl Into<String>) -> Self {
        Self {
            header_include: header_include.into(),
            classes: Vec::new(),
        }
    }

    /// Append a class section
    pub fn class(&mut self, class: GlueClass) -> &mut Self {
        self.classes.push(class);
        self
    }

    /// Render the translation unit
    pub fn build(&self) -> String {
        let mut w = CodeWriter::new();
        w.line(AUTOGENERATED_BANNER);
        w.line(format!("#include \"{}\"", self.header_include));
        w.blank();
        w.line("#if (defined WIN32 || defined _WIN32)");
        w.line("#define EXPORTS(returntype) extern \"C\" __declspec(dllexport) returntype __cdecl");
        w.line("#else");
        w.line(
            "#define EXPORTS(returntype) extern \"C\" __attribute__((visibility(\"default\"))) returntype",
        );
        w.line("#endif");

        for class in &self.classes {
            w.blank();
            w.line(format!("/* {} */", class.qualified_name));
            for function in &class.functions {
                w.line(function.to_cpp());
            }
            w.line(class.dispose.to_cpp());
        }

        w.finish()
    }
}

/// Builder for the C# bindings file
#[derive(Debug)]
pub struct BindingDocument {
    namespace: String,
    native_lib: String,
    classes: Vec<BindingClass>,
}

impl BindingDocument {
    /// Create a document for `namespace`; `native_lib` is the
    /// `MainClass.NativeLib` expression
    pub fn new(namespace: impl Into<String>, native_lib: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            native_lib: native_lib.into(),
            classes: Vec::new(),
        }
    }

    /// Append a wrapper class
    pub fn class(&mut self, class: BindingClass) -> &mut Self {
        self.classes.push(class);
        self
    }

    /// Render the bindings file
    pub fn build(&self) -> String {
        let renderer = BindingClassRenderer::new(&self.native_lib);

        let mut w = CodeWriter::new();
        w.line(AUTOGENERATED_BANNER);
        w.blank();
        w.line("using System;");
        w.line("using System.Runtime.InteropServices;");
        w.blank();
        w.line(format!("namespace {}", self.namespace));
        w.open("{");

        for (i, class) in self.classes.iter().enumerate() {
            if i > 0 {
                w.blank();
            }
            w.block(&renderer.render(class));
        }

        w.close("}");
        w.finish()
    }
}
