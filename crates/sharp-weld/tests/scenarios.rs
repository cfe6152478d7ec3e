use pretty_assertions::assert_eq;
use sharp_weld::{
    generate, ClassDecl, DeclTree, FunctionDecl, GeneratorConfig, IgnoreFilter, JsonDeclParser,
    ParameterDecl, SkipReason,
};
use std::collections::BTreeSet;
use std::path::Path;

const GLUE_PREAMBLE: &str = "// THIS FILE IS AUTOGENERATED!\n\
#include \"simdjson.h\"\n\
\n\
#if (defined WIN32 || defined _WIN32)\n\
#define EXPORTS(returntype) extern \"C\" __declspec(dllexport) returntype __cdecl\n\
#else\n\
#define EXPORTS(returntype) extern \"C\" __attribute__((visibility(\"default\"))) returntype\n\
#endif\n";

/// A small tree shaped like the simdjson headers
const SIMDJSON_LIKE: &str = r#"{
  "header": "simdjson.h",
  "classes": [
    {
      "name": "ParsedJson",
      "constructors": [
        { "name": "ParsedJson" },
        { "name": "ParsedJson", "params": [ { "name": "other", "type": "ParsedJson &&" } ] }
      ],
      "functions": [
        { "name": "allocate_capacity", "return_type": "bool",
          "params": [ { "name": "len", "type": "size_t" }, { "name": "maxdepth", "type": "size_t" } ] },
        { "name": "is_valid", "return_type": "bool" },
        { "name": "get_error_code", "return_type": "int" },
        { "name": "print_json", "return_type": "bool",
          "params": [ { "name": "os", "type": "std::basic_ostream<char> &" } ] },
        { "name": "deallocate" },
        { "name": "operator=", "return_type": "ParsedJson &",
          "params": [ { "type": "ParsedJson &&" } ] }
      ],
      "classes": [
        {
          "name": "iterator",
          "constructors": [ { "name": "iterator", "params": [ { "name": "pj", "type": "ParsedJson &" } ] } ],
          "functions": [
            { "name": "is_ok", "return_type": "bool" },
            { "name": "get_type", "return_type": "uint8_t" },
            { "name": "get_integer", "return_type": "int64_t" },
            { "name": "get_string", "return_type": "const char *" },
            { "name": "get_string_length", "return_type": "uint32_t" },
            { "name": "is_object_or_array", "return_type": "bool", "is_static": true,
              "params": [ { "name": "type", "type": "uint8_t" } ] },
            { "name": "is_object_or_array", "return_type": "bool" },
            { "name": "move_to_key", "return_type": "bool",
              "params": [ { "name": "key", "type": "const char *" } ] }
          ],
          "classes": [ { "name": "scopeindex_t" } ]
        },
        { "name": "InvalidJSON" }
      ]
    },
    { "name": "padded_string", "functions": [ { "name": "size", "return_type": "size_t" } ] }
  ]
}"#;

fn simdjson_like() -> DeclTree {
    JsonDeclParser::parse_str(SIMDJSON_LIKE, Path::new("simdjson.decl.json")).unwrap()
}

/// Export names defined in a glue document, in order
fn glue_exports(glue: &str) -> Vec<String> {
    glue.lines()
        .filter(|l| l.starts_with("EXPORTS("))
        .filter_map(|l| {
            let after_macro = &l[l.find(") ")? + 2..];
            Some(after_macro[..after_macro.find('(')?].to_string())
        })
        .collect()
}

/// Export names declared by `[DllImport]` externs in a bindings document
fn binding_imports(bindings: &str) -> Vec<String> {
    bindings
        .lines()
        .map(str::trim)
        .filter_map(|l| l.strip_prefix("private static extern "))
        .filter_map(|rest| {
            let before_paren = &rest[..rest.find('(')?];
            before_paren.rsplit(' ').next().map(str::to_string)
        })
        .collect()
}

#[test]
fn determinism() {
    let tree = simdjson_like();
    let config = GeneratorConfig::default();

    let first = generate(&config, &tree).unwrap();
    let second = generate(&config, &tree).unwrap();

    assert_eq!(first.glue, second.glue);
    assert_eq!(first.bindings, second.bindings);
    assert_eq!(first.report, second.report);
}

#[test]
fn glue_and_imports_correspond_one_to_one() {
    let out = generate(&GeneratorConfig::default(), &simdjson_like()).unwrap();

    let glue: Vec<String> = glue_exports(&out.glue);
    let imports: Vec<String> = binding_imports(&out.bindings);

    let glue_set: BTreeSet<&String> = glue.iter().collect();
    let import_set: BTreeSet<&String> = imports.iter().collect();
    assert_eq!(glue.len(), glue_set.len());
    assert_eq!(imports.len(), import_set.len());
    assert_eq!(glue_set, import_set);

    // one wrapper per non-dispose export
    for export in glue.iter().filter(|e| !e.ends_with("_Dispose")) {
        let calls = out
            .bindings
            .lines()
            .filter(|l| l.contains(" => ") && l.contains(&format!("{}(", export)))
            .count();
        assert_eq!(calls, 1, "wrapper count for {}", export);
    }

    let reported: Vec<String> = out
        .report
        .classes
        .iter()
        .flat_map(|c| c.exports.iter().cloned())
        .collect();
    assert_eq!(reported, glue);
}

#[test]
fn denylisted_classes_leave_no_trace() {
    let out = generate(&GeneratorConfig::default(), &simdjson_like()).unwrap();

    for name in ["InvalidJSON", "scopeindex_t", "padded_string"] {
        assert!(!out.glue.contains(name), "{} in glue", name);
        assert!(!out.bindings.contains(name), "{} in bindings", name);
    }

    let emitted: Vec<&str> = out.report.classes.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(emitted, vec!["ParsedJson", "ParsedJson::iterator"]);
}

#[test]
fn function_with_denylisted_parameter_is_dropped_alone() {
    let out = generate(&GeneratorConfig::default(), &simdjson_like()).unwrap();

    assert!(!out.glue.contains("print_json"));
    assert!(!out.bindings.contains("PrintJson"));
    assert!(!out.bindings.contains("print_json"));

    assert!(out.glue.contains("ParsedJson_get_error_code"));
    assert!(out.glue.contains("ParsedJson_deallocate"));
}

#[test]
fn every_eligible_class_has_one_dispose() {
    let tree = DeclTree::new()
        .class(ClassDecl::new("Empty"))
        .class(ClassDecl::new("OnlyCtor").constructor(FunctionDecl::constructor("OnlyCtor")))
        .class(
            ClassDecl::new("OnlyOperators").function(FunctionDecl::method("operator<", "bool")),
        );
    let out = generate(&GeneratorConfig::default(), &tree).unwrap();

    for short in ["Empty", "OnlyCtor", "OnlyOperators"] {
        let export = format!("EXPORTS(void) {0}_Dispose({0}* target) {{ delete target; }}", short);
        assert_eq!(out.glue.matches(&export).count(), 1);
        assert_eq!(
            out.bindings
                .matches(&format!("private static extern void {}_Dispose(void* target);", short))
                .count(),
            1
        );
    }
}

#[test]
fn simple_class() {
    let tree = DeclTree::new().class(
        ClassDecl::new("Foo")
            .constructor(FunctionDecl::constructor("Foo"))
            .function(FunctionDecl::method("bar", "int")),
    );
    let out = generate(&GeneratorConfig::default(), &tree).unwrap();

    let expected_glue = format!(
        "{}\n/* Foo */\n\
         EXPORTS(Foo*) Foo_Foo() {{ return new Foo(); }}\n\
         EXPORTS(int) Foo_bar(Foo* target) {{ return target->bar(); }}\n\
         EXPORTS(void) Foo_Dispose(Foo* target) {{ delete target; }}\n",
        GLUE_PREAMBLE
    );
    assert_eq!(out.glue, expected_glue);

    let expected_bindings = r#"// THIS FILE IS AUTOGENERATED!

using System;
using System.Runtime.InteropServices;

namespace SimdJsonSharp
{
    public unsafe partial class Foo : IDisposable
    {
        /// <summary>
        /// Pointer to the underlying native object
        /// </summary>
        public void* Handle { get; private set; }

        /// <summary>
        /// Create Foo from a native pointer
        /// </summary>
        public Foo(void* handle) => this.Handle = handle;

        /// <summary>
        /// </summary>
        public Foo() => this.Handle = Foo_Foo();

        /// <summary>
        /// </summary>
        public int Bar() => Foo_bar(this.Handle);

        #region DllImports
        [DllImport(SimdJsonN.NativeLib, CallingConvention = CallingConvention.Cdecl)]
        private static extern void* Foo_Foo();

        [DllImport(SimdJsonN.NativeLib, CallingConvention = CallingConvention.Cdecl)]
        private static extern int Foo_bar(void* target);
        #endregion

        private readonly object disposeSync = new object();

        public void Dispose()
        {
            if (Handle != (void*) IntPtr.Zero)
            {
                lock (disposeSync)
                {
                    if (Handle != (void*) IntPtr.Zero)
                    {
                        Foo_Dispose(Handle);
                        Handle = (void*) IntPtr.Zero;
                    }
                }
            }
            GC.SuppressFinalize(this);
        }

        ~Foo() => Dispose();

        [DllImport(SimdJsonN.NativeLib, CallingConvention = CallingConvention.Cdecl)]
        private static extern void Foo_Dispose(void* target);
    }
}
"#;
    assert_eq!(out.bindings, expected_bindings);
}

#[test]
fn nested_class_with_static_predicate() {
    let tree = DeclTree::new().class(
        ClassDecl::new("Outer")
            .class(ClassDecl::new("Inner").function(FunctionDecl::method("is_ready", "bool").static_fn())),
    );
    let out = generate(&GeneratorConfig::default(), &tree).unwrap();

    assert!(out
        .glue
        .contains("/* Outer::Inner */\nEXPORTS(bool) Inner_s_is_ready() { return Outer::Inner::is_ready(); }\n"));
    assert!(out
        .glue
        .contains("EXPORTS(void) Inner_Dispose(Outer::Inner* target) { delete target; }"));
    assert!(out
        .bindings
        .contains("        public static bool IsReady => Inner_s_is_ready() > 0;\n"));
    assert!(out
        .bindings
        .contains("        private static extern byte Inner_s_is_ready();\n"));
}

#[test]
fn reference_parameter_is_passed_by_handle() {
    let tree = DeclTree::new()
        .class(
            ClassDecl::new("Widget").function(
                FunctionDecl::method("set", "void").param(ParameterDecl::new("t", "Thing&")),
            ),
        )
        .class(ClassDecl::new("Thing"));
    let out = generate(&GeneratorConfig::default(), &tree).unwrap();

    assert!(out
        .glue
        .contains("EXPORTS(void) Widget_set(Widget* target, Thing* t) { target->set(*t); }\n"));
    assert!(out
        .bindings
        .contains("public void Set(Thing t) => Widget_set(this.Handle, t.Handle);"));
    assert!(out
        .bindings
        .contains("private static extern void Widget_set(void* target, void* t);"));
}

#[test]
fn reference_to_pointer_parameters_are_skipped() {
    let tree = DeclTree::new()
        .class(
            ClassDecl::new("Widget")
                .function(FunctionDecl::method("swap", "void").param(ParameterDecl::new("t", "Thing*&")))
                .function(
                    FunctionDecl::method("advance", "void").param(ParameterDecl::new("buf", "uint8_t*&")),
                )
                .function(FunctionDecl::method("size", "int")),
        )
        .class(ClassDecl::new("Thing"));
    let out = generate(&GeneratorConfig::default(), &tree).unwrap();

    for name in ["swap", "advance"] {
        assert!(!out.glue.contains(&format!("Widget_{}", name)), "{} in glue", name);
        assert!(!out.bindings.contains(&format!("Widget_{}", name)), "{} in bindings", name);
    }
    assert!(out.glue.contains("EXPORTS(int) Widget_size(Widget* target) { return target->size(); }"));

    let reasons: Vec<&SkipReason> = out.report.skipped_in("Widget").map(|s| &s.reason).collect();
    assert_eq!(reasons.len(), 2);
    assert!(reasons
        .iter()
        .all(|r| matches!(r, SkipReason::UnsupportedReference { .. })));
}

#[test]
fn denylisted_and_reference_returns_are_skipped() {
    let tree = DeclTree::new().class(
        ClassDecl::new("Reader")
            .function(FunctionDecl::method("source", "padded_string*"))
            .function(FunctionDecl::method("counter", "uint64_t&"))
            .function(FunctionDecl::method("count", "uint64_t")),
    );
    let out = generate(&GeneratorConfig::default(), &tree).unwrap();

    for text in [&out.glue, &out.bindings] {
        assert!(!text.contains("padded_string"));
        assert!(!text.contains("Reader_source"));
        assert!(!text.contains("Reader_counter"));
    }
    assert_eq!(glue_exports(&out.glue), vec!["Reader_count", "Reader_Dispose"]);
    assert_eq!(binding_imports(&out.bindings), vec!["Reader_count", "Reader_Dispose"]);
    assert!(out.bindings.contains("public ulong Count() => Reader_count(this.Handle);"));
}

#[test]
fn declared_target_parameter_does_not_shadow_handle() {
    let tree = DeclTree::new().class(
        ClassDecl::new("Widget")
            .function(FunctionDecl::method("aim", "void").param(ParameterDecl::new("target", "int"))),
    );
    let out = generate(&GeneratorConfig::default(), &tree).unwrap();

    assert!(out
        .glue
        .contains("EXPORTS(void) Widget_aim(Widget* target, int target_) { target->aim(target_); }\n"));
    assert!(out
        .bindings
        .contains("private static extern void Widget_aim(void* target, int target_);"));
    assert!(out
        .bindings
        .contains("public void Aim(int target_) => Widget_aim(this.Handle, target_);"));
}

#[test]
fn simdjson_like_surface() {
    let out = generate(&GeneratorConfig::default(), &simdjson_like()).unwrap();

    assert_eq!(
        glue_exports(&out.glue),
        vec![
            "ParsedJson_ParsedJson",
            "ParsedJson_allocate_capacity",
            "ParsedJson_is_valid",
            "ParsedJson_get_error_code",
            "ParsedJson_deallocate",
            "ParsedJson_Dispose",
            "iterator_iterator",
            "iterator_is_ok",
            "iterator_get_type",
            "iterator_get_integer",
            "iterator_get_string",
            "iterator_get_string_length",
            "iterator_s_is_object_or_array",
            "iterator_is_object_or_array",
            "iterator_move_to_key",
            "iterator_Dispose",
        ]
    );

    let b = &out.bindings;
    assert!(b.contains("public unsafe partial class ParsedJsonN : IDisposable"));
    assert!(b.contains("public unsafe partial class ParsedJsonIteratorN : IDisposable"));
    assert!(b.contains("public ParsedJsonN() => this.Handle = ParsedJson_ParsedJson();"));
    assert!(b.contains(
        "public ParsedJsonIteratorN(ParsedJsonN pj) => this.Handle = iterator_iterator(pj.Handle);"
    ));
    assert!(b.contains(
        "public bool AllocateCapacity(long len, long maxdepth) => \
         ParsedJson_allocate_capacity(this.Handle, (IntPtr)len, (IntPtr)maxdepth) > 0;"
    ));
    assert!(b.contains("public bool IsValid => ParsedJson_is_valid(this.Handle) > 0;"));
    assert!(b.contains("public byte GetTokenType() => iterator_get_type(this.Handle);"));
    assert!(b.contains("public sbyte* GetString() => iterator_get_string(this.Handle);"));
    assert!(b.contains(
        "public static bool IsObjectOrArrayStatic(byte type) => iterator_s_is_object_or_array(type) > 0;"
    ));
    assert!(b.contains("public bool IsObjectOrArray => iterator_is_object_or_array(this.Handle) > 0;"));
    assert!(b.contains("public void Deallocate() => ParsedJson_deallocate(this.Handle);"));

    assert!(out
        .glue
        .contains("EXPORTS(bool) ParsedJson_allocate_capacity(ParsedJson* target, size_t len, size_t maxdepth)"));
    assert!(out
        .glue
        .contains("EXPORTS(ParsedJson::iterator*) iterator_iterator(ParsedJson* pj) { return new ParsedJson::iterator(*pj); }"));
}

#[test]
fn custom_denylist_and_namespace() {
    let tree = DeclTree::new()
        .class(ClassDecl::new("Public").function(
            FunctionDecl::method("leak", "void").param(ParameterDecl::new("s", "const Secret *")),
        ))
        .class(ClassDecl::new("Secret"));
    let config = GeneratorConfig::default()
        .with_namespace("Acme.Native")
        .with_header_include("acme.h")
        .with_ignore(IgnoreFilter::new(["Secret"]));
    let out = generate(&config, &tree).unwrap();

    assert!(out.glue.contains("#include \"acme.h\"\n"));
    assert!(out.bindings.contains("namespace Acme.Native\n{\n"));
    assert!(!out.glue.contains("Secret"));
    assert!(!out.bindings.contains("Secret"));
    assert_eq!(glue_exports(&out.glue), vec!["Public_Dispose"]);
}
