//! C# binding emitter
//!
//! Plans the `[DllImport]` declaration and the wrapper member for each glue
//! export, and renders the disposable wrapper class around them.

use crate::codegen::document::CodeWriter;
use crate::codegen::glue::GlueEmitter;
use crate::ir::{
    escape_csharp_identifier, parameter_name, summary_comment, BindingClass, BindingMethod,
    ClassIndex, CollectedClass, FunctionDecl, ImportDecl, ImportParam, ParameterDecl,
    ResultConversion, TypeDescriptor, TypeMapper, WrapperKind, WrapperMethod, WrapperParam,
    TARGET_PARAM,
};
use crate::policy::NamingPolicy;

const HANDLE_TYPE: &str = "void*";
const BOOL_MARSHAL: &str = "UnmanagedType.U1";

/// How one native parameter crosses the boundary
struct ParamPlan {
    import: ImportParam,
    wrapper: WrapperParam,
    arg: String,
}

/// How a native return value crosses the boundary
struct ReturnPlan {
    import: String,
    wrapper: String,
    conversion: ResultConversion,
}

/// Emitter for imports and wrapper members
pub struct BindingEmitter<'a> {
    mapper: &'a TypeMapper,
    naming: &'a NamingPolicy,
    classes: &'a ClassIndex,
}

impl<'a> BindingEmitter<'a> {
    /// Create an emitter
    pub fn new(mapper: &'a TypeMapper, naming: &'a NamingPolicy, classes: &'a ClassIndex) -> Self {
        Self {
            mapper,
            naming,
            classes,
        }
    }

    /// Wrapper class name for a collected class
    pub fn wrapper_name(&self, class: &CollectedClass<'_>) -> String {
        self.mapper.map(class.name())
    }

    /// Plan the import and wrapper for a function whose glue export is `export`
    pub fn emit(&self, class: &CollectedClass<'_>, function: &FunctionDecl, export: &str) -> BindingMethod {
        let mut import_params = Vec::with_capacity(function.params.len() + 1);
        let mut wrapper_params = Vec::with_capacity(function.params.len());
        let mut args = Vec::with_capacity(function.params.len() + 1);

        if function.is_instance() {
            import_params.push(ImportParam::new(HANDLE_TYPE, TARGET_PARAM));
            args.push("this.Handle".to_string());
        }

        for (index, param) in function.params.iter().enumerate() {
            let plan = self.plan_param(param, index);
            import_params.push(plan.import);
            wrapper_params.push(plan.wrapper);
            args.push(plan.arg);
        }

        let wrapper = if function.is_constructor() {
            WrapperMethod {
                name: self.wrapper_name(class),
                kind: WrapperKind::Constructor,
                is_static: false,
                return_type: None,
                params: wrapper_params,
                target: export.to_string(),
                args,
                conversion: ResultConversion::None,
                doc: function.doc.clone(),
            }
        } else {
            let ret = self.plan_return(&function.return_type);
            let kind = if self.naming.is_property(function) {
                WrapperKind::Property
            } else {
                WrapperKind::Method
            };
            WrapperMethod {
                name: self.naming.member_name(&function.name, function.is_static),
                kind,
                is_static: function.is_static,
                return_type: Some(ret.wrapper),
                params: wrapper_params,
                target: export.to_string(),
                args,
                conversion: ret.conversion,
                doc: function.doc.clone(),
            }
        };

        let import_return = if function.is_constructor() {
            HANDLE_TYPE.to_string()
        } else {
            self.plan_return(&function.return_type).import
        };

        BindingMethod {
            import: ImportDecl {
                export_name: export.to_string(),
                return_type: import_return,
                params: import_params,
            },
            wrapper,
        }
    }

    /// Import of the class's dispose export
    pub fn dispose(&self, class: &CollectedClass<'_>) -> ImportDecl {
        ImportDecl {
            export_name: GlueEmitter::dispose_name(class),
            return_type: "void".to_string(),
            params: vec![ImportParam::new(HANDLE_TYPE, TARGET_PARAM)],
        }
    }

    fn plan_param(&self, param: &ParameterDecl, index: usize) -> ParamPlan {
        let name = escape_csharp_identifier(&parameter_name(&param.name, index));
        let ty = &param.ty;

        if let Some(wrapper) = self.classes.wrapper_for(ty) {
            return ParamPlan {
                import: ImportParam::new(HANDLE_TYPE, name.clone()),
                wrapper: WrapperParam::new(wrapper, name.clone()),
                arg: format!("{}.Handle", name),
            };
        }

        let mapped = self.mapper.map_type(ty);

        if ty.is_reference() {
            let import = match mapped.as_str() {
                "bool" => ImportParam::new("ref bool", name.clone()).marshal_as(BOOL_MARSHAL),
                m if TypeMapper::is_native_int(m) => ImportParam::new("ref IntPtr", name.clone()),
                m => ImportParam::new(format!("ref {}", m), name.clone()),
            };
            let wrapper_ty = if TypeMapper::is_native_int(&mapped) {
                "ref IntPtr".to_string()
            } else {
                format!("ref {}", mapped)
            };
            return ParamPlan {
                import,
                wrapper: WrapperParam::new(wrapper_ty, name.clone()),
                arg: format!("ref {}", name),
            };
        }

        match mapped.as_str() {
            "bool" => ParamPlan {
                import: ImportParam::new("bool", name.clone()).marshal_as(BOOL_MARSHAL),
                wrapper: WrapperParam::new("bool", name.clone()),
                arg: name,
            },
            m if TypeMapper::is_native_int(m) => ParamPlan {
                import: ImportParam::new("IntPtr", name.clone()),
                wrapper: WrapperParam::new("long", name.clone()),
                arg: format!("(IntPtr){}", name),
            },
            m => ParamPlan {
                import: ImportParam::new(m, name.clone()),
                wrapper: WrapperParam::new(m, name.clone()),
                arg: name,
            },
        }
    }

    fn plan_return(&self, ty: &TypeDescriptor) -> ReturnPlan {
        if self.classes.is_wrapped(ty) {
            return ReturnPlan {
                import: HANDLE_TYPE.to_string(),
                wrapper: HANDLE_TYPE.to_string(),
                conversion: ResultConversion::None,
            };
        }

        let mapped = self.mapper.map_type(ty);
        if mapped == "bool" {
            ReturnPlan {
                import: "byte".to_string(),
                wrapper: "bool".to_string(),
                conversion: ResultConversion::Bool,
            }
        } else if TypeMapper::is_native_int(&mapped) {
            ReturnPlan {
                import: "IntPtr".to_string(),
                wrapper: "long".to_string(),
                conversion: ResultConversion::Long,
            }
        } else {
            ReturnPlan {
                import: mapped.clone(),
                wrapper: mapped,
                conversion: ResultConversion::None,
            }
        }
    }
}

/// Renders a planned [`BindingClass`] as C# source
pub struct BindingClassRenderer<'a> {
    native_lib: &'a str,
}

impl<'a> BindingClassRenderer<'a> {
    /// Create a renderer; `native_lib` is the `MainClass.NativeLib` expression
    pub fn new(native_lib: &'a str) -> Self {
        Self { native_lib }
    }

    /// Render the class at column zero
    pub fn render(&self, class: &BindingClass) -> String {
        let name = &class.wrapper_name;
        let mut w = CodeWriter::new();

        w.line(format!("public unsafe partial class {} : IDisposable", name));
        w.open("{");

        w.block(&summary_comment(Some("Pointer to the underlying native object")));
        w.line("public void* Handle { get; private set; }");
        w.blank();

        w.block(&summary_comment(Some(&format!("Create {} from a native pointer", name))));
        w.line(format!("public {}(void* handle) => this.Handle = handle;", name));
        w.blank();

        for method in &class.methods {
            w.block(&method.wrapper.to_csharp());
            w.blank();
        }

        w.line("#region DllImports");
        for (i, method) in class.methods.iter().enumerate() {
            if i > 0 {
                w.blank();
            }
            w.block(&method.import.to_csharp(self.native_lib));
        }
        w.line("#endregion");
        w.blank();

        w.line("private readonly object disposeSync = new object();");
        w.blank();

        w.line("public void Dispose()");
        w.open("{");
        w.line("if (Handle != (void*) IntPtr.Zero)");
        w.open("{");
        w.line("lock (disposeSync)");
        w.open("{");
        w.line("if (Handle != (void*) IntPtr.Zero)");
        w.open("{");
        w.line(format!("{}(Handle);", class.dispose.export_name));
        w.line("Handle = (void*) IntPtr.Zero;");
        w.close("}");
        w.close("}");
        w.close("}");
        w.line("GC.SuppressFinalize(this);");
        w.close("}");
        w.blank();

        w.line(format!("~{}() => Dispose();", name));
        w.blank();

        w.block(&class.dispose.to_csharp(self.native_lib));
        w.close("}");

        w.finish()
    }
}
