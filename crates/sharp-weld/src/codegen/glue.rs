//! C++ glue function emitter
//!
//! Builds one exported `extern "C"` function per bound constructor or member
//! function, plus the dispose export every class receives. Parameter and
//! return types keep their native spelling; references become pointers at
//! the boundary and are dereferenced again at the call site.

use crate::ir::{
    parameter_name, ClassIndex, CollectedClass, FunctionDecl, GlueCall, GlueFunction, GlueParam,
    TARGET_PARAM,
};

/// Emitter for exported glue functions
pub struct GlueEmitter<'a> {
    classes: &'a ClassIndex,
}

impl<'a> GlueEmitter<'a> {
    /// Create an emitter over the wrapped-class index
    pub fn new(classes: &'a ClassIndex) -> Self {
        Self { classes }
    }

    /// Exported name: `Short_` + `s_` for statics + native name
    pub fn export_name(class: &CollectedClass<'_>, function: &FunctionDecl) -> String {
        let static_marker = if function.is_static && !function.is_constructor() {
            "s_"
        } else {
            ""
        };
        format!("{}_{}{}", class.name(), static_marker, function.name)
    }

    /// Dispose export name for a class
    pub fn dispose_name(class: &CollectedClass<'_>) -> String {
        format!("{}_Dispose", class.name())
    }

    /// Build the glue function for a validated declaration
    pub fn emit(&self, class: &CollectedClass<'_>, function: &FunctionDecl) -> GlueFunction {
        let qualified = &class.qualified_name;
        let mut params = Vec::with_capacity(function.params.len() + 1);
        let mut args = Vec::with_capacity(function.params.len());

        if function.is_instance() {
            params.push(GlueParam::new(format!("{}*", qualified), TARGET_PARAM));
        }

        for (index, param) in function.params.iter().enumerate() {
            let name = parameter_name(&param.name, index);
            let display = param.ty.display_name().trim_end();

            let by_value_class = self.classes.is_wrapped(&param.ty) && param.ty.pointer_depth() == 0;
            let (ty, arg) = if let Some(referenced) = display.strip_suffix('&') {
                (format!("{}*", referenced.trim_end()), format!("*{}", name))
            } else if by_value_class {
                (format!("{}*", display), format!("*{}", name))
            } else {
                (display.to_string(), name.clone())
            };

            params.push(GlueParam::new(ty, name));
            args.push(arg);
        }

        let (return_type, call) = if function.is_constructor() {
            (
                format!("{}*", qualified),
                GlueCall::Construct {
                    class: qualified.clone(),
                },
            )
        } else if function.is_static {
            (
                function.return_type.display_name().to_string(),
                GlueCall::Static {
                    class: qualified.clone(),
                    function: function.name.clone(),
                },
            )
        } else {
            (
                function.return_type.display_name().to_string(),
                GlueCall::Instance {
                    function: function.name.clone(),
                },
            )
        };

        GlueFunction {
            export_name: Self::export_name(class, function),
            return_type,
            params,
            call,
            args,
        }
    }

    /// The unconditional `Short_Dispose(Qualified* target)` export
    pub fn dispose(&self, class: &CollectedClass<'_>) -> GlueFunction {
        GlueFunction {
            export_name: Self::dispose_name(class),
            return_type: "void".to_string(),
            params: vec![GlueParam::new(format!("{}*", class.qualified_name), TARGET_PARAM)],
            call: GlueCall::Delete,
            args: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{collect_classes, ClassDecl, DeclTree, ParameterDecl};

    fn tree() -> DeclTree {
        DeclTree::new()
            .class(ClassDecl::new("Foo").class(ClassDecl::new("Inner")))
            .class(ClassDecl::new("Thing"))
    }

    fn index(classes: &[CollectedClass<'_>]) -> ClassIndex {
        let mut index = ClassIndex::new();
        for class in classes {
            index.insert(class, class.name());
        }
        index
    }

    #[test]
    fn test_constructor() {
        let tree = tree();
        let classes = collect_classes(&tree);
        let index = index(&classes);
        let emitter = GlueEmitter::new(&index);

        let f = emitter.emit(&classes[0], &FunctionDecl::constructor("Foo"));
        assert_eq!(f.to_cpp(), "EXPORTS(Foo*) Foo_Foo() { return new Foo(); }");
    }

    #[test]
    fn test_nested_static() {
        let tree = tree();
        let classes = collect_classes(&tree);
        let index = index(&classes);
        let emitter = GlueEmitter::new(&index);

        let f = emitter.emit(&classes[1], &FunctionDecl::method("is_ready", "bool").static_fn());
        assert_eq!(
            f.to_cpp(),
            "EXPORTS(bool) Inner_s_is_ready() { return Foo::Inner::is_ready(); }"
        );
    }

    #[test]
    fn test_reference_parameter_is_adapted() {
        let tree = tree();
        let classes = collect_classes(&tree);
        let index = index(&classes);
        let emitter = GlueEmitter::new(&index);

        let f = emitter.emit(
            &classes[0],
            &FunctionDecl::method("set", "void").param(ParameterDecl::new("t", "Thing&")),
        );
        assert_eq!(f.to_cpp(), "EXPORTS(void) Foo_set(Foo* target, Thing* t) { target->set(*t); }");

        let f = emitter.emit(
            &classes[2],
            &FunctionDecl::method("read", "bool")
                .param(ParameterDecl::new("out", "uint64_t &"))
                .param(ParameterDecl::new("", "size_t")),
        );
        assert_eq!(
            f.to_cpp(),
            "EXPORTS(bool) Thing_read(Thing* target, uint64_t* out, size_t arg1) { return target->read(*out, arg1); }"
        );
    }

    #[test]
    fn test_by_value_class_parameter_passes_pointer() {
        let tree = tree();
        let classes = collect_classes(&tree);
        let index = index(&classes);
        let emitter = GlueEmitter::new(&index);

        let f = emitter.emit(
            &classes[0],
            &FunctionDecl::method("adopt", "void").param(ParameterDecl::new("t", "Thing")),
        );
        assert_eq!(f.to_cpp(), "EXPORTS(void) Foo_adopt(Foo* target, Thing* t) { target->adopt(*t); }");
    }

    #[test]
    fn test_declared_target_parameter_is_renamed() {
        let tree = tree();
        let classes = collect_classes(&tree);
        let index = index(&classes);
        let emitter = GlueEmitter::new(&index);

        let f = emitter.emit(
            &classes[0],
            &FunctionDecl::method("aim", "void").param(ParameterDecl::new("target", "int")),
        );
        assert_eq!(
            f.to_cpp(),
            "EXPORTS(void) Foo_aim(Foo* target, int target_) { target->aim(target_); }"
        );
    }

    #[test]
    fn test_dispose() {
        let tree = tree();
        let classes = collect_classes(&tree);
        let index = index(&classes);
        let emitter = GlueEmitter::new(&index);

        assert_eq!(
            emitter.dispose(&classes[1]).to_cpp(),
            "EXPORTS(void) Inner_Dispose(Foo::Inner* target) { delete target; }"
        );
    }
}
