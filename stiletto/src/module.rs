//! Module assembly.
//!
//! An [`AnnotatedContainer`] is a declaration carrying the module marker. Its
//! provisions are classified into a [`ModulePlan`], which is then turned into
//! one `@Module` class with a nested `Builder`.

use tracing::debug;

use crate::error::ResultExt;
use crate::{
    AnnotationSpec, AnnotationValue, ClassName, CodeBlock, ConstructedInstance, Element,
    ExecutableElement, FieldSpec, InjectedImplementation, JavaFile, Markers, MethodSpec, Modifier,
    ParameterSpec, ProcessingEnv, ProvidedMethod, ProvisionDescriptor, Result, RuntimeValue,
    TypeElement, TypeName, TypeSpec, classify,
};

const COMPONENT_SUFFIX: &str = "Component";
const MODULE_SUFFIX: &str = "Module";
const BUILDER_NAME: &str = "Builder";

/// Derives the module's simple name from the container's simple name.
///
/// The last occurrence of `Component` and everything after it is replaced by
/// `Module`. A name that only starts with `Component`, or does not contain it,
/// gets `Module` appended.
///
/// ```rust
/// use stiletto::module_simple_name;
///
/// assert_eq!(module_simple_name("FooComponent"), "FooModule");
/// assert_eq!(module_simple_name("Foo"), "FooModule");
/// assert_eq!(module_simple_name("ComponentForBar"), "ComponentForBarModule");
/// ```
pub fn module_simple_name(container: &str) -> String {
    match container.rfind(COMPONENT_SUFFIX) {
        Some(idx) if idx > 0 => format!("{}{MODULE_SUFFIX}", &container[..idx]),
        _ => format!("{container}{MODULE_SUFFIX}"),
    }
}

/// A declaration requesting module generation.
#[derive(Clone, Debug)]
pub struct AnnotatedContainer<'a> {
    pub element: &'a TypeElement,
    pub class_name: ClassName,
    /// Set when the container is also a DI component.
    pub in_component: bool,
    /// Explicit module name given on the module marker.
    pub module_name: Option<String>,
}

impl<'a> AnnotatedContainer<'a> {
    pub fn new(markers: &Markers, element: &'a TypeElement) -> Self {
        let module_name = element
            .annotation(&markers.module)
            .and_then(|v| v.values.get(&markers.module_name_property))
            .and_then(|v| match v {
                AnnotationValue::String(name) if !name.trim().is_empty() => {
                    Some(name.trim().to_owned())
                }
                _ => None,
            });
        Self {
            element,
            class_name: ClassName::best_guess(element.name.erasure()),
            in_component: element.has_annotation(&markers.component),
            module_name,
        }
    }

    pub fn package(&self) -> &str {
        self.class_name.package()
    }

    pub fn qualified_name(&self) -> String {
        self.class_name.canonical_name()
    }

    /// Location of `method` used in diagnostics, e.g. `a.FooComponent.loader(a.Dep)`.
    pub fn method_element(&self, method: &ExecutableElement) -> String {
        let parameters: Vec<_> = method.parameters.iter().map(|v| v.ty.as_str()).collect();
        format!(
            "{}.{}({})",
            self.qualified_name(),
            method.name,
            parameters.join(", ")
        )
    }

    /// Class name of the generated module.
    pub fn module_class(&self) -> ClassName {
        let simple_name = match &self.module_name {
            Some(v) => v.clone(),
            None => module_simple_name(self.class_name.simple_name()),
        };
        ClassName::new(self.package(), simple_name)
    }

    /// Methods declared by the container or inherited from its supertypes.
    pub fn candidate_methods(&self, env: &ProcessingEnv<'a>) -> Vec<&'a ExecutableElement> {
        env.inspector()
            .all_members_including_inherited(self.element)
            .into_iter()
            .filter_map(Element::as_method)
            .collect()
    }
}

/// Validated provisions of one container.
#[derive(Clone, Debug)]
pub struct ModulePlan<'a> {
    pub container: AnnotatedContainer<'a>,
    pub module_class: ClassName,
    /// Provisions in declaration order.
    pub provisions: Vec<ProvisionDescriptor>,
}

impl<'a> ModulePlan<'a> {
    /// Classifies every candidate method of `container`.
    ///
    /// Fails on the first invalid provision.
    pub fn new(env: &ProcessingEnv<'a>, container: AnnotatedContainer<'a>) -> Result<Self> {
        let mut provisions = Vec::new();
        for method in container.candidate_methods(env) {
            let descriptor = classify(env, &container, method).context(|| {
                format!(
                    "stiletto::provision::classify({})",
                    container.method_element(method)
                )
            })?;
            if let Some(descriptor) = descriptor {
                provisions.push(descriptor);
            }
        }
        let module_class = container.module_class();
        debug!(
            container = %container.qualified_name(),
            module = %module_class,
            provisions = provisions.len(),
            "Planned module"
        );
        Ok(Self {
            container,
            module_class,
            provisions,
        })
    }

    pub fn builder_class(&self) -> ClassName {
        self.module_class.nested(BUILDER_NAME)
    }

    pub fn constructed(&self) -> impl Iterator<Item = &ConstructedInstance> {
        self.provisions.iter().filter_map(|v| match v {
            ProvisionDescriptor::ConstructedInstance(v) => Some(v),
            _ => None,
        })
    }

    pub fn injected(&self) -> impl Iterator<Item = &InjectedImplementation> {
        self.provisions.iter().filter_map(|v| match v {
            ProvisionDescriptor::InjectedImplementation(v) => Some(v),
            _ => None,
        })
    }

    pub fn runtime(&self) -> impl Iterator<Item = &RuntimeValue> {
        self.provisions.iter().filter_map(|v| match v {
            ProvisionDescriptor::RuntimeValue(v) => Some(v),
            _ => None,
        })
    }

    /// Returns `true` if the module can be built without any runtime value.
    pub fn has_create(&self) -> bool {
        self.runtime().all(|v| v.method.is_defaultable())
    }

    /// Builds the module source file.
    pub fn generate(&self, markers: &Markers) -> JavaFile {
        let mut module = TypeSpec::class(self.module_class.simple_name())
            .annotation(AnnotationSpec::new(ClassName::best_guess(&markers.dagger_module)))
            .modifiers([Modifier::Public]);
        self.emit_constructed(markers, &mut module);
        self.emit_injected(markers, &mut module);
        self.emit_runtime(markers, &mut module);
        JavaFile::new(self.module_class.package(), module)
    }

    fn provider(markers: &Markers, method: &ProvidedMethod) -> MethodSpec {
        MethodSpec::method(method.provider_name())
            .modifiers([Modifier::Public])
            .annotation(AnnotationSpec::new(ClassName::best_guess(&markers.provides)))
            .annotations(method.annotations.iter().map(AnnotationSpec::from_mirror))
            .returns(&method.return_type)
    }

    fn emit_constructed(&self, markers: &Markers, module: &mut TypeSpec) {
        for provision in self.constructed() {
            let parameters = provision.parameters.iter().map(|v| {
                ParameterSpec::new(&v.ty, v.name.as_str())
                    .annotations(v.annotations.iter().map(AnnotationSpec::from_mirror))
            });
            let arguments: Vec<_> = provision.parameters.iter().map(|v| v.name.as_str()).collect();
            let method = Self::provider(markers, &provision.method)
                .parameters(parameters)
                .statement(
                    CodeBlock::new()
                        .text("return new ")
                        .ty(&provision.implementation)
                        .text(format!("({})", arguments.join(", "))),
                );
            module.add_method(method);
        }
    }

    fn emit_injected(&self, markers: &Markers, module: &mut TypeSpec) {
        for provision in self.injected() {
            let name = provision.method.unique_name.as_str();
            let parameter = ParameterSpec::new(&provision.implementation, name).annotations(
                provision
                    .method
                    .parameter_qualifiers
                    .iter()
                    .map(AnnotationSpec::from_mirror),
            );
            let method = Self::provider(markers, &provision.method)
                .parameter(parameter)
                .statement_text(format!("return {name}"));
            module.add_method(method);
        }
    }

    fn emit_runtime(&self, markers: &Markers, module: &mut TypeSpec) {
        let module_name = TypeName::from(self.module_class.clone());
        let builder_name = TypeName::from(self.builder_class());
        let mut builder = TypeSpec::class(BUILDER_NAME).modifiers([
            Modifier::Public,
            Modifier::Static,
            Modifier::Final,
        ]);
        let mut build = MethodSpec::method("build")
            .modifiers([Modifier::Public])
            .returns(module_name.clone());
        let mut constructor = MethodSpec::constructor().modifiers([Modifier::Public]);
        let mut names = Vec::new();
        for provision in self.runtime() {
            let method = &provision.method;
            let name = method.unique_name.as_str();
            let ty = TypeName::from(&method.return_type);

            builder.add_field(FieldSpec::new(ty.clone(), name).modifiers([Modifier::Private]));
            builder.add_method(
                MethodSpec::method(name)
                    .modifiers([Modifier::Public])
                    .parameter(ParameterSpec::new(ty.clone(), name))
                    .statement_text(format!("this.{name} = {name}"))
                    .statement_text("return this")
                    .returns(builder_name.clone()),
            );

            module.add_field(
                FieldSpec::new(ty.clone(), name).modifiers([Modifier::Private, Modifier::Final]),
            );
            constructor.add_parameter(ParameterSpec::new(ty, name));
            constructor.add_statement(CodeBlock::new().text(format!("this.{name} = {name}")));

            if !method.is_defaultable() {
                build.add_statement(
                    CodeBlock::new()
                        .text(format!("if ({name} == null) throw new "))
                        .ty(ClassName::new("java.lang", "NullPointerException"))
                        .text("(")
                        .string(&format!("{name} == null"))
                        .text(")"),
                );
            }

            module.add_method(
                Self::provider(markers, method).statement_text(format!("return this.{name}")),
            );
            names.push(name);
        }
        build.add_statement(
            CodeBlock::new()
                .text("return new ")
                .ty(module_name.clone())
                .text(format!("({})", names.join(", "))),
        );
        builder.add_method(build);
        module.add_method(constructor);
        module.add_method(
            MethodSpec::method("builder")
                .modifiers([Modifier::Static])
                .statement(CodeBlock::new().text("return new ").ty(builder_name.clone()).text("()"))
                .returns(builder_name),
        );
        if self.has_create() {
            module.add_method(
                MethodSpec::method("create")
                    .javadoc("Create the module with default values (null, 0)")
                    .modifiers([Modifier::Static])
                    .statement_text("return builder().build()")
                    .returns(module_name),
            );
        }
        module.add_type(builder);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_simple_name() {
        assert_eq!(module_simple_name("FooComponent"), "FooModule");
        assert_eq!(module_simple_name("Foo"), "FooModule");
        assert_eq!(module_simple_name("FooComponentBar"), "FooModule");
        assert_eq!(module_simple_name("ComponentForBar"), "ComponentForBarModule");
        assert_eq!(module_simple_name("Component"), "ComponentModule");
    }
}
