use stiletto::{
    AnnotatedContainer, AnnotationMirror, AnnotationValue, Diagnostic, DiagnosticKind,
    DiagnosticLog, Element, ErrorKind, ExecutableElement, MemoryFiler, Modifier, NotATypeReason,
    ProcessingEnv, ProvisionDescriptor, Result, Strategy, SymbolModel, SymbolTable, TypeElement,
    TypeRef, VariableElement, classify,
};

const MODULE: &str = "stiletto.Stiletto.Module";
const RUNTIME: &str = "stiletto.ProvidedBy.Runtime";
const INJECTION: &str = "stiletto.ProvidedBy.Injection";
const NEW_INSTANCE: &str = "stiletto.ProvidedBy.NewInstance";
const CONTAINER: &str = "app.AppComponent";

fn marker(name: &str) -> AnnotationMirror {
    AnnotationMirror::new(name)
}

fn marker_with(name: &str, implementation: &str) -> AnnotationMirror {
    AnnotationMirror::new(name).value("value", AnnotationValue::Type(implementation.into()))
}

fn library() -> SymbolTable {
    SymbolTable::new()
        .with(TypeElement::interface("app.BookLoader"))
        .with(TypeElement::class("app.Database").member(ExecutableElement::constructor()))
        .with(
            TypeElement::class("app.LocalBookLoader")
                .implementing("app.BookLoader")
                .member(
                    ExecutableElement::constructor()
                        .parameter(VariableElement::new("database", "app.Database"))
                        .parameter(
                            VariableElement::new("root", "java.lang.String").annotated(
                                AnnotationMirror::new("javax.inject.Named")
                                    .value("value", AnnotationValue::String("books".into())),
                            ),
                        ),
                ),
        )
        .with(
            TypeElement::class("app.AbstractBookLoader")
                .implementing("app.BookLoader")
                .modifier(Modifier::Abstract)
                .member(ExecutableElement::constructor()),
        )
        .with(
            TypeElement::class("app.TwoWayLoader")
                .implementing("app.BookLoader")
                .member(ExecutableElement::constructor())
                .member(
                    ExecutableElement::constructor()
                        .parameter(VariableElement::new("database", "app.Database")),
                ),
        )
        .with(
            TypeElement::class("app.HiddenLoader")
                .implementing("app.BookLoader")
                .member(ExecutableElement::constructor().modifier(Modifier::Private)),
        )
}

fn with_container(table: SymbolTable, container: TypeElement) -> SymbolTable {
    table.with(container.annotated(marker(MODULE)))
}

fn container(methods: impl IntoIterator<Item = ExecutableElement>) -> TypeElement {
    let mut element = TypeElement::interface(CONTAINER);
    for method in methods {
        element = element.member(method);
    }
    element
}

fn classify_method(
    table: &SymbolTable,
    name: &str,
) -> (Result<Option<ProvisionDescriptor>>, Vec<Diagnostic>) {
    let log = DiagnosticLog::new();
    let filer = MemoryFiler::new();
    let env = ProcessingEnv::new(table, &log, &filer);
    let element = table.type_element(CONTAINER).unwrap();
    let container = AnnotatedContainer::new(env.markers(), element);
    let method = element
        .members
        .iter()
        .filter_map(Element::as_method)
        .find(|v| v.name == name)
        .unwrap();
    let result = classify(&env, &container, method);
    (result, log.diagnostics())
}

fn validation_message(result: Result<Option<ProvisionDescriptor>>) -> (String, Option<String>) {
    let err = result.unwrap_err();
    assert!(err.is_validation(), "{err:?}");
    (err.to_string(), err.element().map(str::to_owned))
}

#[test]
fn test_unmarked_method_is_ignored() {
    let table = with_container(
        library(),
        container([ExecutableElement::method("database", "app.Database")]),
    );
    let (result, diagnostics) = classify_method(&table, "database");
    assert!(result.unwrap().is_none());
    assert!(diagnostics.is_empty());
}

#[test]
fn test_runtime_value() {
    let table = with_container(
        library(),
        container([ExecutableElement::method("userName", "java.lang.String")
            .annotated(marker(RUNTIME))
            .annotated(
                AnnotationMirror::new("javax.inject.Named")
                    .value("value", AnnotationValue::String("user".into())),
            )]),
    );
    let (result, _) = classify_method(&table, "userName");
    let Some(ProvisionDescriptor::RuntimeValue(value)) = result.unwrap() else {
        panic!("expected runtime value");
    };
    assert_eq!(value.method.unique_name, "userName");
    assert_eq!(value.method.provider_name(), "provideUserName");
    assert_eq!(value.method.return_type, TypeRef::new("java.lang.String"));
    assert!(!value.method.nullable);
    // Strategy markers are never carried over.
    let annotations: Vec<_> = value
        .method
        .annotations
        .iter()
        .map(|v| v.annotation_type.as_str())
        .collect();
    assert_eq!(annotations, ["javax.inject.Named"]);
}

#[test]
fn test_runtime_value_nullable() {
    let table = with_container(
        library(),
        container([ExecutableElement::method("title", "java.lang.String")
            .annotated(marker(RUNTIME))
            .annotated(marker("org.jetbrains.annotations.Nullable"))]),
    );
    let (result, diagnostics) = classify_method(&table, "title");
    let descriptor = result.unwrap().unwrap();
    assert_eq!(descriptor.strategy(), Strategy::Runtime);
    assert!(descriptor.method().nullable);
    assert!(descriptor.method().is_defaultable());
    assert!(diagnostics.is_empty());
}

#[test]
fn test_nullable_primitive_warns() {
    let table = with_container(
        library(),
        container([ExecutableElement::method("pageSize", "int")
            .annotated(marker(RUNTIME))
            .annotated(marker("javax.annotation.Nullable"))]),
    );
    let (result, diagnostics) = classify_method(&table, "pageSize");
    let descriptor = result.unwrap().unwrap();
    assert!(!descriptor.method().nullable);
    assert!(descriptor.method().is_defaultable());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::MandatoryWarning);
    assert_eq!(diagnostics[0].element.as_deref(), Some("app.AppComponent.pageSize()"));
    assert!(diagnostics[0].message.contains("has no effect"));
}

#[test]
fn test_injected_implementation() {
    let table = with_container(
        library(),
        container([ExecutableElement::method("bookLoader", "app.BookLoader")
            .annotated(marker_with(INJECTION, "app.LocalBookLoader"))]),
    );
    let (result, _) = classify_method(&table, "bookLoader");
    let Some(ProvisionDescriptor::InjectedImplementation(injected)) = result.unwrap() else {
        panic!("expected injected implementation");
    };
    assert_eq!(injected.implementation, TypeRef::new("app.LocalBookLoader"));
    assert_eq!(injected.method.return_type, TypeRef::new("app.BookLoader"));
}

#[test]
fn test_injected_implementation_must_be_subtype() {
    let table = with_container(
        library(),
        container([ExecutableElement::method("bookLoader", "app.BookLoader")
            .annotated(marker_with(INJECTION, "app.Database"))]),
    );
    let (result, _) = classify_method(&table, "bookLoader");
    let (message, element) = validation_message(result);
    assert_eq!(
        message,
        "Injected type app.Database is not a subtype of app.BookLoader"
    );
    assert_eq!(element.as_deref(), Some("app.AppComponent.bookLoader()"));
}

#[test]
fn test_injected_implementation_requires_type_property() {
    let table = with_container(
        library(),
        container([ExecutableElement::method("bookLoader", "app.BookLoader").annotated(
            AnnotationMirror::new(INJECTION).value("value", AnnotationValue::String("x".into())),
        )]),
    );
    let (result, _) = classify_method(&table, "bookLoader");
    let err = result.unwrap_err();
    assert!(err.is_validation());
    assert!(matches!(err.kind(), ErrorKind::NotATypeProperty { .. }));
    assert_eq!(
        err.to_string(),
        "Property value of @stiletto.ProvidedBy.Injection is not a Class<?>"
    );
    assert_eq!(err.element(), Some("app.AppComponent.bookLoader()"));
}

#[test]
fn test_injected_implementation_without_value() {
    let table = with_container(
        library(),
        container([ExecutableElement::method("bookLoader", "app.BookLoader")
            .annotated(marker(INJECTION))]),
    );
    let (result, _) = classify_method(&table, "bookLoader");
    let err = result.unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::NotATypeProperty {
            reason: NotATypeReason::MissingValue,
            ..
        }
    ));
    assert_eq!(
        err.to_string(),
        "Property value of @stiletto.ProvidedBy.Injection has no value"
    );
    assert_eq!(err.element(), Some("app.AppComponent.bookLoader()"));
}

#[test]
fn test_parameter_qualifiers_from_single_parameter() {
    let named = AnnotationMirror::new("javax.inject.Named")
        .value("value", AnnotationValue::String("local".into()));
    let table = with_container(
        library(),
        TypeElement::class(CONTAINER).member(
            ExecutableElement::method("bookLoader", "app.BookLoader")
                .annotated(marker_with(INJECTION, "app.LocalBookLoader"))
                .parameter(
                    VariableElement::new("loader", "app.BookLoader").annotated(named.clone()),
                ),
        ),
    );
    let (result, _) = classify_method(&table, "bookLoader");
    let descriptor = result.unwrap().unwrap();
    assert_eq!(descriptor.method().parameter_qualifiers, vec![named]);
}

#[test]
fn test_no_parameter_qualifiers_from_many_parameters() {
    let named = AnnotationMirror::new("javax.inject.Named");
    let table = with_container(
        library(),
        TypeElement::class(CONTAINER).member(
            ExecutableElement::method("bookLoader", "app.BookLoader")
                .annotated(marker_with(INJECTION, "app.LocalBookLoader"))
                .parameter(VariableElement::new("a", "app.BookLoader").annotated(named.clone()))
                .parameter(VariableElement::new("b", "app.BookLoader").annotated(named)),
        ),
    );
    let (result, _) = classify_method(&table, "bookLoader");
    assert!(result.unwrap().unwrap().method().parameter_qualifiers.is_empty());
}

#[test]
fn test_component_methods_take_no_parameters() {
    let table = library().with(
        TypeElement::interface(CONTAINER)
            .annotated(marker(MODULE))
            .annotated(marker("dagger.Component"))
            .member(
                ExecutableElement::method("bookLoader", "app.BookLoader")
                    .annotated(marker_with(INJECTION, "app.LocalBookLoader"))
                    .parameter(VariableElement::new("loader", "app.BookLoader")),
            ),
    );
    let (result, _) = classify_method(&table, "bookLoader");
    let (message, element) = validation_message(result);
    assert_eq!(
        message,
        "Methods annotated with @ProvidedBy can't have parameters \
         when declared alongside the dagger @Component"
    );
    assert_eq!(
        element.as_deref(),
        Some("app.AppComponent.bookLoader(app.BookLoader)")
    );
}

#[test]
fn test_constructed_instance() {
    let table = with_container(
        library(),
        container([ExecutableElement::method("bookLoader", "app.BookLoader")
            .annotated(marker_with(NEW_INSTANCE, "app.LocalBookLoader"))]),
    );
    let (result, _) = classify_method(&table, "bookLoader");
    let Some(ProvisionDescriptor::ConstructedInstance(instance)) = result.unwrap() else {
        panic!("expected constructed instance");
    };
    assert_eq!(instance.implementation, TypeRef::new("app.LocalBookLoader"));
    let parameters: Vec<_> = instance
        .parameters
        .iter()
        .map(|v| (v.ty.as_str(), v.name.as_str(), v.annotations.len()))
        .collect();
    assert_eq!(
        parameters,
        [("app.Database", "database", 0), ("java.lang.String", "root", 1)]
    );
}

#[test]
fn test_constructed_instance_defaults_to_return_type() {
    for annotation in [marker(NEW_INSTANCE), marker_with(NEW_INSTANCE, "java.lang.Void")] {
        let table = with_container(
            library(),
            container([
                ExecutableElement::method("database", "app.Database").annotated(annotation),
            ]),
        );
        let (result, _) = classify_method(&table, "database");
        let Some(ProvisionDescriptor::ConstructedInstance(instance)) = result.unwrap() else {
            panic!("expected constructed instance");
        };
        assert_eq!(instance.implementation, TypeRef::new("app.Database"));
        assert!(instance.parameters.is_empty());
    }
}

#[test]
fn test_constructed_instance_must_be_subtype() {
    let table = with_container(
        library(),
        container([ExecutableElement::method("database", "app.Database")
            .annotated(marker_with(NEW_INSTANCE, "app.LocalBookLoader"))]),
    );
    let (result, _) = classify_method(&table, "database");
    let (message, _) = validation_message(result);
    assert_eq!(
        message,
        "Implementation type app.LocalBookLoader is not a subtype of app.Database"
    );
}

#[test]
fn test_constructed_instance_rejects_abstract_and_interfaces() {
    for implementation in ["app.AbstractBookLoader", "app.BookLoader"] {
        let table = with_container(
            library(),
            container([ExecutableElement::method("bookLoader", "app.BookLoader")
                .annotated(marker_with(NEW_INSTANCE, implementation))]),
        );
        let (result, _) = classify_method(&table, "bookLoader");
        let (message, _) = validation_message(result);
        assert_eq!(
            message,
            format!("Can't create instances of abstract classes or interfaces for {implementation}")
        );
    }
}

#[test]
fn test_constructed_instance_needs_one_constructor() {
    let table = with_container(
        library(),
        container([
            ExecutableElement::method("twoWay", "app.BookLoader")
                .annotated(marker_with(NEW_INSTANCE, "app.TwoWayLoader")),
            ExecutableElement::method("hidden", "app.BookLoader")
                .annotated(marker_with(NEW_INSTANCE, "app.HiddenLoader")),
        ]),
    );
    let (result, _) = classify_method(&table, "twoWay");
    let (message, _) = validation_message(result);
    assert_eq!(
        message,
        "More than one constructor available for app.TwoWayLoader \
         @ProvidedBy.NewInstance can't choose one"
    );

    let (result, _) = classify_method(&table, "hidden");
    let (message, _) = validation_message(result);
    assert_eq!(
        message,
        "No public or package constructors for app.HiddenLoader \
         required by @ProvidedBy.NewInstance"
    );
}

#[test]
fn test_constructed_instance_of_unknown_type() {
    // app.BookLoader is not declared, so its constructors can't be inspected.
    let table = with_container(
        SymbolTable::new(),
        container([ExecutableElement::method("bookLoader", "app.BookLoader")
            .annotated(marker(NEW_INSTANCE))]),
    );
    let (result, _) = classify_method(&table, "bookLoader");
    let err = result.unwrap_err();
    assert!(!err.is_validation());
    assert!(matches!(err.kind(), ErrorKind::UnknownType(name) if name == "app.BookLoader"));
}

#[test]
fn test_markers_are_mutually_exclusive() {
    let table = with_container(
        library(),
        container([ExecutableElement::method("bookLoader", "app.BookLoader")
            .annotated(marker(RUNTIME))
            .annotated(marker_with(INJECTION, "app.LocalBookLoader"))]),
    );
    let (result, _) = classify_method(&table, "bookLoader");
    let (message, _) = validation_message(result);
    assert_eq!(
        message,
        "Provisioning markers are mutually exclusive, found \
         @ProvidedBy.Runtime, @ProvidedBy.Injection"
    );
}

#[test]
fn test_void_provider_is_rejected() {
    let table = with_container(
        library(),
        container([ExecutableElement::method("nothing", "void").annotated(marker(RUNTIME))]),
    );
    let (result, _) = classify_method(&table, "nothing");
    let (message, _) = validation_message(result);
    assert_eq!(message, "Methods annotated with @ProvidedBy.Runtime must return a value");
}
