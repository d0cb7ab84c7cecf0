//! Classification of annotated provider methods.
//!
//! Every method of a container that carries one of the provisioning markers is
//! turned into a [`ProvisionDescriptor`]. All validation happens here, so a
//! descriptor that exists is always safe to emit.

use tracing::debug;

use crate::inspect::NotATypeReason;
use crate::{
    AnnotatedContainer, AnnotationMirror, Error, ExecutableElement, Markers, ProcessingEnv,
    Result, TypeRef, VariableElement,
};

/// The three ways a provided value can be obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Supplied by the caller when the module is built.
    Runtime,
    /// Injected by the DI framework as an implementation type.
    Injection,
    /// Constructed by the module itself.
    NewInstance,
}

/// Attributes shared by every provisioning strategy.
#[derive(Clone, Debug, PartialEq)]
pub struct ProvidedMethod {
    /// Name of the declaring method, unique within the container.
    pub unique_name: String,
    /// Declared return type; the public-facing type of the provision.
    pub return_type: TypeRef,
    pub nullable: bool,
    /// Annotations of the declaring method, strategy markers excluded.
    pub annotations: Vec<AnnotationMirror>,
    /// Annotations of the single parameter of the declaring method, if any.
    pub parameter_qualifiers: Vec<AnnotationMirror>,
}

impl ProvidedMethod {
    /// Name of the generated provider method, e.g. `provideBookLoader`.
    pub fn provider_name(&self) -> String {
        let mut chars = self.unique_name.chars();
        match chars.next() {
            Some(first) => format!("provide{}{}", first.to_uppercase(), chars.as_str()),
            None => "provide".into(),
        }
    }

    /// Returns `true` if the value can be left unset when the module is built.
    pub fn is_defaultable(&self) -> bool {
        self.nullable || self.return_type.is_primitive()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeValue {
    pub method: ProvidedMethod,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InjectedImplementation {
    pub method: ProvidedMethod,
    pub implementation: TypeRef,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConstructedInstance {
    pub method: ProvidedMethod,
    pub implementation: TypeRef,
    /// Parameters of the implementation's sole eligible constructor.
    pub parameters: Vec<VariableElement>,
}

/// A validated provision, one variant per [`Strategy`].
#[derive(Clone, Debug, PartialEq)]
pub enum ProvisionDescriptor {
    RuntimeValue(RuntimeValue),
    InjectedImplementation(InjectedImplementation),
    ConstructedInstance(ConstructedInstance),
}

impl ProvisionDescriptor {
    pub fn method(&self) -> &ProvidedMethod {
        match self {
            ProvisionDescriptor::RuntimeValue(v) => &v.method,
            ProvisionDescriptor::InjectedImplementation(v) => &v.method,
            ProvisionDescriptor::ConstructedInstance(v) => &v.method,
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            ProvisionDescriptor::RuntimeValue(_) => Strategy::Runtime,
            ProvisionDescriptor::InjectedImplementation(_) => Strategy::Injection,
            ProvisionDescriptor::ConstructedInstance(_) => Strategy::NewInstance,
        }
    }
}

/// Classifies one method of `container`.
///
/// Returns `Ok(None)` for methods without a provisioning marker. Any rule
/// violation is returned as a validation error naming the method.
pub fn classify(
    env: &ProcessingEnv<'_>,
    container: &AnnotatedContainer<'_>,
    method: &ExecutableElement,
) -> Result<Option<ProvisionDescriptor>> {
    let markers = env.markers();
    let element = container.method_element(method);
    let strategies: Vec<_> = [
        (Strategy::Runtime, markers.runtime.as_str()),
        (Strategy::Injection, markers.injection.as_str()),
        (Strategy::NewInstance, markers.new_instance.as_str()),
    ]
    .into_iter()
    .filter(|(_, marker)| method.has_annotation(marker))
    .collect();
    let (strategy, marker) = match strategies.as_slice() {
        [] => return Ok(None),
        [single] => *single,
        many => {
            let names: Vec<_> = many
                .iter()
                .map(|(_, v)| format!("@{}", Markers::display_name(v)))
                .collect();
            return Err(Error::validation(
                format!(
                    "Provisioning markers are mutually exclusive, found {}",
                    names.join(", ")
                ),
                element,
            ));
        }
    };
    if method.return_type.is_void() {
        return Err(Error::validation(
            format!(
                "Methods annotated with @{} must return a value",
                Markers::display_name(marker)
            ),
            element,
        ));
    }
    if container.in_component && !method.parameters.is_empty() {
        return Err(Error::validation(
            "Methods annotated with @ProvidedBy can't have parameters \
             when declared alongside the dagger @Component",
            element,
        ));
    }
    let provided = provided_method(env, method, &element);
    debug!(
        method = %element,
        strategy = ?strategy,
        nullable = provided.nullable,
        "Classified provision"
    );
    let descriptor = match strategy {
        Strategy::Runtime => ProvisionDescriptor::RuntimeValue(RuntimeValue { method: provided }),
        Strategy::Injection => {
            ProvisionDescriptor::InjectedImplementation(injection(env, method, provided, &element)?)
        }
        Strategy::NewInstance => {
            ProvisionDescriptor::ConstructedInstance(new_instance(env, method, provided, &element)?)
        }
    };
    Ok(Some(descriptor))
}

fn provided_method(
    env: &ProcessingEnv<'_>,
    method: &ExecutableElement,
    element: &str,
) -> ProvidedMethod {
    let markers = env.markers();
    let inspector = env.inspector();
    let nullable = inspector.is_nullable(method);
    if nullable && method.return_type.is_primitive() {
        env.warn(
            format!(
                "Nullable annotation on {} has no effect, primitive {} can't be null",
                element, method.return_type
            ),
            Some(element),
        );
    }
    // Qualifiers only travel with a single parameter, its type is never used.
    let parameter_qualifiers = match method.parameters.as_slice() {
        [parameter] => parameter
            .annotations
            .iter()
            .filter(|v| !markers.is_strategy(v.annotation_type.as_str()))
            .cloned()
            .collect(),
        _ => Vec::new(),
    };
    ProvidedMethod {
        unique_name: method.name.clone(),
        return_type: method.return_type.clone(),
        nullable: nullable && !method.return_type.is_primitive(),
        annotations: method
            .annotations
            .iter()
            .filter(|v| !markers.is_strategy(v.annotation_type.as_str()))
            .cloned()
            .collect(),
        parameter_qualifiers,
    }
}

fn injection(
    env: &ProcessingEnv<'_>,
    method: &ExecutableElement,
    provided: ProvidedMethod,
    element: &str,
) -> Result<InjectedImplementation> {
    let markers = env.markers();
    let inspector = env.inspector();
    let implementation = inspector
        .annotation_value(method, &markers.injection, &markers.implementation_property)
        .map_err(|e| Error::from(e).with_element(element))?;
    if !inspector.is_subtype(&implementation, &method.return_type) {
        return Err(Error::validation(
            format!(
                "Injected type {implementation} is not a subtype of {}",
                method.return_type
            ),
            element,
        ));
    }
    Ok(InjectedImplementation {
        method: provided,
        implementation,
    })
}

fn new_instance(
    env: &ProcessingEnv<'_>,
    method: &ExecutableElement,
    provided: ProvidedMethod,
    element: &str,
) -> Result<ConstructedInstance> {
    let markers = env.markers();
    let inspector = env.inspector();
    let sentinel = TypeRef::new(markers.unset_sentinel.as_str());
    let implementation = match inspector.annotation_value(
        method,
        &markers.new_instance,
        &markers.implementation_property,
    ) {
        Ok(v) if inspector.same_type(&v, &sentinel) => method.return_type.clone(),
        Ok(v) => v,
        Err(e) if e.reason == NotATypeReason::MissingValue => method.return_type.clone(),
        Err(e) => return Err(Error::from(e).with_element(element)),
    };
    let marker_name = Markers::display_name(&markers.new_instance);
    if !inspector.is_subtype(&implementation, &method.return_type) {
        return Err(Error::validation(
            format!(
                "Implementation type {implementation} is not a subtype of {}",
                method.return_type
            ),
            element,
        ));
    }
    let implementation_element = inspector.type_element(&implementation)?;
    if implementation_element.is_abstract() || implementation_element.is_interface() {
        return Err(Error::validation(
            format!(
                "Can't create instances of abstract classes or interfaces for {implementation}"
            ),
            element,
        ));
    }
    let constructors = inspector.constructors_of(implementation_element);
    let constructor = match constructors.as_slice() {
        [single] => *single,
        [] => {
            return Err(Error::validation(
                format!(
                    "No public or package constructors for {implementation} \
                     required by @{marker_name}"
                ),
                element,
            ));
        }
        _ => {
            return Err(Error::validation(
                format!(
                    "More than one constructor available for {implementation} \
                     @{marker_name} can't choose one"
                ),
                element,
            ));
        }
    };
    Ok(ConstructedInstance {
        method: provided,
        implementation,
        parameters: constructor.parameters.clone(),
    })
}
