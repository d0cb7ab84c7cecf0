//! Query layer over the host symbol model.
//!
//! The classifier and the assembler only ever look at declarations through an
//! [`Inspector`], which keeps every subtype check, annotation read and member
//! walk in one place.

use std::collections::{HashSet, VecDeque};

use crate::{
    AnnotationMirror, AnnotationValue, Element, Error, ExecutableElement, Markers, Modifier,
    Result, SymbolModel, TypeElement, TypeRef,
};

/// Failure to read a type-valued annotation property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotATypeProperty {
    pub annotation: String,
    pub property: String,
    pub reason: NotATypeReason,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotATypeReason {
    /// The annotation is not present on the declaration.
    MissingAnnotation,
    /// The property has no value and no default.
    MissingValue,
    /// The property holds a value of another kind.
    WrongKind,
}

impl std::fmt::Display for NotATypeProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self.reason {
            NotATypeReason::MissingAnnotation => "annotation is missing",
            NotATypeReason::MissingValue => "no value",
            NotATypeReason::WrongKind => "not a Class<?>",
        };
        write!(f, "@{}.{}: {reason}", self.annotation, self.property)
    }
}

impl std::error::Error for NotATypeProperty {}

/// Stateless queries against a [`SymbolModel`].
///
/// Declarations returned by the inspector borrow from the symbol model for
/// `'a`, independently of the markers it was created with.
#[derive(Clone, Copy)]
pub struct Inspector<'a, 'm> {
    symbols: &'a dyn SymbolModel,
    markers: &'m Markers,
}

impl<'a, 'm> Inspector<'a, 'm> {
    pub fn new(symbols: &'a dyn SymbolModel, markers: &'m Markers) -> Self {
        Self { symbols, markers }
    }

    pub fn markers(&self) -> &'m Markers {
        self.markers
    }

    pub fn type_element(&self, name: &TypeRef) -> Result<&'a TypeElement> {
        self.symbols
            .type_element(name.erasure())
            .ok_or_else(|| Error::unknown_type(name.as_str()))
    }

    pub fn is_subtype(&self, candidate: &TypeRef, base: &TypeRef) -> bool {
        self.symbols.is_subtype(candidate, base)
    }

    pub fn same_type(&self, a: &TypeRef, b: &TypeRef) -> bool {
        self.symbols.is_same_type(a, b)
    }

    /// Reads a type-valued property of `annotation`.
    pub fn try_type_property(
        &self,
        annotation: &AnnotationMirror,
        property: &str,
    ) -> Result<TypeRef, NotATypeProperty> {
        let error = |reason| NotATypeProperty {
            annotation: annotation.annotation_type.to_string(),
            property: property.to_owned(),
            reason,
        };
        match annotation.values.get(property) {
            Some(AnnotationValue::Type(ty)) => Ok(ty.clone()),
            Some(_) => Err(error(NotATypeReason::WrongKind)),
            None => Err(error(NotATypeReason::MissingValue)),
        }
    }

    /// Reads the type-valued `property` of the `annotation` present on `method`.
    pub fn annotation_value(
        &self,
        method: &ExecutableElement,
        annotation: &str,
        property: &str,
    ) -> Result<TypeRef, NotATypeProperty> {
        match method.annotation(annotation) {
            Some(v) => self.try_type_property(v, property),
            None => Err(NotATypeProperty {
                annotation: annotation.to_owned(),
                property: property.to_owned(),
                reason: NotATypeReason::MissingAnnotation,
            }),
        }
    }

    /// Returns `true` if any annotation of `method` is a recognized nullability marker.
    pub fn is_nullable(&self, method: &ExecutableElement) -> bool {
        method
            .annotations
            .iter()
            .any(|v| self.markers.is_nullable(v.annotation_type.as_str()))
    }

    /// Constructors of `ty` that are neither private nor protected.
    pub fn constructors_of(&self, ty: &'a TypeElement) -> Vec<&'a ExecutableElement> {
        ty.members
            .iter()
            .filter_map(Element::as_constructor)
            .filter(|v| {
                !v.modifiers.contains(&Modifier::Private)
                    && !v.modifiers.contains(&Modifier::Protected)
            })
            .collect()
    }

    /// Every member declared by `ty` and its supertypes.
    ///
    /// Supertypes are visited breadth-first, the superclass of each type before
    /// its interfaces. Supertypes absent from the symbol model are skipped.
    /// Methods overridden further down the hierarchy are only listed once, in
    /// their most-derived declaration. Constructors are never inherited.
    pub fn all_members_including_inherited(&self, ty: &'a TypeElement) -> Vec<&'a Element> {
        let mut out = Vec::new();
        let mut seen_methods = HashSet::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([ty]);
        while let Some(element) = queue.pop_front() {
            if !visited.insert(element.name.erasure()) {
                continue;
            }
            let inherited = !std::ptr::eq(element, ty);
            for member in &element.members {
                match member {
                    Element::Method(method) => {
                        if seen_methods.insert(method.signature()) {
                            out.push(member);
                        }
                    }
                    Element::Constructor(_) if inherited => {}
                    _ => out.push(member),
                }
            }
            let supertypes = element.superclass.iter().chain(&element.interfaces);
            queue.extend(supertypes.filter_map(|v| self.symbols.type_element(v.erasure())));
        }
        out
    }
}
