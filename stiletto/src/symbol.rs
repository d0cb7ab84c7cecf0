//! Host symbol model consumed by the generator.
//!
//! The generator never talks to a compiler directly. Everything it needs to
//! know about declarations goes through the [`SymbolModel`] capability trait,
//! which exposes type lookup and the subtype relation over the element model
//! defined here. [`SymbolTable`] is an in-memory implementation that can be
//! built programmatically or deserialized from JSON.
//!
//! # Examples
//!
//! ```rust
//! use stiletto::{ExecutableElement, SymbolModel, SymbolTable, TypeElement, TypeRef};
//!
//! let table = SymbolTable::new()
//!     .with(TypeElement::interface("app.BookLoader"))
//!     .with(
//!         TypeElement::class("app.LocalBookLoader")
//!             .implementing("app.BookLoader")
//!             .member(ExecutableElement::constructor()),
//!     );
//!
//! assert!(table.is_subtype(
//!     &TypeRef::new("app.LocalBookLoader"),
//!     &TypeRef::new("app.BookLoader"),
//! ));
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

/// Qualified name of the universal supertype of declared types.
pub const OBJECT_TYPE: &str = "java.lang.Object";

const PRIMITIVE_TYPES: &[&str] = &[
    "boolean", "byte", "short", "int", "long", "char", "float", "double",
];

/// Reference to a type by its source-level name, e.g. `java.util.List<java.lang.String>`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRef(String);

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn void() -> Self {
        Self("void".into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name without type arguments.
    pub fn erasure(&self) -> &str {
        match self.0.find('<') {
            Some(idx) => self.0[..idx].trim(),
            None => self.0.trim(),
        }
    }

    pub fn is_primitive(&self) -> bool {
        PRIMITIVE_TYPES.contains(&self.0.as_str())
    }

    pub fn is_void(&self) -> bool {
        self.0 == "void"
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Kind of a type declaration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    #[default]
    Class,
    Interface,
    Enum,
    Annotation,
}

/// Declaration modifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Abstract,
    Static,
    Final,
}

impl Modifier {
    pub fn keyword(self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Abstract => "abstract",
            Modifier::Static => "static",
            Modifier::Final => "final",
        }
    }
}

/// Constant value of an annotation property.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnnotationValue {
    Bool(bool),
    Int(i64),
    Char(char),
    String(String),
    /// A class literal, e.g. `Foo.class`.
    Type(TypeRef),
    Enum { r#type: TypeRef, constant: String },
    Array(Vec<AnnotationValue>),
    Annotation(AnnotationMirror),
}

/// An annotation as it appears on a declaration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnotationMirror {
    #[serde(rename = "type")]
    pub annotation_type: TypeRef,
    #[serde(default)]
    pub values: BTreeMap<String, AnnotationValue>,
}

impl AnnotationMirror {
    pub fn new(annotation_type: impl Into<TypeRef>) -> Self {
        Self {
            annotation_type: annotation_type.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn value(mut self, name: impl Into<String>, value: AnnotationValue) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn is(&self, name: &str) -> bool {
        self.annotation_type.as_str() == name
    }
}

/// A parameter or field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariableElement {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub modifiers: BTreeSet<Modifier>,
    #[serde(default)]
    pub annotations: Vec<AnnotationMirror>,
}

impl VariableElement {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            modifiers: BTreeSet::new(),
            annotations: Vec::new(),
        }
    }

    pub fn annotated(mut self, annotation: AnnotationMirror) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// A method or constructor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExecutableElement {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub modifiers: BTreeSet<Modifier>,
    #[serde(default = "TypeRef::void")]
    pub return_type: TypeRef,
    #[serde(default)]
    pub parameters: Vec<VariableElement>,
    #[serde(default)]
    pub annotations: Vec<AnnotationMirror>,
}

impl ExecutableElement {
    pub fn method(name: impl Into<String>, return_type: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            modifiers: BTreeSet::new(),
            return_type: return_type.into(),
            parameters: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn constructor() -> Self {
        Self::method("<init>", TypeRef::void())
    }

    pub fn parameter(mut self, parameter: VariableElement) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn annotated(mut self, annotation: AnnotationMirror) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.insert(modifier);
        self
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotations.iter().any(|v| v.is(name))
    }

    pub fn annotation(&self, name: &str) -> Option<&AnnotationMirror> {
        self.annotations.iter().find(|v| v.is(name))
    }

    /// Name and parameter types, used to identify overrides.
    pub fn signature(&self) -> (String, Vec<TypeRef>) {
        (
            self.name.clone(),
            self.parameters.iter().map(|v| v.ty.clone()).collect(),
        )
    }
}

/// A member declared inside a type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    Method(ExecutableElement),
    Constructor(ExecutableElement),
    Field(VariableElement),
}

impl Element {
    pub fn as_method(&self) -> Option<&ExecutableElement> {
        match self {
            Element::Method(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_constructor(&self) -> Option<&ExecutableElement> {
        match self {
            Element::Constructor(v) => Some(v),
            _ => None,
        }
    }
}

/// A class, interface, enum or annotation declaration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeElement {
    pub name: TypeRef,
    #[serde(default)]
    pub kind: ElementKind,
    #[serde(default)]
    pub modifiers: BTreeSet<Modifier>,
    #[serde(default)]
    pub superclass: Option<TypeRef>,
    #[serde(default)]
    pub interfaces: Vec<TypeRef>,
    #[serde(default)]
    pub annotations: Vec<AnnotationMirror>,
    #[serde(default)]
    pub members: Vec<Element>,
}

impl TypeElement {
    pub fn class(name: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            kind: ElementKind::Class,
            modifiers: BTreeSet::new(),
            superclass: None,
            interfaces: Vec::new(),
            annotations: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn interface(name: impl Into<TypeRef>) -> Self {
        Self {
            kind: ElementKind::Interface,
            ..Self::class(name)
        }
    }

    pub fn extending(mut self, superclass: impl Into<TypeRef>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn implementing(mut self, interface: impl Into<TypeRef>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn annotated(mut self, annotation: AnnotationMirror) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.insert(modifier);
        self
    }

    /// Adds a method, or a constructor when built with [`ExecutableElement::constructor`].
    pub fn member(mut self, member: ExecutableElement) -> Self {
        if member.name == "<init>" {
            self.members.push(Element::Constructor(member));
        } else {
            self.members.push(Element::Method(member));
        }
        self
    }

    pub fn field(mut self, field: VariableElement) -> Self {
        self.members.push(Element::Field(field));
        self
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotations.iter().any(|v| v.is(name))
    }

    pub fn annotation(&self, name: &str) -> Option<&AnnotationMirror> {
        self.annotations.iter().find(|v| v.is(name))
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ElementKind::Interface
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers.contains(&Modifier::Abstract)
    }
}

/// Capability interface over the host's type and symbol model.
pub trait SymbolModel {
    /// Looks up a type declaration by its qualified name.
    fn type_element(&self, name: &str) -> Option<&TypeElement>;

    /// Returns `true` if `candidate` is `base` or one of its subtypes.
    fn is_subtype(&self, candidate: &TypeRef, base: &TypeRef) -> bool;

    fn is_same_type(&self, a: &TypeRef, b: &TypeRef) -> bool;
}

/// In-memory symbol model.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    types: Vec<TypeElement>,
    index: HashMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a declaration, replacing any previous one with the same name.
    pub fn add(&mut self, element: TypeElement) -> &mut Self {
        let name = element.name.erasure().to_owned();
        match self.index.get(&name) {
            Some(&idx) => self.types[idx] = element,
            None => {
                self.index.insert(name, self.types.len());
                self.types.push(element);
            }
        }
        self
    }

    pub fn with(mut self, element: TypeElement) -> Self {
        self.add(element);
        self
    }

    /// Parses a JSON array of type declarations.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let types: Vec<TypeElement> = serde_json::from_str(text)?;
        Ok(types.into_iter().collect())
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeElement> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn direct_supertypes<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a TypeRef> {
        self.type_element(name)
            .into_iter()
            .flat_map(|v| v.superclass.iter().chain(v.interfaces.iter()))
    }
}

impl FromIterator<TypeElement> for SymbolTable {
    fn from_iter<T: IntoIterator<Item = TypeElement>>(iter: T) -> Self {
        let mut table = Self::new();
        for element in iter {
            table.add(element);
        }
        table
    }
}

impl SymbolModel for SymbolTable {
    fn type_element(&self, name: &str) -> Option<&TypeElement> {
        let key = TypeRef::new(name);
        self.index.get(key.erasure()).map(|&idx| &self.types[idx])
    }

    fn is_subtype(&self, candidate: &TypeRef, base: &TypeRef) -> bool {
        if self.is_same_type(candidate, base) {
            return true;
        }
        if candidate.is_primitive() || base.is_primitive() || candidate.is_void() {
            return false;
        }
        if base.erasure() == OBJECT_TYPE {
            return true;
        }
        // Type arguments are not compared: subtyping is decided on erasures.
        let target = base.erasure();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([candidate.erasure().to_owned()]);
        while let Some(current) = queue.pop_front() {
            if current == target {
                return true;
            }
            if !visited.insert(current.clone()) {
                continue;
            }
            for supertype in self.direct_supertypes(&current) {
                queue.push_back(supertype.erasure().to_owned());
            }
        }
        false
    }

    fn is_same_type(&self, a: &TypeRef, b: &TypeRef) -> bool {
        a.as_str().trim() == b.as_str().trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_erasure() {
        assert_eq!(TypeRef::new("java.util.List<a.B>").erasure(), "java.util.List");
        assert_eq!(TypeRef::new("a.B").erasure(), "a.B");
    }

    #[test]
    fn test_transitive_subtype() {
        let table = SymbolTable::new()
            .with(TypeElement::interface("a.Base"))
            .with(TypeElement::interface("a.Middle").implementing("a.Base"))
            .with(TypeElement::class("a.Impl").implementing("a.Middle"));
        assert!(table.is_subtype(&"a.Impl".into(), &"a.Base".into()));
        assert!(!table.is_subtype(&"a.Base".into(), &"a.Impl".into()));
        assert!(table.is_subtype(&"a.Impl".into(), &OBJECT_TYPE.into()));
    }

    #[test]
    fn test_primitives_are_only_subtypes_of_themselves() {
        let table = SymbolTable::new();
        assert!(table.is_subtype(&"int".into(), &"int".into()));
        assert!(!table.is_subtype(&"int".into(), &OBJECT_TYPE.into()));
        assert!(!table.is_subtype(&"int".into(), &"long".into()));
    }

    #[test]
    fn test_add_replaces_existing() {
        let mut table = SymbolTable::new();
        table.add(TypeElement::class("a.A"));
        table.add(TypeElement::interface("a.A"));
        assert_eq!(table.len(), 1);
        assert!(table.type_element("a.A").unwrap().is_interface());
    }
}
