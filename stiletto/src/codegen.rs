//! Declaration model for generated Java sources.
//!
//! Generated code is described with specs ([`TypeSpec`], [`MethodSpec`],
//! [`FieldSpec`], ...) and serialized by [`JavaFile`]. Type references inside
//! code are kept as [`TypeName`]s so the serializer can decide, per file,
//! which classes to import and which to spell out.

use std::collections::{BTreeMap, BTreeSet};

use crate::{AnnotationMirror, AnnotationValue, Modifier, TypeRef};

const INDENT: &str = "  ";

/// A top-level or nested class name, e.g. `a.b.Outer.Inner`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassName {
    package: String,
    simple_names: Vec<String>,
}

impl ClassName {
    pub fn new(package: impl Into<String>, simple_name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            simple_names: vec![simple_name.into()],
        }
    }

    /// Splits a qualified name, treating lower-case segments as the package.
    pub fn best_guess(name: &str) -> Self {
        let segments: Vec<&str> = name.split('.').filter(|v| !v.is_empty()).collect();
        if segments.is_empty() {
            return Self::new("", name);
        }
        let split = segments
            .iter()
            .position(|v| v.starts_with(char::is_uppercase))
            .unwrap_or(segments.len().saturating_sub(1));
        Self {
            package: segments[..split].join("."),
            simple_names: segments[split..].iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn nested(&self, simple_name: impl Into<String>) -> Self {
        let mut simple_names = self.simple_names.clone();
        simple_names.push(simple_name.into());
        Self {
            package: self.package.clone(),
            simple_names,
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn simple_name(&self) -> &str {
        self.simple_names.last().map(String::as_str).unwrap_or_default()
    }

    pub fn top_level(&self) -> Self {
        Self {
            package: self.package.clone(),
            simple_names: self.simple_names.iter().take(1).cloned().collect(),
        }
    }

    pub fn canonical_name(&self) -> String {
        let simple = self.simple_names.join(".");
        if self.package.is_empty() {
            simple
        } else {
            format!("{}.{simple}", self.package)
        }
    }
}

impl std::fmt::Display for ClassName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical_name())
    }
}

/// Any type that can appear in generated code.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeName {
    /// A primitive or `void`.
    Primitive(String),
    Class(ClassName),
    Parameterized {
        raw: ClassName,
        arguments: Vec<TypeName>,
    },
    Array(Box<TypeName>),
    Wildcard {
        bound: Option<(WildcardBound, Box<TypeName>)>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WildcardBound {
    Extends,
    Super,
}

const PRIMITIVE_NAMES: &[&str] = &[
    "void", "boolean", "byte", "short", "int", "long", "char", "float", "double",
];

impl TypeName {
    /// Parses a source-level type such as `java.util.Map<K, ? extends V>[]`.
    pub fn parse(text: &str) -> Self {
        let mut parser = TypeParser {
            chars: text.chars().collect(),
            pos: 0,
        };
        parser.parse_type()
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeName::Primitive(v) if v != "void")
    }

    fn visit_classes(&self, f: &mut impl FnMut(&ClassName)) {
        match self {
            TypeName::Primitive(_) => {}
            TypeName::Class(v) => f(v),
            TypeName::Parameterized { raw, arguments } => {
                f(raw);
                for argument in arguments {
                    argument.visit_classes(f);
                }
            }
            TypeName::Array(v) => v.visit_classes(f),
            TypeName::Wildcard { bound } => {
                if let Some((_, v)) = bound {
                    v.visit_classes(f);
                }
            }
        }
    }
}

impl From<&TypeRef> for TypeName {
    fn from(value: &TypeRef) -> Self {
        TypeName::parse(value.as_str())
    }
}

impl From<ClassName> for TypeName {
    fn from(value: ClassName) -> Self {
        TypeName::Class(value)
    }
}

struct TypeParser {
    chars: Vec<char>,
    pos: usize,
}

impl TypeParser {
    fn skip_whitespace(&mut self) {
        while self.chars.get(self.pos).is_some_and(|c| c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_whitespace();
        if self.chars.get(self.pos) == Some(&c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn name(&mut self) -> String {
        self.skip_whitespace();
        let start = self.pos;
        while self
            .chars
            .get(self.pos)
            .is_some_and(|c| c.is_alphanumeric() || *c == '_' || *c == '$' || *c == '.')
        {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn parse_type(&mut self) -> TypeName {
        let mut ty = if self.eat('?') {
            let bound = match self.name().as_str() {
                "extends" => Some((WildcardBound::Extends, Box::new(self.parse_type()))),
                "super" => Some((WildcardBound::Super, Box::new(self.parse_type()))),
                _ => None,
            };
            TypeName::Wildcard { bound }
        } else {
            let name = self.name();
            if PRIMITIVE_NAMES.contains(&name.as_str()) {
                TypeName::Primitive(name)
            } else {
                let raw = ClassName::best_guess(&name);
                if self.eat('<') {
                    let mut arguments = vec![self.parse_type()];
                    while self.eat(',') {
                        arguments.push(self.parse_type());
                    }
                    self.eat('>');
                    TypeName::Parameterized { raw, arguments }
                } else {
                    TypeName::Class(raw)
                }
            }
        };
        while self.eat('[') {
            self.eat(']');
            ty = TypeName::Array(Box::new(ty));
        }
        ty
    }
}

#[derive(Clone, Debug, PartialEq)]
enum CodePart {
    Text(String),
    Type(TypeName),
    Annotation(Box<AnnotationSpec>),
}

/// A fragment of code with embedded type references.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CodeBlock {
    parts: Vec<CodePart>,
}

impl CodeBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(CodePart::Text(text.into()));
        self
    }

    pub fn ty(mut self, ty: impl Into<TypeName>) -> Self {
        self.parts.push(CodePart::Type(ty.into()));
        self
    }

    /// Appends a Java string literal.
    pub fn string(self, value: &str) -> Self {
        self.text(string_literal(value))
    }

    pub fn annotation(mut self, annotation: AnnotationSpec) -> Self {
        self.parts.push(CodePart::Annotation(Box::new(annotation)));
        self
    }

    /// Appends `items` separated by `", "`.
    pub fn join(mut self, items: impl IntoIterator<Item = CodeBlock>) -> Self {
        for (idx, item) in items.into_iter().enumerate() {
            if idx > 0 {
                self.parts.push(CodePart::Text(", ".into()));
            }
            self.parts.extend(item.parts);
        }
        self
    }

    fn visit_classes(&self, f: &mut impl FnMut(&ClassName)) {
        for part in &self.parts {
            match part {
                CodePart::Text(_) => {}
                CodePart::Type(v) => v.visit_classes(f),
                CodePart::Annotation(v) => v.visit_classes(f),
            }
        }
    }
}

fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn char_literal(value: char) -> String {
    match value {
        '\'' => "'\\''".into(),
        '\\' => "'\\\\'".into(),
        '\n' => "'\\n'".into(),
        '\t' => "'\\t'".into(),
        c => format!("'{c}'"),
    }
}

/// An annotation on a generated declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationSpec {
    ty: ClassName,
    members: BTreeMap<String, CodeBlock>,
}

impl AnnotationSpec {
    pub fn new(ty: ClassName) -> Self {
        Self {
            ty,
            members: BTreeMap::new(),
        }
    }

    pub fn member(mut self, name: impl Into<String>, value: CodeBlock) -> Self {
        self.members.insert(name.into(), value);
        self
    }

    pub fn ty(&self) -> &ClassName {
        &self.ty
    }

    /// Copies an annotation found on a source declaration.
    pub fn from_mirror(mirror: &AnnotationMirror) -> Self {
        let mut spec = Self::new(ClassName::best_guess(mirror.annotation_type.erasure()));
        for (name, value) in &mirror.values {
            spec.members.insert(name.clone(), annotation_value(value));
        }
        spec
    }

    fn visit_classes(&self, f: &mut impl FnMut(&ClassName)) {
        f(&self.ty);
        for value in self.members.values() {
            value.visit_classes(f);
        }
    }
}

fn annotation_value(value: &AnnotationValue) -> CodeBlock {
    match value {
        AnnotationValue::Bool(v) => CodeBlock::new().text(v.to_string()),
        AnnotationValue::Int(v) => CodeBlock::new().text(v.to_string()),
        AnnotationValue::Char(v) => CodeBlock::new().text(char_literal(*v)),
        AnnotationValue::String(v) => CodeBlock::new().string(v),
        AnnotationValue::Type(v) => CodeBlock::new().ty(v).text(".class"),
        AnnotationValue::Enum { r#type, constant } => {
            CodeBlock::new().ty(r#type).text(format!(".{constant}"))
        }
        AnnotationValue::Array(values) => match values.as_slice() {
            [single] => annotation_value(single),
            values => CodeBlock::new()
                .text("{")
                .join(values.iter().map(annotation_value))
                .text("}"),
        },
        AnnotationValue::Annotation(v) => {
            CodeBlock::new().annotation(AnnotationSpec::from_mirror(v))
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldSpec {
    pub ty: TypeName,
    pub name: String,
    pub modifiers: BTreeSet<Modifier>,
    pub annotations: Vec<AnnotationSpec>,
}

impl FieldSpec {
    pub fn new(ty: impl Into<TypeName>, name: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            name: name.into(),
            modifiers: BTreeSet::new(),
            annotations: Vec::new(),
        }
    }

    pub fn modifiers(mut self, modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        self.modifiers.extend(modifiers);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSpec {
    pub ty: TypeName,
    pub name: String,
    pub annotations: Vec<AnnotationSpec>,
}

impl ParameterSpec {
    pub fn new(ty: impl Into<TypeName>, name: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            name: name.into(),
            annotations: Vec::new(),
        }
    }

    pub fn annotations(mut self, annotations: impl IntoIterator<Item = AnnotationSpec>) -> Self {
        self.annotations.extend(annotations);
        self
    }
}

/// A method or constructor.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodSpec {
    pub name: String,
    pub constructor: bool,
    pub javadoc: Option<String>,
    pub annotations: Vec<AnnotationSpec>,
    pub modifiers: BTreeSet<Modifier>,
    pub return_type: Option<TypeName>,
    pub parameters: Vec<ParameterSpec>,
    pub statements: Vec<CodeBlock>,
}

impl MethodSpec {
    pub fn method(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constructor: false,
            javadoc: None,
            annotations: Vec::new(),
            modifiers: BTreeSet::new(),
            return_type: None,
            parameters: Vec::new(),
            statements: Vec::new(),
        }
    }

    pub fn constructor() -> Self {
        Self {
            constructor: true,
            ..Self::method("<init>")
        }
    }

    pub fn javadoc(mut self, text: impl Into<String>) -> Self {
        self.javadoc = Some(text.into());
        self
    }

    pub fn annotation(mut self, annotation: AnnotationSpec) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn annotations(mut self, annotations: impl IntoIterator<Item = AnnotationSpec>) -> Self {
        self.annotations.extend(annotations);
        self
    }

    pub fn modifiers(mut self, modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        self.modifiers.extend(modifiers);
        self
    }

    pub fn returns(mut self, ty: impl Into<TypeName>) -> Self {
        self.return_type = Some(ty.into());
        self
    }

    pub fn parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn parameters(mut self, parameters: impl IntoIterator<Item = ParameterSpec>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    /// Appends a statement; the terminating `;` is added on output.
    pub fn statement(mut self, statement: CodeBlock) -> Self {
        self.statements.push(statement);
        self
    }

    /// Simple statement without type references.
    pub fn statement_text(self, statement: impl Into<String>) -> Self {
        self.statement(CodeBlock::new().text(statement))
    }

    pub fn add_parameter(&mut self, parameter: ParameterSpec) {
        self.parameters.push(parameter);
    }

    pub fn add_statement(&mut self, statement: CodeBlock) {
        self.statements.push(statement);
    }

    fn visit_classes(&self, f: &mut impl FnMut(&ClassName)) {
        for annotation in &self.annotations {
            annotation.visit_classes(f);
        }
        if let Some(v) = &self.return_type {
            v.visit_classes(f);
        }
        for parameter in &self.parameters {
            parameter.ty.visit_classes(f);
            for annotation in &parameter.annotations {
                annotation.visit_classes(f);
            }
        }
        for statement in &self.statements {
            statement.visit_classes(f);
        }
    }
}

/// A class declaration with its members and nested classes.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeSpec {
    pub name: String,
    pub annotations: Vec<AnnotationSpec>,
    pub modifiers: BTreeSet<Modifier>,
    pub fields: Vec<FieldSpec>,
    pub methods: Vec<MethodSpec>,
    pub types: Vec<TypeSpec>,
}

impl TypeSpec {
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotations: Vec::new(),
            modifiers: BTreeSet::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            types: Vec::new(),
        }
    }

    pub fn annotation(mut self, annotation: AnnotationSpec) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn modifiers(mut self, modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        self.modifiers.extend(modifiers);
        self
    }

    pub fn add_field(&mut self, field: FieldSpec) {
        self.fields.push(field);
    }

    pub fn add_method(&mut self, method: MethodSpec) {
        self.methods.push(method);
    }

    pub fn add_type(&mut self, ty: TypeSpec) {
        self.types.push(ty);
    }

    /// Finds a method by name, constructors excluded.
    pub fn method(&self, name: &str) -> Option<&MethodSpec> {
        self.methods.iter().find(|v| !v.constructor && v.name == name)
    }

    pub fn constructor(&self) -> Option<&MethodSpec> {
        self.methods.iter().find(|v| v.constructor)
    }

    pub fn nested(&self, name: &str) -> Option<&TypeSpec> {
        self.types.iter().find(|v| v.name == name)
    }

    fn visit_classes(&self, f: &mut impl FnMut(&ClassName)) {
        for annotation in &self.annotations {
            annotation.visit_classes(f);
        }
        for field in &self.fields {
            field.ty.visit_classes(f);
            for annotation in &field.annotations {
                annotation.visit_classes(f);
            }
        }
        for method in &self.methods {
            method.visit_classes(f);
        }
        for ty in &self.types {
            ty.visit_classes(f);
        }
    }

    fn visit_names<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
        out.insert(&self.name);
        for ty in &self.types {
            ty.visit_names(out);
        }
    }
}

/// A compilation unit holding one top-level class.
#[derive(Clone, Debug, PartialEq)]
pub struct JavaFile {
    pub package: String,
    pub type_spec: TypeSpec,
    pub file_comment: Option<String>,
}

impl JavaFile {
    pub fn new(package: impl Into<String>, type_spec: TypeSpec) -> Self {
        Self {
            package: package.into(),
            type_spec,
            file_comment: None,
        }
    }

    pub fn file_comment(mut self, comment: impl Into<String>) -> Self {
        self.file_comment = Some(comment.into());
        self
    }

    pub fn class_name(&self) -> ClassName {
        ClassName::new(self.package.clone(), self.type_spec.name.clone())
    }

    /// Path of the file relative to a source root, e.g. `a/b/FooModule.java`.
    pub fn relative_path(&self) -> std::path::PathBuf {
        let mut path = std::path::PathBuf::new();
        for segment in self.package.split('.').filter(|v| !v.is_empty()) {
            path.push(segment);
        }
        path.push(format!("{}.java", self.type_spec.name));
        path
    }

    /// Serializes the file as Java source text.
    pub fn to_source(&self) -> String {
        let declared = self.declared_names();
        let imports = self.collect_imports(&declared);
        let mut writer = CodeWriter {
            out: String::new(),
            indent: 0,
            package: &self.package,
            imports: &imports,
            declared: &declared,
            type_stack: Vec::new(),
        };
        if let Some(comment) = &self.file_comment {
            for line in comment.lines() {
                writer.line(&format!("// {line}"));
            }
            writer.blank();
        }
        if !self.package.is_empty() {
            writer.line(&format!("package {};", self.package));
            writer.blank();
        }
        if !imports.is_empty() {
            let imported: BTreeSet<_> = imports.values().map(ClassName::canonical_name).collect();
            for name in imported {
                writer.line(&format!("import {name};"));
            }
            writer.blank();
        }
        writer.type_spec(&self.type_spec);
        writer.out
    }

    /// Simple names of the types declared in this file.
    fn declared_names(&self) -> BTreeSet<&str> {
        let mut declared = BTreeSet::new();
        self.type_spec.visit_names(&mut declared);
        declared
    }

    /// Top-level classes to import, keyed by simple name.
    fn collect_imports(&self, declared: &BTreeSet<&str>) -> BTreeMap<String, ClassName> {
        let mut referenced: BTreeMap<String, BTreeSet<ClassName>> = BTreeMap::new();
        self.type_spec.visit_classes(&mut |class: &ClassName| {
            let top = class.top_level();
            referenced
                .entry(top.simple_name().to_owned())
                .or_default()
                .insert(top);
        });
        let mut imports = BTreeMap::new();
        for (simple_name, classes) in referenced {
            if classes.len() != 1 || declared.contains(simple_name.as_str()) {
                continue;
            }
            if let Some(class) = classes.into_iter().next()
                && !class.package.is_empty()
                && class.package != self.package
                && class.package != "java.lang"
            {
                imports.insert(simple_name, class);
            }
        }
        imports
    }
}

impl std::fmt::Display for JavaFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_source())
    }
}

struct CodeWriter<'a> {
    out: String,
    indent: usize,
    package: &'a str,
    imports: &'a BTreeMap<String, ClassName>,
    /// Simple names shadowed by the file's own types.
    declared: &'a BTreeSet<&'a str>,
    type_stack: Vec<String>,
}

impl CodeWriter<'_> {
    fn line(&mut self, content: &str) {
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
        self.out.push_str(content);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn class_name(&self, class: &ClassName) -> String {
        let names = &class.simple_names;
        if class.package == self.package {
            let common = names
                .iter()
                .zip(&self.type_stack)
                .take_while(|(a, b)| a == b)
                .count();
            if common > 0 {
                return names[common.min(names.len() - 1)..].join(".");
            }
        }
        let top = &names[0];
        let imported = self
            .imports
            .get(top)
            .is_some_and(|v| v.package == class.package);
        let implicit = (class.package == self.package || class.package == "java.lang")
            && !self.imports.contains_key(top)
            && !self.declared.contains(top.as_str());
        if imported || implicit {
            names.join(".")
        } else {
            class.canonical_name()
        }
    }

    fn type_name(&self, ty: &TypeName) -> String {
        match ty {
            TypeName::Primitive(v) => v.clone(),
            TypeName::Class(v) => self.class_name(v),
            TypeName::Parameterized { raw, arguments } => {
                let arguments: Vec<_> = arguments.iter().map(|v| self.type_name(v)).collect();
                format!("{}<{}>", self.class_name(raw), arguments.join(", "))
            }
            TypeName::Array(v) => format!("{}[]", self.type_name(v)),
            TypeName::Wildcard { bound } => match bound {
                None => "?".into(),
                Some((WildcardBound::Extends, v)) => format!("? extends {}", self.type_name(v)),
                Some((WildcardBound::Super, v)) => format!("? super {}", self.type_name(v)),
            },
        }
    }

    fn code(&self, code: &CodeBlock) -> String {
        let mut out = String::new();
        for part in &code.parts {
            match part {
                CodePart::Text(v) => out.push_str(v),
                CodePart::Type(v) => out.push_str(&self.type_name(v)),
                CodePart::Annotation(v) => out.push_str(&self.annotation(v)),
            }
        }
        out
    }

    fn annotation(&self, annotation: &AnnotationSpec) -> String {
        let name = self.class_name(&annotation.ty);
        match annotation.members.len() {
            0 => format!("@{name}"),
            1 if annotation.members.contains_key("value") => {
                format!("@{name}({})", self.code(&annotation.members["value"]))
            }
            _ => {
                let members: Vec<_> = annotation
                    .members
                    .iter()
                    .map(|(k, v)| format!("{k} = {}", self.code(v)))
                    .collect();
                format!("@{name}({})", members.join(", "))
            }
        }
    }

    fn modifiers(modifiers: &BTreeSet<Modifier>) -> String {
        modifiers
            .iter()
            .map(|v| format!("{} ", v.keyword()))
            .collect()
    }

    fn javadoc(&mut self, text: &str) {
        self.line("/**");
        for line in text.lines() {
            if line.is_empty() {
                self.line(" *");
            } else {
                self.line(&format!(" * {line}"));
            }
        }
        self.line(" */");
    }

    fn type_spec(&mut self, spec: &TypeSpec) {
        self.type_stack.push(spec.name.clone());
        for annotation in &spec.annotations {
            let annotation = self.annotation(annotation);
            self.line(&annotation);
        }
        self.line(&format!(
            "{}class {} {{",
            Self::modifiers(&spec.modifiers),
            spec.name
        ));
        self.indent += 1;
        let mut first = true;
        let mut separate = |writer: &mut Self| {
            if !std::mem::take(&mut first) {
                writer.blank();
            }
        };
        for field in &spec.fields {
            separate(self);
            self.field(field);
        }
        let constructors = spec.methods.iter().filter(|v| v.constructor);
        let methods = spec.methods.iter().filter(|v| !v.constructor);
        for method in constructors.chain(methods) {
            separate(self);
            self.method(method, &spec.name);
        }
        for ty in &spec.types {
            separate(self);
            self.type_spec(ty);
        }
        self.indent -= 1;
        self.line("}");
        self.type_stack.pop();
    }

    fn field(&mut self, field: &FieldSpec) {
        for annotation in &field.annotations {
            let annotation = self.annotation(annotation);
            self.line(&annotation);
        }
        let line = format!(
            "{}{} {};",
            Self::modifiers(&field.modifiers),
            self.type_name(&field.ty),
            field.name
        );
        self.line(&line);
    }

    fn method(&mut self, method: &MethodSpec, enclosing: &str) {
        if let Some(javadoc) = &method.javadoc {
            self.javadoc(javadoc);
        }
        for annotation in &method.annotations {
            let annotation = self.annotation(annotation);
            self.line(&annotation);
        }
        let parameters: Vec<_> = method
            .parameters
            .iter()
            .map(|v| {
                let mut out = String::new();
                for annotation in &v.annotations {
                    out.push_str(&self.annotation(annotation));
                    out.push(' ');
                }
                out.push_str(&self.type_name(&v.ty));
                out.push(' ');
                out.push_str(&v.name);
                out
            })
            .collect();
        let signature = if method.constructor {
            enclosing.to_owned()
        } else {
            let return_type = match &method.return_type {
                Some(v) => self.type_name(v),
                None => "void".into(),
            };
            format!("{return_type} {}", method.name)
        };
        self.line(&format!(
            "{}{signature}({}) {{",
            Self::modifiers(&method.modifiers),
            parameters.join(", ")
        ));
        self.indent += 1;
        for statement in &method.statements {
            let statement = self.code(statement);
            self.line(&format!("{statement};"));
        }
        self.indent -= 1;
        self.line("}");
    }
}
