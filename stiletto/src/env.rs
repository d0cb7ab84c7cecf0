//! Host facilities handed to the generator.
//!
//! A [`ProcessingEnv`] bundles the symbol model, the diagnostic channel and
//! the output channel. It is bound once, before the first round, and passed
//! explicitly to every component.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::warn;

use crate::{Inspector, JavaFile, Markers, SymbolModel};

/// Severity of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    Error,
    Warning,
    MandatoryWarning,
    Note,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticKind::Error => write!(f, "error"),
            DiagnosticKind::Warning => write!(f, "warning"),
            DiagnosticKind::MandatoryWarning => write!(f, "mandatory warning"),
            DiagnosticKind::Note => write!(f, "note"),
        }
    }
}

/// Diagnostic channel of the host toolchain.
pub trait Messager {
    fn print_message(&self, kind: DiagnosticKind, message: &str, element: Option<&str>);
}

/// A reported diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub element: Option<String>,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.element {
            Some(element) => write!(f, "{}: {}: {}", self.kind, element, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

/// [`Messager`] that records every diagnostic.
#[derive(Default)]
pub struct DiagnosticLog {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    pub fn errors(&self) -> Vec<Diagnostic> {
        self.of_kind(DiagnosticKind::Error)
    }

    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|v| {
                matches!(
                    v.kind,
                    DiagnosticKind::Warning | DiagnosticKind::MandatoryWarning
                )
            })
            .cloned()
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|v| v.kind == DiagnosticKind::Error)
    }

    fn of_kind(&self, kind: DiagnosticKind) -> Vec<Diagnostic> {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|v| v.kind == kind)
            .cloned()
            .collect()
    }
}

impl Messager for DiagnosticLog {
    fn print_message(&self, kind: DiagnosticKind, message: &str, element: Option<&str>) {
        self.diagnostics.borrow_mut().push(Diagnostic {
            kind,
            message: message.to_owned(),
            element: element.map(str::to_owned),
        });
    }
}

/// A generated source file ready to be written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedFile {
    pub qualified_name: String,
    /// Path relative to the output root, e.g. `a/b/FooModule.java`.
    pub relative_path: PathBuf,
    pub contents: String,
}

impl From<&JavaFile> for GeneratedFile {
    fn from(value: &JavaFile) -> Self {
        Self {
            qualified_name: value.class_name().canonical_name(),
            relative_path: value.relative_path(),
            contents: value.to_source(),
        }
    }
}

/// Output channel of the host toolchain.
///
/// Like a compiler's filer, a source file can only be created once.
pub trait Filer {
    fn write_source(&self, file: &GeneratedFile) -> std::io::Result<()>;

    /// Returns `true` if a source for `qualified_name` was already written.
    fn is_created(&self, qualified_name: &str) -> bool;
}

pub(crate) fn already_created(name: &str) -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::AlreadyExists,
        format!("Attempt to recreate a file for type {name}"),
    )
}

/// [`Filer`] that keeps generated sources in memory.
#[derive(Default)]
pub struct MemoryFiler {
    files: RefCell<BTreeMap<String, String>>,
}

impl MemoryFiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generated sources keyed by qualified class name.
    pub fn files(&self) -> BTreeMap<String, String> {
        self.files.borrow().clone()
    }

    pub fn get(&self, qualified_name: &str) -> Option<String> {
        self.files.borrow().get(qualified_name).cloned()
    }

    pub fn len(&self) -> usize {
        self.files.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.borrow().is_empty()
    }
}

impl Filer for MemoryFiler {
    fn write_source(&self, file: &GeneratedFile) -> std::io::Result<()> {
        let mut files = self.files.borrow_mut();
        if files.contains_key(&file.qualified_name) {
            return Err(already_created(&file.qualified_name));
        }
        files.insert(file.qualified_name.clone(), file.contents.clone());
        Ok(())
    }

    fn is_created(&self, qualified_name: &str) -> bool {
        self.files.borrow().contains_key(qualified_name)
    }
}

/// [`Filer`] writing sources below a directory, one directory per package.
pub struct DirFiler {
    root: PathBuf,
    created: RefCell<HashSet<String>>,
}

impl DirFiler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            created: RefCell::new(HashSet::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Filer for DirFiler {
    fn write_source(&self, file: &GeneratedFile) -> std::io::Result<()> {
        if !self.created.borrow_mut().insert(file.qualified_name.clone()) {
            return Err(already_created(&file.qualified_name));
        }
        let path = self.root.join(&file.relative_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &file.contents)
    }

    fn is_created(&self, qualified_name: &str) -> bool {
        self.created.borrow().contains(qualified_name)
    }
}

/// Facilities of the host toolchain, bound once before the first round.
pub struct ProcessingEnv<'a> {
    symbols: &'a dyn SymbolModel,
    messager: &'a dyn Messager,
    filer: &'a dyn Filer,
    markers: Markers,
}

impl<'a> ProcessingEnv<'a> {
    pub fn new(
        symbols: &'a dyn SymbolModel,
        messager: &'a dyn Messager,
        filer: &'a dyn Filer,
    ) -> Self {
        Self {
            symbols,
            messager,
            filer,
            markers: Markers::default(),
        }
    }

    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    pub fn symbols(&self) -> &'a dyn SymbolModel {
        self.symbols
    }

    pub fn inspector(&self) -> Inspector<'a, '_> {
        Inspector::new(self.symbols, &self.markers)
    }

    pub fn filer(&self) -> &'a dyn Filer {
        self.filer
    }

    pub fn error(&self, message: &str, element: Option<&str>) {
        self.messager
            .print_message(DiagnosticKind::Error, message, element);
    }

    /// Reports a non-fatal problem; processing continues.
    pub fn warn(&self, message: impl AsRef<str>, element: Option<&str>) {
        let message = message.as_ref();
        warn!(element = element.unwrap_or_default(), "{message}");
        self.messager
            .print_message(DiagnosticKind::MandatoryWarning, message, element);
    }
}
