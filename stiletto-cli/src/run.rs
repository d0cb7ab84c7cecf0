use std::cell::RefCell;
use std::path::PathBuf;

use stiletto::{
    Diagnostic, DiagnosticKind, DiagnosticLog, DirFiler, Filer, GeneratedFile, Markers,
    MemoryFiler, ProcessingEnv, Processor, RoundEnvironment,
};
use tracing::debug;

use crate::SymbolUniverse;

/// Destination of generated sources.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    Directory(PathBuf),
    /// Sources are rendered but discarded.
    Memory,
}

/// Outcome of every round of one input.
#[derive(Clone, Debug, Default)]
pub struct RoundReport {
    pub files: Vec<GeneratedFile>,
    pub diagnostics: Vec<Diagnostic>,
}

impl RoundReport {
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|v| v.kind == DiagnosticKind::Error)
            .count()
    }
}

/// Keeps track of the files accepted by the wrapped filer.
struct RecordingFiler<'a> {
    inner: &'a dyn Filer,
    written: RefCell<Vec<GeneratedFile>>,
}

impl Filer for RecordingFiler<'_> {
    fn write_source(&self, file: &GeneratedFile) -> std::io::Result<()> {
        self.inner.write_source(file)?;
        self.written.borrow_mut().push(file.clone());
        Ok(())
    }

    fn is_created(&self, qualified_name: &str) -> bool {
        self.inner.is_created(qualified_name)
    }
}

/// Runs every round of `universe`, followed by the final empty round.
pub fn run_rounds(universe: &SymbolUniverse, markers: &Markers, output: &Output) -> RoundReport {
    let memory;
    let directory;
    let inner: &dyn Filer = match output {
        Output::Directory(root) => {
            directory = DirFiler::new(root);
            &directory
        }
        Output::Memory => {
            memory = MemoryFiler::new();
            &memory
        }
    };
    let filer = RecordingFiler {
        inner,
        written: RefCell::new(Vec::new()),
    };
    let symbols = universe.symbol_table();
    let log = DiagnosticLog::new();
    let env = ProcessingEnv::new(&symbols, &log, &filer).with_markers(markers.clone());
    let mut processor = Processor::new(env);
    let rounds = universe.round_environments();
    for (idx, round) in rounds.iter().enumerate() {
        debug!(round = idx, roots = round.root_elements().len(), "Starting round");
        processor.process(round);
    }
    processor.process(&RoundEnvironment::last());
    drop(processor);
    RoundReport {
        files: filer.written.into_inner(),
        diagnostics: log.diagnostics(),
    }
}
