//! Round driver.
//!
//! The host toolchain calls [`Processor::process`] once per round. A round
//! discovers every container carrying the module marker, plans and renders all
//! of their modules, and only then hands the sources to the output channel.
//! The first failure abandons the round and is reported as one error.

use std::collections::HashSet;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{debug, error, info};

use crate::env::already_created;
use crate::error::ResultExt;
use crate::{AnnotatedContainer, Error, GeneratedFile, ModulePlan, ProcessingEnv, Result};

/// Trace frames starting with this prefix belong to the driver itself and are
/// dropped from reported failures.
pub const ROUND_FRAME: &str = "stiletto::round";

/// Declarations handed to one round.
#[derive(Clone, Debug, Default)]
pub struct RoundEnvironment {
    root_elements: Vec<String>,
    processing_over: bool,
}

impl RoundEnvironment {
    pub fn new<I, S>(root_elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            root_elements: root_elements.into_iter().map(Into::into).collect(),
            processing_over: false,
        }
    }

    /// The final, empty round announced once no more sources are generated.
    pub fn last() -> Self {
        Self {
            root_elements: Vec::new(),
            processing_over: true,
        }
    }

    pub fn root_elements(&self) -> &[String] {
        &self.root_elements
    }

    pub fn processing_over(&self) -> bool {
        self.processing_over
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessorState {
    Idle,
    Processing,
}

/// The generator as seen by the host toolchain.
pub struct Processor<'a> {
    env: ProcessingEnv<'a>,
    state: ProcessorState,
}

impl<'a> Processor<'a> {
    pub fn new(env: ProcessingEnv<'a>) -> Self {
        Self {
            env,
            state: ProcessorState::Idle,
        }
    }

    pub fn env(&self) -> &ProcessingEnv<'a> {
        &self.env
    }

    pub fn state(&self) -> ProcessorState {
        self.state
    }

    /// Annotation types the processor claims.
    pub fn supported_annotation_types(&self) -> Vec<String> {
        vec![self.env.markers().module.clone()]
    }

    /// Runs one round.
    ///
    /// Always returns `true`: failures surface as error diagnostics instead.
    pub fn process(&mut self, round: &RoundEnvironment) -> bool {
        self.state = ProcessorState::Processing;
        let result = catch_unwind(AssertUnwindSafe(|| self.generate(round)));
        match result {
            Ok(Ok(files)) => {
                debug!(files = files.len(), "Round completed");
            }
            Ok(Err(err)) => self.report(&err),
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|v| v.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".into());
                self.report(&Error::internal(message));
            }
        }
        self.state = ProcessorState::Idle;
        true
    }

    /// Plans, renders and writes every module of `round`.
    ///
    /// Nothing is written unless every module of the round rendered and the
    /// filer accepts all of them.
    pub fn generate(&self, round: &RoundEnvironment) -> Result<Vec<GeneratedFile>> {
        let files = self
            .render(round)
            .context(|| format!("{ROUND_FRAME}::Processor::generate"))?;
        self.check_writable(&files)
            .context(|| format!("{ROUND_FRAME}::Processor::generate"))?;
        for file in &files {
            let name = &file.qualified_name;
            self.env
                .filer()
                .write_source(file)
                .context(|| format!("stiletto::env::Filer::write_source({name})"))
                .context(|| format!("{ROUND_FRAME}::Processor::generate"))?;
            info!(module = %file.qualified_name, "Generated module");
        }
        Ok(files)
    }

    /// Fails if any of `files` was created before or appears twice.
    fn check_writable(&self, files: &[GeneratedFile]) -> Result<()> {
        let mut names = HashSet::new();
        for file in files {
            let name = &file.qualified_name;
            if self.env.filer().is_created(name) || !names.insert(name.as_str()) {
                return Err(Error::from(already_created(name))
                    .context(format!("stiletto::env::Filer::write_source({name})")));
            }
        }
        Ok(())
    }

    fn render(&self, round: &RoundEnvironment) -> Result<Vec<GeneratedFile>> {
        let mut files = Vec::new();
        for container in self.discover(round)? {
            let name = container.qualified_name();
            let plan = ModulePlan::new(&self.env, container)
                .context(|| format!("stiletto::module::ModulePlan::new({name})"))?;
            files.push(GeneratedFile::from(&plan.generate(self.env.markers())));
        }
        Ok(files)
    }

    fn discover(&self, round: &RoundEnvironment) -> Result<Vec<AnnotatedContainer<'a>>> {
        let markers = self.env.markers();
        let symbols = self.env.symbols();
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for name in round.root_elements() {
            let element = symbols
                .type_element(name)
                .ok_or_else(|| Error::unknown_type(name.as_str()))
                .context(|| format!("{ROUND_FRAME}::Processor::discover"))?;
            if !element.has_annotation(&markers.module) {
                continue;
            }
            if seen.insert(element.name.erasure()) {
                out.push(AnnotatedContainer::new(markers, element));
            }
        }
        debug!(
            roots = round.root_elements().len(),
            containers = out.len(),
            "Discovered containers"
        );
        Ok(out)
    }

    fn report(&self, err: &Error) {
        if err.is_validation() {
            error!(element = err.element().unwrap_or_default(), "{err}");
            self.env.error(&err.to_string(), err.element());
        } else {
            let message = format_failure(err);
            error!("{message}");
            self.env.error(&message, None);
        }
    }
}

/// Renders an error with its trace, cut before the driver's own frames.
pub fn format_failure(err: &Error) -> String {
    let mut out = err.to_string();
    for frame in err
        .trace()
        .iter()
        .take_while(|v| !v.starts_with(ROUND_FRAME))
    {
        out.push_str("\n\tat ");
        out.push_str(frame);
    }
    out
}
