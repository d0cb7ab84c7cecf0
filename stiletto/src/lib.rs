//! # stiletto
//!
//! A compile-time generator of dependency-injection provider modules.
//!
//! Declarations carrying the `@Stiletto.Module` marker describe the values a
//! module provides. Each marked method is classified into one of three
//! provisioning strategies, validated against the host's symbol model and
//! emitted as a `@dagger.Module` class with a nested `Builder`.
//!
//! ## Core Concepts
//!
//! - **SymbolModel**: The host's view of declarations and the subtype relation
//! - **Inspector**: Queries over the symbol model used by every other component
//! - **ProvisionDescriptor**: A validated provision, one variant per strategy
//! - **ModulePlan**: All provisions of one container, ready to be emitted
//! - **Processor**: The round driver invoked by the host toolchain
//!
//! ## Strategies
//!
//! - `@ProvidedBy.Runtime`: the value is passed to the module's builder
//! - `@ProvidedBy.Injection(Impl.class)`: the implementation is injected as a
//!   provider parameter
//! - `@ProvidedBy.NewInstance`: the module calls the implementation's only
//!   accessible constructor
//!
//! ## Basic Usage
//!
//! ```rust
//! use stiletto::{
//!     AnnotationMirror, DiagnosticLog, ExecutableElement, MemoryFiler, ProcessingEnv,
//!     Processor, RoundEnvironment, SymbolTable, TypeElement,
//! };
//!
//! let symbols = SymbolTable::new()
//!     .with(TypeElement::interface("app.BookLoader"))
//!     .with(
//!         TypeElement::class("app.LocalBookLoader")
//!             .implementing("app.BookLoader")
//!             .member(ExecutableElement::constructor()),
//!     )
//!     .with(
//!         TypeElement::interface("app.AppComponent")
//!             .annotated(AnnotationMirror::new("stiletto.Stiletto.Module"))
//!             .member(
//!                 ExecutableElement::method("loader", "app.BookLoader").annotated(
//!                     AnnotationMirror::new("stiletto.ProvidedBy.NewInstance").value(
//!                         "value",
//!                         stiletto::AnnotationValue::Type("app.LocalBookLoader".into()),
//!                     ),
//!                 ),
//!             ),
//!     );
//!
//! let log = DiagnosticLog::new();
//! let filer = MemoryFiler::new();
//! let mut processor = Processor::new(ProcessingEnv::new(&symbols, &log, &filer));
//! assert!(processor.process(&RoundEnvironment::new(["app.AppComponent"])));
//!
//! let source = filer.get("app.AppModule").unwrap();
//! assert!(source.contains("return new LocalBookLoader()"));
//! assert!(!log.has_errors());
//! ```

mod codegen;
mod env;
mod error;
mod inspect;
mod markers;
mod module;
mod provision;
mod round;
mod symbol;

pub use codegen::*;
pub use env::*;
pub use error::*;
pub use inspect::*;
pub use markers::*;
pub use module::*;
pub use provision::*;
pub use round::*;
pub use symbol::*;
