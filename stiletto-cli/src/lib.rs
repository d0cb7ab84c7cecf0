//! # stiletto-cli
//!
//! Drives the [`stiletto`] generator outside of a host compiler.
//!
//! Declarations are read from JSON files describing a symbol universe and the
//! root elements of each round. Generated modules are written below an output
//! directory, one directory per package.
//!
//! ## Usage
//!
//! ```text
//! stiletto [--config FILE] [-o FILE]... generate --input app.json --output build/generated
//! stiletto check --input app.json
//! stiletto config
//! ```
//!
//! ## Configuration Example
//!
//! ```rust
//! use stiletto_cli::{Config, OutputConfig};
//!
//! let mut config = Config::parse(r#"{"output": {"directory": "out"}}"#).unwrap();
//! config
//!     .merge_from(Config::parse(r#"{"markers": {"nullable": ["CheckForNull"]}}"#).unwrap())
//!     .unwrap();
//!
//! let output: OutputConfig = config.section().unwrap();
//! assert_eq!(output.directory.unwrap().to_str(), Some("out"));
//! let markers: stiletto::Markers = config.section().unwrap();
//! assert_eq!(markers.nullable, ["CheckForNull"]);
//! assert_eq!(markers.runtime, "stiletto.ProvidedBy.Runtime");
//! ```

mod command;
mod config;
mod input;
mod run;
mod tracing;

pub use command::*;
pub use config::*;
pub use input::*;
pub use run::*;
pub use tracing::*;

pub use async_trait::async_trait;

pub type StdError = Box<dyn std::error::Error + Send + Sync>;
