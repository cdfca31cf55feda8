//! # Configurator
//!
//! Layered configuration resolution for command line applications.
//!
//! A caller supplies a domain object holding defaults plus up to three kinds
//! of source providers, and the engine folds every source onto that object
//! in ascending precedence:
//!
//! - Global config file (system-wide and per-user OS config directories)
//! - Local config file (`~/<app>` and the working directory)
//! - Environment variables
//! - Command line flags
//!
//! A reserved flag (`-config <path>`) replaces the first three with a single
//! explicitly named file.
//!
//! Resolution never fails. Everything noteworthy, from "searched this
//! directory" to "this file does not decode", is recorded as a
//! [`Diagnostic`] tagged with its severity and the source it came from, and
//! the caller decides what to do with the ledger.
//!
//! Concrete providers for YAML/TOML/JSON files, environment variables and
//! clap flags live in the `adapters` crate.

pub mod context;
pub mod diag;
pub mod engine;
pub mod flags;
pub mod ledger;
pub mod paths;
pub mod source;

pub use context::ResolutionContext;
pub use diag::{Diagnostic, DiagnosticBuilder, Diagnostics, Provenance, Severity};
pub use engine::{Configurator, DEFAULT_FILE_FLAG, DEFAULT_FILE_NAME, Resolution};
pub use errors::ProviderError;
pub use flags::FlagSet;
pub use ledger::{ParsedValue, ParsedValues};
pub use paths::SearchPaths;
pub use source::{ConfigImplementer, ConfigSource, FileSource, FlagSource, Session, env_prefix};
