//! # Configurator Adapters
//!
//! Ready-made providers for the configurator engine:
//! - [`FileProvider`]: YAML, TOML, JSON and HCL files, or any format with a
//!   caller-supplied decoder
//! - [`EnvProvider`]: `<APP>_<KEY>` environment variables
//! - [`FlagProvider`]: clap command line flags
//!
//! Each provider wraps a caller type that describes the source's shape and
//! implements [`configurator::ConfigImplementer`] to validate and merge it.
//! [`diagnostics_from_validation`] lets that type lean on `validator`
//! derives instead of hand-written checks.
//!
//! ```rust,no_run
//! use adapters::FileProvider;
//! use configurator::{ConfigImplementer, Configurator, ResolutionContext};
//!
//! #[derive(Debug, Default)]
//! struct Domain {
//!     port: u16,
//! }
//!
//! #[derive(Default, serde::Serialize, serde::Deserialize)]
//! #[serde(default)]
//! struct FileConfig {
//!     port: Option<u16>,
//! }
//!
//! impl ConfigImplementer<Domain> for FileConfig {
//!     fn merge(&self, mut domain: Domain) -> Domain {
//!         if let Some(port) = self.port {
//!             domain.port = port;
//!         }
//!         domain
//!     }
//! }
//!
//! let resolution = Configurator::new("demo", Domain { port: 9090 })
//!     .file(FileProvider::<FileConfig>::yaml())
//!     .file(FileProvider::<FileConfig>::toml())
//!     .resolve(ResolutionContext::from_process());
//! println!("{:?}", resolution.domain());
//! ```

pub mod env;
pub mod file;
pub mod flag;
pub mod validation;

pub use env::{EnvImplementer, EnvProvider, EnvVars};
pub use file::{Decoder, FileProvider};
pub use flag::{FlagImplementer, FlagProvider};
pub use validation::{diagnostics_from_validation, validate_fields};
