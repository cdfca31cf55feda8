//! # Configurator Errors
//!
//! Typed failures raised by configuration source providers.
//!
//! The resolution engine never propagates these to its caller. Every
//! `ProviderError` is folded into the diagnostics ledger as an Error entry,
//! labeled with [`ProviderError::label`], and the failing source simply
//! contributes nothing for that pass.

use thiserror::Error;

/// Label used for diagnostics raised while parsing command line arguments.
pub const ARGS_LABEL: &str = "args";

/// Failure of a provider's parse step.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {path} as {format}: {reason}")]
    Decode {
        path: String,
        format: String,
        reason: String,
    },

    #[error("Invalid value for environment variable {variable}: {reason}")]
    Env { variable: String, reason: String },

    #[error("Unable to parse command line flags: {reason}")]
    Flag { reason: String },

    #[error("Unable to bind {label}: {reason}")]
    Bind { label: String, reason: String },
}

impl ProviderError {
    /// The file path, variable name or argument label the failure refers to.
    pub fn label(&self) -> &str {
        match self {
            Self::Read { path, .. } | Self::Decode { path, .. } => path,
            Self::Env { variable, .. } => variable,
            Self::Flag { .. } => ARGS_LABEL,
            Self::Bind { label, .. } => label,
        }
    }
}
