//! # Command Line Flag Provider
//!
//! Registers clap arguments with the session's [`FlagSet`] and binds the
//! parsed matches onto a caller type.

use clap::ArgMatches;
use configurator::{
    ConfigImplementer, ConfigSource, Diagnostics, FlagSet, FlagSource, Provenance, Session,
};
use errors::{ARGS_LABEL, ProviderError};
use serde::Serialize;
use tracing::debug;

/// The domain half of a flag source.
pub trait FlagImplementer<D>: ConfigImplementer<D> {
    /// Adds this implementer's arguments to `flags`.
    fn register(&self, flags: &mut FlagSet);

    /// Reads the matched values into `self`.
    fn bind(&mut self, matches: &ArgMatches) -> Result<(), ProviderError>;
}

/// Flag source wrapping an implementer `T`, which is reset to
/// `T::default()` before every parse.
#[derive(Debug, Default)]
pub struct FlagProvider<T> {
    parsed: T,
}

impl<T: Default> FlagProvider<T> {
    pub fn new() -> Self {
        Self {
            parsed: T::default(),
        }
    }

    pub fn parsed(&self) -> &T {
        &self.parsed
    }
}

impl<D, T> ConfigSource<D> for FlagProvider<T>
where
    T: FlagImplementer<D> + Serialize + Default,
{
    fn parse(&mut self, session: &Session<'_>) -> Result<String, ProviderError> {
        self.parsed = T::default();

        let matches = session
            .flags()
            .parse(session.args())
            .map_err(|e| ProviderError::Flag {
                reason: first_line(&e.render().to_string()),
            })?;

        if let Err(err) = self.parsed.bind(&matches) {
            self.parsed = T::default();
            return Err(err);
        }

        debug!(args = session.args().len(), "bound command line flags");
        Ok(ARGS_LABEL.to_string())
    }

    fn validate(&mut self, provenance: Provenance) -> Diagnostics {
        self.parsed.validate(provenance)
    }

    fn merge(&self, domain: D) -> D {
        self.parsed.merge(domain)
    }

    fn values(&self) -> serde_json::Value {
        serde_json::to_value(&self.parsed).unwrap_or_default()
    }
}

impl<D, T> FlagSource<D> for FlagProvider<T>
where
    T: FlagImplementer<D> + Serialize + Default,
{
    fn init(&mut self, flags: &mut FlagSet) {
        self.parsed.register(flags);
    }
}

/// clap renders usage and hints after the message itself.
fn first_line(rendered: &str) -> String {
    let line = rendered
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or_default()
        .trim();
    line.strip_prefix("error: ").unwrap_or(line).to_string()
}
