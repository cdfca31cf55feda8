//! # Environment Variable Provider
//!
//! Binds `<PREFIX>_<KEY>` variables onto a caller type, where the prefix is
//! derived from the application name (`my-app` reads `MY_APP_*`).
//!
//! Variables come from the [`ResolutionContext`], never from the live
//! process environment, so tests can supply them in memory.

use configurator::{
    ConfigImplementer, ConfigSource, Diagnostics, Provenance, ResolutionContext, Session,
};
use errors::ProviderError;
use serde::Serialize;
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

/// The domain half of an environment source: reads variables through
/// [`EnvVars`] into `self`.
pub trait EnvImplementer<D>: ConfigImplementer<D> {
    fn bind(&mut self, vars: &EnvVars<'_>) -> Result<(), ProviderError>;
}

/// Prefixed view over the context's environment.
#[derive(Debug, Clone)]
pub struct EnvVars<'a> {
    prefix: String,
    context: &'a ResolutionContext,
}

impl<'a> EnvVars<'a> {
    pub fn new(prefix: impl Into<String>, context: &'a ResolutionContext) -> Self {
        Self {
            prefix: prefix.into(),
            context,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Full variable name for `key`, e.g. `port` under `DEMO` is `DEMO_PORT`.
    pub fn name(&self, key: &str) -> String {
        format!("{}_{}", self.prefix, key.to_ascii_uppercase())
    }

    /// Raw value of `key`. Variables set to an empty string count as unset.
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.context
            .var(&self.name(key))
            .filter(|value| !value.is_empty())
    }

    /// Parses `key` into `V`. Unset yields `Ok(None)`; a value that does not
    /// parse is an error naming the variable.
    pub fn parse<V>(&self, key: &str) -> Result<Option<V>, ProviderError>
    where
        V: FromStr,
        V::Err: Display,
    {
        let Some(raw) = self.get(key) else {
            return Ok(None);
        };
        raw.trim()
            .parse::<V>()
            .map(Some)
            .map_err(|e| ProviderError::Env {
                variable: self.name(key),
                reason: format!("{e} (got {raw:?})"),
            })
    }
}

/// Environment source wrapping an implementer `T`, which is reset to
/// `T::default()` before every parse.
#[derive(Debug, Default)]
pub struct EnvProvider<T> {
    parsed: T,
}

impl<T: Default> EnvProvider<T> {
    pub fn new() -> Self {
        Self {
            parsed: T::default(),
        }
    }

    pub fn parsed(&self) -> &T {
        &self.parsed
    }
}

impl<D, T> ConfigSource<D> for EnvProvider<T>
where
    T: EnvImplementer<D> + Serialize + Default,
{
    fn parse(&mut self, session: &Session<'_>) -> Result<String, ProviderError> {
        self.parsed = T::default();

        let vars = EnvVars::new(session.env_prefix(), session.context());
        let label = format!("{}_", vars.prefix());

        if let Err(err) = self.parsed.bind(&vars) {
            self.parsed = T::default();
            return Err(err);
        }

        debug!(prefix = %vars.prefix(), "bound environment variables");
        Ok(label)
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
