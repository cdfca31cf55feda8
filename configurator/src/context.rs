//! # Resolution Context
//!
//! The slice of process state a resolution pass reads: the argument list,
//! a snapshot of the environment, the working directory and the platform's
//! configuration roots.
//!
//! Passing this explicitly keeps resolution testable: tests build a context
//! in memory and never touch the real process environment.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Process view consumed by [`crate::Configurator::resolve`].
#[derive(Debug, Clone, Default)]
pub struct ResolutionContext {
    args: Vec<String>,
    env: BTreeMap<String, String>,
    cwd: Option<PathBuf>,
    home_dir: Option<PathBuf>,
    user_config_dir: Option<PathBuf>,
    system_config_dir: Option<PathBuf>,
}

impl ResolutionContext {
    /// An empty context: no arguments, no variables, no known directories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the current process.
    ///
    /// # M-CANONICAL-DOCS
    ///
    /// ## Purpose
    /// Snapshots `std::env::args_os`, `std::env::vars_os`, the working
    /// directory, the home and user configuration directories and the
    /// system configuration root (`/etc` on Unix). Nothing else in the
    /// engine reads process globals.
    ///
    /// ## Usage
    /// ```rust,no_run
    /// use configurator::ResolutionContext;
    ///
    /// let ctx = ResolutionContext::from_process();
    /// println!("{} argument(s), cwd {:?}", ctx.args().len(), ctx.cwd());
    /// ```
    ///
    /// ## Error Handling
    /// Never fails. Non UTF-8 arguments are converted lossily, non UTF-8
    /// environment variables are skipped, and directories that cannot be
    /// determined are left as `None`.
    pub fn from_process() -> Self {
        Self {
            args: std::env::args_os().map(lossy).collect(),
            env: std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
            cwd: std::env::current_dir().ok(),
            home_dir: dirs::home_dir(),
            user_config_dir: dirs::config_dir(),
            system_config_dir: default_system_config_dir(),
        }
    }

    /// Replaces the argument list. The first element is the program name.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_home_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.home_dir = Some(dir.into());
        self
    }

    pub fn with_user_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_config_dir = Some(dir.into());
        self
    }

    /// Overrides the system-wide configuration root (`/etc` on Unix).
    /// `None` removes it, as on platforms that have no such root.
    pub fn with_system_config_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.system_config_dir = dir;
        self
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub(crate) fn set_args(&mut self, args: Vec<String>) {
        self.args = args;
    }

    pub fn var(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn home_dir(&self) -> Option<&Path> {
        self.home_dir.as_deref()
    }

    pub fn user_config_dir(&self) -> Option<&Path> {
        self.user_config_dir.as_deref()
    }

    pub fn system_config_dir(&self) -> Option<&Path> {
        self.system_config_dir.as_deref()
    }
}

fn lossy(arg: OsString) -> String {
    arg.to_string_lossy().into_owned()
}

fn default_system_config_dir() -> Option<PathBuf> {
    if cfg!(unix) {
        Some(PathBuf::from("/etc"))
    } else {
        None
    }
}
