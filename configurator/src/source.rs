//! # Source Provider Contract
//!
//! Every configuration source (file, environment, flags) is driven through
//! the same lifecycle by the engine:
//!
//! 1. `locate` (file sources only) decides whether the source exists in a
//!    candidate directory,
//! 2. `parse` reads and decodes it,
//! 3. `validate` reports domain problems and may reset unusable values,
//! 4. `merge` binds the parsed values onto the caller's domain object.
//!
//! The domain-specific half of that lifecycle (validate + merge) is split
//! out as [`ConfigImplementer`], so a provider is typically a generic
//! wrapper that owns the reading and decoding and delegates the rest to the
//! caller's implementer.

use crate::context::ResolutionContext;
use crate::diag::{Diagnostics, Provenance};
use crate::flags::FlagSet;
use errors::ProviderError;
use std::path::Path;

/// Read-only view of the running session handed to providers.
#[derive(Debug, Clone, Copy)]
pub struct Session<'a> {
    app_name: &'a str,
    file_name: &'a str,
    context: &'a ResolutionContext,
    flags: &'a FlagSet,
}

impl<'a> Session<'a> {
    pub fn new(
        app_name: &'a str,
        file_name: &'a str,
        context: &'a ResolutionContext,
        flags: &'a FlagSet,
    ) -> Self {
        Self {
            app_name,
            file_name,
            context,
            flags,
        }
    }

    pub fn app_name(&self) -> &'a str {
        self.app_name
    }

    /// Base name of the config files to search for, without extension.
    pub fn file_name(&self) -> &'a str {
        self.file_name
    }

    pub fn context(&self) -> &'a ResolutionContext {
        self.context
    }

    pub fn flags(&self) -> &'a FlagSet {
        self.flags
    }

    /// Arguments left after the reserved file flag was stripped.
    pub fn args(&self) -> &'a [String] {
        self.context.args()
    }

    /// Environment variable prefix derived from the application name.
    pub fn env_prefix(&self) -> String {
        env_prefix(self.app_name)
    }
}

/// Upper-cases `app_name` and replaces every non-alphanumeric character
/// with `_`, e.g. `"my-app"` becomes `"MY_APP"`.
pub fn env_prefix(app_name: &str) -> String {
    app_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// The caller-supplied, domain-specific half of a provider.
pub trait ConfigImplementer<D> {
    /// Inspects freshly parsed values. Implementations may reset a value to
    /// its zero value so that it does not reach `merge`.
    fn validate(&mut self, provenance: Provenance) -> Diagnostics {
        let _ = provenance;
        Diagnostics::new()
    }

    /// Binds parsed values onto `domain`. Absent or zero values must leave
    /// the corresponding domain field untouched.
    fn merge(&self, domain: D) -> D;
}

/// The lifecycle every configuration source obeys.
pub trait ConfigSource<D> {
    /// Reads and decodes the source, returning the resolved path or label.
    ///
    /// An error ends this source's contribution for the pass; the engine
    /// records it and moves on.
    fn parse(&mut self, session: &Session<'_>) -> Result<String, ProviderError>;

    fn validate(&mut self, provenance: Provenance) -> Diagnostics;

    fn merge(&self, domain: D) -> D;

    /// Snapshot of the currently parsed values, for the parsed-value ledger.
    fn values(&self) -> serde_json::Value;
}

/// A source backed by a file on disk.
pub trait FileSource<D>: ConfigSource<D> {
    /// File extensions this source understands, without the leading dot.
    fn extensions(&self) -> &[String];

    /// Fixes the file the next `parse` reads.
    fn select(&mut self, path: &Path);

    /// Whether `path` carries one of [`FileSource::extensions`].
    fn accepts(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.extensions()
            .iter()
            .any(|known| known.eq_ignore_ascii_case(ext))
    }

    /// Looks for `<file_name>.<ext>` under `dir` for each known extension
    /// and selects the first one found.
    fn locate(
        &mut self,
        diags: &mut Diagnostics,
        provenance: Provenance,
        session: &Session<'_>,
        dir: &Path,
    ) -> bool {
        let dir_label = dir.display().to_string();
        let found = self
            .extensions()
            .iter()
            .map(|ext| dir.join(format!("{}.{ext}", session.file_name())))
            .find(|candidate| candidate.is_file());

        match found {
            Some(path) => {
                diags.record(provenance, dir_label).trace(
                    "Config File Found",
                    format!("Will attempt to parse {}", path.display()),
                );
                self.select(&path);
                true
            }
            None => {
                diags.record(provenance, dir_label.clone()).trace(
                    "Config File Not Found",
                    format!(
                        "Unable to find config file for extensions {{{}}} at {dir_label}",
                        self.extensions().join(", ")
                    ),
                );
                false
            }
        }
    }
}

/// A source backed by command line flags.
pub trait FlagSource<D>: ConfigSource<D> {
    /// Registers this source's flags. Called once per pass, before `parse`.
    fn init(&mut self, flags: &mut FlagSet);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Probe {
        extensions: Vec<String>,
        selected: Option<PathBuf>,
    }

    impl ConfigSource<u16> for Probe {
        fn parse(&mut self, _session: &Session<'_>) -> Result<String, ProviderError> {
            Ok(String::new())
        }

        fn validate(&mut self, _provenance: Provenance) -> Diagnostics {
            Diagnostics::new()
        }

        fn merge(&self, domain: u16) -> u16 {
            domain
        }

        fn values(&self) -> serde_json::Value {
            serde_json::Value::Null
        }
    }

    impl FileSource<u16> for Probe {
        fn extensions(&self) -> &[String] {
            &self.extensions
        }

        fn select(&mut self, path: &Path) {
            self.selected = Some(path.to_path_buf());
        }
    }

    fn probe(exts: &[&str]) -> Probe {
        Probe {
            extensions: exts.iter().map(|e| (*e).to_string()).collect(),
            selected: None,
        }
    }

    #[test]
    fn test_env_prefix() {
        assert_eq!(env_prefix("demo"), "DEMO");
        assert_eq!(env_prefix("my-app.v2"), "MY_APP_V2");
        assert_eq!(env_prefix("ExampleApp"), "EXAMPLEAPP");
    }

    #[test]
    fn test_accepts_is_case_insensitive() {
        let yaml = probe(&["yaml", "yml"]);
        assert!(yaml.accepts(Path::new("/tmp/config.YML")));
        assert!(yaml.accepts(Path::new("config.yaml")));
        assert!(!yaml.accepts(Path::new("config.toml")));
        assert!(!yaml.accepts(Path::new("config")));
    }

    #[test]
    fn test_locate_selects_first_existing_extension() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.yml"), "port: 1").unwrap();

        let ctx = ResolutionContext::new();
        let flags = FlagSet::new("demo");
        let session = Session::new("demo", "config", &ctx, &flags);
        let mut diags = Diagnostics::new();
        let mut yaml = probe(&["yaml", "yml"]);

        assert!(yaml.locate(&mut diags, Provenance::LocalFile, &session, dir.path()));
        assert_eq!(yaml.selected, Some(dir.path().join("config.yml")));

        let traces = diags.traces();
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0].summary, "Config File Found");
        assert_eq!(traces[0].provenance, Some(Provenance::LocalFile));
    }

    #[test]
    fn test_locate_missing_file_records_trace_only() {
        let dir = TempDir::new().unwrap();

        let ctx = ResolutionContext::new();
        let flags = FlagSet::new("demo");
        let session = Session::new("demo", "config", &ctx, &flags);
        let mut diags = Diagnostics::new();
        let mut toml = probe(&["toml"]);

        assert!(!toml.locate(&mut diags, Provenance::GlobalFile, &session, dir.path()));
        assert!(toml.selected.is_none());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.traces()[0].summary, "Config File Not Found");
        assert!(diags.traces()[0].detail.contains("{toml}"));
        assert!(!diags.has_error());
    }

    #[test]
    fn test_locate_ignores_directories_named_like_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("config.json")).unwrap();

        let ctx = ResolutionContext::new();
        let flags = FlagSet::new("demo");
        let session = Session::new("demo", "config", &ctx, &flags);
        let mut diags = Diagnostics::new();
        let mut json = probe(&["json"]);

        assert!(!json.locate(&mut diags, Provenance::LocalFile, &session, dir.path()));
    }
}
