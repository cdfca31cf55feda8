//! # File Provider
//!
//! Reads a config file from disk and decodes it into a caller type.
//!
//! Formats are picked by file extension:
//! - `.yaml` / `.yml`: YAML
//! - `.toml`: TOML
//! - `.json`: JSON
//! - `.hcl`: HCL
//! - anything else: a caller-supplied decoder via [`FileProvider::custom`]

use configurator::{ConfigImplementer, ConfigSource, Diagnostics, FileSource, Provenance, Session};
use errors::ProviderError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Turns the raw file contents into `T`, or explains why it cannot.
pub type Decoder<T> = fn(&str) -> Result<T, String>;

/// A file-backed source wrapping a caller implementer `T`.
///
/// `T` is the shape of the file. It is reset to `T::default()` before every
/// parse, so an empty file contributes nothing.
pub struct FileProvider<T> {
    format: String,
    extensions: Vec<String>,
    decoder: Decoder<T>,
    path: Option<PathBuf>,
    parsed: T,
}

impl<T> FileProvider<T>
where
    T: DeserializeOwned + Default,
{
    /// YAML file provider.
    ///
    /// # M-CANONICAL-DOCS
    ///
    /// ## Purpose
    /// Decodes `.yaml` and `.yml` files into `T`. Keys missing from the file keep
    /// `T`'s defaults, so `T` usually carries `#[serde(default)]`.
    ///
    /// ## Usage
    /// ```rust,no_run
    /// use adapters::FileProvider;
    ///
    /// #[derive(Default, serde::Deserialize)]
    /// #[serde(default)]
    /// struct Server {
    ///     port: Option<u16>,
    /// }
    ///
    /// let provider = FileProvider::<Server>::yaml();
    /// assert_eq!(provider.format(), "YAML");
    /// ```
    ///
    /// ## Error Handling
    /// `parse` returns `ProviderError::Read` when the file cannot be read and
    /// `ProviderError::Decode` for invalid YAML syntax or values that do not fit `T`.
    pub fn yaml() -> Self {
        Self::custom("YAML", &["yaml", "yml"], decode_yaml::<T>)
    }

    /// TOML file provider.
    ///
    /// # M-CANONICAL-DOCS
    ///
    /// ## Purpose
    /// Decodes `.toml` files into `T`. Keys missing from the file keep
    /// `T`'s defaults, so `T` usually carries `#[serde(default)]`.
    ///
    /// ## Usage
    /// ```rust,no_run
    /// use adapters::FileProvider;
    ///
    /// #[derive(Default, serde::Deserialize)]
    /// #[serde(default)]
    /// struct Server {
    ///     port: Option<u16>,
    /// }
    ///
    /// let provider = FileProvider::<Server>::toml();
    /// assert_eq!(provider.format(), "TOML");
    /// ```
    ///
    /// ## Error Handling
    /// `parse` returns `ProviderError::Read` when the file cannot be read and
    /// `ProviderError::Decode` for invalid TOML syntax or values that do not fit `T`.
    pub fn toml() -> Self {
        Self::custom("TOML", &["toml"], decode_toml::<T>)
    }

    /// JSON file provider for `.json` files. Same contract as
    /// [`FileProvider::yaml`].
    pub fn json() -> Self {
        Self::custom("JSON", &["json"], decode_json::<T>)
    }

    /// HCL file provider.
    ///
    /// # M-CANONICAL-DOCS
    ///
    /// ## Purpose
    /// Decodes `.hcl` files into `T`. Keys missing from the file keep
    /// `T`'s defaults, so `T` usually carries `#[serde(default)]`.
    /// Top-level attributes map to fields; an unlabelled block such as
    /// `myapp { port = 8080 }` maps to a nested struct.
    ///
    /// ## Usage
    /// ```rust,no_run
    /// use adapters::FileProvider;
    ///
    /// #[derive(Default, serde::Deserialize)]
    /// #[serde(default)]
    /// struct Server {
    ///     port: Option<u16>,
    /// }
    ///
    /// let provider = FileProvider::<Server>::hcl();
    /// assert_eq!(provider.format(), "HCL");
    /// ```
    ///
    /// ## Error Handling
    /// `parse` returns `ProviderError::Read` when the file cannot be read and
    /// `ProviderError::Decode` for invalid HCL syntax or values that do not fit `T`.
    pub fn hcl() -> Self {
        Self::custom("HCL", &["hcl"], decode_hcl::<T>)
    }
}

impl<T: Default> FileProvider<T> {
    /// A provider for any other format. `format` names it in diagnostics;
    /// `extensions` are given without the leading dot.
    ///
    /// ```rust
    /// use adapters::FileProvider;
    ///
    /// #[derive(Default, serde::Serialize)]
    /// struct Pairs(Vec<(String, String)>);
    ///
    /// fn decode(raw: &str) -> Result<Pairs, String> {
    ///     raw.lines()
    ///         .filter(|l| !l.trim().is_empty())
    ///         .map(|l| {
    ///             l.split_once('=')
    ///                 .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
    ///                 .ok_or_else(|| format!("expected key=value, got {l:?}"))
    ///         })
    ///         .collect::<Result<_, _>>()
    ///         .map(Pairs)
    /// }
    ///
    /// let provider = FileProvider::<Pairs>::custom("Properties", &["properties"], decode);
    /// assert_eq!(provider.format(), "Properties");
    /// ```
    pub fn custom(format: impl Into<String>, extensions: &[&str], decoder: Decoder<T>) -> Self {
        Self {
            format: format.into(),
            extensions: extensions.iter().map(|e| (*e).to_string()).collect(),
            decoder,
            path: None,
            parsed: T::default(),
        }
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// The file picked by the last `locate` or `select`.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Values decoded by the last successful parse.
    pub fn parsed(&self) -> &T {
        &self.parsed
    }
}

impl<D, T> ConfigSource<D> for FileProvider<T>
where
    T: ConfigImplementer<D> + Serialize + Default,
{
    fn parse(&mut self, _session: &Session<'_>) -> Result<String, ProviderError> {
        self.parsed = T::default();

        let Some(path) = self.path.as_deref() else {
            return Err(ProviderError::Bind {
                label: self.format.clone(),
                reason: "no config file was selected".to_string(),
            });
        };
        let label = path.display().to_string();

        let contents = std::fs::read_to_string(path).map_err(|source| ProviderError::Read {
            path: label.clone(),
            source,
        })?;

        if contents.trim().is_empty() {
            debug!(path = %label, "config file is empty");
            return Ok(label);
        }

        self.parsed = (self.decoder)(&contents).map_err(|reason| ProviderError::Decode {
            path: label.clone(),
            format: self.format.clone(),
            reason,
        })?;

        debug!(path = %label, format = %self.format, "decoded config file");
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

impl<D, T> FileSource<D> for FileProvider<T>
where
    T: ConfigImplementer<D> + Serialize + Default,
{
    fn extensions(&self) -> &[String] {
        &self.extensions
    }

    fn select(&mut self, path: &Path) {
        self.path = Some(path.to_path_buf());
    }
}

fn decode_yaml<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    serde_yaml::from_str(raw).map_err(|e| e.to_string())
}

fn decode_toml<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    toml::from_str(raw).map_err(|e| e.to_string())
}

fn decode_json<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    serde_json::from_str(raw).map_err(|e| e.to_string())
}

fn decode_hcl<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    hcl::from_str(raw).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use configurator::{FlagSet, ResolutionContext};
    use serde::Deserialize;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Server {
        host: Option<String>,
        port: Option<u16>,
    }

    impl ConfigImplementer<(String, u16)> for Server {
        fn validate(&mut self, provenance: Provenance) -> Diagnostics {
            let mut diags = Diagnostics::new();
            if self.port == Some(0) {
                diags.record(provenance, "port").error("Invalid Port", "port must be non-zero");
                self.port = None;
            }
            diags
        }

        fn merge(&self, (host, port): (String, u16)) -> (String, u16) {
            (
                self.host.clone().unwrap_or(host),
                self.port.unwrap_or(port),
            )
        }
    }

    fn parse_file<T>(provider: &mut FileProvider<T>, path: &Path) -> Result<String, ProviderError>
    where
        T: ConfigImplementer<(String, u16)> + Serialize + Default,
    {
        let ctx = ResolutionContext::new();
        let flags = FlagSet::new("demo");
        let session = Session::new("demo", "config", &ctx, &flags);
        FileSource::<(String, u16)>::select(provider, path);
        ConfigSource::<(String, u16)>::parse(provider, &session)
    }

    fn defaults() -> (String, u16) {
        ("localhost".to_string(), 9090)
    }

    #[test]
    fn test_yaml_provider() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "host: example.com\nport: 8080\n").unwrap();

        let mut provider = FileProvider::<Server>::yaml();
        let label = parse_file(&mut provider, &path).unwrap();

        assert_eq!(label, path.display().to_string());
        assert_eq!(
            ConfigSource::merge(&provider, defaults()),
            ("example.com".to_string(), 8080)
        );
    }

    #[test]
    fn test_toml_provider_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "port = 7070\n").unwrap();

        let mut provider = FileProvider::<Server>::toml();
        parse_file(&mut provider, &path).unwrap();

        assert_eq!(
            ConfigSource::merge(&provider, defaults()),
            ("localhost".to_string(), 7070)
        );
    }

    #[test]
    fn test_hcl_provider_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.hcl");
        fs::write(&path, "port = 7070\n").unwrap();

        let mut provider = FileProvider::<Server>::hcl();
        assert!(FileSource::<(String, u16)>::accepts(&provider, &path));
        parse_file(&mut provider, &path).unwrap();

        assert_eq!(
            ConfigSource::merge(&provider, defaults()),
            ("localhost".to_string(), 7070)
        );
    }

    #[test]
    fn test_malformed_hcl_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.hcl");
        fs::write(&path, "port = {\n").unwrap();

        let mut provider = FileProvider::<Server>::hcl();
        let err = parse_file(&mut provider, &path).unwrap_err();
        assert!(matches!(err, ProviderError::Decode { ref format, .. } if format == "HCL"));
    }

    #[test]
    fn test_json_provider_values_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"host": "json.local"}"#).unwrap();

        let mut provider = FileProvider::<Server>::json();
        parse_file(&mut provider, &path).unwrap();

        let values = ConfigSource::<(String, u16)>::values(&provider);
        assert_eq!(values["host"], "json.local");
        assert!(values["port"].is_null());
    }

    #[test]
    fn test_malformed_file_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "port: [not, a, number").unwrap();

        let mut provider = FileProvider::<Server>::yaml();
        let err = parse_file(&mut provider, &path).unwrap_err();

        assert!(matches!(err, ProviderError::Decode { ref format, .. } if format == "YAML"));
        assert_eq!(err.label(), path.display().to_string());
        assert_eq!(*provider.parsed(), Server::default());
    }

    #[test]
    fn test_unreadable_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.toml");

        let mut provider = FileProvider::<Server>::toml();
        let err = parse_file(&mut provider, &path).unwrap_err();
        assert!(matches!(err, ProviderError::Read { .. }));
    }

    #[test]
    fn test_empty_file_contributes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(&path, "  \n").unwrap();

        let mut provider = FileProvider::<Server>::yaml();
        parse_file(&mut provider, &path).unwrap();
        assert_eq!(ConfigSource::merge(&provider, defaults()), defaults());
    }

    #[test]
    fn test_parse_without_selected_file_is_bind_error() {
        let ctx = ResolutionContext::new();
        let flags = FlagSet::new("demo");
        let session = Session::new("demo", "config", &ctx, &flags);

        let mut provider = FileProvider::<Server>::json();
        let err = ConfigSource::<(String, u16)>::parse(&mut provider, &session).unwrap_err();
        assert!(matches!(err, ProviderError::Bind { .. }));
        assert_eq!(err.label(), "JSON");
    }

    #[test]
    fn test_validate_resets_before_merge() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "port = 0\nhost = \"h\"\n").unwrap();

        let mut provider = FileProvider::<Server>::toml();
        parse_file(&mut provider, &path).unwrap();

        let diags = ConfigSource::<(String, u16)>::validate(&mut provider, Provenance::LocalFile);
        assert_eq!(diags.errors().len(), 1);
        assert_eq!(
            ConfigSource::merge(&provider, defaults()),
            ("h".to_string(), 9090)
        );
    }

    #[test]
    fn test_extensions_and_custom_decoder() {
        fn decode(raw: &str) -> Result<Server, String> {
            raw.trim()
                .parse::<u16>()
                .map(|port| Server {
                    host: None,
                    port: Some(port),
                })
                .map_err(|e| e.to_string())
        }

        let yaml = FileProvider::<Server>::yaml();
        assert_eq!(FileSource::<(String, u16)>::extensions(&yaml), ["yaml", "yml"]);

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.port");
        fs::write(&path, "4444").unwrap();

        let mut provider = FileProvider::<Server>::custom("port", &["port"], decode);
        assert!(FileSource::<(String, u16)>::accepts(&provider, &path));
        parse_file(&mut provider, &path).unwrap();
        assert_eq!(
            ConfigSource::merge(&provider, defaults()),
            ("localhost".to_string(), 4444)
        );
    }
}
