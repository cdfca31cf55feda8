//! # Demo Settings
//!
//! The application's own configuration and the three shapes it can be read
//! from:
//!
//! | Source | Shape                                                 |
//! |--------|-------------------------------------------------------|
//! | file   | `myapp: { name, port, backup_frequency }`             |
//! | env    | `DEMO_NAME`, `DEMO_PORT`, `DEMO_BACKUP_FREQUENCY`     |
//! | flags  | `--name`, `--port`, `--backup-frequency`              |
//!
//! Backup frequency is given in hours everywhere.

use adapters::{
    EnvImplementer, EnvProvider, EnvVars, FileProvider, FlagImplementer, FlagProvider,
    diagnostics_from_validation,
};
use clap::{Arg, ArgAction, ArgMatches};
use configurator::{ConfigImplementer, Configurator, Diagnostics, FlagSet, Provenance};
use errors::ProviderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use validator::Validate;

pub const APP_NAME: &str = "demo";

const HOUR: u64 = 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainConfig {
    pub name: String,
    pub port: u16,
    pub backup_frequency: Duration,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            name: "Default Name".to_string(),
            port: 9090,
            backup_frequency: Duration::from_secs(24 * HOUR),
        }
    }
}

impl DomainConfig {
    /// Overwrites each field that is present and non-zero.
    fn apply(mut self, name: Option<&str>, port: Option<i64>, backup_hours: Option<i64>) -> Self {
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            self.name = name.to_string();
        }
        if let Some(port) = port.and_then(|p| u16::try_from(p).ok()).filter(|p| *p != 0) {
            self.port = port;
        }
        if let Some(hours) = backup_hours.and_then(|h| u64::try_from(h).ok()).filter(|h| *h != 0) {
            self.backup_frequency = Duration::from_secs(hours * HOUR);
        }
        self
    }
}

impl fmt::Display for DomainConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "name: {}", self.name)?;
        writeln!(f, "port: {}", self.port)?;
        write!(f, "backup_frequency: {}h", self.backup_frequency.as_secs() / HOUR)
    }
}

/// Fields shared by every source. Anything unset or reset by validation is
/// `None` and leaves the domain alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Settings {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(range(min = 1, max = 65535, message = "port must be between 1 and 65535"))]
    pub port: Option<i64>,
    #[validate(range(min = 0, message = "backup frequency must be a non-negative number of hours"))]
    pub backup_frequency: Option<i64>,
}

impl Settings {
    /// Validates, dropping every field that failed so it cannot be merged.
    fn check(&mut self, provenance: Provenance, path: &str) -> Diagnostics {
        let Err(errors) = self.validate() else {
            return Diagnostics::new();
        };

        let failed = errors.field_errors();
        let (name, port, backup) = (
            failed.contains_key("name"),
            failed.contains_key("port"),
            failed.contains_key("backup_frequency"),
        );
        if name {
            self.name = None;
        }
        if port {
            self.port = None;
        }
        if backup {
            self.backup_frequency = None;
        }

        diagnostics_from_validation(provenance, path, &errors)
    }

    fn apply(&self, domain: DomainConfig) -> DomainConfig {
        domain.apply(self.name.as_deref(), self.port, self.backup_frequency)
    }
}

/// Config files nest the settings under `myapp`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    pub myapp: Settings,
}

impl ConfigImplementer<DomainConfig> for FileSettings {
    fn validate(&mut self, provenance: Provenance) -> Diagnostics {
        self.myapp.check(provenance, "myapp")
    }

    fn merge(&self, domain: DomainConfig) -> DomainConfig {
        self.myapp.apply(domain)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnvSettings(pub Settings);

impl ConfigImplementer<DomainConfig> for EnvSettings {
    fn validate(&mut self, provenance: Provenance) -> Diagnostics {
        self.0.check(provenance, "")
    }

    fn merge(&self, domain: DomainConfig) -> DomainConfig {
        self.0.apply(domain)
    }
}

impl EnvImplementer<DomainConfig> for EnvSettings {
    fn bind(&mut self, vars: &EnvVars<'_>) -> Result<(), ProviderError> {
        self.0 = Settings {
            name: vars.get("name").map(str::to_string),
            port: vars.parse("port")?,
            backup_frequency: vars.parse("backup_frequency")?,
        };
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlagSettings(pub Settings);

impl ConfigImplementer<DomainConfig> for FlagSettings {
    fn validate(&mut self, provenance: Provenance) -> Diagnostics {
        self.0.check(provenance, "")
    }

    fn merge(&self, domain: DomainConfig) -> DomainConfig {
        self.0.apply(domain)
    }
}

impl FlagImplementer<DomainConfig> for FlagSettings {
    fn register(&self, flags: &mut FlagSet) {
        flags.register(
            Arg::new("name")
                .long("name")
                .action(ArgAction::Set)
                .help("Display name of the service"),
        );
        flags.register(
            Arg::new("port")
                .long("port")
                .action(ArgAction::Set)
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i64))
                .help("Port to listen on"),
        );
        flags.register(
            Arg::new("backup-frequency")
                .long("backup-frequency")
                .action(ArgAction::Set)
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i64))
                .help("Hours between backups"),
        );
    }

    fn bind(&mut self, matches: &ArgMatches) -> Result<(), ProviderError> {
        self.0 = Settings {
            name: matches.get_one::<String>("name").cloned(),
            port: matches.get_one::<i64>("port").copied(),
            backup_frequency: matches.get_one::<i64>("backup-frequency").copied(),
        };
        Ok(())
    }
}

/// The demo's resolution session: YAML, TOML, JSON and HCL files, `DEMO_*`
/// variables and flags, over [`DomainConfig::default`].
pub fn configurator() -> Configurator<DomainConfig> {
    Configurator::new(APP_NAME, DomainConfig::default())
        .file(FileProvider::<FileSettings>::yaml())
        .file(FileProvider::<FileSettings>::toml())
        .file(FileProvider::<FileSettings>::json())
        .file(FileProvider::<FileSettings>::hcl())
        .env(EnvProvider::<EnvSettings>::new())
        .flag(FlagProvider::<FlagSettings>::new())
}
