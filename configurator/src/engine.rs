//! # Resolution Engine
//!
//! Drives every configured source through the provider lifecycle in a fixed
//! precedence order and threads the caller's domain object through each
//! merge.
//!
//! # Precedence Order
//! 1. Global config file (lowest priority)
//! 2. Local config file
//! 3. Environment variables
//! 4. CLI flags (highest priority)
//!
//! When the reserved file flag (`-config <path>` by default) is present, the
//! named file replaces steps 1-3 entirely; flags still apply on top.
//!
//! A pass is strictly sequential: later phases must observe and override
//! what earlier phases merged.

use crate::context::ResolutionContext;
use crate::diag::{Diagnostics, Provenance};
use crate::flags::FlagSet;
use crate::ledger::ParsedValues;
use crate::paths;
use crate::source::{ConfigSource, FileSource, FlagSource, Session};
use errors::ARGS_LABEL;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Base name searched for when none is configured.
pub const DEFAULT_FILE_NAME: &str = "config";

/// Reserved flag naming an explicit config file when none is configured.
pub const DEFAULT_FILE_FLAG: &str = "config";

/// A configured resolution session.
///
/// ```rust,no_run
/// use configurator::{Configurator, ResolutionContext};
///
/// #[derive(Debug, Default)]
/// struct Domain {
///     port: u16,
/// }
///
/// let resolution = Configurator::new("demo", Domain { port: 9090 })
///     .resolve(ResolutionContext::from_process());
///
/// if resolution.diagnostics().has_error() {
///     eprint!("{}", resolution.diagnostics());
/// }
/// println!("port = {}", resolution.domain().port);
/// ```
pub struct Configurator<D> {
    app_name: String,
    file_name: String,
    file_flag: Option<String>,
    domain: D,
    files: Vec<Box<dyn FileSource<D>>>,
    env: Option<Box<dyn ConfigSource<D>>>,
    flag: Option<Box<dyn FlagSource<D>>>,
}

impl<D> Configurator<D> {
    /// `app_name` names the per-application config directories and the
    /// environment variable prefix. `domain` holds the defaults every source
    /// is merged onto.
    pub fn new(app_name: impl Into<String>, domain: D) -> Self {
        Self {
            app_name: app_name.into(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            file_flag: Some(DEFAULT_FILE_FLAG.to_string()),
            domain,
            files: Vec::new(),
            env: None,
            flag: None,
        }
    }

    /// Overrides the base name of config files (`config` by default).
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    /// Overrides the reserved flag naming an explicit config file.
    pub fn file_flag(mut self, name: impl Into<String>) -> Self {
        self.file_flag = Some(name.into());
        self
    }

    /// Disables explicit config files; the argument list is left untouched.
    pub fn without_file_flag(mut self) -> Self {
        self.file_flag = None;
        self
    }

    /// Adds a file provider. Within a directory, providers are tried in the
    /// order they were added and the first file found wins.
    pub fn file(mut self, provider: impl FileSource<D> + 'static) -> Self {
        self.files.push(Box::new(provider));
        self
    }

    pub fn env(mut self, provider: impl ConfigSource<D> + 'static) -> Self {
        self.env = Some(Box::new(provider));
        self
    }

    pub fn flag(mut self, provider: impl FlagSource<D> + 'static) -> Self {
        self.flag = Some(Box::new(provider));
        self
    }

    /// Runs one resolution pass over `context`.
    ///
    /// # M-CANONICAL-DOCS
    ///
    /// ## Purpose
    /// Strips the reserved file flag from the arguments, then runs either the
    /// explicit file alone or the global file, local file and environment
    /// phases in that order. The flag phase always runs last. Each source
    /// goes through parse, validate and merge, and the domain passes from
    /// one merge to the next.
    ///
    /// ## Usage
    /// ```rust,no_run
    /// use configurator::{Configurator, ResolutionContext};
    ///
    /// let resolution = Configurator::new("demo", 9090_u16)
    ///     .resolve(ResolutionContext::from_process());
    ///
    /// for entry in resolution.diagnostics().errors() {
    ///     eprintln!("{entry}");
    /// }
    /// println!("port = {}", resolution.domain());
    /// ```
    ///
    /// ## Error Handling
    /// Never fails. Every problem is recorded in [`Resolution::diagnostics`]
    /// and the domain holds whatever the successful sources produced. A help
    /// request (`--help`, `-h`) is not an error: the flag phase is skipped,
    /// an Info entry is recorded and the usage is returned through
    /// [`Resolution::help`].
    pub fn resolve(self, mut context: ResolutionContext) -> Resolution<D> {
        let Configurator {
            app_name,
            file_name,
            file_flag,
            mut domain,
            mut files,
            env,
            flag,
        } = self;

        let mut diags = Diagnostics::new();
        let mut values = ParsedValues::new();
        let mut flag_set = FlagSet::new(app_name.clone());
        let mut help = None;

        debug!(app = %app_name, file_name = %file_name, "resolving configuration");

        let explicit = file_flag
            .as_deref()
            .and_then(|name| extract_file_flag(&mut context, name, &mut diags));

        {
            let session = Session::new(&app_name, &file_name, &context, &flag_set);

            if let Some(path) = explicit {
                diags
                    .record(Provenance::FlagSpecifiedFile, path.display().to_string())
                    .trace(
                        "Explicit Config File Requested",
                        "Global files, local files and environment variables are skipped",
                    );
                domain = process_explicit(
                    &path,
                    &mut files,
                    &session,
                    &mut diags,
                    &mut values,
                    domain,
                );
            } else {
                for provenance in [Provenance::GlobalFile, Provenance::LocalFile] {
                    domain = process_files(
                        provenance,
                        &mut files,
                        &session,
                        &mut diags,
                        &mut values,
                        domain,
                    );
                }

                domain = match env {
                    Some(mut env) => process_source(
                        env.as_mut(),
                        Provenance::EnvironmentVariable,
                        &session,
                        &mut diags,
                        &mut values,
                        domain,
                    ),
                    None => {
                        skip(&mut diags, Provenance::EnvironmentVariable);
                        domain
                    }
                };
            }
        }

        domain = match flag {
            Some(mut flag) => {
                flag.init(&mut flag_set);
                if let Some(usage) = flag_set.help(context.args()) {
                    diags.record(Provenance::Flag, ARGS_LABEL).info(
                        "Help Requested",
                        "Usage was rendered and command line flags were not applied",
                    );
                    help = Some(usage);
                    domain
                } else {
                    let session = Session::new(&app_name, &file_name, &context, &flag_set);
                    process_source(
                        flag.as_mut(),
                        Provenance::Flag,
                        &session,
                        &mut diags,
                        &mut values,
                        domain,
                    )
                }
            }
            None => {
                skip(&mut diags, Provenance::Flag);
                domain
            }
        };

        if diags.has_fatal() || diags.has_error() {
            warn!(
                app = %app_name,
                errors = diags.errors().len(),
                fatals = diags.fatals().len(),
                "configuration resolved with errors"
            );
        } else {
            debug!(app = %app_name, sources = values.len(), "configuration resolved");
        }

        Resolution {
            domain,
            diagnostics: diags,
            values,
            help,
        }
    }
}

/// Result of a resolution pass.
#[derive(Debug, Clone)]
pub struct Resolution<D> {
    domain: D,
    diagnostics: Diagnostics,
    values: ParsedValues,
    help: Option<String>,
}

impl<D> Resolution<D> {
    pub fn domain(&self) -> &D {
        &self.domain
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Every source that parsed successfully, in resolution order.
    pub fn values(&self) -> &ParsedValues {
        &self.values
    }

    /// Rendered usage when the arguments asked for help.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn into_domain(self) -> D {
        self.domain
    }

    pub fn into_parts(self) -> (D, Diagnostics, ParsedValues) {
        (self.domain, self.diagnostics, self.values)
    }
}

/// Strips the reserved file flag from the context's arguments and returns
/// its value.
///
/// Accepts `-name value`, `-name=value` and the `--` spellings of both.
/// Scanning stops at a bare `--`. When the flag appears more than once the
/// last value wins. A flag without a value is removed and recorded as an
/// Error.
fn extract_file_flag(
    context: &mut ResolutionContext,
    name: &str,
    diags: &mut Diagnostics,
) -> Option<PathBuf> {
    let single = format!("-{name}");
    let double = format!("--{name}");
    let mut kept = Vec::with_capacity(context.args().len());
    let mut found: Option<String> = None;
    let mut missing = false;

    let mut args = context.args().to_vec().into_iter();
    if let Some(program) = args.next() {
        kept.push(program);
    }

    while let Some(arg) = args.next() {
        if arg == "--" {
            kept.push(arg);
            kept.extend(args.by_ref());
            break;
        }

        if arg == single || arg == double {
            found = args.next();
            missing = found.is_none();
            continue;
        }

        let inline = arg
            .strip_prefix(&double)
            .or_else(|| arg.strip_prefix(&single))
            .and_then(|rest| rest.strip_prefix('='));
        if let Some(value) = inline {
            found = Some(value.to_string());
            missing = false;
            continue;
        }

        kept.push(arg);
    }

    context.set_args(kept);

    match found {
        Some(value) if !value.is_empty() => {
            diags.record(Provenance::FlagSpecifiedFile, single).trace(
                "Config File Flag Found",
                format!("Config file explicitly set to {value}"),
            );
            Some(PathBuf::from(value))
        }
        Some(_) => {
            missing_path(diags, &single);
            None
        }
        None if missing => {
            missing_path(diags, &single);
            None
        }
        None => None,
    }
}

fn missing_path(diags: &mut Diagnostics, flag: &str) {
    diags.record(Provenance::FlagSpecifiedFile, flag).error(
        "Missing Config File Path",
        format!("Flag {flag} requires a path argument"),
    );
}

fn process_explicit<D>(
    path: &Path,
    files: &mut [Box<dyn FileSource<D>>],
    session: &Session<'_>,
    diags: &mut Diagnostics,
    values: &mut ParsedValues,
    domain: D,
) -> D {
    let provenance = Provenance::FlagSpecifiedFile;
    let search = paths::candidates(provenance, session.app_name(), session.context(), Some(path));
    diags.merge(search.diagnostics);

    let Some(file) = search.paths.first() else {
        return domain;
    };
    let label = file.display().to_string();

    if !file.is_file() {
        diags.record(provenance, label.clone()).error(
            "Config File Not Found",
            format!("Unable to find the config file at {label}"),
        );
        return domain;
    }

    let Some(index) = files.iter().position(|p| p.accepts(file)) else {
        let supported: Vec<&str> = files
            .iter()
            .flat_map(|p| p.extensions().iter().map(String::as_str))
            .collect();
        diags.record(provenance, label).error(
            "Unsupported Config File Type",
            format!(
                "No file provider handles this extension; supported: {{{}}}",
                supported.join(", ")
            ),
        );
        return domain;
    };

    let provider = &mut files[index];
    provider.select(file);
    diags.record(provenance, label.clone()).trace(
        "Config File Found",
        format!("Will attempt to parse {label}"),
    );
    process_source(provider.as_mut(), provenance, session, diags, values, domain)
}

/// Searches the strategy's directories for the first file any provider
/// recognises. Only that file is consulted for this provenance, whatever
/// the outcome of its parse.
fn process_files<D>(
    provenance: Provenance,
    files: &mut [Box<dyn FileSource<D>>],
    session: &Session<'_>,
    diags: &mut Diagnostics,
    values: &mut ParsedValues,
    domain: D,
) -> D {
    debug!(%provenance, "searching for config files");

    let search = paths::candidates(provenance, session.app_name(), session.context(), None);
    diags.merge(search.diagnostics);

    if files.is_empty() {
        skip(diags, provenance);
        return domain;
    }

    for dir in &search.paths {
        for provider in files.iter_mut() {
            if provider.locate(diags, provenance, session, dir) {
                return process_source(
                    provider.as_mut(),
                    provenance,
                    session,
                    diags,
                    values,
                    domain,
                );
            }
        }
    }

    diags.record(provenance, "").trace(
        "No Config File Found",
        format!("No {provenance} was found in any search directory"),
    );
    domain
}

/// parse → validate → merge for a single source.
fn process_source<D, S>(
    source: &mut S,
    provenance: Provenance,
    session: &Session<'_>,
    diags: &mut Diagnostics,
    values: &mut ParsedValues,
    domain: D,
) -> D
where
    S: ConfigSource<D> + ?Sized,
{
    let label = match source.parse(session) {
        Ok(label) => label,
        Err(err) => {
            warn!(%provenance, path = err.label(), error = %err, "config source failed to parse");
            diags
                .record(provenance, err.label())
                .error("Unable to Parse Config", err.to_string());
            return domain;
        }
    };

    diags.merge(source.validate(provenance));

    let domain = source.merge(domain);
    values.push(provenance, label.clone(), source.values());

    debug!(%provenance, path = %label, "merged config source");
    diags.record(provenance, label).trace(
        "Config Merged",
        format!("Values from the {provenance} were merged"),
    );
    domain
}

fn skip(diags: &mut Diagnostics, provenance: Provenance) {
    diags.record(provenance, "").trace(
        "No Provider Configured",
        format!("Skipping {provenance}: no provider was supplied"),
    );
}
