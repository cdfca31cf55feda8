//! # Path Resolution Strategies
//!
//! One strategy per file provenance, each producing the ordered list of
//! candidates to search plus diagnostics explaining every choice.
//!
//! | Provenance          | Candidates                                        |
//! |---------------------|---------------------------------------------------|
//! | `GlobalFile`        | `<system root>/<app>`, `<user config dir>/<app>`  |
//! | `LocalFile`         | `<home>/<app>`, `<cwd>`                           |
//! | `FlagSpecifiedFile` | the explicit file, made absolute                  |
//!
//! Only an explicit file that cannot be made absolute is an Error: the user
//! asked for it by name. Every other unresolvable directory is Trace, since
//! global and local config files are optional.

use crate::context::ResolutionContext;
use crate::diag::{Diagnostics, Provenance};
use std::path::{Path, PathBuf};

/// Output of a path strategy.
#[derive(Debug, Default)]
pub struct SearchPaths {
    /// Directories to search, or the single explicit file.
    pub paths: Vec<PathBuf>,
    pub diagnostics: Diagnostics,
}

/// Dispatches to the strategy for `provenance`.
///
/// Non-file provenances have no strategy; asking for one is an engine bug
/// and yields no candidates plus a Fatal diagnostic.
pub fn candidates(
    provenance: Provenance,
    app_name: &str,
    context: &ResolutionContext,
    explicit: Option<&Path>,
) -> SearchPaths {
    match (provenance, explicit) {
        (Provenance::GlobalFile, _) => global_dirs(app_name, context),
        (Provenance::LocalFile, _) => local_dirs(app_name, context),
        (Provenance::FlagSpecifiedFile, Some(path)) => explicit_file(path, context),
        (Provenance::FlagSpecifiedFile, None) => {
            let mut search = SearchPaths::default();
            search.diagnostics.record(provenance, "").fatal(
                "No Config File Specified",
                "Path resolution for an explicit config file was requested without a path",
            );
            search
        }
        (Provenance::EnvironmentVariable | Provenance::Flag, _) => {
            let mut search = SearchPaths::default();
            search.diagnostics.record(provenance, "").fatal(
                "Unknown Path Provenance",
                format!("{provenance} values are not read from files; no search paths exist"),
            );
            search
        }
    }
}

/// System-wide root joined with the app name, then the per-user OS
/// configuration directory joined with the app name.
pub fn global_dirs(app_name: &str, context: &ResolutionContext) -> SearchPaths {
    let provenance = Provenance::GlobalFile;
    let mut search = SearchPaths::default();

    match context.system_config_dir() {
        Some(root) => push_dir(&mut search, provenance, root.join(app_name)),
        None => {
            search.diagnostics.record(provenance, "").trace(
                "System Config Directory Unavailable",
                "This platform has no system-wide configuration directory",
            );
        }
    }

    match context.user_config_dir() {
        Some(dir) => push_dir(&mut search, provenance, dir.join(app_name)),
        None => {
            search.diagnostics.record(provenance, "").trace(
                "User Config Directory Not Found",
                "Unable to determine the user's OS configuration directory",
            );
        }
    }

    search
}

/// Home directory joined with the app name, then the working directory
/// itself.
pub fn local_dirs(app_name: &str, context: &ResolutionContext) -> SearchPaths {
    let provenance = Provenance::LocalFile;
    let mut search = SearchPaths::default();

    match context.home_dir() {
        Some(home) => push_dir(&mut search, provenance, home.join(app_name)),
        None => {
            search.diagnostics.record(provenance, "").trace(
                "Home Directory Not Found",
                "Unable to determine the user's home directory",
            );
        }
    }

    match context.cwd() {
        Some(cwd) => push_dir(&mut search, provenance, cwd.to_path_buf()),
        None => {
            search.diagnostics.record(provenance, "").trace(
                "Working Directory Not Found",
                "Unable to determine the current working directory",
            );
        }
    }

    search
}

/// Resolves an explicitly requested config file to an absolute path.
/// Relative paths are joined onto the context's working directory.
pub fn explicit_file(path: &Path, context: &ResolutionContext) -> SearchPaths {
    let provenance = Provenance::FlagSpecifiedFile;
    let mut search = SearchPaths::default();
    let requested = path.display().to_string();

    let absolute = if path.is_absolute() {
        Some(path.to_path_buf())
    } else {
        context.cwd().map(|cwd| cwd.join(path))
    };

    match absolute {
        Some(absolute) => {
            search.diagnostics.record(provenance, requested).trace(
                "Config File Path Resolved",
                format!("Will attempt to load {}", absolute.display()),
            );
            search.paths.push(absolute);
        }
        None => {
            search.diagnostics.record(provenance, requested.clone()).error(
                "Unable to Resolve Config File Path",
                format!(
                    "{requested} is relative and the current working directory is unknown"
                ),
            );
        }
    }

    search
}

fn push_dir(search: &mut SearchPaths, provenance: Provenance, dir: PathBuf) {
    search.diagnostics.record(provenance, dir.display().to_string()).trace(
        "Search Directory Added",
        format!("Will search for config files in {}", dir.display()),
    );
    search.paths.push(dir);
}
