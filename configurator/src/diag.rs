//! # Diagnostics Ledger
//!
//! An append-only record of everything that happened during a resolution
//! pass: which directories were probed, which files were found, which values
//! were rejected and why.
//!
//! Entries are never removed or reordered. The ledger keeps cumulative
//! has-fatal / has-error / has-warn flags so callers can decide whether to
//! halt startup without scanning every entry.

use serde::Serialize;
use std::fmt;

/// Diagnostic logging level, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    /// An unrecoverable inconsistency inside the engine itself.
    Fatal,
    /// A source was found but could not be parsed or validated.
    Error,
    /// Concerning but continuable; reserved for caller-defined conditions.
    Warn,
    Info,
    Debug,
    /// The engine's own bookkeeping: directory probes and search decisions.
    Trace,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Fatal => write!(f, "Fatal"),
            Severity::Error => write!(f, "Error"),
            Severity::Warn => write!(f, "Warn"),
            Severity::Info => write!(f, "Info"),
            Severity::Debug => write!(f, "Debug"),
            Severity::Trace => write!(f, "Trace"),
        }
    }
}

/// Where a configuration value or diagnostic originated.
///
/// Precedence, lowest first: `GlobalFile`, `LocalFile`,
/// `EnvironmentVariable`, `Flag`. A `FlagSpecifiedFile` replaces the first
/// three entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Provenance {
    GlobalFile,
    LocalFile,
    FlagSpecifiedFile,
    EnvironmentVariable,
    Flag,
}

impl Provenance {
    /// Whether values of this provenance are read from a config file.
    pub const fn is_file(self) -> bool {
        matches!(
            self,
            Provenance::GlobalFile | Provenance::LocalFile | Provenance::FlagSpecifiedFile
        )
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::GlobalFile => write!(f, "Global Config File"),
            Provenance::LocalFile => write!(f, "Local Config File"),
            Provenance::FlagSpecifiedFile => write!(f, "CLI Specified Config File"),
            Provenance::EnvironmentVariable => write!(f, "Environment Variable"),
            Provenance::Flag => write!(f, "CLI Flag"),
        }
    }
}

/// A single point of diagnostic information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// `None` when the diagnostic is not attributable to a source.
    pub provenance: Option<Provenance>,
    /// File path, environment variable (prefix) or flag name. May be empty.
    pub path: String,
    pub summary: String,
    pub detail: String,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        provenance: impl Into<Option<Provenance>>,
        path: impl Into<String>,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            provenance: provenance.into(),
            path: path.into(),
            summary: summary.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.severity.to_string().to_uppercase())?;

        if let Some(provenance) = self.provenance {
            write!(f, " ({provenance})")?;
        }

        if !self.path.is_empty() {
            write!(f, " [{}]", self.path)?;
        }

        // One line per diagnostic, even for multi-line error output.
        write!(f, " Summary: \"{}\"", self.summary.replace('\n', "\\n"))?;
        if !self.detail.is_empty() {
            write!(f, " Detail: \"{}\"", self.detail.trim_end().replace('\n', "\\n"))?;
        }

        Ok(())
    }
}

/// Ordered, append-only collection of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    has_fatal: bool,
    has_error: bool,
    has_warn: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends entries in order. Empty input leaves the ledger untouched.
    pub fn append(&mut self, entries: impl IntoIterator<Item = Diagnostic>) {
        for entry in entries {
            self.push(entry);
        }
    }

    pub fn push(&mut self, entry: Diagnostic) {
        match entry.severity {
            Severity::Fatal => self.has_fatal = true,
            Severity::Error => self.has_error = true,
            Severity::Warn => self.has_warn = true,
            Severity::Info | Severity::Debug | Severity::Trace => {}
        }
        self.entries.push(entry);
    }

    /// Concatenates `other` onto this ledger. Flags are OR-ed, never cleared.
    pub fn merge(&mut self, other: Diagnostics) {
        self.has_fatal |= other.has_fatal;
        self.has_error |= other.has_error;
        self.has_warn |= other.has_warn;
        self.entries.extend(other.entries);
    }

    /// Starts a diagnostic attributed to `provenance` and `path`.
    ///
    /// ```
    /// use configurator::{Diagnostics, Provenance};
    ///
    /// let mut diags = Diagnostics::new();
    /// diags
    ///     .record(Provenance::LocalFile, "./config.yaml")
    ///     .error("Unable to Parse Config", "expected a mapping");
    /// assert!(diags.has_error());
    /// ```
    pub fn record(
        &mut self,
        provenance: impl Into<Option<Provenance>>,
        path: impl Into<String>,
    ) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            diags: self,
            provenance: provenance.into(),
            path: path.into(),
        }
    }

    /// Entries at exactly `severity`, in insertion order.
    pub fn filter(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.entries.iter().filter(move |d| d.severity == severity)
    }

    pub fn fatals(&self) -> Vec<&Diagnostic> {
        self.filter(Severity::Fatal).collect()
    }

    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.filter(Severity::Error).collect()
    }

    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.filter(Severity::Warn).collect()
    }

    pub fn infos(&self) -> Vec<&Diagnostic> {
        self.filter(Severity::Info).collect()
    }

    pub fn debugs(&self) -> Vec<&Diagnostic> {
        self.filter(Severity::Debug).collect()
    }

    pub fn traces(&self) -> Vec<&Diagnostic> {
        self.filter(Severity::Trace).collect()
    }

    pub fn has_fatal(&self) -> bool {
        self.has_fatal
    }

    pub fn has_error(&self) -> bool {
        self.has_error
    }

    pub fn has_warn(&self) -> bool {
        self.has_warn
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<Diagnostic> for Diagnostics {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        let mut diags = Diagnostics::new();
        diags.append(iter);
        diags
    }
}

/// Finishes a diagnostic started with [`Diagnostics::record`].
#[must_use = "a diagnostic is only recorded once a severity method is called"]
pub struct DiagnosticBuilder<'a> {
    diags: &'a mut Diagnostics,
    provenance: Option<Provenance>,
    path: String,
}

impl<'a> DiagnosticBuilder<'a> {
    pub fn fatal(
        self,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) -> &'a mut Diagnostics {
        self.build(Severity::Fatal, summary.into(), detail.into())
    }

    pub fn error(
        self,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) -> &'a mut Diagnostics {
        self.build(Severity::Error, summary.into(), detail.into())
    }

    pub fn warn(
        self,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) -> &'a mut Diagnostics {
        self.build(Severity::Warn, summary.into(), detail.into())
    }

    pub fn info(
        self,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) -> &'a mut Diagnostics {
        self.build(Severity::Info, summary.into(), detail.into())
    }

    pub fn debug(
        self,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) -> &'a mut Diagnostics {
        self.build(Severity::Debug, summary.into(), detail.into())
    }

    pub fn trace(
        self,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) -> &'a mut Diagnostics {
        self.build(Severity::Trace, summary.into(), detail.into())
    }

    fn build(self, severity: Severity, summary: String, detail: String) -> &'a mut Diagnostics {
        let DiagnosticBuilder {
            diags,
            provenance,
            path,
        } = self;
        diags.push(Diagnostic {
            severity,
            provenance,
            path,
            summary,
            detail,
        });
        diags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(severity: Severity) -> Diagnostic {
        Diagnostic::new(severity, Provenance::LocalFile, "", "summary", "")
    }

    #[test]
    fn test_render_full_diagnostic() {
        let diag = Diagnostic::new(
            Severity::Error,
            Provenance::LocalFile,
            "/home/demo/config.yaml",
            "Unable to Parse Config",
            "mapping values are not allowed here",
        );
        assert_eq!(
            diag.to_string(),
            concat!(
                "ERROR: (Local Config File) [/home/demo/config.yaml] ",
                "Summary: \"Unable to Parse Config\" ",
                "Detail: \"mapping values are not allowed here\""
            )
        );
    }

    #[test]
    fn test_render_omits_unset_segments() {
        let diag = Diagnostic::new(Severity::Trace, None, "", "Resolution Started", "");
        assert_eq!(diag.to_string(), "TRACE: Summary: \"Resolution Started\"");

        let diag = Diagnostic::new(Severity::Warn, Provenance::Flag, "", "Deprecated", "");
        assert_eq!(diag.to_string(), "WARN: (CLI Flag) Summary: \"Deprecated\"");
    }

    #[test]
    fn test_append_empty_is_noop() {
        let mut diags = Diagnostics::new();
        diags.append(Vec::new());
        assert!(diags.is_empty());
        assert!(!diags.has_fatal() && !diags.has_error() && !diags.has_warn());
    }

    #[test]
    fn test_flags_track_severities_present() {
        let mut diags = Diagnostics::new();
        diags.append([entry(Severity::Trace), entry(Severity::Info)]);
        assert!(!diags.has_warn());
        assert!(!diags.has_error());

        diags.push(entry(Severity::Warn));
        assert!(diags.has_warn());
        assert!(!diags.has_error());
        assert!(!diags.has_fatal());

        diags.push(entry(Severity::Fatal));
        assert!(diags.has_fatal());
        assert!(!diags.has_error());
    }

    #[test]
    fn test_merge_preserves_order_and_ors_flags() {
        let mut first = Diagnostics::new();
        first.record(Provenance::GlobalFile, "a").error("first", "");

        let mut second = Diagnostics::new();
        second.record(Provenance::LocalFile, "b").trace("second", "");
        second.record(Provenance::LocalFile, "c").warn("third", "");

        first.merge(second);

        let summaries: Vec<_> = first.iter().map(|d| d.summary.as_str()).collect();
        assert_eq!(summaries, vec!["first", "second", "third"]);
        assert!(first.has_error());
        assert!(first.has_warn());
        assert!(!first.has_fatal());

        first.merge(Diagnostics::new());
        assert!(first.has_error());
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_filter_exact_severity() {
        let mut diags = Diagnostics::new();
        diags.record(Provenance::Flag, "-port").error("one", "");
        diags.record(Provenance::Flag, "-port").trace("two", "");
        diags.record(Provenance::Flag, "-name").error("three", "");

        let errors = diags.errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].summary, "one");
        assert_eq!(errors[1].summary, "three");
        assert_eq!(diags.traces().len(), 1);
        assert!(diags.fatals().is_empty());
        assert!(diags.warnings().is_empty());
        assert!(diags.infos().is_empty());
        assert!(diags.debugs().is_empty());
    }

    #[test]
    fn test_builder_chains() {
        let mut diags = Diagnostics::new();
        diags
            .record(Provenance::EnvironmentVariable, "DEMO_")
            .debug("Bound", "")
            .record(Provenance::EnvironmentVariable, "DEMO_")
            .info("Merged", "2 values");

        assert_eq!(diags.len(), 2);
        assert_eq!(diags.infos()[0].detail, "2 values");
        assert_eq!(
            diags.iter().next().map(|d| d.provenance),
            Some(Some(Provenance::EnvironmentVariable))
        );
    }

    #[test]
    fn test_ledger_renders_one_line_per_entry() {
        let mut diags = Diagnostics::new();
        diags.record(Provenance::GlobalFile, "/etc/demo").trace("Searching", "");
        diags.record(None, "").fatal("Broken", "why");

        let rendered = diags.to_string();
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "TRACE: (Global Config File) [/etc/demo] Summary: \"Searching\""
        );
        assert_eq!(lines[1], "FATAL: Summary: \"Broken\" Detail: \"why\"");
    }

    #[test]
    fn test_collect_from_iterator_sets_flags() {
        let diags: Diagnostics = vec![entry(Severity::Error), entry(Severity::Trace)]
            .into_iter()
            .collect();
        assert!(diags.has_error());
        assert_eq!(diags.len(), 2);
    }
}
