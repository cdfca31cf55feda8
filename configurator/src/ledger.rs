//! Parsed-value ledger: what was read from where, in resolution order.

use crate::diag::Provenance;
use serde::Serialize;

/// One source that parsed successfully during a resolution pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedValue {
    pub provenance: Provenance,
    /// Resolved file path, environment prefix or argument label.
    pub path: String,
    /// Snapshot of the provider's parsed values at the time of the merge.
    pub values: serde_json::Value,
}

/// Append-only, ordered record of [`ParsedValue`] entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedValues {
    entries: Vec<ParsedValue>,
}

impl ParsedValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(
        &mut self,
        provenance: Provenance,
        path: impl Into<String>,
        values: serde_json::Value,
    ) {
        self.entries.push(ParsedValue {
            provenance,
            path: path.into(),
            values,
        });
    }

    /// The entry recorded for `provenance`, if that source parsed.
    pub fn get(&self, provenance: Provenance) -> Option<&ParsedValue> {
        self.entries.iter().find(|e| e.provenance == provenance)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParsedValue> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a ParsedValues {
    type Item = &'a ParsedValue;
    type IntoIter = std::slice::Iter<'a, ParsedValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
