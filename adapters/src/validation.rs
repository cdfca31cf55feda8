//! Bridges `validator` results into the diagnostics ledger.

use configurator::{Diagnostics, Provenance};
use validator::{Validate, ValidationErrors};

/// One Error per failing field, ordered by field name. Each diagnostic is
/// labeled `<path>.<field>` (or just the field when `path` is empty) and
/// its detail joins every failure recorded for that field.
pub fn diagnostics_from_validation(
    provenance: Provenance,
    path: &str,
    errors: &ValidationErrors,
) -> Diagnostics {
    let mut fields: Vec<(String, String)> = errors
        .field_errors()
        .into_iter()
        .map(|(field, failures)| {
            let detail = failures
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            (field.to_string(), detail)
        })
        .collect();
    fields.sort();

    let mut diags = Diagnostics::new();
    for (field, detail) in fields {
        let label = if path.is_empty() {
            field.clone()
        } else {
            format!("{path}.{field}")
        };
        diags
            .record(provenance, label)
            .error(format!("Invalid Value For {field}"), detail);
    }
    diags
}

/// Runs `value.validate()` and converts any failures.
pub fn validate_fields<T: Validate>(value: &T, provenance: Provenance, path: &str) -> Diagnostics {
    match value.validate() {
        Ok(()) => Diagnostics::new(),
        Err(errors) => diagnostics_from_validation(provenance, path, &errors),
    }
}
