use anyhow::{Result, bail};
use configurator::{ResolutionContext, Severity};
use tracing::{debug, trace};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod settings;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let resolution = settings::configurator().resolve(ResolutionContext::from_process());
    if let Some(usage) = resolution.help() {
        print!("{usage}");
        return Ok(());
    }
    let (domain, diagnostics, values) = resolution.into_parts();

    // Trace entries are bookkeeping; surface them only through RUST_LOG.
    for entry in &diagnostics {
        if entry.severity == Severity::Trace {
            trace!(target: "configurator::ledger", "{entry}");
        } else {
            eprintln!("{entry}");
        }
    }

    for parsed in &values {
        debug!(
            provenance = %parsed.provenance,
            path = %parsed.path,
            values = %parsed.values,
            "parsed config source"
        );
    }

    if diagnostics.has_fatal() || diagnostics.has_error() {
        bail!(
            "configuration could not be resolved cleanly ({} error(s), {} fatal)",
            diagnostics.errors().len(),
            diagnostics.fatals().len()
        );
    }

    println!("{domain}");
    Ok(())
}
