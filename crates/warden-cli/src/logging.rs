//! Diagnostic logging setup

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::{CliError, Result};

/// Install a stderr subscriber.
///
/// `RUST_LOG` wins when set. Otherwise the level is `warn`, or `debug` with
/// `--verbose`. Logs go to stderr so reports on stdout stay clean.
pub fn init(verbose: bool) -> Result<()> {
    let default = if verbose { "debug" } else { "warn" };
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_thread_names(verbose)
        .with_level(true)
        .compact();

    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default))
        .map_err(|e| CliError::user(format!("invalid log filter: {e}")))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| CliError::user(format!("unable to initialise logging: {e}")))?;

    tracing::debug!("Verbose mode enabled");
    Ok(())
}
