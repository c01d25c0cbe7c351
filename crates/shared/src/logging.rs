use std::{env, str::FromStr};

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `default_level`, which is the log verbosity
/// handed down by the hosting environment (e.g. `LOG_LEVEL=debug`). Set
/// `LOG_FORMAT=json` for structured output.
pub fn configure_logging(default_level: &str) -> Result<(), anyhow::Error> {
    let filter = env::var("RUST_LOG").unwrap_or(default_level.to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_str(filter.as_str())?)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stdout);

    let subscriber = if env::var("LOG_FORMAT").unwrap_or("text".to_string()) == "json" {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };

    match subscriber {
        Ok(_) => Ok(()),
        Err(e) => {
            warn!(
                "Failed to initialize logging, potentially because we have initialized logging already: {}",
                e
            );

            Ok(())
        }
    }
}
