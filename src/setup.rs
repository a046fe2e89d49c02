//! Process-wide setup shared by both binaries.

use color_eyre::eyre::{eyre, Result};
use tracing_subscriber::EnvFilter;

/// Level used when `RUST_LOG` is unset or unparsable.
const DEFAULT_LOG_FILTER: &str = "info";

/// Installs the error report hook and the log subscriber. Call once, first
/// thing in `main`.
pub fn setup() -> Result<()> {
    if std::env::var_os("RUST_LIB_BACKTRACE").is_none() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0");
    }
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .try_init()
        .map_err(|e| eyre!("Failed to install log subscriber: {}", e))
}

/// `RUST_LOG` if it parses, `info` otherwise.
pub fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn log_filter_defaults_to_info() {
        let saved = std::env::var_os("RUST_LOG");
        std::env::remove_var("RUST_LOG");

        let filter = log_filter().to_string();

        if let Some(value) = saved {
            std::env::set_var("RUST_LOG", value);
        }
        assert_eq!(filter, "info");
    }

    #[test]
    #[serial]
    fn log_filter_follows_rust_log() {
        let saved = std::env::var_os("RUST_LOG");
        std::env::set_var("RUST_LOG", "debug");

        let filter = log_filter().to_string();

        match saved {
            Some(value) => std::env::set_var("RUST_LOG", value),
            None => std::env::remove_var("RUST_LOG"),
        }
        assert_eq!(filter, "debug");
    }
}
