//! Logging bootstrap.
//!
//! The library logs through the `log` facade. Front-ends call
//! [`enable_logging`] once at startup to install `env_logger`.

use std::sync::OnceLock;

use log::LevelFilter;

static INIT_LOGGER: OnceLock<()> = OnceLock::new();

/// Level used when `RUST_LOG` does not say otherwise.
pub fn default_level(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

/// Installs the logger. Only the first call has an effect.
///
/// `RUST_LOG` is applied on top of the default level.
pub fn enable_logging(debug: bool) {
    INIT_LOGGER.get_or_init(|| {
        let _ = env_logger::builder()
            .filter_level(default_level(debug))
            .parse_default_env()
            .format_timestamp_millis()
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(true), LevelFilter::Debug);
        assert_eq!(default_level(false), LevelFilter::Warn);
    }

    #[test]
    fn test_repeated_initialization_is_harmless() {
        enable_logging(true);
        enable_logging(false);
        log::debug!("logger initialized");
    }
}
