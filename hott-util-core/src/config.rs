//! Process-wide settings read from the environment.

use std::env;

/// Where the latest versions document is published.
pub const DEFAULT_VERSIONS_URL: &str =
    "https://drive.google.com/uc?export=download&id=0B_uPguA0xiT4SUl1V1VKYXFjWHc";

pub const ENV_OFFLINE: &str = "HOTT_OFFLINE";
pub const ENV_DEBUG: &str = "HOTT_DEBUG";
pub const ENV_VERSIONS_URL: &str = "HOTT_VERSIONS_URL";

/// Runtime switches shared by the HoTT tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Skip every network access.
    pub offline: bool,
    /// Enable debug logging.
    pub debug: bool,
    /// URL of the latest versions document.
    pub versions_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            offline: false,
            debug: false,
            versions_url: DEFAULT_VERSIONS_URL.to_string(),
        }
    }
}

/// Interprets an environment flag. `1`, `true`, `yes` and `on` count as set.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl Settings {
    /// Reads `HOTT_OFFLINE`, `HOTT_DEBUG` and `HOTT_VERSIONS_URL`, falling back
    /// to the defaults for anything unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`Settings::from_env`] but with a custom variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            offline: lookup(ENV_OFFLINE).is_some_and(|v| parse_flag(&v)),
            debug: lookup(ENV_DEBUG).is_some_and(|v| parse_flag(&v)),
            versions_url: lookup(ENV_VERSIONS_URL)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.versions_url),
        }
    }
}
