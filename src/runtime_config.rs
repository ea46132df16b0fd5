//! # Router Configuration
//!
//! Options that change how requests are resolved, loaded from environment
//! variables or from the optional `router` section of a route table.
//!
//! ## Environment Variables
//!
//! | Variable | Field | Default |
//! |---|---|---|
//! | `BRRTMUX_VHOST` | `vhost` | empty |
//! | `BRRTMUX_DISABLE_PATH_CORRECTION` | `disable_path_correction` | `false` |
//! | `BRRTMUX_ENABLE_PATH_ESCAPE` | `enable_path_escape` | `false` |
//! | `BRRTMUX_FIRE_METHOD_NOT_ALLOWED` | `fire_method_not_allowed` | `false` |
//! | `BRRTMUX_SLOW_MATCH_US` | `slow_match_threshold_us` | `1000` |
//!
//! Boolean variables accept `true`/`false`/`1`/`0`; unparsable values fall
//! back to the default.
//!
//! ## Usage
//!
//! ```rust
//! use brrtmux::runtime_config::RouterConfig;
//!
//! let config = RouterConfig::from_env();
//! println!("slow match threshold: {}us", config.slow_match_threshold_us);
//! ```

use serde::Deserialize;
use std::env;

/// Default threshold above which a lookup is logged as slow.
pub const DEFAULT_SLOW_MATCH_US: u64 = 1_000;

/// Request-resolution options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Host the application is served on, e.g. `example.com:8080`.
    /// Used by wildcard subdomain matching and by reverse routing.
    pub vhost: String,
    /// Do not redirect `/path/` to `/path`.
    pub disable_path_correction: bool,
    /// Percent-decode the request path before lookup.
    pub enable_path_escape: bool,
    /// Report 405 with the allowed methods instead of 404 when only the
    /// method differs.
    pub fire_method_not_allowed: bool,
    /// Lookups slower than this (microseconds) are logged at `warn`.
    pub slow_match_threshold_us: u64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            vhost: String::new(),
            disable_path_correction: false,
            enable_path_escape: false,
            fire_method_not_allowed: false,
            slow_match_threshold_us: DEFAULT_SLOW_MATCH_US,
        }
    }
}

impl RouterConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`RouterConfig::from_env`] over any variable source.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let flag = |key: &str, default: bool| {
            lookup(key)
                .and_then(|v| parse_bool(&v))
                .unwrap_or(default)
        };

        Self {
            vhost: lookup("BRRTMUX_VHOST").unwrap_or(defaults.vhost),
            disable_path_correction: flag(
                "BRRTMUX_DISABLE_PATH_CORRECTION",
                defaults.disable_path_correction,
            ),
            enable_path_escape: flag("BRRTMUX_ENABLE_PATH_ESCAPE", defaults.enable_path_escape),
            fire_method_not_allowed: flag(
                "BRRTMUX_FIRE_METHOD_NOT_ALLOWED",
                defaults.fire_method_not_allowed,
            ),
            slow_match_threshold_us: lookup("BRRTMUX_SLOW_MATCH_US")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.slow_match_threshold_us),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
