/*!
 * Host Configuration
 *
 * Tunables for the sandbox host, with presets and environment overrides.
 */

use crate::core::errors::SandboxError;
use crate::core::limits::*;
use crate::core::types::SandboxResult;
use crate::keyboard::ShortcutConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable overriding the refresh period (milliseconds)
pub const ENV_REFRESH_MS: &str = "SANDBOX_REFRESH_MS";
/// Environment variable naming the application registry backend
pub const ENV_DIRECTORY_URL: &str = "SANDBOX_DIRECTORY_URL";
/// Environment variable enabling JSON trace output
pub const ENV_TRACE_JSON: &str = "SANDBOX_TRACE_JSON";

/// Configuration for the application host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Period of the resource dashboard refresh (default: 2s)
    pub refresh_interval: Duration,

    /// Base URL of the application registry backend, if any
    pub directory_url: Option<String>,

    /// Timeout for registry requests (default: 5s)
    pub directory_timeout: Duration,

    /// Routing flags applied when an app registers shortcuts without its own
    pub default_shortcut_config: ShortcutConfig,

    /// Receiver-sensitive globals returned pre-bound through namespace proxies
    pub bound_globals: Vec<String>,

    /// Emit traces as JSON
    pub trace_json: bool,
}

impl HostConfig {
    pub fn new() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            directory_url: None,
            directory_timeout: DEFAULT_DIRECTORY_TIMEOUT,
            default_shortcut_config: ShortcutConfig::default(),
            bound_globals: BOUND_GLOBALS.iter().map(|s| s.to_string()).collect(),
            trace_json: false,
        }
    }

    /// Faster refresh for interactive development
    pub fn development() -> Self {
        Self {
            refresh_interval: DEV_REFRESH_INTERVAL,
            ..Self::new()
        }
    }

    /// Defaults overridden by `SANDBOX_*` environment variables
    pub fn from_env() -> SandboxResult<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> SandboxResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(raw) = lookup(ENV_REFRESH_MS) {
            let millis: u64 = raw.trim().parse().map_err(|_| {
                let reason = format!("{}={} is not a number", ENV_REFRESH_MS, raw);
                SandboxError::Configuration(reason.into())
            })?;
            if millis == 0 {
                return Err(SandboxError::Configuration(
                    format!("{} must be greater than zero", ENV_REFRESH_MS).into(),
                ));
            }
            config.refresh_interval = Duration::from_millis(millis);
        }

        if let Some(url) = lookup(ENV_DIRECTORY_URL) {
            let url = url.trim().trim_end_matches('/').to_string();
            if !url.is_empty() {
                config.directory_url = Some(url);
            }
        }

        config.trace_json = lookup(ENV_TRACE_JSON)
            .map(|v| v == "1" || v == "true")
            .unwrap_or(false);

        Ok(config)
    }

    /// Whether `name` is on the pre-bound allow-list
    pub fn is_bound_global(&self, name: &str) -> bool {
        self.bound_globals.iter().any(|g| g == name)
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self::new()
    }
}
