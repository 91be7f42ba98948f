//! Configuration types for the TXT record hook
//!
//! The hook is configured through environment variables only, because the
//! ACME client that invokes it controls the argument vector:
//!
//! | Variable                    | Default                          |
//! |-----------------------------|----------------------------------|
//! | `TXTHOOK_TOKEN_FILE`        | `$HOME/.txthook-token`           |
//! | `TXTHOOK_PROVIDER`          | `hetzner`                        |
//! | `TXTHOOK_API_BASE`          | `https://api.hetzner.cloud/v1`   |
//! | `TXTHOOK_TTL`               | `3600`                           |
//! | `TXTHOOK_HTTP_TIMEOUT_SECS` | `30`                             |
//! | `TXTHOOK_MODE`              | `live` (or `dry-run`)            |
//! | `TXTHOOK_LOG_LEVEL`         | `info`                           |

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// File name of the token file inside the home directory
pub const TOKEN_FILE_NAME: &str = ".txthook-token";

/// Default Hetzner Cloud API endpoint
pub const DEFAULT_API_BASE: &str = "https://api.hetzner.cloud/v1";

/// TTL given to RRSets created by `set`
pub const DEFAULT_TTL: u32 = 3600;

/// Transport timeout for provider requests
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Record name used by the self-test probe
pub const PROBE_RECORD_NAME: &str = "_txthook-selftest";

/// Literal (unquoted) value published by the self-test probe
pub const PROBE_RECORD_VALUE: &str = "TXTHOOK-SELF-TEST";

/// Whether mutating provider calls are actually sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Send every request
    #[default]
    Live,
    /// Perform lookups, log mutations instead of sending them
    DryRun,
}

impl Mode {
    fn parse(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "live" => Ok(Mode::Live),
            "dry-run" | "dryrun" | "dry_run" => Ok(Mode::DryRun),
            other => Err(Error::config(format!(
                "TXTHOOK_MODE '{}' is not valid. Valid modes: live, dry-run",
                other
            ))),
        }
    }
}

/// Complete hook configuration, assembled from the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookConfig {
    /// Path of the single-line API token file
    pub token_file: PathBuf,

    /// Provider type name, looked up in the registry
    pub provider: String,

    /// Base URL of the provider API
    pub api_base: String,

    /// TTL for newly created RRSets
    pub ttl: u32,

    /// HTTP timeout in seconds
    pub http_timeout_secs: u64,

    /// Live or dry-run
    pub mode: Mode,

    /// tracing level name
    pub log_level: String,
}

impl HookConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Unset variables fall back to their defaults; set but unparsable
    /// variables are configuration errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token_file = match lookup("TXTHOOK_TOKEN_FILE").filter(|s| !s.is_empty()) {
            Some(path) => PathBuf::from(path),
            None => {
                let home = lookup("HOME").filter(|s| !s.is_empty()).ok_or_else(|| {
                    Error::config("HOME is not set and TXTHOOK_TOKEN_FILE was not given")
                })?;
                PathBuf::from(home).join(TOKEN_FILE_NAME)
            }
        };

        let ttl = match lookup("TXTHOOK_TTL") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| Error::config(format!("TXTHOOK_TTL is not a number: {}", raw)))?,
            None => DEFAULT_TTL,
        };

        let http_timeout_secs = match lookup("TXTHOOK_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                Error::config(format!("TXTHOOK_HTTP_TIMEOUT_SECS is not a number: {}", raw))
            })?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        let mode = match lookup("TXTHOOK_MODE") {
            Some(raw) => Mode::parse(raw.trim())?,
            None => Mode::Live,
        };

        Ok(Self {
            token_file,
            provider: lookup("TXTHOOK_PROVIDER").unwrap_or_else(|| "hetzner".to_string()),
            api_base: lookup("TXTHOOK_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            ttl,
            http_timeout_secs,
            mode,
            log_level: lookup("TXTHOOK_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.provider.is_empty() {
            return Err(Error::config("TXTHOOK_PROVIDER cannot be empty"));
        }

        if !self.api_base.starts_with("https://") && !self.api_base.starts_with("http://") {
            return Err(Error::config(format!(
                "TXTHOOK_API_BASE must use HTTP or HTTPS scheme. Got: {}",
                self.api_base
            )));
        }

        if !(60..=86400).contains(&self.ttl) {
            return Err(Error::config(format!(
                "TXTHOOK_TTL must be between 60 and 86400 seconds. Got: {}",
                self.ttl
            )));
        }

        if !(1..=300).contains(&self.http_timeout_secs) {
            return Err(Error::config(format!(
                "TXTHOOK_HTTP_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                self.http_timeout_secs
            )));
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(Error::config(format!(
                    "TXTHOOK_LOG_LEVEL '{}' is not valid. \
                    Valid levels: trace, debug, info, warn, error",
                    self.log_level
                )));
            }
        }

        Ok(())
    }

    /// Provider configuration carrying the freshly read API token
    pub fn provider_config(&self, api_token: impl Into<String>) -> ProviderConfig {
        let api_token: String = api_token.into();
        match self.provider.as_str() {
            "hetzner" => ProviderConfig::Hetzner {
                api_token,
                api_base: self.api_base.clone(),
                timeout_secs: self.http_timeout_secs,
                dry_run: self.mode == Mode::DryRun,
            },
            other => ProviderConfig::Custom {
                factory: other.to_string(),
                config: serde_json::json!({
                    "api_token": api_token,
                    "api_base": self.api_base,
                    "timeout_secs": self.http_timeout_secs,
                    "dry_run": self.mode == Mode::DryRun,
                }),
            },
        }
    }

    /// Reconciler settings derived from this configuration
    pub fn reconciler_config(&self) -> ReconcilerConfig {
        ReconcilerConfig {
            ttl: self.ttl,
            ..ReconcilerConfig::default()
        }
    }
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Hetzner Cloud DNS
    Hetzner {
        /// API token with DNS read/write permission
        api_token: String,
        /// API base URL
        api_base: String,
        /// HTTP timeout in seconds
        timeout_secs: u64,
        /// Log mutations instead of sending them
        dry_run: bool,
    },

    /// Provider registered under a custom factory name
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

// Keeps the API token out of logs
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Hetzner {
                api_base,
                timeout_secs,
                dry_run,
                ..
            } => f
                .debug_struct("Hetzner")
                .field("api_token", &"<REDACTED>")
                .field("api_base", api_base)
                .field("timeout_secs", timeout_secs)
                .field("dry_run", dry_run)
                .finish(),
            ProviderConfig::Custom { factory, .. } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .field("config", &"<REDACTED>")
                .finish(),
        }
    }
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<()> {
        match self {
            ProviderConfig::Hetzner { api_token, .. } => {
                if api_token.trim().is_empty() {
                    return Err(Error::config("Hetzner API token cannot be empty"));
                }
                Ok(())
            }
            ProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(Error::config("Custom provider factory cannot be empty"));
                }
                if config.is_null() {
                    return Err(Error::config("Custom provider config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Hetzner { .. } => "hetzner",
            ProviderConfig::Custom { factory, .. } => factory,
        }
    }
}

/// Settings the reconciler runs with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// TTL for RRSets created by `set`
    pub ttl: u32,
    /// Record name of the self-test probe
    pub probe_name: String,
    /// Unquoted value of the self-test probe
    pub probe_value: String,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            probe_name: PROBE_RECORD_NAME.to_string(),
            probe_value: PROBE_RECORD_VALUE.to_string(),
        }
    }
}
