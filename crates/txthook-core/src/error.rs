//! Error types for the TXT record hook
//!
//! Every kind in here is fatal for the invocation that produced it. File
//! permission findings are advisory and live in [`crate::credentials`]
//! instead, so they can never change the exit status.

use thiserror::Error;

/// Result type alias for hook operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the TXT record hook
#[derive(Error, Debug)]
pub enum Error {
    /// A required command-line argument was not supplied
    #[error("{0} is missing!")]
    ArgumentMissing(String),

    /// The command verb is not one of the known commands
    #[error("Invalid command: {0}!")]
    InvalidCommand(String),

    /// Reading, creating or chmod-ing the token file failed
    #[error("Token file error ({path}): {message}")]
    TokenFile {
        /// Path of the token file
        path: String,
        /// What went wrong
        message: String,
    },

    /// No zone with this name exists in the provider account
    #[error("Zone '{0}' not found in provider account")]
    ZoneNotFound(String),

    /// No RRSet exists at the given name and type
    #[error("RRSet not found: {name} ({record_type}) in zone {zone}")]
    RRSetNotFound {
        /// Zone name
        zone: String,
        /// Record name relative to the zone
        name: String,
        /// Record type
        record_type: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Remote resource not found (outside zone/RRSet lookups)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Any other failed remote call
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a missing argument error
    pub fn argument_missing(name: impl Into<String>) -> Self {
        Self::ArgumentMissing(name.into())
    }

    /// Create an invalid command error
    pub fn invalid_command(command: impl Into<String>) -> Self {
        Self::InvalidCommand(command.into())
    }

    /// Create a token file error
    pub fn token_file(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TokenFile {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a "zone not found" error
    pub fn zone_not_found(zone: impl Into<String>) -> Self {
        Self::ZoneNotFound(zone.into())
    }

    /// Create a "RRSet not found" error
    pub fn rrset_not_found(
        zone: impl Into<String>,
        name: impl Into<String>,
        record_type: impl Into<String>,
    ) -> Self {
        Self::RRSetNotFound {
            zone: zone.into(),
            name: name.into(),
            record_type: record_type.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from the command line rather than from work
    ///
    /// The binary prints the help hint after these.
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::ArgumentMissing(_) | Self::InvalidCommand(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
