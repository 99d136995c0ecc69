//! Error types for the botsim harness.

use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// A shared error type for every botsim crate.
///
/// Variants fall into three groups: assertion failures raised by the DSL
/// when rendered content does not match the test's expectations, transport
/// failures on either side of the mock, and timeouts while waiting for an
/// asynchronous platform push. None of them are retried.
#[derive(Error, Debug, Clone)]
pub enum BotsimError {
    /// Nothing in the rendered tree matched the query.
    #[error("cannot find {what} with {query}")]
    NotFound { what: &'static str, query: String },

    /// A select element was found but has no option with the given text.
    #[error("value '{option}' not found in select '{label}'")]
    OptionNotFound { label: String, option: String },

    /// The query resolved to an element of the wrong kind.
    #[error("element '{label}' is {found}, expected {expected}")]
    WrongElement {
        label: String,
        expected: &'static str,
        found: String,
    },

    /// HTTP failure talking to the application under test.
    #[error("transport error{}: {message}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    Transport { status: Option<u16>, message: String },

    /// An asynchronous update did not arrive in time.
    #[error("waited on {waited_on} for {after:?} without an update")]
    Timeout { waited_on: String, after: Duration },

    /// The application answered a view submission with field errors.
    #[error("view submission rejected with {} field error(s)", .0.len())]
    Validation(BTreeMap<String, String>),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "JSON", "TOML", "form"
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {message}")]
    Io { message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BotsimError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(what: &'static str, query: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            query: query.into(),
        }
    }

    /// Creates a WrongElement error
    pub fn wrong_element(
        label: impl Into<String>,
        expected: &'static str,
        found: impl Into<String>,
    ) -> Self {
        Self::WrongElement {
            label: label.into(),
            expected,
            found: found.into(),
        }
    }

    /// Creates a Transport error
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }

    /// Creates a Timeout error
    pub fn timeout(waited_on: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            waited_on: waited_on.into(),
            after,
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::OptionNotFound { .. })
    }

    /// Check if this is a WrongElement error
    pub fn is_wrong_element(&self) -> bool {
        matches!(self, Self::WrongElement { .. })
    }

    /// Check if this is a Timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if this is a Transport error
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Returns the HTTP status attached to a transport failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for BotsimError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for BotsimError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for BotsimError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (used at bootstrap edges)
impl From<anyhow::Error> for BotsimError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, BotsimError>`.
pub type Result<T> = std::result::Result<T, BotsimError>;
