//! Structured errors for provider lookup and selection
//!
//! Every failure is surfaced synchronously to the caller. Errors carry a
//! machine-readable code and enough context (the offending name, the names
//! that were available) to diagnose misconfiguration without looking inside
//! the registry.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const NULL_ARGUMENT: &str = "NULL_ARGUMENT";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const NO_PROVIDER: &str = "NO_PROVIDER";
    pub const DISCOVERY_FAILED: &str = "DISCOVERY_FAILED";
}

pub type Result<T, E = SpiError> = std::result::Result<T, E>;

/// Failure reported by a discovery source while enumerating providers
#[derive(Clone, Error)]
#[error("{message}")]
pub struct DiscoveryError {
    message: String,
    #[source]
    source: Option<Arc<dyn StdError + Send + Sync>>,
}

impl DiscoveryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error, keeping it reachable through `source()`
    pub fn with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Arc::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("DiscoveryError");
        s.field("message", &self.message);
        if let Some(ref source) = self.source {
            s.field("source", &source.to_string());
        }
        s.finish()
    }
}

/// Errors returned by the provider registry
#[derive(Debug, Clone, Error)]
pub enum SpiError {
    /// A required argument was absent (empty name, unnamed provider)
    #[error("Missing required argument: {argument}")]
    NullArgument { argument: &'static str },

    #[error("No measurement service provider named '{name}' found")]
    NotFound {
        name: String,
        /// Provider names present when the lookup ran, in preference order
        available: Vec<String>,
    },

    #[error("No measurement service provider found")]
    NoProviderAvailable,

    #[error("Provider discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),
}

impl SpiError {
    pub fn code(&self) -> &'static str {
        match self {
            SpiError::NullArgument { .. } => codes::NULL_ARGUMENT,
            SpiError::NotFound { .. } => codes::NOT_FOUND,
            SpiError::NoProviderAvailable => codes::NO_PROVIDER,
            SpiError::Discovery(_) => codes::DISCOVERY_FAILED,
        }
    }

    /// Hint for fixing the misconfiguration behind this error
    pub fn suggestion(&self) -> String {
        match self {
            SpiError::NullArgument { argument } => {
                format!("Pass a non-empty {}", argument)
            }
            SpiError::NotFound { available, .. } if available.is_empty() => {
                "No providers registered".to_string()
            }
            SpiError::NotFound { available, .. } => {
                format!("Available: {}", available.join(", "))
            }
            SpiError::NoProviderAvailable => {
                "No providers registered; link a provider crate or set one explicitly".to_string()
            }
            SpiError::Discovery(_) => {
                "Check the discovery source; the next call retries discovery".to_string()
            }
        }
    }

    /// Serializable view of this error
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code().to_string(),
            message: self.to_string(),
            suggestion: Some(self.suggestion()),
        }
    }
}

/// Flat, serializable form of an [`SpiError`] for hosts that log or ship errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}
