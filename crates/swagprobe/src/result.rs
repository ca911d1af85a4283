//! Result and error types for swagprobe.

use thiserror::Error;

/// Result type for swagprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving or asserting against a page
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Credential fixture lookup miss
    #[error("No credential registered under key '{key}'")]
    CredentialNotFound {
        /// Requested fixture key
        key: String,
    },

    /// Expected condition never observed within its budget
    #[error("Expectation '{expectation}' not met within {timeout_ms}ms (last observed: {last_observed})")]
    AssertionTimeout {
        /// Human-readable expectation
        expectation: String,
        /// Last value observed before the deadline
        last_observed: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Element never became actionable for a click/fill/select
    #[error("Cannot {action} {locator} within {timeout_ms}ms (last observed: {last_observed})")]
    ActionTimeout {
        /// Action name
        action: String,
        /// Locator description
        locator: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
        /// Last observed element state
        last_observed: String,
    },

    /// Whole scenario exceeded its budget
    #[error("Scenario '{name}' exceeded {timeout_ms}ms")]
    ScenarioTimeout {
        /// Scenario name
        name: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// Target and condition do not fit together
    #[error("Invalid expectation: {message}")]
    InvalidExpectation {
        /// Error message
        message: String,
    },

    /// URL pattern failed to compile
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// Offending pattern
        pattern: String,
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// Page error (transport, evaluation, input dispatch)
    #[error("Page error: {message}")]
    PageError {
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    ScreenshotError {
        /// Error message
        message: String,
    },

    /// Fixture error (malformed credential file)
    #[error("Fixture error: {message}")]
    FixtureError {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProbeError {
    /// Create a page error
    #[must_use]
    pub fn page(message: impl Into<String>) -> Self {
        Self::PageError {
            message: message.into(),
        }
    }

    /// Whether this error came from a deadline rather than a hard failure
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::AssertionTimeout { .. } | Self::ActionTimeout { .. } | Self::ScenarioTimeout { .. }
        )
    }
}
