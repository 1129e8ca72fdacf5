//! Error types for llmkit.
//!
//! Uses `thiserror` for structured error types.
//!
//! ## Error Taxonomy
//!
//! Errors fall into three categories:
//! - **Configuration**: a required connection parameter could not be resolved
//!   (unknown provider, missing API key, base URL, or model). These represent a
//!   caller configuration mistake that must be fixed before any request can
//!   proceed; they are never retried or swallowed.
//! - **Tracking**: usage-tracking contract violations (negative token counts,
//!   poisoned in-process locks).
//! - **Internal**: I/O and serialization failures, propagated with their
//!   original information intact rather than wrapped.
//!
//! A missing stats file is *not* an error (first use starts from zero), and a
//! corrupt stats file is recovered as zero-valued stats; neither surfaces here.

use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// High-level error categories for classification and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Configuration resolution failures (unknown provider, missing values).
    Configuration,
    /// Usage-tracking failures (invalid counts, lock errors).
    Tracking,
    /// Internal errors (I/O, serialization).
    Internal,
}

impl ErrorCategory {
    /// Returns a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Configuration => "Configuration error",
            Self::Tracking => "Usage tracking error",
            Self::Internal => "Internal error",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

// =============================================================================
// Error Type
// =============================================================================

/// Main error type for llmkit operations.
#[derive(Error, Debug)]
pub enum LlmKitError {
    // ==========================================================================
    // Configuration resolution errors (Category: Configuration)
    // ==========================================================================
    /// Provider name is not in the provider registry.
    #[error("unknown provider: {provider}")]
    UnknownProvider {
        provider: String,
    },

    /// A cloud provider was selected but no API key could be resolved.
    #[error("missing API key for {provider} (set {env_var} or pass one explicitly)")]
    MissingApiKey {
        provider: String,
        env_var: String,
    },

    /// A provider that requires an explicit base URL had none resolved.
    #[error("missing base URL for {provider}")]
    MissingBaseUrl {
        provider: String,
    },

    /// No model was configured and the provider has no known default.
    #[error("missing model for {provider}")]
    MissingModel {
        provider: String,
    },

    // ==========================================================================
    // Usage tracking errors (Category: Tracking)
    // ==========================================================================
    /// `record_usage` was called with a negative token count.
    #[error("invalid token count: {tokens} (must be >= 0)")]
    InvalidTokenCount {
        tokens: i64,
    },

    /// The in-process lock guarding a stats file was poisoned by a panic.
    #[error("usage stats lock poisoned for {path}")]
    LockPoisoned {
        path: String,
    },

    // ==========================================================================
    // I/O errors (Category: Internal)
    // ==========================================================================
    /// I/O operation failed (includes file-lock acquisition failures).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LlmKitError {
    /// Returns the error category for classification and routing.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownProvider { .. }
            | Self::MissingApiKey { .. }
            | Self::MissingBaseUrl { .. }
            | Self::MissingModel { .. } => ErrorCategory::Configuration,

            Self::InvalidTokenCount { .. }
            | Self::LockPoisoned { .. } => ErrorCategory::Tracking,

            Self::Io(_) | Self::Json(_) => ErrorCategory::Internal,
        }
    }

    /// Returns the provider name if this error is provider-specific.
    ///
    /// Lets callers render an actionable message without string parsing.
    #[must_use]
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::UnknownProvider { provider }
            | Self::MissingApiKey { provider, .. }
            | Self::MissingBaseUrl { provider }
            | Self::MissingModel { provider } => Some(provider),
            _ => None,
        }
    }

    /// Returns the name of the field that failed to resolve, if any.
    #[must_use]
    pub const fn missing_field(&self) -> Option<&'static str> {
        match self {
            Self::MissingApiKey { .. } => Some("api_key"),
            Self::MissingBaseUrl { .. } => Some("base_url"),
            Self::MissingModel { .. } => Some("model"),
            _ => None,
        }
    }
}

/// Result type alias for llmkit operations.
pub type Result<T> = std::result::Result<T, LlmKitError>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_have_correct_category() {
        let err = LlmKitError::UnknownProvider { provider: "mystery".to_string() };
        assert_eq!(err.category(), ErrorCategory::Configuration);

        let err = LlmKitError::MissingApiKey {
            provider: "openai".to_string(),
            env_var: "OPENAI_API_KEY".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);

        let err = LlmKitError::MissingBaseUrl { provider: "openai_compatible".to_string() };
        assert_eq!(err.category(), ErrorCategory::Configuration);

        let err = LlmKitError::MissingModel { provider: "openai_compatible".to_string() };
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn tracking_errors_have_correct_category() {
        let err = LlmKitError::InvalidTokenCount { tokens: -5 };
        assert_eq!(err.category(), ErrorCategory::Tracking);

        let err = LlmKitError::LockPoisoned { path: "/tmp/usage.json".to_string() };
        assert_eq!(err.category(), ErrorCategory::Tracking);
    }

    #[test]
    fn internal_errors_have_correct_category() {
        let err = LlmKitError::Json(serde_json::from_str::<()>("invalid").unwrap_err());
        assert_eq!(err.category(), ErrorCategory::Internal);

        let err = LlmKitError::Io(std::io::Error::other("boom"));
        assert_eq!(err.category(), ErrorCategory::Internal);
    }

    #[test]
    fn provider_extraction() {
        let err = LlmKitError::MissingApiKey {
            provider: "groq".to_string(),
            env_var: "GROQ_API_KEY".to_string(),
        };
        assert_eq!(err.provider(), Some("groq"));

        let err = LlmKitError::UnknownProvider { provider: "nope".to_string() };
        assert_eq!(err.provider(), Some("nope"));

        let err = LlmKitError::InvalidTokenCount { tokens: -1 };
        assert_eq!(err.provider(), None);
    }

    #[test]
    fn missing_field_names() {
        let err = LlmKitError::MissingApiKey {
            provider: "openai".to_string(),
            env_var: "OPENAI_API_KEY".to_string(),
        };
        assert_eq!(err.missing_field(), Some("api_key"));

        let err = LlmKitError::MissingBaseUrl { provider: "openai_compatible".to_string() };
        assert_eq!(err.missing_field(), Some("base_url"));

        let err = LlmKitError::MissingModel { provider: "openai_compatible".to_string() };
        assert_eq!(err.missing_field(), Some("model"));

        let err = LlmKitError::UnknownProvider { provider: "nope".to_string() };
        assert_eq!(err.missing_field(), None);
    }

    #[test]
    fn messages_include_actionable_detail() {
        let err = LlmKitError::MissingApiKey {
            provider: "openai".to_string(),
            env_var: "OPENAI_API_KEY".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("openai"));
        assert!(msg.contains("OPENAI_API_KEY"));
    }
}
