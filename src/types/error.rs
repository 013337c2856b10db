//! Unified Error Type System
//!
//! Centralized error types for the analysis pipeline.
//!
//! Two families live here:
//!
//! - [`ProviderError`]: everything an upstream text-generation provider can
//!   do wrong. These are always absorbed by the orchestrator, which advances
//!   to the next provider or to fallback synthesis. They never reach a caller.
//! - [`CaseError`]: the crate-wide error. Only invalid input and storage
//!   failures are ever surfaced from [`crate::pipeline::AnalysisPipeline`].
//!
//! ## Provider Error Kinds
//!
//! - **Unauthenticated**: no credential configured, or the credential was rejected
//! - **RateLimited**: upstream quota exhausted
//! - **ModelNotFound**: the configured model id does not exist for this vendor
//! - **Timeout**: the per-call deadline elapsed
//! - **Unknown**: anything else (5xx, malformed body, transport failure)

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Provider Error Kinds
// =============================================================================

/// Classification of a failed provider attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorKind {
    /// No credential configured, or credential rejected
    Unauthenticated,
    /// Upstream rate limit or quota exhausted
    RateLimited,
    /// Model id unknown to the vendor
    ModelNotFound,
    /// Per-call deadline elapsed
    Timeout,
    /// Unclassified failure
    Unknown,
}

impl std::fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "UNAUTHENTICATED"),
            Self::RateLimited => write!(f, "RATE_LIMITED"),
            Self::ModelNotFound => write!(f, "MODEL_NOT_FOUND"),
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl ProviderErrorKind {
    /// Whether the failure should count against the provider's circuit breaker.
    ///
    /// A missing credential is a configuration state, not provider ill-health.
    pub fn trips_breaker(&self) -> bool {
        !matches!(self, Self::Unauthenticated)
    }
}

// =============================================================================
// Provider Error
// =============================================================================

/// Failed provider attempt with kind, context and retry hint
#[derive(Debug, Clone)]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
    pub provider: Option<String>,
    /// Upstream `retry-after` hint, when one was sent
    pub retry_after: Option<Duration>,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.kind, self.message)
        } else {
            write!(f, "[{}] {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for ProviderError {}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            provider: None,
            retry_after: None,
        }
    }

    pub fn with_provider(
        kind: ProviderErrorKind,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            provider: Some(provider.into()),
            retry_after: None,
        }
    }

    /// The "not configured" fast path: no credential, no I/O.
    pub fn not_configured(provider: impl Into<String>) -> Self {
        Self::with_provider(
            ProviderErrorKind::Unauthenticated,
            "no credential configured",
            provider,
        )
    }

    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn retry_after(mut self, duration: Duration) -> Self {
        self.retry_after = Some(duration);
        self
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps raw transport and HTTP failures onto [`ProviderErrorKind`]
pub struct ProviderErrorClassifier;

impl ProviderErrorClassifier {
    /// Classify an HTTP error status together with its response body
    pub fn classify_http_status(status: u16, body: &str, provider: &str) -> ProviderError {
        let message = format!("HTTP {}: {}", status, truncate_body(body));
        match status {
            401 | 403 => {
                ProviderError::with_provider(ProviderErrorKind::Unauthenticated, message, provider)
            }
            429 => ProviderError::with_provider(ProviderErrorKind::RateLimited, message, provider),
            404 => ProviderError::with_provider(ProviderErrorKind::ModelNotFound, message, provider),
            408 | 504 => {
                ProviderError::with_provider(ProviderErrorKind::Timeout, message, provider)
            }
            400 if Self::mentions_missing_model(body) => {
                ProviderError::with_provider(ProviderErrorKind::ModelNotFound, message, provider)
            }
            _ => ProviderError::with_provider(ProviderErrorKind::Unknown, message, provider),
        }
    }

    /// Classify a transport-level failure (no HTTP status available)
    pub fn classify_transport(err: &reqwest::Error, provider: &str) -> ProviderError {
        if let Some(status) = err.status() {
            return Self::classify_http_status(status.as_u16(), &err.to_string(), provider);
        }
        let kind = if err.is_timeout() {
            ProviderErrorKind::Timeout
        } else {
            ProviderErrorKind::Unknown
        };
        ProviderError::with_provider(kind, err.to_string(), provider)
    }

    /// Vendors disagree on status codes for unknown models; the body is authoritative.
    pub fn mentions_missing_model(body: &str) -> bool {
        let lower = body.to_lowercase();
        lower.contains("model_not_found")
            || (lower.contains("model") && lower.contains("does not exist"))
            || (lower.contains("model") && lower.contains("not_found_error"))
    }
}

fn truncate_body(body: &str) -> String {
    super::utils::truncate_chars(
        body,
        crate::constants::provider::ERROR_BODY_PREVIEW_CHARS,
    )
}

// =============================================================================
// Timeout
// =============================================================================

/// A deadline elapsed before the wrapped future completed.
///
/// Converted into whichever error family the caller speaks.
#[derive(Debug, Clone)]
pub struct TimeoutElapsed {
    pub operation: String,
    pub duration: Duration,
}

impl From<TimeoutElapsed> for ProviderError {
    fn from(t: TimeoutElapsed) -> Self {
        ProviderError::new(
            ProviderErrorKind::Timeout,
            format!("{} timed out after {:?}", t.operation, t.duration),
        )
    }
}

impl From<TimeoutElapsed> for CaseError {
    fn from(t: TimeoutElapsed) -> Self {
        CaseError::timeout(t.operation, t.duration)
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum CaseError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Caller-visible
    // -------------------------------------------------------------------------
    #[error("Invalid input for '{field}': {reason}")]
    InputInvalid { field: String, reason: String },

    #[error("Could not persist {kind} for case {case_id} after {attempts} attempts")]
    PersistenceConflict {
        case_id: i64,
        kind: String,
        attempts: usize,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    // -------------------------------------------------------------------------
    // Absorbed inside the pipeline
    // -------------------------------------------------------------------------
    #[error("Provider error: {0}")]
    Provider(ProviderError),

    #[error("Schema invalid: {0}")]
    SchemaInvalid(String),

    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    // -------------------------------------------------------------------------
    // Setup
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ProviderError> for CaseError {
    fn from(err: ProviderError) -> Self {
        CaseError::Provider(err)
    }
}

pub type Result<T> = std::result::Result<T, CaseError>;

impl CaseError {
    pub fn input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InputInvalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Whether this error may be shown to an end user as-is.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            Self::InputInvalid { .. }
                | Self::PersistenceConflict { .. }
                | Self::Storage(_)
                | Self::Database(_)
        )
    }

    /// Message suitable for an end user.
    ///
    /// Storage-layer failures collapse to a generic retry prompt.
    pub fn user_message(&self) -> String {
        match self {
            Self::InputInvalid { field, reason } => format!("{}: {}", field, reason),
            _ => "The analysis could not be saved. Please try again.".to_string(),
        }
    }

    /// SQLite reported contention (busy or locked), which a retry may clear.
    pub fn is_busy(&self) -> bool {
        match self {
            Self::Database(rusqlite::Error::SqliteFailure(e, _)) => matches!(
                e.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }
}

/// Context extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> Result<T>;

    /// Add context using a closure (lazy evaluation)
    fn with_context_fn<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> Result<T> {
        self.map_err(|e| CaseError::Storage(format!("{}: {}", context.into(), e)))
    }

    fn with_context_fn<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| CaseError::Storage(format!("{}: {}", f().into(), e)))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(ProviderErrorKind::RateLimited.to_string(), "RATE_LIMITED");
        assert_eq!(ProviderErrorKind::ModelNotFound.to_string(), "MODEL_NOT_FOUND");
        assert_eq!(ProviderErrorKind::Unauthenticated.to_string(), "UNAUTHENTICATED");
    }

    #[test]
    fn test_classify_http_status() {
        let auth = ProviderErrorClassifier::classify_http_status(401, "bad key", "openai");
        assert_eq!(auth.kind, ProviderErrorKind::Unauthenticated);

        let limited = ProviderErrorClassifier::classify_http_status(429, "slow down", "openai");
        assert_eq!(limited.kind, ProviderErrorKind::RateLimited);

        let missing = ProviderErrorClassifier::classify_http_status(404, "", "anthropic");
        assert_eq!(missing.kind, ProviderErrorKind::ModelNotFound);

        let server = ProviderErrorClassifier::classify_http_status(500, "oops", "openai");
        assert_eq!(server.kind, ProviderErrorKind::Unknown);
    }

    #[test]
    fn test_model_not_found_from_body() {
        let body = r#"{"error":{"code":"model_not_found","message":"The model `gpt-9` does not exist"}}"#;
        let err = ProviderErrorClassifier::classify_http_status(400, body, "openai");
        assert_eq!(err.kind, ProviderErrorKind::ModelNotFound);
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::with_provider(ProviderErrorKind::Timeout, "slow", "anthropic");
        assert_eq!(err.to_string(), "[anthropic:TIMEOUT] slow");

        let bare = ProviderError::new(ProviderErrorKind::Unknown, "boom");
        assert_eq!(bare.to_string(), "[UNKNOWN] boom");
    }

    #[test]
    fn test_not_configured_is_unauthenticated() {
        let err = ProviderError::not_configured("openai");
        assert_eq!(err.kind, ProviderErrorKind::Unauthenticated);
        assert!(!err.kind.trips_breaker());
    }

    #[test]
    fn test_user_visibility() {
        assert!(CaseError::input("description", "must not be empty").is_user_visible());
        assert!(
            CaseError::PersistenceConflict {
                case_id: 1,
                kind: "court_script".into(),
                attempts: 3
            }
            .is_user_visible()
        );
        assert!(!CaseError::SchemaInvalid("x".into()).is_user_visible());
        assert!(
            !CaseError::Provider(ProviderError::not_configured("openai")).is_user_visible()
        );
    }

    #[test]
    fn test_user_message_hides_storage_detail() {
        let err = CaseError::Storage("disk I/O error at page 42".into());
        assert!(err.user_message().contains("try again"));
        assert!(!err.user_message().contains("page 42"));
    }

    #[test]
    fn test_timeout_conversion() {
        let elapsed = TimeoutElapsed {
            operation: "primary call".into(),
            duration: Duration::from_secs(30),
        };
        let provider: ProviderError = elapsed.clone().into();
        assert_eq!(provider.kind, ProviderErrorKind::Timeout);

        let case: CaseError = elapsed.into();
        assert!(matches!(case, CaseError::Timeout { .. }));
    }

    #[test]
    fn test_is_busy() {
        let busy = CaseError::Database(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        ));
        assert!(busy.is_busy());
        assert!(!CaseError::Storage("x".into()).is_busy());
    }
}
