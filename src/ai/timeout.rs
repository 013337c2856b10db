//! Unified Timeout Configuration
//!
//! Provides a centralized timeout management system with:
//! - Operation-specific timeout defaults
//! - A helper for wrapping async operations
//!
//! The helper is generic over the error type so provider calls can surface
//! a `ProviderError` and store operations a `CaseError` from the same code.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::ai::timeout::{TimeoutConfig, with_timeout};
//!
//! let config = TimeoutConfig::default();
//! let reply = with_timeout(
//!     config.provider_call,
//!     provider.generate(&prompt, &options),
//!     "primary provider call",
//! ).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::constants::provider as provider_constants;
use crate::types::TimeoutElapsed;

/// Deadlines applied by the orchestrator
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Deadline for one provider call (default: 30 seconds)
    pub provider_call: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self::with_provider_call(provider_constants::CALL_TIMEOUT_SECS)
    }
}

impl TimeoutConfig {
    pub fn with_provider_call(secs: u64) -> Self {
        Self {
            provider_call: Duration::from_secs(secs),
        }
    }
}

/// Execute an async operation with a timeout
///
/// Returns `E::from(TimeoutElapsed)` if the operation doesn't complete within
/// the specified duration. The inner future is dropped on expiry.
pub async fn with_timeout<T, E, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<TimeoutElapsed>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(E::from(TimeoutElapsed {
            operation: operation_name.to_string(),
            duration: timeout,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CaseError, ProviderError, ProviderErrorKind};

    #[test]
    fn test_timeout_config_defaults() {
        assert_eq!(TimeoutConfig::default().provider_call.as_secs(), 30);
        assert_eq!(TimeoutConfig::with_provider_call(7).provider_call.as_secs(), 7);
    }

    #[tokio::test]
    async fn test_with_timeout_success() {
        let result = with_timeout(
            Duration::from_secs(1),
            async { Ok::<_, CaseError>(42) },
            "test",
        )
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_timeout_provider_error() {
        let result: Result<(), ProviderError> = with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            },
            "slow call",
        )
        .await;
        let err = result.unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::Timeout);
        assert!(err.message.contains("slow call"));
    }

    #[tokio::test]
    async fn test_with_timeout_case_error() {
        let result: Result<u8, CaseError> = with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(1)
            },
            "sleep",
        )
        .await;
        assert!(matches!(result, Err(CaseError::Timeout { .. })));
    }
}
