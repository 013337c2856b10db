//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Provider call constants
pub mod provider {
    /// Per-call timeout applied by the orchestrator (seconds)
    pub const CALL_TIMEOUT_SECS: u64 = 30;

    /// HTTP client timeout; slightly above the call timeout so the
    /// orchestrator's deadline fires first
    pub const HTTP_TIMEOUT_SECS: u64 = 35;

    /// Default sampling temperature
    pub const DEFAULT_TEMPERATURE: f32 = 0.2;

    /// Default completion size
    pub const DEFAULT_MAX_TOKENS: u32 = 1500;

    /// Maximum characters of an error body kept in messages
    pub const ERROR_BODY_PREVIEW_CHARS: usize = 300;

    pub mod openai {
        pub const DEFAULT_MODEL: &str = "gpt-4o";
        pub const FALLBACK_MODEL: &str = "gpt-4o-mini";
        pub const API_BASE: &str = "https://api.openai.com/v1";
        pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
    }

    pub mod anthropic {
        pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
        pub const FALLBACK_MODEL: &str = "claude-3-opus-20240229";
        pub const API_BASE: &str = "https://api.anthropic.com/v1";
        pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
        pub const API_VERSION: &str = "2023-06-01";
    }
}

/// Per-field confidence contributions
pub mod confidence {
    /// Field taken from a provider as-is
    pub const PROVIDER: f64 = 0.85;

    /// Field taken from a provider after JSON repair
    pub const PROVIDER_REPAIRED: f64 = 0.80;

    /// Field synthesized locally
    pub const FALLBACK: f64 = 0.60;
}

/// Prompt construction constants
pub mod prompt {
    /// Maximum characters of injected knowledge-base context
    pub const CONTEXT_CAP_CHARS: usize = 1500;

    /// Maximum characters of case description embedded verbatim
    pub const DESCRIPTION_CAP_CHARS: usize = 4000;

    /// Evidence items listed in a prompt; the rest are counted
    pub const MAX_EVIDENCE_ITEMS: usize = 20;

    /// Maximum characters per evidence item
    pub const EVIDENCE_ITEM_CAP_CHARS: usize = 300;
}

/// Analysis store constants
pub mod store {
    /// Attempts after the first when SQLite reports busy/locked
    pub const BUSY_RETRIES: usize = 3;

    /// Initial backoff between busy retries (milliseconds)
    pub const BUSY_BACKOFF_MS: u64 = 50;

    /// Cap on a single backoff step (milliseconds)
    pub const BUSY_BACKOFF_MAX_MS: u64 = 1000;

    /// Default database location relative to the working directory
    pub const DEFAULT_DB_PATH: &str = ".caseweave/analyses.db";
}

/// Circuit breaker constants
pub mod circuit_breaker {
    /// Number of failures before opening circuit
    pub const FAILURE_THRESHOLD: u32 = 5;

    /// Duration to wait before attempting recovery (seconds)
    pub const RECOVERY_TIMEOUT_SECS: u64 = 30;

    /// Maximum requests allowed in half-open state
    pub const HALF_OPEN_MAX_REQUESTS: u32 = 3;

    /// Success threshold to close circuit from half-open
    pub const SUCCESS_THRESHOLD: u32 = 2;
}

/// HTTP/Network constants
pub mod network {
    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 10;
}
