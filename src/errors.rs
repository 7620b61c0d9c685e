use std::fmt;

/// Application-specific error types.
///
/// Collaborator errors carry the upstream classification so batch reports can
/// distinguish key problems from quota/rate-limit/transient conditions.
#[derive(Debug, Clone)]
pub enum LeadGenError {
    /// The upstream API rejected our credentials.
    InvalidApiKey(String),
    /// The upstream account has exhausted its quota.
    QuotaExceeded(String),
    /// The upstream API throttled the request.
    RateLimitExceeded(String),
    /// A retriable upstream failure (5xx, timeout, open circuit).
    TransientUpstream(String),
    /// A candidate record missing required identity fields.
    MalformedCandidate(String),
    /// Local misuse: an invalid generation request.
    InvalidRequest(String),
    /// Internal error.
    Internal(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<LeadGenError>,
        /// Additional context message.
        context: String,
    },
}

impl fmt::Display for LeadGenError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeadGenError::InvalidApiKey(msg) => write!(f, "Invalid API key: {}", msg),
            LeadGenError::QuotaExceeded(msg) => write!(f, "Quota exceeded: {}", msg),
            LeadGenError::RateLimitExceeded(msg) => write!(f, "Rate limit exceeded: {}", msg),
            LeadGenError::TransientUpstream(msg) => write!(f, "Transient upstream failure: {}", msg),
            LeadGenError::MalformedCandidate(msg) => write!(f, "Malformed candidate: {}", msg),
            LeadGenError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            LeadGenError::Internal(msg) => write!(f, "Internal error: {}", msg),
            LeadGenError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for LeadGenError {}

impl LeadGenError {
    /// Wire code reported in batch failure tallies.
    pub fn code(&self) -> &'static str {
        match self {
            LeadGenError::InvalidApiKey(_) => "invalid_api_key",
            LeadGenError::QuotaExceeded(_) => "quota_exceeded",
            LeadGenError::RateLimitExceeded(_) => "rate_limit_exceeded",
            LeadGenError::TransientUpstream(_) => "transient_upstream_failure",
            LeadGenError::MalformedCandidate(_) => "malformed_candidate",
            LeadGenError::InvalidRequest(_) => "invalid_request",
            LeadGenError::Internal(_) => "internal",
            LeadGenError::WithContext { source, .. } => source.code(),
        }
    }

    /// Whether a bounded retry is worth attempting.
    pub fn is_transient(&self) -> bool {
        match self {
            LeadGenError::RateLimitExceeded(_) | LeadGenError::TransientUpstream(_) => true,
            LeadGenError::WithContext { source, .. } => source.is_transient(),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for LeadGenError {
    /// Converts a `reqwest::Error` into a `LeadGenError`.
    ///
    /// Transport-level failures (connect errors, timeouts) are retriable.
    fn from(err: reqwest::Error) -> Self {
        LeadGenError::TransientUpstream(err.to_string())
    }
}

impl From<serde_json::Error> for LeadGenError {
    /// Converts a `serde_json::Error` into a `LeadGenError`.
    fn from(err: serde_json::Error) -> Self {
        LeadGenError::Internal(format!("JSON error: {}", err))
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `LeadGenError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    ///
    /// # Arguments
    ///
    /// * `context` - The context message to add.
    fn context(self, context: impl Into<String>) -> Result<T, LeadGenError>;

    /// Add context lazily (only evaluated on error).
    ///
    /// # Arguments
    ///
    /// * `f` - A closure that produces the context message.
    fn with_context<F>(self, f: F) -> Result<T, LeadGenError>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T, LeadGenError> {
    fn context(self, context: impl Into<String>) -> Result<T, LeadGenError> {
        self.map_err(|e| LeadGenError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, LeadGenError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| LeadGenError::WithContext {
            source: Box::new(e),
            context: f(),
        })
    }
}

/// Extension for reqwest::Error to add context
impl<T> ResultExt<T> for Result<T, reqwest::Error> {
    fn context(self, context: impl Into<String>) -> Result<T, LeadGenError> {
        self.map_err(|e| LeadGenError::WithContext {
            source: Box::new(LeadGenError::from(e)),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, LeadGenError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| LeadGenError::WithContext {
            source: Box::new(LeadGenError::from(e)),
            context: f(),
        })
    }
}
