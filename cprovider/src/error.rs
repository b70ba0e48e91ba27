//! Failures reported by model providers.
//!
//! Each kind carries a default retry classification. HTTP adapters map
//! response statuses through [`ProviderError::from_status`] and attach the
//! server's `Retry-After` hint when one is sent.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use cprovider::{ProviderError, ProviderErrorKind};
//!
//! let limited = ProviderError::from_status(429, "slow down")
//!     .with_retry_after(Duration::from_secs(2));
//! assert_eq!(limited.kind, ProviderErrorKind::RateLimited);
//! assert!(limited.retryable);
//! assert_eq!(limited.retry_after, Some(Duration::from_secs(2)));
//!
//! assert!(!ProviderError::from_status(401, "bad key").retryable);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Authentication,
    RateLimited,
    InvalidRequest,
    Timeout,
    Transport,
    Unavailable,
    /// The provider answered but the payload could not be understood.
    MalformedResponse,
    Other,
}

impl ProviderErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::Timeout | Self::Transport | Self::Unavailable
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
    pub retryable: bool,
    /// Minimum wait requested by the provider before the next attempt.
    pub retry_after: Option<Duration>,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
            retry_after: None,
        }
    }

    fn of_kind(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, message, kind.is_retryable())
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::of_kind(ProviderErrorKind::Authentication, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::of_kind(ProviderErrorKind::RateLimited, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::of_kind(ProviderErrorKind::InvalidRequest, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::of_kind(ProviderErrorKind::Timeout, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::of_kind(ProviderErrorKind::Transport, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::of_kind(ProviderErrorKind::Unavailable, message)
    }

    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self::of_kind(ProviderErrorKind::MalformedResponse, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::of_kind(ProviderErrorKind::Other, message)
    }

    /// Classifies a non-success HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let kind = match status {
            401 | 403 => ProviderErrorKind::Authentication,
            429 => ProviderErrorKind::RateLimited,
            408 | 504 => ProviderErrorKind::Timeout,
            400 | 404 | 422 => ProviderErrorKind::InvalidRequest,
            502 | 503 => ProviderErrorKind::Unavailable,
            _ => ProviderErrorKind::Transport,
        };
        Self::of_kind(kind, message)
    }

    pub fn with_retry_after(mut self, delay: Duration) -> Self {
        self.retry_after = Some(delay);
        self
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ProviderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_to_kinds() {
        for (status, kind) in [
            (401, ProviderErrorKind::Authentication),
            (403, ProviderErrorKind::Authentication),
            (429, ProviderErrorKind::RateLimited),
            (408, ProviderErrorKind::Timeout),
            (504, ProviderErrorKind::Timeout),
            (400, ProviderErrorKind::InvalidRequest),
            (422, ProviderErrorKind::InvalidRequest),
            (503, ProviderErrorKind::Unavailable),
            (500, ProviderErrorKind::Transport),
        ] {
            assert_eq!(ProviderError::from_status(status, "x").kind, kind, "{status}");
        }
    }

    #[test]
    fn only_transient_kinds_are_retryable() {
        assert!(ProviderError::unavailable("down").retryable);
        assert!(!ProviderError::invalid_request("bad schema").retryable);
        assert!(!ProviderError::malformed_response("not json").retryable);
        assert_eq!(ProviderError::timeout("slow").retry_after, None);
    }
}
