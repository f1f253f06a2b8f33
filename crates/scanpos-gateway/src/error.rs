//! # Gateway Error Types
//!
//! Failures reported by external collaborators.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Gateway Error Categories                           │
//! │                                                                         │
//! │  Unavailable       provider unreachable / down        → HTTP 502       │
//! │  InvalidResponse   provider answered with garbage     → HTTP 502       │
//! │  Rejected          provider refused this request      → business path  │
//! │                    (bad signature, order mismatch)     (invoice stays   │
//! │                                                         pending)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The provider could not be reached.
    #[error("{service} unavailable: {reason}")]
    Unavailable {
        service: &'static str,
        reason: String,
    },

    /// The provider answered, but the answer made no sense.
    #[error("Invalid response from {service}: {reason}")]
    InvalidResponse {
        service: &'static str,
        reason: String,
    },

    /// The provider refused the request. Not an outage.
    #[error("Rejected: {0}")]
    Rejected(String),
}

impl GatewayError {
    pub fn unavailable(service: &'static str, reason: impl Into<String>) -> Self {
        GatewayError::Unavailable {
            service,
            reason: reason.into(),
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        GatewayError::Rejected(reason.into())
    }

    /// `true` when the failure is the provider's fault rather than the
    /// request's.
    pub fn is_outage(&self) -> bool {
        !matches!(self, GatewayError::Rejected(_))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = GatewayError::unavailable("payment gateway", "connection refused");
        assert_eq!(err.to_string(), "payment gateway unavailable: connection refused");

        let err = GatewayError::rejected("signature mismatch");
        assert_eq!(err.to_string(), "Rejected: signature mismatch");
    }

    #[test]
    fn test_is_outage() {
        assert!(GatewayError::unavailable("whatsapp", "down").is_outage());
        assert!(GatewayError::InvalidResponse {
            service: "email",
            reason: "empty body".into()
        }
        .is_outage());
        assert!(!GatewayError::rejected("bad signature").is_outage());
    }
}
