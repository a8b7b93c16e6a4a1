//! Unified error type for client operations.
//!
//! Authorization and validation failures are resolved synchronously and
//! never touch the store. Remote failures trigger the rollback path in the
//! mutation executor before being surfaced here. Persistence corruption is
//! deliberately absent: a cart that fails to load is an empty cart, not an
//! error.

use thiserror::Error;

use crate::gateway::GatewayError;

/// Client-level error type for storefront operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No session identity present for an operation that requires one.
    /// The mutation was refused before any side effect.
    #[error("Not signed in")]
    Unauthorized,

    /// Malformed input caught before commit.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The remote write was rejected or unreachable; the local store has
    /// been rolled back to its pre-mutation value.
    #[error("Remote error: {0}")]
    Remote(#[from] GatewayError),
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::Validation("quantity must be positive".to_string());
        assert_eq!(err.to_string(), "Validation error: quantity must be positive");

        let err = ClientError::Unauthorized;
        assert_eq!(err.to_string(), "Not signed in");
    }

    #[test]
    fn test_gateway_error_converts() {
        let err: ClientError = GatewayError::NotFound("product 3".to_string()).into();
        assert!(matches!(err, ClientError::Remote(GatewayError::NotFound(_))));
    }
}
