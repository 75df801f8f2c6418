//! Trust evaluation errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors raised while building or evaluating trust.
///
/// `InvalidCidr` is construction-time and fatal to the instance. The rest
/// are scoped to a single request and map onto a response status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrustError {
    #[error("invalid CIDR {value:?}: {reason}")]
    InvalidCidr { value: String, reason: String },

    /// The proxy layer handed over a peer that is not `host:port`.
    #[error("malformed peer address {0:?}")]
    MalformedPeerAddress(String),

    /// The host part is not an IP address.
    #[error("unparseable peer address {0:?}")]
    UnparseableAddress(String),

    #[error("no peer address resolved")]
    NoAddressResolved,
}

impl TrustError {
    pub fn status(&self) -> StatusCode {
        match self {
            TrustError::MalformedPeerAddress(_) | TrustError::InvalidCidr { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            TrustError::UnparseableAddress(_) => StatusCode::BAD_REQUEST,
            TrustError::NoAddressResolved => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for TrustError {
    fn into_response(self) -> Response {
        (self.status(), "Unknown source").into_response()
    }
}
