use mall_core::error::ApiError;
use thiserror::Error;

use crate::session::store::StoreError;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Normalized `{status, message}` failure, ready for display.
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Session storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response from {endpoint}: {detail}")]
    MalformedResponse { endpoint: String, detail: String },

    /// A sign-out or another sign-in landed while this call was in flight;
    /// its result was discarded.
    #[error("Session changed while the request was in flight")]
    Superseded,
}

impl ClientError {
    pub fn malformed(endpoint: &str, detail: impl std::fmt::Display) -> Self {
        ClientError::MalformedResponse {
            endpoint: endpoint.to_string(),
            detail: detail.to_string(),
        }
    }

    pub fn api(&self) -> Option<&ApiError> {
        match self {
            ClientError::Api(err) => Some(err),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.api().map(|err| err.status)
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ClientError::Api(ApiError::validation(errors))
    }
}
