use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad class of a failed API call, derived from its HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Status 0: the server could not be reached.
    Network,
    /// 400 and 422.
    Validation,
    /// 401: bad credentials or expired session.
    Auth,
    /// 403: insufficient role.
    Permission,
    NotFound,
    /// 5xx.
    Server,
    Other,
}

impl ErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            0 => ErrorKind::Network,
            400 | 422 => ErrorKind::Validation,
            401 => ErrorKind::Auth,
            403 => ErrorKind::Permission,
            404 => ErrorKind::NotFound,
            500..=599 => ErrorKind::Server,
            _ => ErrorKind::Other,
        }
    }
}

/// Normalized API failure: an HTTP status (0 when unreachable) and a
/// message fit for display.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message} (status {status})")]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Error for a failed resource call. The backend message wins when it
    /// supplied one.
    pub fn from_response(status: u16, backend_message: Option<String>) -> Self {
        let message = backend_message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| status_message(status));
        Self::new(status, message)
    }

    /// Error for a failed login or registration call.
    pub fn for_auth(status: u16, backend_message: Option<String>) -> Self {
        let message = backend_message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| auth_status_message(status));
        Self::new(status, message)
    }

    /// The request never produced a response.
    pub fn unreachable() -> Self {
        Self::new(0, status_message(0))
    }

    pub fn validation(detail: impl std::fmt::Display) -> Self {
        Self::new(422, format!("Validation error: {}", detail))
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::from_status(self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// Display text for a status when the backend body carries none.
pub fn status_message(status: u16) -> String {
    match status {
        400 => "Invalid request".to_string(),
        401 => "Unauthorized. Please sign in again.".to_string(),
        403 => "Access denied. Insufficient permissions.".to_string(),
        404 => "Resource not found".to_string(),
        422 => "Validation error".to_string(),
        500 => "Server error. Please try again later.".to_string(),
        0 => "Unable to reach the server".to_string(),
        other => format!("Error: {}", other),
    }
}

/// Display text for login and registration failures.
pub fn auth_status_message(status: u16) -> String {
    match status {
        400 => "Invalid request".to_string(),
        401 => "Invalid email or password".to_string(),
        0 => "Unable to reach the server".to_string(),
        _ => "Authentication failed. Please try again.".to_string(),
    }
}

/// Pulls a human readable message out of an error body.
///
/// Accepts `{"message": ".."}` and `{"error": ".."}`; anything else yields
/// `None`.
pub fn message_from_body(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}
