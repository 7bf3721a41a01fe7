//! Error types for the IDBlock API client.
//!
//! # Design
//! Every network operation returns `Result<T, ApiError>`. Application and
//! transport failures share one shape, `ErrorResponse`, exactly as the backend
//! reports them; transport failures carry `statusCode: -1`. Authentication
//! failure is its own variant because it never reaches the caller's declared
//! failure type: the Session Guard turns it into `Unauthenticated`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Message used whenever no structured error body is available.
pub const GENERIC_MESSAGE: &str = "Something went wrong!";

/// Status code reported for failures that never produced an HTTP status.
pub const TRANSPORT_STATUS: i32 = -1;

/// Structured error body produced by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub message: String,
    pub error: String,
    pub status_code: i32,
}

impl ErrorResponse {
    /// The failure used for transport errors and unparseable bodies.
    pub fn generic() -> Self {
        Self {
            message: GENERIC_MESSAGE.to_string(),
            error: "Error".to_string(),
            status_code: TRANSPORT_STATUS,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.status_code == TRANSPORT_STATUS
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.error, self.status_code, self.message)
    }
}

/// Errors returned by client operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// No active session, or the server answered 401 and the session was torn down.
    #[error("unauthenticated")]
    Unauthenticated,

    /// The call failed; `statusCode` is -1 for transport and parse failures.
    #[error("request failed: {0}")]
    Response(ErrorResponse),

    /// The request could not be constructed (non-serializable body, bad header).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// HTTP status of the failure, if one was observed.
    pub fn status_code(&self) -> Option<i32> {
        match self {
            ApiError::Unauthenticated => Some(401),
            ApiError::Response(body) if !body.is_transport() => Some(body.status_code),
            _ => None,
        }
    }

    pub fn error_response(&self) -> Option<&ErrorResponse> {
        match self {
            ApiError::Response(body) => Some(body),
            _ => None,
        }
    }
}

impl From<ErrorResponse> for ApiError {
    fn from(body: ErrorResponse) -> Self {
        ApiError::Response(body)
    }
}

/// Errors from token persistence backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O error at {path}: {message}")]
    Io { path: String, message: String },

    #[error("storage serialization error: {0}")]
    Serialization(String),
}

/// Errors raised while reading client configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("invalid API origin {origin:?}: {message}")]
    InvalidOrigin { origin: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_failure_shape() {
        let body = ErrorResponse::generic();
        assert_eq!(body.message, "Something went wrong!");
        assert_eq!(body.error, "Error");
        assert_eq!(body.status_code, -1);
        assert!(body.is_transport());
    }

    #[test]
    fn error_response_uses_camel_case_on_the_wire() {
        let json = serde_json::to_value(ErrorResponse::generic()).unwrap();
        assert_eq!(json["statusCode"], -1);
        assert!(json.get("status_code").is_none());
    }

    #[test]
    fn status_code_hides_transport_marker() {
        assert_eq!(ApiError::Response(ErrorResponse::generic()).status_code(), None);
        let not_found = ErrorResponse {
            message: "missing".into(),
            error: "Not Found".into(),
            status_code: 404,
        };
        assert_eq!(ApiError::from(not_found).status_code(), Some(404));
        assert_eq!(ApiError::Unauthenticated.status_code(), Some(401));
    }
}
