//! Response Normalizer: raw outcome -> `Result<T, ErrorResponse>`.
//!
//! A pure mapping with no retries:
//! 1. transport failure -> generic failure (`statusCode: -1`);
//! 2. non-2xx -> the body parsed as `ErrorResponse`, or the generic failure;
//! 3. 2xx -> the body parsed as `T`, or the generic failure.
//!
//! An empty 2xx body reads as JSON `null`. Text responses hand the raw body
//! to `T` as a JSON string.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::ErrorResponse;
use crate::http::{HttpResponse, Outcome};

/// How a 2xx body is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Json,
    Text,
}

pub fn normalize<T: DeserializeOwned>(outcome: Outcome, kind: ResponseKind) -> Result<T, ErrorResponse> {
    let response = match outcome {
        Ok(response) => response,
        Err(err) => {
            debug!(kind = ?err.kind, message = %err.message, "transport failure");
            return Err(ErrorResponse::generic());
        }
    };
    if response.is_success() {
        decode_success(&response, kind)
    } else {
        Err(decode_failure(&response))
    }
}

fn decode_success<T: DeserializeOwned>(response: &HttpResponse, kind: ResponseKind) -> Result<T, ErrorResponse> {
    let decoded = match kind {
        ResponseKind::Text => serde_json::from_value(Value::String(response.body.clone())),
        ResponseKind::Json if response.body.trim().is_empty() => serde_json::from_value(Value::Null),
        ResponseKind::Json => serde_json::from_str(&response.body),
    };
    decoded.map_err(|e| {
        debug!(status = response.status, error = %e, "unexpected success body");
        ErrorResponse::generic()
    })
}

fn decode_failure(response: &HttpResponse) -> ErrorResponse {
    serde_json::from_str(&response.body).unwrap_or_else(|e| {
        debug!(status = response.status, error = %e, "unstructured error body");
        ErrorResponse::generic()
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::http::{TransportError, TransportErrorKind};

    #[derive(Debug, PartialEq, Deserialize)]
    struct Item {
        id: String,
    }

    #[test]
    fn success_returns_payload_unchanged() {
        let body = r#"{"data":[{"id":"1"},{"id":"2"}],"extra":true}"#;
        let value: Value = normalize(Ok(HttpResponse::new(200, body)), ResponseKind::Json).unwrap();
        assert_eq!(value, serde_json::from_str::<Value>(body).unwrap());
    }

    #[test]
    fn success_decodes_typed_payload() {
        let item: Item = normalize(Ok(HttpResponse::new(201, r#"{"id":"7"}"#)), ResponseKind::Json).unwrap();
        assert_eq!(item, Item { id: "7".into() });
    }

    #[test]
    fn failure_with_structured_body_is_preserved() {
        let body = r#"{"message":"INVALID_LOGIN_DATA","error":"Bad Request","statusCode":400}"#;
        let err = normalize::<Value>(Ok(HttpResponse::new(400, body)), ResponseKind::Json).unwrap_err();
        assert_eq!(
            err,
            ErrorResponse {
                message: "INVALID_LOGIN_DATA".into(),
                error: "Bad Request".into(),
                status_code: 400,
            }
        );
    }

    #[test]
    fn failure_with_unstructured_body_is_generic() {
        let err = normalize::<Value>(Ok(HttpResponse::new(502, "<html>bad gateway</html>")), ResponseKind::Json)
            .unwrap_err();
        assert_eq!(err, ErrorResponse::generic());
    }

    #[test]
    fn malformed_success_body_is_generic() {
        let err = normalize::<Item>(Ok(HttpResponse::new(200, "not json")), ResponseKind::Json).unwrap_err();
        assert_eq!(err, ErrorResponse::generic());
        let err = normalize::<Item>(Ok(HttpResponse::new(200, r#"{"id":5}"#)), ResponseKind::Json).unwrap_err();
        assert_eq!(err, ErrorResponse::generic());
    }

    #[test]
    fn transport_failure_is_generic() {
        let outcome = Err(TransportError::new(TransportErrorKind::Timeout, "deadline elapsed"));
        let err = normalize::<Value>(outcome, ResponseKind::Json).unwrap_err();
        assert_eq!(err, ErrorResponse::generic());
    }

    #[test]
    fn empty_success_body_reads_as_null() {
        let value: Option<Item> = normalize(Ok(HttpResponse::new(204, "")), ResponseKind::Json).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn text_kind_takes_raw_body() {
        let html: String =
            normalize(Ok(HttpResponse::new(200, "<h1>Terms</h1>")), ResponseKind::Text).unwrap();
        assert_eq!(html, "<h1>Terms</h1>");
    }
}
