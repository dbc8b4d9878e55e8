//! # Decode Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps decode failures to HTTP status codes and a JSON error envelope with
//! a machine-readable code, a message naming the offending key where there
//! is one, and the field-error list for validation failures.
//!
//! Every variant here is client-correctable; schema-build failures
//! (`SchemaBuildError`) are deliberately absent — they are fatal warm-up
//! errors, not per-request responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use wireform_schema::Violations;

/// Structured JSON error response body.
///
/// All decode rejections use this format so the transport returns one
/// consistent envelope. `details` carries the field-error list for
/// validation failures and is omitted otherwise.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "UNKNOWN_KEY", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Field-level violations, present only for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Per-request decode failure.
///
/// All variants are raised synchronously from [`crate::decode`] and are
/// terminal for the request; the transport translates them via the
/// [`IntoResponse`] impl.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The content type is neither JSON nor multipart form data (415).
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// The JSON body is not syntactically valid JSON (422).
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The body is well-formed but violates the schema (422).
    #[error("body does not conform to schema:\n{0}")]
    Validation(Violations),

    /// A form key does not resolve to any schema field (422).
    #[error("unknown key '{0}'")]
    UnknownKey(String),

    /// A form key would populate a slot that already holds a value (422).
    #[error("unable to update object at key '{0}'; value already exists")]
    DuplicateKey(String),

    /// No candidate type accepted the form values for a key (422).
    #[error("failed to parse key '{key}' with candidate types [{candidates}]")]
    KeyUnmatched {
        /// The offending form key.
        key: String,
        /// Rendered candidate list, in the order they were tried.
        candidates: String,
    },
}

impl DecodeError {
    /// Return the HTTP status code and machine-readable error code.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::UnsupportedMediaType(_) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_MEDIA_TYPE")
            }
            Self::InvalidJson(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_JSON"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::UnknownKey(_) => (StatusCode::UNPROCESSABLE_ENTITY, "UNKNOWN_KEY"),
            Self::DuplicateKey(_) => (StatusCode::UNPROCESSABLE_ENTITY, "DUPLICATE_KEY"),
            Self::KeyUnmatched { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "KEY_UNMATCHED"),
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        self.status_and_code().0
    }
}

impl From<Violations> for DecodeError {
    fn from(violations: Violations) -> Self {
        Self::Validation(violations)
    }
}

impl IntoResponse for DecodeError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // All of these are the client's to fix; log for request-level
        // debugging, never as operator-facing errors.
        tracing::debug!(error = %self, status = status.as_u16(), "request rejected");

        let details = match &self {
            Self::Validation(violations) => serde_json::to_value(violations).ok(),
            _ => None,
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_media_type_is_415() {
        let err = DecodeError::UnsupportedMediaType("text/plain".to_string());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(code, "UNSUPPORTED_MEDIA_TYPE");
    }

    #[test]
    fn client_errors_are_422() {
        let errs = [
            DecodeError::UnknownKey("zzz".to_string()),
            DecodeError::DuplicateKey("a.b".to_string()),
            DecodeError::KeyUnmatched {
                key: "a".to_string(),
                candidates: "record X".to_string(),
            },
        ];
        for err in errs {
            assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[test]
    fn messages_name_the_offending_key() {
        assert!(DecodeError::UnknownKey("zzz".to_string())
            .to_string()
            .contains("zzz"));
        assert!(DecodeError::DuplicateKey("a.b".to_string())
            .to_string()
            .contains("value already exists"));
    }

    // ── into_response tests ──────────────────────────────────────

    use http_body_util::BodyExt;

    /// Helper to extract status and body from a Response.
    async fn response_parts(err: DecodeError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn into_response_unsupported_media_type() {
        let (status, body) =
            response_parts(DecodeError::UnsupportedMediaType("text/plain".to_string())).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["error"]["code"], "UNSUPPORTED_MEDIA_TYPE");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("text/plain"));
        assert!(body["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn into_response_unknown_key() {
        let (status, body) = response_parts(DecodeError::UnknownKey("zzz".to_string())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "UNKNOWN_KEY");
        assert!(body["error"]["message"].as_str().unwrap().contains("zzz"));
    }

    #[tokio::test]
    async fn into_response_validation_carries_field_details() {
        use wireform_schema::{validate, PendingValue, SchemaType};

        let violations = validate(
            &SchemaType::Sequence(Box::new(SchemaType::Int)),
            &PendingValue::Json(serde_json::json!(["x"])),
        )
        .unwrap_err();
        let (status, body) = response_parts(DecodeError::Validation(violations)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        let details = body["error"]["details"].as_array().unwrap();
        assert_eq!(details[0]["path"], "[0]");
    }
}
