//! HTTP-specific error type wrapping reqwest failures and backend rejections.

use plugdash_domain::error::{NotFoundError, PlugDashError};
use serde_json::Value;

/// Errors originating from the REST client.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The configured base URL cannot carry a path.
    #[error("invalid base url {0:?}")]
    InvalidBaseUrl(String),

    /// Connection, timeout or body transfer failed.
    #[error("request failed")]
    Transport(#[from] reqwest::Error),

    /// The backend answered 401.
    #[error("backend rejected the credentials")]
    Unauthorized,

    /// The backend answered 404 for a known record.
    #[error(transparent)]
    NotFound(NotFoundError),

    /// Any other non-2xx answer.
    #[error("backend returned {status}: {detail}")]
    Status { status: u16, detail: String },

    /// The response body did not match the expected shape.
    #[error("unexpected response body")]
    Json(#[from] serde_json::Error),
}

impl From<HttpError> for PlugDashError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Unauthorized => Self::Unauthorized,
            HttpError::NotFound(inner) => Self::NotFound(inner),
            other => Self::Remote(Box::new(other)),
        }
    }
}

/// Human-readable message out of a FastAPI-style error body.
///
/// `{"detail": "..."}` yields the string, a validation error list yields
/// its `msg` fields joined, anything else yields the raw body.
pub(crate) fn error_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };
    match value.get("detail") {
        Some(Value::String(detail)) => detail.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.get("msg").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("; "),
        _ => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_read_string_detail() {
        assert_eq!(
            error_detail(r#"{"detail":"Incorrect username or password"}"#),
            "Incorrect username or password"
        );
    }

    #[test]
    fn should_join_validation_messages() {
        let body = r#"{"detail":[{"loc":["body","value"],"msg":"field required"},{"msg":"bad type"}]}"#;
        assert_eq!(error_detail(body), "field required; bad type");
    }

    #[test]
    fn should_fall_back_to_raw_body() {
        assert_eq!(error_detail("Internal Server Error\n"), "Internal Server Error");
        assert_eq!(error_detail(r#"{"error":"x"}"#), r#"{"error":"x"}"#);
    }

    #[test]
    fn should_map_unauthorized_and_not_found_to_domain_variants() {
        assert!(matches!(
            PlugDashError::from(HttpError::Unauthorized),
            PlugDashError::Unauthorized
        ));
        let not_found = HttpError::NotFound(NotFoundError {
            entity: "AutomationRule",
            id: "9".to_string(),
        });
        assert!(matches!(
            PlugDashError::from(not_found),
            PlugDashError::NotFound(_)
        ));
        let status = HttpError::Status {
            status: 500,
            detail: "boom".to_string(),
        };
        assert!(matches!(
            PlugDashError::from(status),
            PlugDashError::Remote(_)
        ));
    }
}
