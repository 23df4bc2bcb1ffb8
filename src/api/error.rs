//! Transport errors

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Longest server message shown to the user
const MAX_USER_MESSAGE_LENGTH: usize = 120;

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("conflict: {}", .message.as_deref().unwrap_or("duplicate value"))]
    Conflict {
        message: Option<String>,
        /// Field the server blamed, when it named one
        field: Option<String>,
    },

    #[error("request failed ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Http {
        status: u16,
        message: Option<String>,
    },

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("not signed in")]
    SessionRequired,
}

impl ApiError {
    /// Build an error from a non-success response
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let message = parsed.as_ref().and_then(server_message_of);

        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::CONFLICT => ApiError::Conflict {
                field: parsed.as_ref().and_then(conflict_field_of),
                message,
            },
            _ => ApiError::Http {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Message supplied by the server, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Conflict { message, .. } | ApiError::Http { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    /// Message for a notification: the server's message when present,
    /// otherwise `fallback`
    pub fn user_message(&self, fallback: &str) -> String {
        match self.server_message() {
            Some(msg) if !msg.trim().is_empty() => sanitize_message(msg),
            _ => fallback.to_string(),
        }
    }

    /// Rejected or missing credentials; reported by the sign-in flow, not per call
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized | ApiError::SessionRequired)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// `message`, `error` (string) or `error.message`, whichever the server sent
fn server_message_of(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .or_else(|| body.get("error").and_then(Value::as_str))
        .or_else(|| {
            body.get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
        })
        .map(str::to_string)
}

/// `field`, or the single key of `errors`/`keyValue` objects
fn conflict_field_of(body: &Value) -> Option<String> {
    if let Some(field) = body.get("field").and_then(Value::as_str) {
        return Some(field.to_string());
    }
    ["errors", "keyValue", "keyPattern"]
        .iter()
        .filter_map(|k| body.get(*k).and_then(Value::as_object))
        .find_map(|obj| obj.keys().next().cloned())
}

/// Printable characters only, truncated
fn sanitize_message(msg: &str) -> String {
    let cleaned: String = msg
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string();

    if cleaned.chars().count() > MAX_USER_MESSAGE_LENGTH {
        let truncated: String = cleaned.chars().take(MAX_USER_MESSAGE_LENGTH).collect();
        format!("{}...", truncated)
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_with_named_field() {
        let err = ApiError::from_response(
            StatusCode::CONFLICT,
            r#"{"message": "Slug already exists", "field": "slug"}"#,
        );
        match err {
            ApiError::Conflict { message, field } => {
                assert_eq!(message.as_deref(), Some("Slug already exists"));
                assert_eq!(field.as_deref(), Some("slug"));
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_conflict_field_from_key_value() {
        let err = ApiError::from_response(
            StatusCode::CONFLICT,
            r#"{"error": "duplicate key", "keyValue": {"sku": "TS-1"}}"#,
        );
        assert!(matches!(err, ApiError::Conflict { field: Some(ref f), .. } if f == "sku"));
    }

    #[test]
    fn test_unauthorized() {
        assert!(ApiError::from_response(StatusCode::UNAUTHORIZED, "").is_unauthorized());
    }

    #[test]
    fn test_user_message_prefers_server_message() {
        let err = ApiError::from_response(
            StatusCode::BAD_REQUEST,
            r#"{"error": {"message": "Price must be positive"}}"#,
        );
        assert_eq!(err.user_message("Failed to save"), "Price must be positive");

        let err = ApiError::from_response(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert_eq!(err.user_message("Failed to save"), "Failed to save");

        let err = ApiError::Transport("connection refused".to_string());
        assert_eq!(err.user_message("Failed to load tags"), "Failed to load tags");
    }

    #[test]
    fn test_user_message_is_sanitized() {
        let long = "x".repeat(300);
        let err = ApiError::Http {
            status: 400,
            message: Some(format!("bad\u{7}\n{}", long)),
        };
        let msg = err.user_message("fallback");
        assert!(msg.starts_with("badx"));
        assert!(msg.ends_with("..."));
        assert_eq!(msg.chars().count(), MAX_USER_MESSAGE_LENGTH + 3);
    }
}
