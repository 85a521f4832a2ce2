//! Error types for the RAGScope core library.
//!
//! Uses `thiserror` for the public error type. Every failure a submission can hit
//! (local validation, backend status, transport, malformed payload) is a variant here,
//! and [`RagscopeError::user_message`] collapses each one into the single string the
//! session stores in its `Failed` state.

/// Maximum number of characters of a failed response body shown to the user.
pub const BODY_PREVIEW_CHARS: usize = 200;

/// Message shown when the backend answers with a body that cannot be decoded.
pub const MALFORMED_RESPONSE_MESSAGE: &str =
    "The RAG backend returned a response that could not be understood.";

/// Top-level error type for the RAGScope core library.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RagscopeError {
    /// Local, pre-network rejection of the current parameters.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// The backend answered with a non-success HTTP status.
    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// No response was received at all.
    #[error("Connection error for {url}: {message}")]
    Connection { url: String, message: String },

    /// The response body was not a valid pipeline result.
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl RagscopeError {
    /// Shorthand for the blank-query rejection.
    pub fn empty_query() -> Self {
        Self::Validation {
            message: "Please enter a question before running the pipeline.".to_string(),
        }
    }

    /// Build a backend error from a status code and the raw response body.
    ///
    /// The body is cut to [`BODY_PREVIEW_CHARS`] characters. An empty body falls back
    /// to the status line so the message is never blank.
    pub fn backend(status: u16, body: &str) -> Self {
        let preview = body_preview(body);
        let message = if preview.is_empty() {
            format!("HTTP {}", status)
        } else {
            preview
        };
        Self::Backend { status, message }
    }

    /// The single user-facing message for this error. Raw transport and parser
    /// details are not included; they go to the log instead.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message } => message.clone(),
            Self::Backend { message, .. } => message.clone(),
            Self::Connection { url, .. } => format!(
                "Could not reach the RAG backend at {}. Is it running and reachable?",
                url
            ),
            Self::MalformedResponse { .. } => MALFORMED_RESPONSE_MESSAGE.to_string(),
            Self::Config { message } => format!("Configuration problem: {}", message),
        }
    }

    /// Whether this failure happened before any network call was attempted.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::Config { .. })
    }
}

/// Trim and truncate a response body to at most [`BODY_PREVIEW_CHARS`] characters,
/// always cutting on a char boundary.
pub fn body_preview(body: &str) -> String {
    body.trim().chars().take(BODY_PREVIEW_CHARS).collect()
}

/// A type alias for results using [`RagscopeError`].
pub type Result<T> = std::result::Result<T, RagscopeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_backend() {
        let err = RagscopeError::backend(500, "internal error");
        assert_eq!(err.to_string(), "Backend error (500): internal error");
    }

    #[test]
    fn test_backend_user_message_is_body_preview() {
        let err = RagscopeError::backend(500, "internal error");
        assert_eq!(err.user_message(), "internal error");
    }

    #[test]
    fn test_backend_empty_body_falls_back_to_status() {
        let err = RagscopeError::backend(502, "   ");
        assert_eq!(err.user_message(), "HTTP 502");
    }

    #[test]
    fn test_body_preview_truncates_to_limit() {
        let body = "x".repeat(500);
        assert_eq!(body_preview(&body).chars().count(), BODY_PREVIEW_CHARS);
    }

    #[test]
    fn test_body_preview_respects_char_boundaries() {
        let body = "é".repeat(300);
        let preview = body_preview(&body);
        assert_eq!(preview.chars().count(), BODY_PREVIEW_CHARS);
        assert!(preview.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_connection_message_is_distinct_from_backend() {
        let err = RagscopeError::Connection {
            url: "http://localhost:8000/rag/debug".into(),
            message: "tcp connect error".into(),
        };
        let msg = err.user_message();
        assert!(msg.contains("Could not reach"));
        assert!(msg.contains("http://localhost:8000/rag/debug"));
        assert!(!msg.contains("tcp connect error"));
    }

    #[test]
    fn test_malformed_message_hides_parser_detail() {
        let err = RagscopeError::MalformedResponse {
            message: "expected value at line 1 column 1".into(),
        };
        assert_eq!(err.user_message(), MALFORMED_RESPONSE_MESSAGE);
    }

    #[test]
    fn test_is_local() {
        assert!(RagscopeError::empty_query().is_local());
        assert!(!RagscopeError::backend(500, "boom").is_local());
    }
}
