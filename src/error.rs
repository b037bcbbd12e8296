//! Error types for media generation.

use std::time::Duration;

/// Substring the Veo endpoints return when the selected API key no longer
/// resolves to a project that can run video generation.
pub(crate) const ENTITY_NOT_FOUND: &str = "Requested entity was not found";

const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Errors that can occur during media generation.
#[derive(Debug, thiserror::Error)]
pub enum CreativeFlowError {
    /// No API key configured.
    #[error("missing credential: {0}")]
    MissingCredential(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Delay suggested by the `Retry-After` header, if any.
        retry_after: Option<Duration>,
    },

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response did not carry the expected payload.
    #[error("not found in response: {0}")]
    NotFoundInResponse(String),

    /// The host key-selection capability is missing.
    #[error("authentication unavailable: {0}")]
    AuthUnavailable(String),

    /// The remote rejected the previously selected key.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// Video generation attempted without a selected key.
    #[error("video generation requires a selected API key")]
    AuthRequired,

    /// Invalid request parameters.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Video operation finished with an error.
    #[error("video generation failed: {0}")]
    VideoGeneration(String),

    /// Polling deadline elapsed.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Polling attempt budget exhausted.
    #[error("operation still running after {attempts} polls")]
    PollLimitExceeded {
        /// Number of status fetches made.
        attempts: u32,
    },

    /// Caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g., saving file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CreativeFlowError {
    /// Returns true if the local auth state must be reset after this error.
    pub fn invalidates_auth(&self) -> bool {
        matches!(self, Self::InvalidCredential(_))
    }

    /// Returns the suggested retry delay, if the remote supplied one.
    ///
    /// Nothing in this crate retries; this is for callers that want to tell
    /// the user when to try again.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Short message suitable for showing to the person who made the request.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredential(_) => "Please select an API key again.".to_string(),
            Self::AuthRequired => "Select an API key to enable video generation.".to_string(),
            Self::AuthUnavailable(_) => {
                "API key selection is not available in this environment.".to_string()
            }
            Self::MissingCredential(_) => "No API key is configured.".to_string(),
            Self::NotFoundInResponse(what) => format!("Generation returned {what}."),
            Self::InvalidArgument(msg) => msg.clone(),
            Self::ContentBlocked(_) => {
                "The request was blocked by safety filters. Try a different prompt.".to_string()
            }
            Self::RateLimited { .. } => "Too many requests. Try again later.".to_string(),
            Self::Timeout(_) | Self::PollLimitExceeded { .. } => {
                "Video generation took too long and was abandoned.".to_string()
            }
            Self::Cancelled => "Generation cancelled.".to_string(),
            Self::VideoGeneration(msg) => format!("Video generation failed: {msg}"),
            other => format!("Generation failed: {other}"),
        }
    }
}

/// Result type alias for media generation operations.
pub type Result<T> = std::result::Result<T, CreativeFlowError>;

/// Returns true if `text` carries the stale-key signature.
pub(crate) fn is_entity_not_found(text: &str) -> bool {
    text.contains(ENTITY_NOT_FOUND)
}

/// Parses a `Retry-After` header given in seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Redacts `key=` query values and truncates overly long remote messages.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let redacted = redact_key_params(text.trim());
    if redacted.chars().count() > MAX_ERROR_MESSAGE_LEN {
        let truncated: String = redacted.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
        format!("{truncated}...")
    } else {
        redacted
    }
}

/// Replaces the value of every `key=` parameter with `REDACTED`.
pub(crate) fn redact_key_params(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find("key=") {
        let boundary_ok = pos == 0 || matches!(rest.as_bytes()[pos - 1], b'?' | b'&');
        out.push_str(&rest[..pos + 4]);
        rest = &rest[pos + 4..];
        if boundary_ok {
            let end = rest
                .find(|c: char| c == '&' || c == '#' || c.is_whitespace() || c == '"')
                .unwrap_or(rest.len());
            out.push_str("REDACTED");
            rest = &rest[end..];
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalidates_auth() {
        assert!(CreativeFlowError::InvalidCredential("gone".into()).invalidates_auth());
        assert!(!CreativeFlowError::VideoGeneration("quota".into()).invalidates_auth());
        assert!(!CreativeFlowError::AuthRequired.invalidates_auth());
    }

    #[test]
    fn test_retry_after() {
        let rate_limited = CreativeFlowError::RateLimited {
            retry_after: Some(Duration::from_secs(60)),
        };
        assert_eq!(rate_limited.retry_after(), Some(Duration::from_secs(60)));
        assert_eq!(CreativeFlowError::Cancelled.retry_after(), None);
    }

    #[test]
    fn test_error_display() {
        let err = CreativeFlowError::Api {
            status: 500,
            message: "Internal".into(),
        };
        assert_eq!(err.to_string(), "API error: 500 - Internal");

        let err = CreativeFlowError::NotFoundInResponse("no image in response".into());
        assert_eq!(err.to_string(), "not found in response: no image in response");
    }

    #[test]
    fn test_credential_message_differs_from_video_failure() {
        let stale = CreativeFlowError::InvalidCredential(ENTITY_NOT_FOUND.into());
        let generic = CreativeFlowError::VideoGeneration(ENTITY_NOT_FOUND.into());
        assert_ne!(stale.user_message(), generic.user_message());
        assert_eq!(stale.user_message(), "Please select an API key again.");
    }

    #[test]
    fn test_entity_not_found_signature() {
        assert!(is_entity_not_found(
            r#"{"error":{"code":404,"message":"Requested entity was not found.","status":"NOT_FOUND"}}"#
        ));
        assert!(!is_entity_not_found("Model not found"));
    }

    #[test]
    fn test_redact_key_params() {
        assert_eq!(
            redact_key_params("https://x/v?alt=media&key=abc123"),
            "https://x/v?alt=media&key=REDACTED"
        );
        assert_eq!(
            redact_key_params("fetch https://x/v?key=abc failed"),
            "fetch https://x/v?key=REDACTED failed"
        );
        // Only query parameters are touched.
        assert_eq!(redact_key_params("monkey=banana"), "monkey=banana");
    }

    #[test]
    fn test_sanitize_truncates() {
        let long = "x".repeat(MAX_ERROR_MESSAGE_LEN + 10);
        let sanitized = sanitize_error_message(&long);
        assert!(sanitized.ends_with("..."));
        assert_eq!(sanitized.len(), MAX_ERROR_MESSAGE_LEN + 3);
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::RETRY_AFTER, "30".parse().unwrap());
        assert_eq!(parse_retry_after(&headers), Some(30));

        let empty = reqwest::header::HeaderMap::new();
        assert_eq!(parse_retry_after(&empty), None);
    }
}
