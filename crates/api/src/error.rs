//! Failure taxonomy for PubChem requests.

use reqwest::StatusCode;
use thiserror::Error;

/// Error returned by the retrying executor and the typed client calls.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The endpoint answered with a status that will never succeed for this
    /// request (400, 401, 403, 404, 405, 410). Never retried.
    #[error("permanent HTTP {status} for {path}")]
    Permanent { status: StatusCode, path: String },

    /// Every attempt was answered with 429.
    #[error("rate limited on {path}; gave up after {attempts} attempts")]
    RateLimitExhausted { path: String, attempts: u32 },

    /// Every attempt hit a server error or a transport failure.
    #[error("transient failure on {path}; gave up after {attempts} attempts: {last_error}")]
    TransientExhausted {
        path: String,
        attempts: u32,
        last_error: String,
    },

    /// A 2xx body that does not decode into the expected shape.
    #[error(transparent)]
    Malformed(#[from] MalformedResponse),
}

impl FetchError {
    /// True for a 404 answer, which callers treat as "no data".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Permanent { status, .. } if *status == StatusCode::NOT_FOUND)
    }

    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Permanent { .. })
    }

    /// Retries were spent; the condition may clear later.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::RateLimitExhausted { .. } | Self::TransientExhausted { .. })
    }
}

/// Error returned when strict JSON decoding of a successful response fails.
#[derive(Debug, Error)]
#[error("malformed response from {path}: {source}. body preview: {body_preview}")]
pub struct MalformedResponse {
    path: String,
    #[source]
    source: serde_json::Error,
    body_preview: String,
}

impl MalformedResponse {
    pub fn new(path: impl Into<String>, source: serde_json::Error, body: &[u8]) -> Self {
        Self {
            path: path.into(),
            source,
            body_preview: truncate_response_preview(&String::from_utf8_lossy(body), 200),
        }
    }

    /// Access the truncated response preview captured during decoding.
    pub fn body_preview(&self) -> &str {
        &self.body_preview
    }
}

fn truncate_response_preview(text: &str, limit: usize) -> String {
    if text.trim().is_empty() {
        return "<empty>".to_string();
    }

    let mut preview = String::new();
    for ch in text.chars() {
        if preview.len() >= limit {
            preview.push_str("...");
            break;
        }
        match ch {
            '\n' | '\r' | '\t' => {
                if !preview.ends_with(' ') {
                    preview.push(' ');
                }
            }
            _ => preview.push(ch),
        }
    }

    preview.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_permanent_but_not_exhausted() {
        let error = FetchError::Permanent {
            status: StatusCode::NOT_FOUND,
            path: "compound/name/x/cids/JSON".into(),
        };
        assert!(error.is_not_found());
        assert!(error.is_permanent());
        assert!(!error.is_exhausted());

        let bad_request = FetchError::Permanent {
            status: StatusCode::BAD_REQUEST,
            path: "p".into(),
        };
        assert!(!bad_request.is_not_found());
    }

    #[test]
    fn malformed_preview_collapses_whitespace_and_truncates() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let body = format!("line one\n\tline two {}", "x".repeat(400));
        let error = MalformedResponse::new("p", source, body.as_bytes());
        assert!(error.body_preview().starts_with("line one line two"));
        assert!(error.body_preview().ends_with("..."));

        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(MalformedResponse::new("p", source, b"  ").body_preview(), "<empty>");
    }
}
