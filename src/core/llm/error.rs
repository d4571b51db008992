//! Model call errors: a readable message plus the HTTP status when one is known.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

/// Failure reported by the model boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelError {
    pub message: String,
    pub status: Option<u16>,
}

impl ModelError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    fn with_status(message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    /// Build from an `{"message": …, "code": …}` error object found in a response chunk.
    pub fn from_payload(err: &Value) -> Self {
        let message = err
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown error");
        let status = err
            .get("code")
            .and_then(|c| c.as_u64())
            .and_then(|c| u16::try_from(c).ok());
        Self::with_status(message, status)
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "API error ({}): {}", status, self.message),
            None => write!(f, "API error: {}", self.message),
        }
    }
}

impl std::error::Error for ModelError {}

fn status_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b([45]\d\d)\b").expect("status pattern is valid"))
}

/// HTTP error status mentioned in an error string, if any.
fn find_status(s: &str) -> Option<u16> {
    status_pattern()
        .captures(s)
        .and_then(|caps| caps[1].parse().ok())
}

/// Map async-openai or API errors into ModelError.
pub fn map_api_error<E: std::fmt::Display>(e: E) -> ModelError {
    let s = e.to_string();
    let status = find_status(&s);
    if status == Some(401) {
        return ModelError::with_status(
            "Authentication failed. Check OPENROUTER_API_KEY (or run `prompt-booster config set-api-key`).",
            status,
        );
    }
    if s.contains("\"error\"")
        && let Some((_, rest)) = s.split_once("\"message\":\"")
        && let Some((msg, _)) = rest.split_once('"')
    {
        return ModelError::with_status(msg, status);
    }
    ModelError::with_status(s, status)
}
