//! Streaming chat response: chunk inspection and a size-capped content buffer.

use serde_json::Value;

use super::ModelError;

/// Max content size (2MB) to prevent unbounded memory growth from malformed streams.
pub(super) const MAX_CONTENT_BYTES: usize = 2 * 1024 * 1024;

/// Error object carried by a streamed chunk (OpenRouter reports mid-stream failures this way).
pub(super) fn chunk_error(chunk: &Value) -> Option<ModelError> {
    chunk.get("error").map(ModelError::from_payload)
}

/// Text delta of the first choice, if the chunk carries one.
pub(super) fn chunk_content(chunk: &Value) -> Option<&str> {
    chunk
        .get("choices")?
        .as_array()?
        .first()?
        .get("delta")?
        .get("content")?
        .as_str()
        .filter(|s| !s.is_empty())
}

/// Accumulated completion text.
#[derive(Debug, Default)]
pub(super) struct Completion {
    pub content: String,
    pub truncated: bool,
}

impl Completion {
    /// Append a delta. Returns false once the size cap is reached.
    pub fn push(&mut self, delta: &str) -> bool {
        if self.content.len() + delta.len() > MAX_CONTENT_BYTES {
            self.truncated = true;
            return false;
        }
        self.content.push_str(delta);
        true
    }
}
