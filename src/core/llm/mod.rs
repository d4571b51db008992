//! Model boundary: one prompt in, the model's raw text out.

mod error;
mod stream;

use std::future::Future;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use futures::StreamExt;
use serde_json::{Value, json};

use crate::core::config::Config;

pub use error::{ModelError, map_api_error};

use stream::{Completion, chunk_content, chunk_error};

pub const TEMPERATURE: f32 = 0.7;
pub const TOP_P: f32 = 0.95;
pub const MAX_TOKENS: u32 = 4096;

/// Anything that can turn a prompt into a completion.
pub trait ModelClient {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String, ModelError>>;
}

/// Callback for each streamed content chunk (text only).
pub type OnContentChunk = Box<dyn Fn(&str) + Send + Sync>;

/// OpenAI-compatible chat-completions client (OpenRouter by default).
pub struct OpenRouterModel {
    client: Client<OpenAIConfig>,
    model: String,
    on_chunk: Option<OnContentChunk>,
}

impl OpenRouterModel {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::with_config(config.openai_config.clone()),
            model: config.model_id.clone(),
            on_chunk: None,
        }
    }

    /// Echo streamed chunks as they arrive.
    pub fn with_chunk_callback(mut self, on_chunk: OnContentChunk) -> Self {
        self.on_chunk = Some(on_chunk);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Chat-completions request body for a single user message.
fn request_body(model: &str, prompt: &str) -> Value {
    json!({
        "model": model,
        "messages": [{ "role": "user", "content": prompt }],
        "temperature": TEMPERATURE,
        "top_p": TOP_P,
        "max_tokens": MAX_TOKENS,
        "stream": true,
    })
}

impl ModelClient for OpenRouterModel {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        log::debug!("Calling {} ({} prompt chars)", self.model, prompt.chars().count());
        let chat_api = self.client.chat();
        let mut stream = chat_api
            .create_stream_byot::<_, Value>(request_body(&self.model, prompt))
            .await
            .map_err(map_api_error)?;

        let mut completion = Completion::default();
        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(map_api_error)?;
            if let Some(err) = chunk_error(&chunk) {
                return Err(err);
            }
            let Some(content) = chunk_content(&chunk) else {
                continue;
            };
            if !completion.push(content) {
                break;
            }
            if let Some(cb) = &self.on_chunk {
                cb(content);
            }
        }

        if completion.truncated {
            log::warn!("Response truncated at {} bytes", completion.content.len());
        }
        if completion.content.trim().is_empty() {
            return Err(ModelError::new("The model returned an empty response"));
        }
        log::debug!("Received {} response bytes", completion.content.len());
        Ok(completion.content)
    }
}
