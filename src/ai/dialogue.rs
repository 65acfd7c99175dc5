use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::{extract_generated_text, GenerationBackend, GenerationParams};
use crate::error::{AppError, Result};

#[derive(Debug, Serialize)]
struct DialogueRequest<'a> {
    prompt: &'a str,
    do_sample: bool,
    max_new_tokens: u32,
    repetition_penalty: f32,
    top_p: f32,
    temperature: f32,
}

/// Self-hosted dialogue service answering `{generated_text}`.
pub struct DialogueBackend {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl DialogueBackend {
    pub fn new(endpoint: String, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl GenerationBackend for DialogueBackend {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let request = DialogueRequest {
            prompt,
            do_sample: params.do_sample,
            max_new_tokens: params.max_new_tokens,
            repetition_penalty: params.repetition_penalty,
            top_p: params.top_p,
            temperature: params.temperature,
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(AppError::Generation(format!(
                "Dialogue service error ({}): {}",
                status, error_text
            )));
        }

        let payload: Value = response.json().await?;
        Ok(extract_generated_text(payload))
    }

    fn name(&self) -> &str {
        "dialogue"
    }
}
