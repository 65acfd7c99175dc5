use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::{extract_generated_text, GenerationBackend, GenerationParams};
use crate::error::{AppError, Result};

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    max_new_tokens: u32,
    do_sample: bool,
    temperature: f32,
    top_p: f32,
    repetition_penalty: f32,
}

impl From<&GenerationParams> for InferenceParameters {
    fn from(params: &GenerationParams) -> Self {
        Self {
            max_new_tokens: params.max_new_tokens,
            do_sample: params.do_sample,
            temperature: params.temperature,
            top_p: params.top_p,
            repetition_penalty: params.repetition_penalty,
        }
    }
}

/// Hosted open-model inference endpoint (Hugging Face style).
pub struct InferenceBackend {
    client: Client,
    endpoint: String,
    api_token: String,
}

impl InferenceBackend {
    pub fn new(endpoint: String, api_token: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_token,
        })
    }
}

#[async_trait]
impl GenerationBackend for InferenceBackend {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let request = InferenceRequest {
            inputs: prompt,
            parameters: params.into(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(AppError::Generation(format!(
                "Inference API error ({}): {}",
                status, error_text
            )));
        }

        // Either `{"generated_text": ...}` or `[{"generated_text": ...}]`
        let payload: Value = response.json().await?;
        Ok(extract_generated_text(payload))
    }

    fn name(&self) -> &str {
        "inference"
    }
}
