mod dialogue;
mod generator;
mod inference;
mod openai;
mod prompt;
mod response;

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::{BackendKind, Config};
use crate::error::{AppError, Result};

pub use dialogue::DialogueBackend;
pub use generator::FactGenerator;
pub use inference::InferenceBackend;
pub use openai::OpenAiBackend;
pub use prompt::build_prompt;
pub use response::extract_generated_text;

/// Sampling settings sent with every generation request.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub max_new_tokens: u32,
    pub do_sample: bool,
    pub temperature: f32,
    pub top_p: f32,
    pub repetition_penalty: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 120,
            do_sample: true,
            temperature: 1.0,
            top_p: 0.9,
            repetition_penalty: 1.2,
        }
    }
}

/// A remote text-generation API. One is picked per deployment.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String>;

    fn name(&self) -> &str;
}

/// Build the backend selected by `config.backend.kind`.
pub fn backend_from_config(config: &Config) -> Result<Box<dyn GenerationBackend>> {
    let endpoint = config.backend.endpoint()?;
    let timeout = Duration::from_secs(config.backend.timeout_secs);
    let key = config.backend_key.clone();

    let backend: Box<dyn GenerationBackend> = match config.backend.kind {
        BackendKind::OpenAi => {
            let key = key.ok_or_else(|| AppError::Config("missing OpenAI API key".to_string()))?;
            Box::new(OpenAiBackend::new(
                endpoint,
                key,
                config.backend.model().to_string(),
                timeout,
            )?)
        }
        BackendKind::Dialogue => Box::new(DialogueBackend::new(endpoint, key, timeout)?),
        BackendKind::Inference => {
            let key =
                key.ok_or_else(|| AppError::Config("missing inference API token".to_string()))?;
            Box::new(InferenceBackend::new(endpoint, key, timeout)?)
        }
    };

    tracing::debug!("Using {} generation backend", backend.name());
    Ok(backend)
}
