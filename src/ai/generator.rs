use super::{build_prompt, GenerationBackend, GenerationParams};
use crate::config::Language;
use crate::error::Result;

pub struct FactGenerator {
    backend: Box<dyn GenerationBackend>,
    params: GenerationParams,
    language: Language,
}

impl FactGenerator {
    pub fn new(
        backend: Box<dyn GenerationBackend>,
        params: GenerationParams,
        language: Language,
    ) -> Self {
        Self {
            backend,
            params,
            language,
        }
    }

    pub async fn generate(&self, topic: &str, category: &str) -> Result<String> {
        let prompt = build_prompt(topic, category, self.language);
        tracing::debug!("Requesting fact about {:?} from {}", topic, self.backend.name());

        let text = self.backend.generate(&prompt, &self.params).await?;
        Ok(text.trim().to_string())
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }
}
