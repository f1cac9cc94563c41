pub mod gemini;
pub mod llama;
pub mod pacer;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::LlmSettings;

pub use gemini::GeminiClient;
pub use llama::LlamaServerClient;
pub use pacer::CallPacer;

/// Generative language model: text prompt in, free text out.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;

    fn name(&self) -> &str;
}

pub fn build_model(settings: &LlmSettings, timeout: Duration) -> Result<Arc<dyn LanguageModel>> {
    let model: Arc<dyn LanguageModel> = match settings {
        LlmSettings::Gemini { api_key, model } => Arc::new(GeminiClient::new(api_key, model, timeout)?),
        LlmSettings::LlamaServer { base_url } => Arc::new(LlamaServerClient::new(base_url, timeout)?),
    };
    tracing::info!("Language model ready: {}", model.name());
    Ok(model)
}
