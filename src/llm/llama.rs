use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::LanguageModel;

/// llama.cpp server speaking the native `/completion` endpoint.
#[derive(Clone)]
pub struct LlamaServerClient {
    client: Client,
    base_url: String,
    n_predict: usize,
    temperature: f32,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    stream: bool,
    n_predict: usize,
    temperature: f32,
    stop: Vec<String>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    content: String,
}

impl LlamaServerClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .context("failed to build llama-server HTTP client")?,
            base_url: base_url.trim_end_matches('/').to_string(),
            n_predict: 1024,
            temperature: 0.4,
        })
    }
}

#[async_trait]
impl LanguageModel for LlamaServerClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request_body = CompletionRequest {
            prompt,
            stream: false,
            n_predict: self.n_predict,
            temperature: self.temperature,
            stop: vec!["</s>".to_string()],
        };

        let response = self
            .client
            .post(format!("{}/completion", self.base_url))
            .json(&request_body)
            .send()
            .await
            .context("failed to reach llama-server")?;

        if !response.status().is_success() {
            return Err(anyhow!("llama-server error: {}", response.status()));
        }

        let resp_json: CompletionResponse = response.json().await.context("failed to decode llama-server response")?;
        Ok(resp_json.content.trim().to_string())
    }

    fn name(&self) -> &str {
        "llama-server"
    }
}
