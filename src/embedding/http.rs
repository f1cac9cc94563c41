use anyhow::{anyhow, bail, ensure, Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::Embedder;
use crate::error::AnalysisError;

const DEFAULT_BATCH_SIZE: usize = 96;
const MAX_RETRIES: usize = 4;

/// Client for OpenAI-compatible `/embeddings` endpoints (OpenAI, vLLM, TEI, Ollama...).
#[derive(Clone)]
pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    dimensions: Option<usize>,
    batch_size: usize,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

impl HttpEmbedder {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<&str>,
        dimensions: Option<usize>,
        timeout: Duration,
    ) -> Result<Self> {
        ensure!(!model.trim().is_empty(), "missing embedding model name");
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            let auth = format!("Bearer {}", key.trim());
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&auth).context("invalid embedding API key")?);
        }
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("failed to build embedding HTTP client")?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            model: model.to_string(),
            dimensions,
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    /// Inputs per request; clamped to at least one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    async fn embed_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: batch,
            dimensions: self.dimensions,
        };

        let mut attempt = 0usize;
        loop {
            let outcome = self.client.post(&self.endpoint).json(&request).send().await;
            let retry_reason = match outcome {
                Ok(resp) if resp.status().is_success() => {
                    let mut parsed: EmbeddingResponse =
                        resp.json().await.context("failed to decode embedding response")?;
                    parsed.data.sort_by_key(|entry| entry.index);
                    ensure!(
                        parsed.data.len() == batch.len(),
                        "endpoint returned {} embeddings for {} inputs",
                        parsed.data.len(),
                        batch.len()
                    );
                    return Ok(parsed.data.into_iter().map(|entry| entry.embedding).collect());
                }
                Ok(resp) => {
                    let status = resp.status();
                    let body = resp.text().await.unwrap_or_else(|_| "<body unavailable>".to_string());
                    if !should_retry(status) {
                        bail!("embedding request failed ({}): {}", status, body);
                    }
                    anyhow!("embedding request failed ({}): {}", status, body)
                }
                Err(err) if err.is_timeout() || err.is_connect() || err.is_request() => err.into(),
                Err(err) => return Err(err).context("embedding request failed"),
            };

            attempt += 1;
            if attempt >= MAX_RETRIES {
                return Err(retry_reason.context(format!("giving up after {} attempts", attempt)));
            }
            let backoff = Duration::from_millis(500 * (1 << attempt.min(5)));
            warn!("Embedding request failed (attempt {}), retrying in {:?}: {:#}", attempt, backoff, retry_reason);
            tokio::time::sleep(backoff).await;
        }
    }
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AnalysisError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            debug!("Embedding batch of {} segments via {}", batch.len(), self.endpoint);
            let embedded = self.embed_batch(batch).await.map_err(AnalysisError::dependency)?;
            vectors.extend(embedded);
        }
        Ok(vectors)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
