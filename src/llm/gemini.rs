use anyhow::{bail, ensure, Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::LanguageModel;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Generative Language API (`models/{model}:generateContent`).
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str, timeout: Duration) -> Result<Self> {
        Self::with_base_url(api_key, model, API_BASE, timeout)
    }

    pub fn with_base_url(api_key: &str, model: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        ensure!(!api_key.trim().is_empty(), "missing Gemini API key");
        ensure!(!model.trim().is_empty(), "missing Gemini model name");

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(api_key.trim()).context("invalid Gemini API key")?,
        );
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("failed to build Gemini HTTP client")?;

        Ok(Self {
            client,
            endpoint: format!("{}/models/{}:generateContent", base_url.trim_end_matches('/'), model),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .context("failed to call Gemini generateContent")?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_else(|_| "<body unavailable>".to_string());
            bail!("Gemini returned {}: {}", status, text);
        }

        let parsed: GenerateResponse = resp.json().await.context("failed to parse Gemini response")?;
        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .context("Gemini response has no candidates (prompt blocked?)")?;
        let text = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect::<Vec<_>>().join(""))
            .unwrap_or_default();
        if text.trim().is_empty() {
            bail!(
                "Gemini candidate has no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            );
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
