#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use gapfinder::embedding::HashingEmbedder;
use gapfinder::llm::LanguageModel;
use gapfinder::{AnalysisConfig, Analyzer};

/// Language model driven by a closure over the prompt. Records every prompt
/// and the (tokio) instant each call started.
pub struct FakeModel {
    respond: Box<dyn Fn(&str) -> Result<String, String> + Send + Sync>,
    pub prompts: Mutex<Vec<String>>,
    pub call_times: Mutex<Vec<tokio::time::Instant>>,
}

impl FakeModel {
    pub fn new<F>(respond: F) -> Arc<Self>
    where
        F: Fn(&str) -> Result<String, String> + Send + Sync + 'static,
    {
        Arc::new(Self {
            respond: Box::new(respond),
            prompts: Mutex::new(Vec::new()),
            call_times: Mutex::new(Vec::new()),
        })
    }

    /// Summarizes every cluster with a fixed sentence and answers the
    /// structuring prompt with `report_json`.
    pub fn with_report(report_json: &'static str) -> Arc<Self> {
        Self::new(move |prompt| {
            if is_structuring(prompt) {
                Ok(report_json.to_string())
            } else {
                Ok("The hero's childhood flashback explains his fear of water.".to_string())
            }
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for FakeModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.call_times.lock().unwrap().push(tokio::time::Instant::now());
        (self.respond)(prompt).map_err(|e| anyhow!(e))
    }

    fn name(&self) -> &str {
        "fake"
    }
}

pub fn is_structuring(prompt: &str) -> bool {
    prompt.contains("JSON OUTPUT:")
}

pub const REPORT_JSON: &str = r#"{"summary": "Three scenes were cut.", "categories": [{"title": "Side Plot", "missing": 2, "description": "The smugglers' tavern."}, {"title": "Worldbuilding", "missing": 1, "description": "The tower's history."}]}"#;

/// Builds a SubRip document with one cue per line.
pub fn srt(lines: &[&str]) -> String {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            format!(
                "{}\n00:00:{:02},000 --> 00:00:{:02},500\n{}\n",
                i + 1,
                i * 2,
                i * 2 + 1,
                line
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn quick_config() -> AnalysisConfig {
    AnalysisConfig {
        model_call_delay: Duration::ZERO,
        ..AnalysisConfig::default()
    }
}

pub fn analyzer(model: Arc<FakeModel>) -> Analyzer {
    let embedder = Arc::new(HashingEmbedder::new(512).expect("embedder"));
    Analyzer::new(quick_config(), embedder, model)
}

/// Serves one canned HTTP response and hands back the raw request.
pub async fn one_shot_server(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        // Read headers, then the announced body
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&request).to_string();
            if let Some(split) = text.find("\r\n\r\n") {
                let length = text[..split]
                    .lines()
                    .find_map(|l| {
                        let lower = l.to_ascii_lowercase();
                        lower.strip_prefix("content-length:").map(|v| v.trim().parse::<usize>().unwrap())
                    })
                    .unwrap_or(0);
                if request.len() >= split + 4 + length {
                    break;
                }
            }
            if n == 0 {
                break;
            }
        }

        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        String::from_utf8_lossy(&request).to_string()
    });

    (format!("http://{}", addr), handle)
}
