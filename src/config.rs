use anyhow::{anyhow, bail, Context, Result};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.5;
pub const DEFAULT_MAX_CLUSTERS: usize = 5;
pub const DEFAULT_CLUSTER_SEED: u64 = 42;
pub const DEFAULT_MODEL_CALL_DELAY: Duration = Duration::from_secs(20);
pub const DEFAULT_MIN_SEGMENT_WORDS: usize = 3;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_LLAMA_URL: &str = "http://localhost:8080";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_HASHING_DIM: usize = 512;

/// Tunables of the analysis core.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// A transcript segment covers its best source match only when the score is strictly above this.
    pub similarity_threshold: f32,
    /// Ceiling on the number of topic clusters.
    pub max_clusters: usize,
    pub cluster_seed: u64,
    /// Mandatory gap between successive language-model calls.
    pub model_call_delay: Duration,
    /// Segments need strictly more words than this to survive filtering.
    pub min_segment_words: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_clusters: DEFAULT_MAX_CLUSTERS,
            cluster_seed: DEFAULT_CLUSTER_SEED,
            model_call_delay: DEFAULT_MODEL_CALL_DELAY,
            min_segment_words: DEFAULT_MIN_SEGMENT_WORDS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LlmSettings {
    Gemini { api_key: String, model: String },
    LlamaServer { base_url: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum EmbedderSettings {
    /// OpenAI-compatible `/embeddings` endpoint.
    Http {
        base_url: String,
        model: String,
        api_key: Option<String>,
        dimensions: Option<usize>,
    },
    /// Offline feature-hashing embedder.
    Hashing { dimensions: usize },
}

/// Everything a run needs besides the two input documents.
#[derive(Debug, Clone)]
pub struct Settings {
    pub analysis: AnalysisConfig,
    pub llm: LlmSettings,
    pub embedder: EmbedderSettings,
    pub request_timeout: Duration,
}

impl Settings {
    /// Reads the process environment. Fails on malformed values and on a
    /// missing Gemini key, before any pipeline work starts.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut analysis = AnalysisConfig::default();
        if let Some(v) = get("GAPFINDER_SIMILARITY_THRESHOLD") {
            analysis.similarity_threshold = parse_var("GAPFINDER_SIMILARITY_THRESHOLD", &v)?;
            if !(-1.0..=1.0).contains(&analysis.similarity_threshold) {
                bail!("GAPFINDER_SIMILARITY_THRESHOLD must lie in [-1, 1], got {}", v);
            }
        }
        if let Some(v) = get("GAPFINDER_MAX_CLUSTERS") {
            analysis.max_clusters = parse_var("GAPFINDER_MAX_CLUSTERS", &v)?;
        }
        if let Some(v) = get("GAPFINDER_CLUSTER_SEED") {
            analysis.cluster_seed = parse_var("GAPFINDER_CLUSTER_SEED", &v)?;
        }
        if let Some(v) = get("GAPFINDER_MODEL_DELAY_SECS") {
            let secs: f64 = parse_var("GAPFINDER_MODEL_DELAY_SECS", &v)?;
            analysis.model_call_delay = Duration::try_from_secs_f64(secs)
                .map_err(|e| anyhow!("GAPFINDER_MODEL_DELAY_SECS: {}", e))?;
        }

        let provider = get("GAPFINDER_LLM_PROVIDER").unwrap_or_else(|| "gemini".to_string());
        let llm = match provider.to_ascii_lowercase().as_str() {
            "gemini" => LlmSettings::Gemini {
                api_key: get("GEMINI_API_KEY").context("GEMINI_API_KEY is not configured")?,
                model: get("GAPFINDER_LLM_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            },
            "llama" => LlmSettings::LlamaServer {
                base_url: get("GAPFINDER_LLAMA_URL").unwrap_or_else(|| DEFAULT_LLAMA_URL.to_string()),
            },
            other => bail!("unknown GAPFINDER_LLM_PROVIDER '{}' (expected gemini or llama)", other),
        };

        let embedding_url = get("GAPFINDER_EMBEDDING_URL");
        let dimensions = get("GAPFINDER_EMBEDDING_DIM")
            .map(|v| parse_var::<usize>("GAPFINDER_EMBEDDING_DIM", &v))
            .transpose()?;
        let kind = get("GAPFINDER_EMBEDDER").unwrap_or_else(|| {
            let kind = if embedding_url.is_some() { "http" } else { "hashing" };
            kind.to_string()
        });
        let embedder = match kind.to_ascii_lowercase().as_str() {
            "http" => EmbedderSettings::Http {
                base_url: embedding_url.context("GAPFINDER_EMBEDDING_URL is required for the http embedder")?,
                model: get("GAPFINDER_EMBEDDING_MODEL").unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
                api_key: get("GAPFINDER_EMBEDDING_API_KEY"),
                dimensions,
            },
            "hashing" => EmbedderSettings::Hashing {
                dimensions: dimensions.unwrap_or(DEFAULT_HASHING_DIM),
            },
            other => bail!("unknown GAPFINDER_EMBEDDER '{}' (expected http or hashing)", other),
        };

        Ok(Self {
            analysis,
            llm,
            embedder,
            request_timeout: Duration::from_secs(120),
        })
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| anyhow!("invalid value '{}' for {}: {}", value, key, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_need_only_the_api_key() {
        let settings = Settings::from_lookup(lookup(&[("GEMINI_API_KEY", "k")])).unwrap();
        assert_eq!(settings.analysis.similarity_threshold, 0.5);
        assert_eq!(settings.analysis.max_clusters, 5);
        assert_eq!(settings.analysis.model_call_delay, Duration::from_secs(20));
        assert_eq!(settings.embedder, EmbedderSettings::Hashing { dimensions: DEFAULT_HASHING_DIM });
        assert!(matches!(settings.llm, LlmSettings::Gemini { ref model, .. } if model == DEFAULT_GEMINI_MODEL));
    }

    #[test]
    fn missing_key_is_rejected() {
        assert!(Settings::from_lookup(lookup(&[])).is_err());
        assert!(Settings::from_lookup(lookup(&[("GEMINI_API_KEY", "   ")])).is_err());
    }

    #[test]
    fn llama_provider_needs_no_key() {
        let settings = Settings::from_lookup(lookup(&[
            ("GAPFINDER_LLM_PROVIDER", "llama"),
            ("GAPFINDER_EMBEDDING_URL", "http://embed.local/v1"),
            ("GAPFINDER_MODEL_DELAY_SECS", "0.5"),
        ]))
        .unwrap();
        assert_eq!(settings.llm, LlmSettings::LlamaServer { base_url: DEFAULT_LLAMA_URL.to_string() });
        assert!(matches!(settings.embedder, EmbedderSettings::Http { .. }));
        assert_eq!(settings.analysis.model_call_delay, Duration::from_millis(500));
    }

    #[test]
    fn malformed_numbers_fail() {
        let err = Settings::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("GAPFINDER_MAX_CLUSTERS", "many"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("GAPFINDER_MAX_CLUSTERS"));
    }
}
