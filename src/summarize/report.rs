use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

pub const NO_DIFFERENCES_SUMMARY: &str = "No significant differences found.";
pub const UNSTRUCTURED_SUMMARY: &str = "Analysis complete, but failed to structure the report.";

/// Final output of a run. Always has both fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Report {
    pub summary: String,
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Category {
    pub title: String,
    /// Number of cut items the model attributed to this category.
    pub missing: u32,
    pub description: String,
}

impl Report {
    /// Every source segment was covered by the transcript.
    pub fn no_differences() -> Self {
        Self {
            summary: NO_DIFFERENCES_SUMMARY.to_string(),
            categories: Vec::new(),
        }
    }

    /// Degraded report used when the structuring step fails.
    pub fn unstructured() -> Self {
        Self {
            summary: UNSTRUCTURED_SUMMARY.to_string(),
            categories: Vec::new(),
        }
    }

    pub fn total_missing(&self) -> u64 {
        self.categories.iter().map(|c| u64::from(c.missing)).sum()
    }
}

/// Strict decode of the model's structuring output.
///
/// Markdown code fences around the object are tolerated; anything that does
/// not decode into the exact two-field shape is a `Structuring` error.
pub fn parse_report(raw: &str) -> Result<Report, AnalysisError> {
    let body = strip_fences(raw);
    serde_json::from_str::<Report>(body).map_err(|e| AnalysisError::Structuring(format!("invalid report JSON: {}", e)))
}

fn strip_fences(raw: &str) -> &str {
    let mut body = raw.trim();
    if let Some(rest) = body.strip_prefix("```") {
        // Drop the info string (`json`, `JSON`, ...) up to the end of the fence line.
        body = match rest.find('\n') {
            Some(newline) if rest[..newline].trim().chars().all(|c| c.is_ascii_alphanumeric()) => &rest[newline + 1..],
            _ => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
        };
        body = body.trim_end();
        body = body.strip_suffix("```").unwrap_or(body);
    }
    body.trim()
}
