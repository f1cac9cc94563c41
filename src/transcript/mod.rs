pub mod srt;

use crate::error::AnalysisError;
use tracing::{debug, error};

pub use srt::{dialogue, parse_srt, Cue};

/// Transcript Extractor: subtitle track -> flat dialogue string.
///
/// Malformed cues are dropped by the parser; a track with no usable cue or
/// without any dialogue is a validation failure.
pub fn extract_dialogue(subtitle_content: &str) -> Result<String, AnalysisError> {
    let cues = parse_srt(subtitle_content);
    if cues.is_empty() {
        error!("Subtitle parsing produced no cues");
        return Err(AnalysisError::Validation(
            "failed to parse subtitle file: no valid cues".to_string(),
        ));
    }

    let text = dialogue(&cues);
    if text.trim().is_empty() {
        return Err(AnalysisError::Validation(
            "subtitle file contains no dialogue".to_string(),
        ));
    }

    debug!("Extracted dialogue from {} cues ({} chars)", cues.len(), text.len());
    Ok(text)
}
