use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Which document a segment was cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    Source,
    Transcript,
}

/// Minimal comparable unit of text. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    text: String,
    origin: Origin,
    position: usize,
}

impl Segment {
    pub fn new(text: impl Into<String>, origin: Origin, position: usize) -> Self {
        Self {
            text: text.into(),
            origin,
            position,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Index in the filtered sequence of its origin; aligns with the embedding row.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn word_count(&self) -> usize {
        word_count(&self.text)
    }
}

/// How the raw text is cut into candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentMode {
    /// One narrative unit per line.
    Source,
    /// Sentence boundaries (UAX #29).
    Transcript,
}

impl SegmentMode {
    pub fn origin(self) -> Origin {
        match self {
            SegmentMode::Source => Origin::Source,
            SegmentMode::Transcript => Origin::Transcript,
        }
    }
}

const CLITICS: [&str; 7] = ["n't", "'s", "'re", "'ve", "'ll", "'d", "'m"];

/// Number of word and punctuation tokens, Treebank style: "Don't go there!"
/// is `Do n't go there !`, five tokens. A run of the same punctuation mark
/// (`...`, `--`) is one token.
pub fn word_count(text: &str) -> usize {
    let mut count = 0;
    let mut last_mark: Option<&str> = None;

    for piece in text.split_word_bounds() {
        if piece.chars().all(char::is_whitespace) {
            last_mark = None;
        } else if piece.chars().any(char::is_alphanumeric) {
            count += 1 + usize::from(has_clitic(piece));
            last_mark = None;
        } else {
            if last_mark != Some(piece) {
                count += 1;
            }
            last_mark = Some(piece);
        }
    }
    count
}

fn has_clitic(word: &str) -> bool {
    let lower = word.to_lowercase().replace('\u{2019}', "'");
    CLITICS.iter().any(|c| lower.len() > c.len() && lower.ends_with(c))
}

/// Splits `text` into ordered segments, dropping candidates with `min_words` tokens or fewer.
pub fn segment(text: &str, mode: SegmentMode, min_words: usize) -> Vec<Segment> {
    let candidates: Vec<&str> = match mode {
        SegmentMode::Source => text.lines().map(str::trim).filter(|l| !l.is_empty()).collect(),
        SegmentMode::Transcript => text
            .unicode_sentences()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect(),
    };

    candidates
        .into_iter()
        .filter(|candidate| word_count(candidate) > min_words)
        .enumerate()
        .map(|(position, candidate)| Segment::new(candidate, mode.origin(), position))
        .collect()
}
