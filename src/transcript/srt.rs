use anyhow::{bail, Context, Result};
use std::time::Duration;
use tracing::warn;

/// One timed dialogue cue. Timing is kept only for ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    pub start: Duration,
    pub end: Duration,
    pub text: String,
}

/// Parses SubRip content into cues ordered by start time.
///
/// A cue block with a missing or malformed timing line is skipped with a
/// warning and the remaining cues are kept. Only the caller decides whether
/// what is left is usable.
pub fn parse_srt(input: &str) -> Vec<Cue> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut cues = Vec::new();
    let mut skipped = 0usize;
    let mut lines = input.lines().map(|l| l.trim_end_matches('\r')).peekable();

    while let Some(line) = lines.next() {
        let first = line.trim();
        if first.is_empty() {
            continue;
        }

        // The numeric index is optional; when absent the first line is already the timing line.
        let times = if first.contains("-->") {
            Some(first)
        } else {
            lines.next_if(|l| !l.trim().is_empty()).map(str::trim)
        };
        let timing = times
            .with_context(|| format!("cue '{}' is missing a timestamp line", first))
            .and_then(parse_timing);

        let text_lines: Vec<String> = std::iter::from_fn(|| lines.next_if(|l| !l.trim().is_empty()))
            .map(|l| strip_markup(l.trim()))
            .filter(|t| !t.is_empty())
            .collect();

        match timing {
            Ok((start, end)) => cues.push(Cue {
                start,
                end,
                text: text_lines.join(" "),
            }),
            Err(e) => {
                skipped += 1;
                warn!("Skipping malformed subtitle cue: {:#}", e);
            }
        }
    }

    if skipped > 0 {
        warn!("Skipped {} malformed cue(s), kept {}", skipped, cues.len());
    }
    cues.sort_by_key(|cue| cue.start);
    cues
}

fn parse_timing(times: &str) -> Result<(Duration, Duration)> {
    let (start_raw, rest) = times
        .split_once("-->")
        .map(|(a, b)| (a.trim(), b.trim()))
        .with_context(|| format!("timestamp line '{}' must contain '-->'", times))?;
    // Position settings may follow the end timestamp (`X1:.. Y1:..`).
    let end_raw = rest.split_whitespace().next().unwrap_or(rest);

    let start = parse_timestamp(start_raw).with_context(|| format!("failed to parse start timestamp '{}'", start_raw))?;
    let end = parse_timestamp(end_raw).with_context(|| format!("failed to parse end timestamp '{}'", end_raw))?;
    if end < start {
        bail!("cue ends before it starts: {} --> {}", start_raw, end_raw);
    }
    Ok((start, end))
}

/// Flattens cues into a single dialogue string, dropping timing.
pub fn dialogue(cues: &[Cue]) -> String {
    cues.iter()
        .map(|cue| cue.text.as_str())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_timestamp(value: &str) -> Result<Duration> {
    let cleaned = value.trim().replace(',', ".");
    let (time_part, fractional) = cleaned.split_once('.').unwrap_or((cleaned.as_str(), "0"));

    let mut hms = time_part.split(':');
    let mut component = |name: &str| -> Result<u64> {
        hms.next()
            .with_context(|| format!("timestamp missing {}", name))?
            .parse::<u64>()
            .with_context(|| format!("invalid {} in timestamp", name))
    };
    let hours = component("hours")?;
    let minutes = component("minutes")?;
    let seconds = component("seconds")?;
    if hms.next().is_some() {
        bail!("timestamp has more than three components: {}", value);
    }
    if minutes >= 60 || seconds >= 60 {
        bail!("timestamp out of range: {}", value);
    }

    if fractional.is_empty() || !fractional.chars().all(|c| c.is_ascii_digit()) {
        bail!("invalid millisecond component in timestamp: {}", value);
    }
    let mut millis = fractional.chars().take(3).collect::<String>();
    while millis.len() < 3 {
        millis.push('0');
    }
    let millis = millis.parse::<u64>().context("invalid millisecond component")?;

    Ok(Duration::from_secs(hours * 3600 + minutes * 60 + seconds) + Duration::from_millis(millis))
}

/// Removes HTML-like tags and `{\...}` override blocks.
fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut closer: Option<char> = None;
    for c in text.chars() {
        match closer {
            Some(end) if c == end => closer = None,
            Some(_) => {}
            None if c == '<' => closer = Some('>'),
            None if c == '{' => closer = Some('}'),
            None => out.push(c),
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
