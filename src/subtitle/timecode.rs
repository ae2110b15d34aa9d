/*!
 * Time-code parsing and normalization.
 *
 * Each format has its own grammar:
 * - SRT `HH:MM:SS,mmm` (hours optional on input)
 * - VTT `HH:MM:SS.mmm` (hours optional on input)
 * - ASS `H:MM:SS.CC`
 * - LRC `MM:SS.CC` (minutes unbounded, no hours)
 *
 * Fraction digits are always read as a decimal fraction of a second, so
 * `.5`, `.50` and `.500` are the same instant.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::SubtitleFormat;

// @const: SRT/VTT time, hours optional
static SRT_VTT_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d+):)?(\d{2}):(\d{2})[,.](\d{1,3})$").unwrap()
});

// @const: ASS time, hours mandatory
static ASS_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{2}):(\d{2})[.,](\d{1,3})$").unwrap()
});

// @const: LRC time, no hours
static LRC_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{2})(?:\.(\d{1,3}))?$").unwrap()
});

// @const: `start --> end` line, WebVTT cue settings allowed after the end time
static TIME_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^((?:\d+:)?\d{2}:\d{2}[,.]\d{1,3})[ \t]+-->[ \t]+((?:\d+:)?\d{2}:\d{2}[,.]\d{1,3})(?:[ \t]+\S.*)?$",
    )
    .unwrap()
});

// @const: One LRC timestamp tag anywhere in a line
pub(crate) static LRC_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(\d{2}:\d{2}(?:\.\d{2,3})?)\]").unwrap()
});

// @const: Run of LRC timestamp tags at the start of a line, with the whitespace after it
pub(crate) static LRC_LEADING_TAGS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:\[\d{2}:\d{2}(?:\.\d{2,3})?\]\s*)+").unwrap()
});

/// Milliseconds for a time string in the given syntax
pub fn to_millis(time: &str, syntax: SubtitleFormat) -> Option<u64> {
    let time = time.trim();
    match syntax {
        SubtitleFormat::Srt | SubtitleFormat::Vtt => {
            let caps = SRT_VTT_TIME.captures(time)?;
            let hours = match caps.get(1) {
                Some(_) => number(&caps, 1)?,
                None => 0,
            };
            compose(hours, number(&caps, 2)?, number(&caps, 3)?, fraction(&caps, 4))
        }
        SubtitleFormat::Ass => {
            let caps = ASS_TIME.captures(time)?;
            compose(number(&caps, 1)?, number(&caps, 2)?, number(&caps, 3)?, fraction(&caps, 4))
        }
        SubtitleFormat::Lrc => {
            let caps = LRC_TIME.captures(time)?;
            compose(0, number(&caps, 1)?, number(&caps, 2)?, fraction(&caps, 3))
        }
    }
}

/// Render milliseconds in the target syntax
pub fn format_millis(ms: u64, syntax: SubtitleFormat) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let millis = ms % 1000;

    match syntax {
        SubtitleFormat::Srt => format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis),
        SubtitleFormat::Vtt => format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis),
        SubtitleFormat::Ass => format!("{}:{:02}:{:02}.{:02}", hours, minutes, seconds, millis / 10),
        SubtitleFormat::Lrc => format!("{:02}:{:02}.{:02}", ms / 60_000, seconds, millis / 10),
    }
}

/// Convert a time string from one syntax to another.
///
/// Input that does not match the `from` grammar is returned unchanged.
pub fn normalize(time: &str, from: SubtitleFormat, to: SubtitleFormat) -> String {
    match to_millis(time, from) {
        Some(ms) => format_millis(ms, to),
        None => time.to_string(),
    }
}

/// True when the trimmed line is a `start --> end` time range
pub fn is_time_range(line: &str) -> bool {
    TIME_RANGE.is_match(line.trim())
}

/// Start and end of a time-range line, in their original syntax
pub fn parse_time_range(line: &str) -> Option<(String, String)> {
    let caps = TIME_RANGE.captures(line.trim())?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// True when the trimmed line opens with an LRC timestamp tag
pub fn starts_with_lrc_tag(line: &str) -> bool {
    let trimmed = line.trim_start();
    LRC_TAG.find(trimmed).is_some_and(|m| m.start() == 0)
}

/// Remove every LRC timestamp tag and trim what is left
pub fn strip_lrc_tags(line: &str) -> String {
    LRC_TAG.replace_all(line, "").trim().to_string()
}

fn number(caps: &Captures, group: usize) -> Option<u64> {
    caps.get(group)?.as_str().parse().ok()
}

fn fraction(caps: &Captures, group: usize) -> u64 {
    match caps.get(group) {
        Some(digits) => {
            let digits = digits.as_str();
            let value: u64 = digits.parse().unwrap_or(0);
            value * 10u64.pow(3 - digits.len() as u32)
        }
        None => 0,
    }
}

/// `None` when the total does not fit in a `u64` of milliseconds
fn compose(hours: u64, minutes: u64, seconds: u64, millis: u64) -> Option<u64> {
    hours
        .checked_mul(60)?
        .checked_add(minutes)?
        .checked_mul(60)?
        .checked_add(seconds)?
        .checked_mul(1000)?
        .checked_add(millis)
}
