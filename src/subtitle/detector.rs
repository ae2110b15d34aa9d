/*!
 * Subtitle format detection.
 *
 * Classification looks at the first 50 non-blank lines only. Two markers
 * decide immediately (`[Script Info]` anywhere, `WEBVTT` on the first
 * line); otherwise per-format evidence is counted and compared.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use super::SubtitleFormat;
use super::timecode;
use crate::errors::SubtitleError;

const DETECTION_WINDOW: usize = 50;

static WEBVTT_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^WEBVTT(\s|$)").unwrap());

static ASS_DIALOGUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^dialogue:\s*\d+,[^,]*,[^,]*,").unwrap()
});

pub(crate) static LRC_METADATA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\[(ar|ti|al|by|offset|re|ve):").unwrap()
});

/// Evidence gathered over the detection window
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct FormatEvidence {
    ass: usize,
    srt: usize,
    vtt: usize,
    lrc: usize,
}

impl FormatEvidence {
    fn decide(&self) -> Option<SubtitleFormat> {
        let Self { ass, srt, vtt, lrc } = *self;
        if ass > 0 && ass >= vtt.max(srt).max(lrc) {
            Some(SubtitleFormat::Ass)
        } else if lrc > 0 && lrc >= vtt.max(srt) {
            Some(SubtitleFormat::Lrc)
        } else if vtt > srt {
            Some(SubtitleFormat::Vtt)
        } else if srt > 0 {
            Some(SubtitleFormat::Srt)
        } else {
            None
        }
    }
}

/// Detect the container format of a document. `None` means unrecognized.
pub fn detect<S: AsRef<str>>(lines: &[S]) -> Option<SubtitleFormat> {
    let mut evidence = FormatEvidence::default();

    let window = lines
        .iter()
        .map(|line| line.as_ref().trim())
        .filter(|line| !line.is_empty())
        .take(DETECTION_WINDOW);

    for (position, line) in window.enumerate() {
        if line.eq_ignore_ascii_case("[script info]") {
            return Some(SubtitleFormat::Ass);
        }
        if position == 0 && WEBVTT_HEADER.is_match(line) {
            return Some(SubtitleFormat::Vtt);
        }

        if ASS_DIALOGUE.is_match(line) {
            evidence.ass += 1;
        }
        if let Some((start, _)) = timecode::parse_time_range(line) {
            if start.contains(',') {
                evidence.srt += 1;
            } else {
                evidence.vtt += 1;
            }
        }
        if timecode::starts_with_lrc_tag(line) || LRC_METADATA.is_match(line) {
            evidence.lrc += 1;
        }
    }

    debug!("Format evidence: {:?}", evidence);
    evidence.decide()
}

/// Like [`detect`], with unrecognized input reported as an error
pub fn detect_or_err<S: AsRef<str>>(lines: &[S]) -> Result<SubtitleFormat, SubtitleError> {
    detect(lines).ok_or(SubtitleError::UnrecognizedFormat)
}
