/*!
 * Translatable content extraction.
 *
 * Every format runs the same two-state scan over the document. The
 * per-format behaviour lives in a rules table: which line opens the
 * subtitle region, and what text (if any) a line inside the region
 * contributes.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use super::SubtitleFormat;
use super::detector::LRC_METADATA;
use super::timecode;

/// Field offset used when an ASS file has neither a `Format:` line nor dialogue
pub const DEFAULT_ASS_FIELD_OFFSET: usize = 9;

const ASS_DIALOGUE_SAMPLE: usize = 100;

static INTEGER_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

/// Translatable text spans with their line positions
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentMap {
    /// Extracted text, in document order
    pub content: Vec<String>,
    /// Line index of each entry in `content`
    pub indices: Vec<usize>,
    /// Comma count before the ASS text field; `None` for other formats
    pub field_offset: Option<usize>,
}

impl ContentMap {
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

// @enum: Scan state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RegionState {
    NotStarted,
    Extracting,
}

/// What the extractor sees of a line
struct LineView<'a> {
    line: &'a str,
    previous: Option<&'a str>,
    next: Option<&'a str>,
    field_offset: usize,
}

// @struct: Per-format extraction rules
struct ExtractionRules {
    starts_region: fn(&str) -> bool,
    extract: fn(&LineView) -> Option<String>,
}

const SRT_RULES: ExtractionRules = ExtractionRules {
    starts_region: timecode::is_time_range,
    extract: extract_srt,
};

const VTT_RULES: ExtractionRules = ExtractionRules {
    starts_region: timecode::is_time_range,
    extract: extract_vtt,
};

const LRC_RULES: ExtractionRules = ExtractionRules {
    starts_region: timecode::starts_with_lrc_tag,
    extract: extract_lrc,
};

const ASS_RULES: ExtractionRules = ExtractionRules {
    starts_region: is_dialogue,
    extract: extract_ass,
};

fn rules_for(format: SubtitleFormat) -> &'static ExtractionRules {
    match format {
        SubtitleFormat::Srt => &SRT_RULES,
        SubtitleFormat::Vtt => &VTT_RULES,
        SubtitleFormat::Lrc => &LRC_RULES,
        SubtitleFormat::Ass => &ASS_RULES,
    }
}

/// Blank and integer-only lines never carry subtitle text
pub(crate) fn is_valid_subtitle_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !INTEGER_LINE.is_match(trimmed)
}

fn is_dialogue(line: &str) -> bool {
    line.trim_start().starts_with("Dialogue:")
}

fn extract_srt(view: &LineView) -> Option<String> {
    let line = view.line;
    (is_valid_subtitle_line(line) && !timecode::is_time_range(line)).then(|| line.to_string())
}

fn extract_vtt(view: &LineView) -> Option<String> {
    let line = view.line;
    let trimmed = line.trim();
    if !is_valid_subtitle_line(line)
        || timecode::is_time_range(line)
        || trimmed.starts_with("WEBVTT")
        || trimmed.starts_with('#')
    {
        return None;
    }
    if is_vtt_cue_identifier(view) {
        return None;
    }
    Some(line.to_string())
}

/// A cue identifier opens a cue block: it follows a blank or `#` line (or
/// the start of the document) and sits directly above the cue's time range.
/// Text directly above the next time range of an unseparated cue is not one.
fn is_vtt_cue_identifier(view: &LineView) -> bool {
    let opens_block = view.previous.is_none_or(|previous| {
        let previous = previous.trim();
        previous.is_empty() || previous.starts_with('#')
    });
    opens_block && view.next.is_some_and(timecode::is_time_range)
}

fn extract_lrc(view: &LineView) -> Option<String> {
    if LRC_METADATA.is_match(view.line.trim()) {
        return None;
    }
    let text = timecode::strip_lrc_tags(view.line);
    is_valid_subtitle_line(&text).then_some(text)
}

fn extract_ass(view: &LineView) -> Option<String> {
    if !view.line.starts_with("Dialogue:") {
        return None;
    }
    let (_, payload) = split_ass_line(view.line, view.field_offset)?;
    is_valid_subtitle_line(payload).then(|| payload.to_string())
}

/// Split an ASS event line after its `field_offset`-th comma.
///
/// Returns `(prefix including the comma, payload)`, or `None` when the
/// line has too few fields.
pub(crate) fn split_ass_line(line: &str, field_offset: usize) -> Option<(&str, &str)> {
    if field_offset == 0 {
        return Some(("", line));
    }
    let (position, _) = line.match_indices(',').nth(field_offset - 1)?;
    Some(line.split_at(position + 1))
}

/// Number of commas preceding the text field of ASS events.
///
/// Read from the `Format:` line of the `[Events]` section; failing that,
/// the smallest comma count over the first 100 `Dialogue:` lines.
pub fn ass_field_offset<S: AsRef<str>>(lines: &[S]) -> usize {
    let events = lines.iter().position(|line| line.as_ref().trim() == "[Events]");

    if let Some(events) = events {
        let format_line = lines[events..]
            .iter()
            .map(|line| line.as_ref())
            .find(|line| line.starts_with("Format:"));
        if let Some(format_line) = format_line {
            return format_line.matches(',').count();
        }
    }

    lines
        .iter()
        .map(|line| line.as_ref())
        .filter(|line| line.starts_with("Dialogue:"))
        .take(ASS_DIALOGUE_SAMPLE)
        .map(|line| line.matches(',').count())
        .min()
        .unwrap_or(DEFAULT_ASS_FIELD_OFFSET)
}

/// Extract the translatable lines of a document in the given format
pub fn extract<S: AsRef<str>>(lines: &[S], format: SubtitleFormat) -> ContentMap {
    let rules = rules_for(format);
    let field_offset = match format {
        SubtitleFormat::Ass => Some(ass_field_offset(lines)),
        _ => None,
    };

    let mut map = ContentMap {
        field_offset,
        ..ContentMap::default()
    };
    let mut state = RegionState::NotStarted;

    for (index, line) in lines.iter().enumerate() {
        let line = line.as_ref();

        if state == RegionState::NotStarted && (rules.starts_region)(line) {
            state = RegionState::Extracting;
        }
        if state == RegionState::NotStarted {
            continue;
        }

        let view = LineView {
            line,
            previous: index.checked_sub(1).map(|previous| lines[previous].as_ref()),
            next: lines.get(index + 1).map(|next| next.as_ref()),
            field_offset: field_offset.unwrap_or(DEFAULT_ASS_FIELD_OFFSET),
        };
        if let Some(text) = (rules.extract)(&view) {
            map.content.push(text);
            map.indices.push(index);
        }
    }

    map
}
