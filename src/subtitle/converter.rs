/*!
 * Cross-format conversion through a neutral entry model.
 *
 * Parsing keeps times in the source syntax; rendering normalizes every
 * time into the target syntax. ASS styling is not modeled: override
 * blocks are dropped on parse and rendered events use the `Default` style.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use super::extractor::{ass_field_offset, is_valid_subtitle_line};
use super::timecode::{self, LRC_LEADING_TAGS, LRC_TAG};
use super::{RawDocument, SubtitleFormat};
use crate::errors::SubtitleError;

/// Script header written in front of every generated ASS document
pub const ASS_HEADER: &str = "[Script Info]
ScriptType: v4.00+
WrapStyle: 0
ScaledBorderAndShadow: yes
PlayResX: 1920
PlayResY: 1080

[V4+ Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding
Style: Default,Arial,64,&H00FFFFFF,&H000000FF,&H00000000,&H80000000,0,0,0,0,100,100,0,0,1,2,1,2,20,20,40,1
Style: Secondary,Arial,52,&H0000FFFF,&H000000FF,&H00000000,&H80000000,0,0,0,0,100,100,0,0,1,2,1,2,20,20,110,1

[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
";

static ASS_OVERRIDE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]*\}").unwrap());

/// One cue in a format-neutral shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    /// Sequence number from the source, when it had one
    pub index: Option<usize>,
    /// Start time in the source syntax
    pub start_time: String,
    /// End time in the source syntax
    pub end_time: String,
    /// Text, lines separated by `\n`
    pub text: String,
}

/// Parse document text into entries
pub fn parse(content: &str, format: SubtitleFormat) -> Vec<SubtitleEntry> {
    let doc = RawDocument::parse(content);
    let lines = doc.lines();
    match format {
        SubtitleFormat::Srt | SubtitleFormat::Vtt => parse_cue_blocks(lines),
        SubtitleFormat::Ass => parse_ass(lines),
        SubtitleFormat::Lrc => parse_lrc(lines),
    }
}

// @struct: Cue being assembled while scanning SRT/VTT blocks
#[derive(Default)]
struct PendingCue {
    index: Option<usize>,
    times: Option<(String, String)>,
    text: Vec<String>,
}

impl PendingCue {
    fn flush(&mut self, entries: &mut Vec<SubtitleEntry>) {
        let cue = std::mem::take(self);
        if let Some((start_time, end_time)) = cue.times {
            if !cue.text.is_empty() {
                entries.push(SubtitleEntry {
                    index: cue.index,
                    start_time,
                    end_time,
                    text: cue.text.join("\n"),
                });
            }
        }
    }
}

// SRT and VTT share a block structure: optional id, time range, text lines
fn parse_cue_blocks(lines: &[String]) -> Vec<SubtitleEntry> {
    let mut entries = Vec::new();
    let mut pending = PendingCue::default();

    for line in lines {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            pending.flush(&mut entries);
            continue;
        }
        if let Some(range) = timecode::parse_time_range(trimmed) {
            if pending.times.is_some() {
                pending.flush(&mut entries);
            }
            pending.times = Some(range);
            continue;
        }
        if pending.times.is_none() {
            if let Ok(number) = trimmed.parse::<usize>() {
                pending.index = Some(number);
            }
            continue;
        }
        pending.text.push(trimmed.to_string());
    }
    pending.flush(&mut entries);

    entries
}

fn parse_ass(lines: &[String]) -> Vec<SubtitleEntry> {
    let field_offset = ass_field_offset(lines);

    lines
        .iter()
        .filter_map(|line| line.strip_prefix("Dialogue:"))
        .filter_map(|event| {
            let fields: Vec<&str> = event.split(',').collect();
            if fields.len() <= field_offset || fields.len() < 3 {
                return None;
            }
            let raw_text = fields[field_offset..].join(",");
            let text = ASS_OVERRIDE
                .replace_all(&raw_text, "")
                .replace("\\N", "\n")
                .replace("\\n", "\n")
                .replace("\\h", " ");
            let text = text.trim().to_string();
            if text.is_empty() {
                return None;
            }
            Some(SubtitleEntry {
                index: None,
                start_time: fields[1].trim().to_string(),
                end_time: fields[2].trim().to_string(),
                text,
            })
        })
        .collect()
}

fn parse_lrc(lines: &[String]) -> Vec<SubtitleEntry> {
    let mut entries: Vec<(u64, SubtitleEntry)> = Vec::new();

    for line in lines {
        let Some(prefix) = LRC_LEADING_TAGS.find(line) else {
            continue;
        };
        let text = timecode::strip_lrc_tags(&line[prefix.end()..]);
        if !is_valid_subtitle_line(&text) {
            continue;
        }
        for tag in LRC_TAG.captures_iter(prefix.as_str()) {
            let time = tag[1].to_string();
            let ms = timecode::to_millis(&time, SubtitleFormat::Lrc).unwrap_or(0);
            entries.push((
                ms,
                SubtitleEntry {
                    index: None,
                    start_time: time.clone(),
                    end_time: time,
                    text: text.clone(),
                },
            ));
        }
    }

    entries.sort_by_key(|(ms, _)| *ms);
    entries.into_iter().map(|(_, entry)| entry).collect()
}

/// Render entries in the target format.
///
/// Times are converted from `source` syntax; LRC output keeps start
/// times only.
pub fn render(entries: &[SubtitleEntry], source: SubtitleFormat, target: SubtitleFormat) -> String {
    let time = |t: &str| timecode::normalize(t, source, target);

    match target {
        SubtitleFormat::Srt | SubtitleFormat::Vtt => {
            let blocks: Vec<String> = entries
                .iter()
                .enumerate()
                .map(|(position, entry)| {
                    format!(
                        "{}\n{} --> {}\n{}\n",
                        entry.index.unwrap_or(position + 1),
                        time(&entry.start_time),
                        time(&entry.end_time),
                        entry.text
                    )
                })
                .collect();
            let body = blocks.join("\n");
            if target == SubtitleFormat::Vtt {
                format!("WEBVTT\n\n{}", body)
            } else {
                body
            }
        }
        SubtitleFormat::Ass => {
            let mut output = String::from(ASS_HEADER);
            for entry in entries {
                output.push_str(&format!(
                    "Dialogue: 0,{},{},Default,,0,0,0,,{}\n",
                    time(&entry.start_time),
                    time(&entry.end_time),
                    entry.text.replace('\n', "\\N")
                ));
            }
            output
        }
        SubtitleFormat::Lrc => entries
            .iter()
            .map(|entry| format!("[{}]{}\n", time(&entry.start_time), entry.text.replace('\n', " / ")))
            .collect(),
    }
}

/// Convert between two known formats
pub fn convert_formats(
    content: &str,
    from: SubtitleFormat,
    to: SubtitleFormat,
) -> Result<String, SubtitleError> {
    let entries = parse(content, from);
    if entries.is_empty() {
        return Err(SubtitleError::ConversionUnsupported {
            from: from.to_string(),
            to: to.to_string(),
            reason: "no subtitle entries could be parsed".to_string(),
        });
    }
    debug!("Converting {} entries from {} to {}", entries.len(), from, to);
    Ok(render(&entries, from, to))
}

/// Convert between formats named by their extension
pub fn convert(content: &str, from: &str, to: &str) -> Result<String, SubtitleError> {
    let unsupported = |name: &str| SubtitleError::ConversionUnsupported {
        from: from.to_string(),
        to: to.to_string(),
        reason: format!("unknown format '{}'", name),
    };
    let source: SubtitleFormat = from.parse().map_err(|_| unsupported(from))?;
    let target: SubtitleFormat = to.parse().map_err(|_| unsupported(to))?;
    convert_formats(content, source, target)
}
