/*!
 * Reinsertion of translated text into the original line layout.
 *
 * Monolingual merges swap the text span of each content line and keep
 * the rest of the line (ASS event fields, LRC tags) intact. Bilingual
 * merges keep the original text next to the translation; for SRT and VTT
 * sources the bilingual output is restructured into ASS events with one
 * `Secondary` and one `Default` line per time range.
 */

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

use super::converter::ASS_HEADER;
use super::extractor::{ContentMap, DEFAULT_ASS_FIELD_OFFSET, split_ass_line};
use super::timecode::{self, LRC_LEADING_TAGS};
use super::SubtitleFormat;
use crate::errors::SubtitleError;

/// Where the original text sits relative to the translation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BilingualPosition {
    Above,
    #[default]
    Below,
}

impl fmt::Display for BilingualPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Above => write!(f, "above"),
            Self::Below => write!(f, "below"),
        }
    }
}

impl FromStr for BilingualPosition {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "above" => Ok(Self::Above),
            "below" => Ok(Self::Below),
            _ => Err(anyhow::anyhow!("Invalid bilingual position: {}", s)),
        }
    }
}

/// How a translated line replaces its original
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    Monolingual,
    Bilingual(BilingualPosition),
}

fn check_alignment(map: &ContentMap, translated: &[String]) -> Result<(), SubtitleError> {
    if map.indices.len() != map.content.len() {
        return Err(SubtitleError::AlignmentMismatch {
            expected: map.content.len(),
            actual: map.indices.len(),
        });
    }
    if translated.len() != map.content.len() {
        return Err(SubtitleError::AlignmentMismatch {
            expected: map.content.len(),
            actual: translated.len(),
        });
    }
    Ok(())
}

/// Splice translations back into the document lines.
///
/// Lines that are not content pass through untouched. Bilingual SRT/VTT
/// entries become two lines, so the result may be longer than the input.
pub fn reinsert<S: AsRef<str>>(
    lines: &[S],
    map: &ContentMap,
    translated: &[String],
    format: SubtitleFormat,
    mode: MergeMode,
) -> Result<Vec<String>, SubtitleError> {
    check_alignment(map, translated)?;

    let replacements: HashMap<usize, usize> = map
        .indices
        .iter()
        .enumerate()
        .map(|(entry, &line)| (line, entry))
        .collect();
    let field_offset = map.field_offset.unwrap_or(DEFAULT_ASS_FIELD_OFFSET);

    let mut output = Vec::with_capacity(lines.len());
    for (index, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        match replacements.get(&index) {
            Some(&entry) => output.extend(merge_line(
                line,
                &map.content[entry],
                &translated[entry],
                format,
                mode,
                field_offset,
            )),
            None => output.push(line.to_string()),
        }
    }

    Ok(output)
}

fn merge_line(
    line: &str,
    original: &str,
    translated: &str,
    format: SubtitleFormat,
    mode: MergeMode,
    field_offset: usize,
) -> Vec<String> {
    if mode == MergeMode::Monolingual && original == translated {
        return vec![line.to_string()];
    }

    match format {
        SubtitleFormat::Srt | SubtitleFormat::Vtt => match mode {
            MergeMode::Monolingual => vec![translated.to_string()],
            MergeMode::Bilingual(BilingualPosition::Below) => {
                vec![line.to_string(), translated.to_string()]
            }
            MergeMode::Bilingual(BilingualPosition::Above) => {
                vec![translated.to_string(), line.to_string()]
            }
        },
        SubtitleFormat::Lrc => {
            let prefix = LRC_LEADING_TAGS.find(line).map(|m| m.as_str()).unwrap_or("");
            let merged = match mode {
                MergeMode::Monolingual => {
                    let trailing = &line[line.trim_end().len()..];
                    format!("{}{}{}", prefix, translated, trailing)
                }
                MergeMode::Bilingual(BilingualPosition::Below) => {
                    format!("{} {} / {}", prefix.trim_end(), original, translated)
                }
                MergeMode::Bilingual(BilingualPosition::Above) => {
                    format!("{} {} / {}", prefix.trim_end(), translated, original)
                }
            };
            vec![merged]
        }
        SubtitleFormat::Ass => {
            let Some((prefix, _)) = split_ass_line(line, field_offset) else {
                return vec![line.to_string()];
            };
            let merged = match mode {
                MergeMode::Monolingual => format!("{}{}", prefix, translated),
                MergeMode::Bilingual(BilingualPosition::Below) => {
                    format!("{}\\N{}", line, translated)
                }
                MergeMode::Bilingual(BilingualPosition::Above) => {
                    format!("{}{}\\N{}", prefix, translated, original)
                }
            };
            vec![merged]
        }
    }
}

// @struct: Bilingual ASS event pair for one time range
#[derive(Debug)]
struct BilingualCue {
    start: String,
    end: String,
    first: String,
    second: String,
}

/// Restructure a bilingual SRT/VTT translation into an ASS document.
///
/// Content lines are grouped by the nearest preceding time range. Each
/// group yields one `Secondary` event holding the first text and one
/// `Default` event holding the second; with [`BilingualPosition::Above`]
/// the original comes first. Lines sharing a time range are joined with
/// `\N`. A content line with no time range above it is dropped.
pub fn build_bilingual_ass<S: AsRef<str>>(
    lines: &[S],
    map: &ContentMap,
    translated: &[String],
    source_format: SubtitleFormat,
    position: BilingualPosition,
) -> Result<String, SubtitleError> {
    check_alignment(map, translated)?;

    let mut cues: Vec<BilingualCue> = Vec::new();
    let mut by_range: HashMap<(String, String), usize> = HashMap::new();
    let mut current_range: Option<(String, String)> = None;
    let mut cursor = 0;

    for (entry, &index) in map.indices.iter().enumerate() {
        while cursor <= index && cursor < lines.len() {
            if let Some(range) = timecode::parse_time_range(lines[cursor].as_ref()) {
                current_range = Some(range);
            }
            cursor += 1;
        }

        let Some((start, end)) = &current_range else {
            warn!(
                "Dropping subtitle line {} with no preceding time range: '{}'",
                index + 1,
                map.content[entry]
            );
            continue;
        };

        let key = (
            timecode::normalize(start, source_format, SubtitleFormat::Ass),
            timecode::normalize(end, source_format, SubtitleFormat::Ass),
        );
        let original = map.content[entry].trim();
        let translation = translated[entry].trim();
        let (first, second) = match position {
            BilingualPosition::Above => (original, translation),
            BilingualPosition::Below => (translation, original),
        };

        match by_range.get(&key) {
            Some(&slot) => {
                let cue = &mut cues[slot];
                cue.first.push_str("\\N");
                cue.first.push_str(first);
                cue.second.push_str("\\N");
                cue.second.push_str(second);
            }
            None => {
                by_range.insert(key.clone(), cues.len());
                cues.push(BilingualCue {
                    start: key.0,
                    end: key.1,
                    first: first.to_string(),
                    second: second.to_string(),
                });
            }
        }
    }

    let mut output = String::from(ASS_HEADER);
    for cue in &cues {
        output.push_str(&format!(
            "Dialogue: 0,{},{},Secondary,NTP,0000,0000,0000,,{}\n",
            cue.start, cue.end, cue.first
        ));
        output.push_str(&format!(
            "Dialogue: 0,{},{},Default,NTP,0000,0000,0000,,{}\n",
            cue.start, cue.end, cue.second
        ));
    }

    Ok(output)
}
