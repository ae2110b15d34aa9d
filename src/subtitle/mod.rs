/*!
 * Subtitle interchange engine.
 *
 * Everything that touches subtitle text structure lives here:
 * - `timecode`: time-code parsing and normalization between the four syntaxes
 * - `detector`: format detection from raw lines
 * - `extractor`: isolation of translatable text with its line positions
 * - `merge`: reinsertion of translated text and bilingual layouts
 * - `converter`: neutral entry model and cross-format rendering
 */

use std::fmt;
use std::str::FromStr;

use crate::errors::SubtitleError;

pub mod converter;
pub mod detector;
pub mod extractor;
pub mod merge;
pub mod timecode;

pub use converter::{SubtitleEntry, convert, convert_formats, parse, render};
pub use detector::{detect, detect_or_err};
pub use extractor::{ContentMap, extract};
pub use merge::{BilingualPosition, MergeMode, build_bilingual_ass, reinsert};

/// The four supported subtitle containers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubtitleFormat {
    Srt,
    Vtt,
    Ass,
    Lrc,
}

impl SubtitleFormat {
    /// All formats, in a stable order
    pub const ALL: [SubtitleFormat; 4] = [Self::Srt, Self::Vtt, Self::Ass, Self::Lrc];

    /// File extension used when writing this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Vtt => "vtt",
            Self::Ass => "ass",
            Self::Lrc => "lrc",
        }
    }

    /// Map a file extension to a format. `ssa` is read as ASS.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "srt" => Some(Self::Srt),
            "vtt" => Some(Self::Vtt),
            "ass" | "ssa" => Some(Self::Ass),
            "lrc" => Some(Self::Lrc),
            _ => None,
        }
    }

    /// Format a translated document is written in when no explicit
    /// output format is requested.
    pub fn natural_output(&self, bilingual: bool) -> Self {
        match self {
            Self::Lrc => Self::Lrc,
            Self::Ass => Self::Ass,
            Self::Srt | Self::Vtt if bilingual => Self::Ass,
            other => *other,
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for SubtitleFormat {
    type Err = SubtitleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim()).ok_or(SubtitleError::UnrecognizedFormat)
    }
}

/// Line terminator found in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// A subtitle file as an ordered list of lines.
///
/// The byte-order mark and each line's terminator are stripped on read and
/// restored by [`RawDocument::to_text`], so unchanged lines serialize back
/// to the exact input, mixed CRLF/LF files included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    lines: Vec<String>,
    // @field: Terminator after each line but the last
    endings: Vec<LineEnding>,
    has_bom: bool,
}

impl RawDocument {
    /// Split raw text into lines
    pub fn parse(content: &str) -> Self {
        let (has_bom, body) = match content.strip_prefix('\u{feff}') {
            Some(rest) => (true, rest),
            None => (false, content),
        };

        let segments: Vec<&str> = body.split('\n').collect();
        let last = segments.len() - 1;
        let mut lines = Vec::with_capacity(segments.len());
        let mut endings = Vec::with_capacity(last);

        for (position, segment) in segments.into_iter().enumerate() {
            if position == last {
                lines.push(segment.to_string());
                break;
            }
            match segment.strip_suffix('\r') {
                Some(line) => {
                    lines.push(line.to_string());
                    endings.push(LineEnding::CrLf);
                }
                None => {
                    lines.push(segment.to_string());
                    endings.push(LineEnding::Lf);
                }
            }
        }

        Self { lines, endings, has_bom }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The most frequent terminator; LF for single-line documents and ties
    pub fn line_ending(&self) -> LineEnding {
        let crlf = self.endings.iter().filter(|e| **e == LineEnding::CrLf).count();
        if crlf * 2 > self.endings.len() {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    /// Same BOM and terminators, different lines.
    ///
    /// With the same line count every line keeps its own terminator. When
    /// a merge added lines, the positions no longer line up and every line
    /// gets the document's dominant terminator.
    pub fn with_lines(&self, lines: Vec<String>) -> Self {
        let endings = if lines.len() == self.lines.len() {
            self.endings.clone()
        } else {
            vec![self.line_ending(); lines.len().saturating_sub(1)]
        };
        Self {
            lines,
            endings,
            has_bom: self.has_bom,
        }
    }

    /// Serialize back to text
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        if self.has_bom {
            text.push('\u{feff}');
        }
        for (position, line) in self.lines.iter().enumerate() {
            text.push_str(line);
            if let Some(ending) = self.endings.get(position) {
                text.push_str(ending.as_str());
            }
        }
        text
    }
}
