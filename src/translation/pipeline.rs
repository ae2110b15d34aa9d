/*!
 * Whole-document translation.
 *
 * detect → extract → translate → merge → (optional) convert. The output
 * format is the explicit one from the settings, or the natural output for
 * the source format: LRC stays LRC, ASS stays ASS, bilingual SRT/VTT
 * becomes a two-style ASS file.
 */

use log::{debug, warn};

use super::orchestrator::BatchTranslator;
use crate::app_config::Config;
use crate::errors::{SubtitleError, TranslationError};
use crate::subtitle::{
    self, BilingualPosition, MergeMode, RawDocument, SubtitleFormat, build_bilingual_ass, detect_or_err,
    extract, reinsert,
};

/// Per-document translation settings
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSettings {
    pub source_language: String,
    pub target_language: String,
    pub bilingual: Option<BilingualPosition>,
    pub output_format: Option<SubtitleFormat>,
}

impl DocumentSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            source_language: config.source_language.clone(),
            target_language: config.target_language.clone(),
            bilingual: config.bilingual(),
            output_format: config.output_format.target(),
        }
    }

    /// Format the translated document is written in
    pub fn target_format(&self, source: SubtitleFormat) -> SubtitleFormat {
        self.output_format
            .unwrap_or_else(|| source.natural_output(self.bilingual.is_some()))
    }
}

/// What a document contains, without translating it
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentAnalysis {
    pub format: SubtitleFormat,
    pub line_count: usize,
    pub entries: usize,
    pub field_offset: Option<usize>,
}

/// Result of translating one document
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedDocument {
    pub content: String,
    pub format: SubtitleFormat,
    pub source_format: SubtitleFormat,
    pub entries: usize,
}

/// Detect and extract without translating
pub fn analyze(content: &str) -> Result<DocumentAnalysis, SubtitleError> {
    let document = RawDocument::parse(content);
    let format = detect_or_err(document.lines())?;
    let map = extract(document.lines(), format);

    Ok(DocumentAnalysis {
        format,
        line_count: document.lines().len(),
        entries: map.len(),
        field_offset: map.field_offset,
    })
}

/// Translate one subtitle document
pub async fn translate_document(
    translator: &BatchTranslator,
    content: &str,
    settings: &DocumentSettings,
    progress: impl Fn(usize, usize),
) -> Result<TranslatedDocument, TranslationError> {
    let document = RawDocument::parse(content);
    let source_format = detect_or_err(document.lines())?;
    let map = extract(document.lines(), source_format);
    if map.is_empty() {
        return Err(SubtitleError::ExtractionEmpty.into());
    }
    debug!("Detected {} with {} translatable lines", source_format, map.len());

    let translated = translator
        .translate_batch_with_progress(
            &map.content,
            &settings.source_language,
            &settings.target_language,
            progress,
        )
        .await?;

    let target_format = settings.target_format(source_format);

    let (merged, merged_format) = match settings.bilingual {
        Some(position)
            if target_format == SubtitleFormat::Ass
                && matches!(source_format, SubtitleFormat::Srt | SubtitleFormat::Vtt) =>
        {
            let ass = build_bilingual_ass(document.lines(), &map, &translated, source_format, position)?;
            (ass, SubtitleFormat::Ass)
        }
        bilingual => {
            let mode = bilingual.map_or(MergeMode::Monolingual, MergeMode::Bilingual);
            let lines = reinsert(document.lines(), &map, &translated, source_format, mode)?;
            (document.with_lines(lines).to_text(), source_format)
        }
    };

    let (content, format) = if merged_format == target_format {
        (merged, merged_format)
    } else {
        match subtitle::convert_formats(&merged, merged_format, target_format) {
            Ok(converted) => (converted, target_format),
            Err(e) => {
                warn!("{}; keeping {} output", e, merged_format);
                (merged, merged_format)
            }
        }
    };

    Ok(TranslatedDocument {
        content,
        format,
        source_format,
        entries: map.len(),
    })
}
