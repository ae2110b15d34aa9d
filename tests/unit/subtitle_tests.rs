/*!
 * Tests for format detection, content extraction, reinsertion and conversion
 */

use subtitle_translator::errors::SubtitleError;
use subtitle_translator::subtitle::{
    self, BilingualPosition, ContentMap, MergeMode, RawDocument, SubtitleFormat, build_bilingual_ass, detect,
    extract, reinsert,
};

use crate::common::{self, SAMPLE_ASS, SAMPLE_LRC, SAMPLE_SRT, SAMPLE_VTT};

fn translated(map: &ContentMap, prefix: &str) -> Vec<String> {
    map.content.iter().map(|text| format!("{}{}", prefix, text)).collect()
}

/// Test that each sample is detected as its own format
#[test]
fn test_detect_withSampleDocuments_shouldRecognizeEachFormat() {
    assert_eq!(detect(&common::lines(SAMPLE_SRT)), Some(SubtitleFormat::Srt));
    assert_eq!(detect(&common::lines(SAMPLE_VTT)), Some(SubtitleFormat::Vtt));
    assert_eq!(detect(&common::lines(SAMPLE_ASS)), Some(SubtitleFormat::Ass));
    assert_eq!(detect(&common::lines(SAMPLE_LRC)), Some(SubtitleFormat::Lrc));
}

/// Test that VTT without a header is still told apart from SRT by its separator
#[test]
fn test_detect_withHeaderlessVtt_shouldUseFractionSeparator() {
    let lines = common::lines("00:00:01.000 --> 00:00:02.000\nHi\n\n00:00:03.000 --> 00:00:04.000\nThere\n");
    assert_eq!(detect(&lines), Some(SubtitleFormat::Vtt));
}

/// Test that prose is not mistaken for subtitles
#[test]
fn test_detect_withProse_shouldBeUnrecognized() {
    let lines = common::lines("Dear diary,\ntoday was long.\n");
    assert_eq!(detect(&lines), None);
    assert_eq!(subtitle::detect_or_err(&lines), Err(SubtitleError::UnrecognizedFormat));
}

/// Test the minimal SRT document
#[test]
fn test_extract_withMinimalSrt_shouldReturnTextAndIndex() {
    let lines = common::lines("1\n00:00:01,000 --> 00:00:02,000\nHello\n");
    assert_eq!(detect(&lines), Some(SubtitleFormat::Srt));

    let map = extract(&lines, SubtitleFormat::Srt);
    assert_eq!(map.content, vec!["Hello"]);
    assert_eq!(map.indices, vec![2]);
    assert_eq!(map.field_offset, None);
}

/// Test the minimal LRC document
#[test]
fn test_extract_withMinimalLrc_shouldStripTag() {
    let lines = common::lines("[00:01.00]La la la");
    assert_eq!(detect(&lines), Some(SubtitleFormat::Lrc));

    let map = extract(&lines, SubtitleFormat::Lrc);
    assert_eq!(map.content, vec!["La la la"]);
    assert_eq!(map.indices, vec![0]);
}

/// Test that VTT cue identifiers and cue settings are not translated
#[test]
fn test_extract_withVttCueIdentifier_shouldSkipIt() {
    let map = extract(&common::lines(SAMPLE_VTT), SubtitleFormat::Vtt);
    assert_eq!(map.content, vec!["Welcome back.", "See you soon."]);
    assert_eq!(map.indices, vec![4, 7]);
}

/// Test that LRC metadata tags stay out of the content
#[test]
fn test_extract_withLrcMetadata_shouldOnlyTakeLyrics() {
    let map = extract(&common::lines(SAMPLE_LRC), SubtitleFormat::Lrc);
    assert_eq!(map.content, vec!["First line", "Chorus line"]);
    assert_eq!(map.indices, vec![2, 3]);
}

/// Test that ASS text keeps commas inside the text field
#[test]
fn test_extract_withAssEvents_shouldTakeTextField() {
    let map = extract(&common::lines(SAMPLE_ASS), SubtitleFormat::Ass);
    assert_eq!(map.field_offset, Some(9));
    assert_eq!(map.content, vec!["Good morning, everyone.", "{\\i1}Quietly{\\i0} now."]);
    assert!(map.indices.windows(2).all(|pair| pair[0] < pair[1]));
}

/// Test that a trimmed Format line changes the field offset
#[test]
fn test_extract_withShortAssFormat_shouldUseFormatCommaCount() {
    let lines = common::lines(
        "[Events]\nFormat: Layer, Start, End, Style, Text\nDialogue: 0,0:00:01.00,0:00:02.00,Default,Hi, you\n",
    );
    let map = extract(&lines, SubtitleFormat::Ass);
    assert_eq!(map.field_offset, Some(4));
    assert_eq!(map.content, vec!["Hi, you"]);
}

/// Test that identity reinsertion reproduces every sample exactly
#[test]
fn test_reinsert_withIdentityTranslation_shouldReproduceDocument() {
    for (content, format) in [
        (SAMPLE_SRT, SubtitleFormat::Srt),
        (SAMPLE_VTT, SubtitleFormat::Vtt),
        (SAMPLE_ASS, SubtitleFormat::Ass),
        (SAMPLE_LRC, SubtitleFormat::Lrc),
    ] {
        let document = RawDocument::parse(content);
        let map = extract(document.lines(), format);
        let lines = reinsert(document.lines(), &map, &map.content, format, MergeMode::Monolingual).unwrap();
        assert_eq!(document.with_lines(lines).to_text(), content, "{} changed", format);
    }
}

/// Test that CRLF line endings and a BOM survive the round trip
#[test]
fn test_reinsert_withCrlfAndBom_shouldRestoreBoth() {
    let content = "\u{feff}1\r\n00:00:01,000 --> 00:00:02,000\r\nHello\r\n";
    let document = RawDocument::parse(content);
    let map = extract(document.lines(), SubtitleFormat::Srt);
    let lines = reinsert(document.lines(), &map, &map.content, SubtitleFormat::Srt, MergeMode::Monolingual).unwrap();
    assert_eq!(document.with_lines(lines).to_text(), content);
}

/// Test that a file mixing CRLF and LF lines comes back byte for byte
#[test]
fn test_reinsert_withMixedLineEndings_shouldRestoreEachTerminator() {
    let content = "1\r\n00:00:01,000 --> 00:00:02,000\r\nHello\n\n2\n00:00:03,000 --> 00:00:04,000\nBye\r\n";
    let document = RawDocument::parse(content);
    let map = extract(document.lines(), SubtitleFormat::Srt);
    assert_eq!(map.content, vec!["Hello", "Bye"]);

    let lines = reinsert(document.lines(), &map, &map.content, SubtitleFormat::Srt, MergeMode::Monolingual).unwrap();
    assert_eq!(document.with_lines(lines).to_text(), content);
}

/// Test VTT cues with no blank line between them keep all their text
#[test]
fn test_extract_withUnseparatedVttCues_shouldNotDropText() {
    let lines = common::lines("WEBVTT\n\ncue-1\n00:00:01.000 --> 00:00:02.000\nHello\n00:00:03.000 --> 00:00:04.000\nBye\n\ncue-3\n00:00:05.000 --> 00:00:06.000\nAgain");
    let map = extract(&lines, SubtitleFormat::Vtt);

    assert_eq!(map.content, vec!["Hello", "Bye", "Again"]);
    assert_eq!(map.indices, vec![4, 6, 10]);
}

/// Test monolingual ASS and LRC merges keep their line prefixes
#[test]
fn test_reinsert_withMonolingualMerge_shouldKeepStructure() {
    let ass = common::lines(SAMPLE_ASS);
    let map = extract(&ass, SubtitleFormat::Ass);
    let merged = reinsert(&ass, &map, &translated(&map, "T:"), SubtitleFormat::Ass, MergeMode::Monolingual).unwrap();
    assert_eq!(merged[map.indices[0]], "Dialogue: 0,0:00:01.00,0:00:03.00,Default,,0,0,0,,T:Good morning, everyone.");

    let lrc = common::lines(SAMPLE_LRC);
    let map = extract(&lrc, SubtitleFormat::Lrc);
    let merged = reinsert(&lrc, &map, &translated(&map, "T:"), SubtitleFormat::Lrc, MergeMode::Monolingual).unwrap();
    assert_eq!(merged[3], "[00:05.50][00:20.00]T:Chorus line");
    assert_eq!(merged[0], "[ti:Song]");
}

/// Test bilingual SRT reinsertion in both positions
#[test]
fn test_reinsert_withBilingualSrt_shouldAddLine() {
    let lines = common::lines("1\n00:00:01,000 --> 00:00:02,000\nHello\n");
    let map = extract(&lines, SubtitleFormat::Srt);
    let translation = vec!["Bonjour".to_string()];

    let below = reinsert(&lines, &map, &translation, SubtitleFormat::Srt, MergeMode::Bilingual(BilingualPosition::Below)).unwrap();
    assert_eq!(below[2..4], ["Hello".to_string(), "Bonjour".to_string()]);

    let above = reinsert(&lines, &map, &translation, SubtitleFormat::Srt, MergeMode::Bilingual(BilingualPosition::Above)).unwrap();
    assert_eq!(above[2..4], ["Bonjour".to_string(), "Hello".to_string()]);
}

/// Test bilingual LRC and ASS joins
#[test]
fn test_reinsert_withBilingualLrcAndAss_shouldJoinOnOneLine() {
    let lrc = common::lines("[00:01.00]La la la");
    let map = extract(&lrc, SubtitleFormat::Lrc);
    let merged = reinsert(&lrc, &map, &["Lo lo lo".to_string()], SubtitleFormat::Lrc, MergeMode::Bilingual(BilingualPosition::Below)).unwrap();
    assert_eq!(merged, vec!["[00:01.00] La la la / Lo lo lo"]);

    let ass = common::lines("[Events]\nFormat: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\nDialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,Hello");
    let map = extract(&ass, SubtitleFormat::Ass);
    let translation = vec!["Hallo".to_string()];

    let below = reinsert(&ass, &map, &translation, SubtitleFormat::Ass, MergeMode::Bilingual(BilingualPosition::Below)).unwrap();
    assert_eq!(below[2], "Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,Hello\\NHallo");

    let above = reinsert(&ass, &map, &translation, SubtitleFormat::Ass, MergeMode::Bilingual(BilingualPosition::Above)).unwrap();
    assert_eq!(above[2], "Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,Hallo\\NHello");
}

/// Test that a translation count mismatch is rejected
#[test]
fn test_reinsert_withWrongTranslationCount_shouldFailAlignment() {
    let lines = common::lines(SAMPLE_SRT);
    let map = extract(&lines, SubtitleFormat::Srt);
    let result = reinsert(&lines, &map, &["only one".to_string()], SubtitleFormat::Srt, MergeMode::Monolingual);
    assert_eq!(result, Err(SubtitleError::AlignmentMismatch { expected: 3, actual: 1 }));
}

/// Test that two SRT entries sharing a time range become one event pair
#[test]
fn test_build_bilingual_ass_withSharedTimeRange_shouldEmitOnePair() {
    let lines = common::lines("1\n00:00:01,000 --> 00:00:02,000\nA\n\n2\n00:00:01,000 --> 00:00:02,000\nB\n");
    let map = extract(&lines, SubtitleFormat::Srt);
    let ass = build_bilingual_ass(&lines, &map, &translated(&map, "t"), SubtitleFormat::Srt, BilingualPosition::Below).unwrap();

    let events: Vec<&str> = ass.lines().filter(|line| line.starts_with("Dialogue:")).collect();
    assert_eq!(
        events,
        vec![
            "Dialogue: 0,0:00:01.00,0:00:02.00,Secondary,NTP,0000,0000,0000,,tA\\NtB",
            "Dialogue: 0,0:00:01.00,0:00:02.00,Default,NTP,0000,0000,0000,,A\\NB",
        ]
    );
    assert_eq!(detect(&common::lines(&ass)), Some(SubtitleFormat::Ass));
}

/// Test that content lines with no time range above them are dropped
#[test]
fn test_build_bilingual_ass_withOrphanLine_shouldDropIt() {
    let lines = common::lines("Stray text\n00:00:01,000 --> 00:00:02,000\nKept\n");
    let map = ContentMap {
        content: vec!["Stray text".to_string(), "Kept".to_string()],
        indices: vec![0, 2],
        field_offset: None,
    };
    let ass = build_bilingual_ass(&lines, &map, &translated(&map, "~"), SubtitleFormat::Srt, BilingualPosition::Above).unwrap();

    assert!(!ass.contains("Stray"));
    assert!(ass.contains(",Secondary,NTP,0000,0000,0000,,Kept\n"));
    assert!(ass.contains(",Default,NTP,0000,0000,0000,,~Kept\n"));
}

/// Test that rendering into each format is detected as that format
#[test]
fn test_convert_withEveryTarget_shouldBeDetectedAsTarget() {
    for target in SubtitleFormat::ALL {
        let converted = subtitle::convert_formats(SAMPLE_SRT, SubtitleFormat::Srt, target).unwrap();
        assert_eq!(detect(&common::lines(&converted)), Some(target), "render to {}", target);
    }
}

/// Test ASS to SRT conversion drops overrides and keeps timing
#[test]
fn test_convert_withAssToSrt_shouldStripOverrides() {
    let srt = subtitle::convert(SAMPLE_ASS, "ass", "srt").unwrap();
    assert_eq!(
        srt,
        "1\n00:00:01,000 --> 00:00:03,000\nGood morning, everyone.\n\n2\n00:00:04,000 --> 00:00:06,000\nQuietly now.\n"
    );
}

/// Test LRC lines with several tags become several entries in time order
#[test]
fn test_parse_withRepeatedLrcTags_shouldExpandAndSort() {
    let entries = subtitle::parse(SAMPLE_LRC, SubtitleFormat::Lrc);
    let summary: Vec<(&str, &str)> = entries
        .iter()
        .map(|entry| (entry.start_time.as_str(), entry.text.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![("00:01.00", "First line"), ("00:05.50", "Chorus line"), ("00:20.00", "Chorus line")]
    );
}

/// Test that unknown format names and empty input are rejected
#[test]
fn test_convert_withUnknownOrEmptyInput_shouldBeUnsupported() {
    assert!(matches!(
        subtitle::convert(SAMPLE_SRT, "srt", "sub"),
        Err(SubtitleError::ConversionUnsupported { .. })
    ));
    assert!(matches!(
        subtitle::convert("", "srt", "vtt"),
        Err(SubtitleError::ConversionUnsupported { .. })
    ));
}
