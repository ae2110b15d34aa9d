/*!
 * ISO language code handling.
 *
 * Validation, normalization and matching of ISO 639-1 (2-letter) and
 * ISO 639-2 (3-letter) codes, plus the regional variants accepted as
 * translation targets.
 */

use anyhow::{Result, anyhow};
use isolang::Language;

/// Kind of ISO code a string was recognized as
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

/// ISO 639-2/B codes that differ from their 639-2/T form
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("dut", "nld"),
    ("fre", "fra"),
    ("geo", "kat"),
    ("ger", "deu"),
    ("gre", "ell"),
    ("ice", "isl"),
    ("mac", "mkd"),
    ("may", "msa"),
    ("per", "fas"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

fn bibliographic_to_terminology(code: &str) -> Option<&'static str> {
    BIBLIOGRAPHIC_CODES
        .iter()
        .find(|(bibliographic, _)| *bibliographic == code)
        .map(|(_, terminology)| *terminology)
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let normalized_code = code.trim().to_lowercase();

    match normalized_code.len() {
        2 if Language::from_639_1(&normalized_code).is_some() => Ok(LanguageCodeType::Part1),
        3 if Language::from_639_3(&normalized_code).is_some() => Ok(LanguageCodeType::Part2T),
        3 if bibliographic_to_terminology(&normalized_code).is_some() => Ok(LanguageCodeType::Part2B),
        _ => Err(anyhow!("Invalid language code: {}", code)),
    }
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    let part2t = match normalized_code.len() {
        2 => Language::from_639_1(&normalized_code).map(|lang| lang.to_639_3().to_string()),
        3 if Language::from_639_3(&normalized_code).is_some() => Some(normalized_code.clone()),
        3 => bibliographic_to_terminology(&normalized_code).map(str::to_string),
        _ => None,
    };

    part2t.ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(first), Ok(second)) => first == second,
        _ => false,
    }
}

/// Language name for prompts and logs. `auto` reads as "Auto-detect";
/// regional variants use the base language name.
pub fn get_language_name(code: &str) -> Result<String> {
    let trimmed = code.trim();
    if trimmed.eq_ignore_ascii_case("auto") {
        return Ok("Auto-detect".to_string());
    }

    let base = trimmed.split(['-', '_']).next().unwrap_or(trimmed);
    let normalized = normalize_to_part2t(base)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// Language name, or the code itself when it is not a known language
pub fn display_name(code: &str) -> String {
    get_language_name(code).unwrap_or_else(|_| code.to_string())
}

/// Whether a code may be used as a translation target and in output file
/// names: an ISO 639-1/639-2 code, optionally followed by a region or
/// script subtag (`pt-br`, `zh-hant`, `es-419`).
pub fn is_valid_output_language_code(code: &str) -> bool {
    let code = code.trim();
    let mut parts = code.split('-');
    let Some(base) = parts.next() else {
        return false;
    };
    if validate_language_code(base).is_err() {
        return false;
    }

    match (parts.next(), parts.next()) {
        (None, _) => true,
        (Some(subtag), None) => {
            (2..=4).contains(&subtag.len()) && subtag.chars().all(|c| c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}

/// Whether a code may be used as a translation source (`auto` included)
pub fn is_valid_source_language_code(code: &str) -> bool {
    code.trim().eq_ignore_ascii_case("auto") || is_valid_output_language_code(code)
}
