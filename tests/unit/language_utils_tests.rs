/*!
 * Tests for language utility functions
 */

use subtitle_translator::language_utils::{
    display_name, get_language_name, is_valid_output_language_code, is_valid_source_language_code,
    language_codes_match, normalize_to_part2t, validate_language_code,
};

/// Test validation of 2 and 3 letter codes
#[test]
fn test_validate_language_code_withIsoCodes_shouldAccept() {
    assert!(validate_language_code("en").is_ok());
    assert!(validate_language_code("FRA").is_ok());
    assert!(validate_language_code("ger").is_ok());
    assert!(validate_language_code("xx").is_err());
    assert!(validate_language_code("english").is_err());
}

/// Test normalization to the 3-letter terminology code
#[test]
fn test_normalize_to_part2t_withVariants_shouldUnify() {
    assert_eq!(normalize_to_part2t("de").unwrap(), "deu");
    assert_eq!(normalize_to_part2t("ger").unwrap(), "deu");
    assert_eq!(normalize_to_part2t(" DEU ").unwrap(), "deu");
    assert!(normalize_to_part2t("zz").is_err());
}

/// Test matching between code spellings
#[test]
fn test_language_codes_match_withEquivalentCodes_shouldMatch() {
    assert!(language_codes_match("fr", "fre"));
    assert!(language_codes_match("zh", "chi"));
    assert!(!language_codes_match("en", "fr"));
    assert!(!language_codes_match("auto", "en"));
}

/// Test language names
#[test]
fn test_get_language_name_withRegionalAndAuto_shouldUseBaseName() {
    assert_eq!(get_language_name("fr").unwrap(), "French");
    assert_eq!(get_language_name("pt-br").unwrap(), "Portuguese");
    assert_eq!(get_language_name("auto").unwrap(), "Auto-detect");
    assert_eq!(display_name("qq"), "qq");
}

/// Test target and source code acceptance
#[test]
fn test_language_code_validity_withRegionalVariants_shouldAccept() {
    assert!(is_valid_output_language_code("zh-hant"));
    assert!(is_valid_output_language_code("es-419"));
    assert!(!is_valid_output_language_code("en-us-x"));
    assert!(!is_valid_output_language_code("auto"));

    assert!(is_valid_source_language_code("AUTO"));
    assert!(is_valid_source_language_code("ja"));
    assert!(!is_valid_source_language_code(""));
}
