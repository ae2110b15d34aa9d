/*!
 * Integration tests for controller runs over files and folders
 */

use std::sync::Arc;
use tokio_test::assert_ok;

use subtitle_translator::app_config::TranslationMethod;
use subtitle_translator::app_controller::{Controller, FileOutcome, RunStats};
use subtitle_translator::file_utils::FileManager;
use subtitle_translator::providers::mock::MockProvider;
use subtitle_translator::subtitle::SubtitleFormat;

use crate::common::{self, SAMPLE_LRC, SAMPLE_SRT, test_config};

fn controller(provider: &MockProvider) -> Controller {
    common::init_test_logging();
    Controller::with_provider(test_config(), Arc::new(provider.clone())).without_progress()
}

/// Test a single file run writes `{stem}_{lang}.srt`
#[tokio::test]
async fn test_run_withSingleFile_shouldWriteTranslatedCopy() {
    let input_dir = common::create_temp_dir().unwrap();
    let output_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_subtitle(input_dir.path(), "movie.srt").unwrap();
    let provider = MockProvider::working();

    let stats = assert_ok!(controller(&provider).run(&input, output_dir.path(), false).await);

    assert_eq!(
        stats,
        RunStats {
            processed: 1,
            successful: 1,
            failed: 0,
            skipped: 0
        }
    );
    let output = output_dir.path().join("movie_fr.srt");
    let written = FileManager::read_to_string(&output).unwrap();
    assert_eq!(
        written,
        SAMPLE_SRT
            .replace("This is", "[fr] This is")
            .replace("It contains", "[fr] It contains")
            .replace("For testing", "[fr] For testing")
    );
    assert_eq!(provider.request_count(), 3);
}

/// Test a folder run isolates failures and skips empty files
#[tokio::test]
async fn test_run_withFolder_shouldCountFailuresAndSkips() {
    let input_dir = common::create_temp_dir().unwrap();
    let output_dir = common::create_temp_dir().unwrap();
    common::create_test_subtitle(input_dir.path(), "good.srt").unwrap();
    common::create_test_file(input_dir.path(), "broken.srt", "this is not a subtitle").unwrap();
    common::create_test_file(input_dir.path(), "empty.vtt", "WEBVTT\n").unwrap();
    common::create_test_file(input_dir.path(), "album/song.lrc", SAMPLE_LRC).unwrap();
    let provider = MockProvider::working();

    let stats = assert_ok!(controller(&provider).run(input_dir.path(), output_dir.path(), false).await);

    assert_eq!(stats.processed, 4);
    assert_eq!(stats.successful, 2);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.skipped, 1);
    assert!(FileManager::file_exists(output_dir.path().join("good_fr.srt")));
    assert!(FileManager::file_exists(output_dir.path().join("song_fr.lrc")));
    assert!(!FileManager::file_exists(output_dir.path().join("broken_fr.srt")));
    assert!(!FileManager::file_exists(output_dir.path().join("empty_fr.vtt")));
}

/// Test files in one run share the translation cache
#[tokio::test]
async fn test_run_withDuplicateFiles_shouldTranslateEachTextOnce() {
    let input_dir = common::create_temp_dir().unwrap();
    let output_dir = common::create_temp_dir().unwrap();
    common::create_test_subtitle(input_dir.path(), "part1.srt").unwrap();
    common::create_test_subtitle(input_dir.path(), "part2.srt").unwrap();
    let provider = MockProvider::working();

    let stats = assert_ok!(controller(&provider).run(input_dir.path(), output_dir.path(), false).await);

    assert_eq!(stats.successful, 2);
    assert_eq!(provider.request_count(), 3);
}

/// Test a dry run analyzes without calling the provider or writing output
#[tokio::test]
async fn test_translate_file_withDryRun_shouldOnlyAnalyze() {
    let input_dir = common::create_temp_dir().unwrap();
    let output_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(input_dir.path(), "lyrics.lrc", SAMPLE_LRC).unwrap();
    let provider = MockProvider::working();

    let outcome = assert_ok!(controller(&provider).translate_file(&input, output_dir.path(), true).await);

    match outcome {
        FileOutcome::DryRun(analysis) => {
            assert_eq!(analysis.format, SubtitleFormat::Lrc);
            assert_eq!(analysis.entries, 2);
        }
        other => panic!("expected a dry run, got {:?}", other),
    }
    assert_eq!(provider.request_count(), 0);
    assert!(FileManager::find_subtitle_files(output_dir.path()).unwrap().is_empty());
}

/// Test bilingual output for SRT is written as ASS
#[tokio::test]
async fn test_translate_file_withBilingualConfig_shouldWriteAss() {
    let input_dir = common::create_temp_dir().unwrap();
    let output_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_subtitle(input_dir.path(), "talk.srt").unwrap();

    let mut config = test_config();
    config.bilingual_subtitle = true;
    let controller = Controller::with_provider(config, Arc::new(MockProvider::working())).without_progress();

    let outcome = assert_ok!(controller.translate_file(&input, output_dir.path(), false).await);

    assert_eq!(outcome, FileOutcome::Written(vec![output_dir.path().join("talk_fr.ass")]));
}

/// Test several target languages write one translated copy each
#[tokio::test]
async fn test_translate_file_withTwoTargetLanguages_shouldWriteTwoFiles() {
    let input_dir = common::create_temp_dir().unwrap();
    let output_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_subtitle(input_dir.path(), "movie.srt").unwrap();
    let provider = MockProvider::working();

    let mut config = test_config();
    config.target_languages = vec!["fr".to_string(), "de".to_string(), "FR".to_string()];
    let controller = Controller::with_provider(config, Arc::new(provider.clone())).without_progress();

    let outcome = assert_ok!(controller.translate_file(&input, output_dir.path(), false).await);

    let french = output_dir.path().join("movie_fr.srt");
    let german = output_dir.path().join("movie_de.srt");
    assert_eq!(outcome, FileOutcome::Written(vec![french.clone(), german.clone()]));
    assert!(FileManager::read_to_string(&french).unwrap().contains("[fr] This is a test subtitle."));
    assert!(FileManager::read_to_string(&german).unwrap().contains("[de] This is a test subtitle."));
    assert_eq!(provider.request_count(), 6);
    assert_eq!(controller.translator().cache().len(), 6);
}

/// Test an empty document is skipped once for all target languages
#[tokio::test]
async fn test_translate_file_withTwoTargetsAndEmptyDocument_shouldSkip() {
    let input_dir = common::create_temp_dir().unwrap();
    let output_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(input_dir.path(), "empty.vtt", "WEBVTT\n").unwrap();

    let mut config = test_config();
    config.target_languages = vec!["fr".to_string(), "de".to_string()];
    let controller = Controller::with_provider(config, Arc::new(MockProvider::working())).without_progress();

    let outcome = assert_ok!(controller.translate_file(&input, output_dir.path(), false).await);

    assert_eq!(outcome, FileOutcome::Skipped);
}

/// Test a missing input path is an error, not an empty run
#[tokio::test]
async fn test_run_withMissingInput_shouldFail() {
    let output_dir = common::create_temp_dir().unwrap();
    let provider = MockProvider::working();

    let result = controller(&provider)
        .run(&output_dir.path().join("nope.srt"), output_dir.path(), false)
        .await;

    assert!(result.is_err());
}

/// Test a controller is only built from a valid configuration
#[test]
fn test_with_config_withInvalidConfig_shouldFail() {
    let mut config = test_config();
    config.target_language = "xx".to_string();
    assert!(Controller::with_config(config).is_err());

    let mut config = test_config();
    config.translation_method = TranslationMethod::DeepL;
    assert!(Controller::with_config(config).is_err());

    let mut config = test_config();
    config.target_languages = vec!["de".to_string(), "xx".to_string()];
    assert!(Controller::with_config(config).is_err());

    let controller = Controller::with_config(test_config()).unwrap();
    assert_eq!(controller.translator().provider_id(), "gtxFreeAPI");
    assert_eq!(controller.config().target_language, "fr");
}
