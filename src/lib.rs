/*!
 * # Subtitle Translator
 *
 * A Rust library for translating subtitle files while preserving their
 * structure.
 *
 * ## Features
 *
 * - Format detection for SRT, WebVTT, ASS/SSA and LRC
 * - Extraction of the translatable text with its line positions, and
 *   byte-exact reinsertion of the translations
 * - Bilingual output (original above or below the translation)
 * - Conversion between the four formats
 * - Batched translation with caching, bounded concurrency and per-line
 *   failure isolation
 * - Translation services: Google (free web endpoint and Cloud v2), DeepL,
 *   DeepLX, Azure Translator and OpenAI-compatible chat completion APIs
 *
 * ## Architecture
 *
 * - `subtitle`: format detection, extraction, merging, conversion, time codes
 * - `translation`: batch orchestration, caching, document pipeline, prompts
 * - `providers`: translation service clients
 * - `app_config`: configuration management
 * - `app_controller`: file and directory runs
 * - `file_utils`: file system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: error types
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod subtitle;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, ProviderError, SubtitleError, TranslationError};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use subtitle::{SubtitleEntry, SubtitleFormat};
pub use translation::{BatchTranslator, TranslationCache};
