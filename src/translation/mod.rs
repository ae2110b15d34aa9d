/*!
 * Translation of subtitle documents.
 *
 * - `orchestrator`: batched, bounded-concurrency translation of text lists
 * - `cache`: translation cache shared by a translator's requests
 * - `pipeline`: detect, extract, translate, merge and convert one document
 * - `prompts`: prompt templates for chat-completion services
 */

pub mod cache;
pub mod orchestrator;
pub mod pipeline;
pub mod prompts;

// Re-export main types for easier usage
pub use self::cache::TranslationCache;
pub use self::orchestrator::{BatchOptions, BatchTranslator, TranslationStats};
pub use self::pipeline::{DocumentAnalysis, DocumentSettings, TranslatedDocument, analyze, translate_document};
pub use self::prompts::{PromptTemplate, PromptTemplates};
