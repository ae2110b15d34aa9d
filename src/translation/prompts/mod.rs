/*!
 * Prompt construction for chat-completion translation services.
 */

pub mod templates;

pub use templates::{PromptTemplate, PromptTemplates, RenderedPrompt};
