/*!
 * Prompt templates for chat-completion translation services.
 *
 * Templates use `${sourceLanguage}`, `${targetLanguage}` and `${content}`
 * placeholders. Language codes are rendered as language names.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::app_config::LlmPrompts;
use crate::language_utils;

// "from ${sourceLanguage} to" reads badly when the source is detected by the model
static AUTO_SOURCE_PHRASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"from \$\{sourceLanguage\} (to|into)").unwrap());

const SOURCE_PLACEHOLDER: &str = "${sourceLanguage}";
const TARGET_PLACEHOLDER: &str = "${targetLanguage}";
const CONTENT_PLACEHOLDER: &str = "${content}";

/// A single prompt template.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Raw template text
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Render the template for one text.
    ///
    /// With an `auto` source, "from ${sourceLanguage} to" collapses to "into".
    pub fn render(&self, source_language: &str, target_language: &str, content: &str) -> String {
        let auto_source = source_language.trim().eq_ignore_ascii_case("auto");
        let template = if auto_source {
            AUTO_SOURCE_PHRASE.replace_all(&self.template, "into").into_owned()
        } else {
            self.template.clone()
        };

        template
            .replace(SOURCE_PLACEHOLDER, &language_utils::display_name(source_language))
            .replace(TARGET_PLACEHOLDER, &language_utils::display_name(target_language))
            .replace(CONTENT_PLACEHOLDER, content)
    }
}

/// System and user templates used together for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplates {
    pub system: PromptTemplate,
    pub user: PromptTemplate,
}

/// Rendered chat messages
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPrompt {
    pub system: String,
    pub user: String,
}

impl PromptTemplates {
    pub fn new(prompts: &LlmPrompts) -> Self {
        Self {
            system: PromptTemplate::new(&prompts.system),
            user: PromptTemplate::new(&prompts.user),
        }
    }

    /// Render both templates for one text
    pub fn render(&self, source_language: &str, target_language: &str, content: &str) -> RenderedPrompt {
        RenderedPrompt {
            system: self.system.render(source_language, target_language, content),
            user: self.user.render(source_language, target_language, content),
        }
    }
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self::new(&LlmPrompts::default())
    }
}
