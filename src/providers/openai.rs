/*!
 * OpenAI-compatible chat completion client.
 *
 * One client serves every chat-completion service; they differ only in
 * endpoint, authentication header and a few optional headers.
 */

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{Provider, check_status, http_client, map_request_error, require};
use crate::app_config::{LlmPrompts, ProviderConfig, TranslationMethod};
use crate::errors::ProviderError;
use crate::translation::prompts::PromptTemplates;

/// How the API key is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthStyle {
    Bearer,
    // Azure OpenAI uses an `api-key` header
    ApiKeyHeader,
}

/// Chat completion translator
#[derive(Debug)]
pub struct ChatCompletionTranslator {
    method: TranslationMethod,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    auth: AuthStyle,
    extra_headers: Vec<(&'static str, String)>,
    prompts: PromptTemplates,
    client: Client,
}

/// Chat message
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Default chat completion endpoint per service
pub fn default_endpoint(method: TranslationMethod) -> Option<&'static str> {
    match method {
        TranslationMethod::OpenAI => Some("https://api.openai.com/v1/chat/completions"),
        TranslationMethod::DeepSeek => Some("https://api.deepseek.com/chat/completions"),
        TranslationMethod::SiliconFlow => Some("https://api.siliconflow.cn/v1/chat/completions"),
        TranslationMethod::Groq => Some("https://api.groq.com/openai/v1/chat/completions"),
        TranslationMethod::OpenRouter => Some("https://openrouter.ai/api/v1/chat/completions"),
        _ => None,
    }
}

/// Azure OpenAI deployment URL; a full chat completion URL is kept as is
pub fn azure_openai_endpoint(base: &str, deployment: &str, api_version: &str) -> String {
    let base = base.trim().trim_end_matches('/');
    if base.contains("/chat/completions") {
        return base.to_string();
    }
    format!(
        "{}/openai/deployments/{}/chat/completions?api-version={}",
        base, deployment, api_version
    )
}

/// First choice of a chat completion, trimmed
fn first_choice(response: ChatResponse) -> Result<String, ProviderError> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.trim().to_string())
        .ok_or_else(|| ProviderError::ParseError("response has no choices".to_string()))
}

impl ChatCompletionTranslator {
    pub fn new(method: TranslationMethod, settings: &ProviderConfig, prompts: LlmPrompts) -> Result<Self, ProviderError> {
        let configured_url = settings.url.trim();

        let endpoint = match method {
            TranslationMethod::AzureOpenAI => {
                let base = require(configured_url, "Endpoint URL", method)?;
                azure_openai_endpoint(&base, settings.model.trim(), settings.api_version.trim())
            }
            TranslationMethod::Llm => require(configured_url, "Service URL", method)?,
            _ if !configured_url.is_empty() => configured_url.to_string(),
            _ => default_endpoint(method)
                .map(str::to_string)
                .ok_or_else(|| ProviderError::MissingConfiguration(format!("{} is not a chat completion service", method)))?,
        };

        // local models usually run without a key
        let api_key = if method == TranslationMethod::Llm {
            settings.api_key.trim().to_string()
        } else {
            require(&settings.api_key, "API key", method)?
        };

        let mut extra_headers = Vec::new();
        if method == TranslationMethod::OpenRouter {
            if !settings.site_url.trim().is_empty() {
                extra_headers.push(("HTTP-Referer", settings.site_url.trim().to_string()));
            }
            if !settings.site_name.trim().is_empty() {
                extra_headers.push(("X-Title", settings.site_name.trim().to_string()));
            }
        }

        Ok(Self {
            method,
            endpoint,
            api_key,
            model: settings.model.trim().to_string(),
            temperature: settings.temperature,
            auth: if method == TranslationMethod::AzureOpenAI {
                AuthStyle::ApiKeyHeader
            } else {
                AuthStyle::Bearer
            },
            extra_headers,
            prompts: PromptTemplates::new(&prompts),
            client: http_client(settings.timeout()),
        })
    }

    /// Chat completion URL requests go to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Messages sent for one text
    pub fn build_messages(&self, text: &str, source_language: &str, target_language: &str) -> Vec<ChatMessage> {
        let prompt = self.prompts.render(source_language, target_language, text);
        vec![
            ChatMessage {
                role: "system".to_string(),
                content: prompt.system,
            },
            ChatMessage {
                role: "user".to_string(),
                content: prompt.user,
            },
        ]
    }
}

#[async_trait]
impl Provider for ChatCompletionTranslator {
    fn id(&self) -> &str {
        self.method.id()
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: &self.model,
            messages: self.build_messages(text, source_language, target_language),
            temperature: self.temperature,
        };

        debug!("{} request to {} (model {})", self.method.display_name(), self.endpoint, self.model);

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if !self.api_key.is_empty() {
            builder = match self.auth {
                AuthStyle::Bearer => builder.bearer_auth(&self.api_key),
                AuthStyle::ApiKeyHeader => builder.header("api-key", &self.api_key),
            };
        }
        for (name, value) in &self.extra_headers {
            builder = builder.header(*name, value);
        }

        let response = builder.send().await.map_err(map_request_error)?;
        let body: ChatResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        first_choice(body)
    }
}
