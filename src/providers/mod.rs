/*!
 * Translation service clients.
 *
 * Every service implements [`Provider`]; the concrete client is chosen
 * once, from the configured [`TranslationMethod`], by [`create_provider`]:
 * - `gtx`: Google translate web endpoint (no key)
 * - `google`: Google Cloud Translation v2
 * - `deepl`: DeepL and DeepLX
 * - `azure`: Azure Translator
 * - `openai`: OpenAI-compatible chat completion (OpenAI, DeepSeek,
 *   SiliconFlow, Groq, OpenRouter, Azure OpenAI, custom endpoints)
 * - `mock`: scripted provider for tests
 */

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{Config, TranslationMethod};
use crate::errors::ProviderError;

pub mod azure;
pub mod deepl;
pub mod google;
pub mod gtx;
pub mod mock;
pub mod openai;

/// Common trait for all translation services
///
/// Implementations translate one text at a time; batching, caching and
/// failure recovery happen in the orchestrator.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Identifier of the service, part of the translation cache key
    fn id(&self) -> &str;

    /// Translate a single text
    ///
    /// # Arguments
    /// * `text` - Text to translate
    /// * `source_language` - Source language code, or `auto`
    /// * `target_language` - Target language code
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError>;
}

/// Build the client for the configured translation method
pub fn create_provider(config: &Config) -> Result<Arc<dyn Provider>, ProviderError> {
    let settings = config.provider_config();

    let provider: Arc<dyn Provider> = match config.translation_method {
        TranslationMethod::GtxFreeApi => Arc::new(gtx::GtxTranslator::new(&settings)),
        TranslationMethod::Google => Arc::new(google::GoogleTranslator::new(&settings)?),
        TranslationMethod::DeepL => Arc::new(deepl::DeepLTranslator::new(&settings)?),
        TranslationMethod::DeepLX => Arc::new(deepl::DeepLXTranslator::new(&settings)?),
        TranslationMethod::Azure => Arc::new(azure::AzureTranslator::new(&settings)?),
        method => Arc::new(openai::ChatCompletionTranslator::new(
            method,
            &settings,
            config.llm_prompts.clone(),
        )?),
    };

    Ok(provider)
}

/// HTTP client shared by the service clients
pub(crate) fn http_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .unwrap_or_default()
}

/// Map a transport failure to a provider error
pub(crate) fn map_request_error(error: reqwest::Error) -> ProviderError {
    if error.is_connect() || error.is_timeout() {
        ProviderError::ConnectionError(error.to_string())
    } else {
        ProviderError::RequestFailed(error.to_string())
    }
}

/// Map an HTTP status and body to a provider error
pub(crate) fn status_error(status: StatusCode, body: String) -> ProviderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::AuthenticationError(body),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded(body),
        _ => ProviderError::ApiError {
            status_code: status.as_u16(),
            message: body,
        },
    }
}

/// Pass successful responses through, turn the rest into provider errors
pub(crate) async fn check_status(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, body))
}

/// Require a non-empty setting
pub(crate) fn require(value: &str, what: &str, method: TranslationMethod) -> Result<String, ProviderError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ProviderError::MissingConfiguration(format!(
            "{} is required for {}",
            what,
            method.display_name()
        )));
    }
    Ok(value.to_string())
}

/// True for the `auto` source language
pub(crate) fn is_auto(language: &str) -> bool {
    language.trim().eq_ignore_ascii_case("auto")
}
