/*!
 * DeepL API and DeepLX (self-hosted DeepL proxy) clients.
 */

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{Provider, check_status, http_client, is_auto, map_request_error, require};
use crate::app_config::{ProviderConfig, TranslationMethod};
use crate::errors::ProviderError;

const DEFAULT_DEEPL_ENDPOINT: &str = "https://api-free.deepl.com/v2/translate";

/// DeepL wants upper-case codes and a few regional targets
pub fn deepl_language_code(code: &str) -> String {
    match code.trim().to_lowercase().as_str() {
        "zh" | "zh-hans" | "zh-cn" => "ZH-HANS".to_string(),
        "zh-hant" | "zh-tw" => "ZH-HANT".to_string(),
        "en" => "EN-US".to_string(),
        "pt" => "PT-PT".to_string(),
        other => other.to_uppercase(),
    }
}

/// DeepL source languages carry no region
fn deepl_source_code(code: &str) -> String {
    let code = code.trim();
    code.split('-').next().unwrap_or(code).to_uppercase()
}

/// DeepL API client
#[derive(Debug)]
pub struct DeepLTranslator {
    endpoint: String,
    api_key: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct DeepLRequest<'a> {
    text: Vec<&'a str>,
    target_lang: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_lang: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeepLResponse {
    translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
    text: String,
}

impl DeepLTranslator {
    pub fn new(settings: &ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = require(&settings.api_key, "API key", TranslationMethod::DeepL)?;
        let endpoint = if settings.url.trim().is_empty() {
            DEFAULT_DEEPL_ENDPOINT.to_string()
        } else {
            settings.url.trim().to_string()
        };
        Ok(Self {
            endpoint,
            api_key,
            client: http_client(settings.timeout()),
        })
    }
}

#[async_trait]
impl Provider for DeepLTranslator {
    fn id(&self) -> &str {
        "deepl"
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let request = DeepLRequest {
            text: vec![text],
            target_lang: deepl_language_code(target_language),
            source_lang: (!is_auto(source_language)).then(|| deepl_source_code(source_language)),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(map_request_error)?;

        let body: DeepLResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        body.translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or_else(|| ProviderError::ParseError("empty translations list".to_string()))
    }
}

/// DeepLX client; the endpoint URL is mandatory
#[derive(Debug)]
pub struct DeepLXTranslator {
    endpoint: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct DeepLXRequest<'a> {
    text: &'a str,
    source_lang: String,
    target_lang: String,
}

#[derive(Debug, Deserialize)]
struct DeepLXResponse {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl DeepLXTranslator {
    pub fn new(settings: &ProviderConfig) -> Result<Self, ProviderError> {
        let endpoint = require(&settings.url, "Service URL", TranslationMethod::DeepLX)?;
        Ok(Self {
            endpoint,
            client: http_client(settings.timeout()),
        })
    }
}

#[async_trait]
impl Provider for DeepLXTranslator {
    fn id(&self) -> &str {
        "deeplx"
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let request = DeepLXRequest {
            text,
            source_lang: if is_auto(source_language) {
                "auto".to_string()
            } else {
                deepl_source_code(source_language)
            },
            target_lang: deepl_language_code(target_language),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(map_request_error)?;

        let body: DeepLXResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        match body {
            DeepLXResponse { data: Some(data), .. } => Ok(data),
            DeepLXResponse { code, message, .. } => Err(ProviderError::ApiError {
                status_code: code.unwrap_or(500),
                message: message.unwrap_or_else(|| "DeepLX returned no data".to_string()),
            }),
        }
    }
}
