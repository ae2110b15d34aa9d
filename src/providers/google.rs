use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{Provider, check_status, http_client, is_auto, map_request_error, require};
use crate::app_config::{ProviderConfig, TranslationMethod};
use crate::errors::ProviderError;

const DEFAULT_ENDPOINT: &str = "https://translation.googleapis.com/language/translate/v2";

/// Google Cloud Translation v2 client
#[derive(Debug)]
pub struct GoogleTranslator {
    endpoint: String,
    api_key: String,
    client: Client,
}

/// Request body for `translate/v2`
#[derive(Debug, Serialize)]
struct GoogleRequest<'a> {
    q: &'a str,
    target: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    data: GoogleData,
}

#[derive(Debug, Deserialize)]
struct GoogleData {
    translations: Vec<GoogleTranslation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleTranslation {
    translated_text: String,
}

impl GoogleTranslator {
    pub fn new(settings: &ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = require(&settings.api_key, "API key", TranslationMethod::Google)?;
        let endpoint = if settings.url.trim().is_empty() {
            DEFAULT_ENDPOINT.to_string()
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
impl Provider for GoogleTranslator {
    fn id(&self) -> &str {
        "google"
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let request = GoogleRequest {
            q: text,
            target: target_language,
            source: (!is_auto(source_language)).then_some(source_language),
            format: "text",
        };

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(map_request_error)?;

        let body: GoogleResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        body.data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| ProviderError::ParseError("empty translations list".to_string()))
    }
}
