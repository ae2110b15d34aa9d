use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{Provider, check_status, http_client, is_auto, map_request_error, require};
use crate::app_config::{ProviderConfig, TranslationMethod};
use crate::errors::ProviderError;

const DEFAULT_ENDPOINT: &str = "https://api.cognitive.microsofttranslator.com/translate";

/// Azure Translator (v3) client
#[derive(Debug)]
pub struct AzureTranslator {
    endpoint: String,
    api_key: String,
    region: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct AzureText<'a> {
    #[serde(rename = "Text")]
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct AzureResult {
    translations: Vec<AzureTranslation>,
}

#[derive(Debug, Deserialize)]
struct AzureTranslation {
    text: String,
}

/// Azure names Chinese scripts explicitly
pub fn azure_language_code(code: &str) -> String {
    match code.trim().to_lowercase().as_str() {
        "zh" | "zh-cn" | "zh-hans" => "zh-Hans".to_string(),
        "zh-tw" | "zh-hant" => "zh-Hant".to_string(),
        other => other.to_string(),
    }
}

impl AzureTranslator {
    pub fn new(settings: &ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = require(&settings.api_key, "API key", TranslationMethod::Azure)?;
        let endpoint = if settings.url.trim().is_empty() {
            DEFAULT_ENDPOINT.to_string()
        } else {
            settings.url.trim().to_string()
        };
        Ok(Self {
            endpoint,
            api_key,
            region: settings.region.trim().to_string(),
            client: http_client(settings.timeout()),
        })
    }
}

#[async_trait]
impl Provider for AzureTranslator {
    fn id(&self) -> &str {
        "azure"
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let mut query = vec![
            ("api-version", "3.0".to_string()),
            ("to", azure_language_code(target_language)),
        ];
        if !is_auto(source_language) {
            query.push(("from", azure_language_code(source_language)));
        }

        let mut request = self
            .client
            .post(&self.endpoint)
            .query(&query)
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .json(&[AzureText { text }]);
        if !self.region.is_empty() {
            request = request.header("Ocp-Apim-Subscription-Region", &self.region);
        }

        let response = request.send().await.map_err(map_request_error)?;
        let results: Vec<AzureResult> = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        results
            .into_iter()
            .next()
            .and_then(|result| result.translations.into_iter().next())
            .map(|translation| translation.text)
            .ok_or_else(|| ProviderError::ParseError("empty translations list".to_string()))
    }
}
