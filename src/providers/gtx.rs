use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{Provider, check_status, http_client, map_request_error};
use crate::app_config::ProviderConfig;
use crate::errors::ProviderError;

const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Client for the keyless Google translate web endpoint
#[derive(Debug)]
pub struct GtxTranslator {
    endpoint: String,
    client: Client,
}

impl GtxTranslator {
    pub fn new(settings: &ProviderConfig) -> Self {
        let endpoint = if settings.url.trim().is_empty() {
            DEFAULT_ENDPOINT.to_string()
        } else {
            settings.url.trim().to_string()
        };
        Self {
            endpoint,
            client: http_client(settings.timeout()),
        }
    }
}

/// Join the translated segments of a `translate_a/single` response.
///
/// The payload is a nested array; the first element lists segments whose
/// first item is the translated text.
pub fn parse_gtx_response(value: &Value) -> Result<String, ProviderError> {
    let segments = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| ProviderError::ParseError("missing translation segments".to_string()))?;

    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    Ok(text)
}

#[async_trait]
impl Provider for GtxTranslator {
    fn id(&self) -> &str {
        "gtxFreeAPI"
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source_language),
                ("tl", target_language),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(map_request_error)?;

        let body: Value = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        parse_gtx_response(&body)
    }
}
