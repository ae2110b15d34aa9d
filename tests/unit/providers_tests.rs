/*!
 * Tests for provider construction and request shaping
 */

use serde_json::json;

use subtitle_translator::app_config::{Config, LlmPrompts, ProviderConfig, TranslationMethod};
use subtitle_translator::errors::ProviderError;
use subtitle_translator::providers::azure::azure_language_code;
use subtitle_translator::providers::deepl::deepl_language_code;
use subtitle_translator::providers::gtx::parse_gtx_response;
use subtitle_translator::providers::openai::{ChatCompletionTranslator, azure_openai_endpoint, default_endpoint};
use subtitle_translator::providers::{Provider, create_provider};

fn config_for(method: TranslationMethod) -> Config {
    Config {
        translation_method: method,
        ..Config::default()
    }
}

/// Test that the default config builds the keyless web client
#[test]
fn test_create_provider_withDefaultConfig_shouldBuildGtx() {
    let provider = create_provider(&Config::default()).unwrap();
    assert_eq!(provider.id(), "gtxFreeAPI");
}

/// Test that services needing a key refuse to start without one
#[test]
fn test_create_provider_withMissingKey_shouldReturnMissingConfiguration() {
    for method in [
        TranslationMethod::Google,
        TranslationMethod::DeepL,
        TranslationMethod::Azure,
        TranslationMethod::OpenAI,
        TranslationMethod::DeepSeek,
    ] {
        let result = create_provider(&config_for(method));
        assert!(
            matches!(result, Err(ProviderError::MissingConfiguration(_))),
            "{} should require a key",
            method
        );
    }
}

/// Test that a keyed service is built once the key is present
#[test]
fn test_create_provider_withKey_shouldUseMethodId() {
    for method in [TranslationMethod::DeepL, TranslationMethod::Groq, TranslationMethod::OpenRouter] {
        let mut config = config_for(method);
        config.provider_config_mut(method).api_key = "secret".to_string();

        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.id(), method.id());
    }
}

/// Test that DeepLX and Azure OpenAI need a service URL
#[test]
fn test_create_provider_withoutUrl_shouldFailForSelfHostedServices() {
    let mut deeplx = config_for(TranslationMethod::DeepLX);
    deeplx.provider_config_mut(TranslationMethod::DeepLX).url = String::new();
    assert!(create_provider(&deeplx).is_err());

    let mut azure = config_for(TranslationMethod::AzureOpenAI);
    azure.provider_config_mut(TranslationMethod::AzureOpenAI).api_key = "secret".to_string();
    assert!(create_provider(&azure).is_err());
}

/// Test that the local LLM default works without a key
#[test]
fn test_create_provider_withLocalLlm_shouldNotNeedKey() {
    let provider = create_provider(&config_for(TranslationMethod::Llm)).unwrap();
    assert_eq!(provider.id(), "llm");
}

/// Test the Azure OpenAI deployment URL
#[test]
fn test_chat_completion_new_withAzureOpenAi_shouldBuildDeploymentEndpoint() {
    let mut settings = ProviderConfig::new(TranslationMethod::AzureOpenAI);
    settings.url = "https://example.openai.azure.com/".to_string();
    settings.api_key = "secret".to_string();

    let translator =
        ChatCompletionTranslator::new(TranslationMethod::AzureOpenAI, &settings, LlmPrompts::default()).unwrap();

    assert_eq!(
        translator.endpoint(),
        "https://example.openai.azure.com/openai/deployments/gpt-4o-mini/chat/completions?api-version=2024-07-18"
    );
    assert_eq!(
        azure_openai_endpoint("https://x/openai/deployments/d/chat/completions?api-version=1", "m", "2"),
        "https://x/openai/deployments/d/chat/completions?api-version=1"
    );
}

/// Test that a configured URL overrides the service default
#[test]
fn test_chat_completion_new_withCustomUrl_shouldOverrideDefault() {
    let mut settings = ProviderConfig::new(TranslationMethod::OpenAI);
    settings.api_key = "secret".to_string();
    let translator =
        ChatCompletionTranslator::new(TranslationMethod::OpenAI, &settings, LlmPrompts::default()).unwrap();
    assert_eq!(Some(translator.endpoint()), default_endpoint(TranslationMethod::OpenAI));

    settings.url = "http://proxy.local/v1/chat/completions".to_string();
    let translator =
        ChatCompletionTranslator::new(TranslationMethod::OpenAI, &settings, LlmPrompts::default()).unwrap();
    assert_eq!(translator.endpoint(), "http://proxy.local/v1/chat/completions");
}

/// Test prompt rendering with an automatic source language
#[test]
fn test_build_messages_withAutoSource_shouldDropSourceLanguage() {
    let mut settings = ProviderConfig::new(TranslationMethod::DeepSeek);
    settings.api_key = "secret".to_string();
    let translator =
        ChatCompletionTranslator::new(TranslationMethod::DeepSeek, &settings, LlmPrompts::default()).unwrap();

    let messages = translator.build_messages("Hello", "auto", "fr");

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, "system");
    assert_eq!(messages[1].role, "user");
    assert!(messages[1].content.contains("into French"));
    assert!(messages[1].content.ends_with("Hello"));
    assert!(!messages[1].content.contains("${"));
}

/// Test joining of the web endpoint's segment array
#[test]
fn test_parse_gtx_response_withSegments_shouldJoinText() {
    let value = json!([[["Bonjour. ", "Hello. ", null], ["Au revoir", "Goodbye", null]], null, "en"]);
    assert_eq!(parse_gtx_response(&value).unwrap(), "Bonjour. Au revoir");

    assert!(matches!(parse_gtx_response(&json!({})), Err(ProviderError::ParseError(_))));
}

/// Test service-specific language code spellings
#[test]
fn test_language_code_mapping_withChineseVariants_shouldUseServiceSpelling() {
    assert_eq!(deepl_language_code("zh"), "ZH-HANS");
    assert_eq!(deepl_language_code("zh-tw"), "ZH-HANT");
    assert_eq!(deepl_language_code("en"), "EN-US");
    assert_eq!(deepl_language_code("de"), "DE");

    assert_eq!(azure_language_code("zh"), "zh-Hans");
    assert_eq!(azure_language_code("zh-hant"), "zh-Hant");
    assert_eq!(azure_language_code("ja"), "ja");
}
