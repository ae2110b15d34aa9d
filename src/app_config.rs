use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crate::errors::AppError;
use crate::language_utils;
use crate::subtitle::{BilingualPosition, SubtitleFormat};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Translation service to use
    #[serde(default)]
    pub translation_method: TranslationMethod,

    /// Source language code (ISO, or "auto")
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO, regional variants allowed)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translate each input into all of these; empty means `target_language` only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_languages: Vec<String>,

    /// Pause between target languages in milliseconds
    #[serde(default = "default_language_delay")]
    pub language_delay: u64,

    /// Keep the original text next to the translation
    #[serde(default)]
    pub bilingual_subtitle: bool,

    /// Where the original text goes in bilingual output
    #[serde(default)]
    pub bilingual_position: BilingualPosition,

    /// Output format; `auto` keeps the natural format for the input
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Directory translated files are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Concurrent provider requests within a batch (1-10)
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,

    /// Delay between batches in milliseconds
    #[serde(default = "default_inter_batch_delay")]
    pub inter_batch_delay: u64,

    /// Entries per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Optional wall-clock budget per file, in seconds
    #[serde(default)]
    pub run_budget_secs: Option<u64>,

    /// Per-service credentials and models
    #[serde(default = "default_api_configs")]
    pub api_configs: Vec<ProviderConfig>,

    /// Prompt templates for LLM services
    #[serde(default)]
    pub llm_prompts: LlmPrompts,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation service identifier
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum TranslationMethod {
    // @provider: Google translate web endpoint, no key
    #[default]
    #[serde(rename = "gtxFreeAPI")]
    GtxFreeApi,
    #[serde(rename = "google")]
    Google,
    #[serde(rename = "deepl")]
    DeepL,
    #[serde(rename = "azure")]
    Azure,
    // @provider: self-hosted DeepL proxy
    #[serde(rename = "deeplx")]
    DeepLX,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "openai")]
    OpenAI,
    #[serde(rename = "azureopenai")]
    AzureOpenAI,
    #[serde(rename = "siliconflow")]
    SiliconFlow,
    #[serde(rename = "groq")]
    Groq,
    #[serde(rename = "openrouter")]
    OpenRouter,
    // @provider: any OpenAI-compatible endpoint (Ollama, LM Studio, ...)
    #[serde(rename = "llm")]
    Llm,
}

impl TranslationMethod {
    /// Every supported method
    pub const ALL: [TranslationMethod; 12] = [
        Self::GtxFreeApi,
        Self::Google,
        Self::DeepL,
        Self::Azure,
        Self::DeepLX,
        Self::DeepSeek,
        Self::OpenAI,
        Self::AzureOpenAI,
        Self::SiliconFlow,
        Self::Groq,
        Self::OpenRouter,
        Self::Llm,
    ];

    // @returns: Identifier used in config files and on the command line
    pub fn id(&self) -> &'static str {
        match self {
            Self::GtxFreeApi => "gtxFreeAPI",
            Self::Google => "google",
            Self::DeepL => "deepl",
            Self::Azure => "azure",
            Self::DeepLX => "deeplx",
            Self::DeepSeek => "deepseek",
            Self::OpenAI => "openai",
            Self::AzureOpenAI => "azureopenai",
            Self::SiliconFlow => "siliconflow",
            Self::Groq => "groq",
            Self::OpenRouter => "openrouter",
            Self::Llm => "llm",
        }
    }

    // @returns: Human readable service name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::GtxFreeApi => "GTX API (Free)",
            Self::Google => "Google Translate",
            Self::DeepL => "DeepL",
            Self::Azure => "Azure Translate",
            Self::DeepLX => "DeepLX (Free)",
            Self::DeepSeek => "DeepSeek",
            Self::OpenAI => "OpenAI",
            Self::AzureOpenAI => "Azure OpenAI",
            Self::SiliconFlow => "SiliconFlow",
            Self::Groq => "Groq",
            Self::OpenRouter => "OpenRouter",
            Self::Llm => "Custom LLM",
        }
    }

    /// Chat-completion services that take prompt templates
    pub fn is_llm(&self) -> bool {
        matches!(
            self,
            Self::DeepSeek
                | Self::OpenAI
                | Self::AzureOpenAI
                | Self::SiliconFlow
                | Self::Groq
                | Self::OpenRouter
                | Self::Llm
        )
    }

    /// Environment variable the CLI reads an API key from
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::Google => Some("GOOGLE_API_KEY"),
            Self::DeepL => Some("DEEPL_API_KEY"),
            Self::Azure => Some("AZURE_API_KEY"),
            Self::DeepSeek => Some("DEEPSEEK_API_KEY"),
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::AzureOpenAI => Some("AZURE_OPENAI_API_KEY"),
            Self::SiliconFlow => Some("SILICONFLOW_API_KEY"),
            Self::Groq => Some("GROQ_API_KEY"),
            Self::OpenRouter => Some("OPENROUTER_API_KEY"),
            Self::GtxFreeApi | Self::DeepLX | Self::Llm => None,
        }
    }

    /// Whether the service refuses requests without an API key
    pub fn requires_api_key(&self) -> bool {
        self.api_key_env_var().is_some()
    }

    /// Whether the service has no public default endpoint
    pub fn requires_url(&self) -> bool {
        matches!(self, Self::DeepLX | Self::AzureOpenAI | Self::Llm)
    }
}

impl std::fmt::Display for TranslationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl std::str::FromStr for TranslationMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .find(|method| method.id().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| anyhow!("Invalid translation method: {}", s))
    }
}

/// Output format selection
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Auto,
    Srt,
    Vtt,
    Ass,
    Lrc,
}

impl OutputFormat {
    /// Explicit target format, `None` for auto
    pub fn target(&self) -> Option<SubtitleFormat> {
        match self {
            Self::Auto => None,
            Self::Srt => Some(SubtitleFormat::Srt),
            Self::Vtt => Some(SubtitleFormat::Vtt),
            Self::Ass => Some(SubtitleFormat::Ass),
            Self::Lrc => Some(SubtitleFormat::Lrc),
        }
    }
}

/// Per-service settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    // @field: Method identifier this block configures
    #[serde(rename = "type")]
    pub provider_type: TranslationMethod,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL, empty for the public default
    #[serde(default = "String::new")]
    pub url: String,

    // @field: Model name for LLM services
    #[serde(default = "String::new")]
    pub model: String,

    // @field: Sampling temperature for LLM services
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    // @field: Azure region
    #[serde(default = "String::new")]
    pub region: String,

    // @field: Azure OpenAI API version
    #[serde(default = "String::new")]
    pub api_version: String,

    // @field: OpenRouter attribution
    #[serde(default = "String::new")]
    pub site_url: String,

    // @field: OpenRouter attribution
    #[serde(default = "String::new")]
    pub site_name: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param method: Service
    // @returns: Provider config with that service's defaults
    pub fn new(method: TranslationMethod) -> Self {
        let mut config = Self {
            provider_type: method,
            api_key: String::new(),
            url: String::new(),
            model: String::new(),
            temperature: default_temperature(),
            region: String::new(),
            api_version: String::new(),
            site_url: String::new(),
            site_name: String::new(),
            timeout_secs: default_timeout_secs(),
        };

        match method {
            TranslationMethod::DeepSeek => config.model = "deepseek-chat".to_string(),
            TranslationMethod::OpenAI => config.model = "gpt-4o-mini".to_string(),
            TranslationMethod::AzureOpenAI => {
                config.model = "gpt-4o-mini".to_string();
                config.api_version = "2024-07-18".to_string();
            }
            TranslationMethod::SiliconFlow => config.model = "deepseek-ai/DeepSeek-V3".to_string(),
            TranslationMethod::Groq => config.model = "gemma2-9b-it".to_string(),
            TranslationMethod::OpenRouter => {
                config.model = "deepseek/deepseek-chat-v3-0324:free".to_string()
            }
            TranslationMethod::Llm => {
                config.url = "http://127.0.0.1:11434/v1/chat/completions".to_string();
                config.model = "llama3.2".to_string();
            }
            TranslationMethod::Azure => config.region = "eastasia".to_string(),
            TranslationMethod::GtxFreeApi
            | TranslationMethod::Google
            | TranslationMethod::DeepL
            | TranslationMethod::DeepLX => {}
        }

        config
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Prompt templates for chat-completion services.
///
/// Placeholders: `${sourceLanguage}`, `${targetLanguage}`, `${content}`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LlmPrompts {
    #[serde(default = "default_system_prompt")]
    pub system: String,

    #[serde(default = "default_user_prompt")]
    pub user: String,
}

impl Default for LlmPrompts {
    fn default() -> Self {
        Self {
            system: default_system_prompt(),
            user: default_user_prompt(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "auto".to_string()
}

fn default_target_language() -> String {
    "en".to_string()
}

fn default_output_dir() -> String {
    "./translated".to_string()
}

fn default_parallelism() -> usize {
    3
}

fn default_inter_batch_delay() -> u64 {
    1000
}

fn default_language_delay() -> u64 {
    500
}

fn default_batch_size() -> usize {
    5
}

fn default_temperature() -> f32 {
    1.3
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_api_configs() -> Vec<ProviderConfig> {
    TranslationMethod::ALL.iter().copied().map(ProviderConfig::new).collect()
}

pub(crate) fn default_system_prompt() -> String {
    "You are a professional subtitle translator. Translate the given subtitle text accurately while preserving timing and formatting.".to_string()
}

pub(crate) fn default_user_prompt() -> String {
    "Translate the following subtitle text from ${sourceLanguage} to ${targetLanguage}. Only return the translated text without any additional explanation:\n\n${content}".to_string()
}

impl Config {
    /// Load a JSON configuration file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open config file: {:?}", path))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Write the configuration as pretty JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        std::fs::write(path, json).with_context(|| format!("Failed to write config file: {:?}", path))
    }

    /// Fill an empty API key for the active method from its environment variable
    pub fn apply_env_api_key(&mut self) -> bool {
        let method = self.translation_method;
        let Some(var) = method.api_key_env_var() else {
            return false;
        };
        if !self.provider_config().api_key.trim().is_empty() {
            return false;
        }
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => {
                self.provider_config_mut(method).api_key = key.trim().to_string();
                true
            }
            _ => false,
        }
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if !language_utils::is_valid_source_language_code(&self.source_language) {
            return Err(config_error(format!("Invalid source language: {}", self.source_language)));
        }
        for target in self.target_languages() {
            if !language_utils::is_valid_output_language_code(&target) {
                return Err(config_error(format!("Invalid target language: {}", target)));
            }
        }

        if !(1..=10).contains(&self.parallelism) {
            return Err(config_error(format!(
                "Parallelism must be between 1 and 10, got {}",
                self.parallelism
            )));
        }
        if self.batch_size == 0 {
            return Err(config_error("Batch size must be at least 1".to_string()));
        }

        let method = self.translation_method;
        let provider = self.provider_config();

        if method.requires_api_key() && provider.api_key.trim().is_empty() {
            let hint = method
                .api_key_env_var()
                .map(|var| format!(" (set it in the config, with --api-key or via {})", var))
                .unwrap_or_default();
            return Err(config_error(format!(
                "API key is required for {}{}",
                method.display_name(),
                hint
            )));
        }

        if method.requires_url() && provider.url.trim().is_empty() {
            return Err(config_error(format!("A service URL is required for {}", method.display_name())));
        }

        if !provider.url.trim().is_empty() {
            url::Url::parse(provider.url.trim()).map_err(|e| {
                config_error(format!("Invalid URL for {}: {} ({})", method.display_name(), provider.url, e))
            })?;
        }

        Ok(())
    }

    /// Settings for the active translation method, with that method's
    /// defaults when the config has no block for it
    pub fn provider_config(&self) -> ProviderConfig {
        self.api_configs
            .iter()
            .find(|p| p.provider_type == self.translation_method)
            .cloned()
            .unwrap_or_else(|| ProviderConfig::new(self.translation_method))
    }

    /// Mutable settings for a method, inserting its defaults if missing
    pub fn provider_config_mut(&mut self, method: TranslationMethod) -> &mut ProviderConfig {
        let position = match self.api_configs.iter().position(|p| p.provider_type == method) {
            Some(position) => position,
            None => {
                self.api_configs.push(ProviderConfig::new(method));
                self.api_configs.len() - 1
            }
        };
        &mut self.api_configs[position]
    }

    /// Languages each input is translated into, in order, without duplicates
    pub fn target_languages(&self) -> Vec<String> {
        if self.target_languages.is_empty() {
            return vec![self.target_language.clone()];
        }
        let mut targets: Vec<String> = Vec::with_capacity(self.target_languages.len());
        for target in &self.target_languages {
            if !targets.iter().any(|seen| seen.eq_ignore_ascii_case(target)) {
                targets.push(target.clone());
            }
        }
        targets
    }

    /// Pause between two target languages of the same file
    pub fn language_delay(&self) -> Duration {
        Duration::from_millis(self.language_delay)
    }

    /// Delay between translation batches
    pub fn inter_batch_delay(&self) -> Duration {
        Duration::from_millis(self.inter_batch_delay)
    }

    /// Bilingual position when bilingual output is on
    pub fn bilingual(&self) -> Option<BilingualPosition> {
        self.bilingual_subtitle.then_some(self.bilingual_position)
    }
}

fn config_error(message: String) -> anyhow::Error {
    AppError::Config(message).into()
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            translation_method: TranslationMethod::default(),
            source_language: default_source_language(),
            target_language: default_target_language(),
            target_languages: Vec::new(),
            language_delay: default_language_delay(),
            bilingual_subtitle: false,
            bilingual_position: BilingualPosition::default(),
            output_format: OutputFormat::default(),
            output_dir: default_output_dir(),
            parallelism: default_parallelism(),
            inter_batch_delay: default_inter_batch_delay(),
            batch_size: default_batch_size(),
            run_budget_secs: None,
            api_configs: default_api_configs(),
            llm_prompts: LlmPrompts::default(),
            log_level: LogLevel::default(),
        }
    }
}
