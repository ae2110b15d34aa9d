/*!
 * Error types for the subtitle translator.
 *
 * Library layers return these typed errors; the controller and the CLI
 * wrap them in `anyhow` with context.
 */

use thiserror::Error;

/// Errors that can occur when calling a translation provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// Provider is missing a key, URL or other required setting
    #[error("Missing provider configuration: {0}")]
    MissingConfiguration(String),
}

/// Errors raised while reading, restructuring or converting subtitle text
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SubtitleError {
    /// The text does not look like SRT, VTT, ASS or LRC
    #[error("Unrecognized subtitle format")]
    UnrecognizedFormat,

    /// Detection succeeded but there is nothing to translate
    #[error("No translatable subtitle text found")]
    ExtractionEmpty,

    /// Conversion between the two formats is not possible for this input
    #[error("Cannot convert subtitles from {from} to {to}: {reason}")]
    ConversionUnsupported {
        from: String,
        to: String,
        reason: String,
    },

    /// Translated lines do not line up with the extracted content
    #[error("Translated lines do not match extracted content: expected {expected}, got {actual}")]
    AlignmentMismatch { expected: usize, actual: usize },
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error with subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// The batch produced a different number of results than it was given
    #[error("Translation returned {actual} results for {expected} entries")]
    ResultCountMismatch { expected: usize, actual: usize },
}

/// Application-level errors raised outside the translation layers
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AppError {
    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TranslationError {
    /// True when the error means the file had nothing to translate
    pub fn is_empty_document(&self) -> bool {
        matches!(self, Self::Subtitle(SubtitleError::ExtractionEmpty))
    }
}
