//! Error Types

use thiserror::Error;

/// Main error type
#[derive(Debug, Clone, Error)]
pub enum ProfileError {
    #[error("Audio decode error: {message}")]
    AudioDecode { message: String },
    #[error("Audio analysis error: {message}")]
    AudioAnalysis { message: String },
    #[error("Text analysis error: {message}")]
    TextAnalysis { message: String },
    #[error("Integration error: missing required field `{section}.{key}`")]
    MissingField { section: String, key: String },
    #[error("Integration error: {message}")]
    Integration { message: String },
    #[error("Config error: {message}")]
    Config { message: String },
    #[error("IO error: {message}")]
    Io { message: String },
    #[error("Insight error: {message}")]
    Insight { message: String },
}

impl ProfileError {
    pub fn audio_decode<S: Into<String>>(msg: S) -> Self { Self::AudioDecode { message: msg.into() } }
    pub fn audio_analysis<S: Into<String>>(msg: S) -> Self { Self::AudioAnalysis { message: msg.into() } }
    pub fn text_analysis<S: Into<String>>(msg: S) -> Self { Self::TextAnalysis { message: msg.into() } }
    pub fn integration<S: Into<String>>(msg: S) -> Self { Self::Integration { message: msg.into() } }
    pub fn config<S: Into<String>>(msg: S) -> Self { Self::Config { message: msg.into() } }
    pub fn io<S: Into<String>>(msg: S) -> Self { Self::Io { message: msg.into() } }
    pub fn insight<S: Into<String>>(msg: S) -> Self { Self::Insight { message: msg.into() } }

    pub fn missing_field<S: Into<String>, K: Into<String>>(section: S, key: K) -> Self {
        Self::MissingField { section: section.into(), key: key.into() }
    }

    /// True for both integration variants.
    pub fn is_integration(&self) -> bool {
        matches!(self, Self::MissingField { .. } | Self::Integration { .. })
    }
}

pub type Result<T> = std::result::Result<T, ProfileError>;

impl From<std::io::Error> for ProfileError {
    fn from(err: std::io::Error) -> Self { Self::io(err.to_string()) }
}

impl From<hound::Error> for ProfileError {
    fn from(err: hound::Error) -> Self { Self::audio_decode(format!("WAV: {}", err)) }
}

impl From<serde_json::Error> for ProfileError {
    fn from(err: serde_json::Error) -> Self { Self::integration(format!("JSON: {}", err)) }
}
