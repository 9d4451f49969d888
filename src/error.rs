use std::path::PathBuf;

use thiserror::Error;

use crate::workflow::Stage;

#[derive(Error, Debug)]
pub enum RedubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("Transcription error: {0}")]
    Transcriber(String),

    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    #[error("No text found in aligned segments to generate TTS")]
    NoText,

    #[error("Unsupported target language: {0}")]
    UnsupportedLanguage(String),

    #[error("{stage} produced no output at {}", .path.display())]
    MissingArtifact { stage: Stage, path: PathBuf },

    #[error("{stage} produced an empty file at {}", .path.display())]
    EmptyArtifact { stage: Stage, path: PathBuf },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

impl RedubError {
    /// Errors caused by the caller's input rather than by the pipeline
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::UnsupportedLanguage(_))
    }
}

pub type Result<T> = std::result::Result<T, RedubError>;
