// Speech-to-text
//
// The transcriber writes a whisper-style JSON transcript to a caller chosen
// path. Parsing that file into segments is the aligner's job (see `align`).

pub mod common;
pub mod whisper;

use async_trait::async_trait;
use std::path::Path;

pub use common::*;
use crate::config::TranscriberConfig;
use crate::error::Result;

/// Main trait for transcription operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriberTrait: Send + Sync {
    /// Transcribe an audio file into a JSON transcript at `transcript_path`
    async fn transcribe(&self, audio_path: &Path, transcript_path: &Path) -> Result<()>;

    /// Check that the speech-to-text tool can be launched
    async fn check_availability(&self) -> Result<()>;
}

/// Transcriber implementation type
#[derive(Debug, Clone)]
pub enum TranscriberImplementation {
    WhisperCli,
}

/// Factory for creating transcriber instances
pub struct TranscriberFactory;

impl TranscriberFactory {
    pub fn create_transcriber(
        implementation: TranscriberImplementation,
        config: TranscriberConfig,
    ) -> Box<dyn TranscriberTrait> {
        match implementation {
            TranscriberImplementation::WhisperCli => {
                Box::new(whisper::WhisperCliTranscriber::new(config))
            }
        }
    }

    pub fn create_default(config: TranscriberConfig) -> Box<dyn TranscriberTrait> {
        Self::create_transcriber(TranscriberImplementation::WhisperCli, config)
    }
}
