// Dub synthesis
//
// - Language: supported target languages and the unknown-code policy
// - Google: Google Translate text-to-speech client
//
// The whole transcript becomes one continuous clip. Segment timings are
// dropped here, so the dubbed audio rarely matches the source length.

pub mod google;
pub mod language;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

pub use language::TargetLanguage;

use crate::align::TranscriptSegment;
use crate::config::{LanguagePolicy, SynthesizerConfig};
use crate::error::{Result, RedubError};

/// A text-to-speech backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechSynthesizerTrait: Send + Sync {
    /// Speak `text` in `language` and write the audio to `output_path`
    async fn synthesize(&self, text: &str, language: TargetLanguage, output_path: &Path) -> Result<()>;
}

/// Factory for creating speech synthesizer instances
pub struct SpeechSynthesizerFactory;

impl SpeechSynthesizerFactory {
    pub fn create_default(config: SynthesizerConfig) -> Result<Box<dyn SpeechSynthesizerTrait>> {
        Ok(Box::new(google::GoogleTranslateTts::new(config)?))
    }
}

/// Join segment texts with single spaces and trim the ends
pub fn join_segment_text(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|seg| seg.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Turns aligned segments into a single dubbed audio track
pub struct DubSynthesizer {
    speech: Box<dyn SpeechSynthesizerTrait>,
    policy: LanguagePolicy,
}

impl DubSynthesizer {
    pub fn new(speech: Box<dyn SpeechSynthesizerTrait>, policy: LanguagePolicy) -> Self {
        Self { speech, policy }
    }

    pub fn resolve_language(&self, code: &str) -> Result<TargetLanguage> {
        TargetLanguage::resolve(code, self.policy)
    }

    /// Generate the dubbed audio track for `segments`
    pub async fn create_dubbed_audio(
        &self,
        segments: &[TranscriptSegment],
        output_path: &Path,
        target_language: &str,
    ) -> Result<PathBuf> {
        let language = self.resolve_language(target_language)?;

        let text = join_segment_text(segments);
        if text.is_empty() {
            return Err(RedubError::NoText);
        }

        info!("Generating TTS in {} ({} characters)", language, text.chars().count());
        self.speech.synthesize(&text, language, output_path).await?;

        info!("Dubbed audio created at: {}", output_path.display());
        Ok(output_path.to_path_buf())
    }
}
