use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::align::align_transcript;
use crate::config::Config;
use crate::error::{Result, RedubError};
use crate::media::{MediaProcessorTrait, MediaProcessorFactory};
use crate::synthesize::{DubSynthesizer, SpeechSynthesizerFactory, SpeechSynthesizerTrait};
use crate::transcribe::{TranscriberTrait, TranscriberFactory};

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    AudioExtraction,
    Transcription,
    Synthesis,
    Muxing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AudioExtraction => "Audio extraction",
            Self::Transcription => "Transcription",
            Self::Synthesis => "Speech synthesis",
            Self::Muxing => "Audio replacement",
        };
        f.write_str(name)
    }
}

/// File locations for one pipeline run, all inside its scratch directory
#[derive(Debug, Clone)]
pub struct PipelinePaths {
    pub input_video: PathBuf,
    pub audio: PathBuf,
    pub transcript: PathBuf,
    pub dubbed_audio: PathBuf,
    pub output_video: PathBuf,
}

impl PipelinePaths {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(input_video: P, scratch_dir: Q) -> Self {
        let scratch_dir = scratch_dir.as_ref();
        Self {
            input_video: input_video.as_ref().to_path_buf(),
            audio: scratch_dir.join("audio.wav"),
            transcript: scratch_dir.join("transcript.json"),
            dubbed_audio: scratch_dir.join("dubbed_audio.mp3"),
            output_video: scratch_dir.join("output.mp4"),
        }
    }
}

/// Fail unless `path` exists and has content
pub async fn verify_artifact(stage: Stage, path: &Path) -> Result<()> {
    let metadata = match fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(RedubError::MissingArtifact { stage, path: path.to_path_buf() });
        }
        Err(e) => return Err(e.into()),
    };

    if metadata.len() == 0 {
        return Err(RedubError::EmptyArtifact { stage, path: path.to_path_buf() });
    }

    Ok(())
}

pub struct Workflow {
    config: Config,
    media: Box<dyn MediaProcessorTrait>,
    transcriber: Box<dyn TranscriberTrait>,
    synthesizer: DubSynthesizer,
}

impl Workflow {
    /// Build the workflow with the ffmpeg, whisper and Google TTS backends
    /// and check that both tools can be launched
    pub async fn new(config: Config) -> Result<Self> {
        let workflow = Self::unchecked(config)?;

        // Check dependencies
        workflow.check_media().await?;
        workflow.check_transcriber().await?;

        Ok(workflow)
    }

    /// Build the default backends without probing for the external tools.
    /// Callers that run a single stage check only the tool it needs.
    pub fn unchecked(config: Config) -> Result<Self> {
        let media = MediaProcessorFactory::create_processor(config.media.clone());
        let transcriber = TranscriberFactory::create_default(config.transcriber.clone());
        let speech = SpeechSynthesizerFactory::create_default(config.synthesizer.clone())?;

        Ok(Self::with_components(config, media, transcriber, speech))
    }

    pub fn with_components(
        config: Config,
        media: Box<dyn MediaProcessorTrait>,
        transcriber: Box<dyn TranscriberTrait>,
        speech: Box<dyn SpeechSynthesizerTrait>,
    ) -> Self {
        let synthesizer = DubSynthesizer::new(speech, config.synthesizer.language_policy);
        Self {
            config,
            media,
            transcriber,
            synthesizer,
        }
    }

    pub async fn check_media(&self) -> Result<()> {
        self.media.check_availability().await?;
        info!("Using {}", self.media.get_version_info().await?);
        Ok(())
    }

    pub async fn check_transcriber(&self) -> Result<()> {
        self.transcriber.check_availability().await
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn synthesizer(&self) -> &DubSynthesizer {
        &self.synthesizer
    }

    /// Run the full dubbing pipeline for one video.
    ///
    /// Every intermediate file goes into `scratch_dir`; the caller owns that
    /// directory and its cleanup. Returns the path of the dubbed video.
    pub async fn process_video<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        video_path: P,
        scratch_dir: Q,
        target_language: &str,
    ) -> Result<PathBuf> {
        let paths = PipelinePaths::new(video_path, scratch_dir);

        if !fs::try_exists(&paths.input_video).await? {
            return Err(RedubError::FileNotFound(paths.input_video.display().to_string()));
        }

        // Resolve up front so a rejected language costs no tool runs
        let language = self.synthesizer.resolve_language(target_language)?;

        info!("Step 1: Extracting audio...");
        self.media.extract_audio(&paths.input_video, &paths.audio).await?;
        verify_artifact(Stage::AudioExtraction, &paths.audio).await?;

        info!("Step 2: Transcribing audio...");
        self.transcriber.transcribe(&paths.audio, &paths.transcript).await?;
        verify_artifact(Stage::Transcription, &paths.transcript).await?;

        info!("Step 3: Aligning transcript...");
        let segments = align_transcript(&paths.transcript).await?;

        info!("Step 4: Creating dubbed audio in {}...", language);
        self.synthesizer
            .create_dubbed_audio(&segments, &paths.dubbed_audio, language.provider_code())
            .await?;
        verify_artifact(Stage::Synthesis, &paths.dubbed_audio).await?;

        info!("Step 5: Replacing original audio with dubbed track...");
        self.media
            .replace_audio(&paths.input_video, &paths.dubbed_audio, &paths.output_video)
            .await?;
        verify_artifact(Stage::Muxing, &paths.output_video).await?;

        info!("Video dubbing complete: {}", paths.output_video.display());
        Ok(paths.output_video)
    }

    /// Extract audio from video file
    pub async fn extract_audio<P: AsRef<Path>>(&self, video_path: P, audio_path: P) -> Result<()> {
        let audio_path = audio_path.as_ref();
        self.media.extract_audio(video_path.as_ref(), audio_path).await?;
        verify_artifact(Stage::AudioExtraction, audio_path).await
    }

    /// Transcribe audio file into a JSON transcript
    pub async fn transcribe_audio<P: AsRef<Path>>(&self, audio_path: P, transcript_path: P) -> Result<()> {
        let transcript_path = transcript_path.as_ref();
        self.transcriber.transcribe(audio_path.as_ref(), transcript_path).await?;
        verify_artifact(Stage::Transcription, transcript_path).await
    }

    /// Synthesize dubbed audio from a transcript file
    pub async fn synthesize<P: AsRef<Path>>(
        &self,
        transcript_path: P,
        output_path: P,
        target_language: &str,
    ) -> Result<PathBuf> {
        let output_path = output_path.as_ref();
        let segments = align_transcript(transcript_path).await?;
        let path = self.synthesizer
            .create_dubbed_audio(&segments, output_path, target_language)
            .await?;
        verify_artifact(Stage::Synthesis, &path).await?;
        Ok(path)
    }

    /// Replace the audio track of a video file
    pub async fn replace_audio<P: AsRef<Path>>(
        &self,
        video_path: P,
        audio_path: P,
        output_path: P,
    ) -> Result<()> {
        let output_path = output_path.as_ref();
        self.media
            .replace_audio(video_path.as_ref(), audio_path.as_ref(), output_path)
            .await?;
        verify_artifact(Stage::Muxing, output_path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LanguagePolicy;
    use crate::synthesize::TargetLanguage;
    use crate::testing::{fake_media, fake_speech, fake_transcriber, SPEECH_TRANSCRIPT};
    use crate::media::MockMediaProcessorTrait;
    use crate::synthesize::MockSpeechSynthesizerTrait;
    use crate::transcribe::MockTranscriberTrait;

    fn workflow(
        media: MockMediaProcessorTrait,
        transcriber: MockTranscriberTrait,
        speech: MockSpeechSynthesizerTrait,
    ) -> Workflow {
        Workflow::with_components(Config::default(), Box::new(media), Box::new(transcriber), Box::new(speech))
    }

    async fn scratch_with_video() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("input.mp4");
        fs::write(&video, b"original video").await.unwrap();
        (dir, video)
    }

    #[test]
    fn test_pipeline_paths_layout() {
        let paths = PipelinePaths::new("/job/input.mp4", "/job");
        assert_eq!(paths.audio, PathBuf::from("/job/audio.wav"));
        assert_eq!(paths.transcript, PathBuf::from("/job/transcript.json"));
        assert_eq!(paths.dubbed_audio, PathBuf::from("/job/dubbed_audio.mp3"));
        assert_eq!(paths.output_video, PathBuf::from("/job/output.mp4"));
    }

    #[tokio::test]
    async fn test_verify_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.wav");
        let empty = dir.path().join("empty.wav");
        let full = dir.path().join("full.wav");
        fs::write(&empty, b"").await.unwrap();
        fs::write(&full, b"RIFF").await.unwrap();

        assert!(matches!(
            verify_artifact(Stage::AudioExtraction, &missing).await,
            Err(RedubError::MissingArtifact { stage: Stage::AudioExtraction, .. })
        ));
        assert!(matches!(
            verify_artifact(Stage::AudioExtraction, &empty).await,
            Err(RedubError::EmptyArtifact { .. })
        ));
        assert!(verify_artifact(Stage::AudioExtraction, &full).await.is_ok());
    }

    #[tokio::test]
    async fn test_process_video_runs_all_stages() {
        let (dir, video) = scratch_with_video().await;
        let workflow = workflow(fake_media(), fake_transcriber(SPEECH_TRANSCRIPT), fake_speech());

        let output = workflow.process_video(&video, dir.path(), "hi").await.unwrap();

        assert_eq!(output, dir.path().join("output.mp4"));
        assert_eq!(fs::read(&output).await.unwrap(), b"original video");
        for name in ["audio.wav", "transcript.json", "dubbed_audio.mp3"] {
            assert!(dir.path().join(name).exists(), "{name} missing");
        }
    }

    #[tokio::test]
    async fn test_silent_video_fails_with_no_text() {
        let (dir, video) = scratch_with_video().await;
        let mut media = MockMediaProcessorTrait::new();
        media.expect_extract_audio().returning(|_, audio| {
            std::fs::write(audio, b"RIFF silence").unwrap();
            Ok(())
        });
        media.expect_replace_audio().never();
        let mut speech = MockSpeechSynthesizerTrait::new();
        speech.expect_synthesize().never();

        let workflow = workflow(media, fake_transcriber(r#"{"text": "", "segments": []}"#), speech);
        let err = workflow.process_video(&video, dir.path(), "en").await.unwrap_err();

        assert!(matches!(err, RedubError::NoText));
        assert!(!dir.path().join("output.mp4").exists());
    }

    #[tokio::test]
    async fn test_missing_transcript_fails_fast() {
        let (dir, video) = scratch_with_video().await;
        let mut media = MockMediaProcessorTrait::new();
        media.expect_extract_audio().returning(|_, audio| {
            std::fs::write(audio, b"RIFF").unwrap();
            Ok(())
        });
        media.expect_replace_audio().never();
        // exits cleanly but writes nothing
        let mut transcriber = MockTranscriberTrait::new();
        transcriber.expect_transcribe().returning(|_, _| Ok(()));
        let mut speech = MockSpeechSynthesizerTrait::new();
        speech.expect_synthesize().never();

        let workflow = workflow(media, transcriber, speech);
        let err = workflow.process_video(&video, dir.path(), "en").await.unwrap_err();

        match err {
            RedubError::MissingArtifact { stage, path } => {
                assert_eq!(stage, Stage::Transcription);
                assert_eq!(path, dir.path().join("transcript.json"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_rejected_language_runs_no_tools() {
        let (dir, video) = scratch_with_video().await;
        let mut media = MockMediaProcessorTrait::new();
        media.expect_extract_audio().never();
        let mut transcriber = MockTranscriberTrait::new();
        transcriber.expect_transcribe().never();

        let mut config = Config::default();
        config.synthesizer.language_policy = LanguagePolicy::Reject;
        let workflow = Workflow::with_components(
            config,
            Box::new(media),
            Box::new(transcriber),
            Box::new(MockSpeechSynthesizerTrait::new()),
        );

        let err = workflow.process_video(&video, dir.path(), "de").await.unwrap_err();
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_fallback_language_reaches_speech() {
        let (dir, video) = scratch_with_video().await;
        let mut speech = MockSpeechSynthesizerTrait::new();
        speech
            .expect_synthesize()
            .withf(|_, language, _| *language == TargetLanguage::English)
            .times(1)
            .returning(|_, _, out| {
                std::fs::write(out, b"ID3").unwrap();
                Ok(())
            });

        let workflow = workflow(fake_media(), fake_transcriber(SPEECH_TRANSCRIPT), speech);
        workflow.process_video(&video, dir.path(), "zz").await.unwrap();
    }

    #[tokio::test]
    async fn test_extraction_failure_aborts() {
        let (dir, video) = scratch_with_video().await;
        let mut media = MockMediaProcessorTrait::new();
        media
            .expect_extract_audio()
            .returning(|_, _| Err(RedubError::Media("no audio stream".to_string())));
        media.expect_replace_audio().never();
        let mut transcriber = MockTranscriberTrait::new();
        transcriber.expect_transcribe().never();

        let workflow = workflow(media, transcriber, MockSpeechSynthesizerTrait::new());
        let err = workflow.process_video(&video, dir.path(), "en").await.unwrap_err();
        assert!(matches!(err, RedubError::Media(_)));
    }

    #[tokio::test]
    async fn test_media_check_leaves_transcriber_alone() {
        let mut media = MockMediaProcessorTrait::new();
        media.expect_check_availability().times(1).returning(|| Ok(()));
        media
            .expect_get_version_info()
            .returning(|| Ok("ffmpeg version 6.1".to_string()));
        let mut transcriber = MockTranscriberTrait::new();
        transcriber.expect_check_availability().never();

        let workflow = workflow(media, transcriber, MockSpeechSynthesizerTrait::new());
        workflow.check_media().await.unwrap();
    }

    #[tokio::test]
    async fn test_transcriber_check_reports_missing_tool() {
        let mut media = MockMediaProcessorTrait::new();
        media.expect_check_availability().never();
        let mut transcriber = MockTranscriberTrait::new();
        transcriber
            .expect_check_availability()
            .returning(|| Err(RedubError::Config("whisper not found".to_string())));

        let workflow = workflow(media, transcriber, MockSpeechSynthesizerTrait::new());
        let err = workflow.check_transcriber().await.unwrap_err();
        assert!(matches!(err, RedubError::Config(_)));
    }

    #[tokio::test]
    async fn test_missing_input_video() {
        let dir = tempfile::tempdir().unwrap();
        let workflow = workflow(
            MockMediaProcessorTrait::new(),
            MockTranscriberTrait::new(),
            MockSpeechSynthesizerTrait::new(),
        );

        let err = workflow
            .process_video(dir.path().join("nope.mp4"), dir.path(), "en")
            .await
            .unwrap_err();
        assert!(matches!(err, RedubError::FileNotFound(_)));
    }
}
