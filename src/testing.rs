//! Mock backends that behave like the real tools on the filesystem.

use crate::media::MockMediaProcessorTrait;
use crate::synthesize::MockSpeechSynthesizerTrait;
use crate::transcribe::MockTranscriberTrait;

pub const SPEECH_TRANSCRIPT: &str = r#"{
    "text": " Hello there. This is a test.",
    "segments": [
        {"id": 0, "start": 0.0, "end": 2.4, "text": " Hello there."},
        {"id": 1, "start": 2.4, "end": 5.0, "text": " This is a test."}
    ],
    "language": "en"
}"#;

/// Extraction writes a WAV stub; muxing copies the source video to the output
pub fn fake_media() -> MockMediaProcessorTrait {
    let mut media = MockMediaProcessorTrait::new();
    media.expect_extract_audio().returning(|_, audio| {
        std::fs::write(audio, b"RIFF fake wav")?;
        Ok(())
    });
    media.expect_replace_audio().returning(|video, _, output| {
        std::fs::copy(video, output)?;
        Ok(())
    });
    media
}

pub fn fake_transcriber(transcript: &'static str) -> MockTranscriberTrait {
    let mut transcriber = MockTranscriberTrait::new();
    transcriber.expect_transcribe().returning(move |_, path| {
        std::fs::write(path, transcript)?;
        Ok(())
    });
    transcriber
}

pub fn fake_speech() -> MockSpeechSynthesizerTrait {
    let mut speech = MockSpeechSynthesizerTrait::new();
    speech.expect_synthesize().returning(|_, _, path| {
        std::fs::write(path, b"ID3 fake mp3")?;
        Ok(())
    });
    speech
}
