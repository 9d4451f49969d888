use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, RedubError};
use crate::workflow::Stage;

/// Whisper JSON transcript, as written by `--output_format json`.
///
/// Only the fields the pipeline reads are modeled; anything else in the file
/// is ignored. Missing or null values fall back to zero / empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WhisperTranscript {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub segments: Vec<WhisperSegment>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WhisperSegment {
    #[serde(default)]
    pub start: Option<f64>,
    #[serde(default)]
    pub end: Option<f64>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Where whisper writes its JSON for `audio_path` inside `output_dir`
pub fn default_output_path(audio_path: &Path, output_dir: &Path) -> Result<PathBuf> {
    let stem = audio_path.file_stem()
        .ok_or_else(|| RedubError::Transcriber(format!(
            "Invalid audio filename: {}", audio_path.display()
        )))?;

    Ok(output_dir.join(format!("{}.json", stem.to_string_lossy())))
}

/// Move whisper's default output to the requested transcript path.
///
/// A missing default output means the tool wrote nothing usable; that is an
/// error here rather than a stale transcript further down the pipeline.
pub async fn move_default_output(default_path: &Path, transcript_path: &Path) -> Result<()> {
    if !tokio::fs::try_exists(default_path).await? {
        return Err(RedubError::MissingArtifact {
            stage: Stage::Transcription,
            path: default_path.to_path_buf(),
        });
    }

    if default_path == transcript_path {
        return Ok(());
    }

    debug!("Renaming {} to {}", default_path.display(), transcript_path.display());
    tokio::fs::rename(default_path, transcript_path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path_uses_audio_stem() {
        let path = default_output_path(Path::new("/tmp/job/audio.wav"), Path::new("/tmp/job")).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/job/audio.json"));
    }

    #[test]
    fn test_parse_tolerates_missing_fields() {
        let transcript: WhisperTranscript = serde_json::from_str(
            r#"{"segments": [{"start": 1, "text": " hi"}, {"end": null}], "extra": true}"#,
        ).unwrap();

        assert_eq!(transcript.segments.len(), 2);
        assert_eq!(transcript.segments[0].start, Some(1.0));
        assert_eq!(transcript.segments[0].end, None);
        assert_eq!(transcript.segments[1].text, None);
    }

    #[tokio::test]
    async fn test_move_default_output_renames() {
        let dir = tempfile::tempdir().unwrap();
        let default_path = dir.path().join("audio.json");
        let target = dir.path().join("transcript.json");
        tokio::fs::write(&default_path, b"{\"segments\": []}").await.unwrap();

        move_default_output(&default_path, &target).await.unwrap();

        assert!(!default_path.exists());
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "{\"segments\": []}");
    }

    #[tokio::test]
    async fn test_move_default_output_missing_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let default_path = dir.path().join("audio.json");
        let target = dir.path().join("transcript.json");

        let err = move_default_output(&default_path, &target).await.unwrap_err();
        match err {
            RedubError::MissingArtifact { stage, path } => {
                assert_eq!(stage, Stage::Transcription);
                assert_eq!(path, default_path);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!target.exists());
    }
}
