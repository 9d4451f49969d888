use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::{info, debug};

use crate::config::TranscriberConfig;
use crate::error::{Result, RedubError};
use super::{TranscriberTrait, common::{default_output_path, move_default_output}};

/// Transcriber backed by the `whisper` command-line tool
pub struct WhisperCliTranscriber {
    config: TranscriberConfig,
}

impl WhisperCliTranscriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }

    fn build_command(&self, audio_path: &Path, output_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.config.binary_path);
        cmd.arg(audio_path)
            .arg("--model").arg(&self.config.model)
            .arg("--output_format").arg("json")
            .arg("--output_dir").arg(output_dir);

        if let Some(lang) = &self.config.language {
            cmd.arg("--language").arg(lang);
        }

        cmd
    }
}

#[async_trait]
impl TranscriberTrait for WhisperCliTranscriber {
    async fn transcribe(&self, audio_path: &Path, transcript_path: &Path) -> Result<()> {
        info!("Running whisper ({} model) on {}", self.config.model, audio_path.display());

        let output_dir = match transcript_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => std::env::current_dir()?,
        };

        let mut cmd = self.build_command(audio_path, &output_dir);
        debug!("Executing whisper command: {:?}", cmd);

        let output = cmd.output().await
            .map_err(|e| RedubError::Transcriber(format!(
                "Failed to execute {}: {}", self.config.binary_path, e
            )))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RedubError::Transcriber(format!(
                "Whisper failed ({}): {}", output.status, stderr.trim()
            )));
        }

        let default_json = default_output_path(audio_path, &output_dir)?;
        move_default_output(&default_json, transcript_path).await?;

        info!("Transcript written to {}", transcript_path.display());
        Ok(())
    }

    async fn check_availability(&self) -> Result<()> {
        let output = Command::new(&self.config.binary_path)
            .arg("--help")
            .output()
            .await
            .map_err(|e| RedubError::Config(format!(
                "Transcriber '{}' not found: {}", self.config.binary_path, e
            )))?;

        if output.status.success() {
            info!("Transcriber is available");
            Ok(())
        } else {
            Err(RedubError::Config(format!(
                "Transcriber '{}' help check failed", self.config.binary_path
            )))
        }
    }
}
