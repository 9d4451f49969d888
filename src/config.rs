use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, RedubError};

fn default_tts_timeout_secs() -> u64 {
    300
}

fn default_max_upload_mb() -> usize {
    512
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub media: MediaConfig,
    pub transcriber: TranscriberConfig,
    pub synthesizer: SynthesizerConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Codec used for the dubbed audio track
    pub audio_codec: String,
    /// Bitrate for the dubbed audio track (e.g. "192k")
    pub audio_bitrate: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriberConfig {
    /// Path to the whisper CLI
    pub binary_path: String,
    /// Whisper model size
    pub model: String,
    /// Source language hint; whisper auto-detects when unset
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesizerConfig {
    /// Top-level domain of the Google Translate host
    pub tld: String,
    /// Read the text more slowly
    pub slow: bool,
    /// Request timeout for each speech request
    #[serde(default = "default_tts_timeout_secs")]
    pub timeout_secs: u64,
    /// Language used when the caller does not pick one
    pub default_language: String,
    /// What to do with language codes outside the supported set
    pub language_policy: LanguagePolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LanguagePolicy {
    /// Synthesize in English and log a warning
    FallbackToEnglish,
    /// Refuse the request as a client error
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding finished videos, one file per request id
    pub results_dir: PathBuf,
    /// How long a finished video stays downloadable
    pub result_ttl_secs: u64,
    /// How often expired results are purged
    pub cleanup_interval_secs: u64,
    /// Largest accepted upload
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate: "192k".to_string(),
        }
    }
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            binary_path: "whisper".to_string(),
            model: "base".to_string(),
            language: None,
        }
    }
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            tld: "com".to_string(),
            slow: false,
            timeout_secs: default_tts_timeout_secs(),
            default_language: "en".to_string(),
            language_policy: LanguagePolicy::FallbackToEnglish,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            results_dir: PathBuf::from(".redub/results"),
            result_ttl_secs: 3600,
            cleanup_interval_secs: 60,
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RedubError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| RedubError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| RedubError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| RedubError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
