use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tracing::{info, debug};

use crate::config::SynthesizerConfig;
use crate::error::{Result, RedubError};
use super::{SpeechSynthesizerTrait, TargetLanguage};

const RPC_ID: &str = "jQ1olc";

/// Longest text the endpoint accepts in one request, in characters
pub const MAX_CHUNK_CHARS: usize = 100;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; WOW64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/47.0.2526.106 Safari/537.36";

/// Speech synthesis through the Google Translate text-to-speech endpoint
pub struct GoogleTranslateTts {
    client: Client,
    config: SynthesizerConfig,
}

impl GoogleTranslateTts {
    pub fn new(config: SynthesizerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "https://translate.google.{}/_/TranslateWebserverUi/data/batchexecute",
            self.config.tld
        )
    }

    /// Build the `f.req` form value for one chunk of text
    fn package_rpc(&self, text: &str, language: TargetLanguage) -> Result<String> {
        let speed = if self.config.slow { json!(true) } else { Value::Null };
        let parameter = serde_json::to_string(&json!([text, language.provider_code(), speed, "null"]))?;
        let rpc = json!([[[RPC_ID, parameter, Value::Null, "generic"]]]);
        Ok(serde_json::to_string(&rpc)?)
    }

    async fn synthesize_chunk(&self, text: &str, language: TargetLanguage) -> Result<Vec<u8>> {
        let rpc = self.package_rpc(text, language)?;
        let url = self.endpoint();

        debug!("Sending speech request to: {}", url);

        let response = self.client
            .post(&url)
            .header("Referer", format!("http://translate.google.{}/", self.config.tld))
            .form(&[("f.req", rpc)])
            .send()
            .await
            .map_err(|e| RedubError::Synthesis(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(RedubError::Synthesis(format!(
                "Speech API error {}: {}", status, error_text
            )));
        }

        let body = response.text().await
            .map_err(|e| RedubError::Synthesis(format!("Failed to read response: {}", e)))?;

        decode_audio_response(&body)
    }
}

#[async_trait]
impl SpeechSynthesizerTrait for GoogleTranslateTts {
    async fn synthesize(&self, text: &str, language: TargetLanguage, output_path: &Path) -> Result<()> {
        let chunks = split_text(text, MAX_CHUNK_CHARS);
        info!("Generating speech in {} from {} chunk(s)", language, chunks.len());

        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            debug!("Chunk {}/{}: {}", idx + 1, chunks.len(), chunk);
            audio.extend(self.synthesize_chunk(chunk, language).await?);
        }

        tokio::fs::write(output_path, audio).await?;
        Ok(())
    }
}

/// Split text into whitespace-delimited pieces of at most `max_chars`
/// characters. Words longer than the limit are cut.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current_len > 0 && current_len + 1 + word_len > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if word_len > max_chars {
            let chars: Vec<char> = word.chars().collect();
            let mut pieces = chars.chunks(max_chars).map(|c| c.iter().collect::<String>());
            let mut last = pieces.next().unwrap_or_default();
            for piece in pieces {
                chunks.push(std::mem::replace(&mut last, piece));
            }
            current_len = last.chars().count();
            current = last;
            continue;
        }

        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Pull the base64 audio out of a batchexecute response body
pub fn decode_audio_response(body: &str) -> Result<Vec<u8>> {
    for line in body.lines().filter(|l| l.contains(RPC_ID)) {
        let Ok(Value::Array(entries)) = serde_json::from_str::<Value>(line) else {
            continue;
        };

        for entry in entries {
            if entry.get(1).and_then(Value::as_str) != Some(RPC_ID) {
                continue;
            }

            let Some(payload) = entry.get(2).and_then(Value::as_str) else {
                continue;
            };

            let inner: Value = serde_json::from_str(payload)?;
            if let Some(encoded) = inner.get(0).and_then(Value::as_str) {
                return STANDARD.decode(encoded)
                    .map_err(|e| RedubError::Synthesis(format!("Invalid audio payload: {}", e)));
            }
        }
    }

    Err(RedubError::Synthesis("No audio stream in speech response".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_short_text_is_single_chunk() {
        assert_eq!(split_text("  hello   world ", 100), vec!["hello world"]);
        assert!(split_text("   ", 100).is_empty());
    }

    #[test]
    fn test_split_respects_limit() {
        let text = "one two three four five six seven";
        let chunks = split_text(text, 10);

        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
        assert_eq!(chunks.join(" "), text);
    }

    #[test]
    fn test_split_cuts_long_words() {
        let chunks = split_text("abcdefghij xy", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij", "xy"]);
    }

    #[test]
    fn test_split_counts_chars_not_bytes() {
        // each Devanagari letter is three bytes
        let chunks = split_text("नमस्ते दुनिया", 20);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_package_rpc_shape() {
        let tts = GoogleTranslateTts::new(SynthesizerConfig::default()).unwrap();
        let rpc = tts.package_rpc("hello", TargetLanguage::Hindi).unwrap();

        let parsed: Value = serde_json::from_str(&rpc).unwrap();
        assert_eq!(parsed[0][0][0], RPC_ID);
        assert_eq!(parsed[0][0][1], r#"["hello","hi",null,"null"]"#);
        assert_eq!(parsed[0][0][3], "generic");
    }

    #[test]
    fn test_decode_audio_response() {
        let encoded = STANDARD.encode(b"ID3 fake mp3");
        let payload = serde_json::to_string(&json!([encoded])).unwrap();
        let line = serde_json::to_string(&json!([
            ["wrb.fr", RPC_ID, payload, null, null, null, "generic"],
            ["di", 51]
        ])).unwrap();
        let body = format!(")]}}'\n\n123\n{}\n25\n[[\"e\",4,null,null,175]]\n", line);

        assert_eq!(decode_audio_response(&body).unwrap(), b"ID3 fake mp3");
    }

    #[test]
    fn test_decode_without_audio_is_error() {
        let err = decode_audio_response(")]}'\n\n[[\"e\",4,null,null,175]]\n").unwrap_err();
        assert!(matches!(err, RedubError::Synthesis(_)));
    }
}
