use std::path::Path;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use crate::error::Result;
use crate::transcribe::WhisperTranscript;

/// One timed piece of transcript text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub id: usize,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Read a whisper JSON transcript and normalize it into ordered segments.
///
/// This is a structural pass: timings are copied as found, never checked
/// against the audio. Segment timing is not used downstream.
pub async fn align_transcript<P: AsRef<Path>>(transcript_path: P) -> Result<Vec<TranscriptSegment>> {
    let transcript_path = transcript_path.as_ref();
    let content = fs::read_to_string(transcript_path).await?;
    let segments = parse_segments(&content)?;

    info!("Alignment complete: {} segments found", segments.len());
    Ok(segments)
}

/// Normalize transcript JSON text into zero-based segments
pub fn parse_segments(content: &str) -> Result<Vec<TranscriptSegment>> {
    let transcript: WhisperTranscript = serde_json::from_str(content)?;
    Ok(normalize(transcript))
}

fn normalize(transcript: WhisperTranscript) -> Vec<TranscriptSegment> {
    transcript.segments
        .into_iter()
        .enumerate()
        .map(|(id, seg)| TranscriptSegment {
            id,
            start: seg.start.unwrap_or(0.0),
            end: seg.end.unwrap_or(0.0),
            text: seg.text.unwrap_or_default(),
        })
        .collect()
}
