//! Redub - Automated Video Dubbing Workflow
//!
//! Extracts the speech from a video with ffmpeg, transcribes it with whisper,
//! speaks it again with a text-to-speech service, and puts the new audio
//! track back on the original video.

pub mod align;
pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod server;
pub mod synthesize;
pub mod transcribe;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;
