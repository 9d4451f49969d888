use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the upload form and the /process endpoint
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Handling of unsupported language codes: fallback or reject
        #[arg(long)]
        language_policy: Option<String>,
    },

    /// Dub a single video file
    Process {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Output video file
        #[arg(short, long)]
        output: PathBuf,

        /// Target language code (hi, te, kn, ta, en)
        #[arg(short, long)]
        target_lang: Option<String>,

        /// Handling of unsupported language codes: fallback or reject
        #[arg(long)]
        language_policy: Option<String>,
    },

    /// Extract audio from video file
    Extract {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Output WAV file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Transcribe audio into a JSON transcript
    Transcribe {
        /// Input audio file
        #[arg(short, long)]
        input: PathBuf,

        /// Output transcript file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Normalize a transcript into numbered segments
    Align {
        /// Input transcript file
        #[arg(short, long)]
        input: PathBuf,

        /// Write segments here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate dubbed speech from a transcript
    Synthesize {
        /// Input transcript file
        #[arg(short, long)]
        input: PathBuf,

        /// Output audio file
        #[arg(short, long)]
        output: PathBuf,

        /// Target language code (hi, te, kn, ta, en)
        #[arg(short, long)]
        target_lang: Option<String>,
    },

    /// Replace the audio track of a video
    Mux {
        /// Input video file
        #[arg(long)]
        video: PathBuf,

        /// Dubbed audio file
        #[arg(long)]
        audio: PathBuf,

        /// Output video file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List supported target languages
    Languages,
}
