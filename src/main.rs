//! Redub - Automated Video Dubbing Workflow
//!
//! Entry point for the command-line interface and the HTTP server.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use redub::cli::{Args, Commands};
use redub::config::{Config, LanguagePolicy};
use redub::error::RedubError;
use redub::server;
use redub::synthesize::TargetLanguage;
use redub::workflow::Workflow;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    info!("Starting Redub - Automated Video Dubbing Workflow");

    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Languages => {
            println!("\nSupported Target Languages:");
            println!("{:<10} {:<10}", "Code", "Language");
            println!("{}", "-".repeat(20));
            for language in TargetLanguage::ALL {
                println!("{:<10} {:<10}", language.provider_code(), language.name());
            }
            println!("\nPolicy for other codes: {:?}", config.synthesizer.language_policy);
            return Ok(());
        }
        Commands::Serve { host, port, language_policy } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(policy) = language_policy {
                config.synthesizer.language_policy = parse_language_policy(&policy)?;
            }

            let server_config = config.server.clone();
            let workflow = Workflow::new(config).await?;
            let handle = server::start(server_config, workflow).await?;
            info!("Serving on port {}, press Ctrl-C to stop", handle.port);

            tokio::signal::ctrl_c().await?;
            info!("Shutting down");
            handle.shutdown();
        }
        Commands::Process { input, output, target_lang, language_policy } => {
            info!("Processing video file: {}", input.display());

            if let Some(policy) = language_policy {
                config.synthesizer.language_policy = parse_language_policy(&policy)?;
            }
            let target_lang = target_lang
                .unwrap_or_else(|| config.synthesizer.default_language.clone());

            let workflow = Workflow::new(config).await?;
            let scratch = tempfile::tempdir()?;
            let dubbed = workflow.process_video(&input, scratch.path(), &target_lang).await?;

            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::copy(&dubbed, &output).await?;
            info!("Final video created at: {}", output.display());
        }
        Commands::Extract { input, output } => {
            info!("Extracting audio from: {}", input.display());
            let workflow = Workflow::unchecked(config)?;
            workflow.check_media().await?;
            workflow.extract_audio(&input, &output).await?;
        }
        Commands::Transcribe { input, output } => {
            info!("Transcribing audio: {}", input.display());
            let workflow = Workflow::unchecked(config)?;
            workflow.check_transcriber().await?;
            workflow.transcribe_audio(&input, &output).await?;
        }
        Commands::Align { input, output } => {
            let segments = redub::align::align_transcript(&input).await?;
            let json = serde_json::to_string_pretty(&segments)?;
            match output {
                Some(path) => tokio::fs::write(&path, json).await?,
                None => println!("{}", json),
            }
        }
        Commands::Synthesize { input, output, target_lang } => {
            info!("Synthesizing speech from transcript: {}", input.display());
            let target_lang = target_lang
                .unwrap_or_else(|| config.synthesizer.default_language.clone());
            let workflow = Workflow::unchecked(config)?;
            workflow.synthesize(&input, &output, &target_lang).await?;
        }
        Commands::Mux { video, audio, output } => {
            info!("Replacing audio of {} with {}", video.display(), audio.display());
            let workflow = Workflow::unchecked(config)?;
            workflow.check_media().await?;
            workflow.replace_audio(&video, &audio, &output).await?;
        }
    }

    info!("Redub completed successfully");
    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".redub").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "redub.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("redub.log").display());

    Ok(())
}

/// Parse language policy from string
fn parse_language_policy(policy: &str) -> Result<LanguagePolicy> {
    match policy.to_lowercase().as_str() {
        "fallback" => Ok(LanguagePolicy::FallbackToEnglish),
        "reject" => Ok(LanguagePolicy::Reject),
        _ => Err(RedubError::Config(format!(
            "Invalid language policy '{}'. Valid policies: fallback, reject",
            policy
        )).into()),
    }
}
