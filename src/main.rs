use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use speech_session::{Config, Recognizer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about = "Transcribe an audio file with a remote speech session")]
struct Args {
    /// File to convert into text
    #[arg(long)]
    input: Option<PathBuf>,

    /// Config file (extension optional, may be absent)
    #[arg(long, default_value = "config/speech-session")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let Some(input) = args.input else {
        info!("Send a file with --input");
        return Ok(());
    };

    let cfg = Config::load(&args.config).context("Failed to load config")?;
    let recognizer = Recognizer::from_config(&cfg)?;

    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Ctrl-C handler unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    };
    let recognition = recognizer
        .run_until(&input, interrupt)
        .await
        .with_context(|| format!("Failed to recognize {}", input.display()))?;

    info!("Session {} finished", recognition.session_id);
    println!("{}", recognition.transcript);

    Ok(())
}
