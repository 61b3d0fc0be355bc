use std::path::Path;

use tokio::process::Command;
use tracing::{debug, error, info};

use crate::config::TranscoderConfig;
use crate::error::{Result, SpeechError};

/// Converts an arbitrary audio file into WAV.
///
/// Implementations:
/// - `CommandTranscoder`: runs an external decoder such as `avconv` or `ffmpeg`
/// - test doubles that copy or fail on demand
#[async_trait::async_trait]
pub trait Transcoder: Send + Sync {
    /// Write a WAV rendition of `input` to `output`.
    ///
    /// Returns `SpeechError::Transcode` if no usable output was produced.
    async fn transcode(&self, input: &Path, output: &Path) -> Result<()>;

    /// Name for logging
    fn name(&self) -> &str;
}

/// Runs an external program built from a `{input}` / `{output}` template.
#[derive(Debug, Clone)]
pub struct CommandTranscoder {
    program: String,
    args: Vec<String>,
}

impl CommandTranscoder {
    pub fn new(config: &TranscoderConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }

    /// Arguments with the placeholders filled in.
    pub fn render_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let input = input.display().to_string();
        let output = output.display().to_string();

        self.args
            .iter()
            .map(|arg| arg.replace("{input}", &input).replace("{output}", &output))
            .collect()
    }

    fn failure(&self, reason: impl Into<String>) -> SpeechError {
        SpeechError::Transcode {
            program: self.program.clone(),
            reason: reason.into(),
        }
    }
}

impl Default for CommandTranscoder {
    fn default() -> Self {
        Self::new(&TranscoderConfig::default())
    }
}

#[async_trait::async_trait]
impl Transcoder for CommandTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<()> {
        let args = self.render_args(input, output);
        info!("Converting {} with: {} {}", input.display(), self.program, args.join(" "));

        let result = Command::new(&self.program)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                error!("Failed to start {}: {}", self.program, e);
                self.failure(format!("could not start: {}", e))
            })?;

        let stderr = String::from_utf8_lossy(&result.stderr);
        if !result.status.success() {
            error!("{} exited with {}: {}", self.program, result.status, stderr.trim());
            return Err(self.failure(format!("{}: {}", result.status, stderr.trim())));
        }
        debug!("{} output: {}", self.program, stderr.trim());

        if tokio::fs::metadata(output).await.is_err() {
            error!("{} reported success but {} is missing", self.program, output.display());
            return Err(self.failure(format!("no output at {}", output.display())));
        }

        info!("Done converting to {}", output.display());
        Ok(())
    }

    fn name(&self) -> &str {
        &self.program
    }
}
