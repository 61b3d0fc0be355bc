use std::path::{Path, PathBuf};

use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::file::WavInfo;
use super::sniff::{sniff_content_type, SNIFF_LEN, WAVE_CONTENT_TYPE};
use super::transcoder::{CommandTranscoder, Transcoder};
use crate::config::AudioConfig;
use crate::error::{Result, SpeechError};

/// An audio file ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAudio {
    path: PathBuf,
    transcoded: bool,
}

impl NormalizedAudio {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if `path` is a temp file written by the transcoder.
    pub fn is_transcoded(&self) -> bool {
        self.transcoded
    }

    /// Deletes the temp file, if there is one. The caller's original input is
    /// never touched.
    pub async fn remove_temp(&self) -> std::io::Result<()> {
        if !self.transcoded {
            return Ok(());
        }

        debug!("Removing temp audio {}", self.path.display());
        tokio::fs::remove_file(&self.path).await
    }
}

/// Makes sure the uploaded payload is `audio/wave`.
pub struct AudioNormalizer {
    temp_dir: PathBuf,
    transcoder: Box<dyn Transcoder>,
}

impl AudioNormalizer {
    pub fn new(temp_dir: impl Into<PathBuf>, transcoder: Box<dyn Transcoder>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
            transcoder,
        }
    }

    pub fn from_config(config: &AudioConfig) -> Self {
        Self::new(
            config.temp_dir(),
            Box::new(CommandTranscoder::new(&config.transcoder)),
        )
    }

    /// Returns `path` untouched when it already sniffs as WAV, otherwise the
    /// path of a freshly transcoded `<temp_dir>/<uuid>.wav`.
    ///
    /// Temp files are left for the caller to remove. A partial output from a
    /// failed or cancelled transcode is removed here.
    pub async fn normalize(&self, path: impl AsRef<Path>) -> Result<NormalizedAudio> {
        let path = path.as_ref();
        let content_type = sniff_file(path).await?;

        if content_type == WAVE_CONTENT_TYPE {
            info!("{} is already {}", path.display(), WAVE_CONTENT_TYPE);
            if let Err(e) = WavInfo::probe(path) {
                warn!("Could not read WAV header of {}: {}", path.display(), e);
            }
            return Ok(NormalizedAudio {
                path: path.to_path_buf(),
                transcoded: false,
            });
        }

        let output = self.temp_path();
        info!(
            "{} is {}, converting with {}",
            path.display(),
            content_type,
            self.transcoder.name()
        );
        let guard = PartialOutput::new(output);
        self.transcoder.transcode(path, &guard.path).await?;

        Ok(NormalizedAudio {
            path: guard.keep(),
            transcoded: true,
        })
    }

    /// A collision-resistant destination inside the temp dir.
    pub fn temp_path(&self) -> PathBuf {
        self.temp_dir
            .join(format!("{}.wav", Uuid::new_v4().hyphenated()))
    }
}

/// Removes the transcoder output on drop unless `keep` was called.
struct PartialOutput {
    path: PathBuf,
    armed: bool,
}

impl PartialOutput {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn keep(mut self) -> PathBuf {
        self.armed = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for PartialOutput {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed partial output {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove {}: {}", self.path.display(), e),
        }
    }
}

async fn sniff_file(path: &Path) -> Result<&'static str> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| SpeechError::audio(path, e))?;

    let mut header = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64)
        .read_to_end(&mut header)
        .await
        .map_err(|e| SpeechError::audio(path, e))?;

    Ok(sniff_content_type(&header))
}
