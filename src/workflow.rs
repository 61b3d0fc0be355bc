//! End-to-end recognition of one file.
//!
//! Create → poll status → (observe result) → normalize → upload → extract →
//! delete. Steps run strictly in order against a single session.

use std::future::Future;
use std::path::Path;

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::audio::AudioNormalizer;
use crate::config::{Config, WorkflowConfig};
use crate::error::{Result, SpeechError};
use crate::session::{RecognitionStatus, Session, SessionClient};
use crate::transcript;

/// What to do when the status poll does not report `initialized`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessPolicy {
    /// Log and upload anyway. A failed poll is logged too.
    #[default]
    Warn,
    /// Fail with `NotReady`, or with the poll's own error.
    Abort,
}

/// When the remote session gets deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupPolicy {
    /// On every exit path once the session exists, including an interrupt
    /// delivered through `Recognizer::run_until`.
    #[default]
    Always,
    /// Only after a transcript was produced. Failed runs leave the session
    /// open on the service until it expires.
    OnSuccess,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recognition {
    pub transcript: String,
    pub session_id: String,
    /// Last polled state, if the poll succeeded.
    pub state: Option<String>,
}

pub struct Recognizer {
    client: SessionClient,
    normalizer: AudioNormalizer,
    workflow: WorkflowConfig,
    keep_temp_files: bool,
}

impl Recognizer {
    pub fn new(client: SessionClient, normalizer: AudioNormalizer, workflow: WorkflowConfig) -> Self {
        Self {
            client,
            normalizer,
            workflow,
            keep_temp_files: false,
        }
    }

    /// Fails with `Configuration` when credentials are missing.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = SessionClient::new(config.service.clone(), config.credentials()?);
        let normalizer = AudioNormalizer::from_config(&config.audio);

        Ok(Self::new(client, normalizer, config.workflow.clone())
            .keep_temp_files(config.audio.keep_temp_files))
    }

    pub fn keep_temp_files(mut self, keep: bool) -> Self {
        self.keep_temp_files = keep;
        self
    }

    pub async fn run(&self, input: impl AsRef<Path>) -> Result<Recognition> {
        self.run_until(input, std::future::pending()).await
    }

    /// Like `run`, but stops with `Interrupted` once `interrupt` completes.
    ///
    /// An interrupt that lands after the session was created still goes
    /// through the cleanup policy, so the session is deleted under `Always`.
    /// Creation itself is not cut short; it is bounded by the request timeout.
    pub async fn run_until(
        &self,
        input: impl AsRef<Path>,
        interrupt: impl Future<Output = ()>,
    ) -> Result<Recognition> {
        let input = input.as_ref();
        info!("Recognizing {}", input.display());

        let session = self.client.create().await?;

        tokio::pin!(interrupt);
        let outcome = tokio::select! {
            biased;
            _ = &mut interrupt => {
                warn!("Interrupted, releasing session {}", session.session_id());
                Err(SpeechError::Interrupted)
            }
            outcome = self.recognize(&session, input) => outcome,
        };

        if outcome.is_err() && self.workflow.cleanup == CleanupPolicy::OnSuccess {
            warn!("Leaving session {} open after failure", session.session_id());
            return outcome;
        }

        match (outcome, session.delete().await) {
            (Ok(recognition), Ok(())) => Ok(recognition),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(delete_err)) => {
                error!("Deleting session after failure also failed: {}", delete_err);
                Err(e)
            }
        }
    }

    async fn recognize(&self, session: &Session, input: &Path) -> Result<Recognition> {
        let state = self.check_ready(session).await?;

        if self.workflow.observe_result {
            session.observe_result().await?;
        }

        let audio = self.normalizer.normalize(input).await?;
        let uploaded = session.upload(&audio).await;

        if !self.keep_temp_files {
            if let Err(e) = audio.remove_temp().await {
                warn!("Could not remove {}: {}", audio.path().display(), e);
            }
        }

        let transcript = transcript::extract(&uploaded?, self.workflow.extraction)?;
        info!("Recognized {} chars", transcript.len());

        Ok(Recognition {
            transcript,
            session_id: session.session_id().to_string(),
            state,
        })
    }

    async fn check_ready(&self, session: &Session) -> Result<Option<String>> {
        let policy = self.workflow.readiness;

        let status = match session.poll_status().await {
            Ok(status) => status,
            Err(e) if policy == ReadinessPolicy::Warn => {
                warn!("Status poll failed, continuing: {}", e);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        if !status.is_ready() {
            match policy {
                ReadinessPolicy::Warn => warn!(
                    "Session state is {:?}, expected {:?}; continuing",
                    status.state,
                    RecognitionStatus::READY
                ),
                ReadinessPolicy::Abort => {
                    return Err(SpeechError::NotReady {
                        state: status.state,
                    })
                }
            }
        }

        Ok(Some(status.state))
    }
}
