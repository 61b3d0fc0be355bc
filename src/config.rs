use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::credentials::Credentials;
use crate::error::{Result, SpeechError};
use crate::transcript::ExtractionPolicy;
use crate::workflow::{CleanupPolicy, ReadinessPolicy};

pub const DEFAULT_SERVICE_URL: &str = "https://stream.watsonplatform.net/speech-to-text/api";
pub const DEFAULT_MODEL: &str = "pt-BR_BroadbandModel";

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Filled from `SPEECH_USERNAME`.
    pub username: String,
    /// Filled from `SPEECH_PASSWORD`.
    pub password: String,
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub workflow: WorkflowConfig,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("username", &self.username)
            .field("password", &"***")
            .field("service", &self.service)
            .field("audio", &self.audio)
            .field("workflow", &self.workflow)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// API root; `/v1/sessions` is appended for session creation.
    pub url: String,
    /// Recognition model passed as `?model=` on session creation.
    pub model: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVICE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout_secs: 120,
            connect_timeout_secs: 10,
        }
    }
}

impl ServiceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Where transcoded files go. Defaults to the system temp dir.
    pub temp_dir: Option<PathBuf>,
    /// Leave transcoded temp files on disk after upload.
    pub keep_temp_files: bool,
    pub transcoder: TranscoderConfig,
}

impl AudioConfig {
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// External decoder invocation. `{input}` and `{output}` in `args` are
/// replaced with the source and destination paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranscoderConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            program: "avconv".to_string(),
            args: vec![
                "-i".to_string(),
                "{input}".to_string(),
                "{output}".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub readiness: ReadinessPolicy,
    pub extraction: ExtractionPolicy,
    pub cleanup: CleanupPolicy,
    /// Call the observe-result endpoint after the status poll.
    pub observe_result: bool,
}

impl Config {
    /// Loads `path` (any format the `config` crate knows, extension optional,
    /// missing file allowed) and overlays `SPEECH_*` environment variables.
    ///
    /// `SPEECH_USERNAME` / `SPEECH_PASSWORD` map to the credentials; nested keys
    /// use a double underscore, e.g. `SPEECH_SERVICE__MODEL`. Transcoder
    /// arguments can only be set from the file. Env values stay strings until
    /// deserialized, so numeric-looking credentials are kept verbatim.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("SPEECH")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| SpeechError::Configuration(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| SpeechError::Configuration(e.to_string()))
    }

    /// Validated credentials. Fails before any network call if either is empty.
    pub fn credentials(&self) -> Result<Credentials> {
        Credentials::new(self.username.clone(), self.password.clone())
    }
}
