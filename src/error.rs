use std::path::PathBuf;

/// Every way a recognition run can fail.
///
/// Nothing is retried. Each variant is terminal for the current run and is
/// handed back to the caller unchanged.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    /// Missing or empty credentials, or an unusable configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Request construction, connection, timeout or body read failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a status other than the one the call accepts.
    #[error("{error} - {code_description}")]
    Service {
        status: u16,
        error: String,
        code_description: String,
    },

    /// A response body did not match the expected shape.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The service answered, but no final alternative carried a confidence.
    #[error("nothing was recognized")]
    EmptyResult,

    /// The session reported a state other than `initialized`.
    #[error("session not ready: state is {state:?}")]
    NotReady { state: String },

    /// The external transcoder could not produce the WAV file.
    #[error("transcoding with {program} failed: {reason}")]
    Transcode { program: String, reason: String },

    /// The caller's interrupt fired before the run finished.
    #[error("interrupted")]
    Interrupted,

    #[error("audio file {path} unavailable: {source}")]
    Audio {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SpeechError {
    pub(crate) fn protocol(context: &str, err: serde_json::Error) -> Self {
        Self::Protocol(format!("{}: {}", context, err))
    }

    pub(crate) fn audio(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Audio {
            path: path.into(),
            source,
        }
    }

    /// True for failures reported by the service itself (as opposed to the
    /// network or a malformed body).
    pub fn is_service(&self) -> bool {
        matches!(self, Self::Service { .. })
    }
}

pub type Result<T> = std::result::Result<T, SpeechError>;
