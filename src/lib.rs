pub mod audio;
pub mod config;
pub mod credentials;
pub mod error;
pub mod session;
pub mod transcript;
pub mod workflow;

pub use audio::{AudioNormalizer, CommandTranscoder, NormalizedAudio, Transcoder};
pub use config::Config;
pub use credentials::Credentials;
pub use error::{Result, SpeechError};
pub use session::{RecognitionResult, RecognitionStatus, Session, SessionClient};
pub use transcript::{extract, ExtractionPolicy};
pub use workflow::{CleanupPolicy, ReadinessPolicy, Recognition, Recognizer};
