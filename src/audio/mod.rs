pub mod file;
pub mod normalizer;
pub mod sniff;
pub mod transcoder;

pub use file::WavInfo;
pub use normalizer::{AudioNormalizer, NormalizedAudio};
pub use sniff::{sniff_content_type, WAVE_CONTENT_TYPE};
pub use transcoder::{CommandTranscoder, Transcoder};
