use hound::WavReader;
use std::path::Path;
use tracing::info;

/// Format details read from a WAV header. Samples are not loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct WavInfo {
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl WavInfo {
    pub fn probe(path: impl AsRef<Path>) -> Result<Self, hound::Error> {
        let path = path.as_ref();
        let reader = WavReader::open(path)?;

        let spec = reader.spec();
        // duration() is in frames (samples per channel)
        let duration_seconds = reader.duration() as f64 / spec.sample_rate as f64;

        info!(
            "WAV input {}: {:.1}s, {}Hz, {} channels, {} bits",
            path.display(),
            duration_seconds,
            spec.sample_rate,
            spec.channels,
            spec.bits_per_sample
        );

        Ok(Self {
            duration_seconds,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            bits_per_sample: spec.bits_per_sample,
        })
    }
}
