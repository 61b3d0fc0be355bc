//! Turning a recognition response into plain text.
//!
//! An alternative is authoritative only when it belongs to a `final` result
//! and carries a `confidence` field. Interim hypotheses are ignored.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Result, SpeechError};
use crate::session::RecognitionResult;

/// Which qualifying alternatives make up the transcript.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionPolicy {
    /// Every qualifying alternative of every final result, joined by a space.
    #[default]
    All,
    /// Stop at the first qualifying alternative.
    First,
}

pub fn extract(result: &RecognitionResult, policy: ExtractionPolicy) -> Result<String> {
    let mut parts = Vec::new();

    for alternative in qualifying(result) {
        let text = transcript_of(alternative)?;
        parts.push(text);

        if policy == ExtractionPolicy::First {
            break;
        }
    }

    debug!("{} qualifying alternatives ({:?})", parts.len(), policy);

    if parts.is_empty() {
        return Err(SpeechError::EmptyResult);
    }
    Ok(parts.join(" "))
}

fn qualifying(result: &RecognitionResult) -> impl Iterator<Item = &Map<String, Value>> {
    result
        .results
        .iter()
        .filter(|item| item.is_final)
        .flat_map(|item| item.alternatives.iter())
        .filter(|alternative| alternative.contains_key("confidence"))
}

fn transcript_of(alternative: &Map<String, Value>) -> Result<&str> {
    alternative
        .get("transcript")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            SpeechError::Protocol("final alternative without a transcript string".to_string())
        })
}
