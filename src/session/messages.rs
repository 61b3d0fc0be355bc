use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of a successful session creation (HTTP 201).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub new_session_uri: String,
    pub recognize: String,
    pub observe_result: String,
}

/// Body of `GET {recognize}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub session: RecognitionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionStatus {
    pub state: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub recognize: String,
    #[serde(default)]
    pub observe_result: String,
}

impl RecognitionStatus {
    pub const READY: &'static str = "initialized";

    pub fn is_ready(&self) -> bool {
        self.state == Self::READY
    }
}

/// Body of `POST {recognize}?continuous=true`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    #[serde(default)]
    pub result_index: i64,
    #[serde(default)]
    pub results: Vec<ResultItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    #[serde(rename = "final", default)]
    pub is_final: bool,
    /// Each alternative is kept as an open map: only `confidence` (presence)
    /// and `transcript` are interpreted.
    #[serde(default)]
    pub alternatives: Vec<Map<String, Value>>,
}

/// Error body the service sends with every non-accepted status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub code_description: String,
}
