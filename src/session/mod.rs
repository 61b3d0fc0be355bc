//! Session lifecycle against the speech service
//!
//! This module provides:
//! - `SessionClient`: creates sessions (one cookie jar per session)
//! - `Session`: status poll, audio upload, observe-result and delete
//! - Wire types for every request and response body

mod client;
mod messages;
mod session;

pub use client::SessionClient;
pub use messages::{
    ErrorResponse, RecognitionResult, RecognitionStatus, ResultItem, SessionInfo, StatusResponse,
};
pub use session::Session;
