use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{error, info};

use super::messages::{ErrorResponse, SessionInfo};
use super::session::Session;
use crate::config::ServiceConfig;
use crate::credentials::Credentials;
use crate::error::{Result, SpeechError};

/// Opens recognition sessions.
///
/// Each `create` call gets its own cookie jar; the returned `Session` keeps
/// that jar for every follow-up request so the service keeps routing to the
/// same session.
pub struct SessionClient {
    config: ServiceConfig,
    credentials: Credentials,
}

impl SessionClient {
    pub fn new(config: ServiceConfig, credentials: Credentials) -> Self {
        Self {
            config,
            credentials,
        }
    }

    /// `{scheme}://{user}:{pass}@{service}/v1/sessions`
    pub fn session_url(&self) -> String {
        self.credentials.make_session_url(&self.config.url)
    }

    pub async fn create(&self) -> Result<Session> {
        self.create_at(&self.session_url()).await
    }

    /// POST `{session_url}?model=...` with an empty JSON body.
    ///
    /// Only HTTP 201 counts as success.
    pub async fn create_at(&self, session_url: &str) -> Result<Session> {
        info!("Getting session (model {})", self.config.model);

        let cookies = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&cookies))
            .timeout(self.config.request_timeout())
            .connect_timeout(self.config.connect_timeout())
            .build()?;

        let response = http
            .post(session_url)
            .query(&[("model", self.config.model.as_str())])
            .json(&serde_json::json!({}))
            .send()
            .await
            .inspect_err(|e| error!("Session request failed: {}", e))?;

        let body = accept(response, StatusCode::CREATED).await?;
        let info: SessionInfo = decode(&body, "session body")?;

        info!("Getting session - Done ({})", info.session_id);

        Ok(Session::new(
            info,
            self.credentials.clone(),
            http,
            cookies,
        ))
    }
}

/// Reads the whole body and checks the status against the single accepted
/// value. Anything else is decoded as the service's error body.
pub(crate) async fn accept(response: Response, expected: StatusCode) -> Result<Vec<u8>> {
    let status = response.status();
    let body = response.bytes().await?;

    if status == expected {
        return Ok(body.to_vec());
    }

    let err: ErrorResponse = decode(&body, "error body")?;
    error!(
        "Service answered {} (expected {}): {} - {}",
        status.as_u16(),
        expected.as_u16(),
        err.error,
        err.code_description
    );

    Err(SpeechError::Service {
        status: status.as_u16(),
        error: err.error,
        code_description: err.code_description,
    })
}

pub(crate) fn decode<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| {
        error!("Unmarshal {} failed: {}", what, e);
        SpeechError::protocol(what, e)
    })
}
