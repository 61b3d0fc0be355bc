use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Body, StatusCode, Url};
use tracing::{error, info};

use super::client::{accept, decode};
use super::messages::{RecognitionResult, RecognitionStatus, SessionInfo, StatusResponse};
use crate::audio::NormalizedAudio;
use crate::credentials::Credentials;
use crate::error::{Result, SpeechError};

/// A live recognition session on the service.
///
/// All requests go through one HTTP client bound to the cookie jar filled at
/// creation time. Calls on one session must not overlap. `delete` consumes the
/// session, so a deleted session cannot be used again.
pub struct Session {
    info: SessionInfo,
    credentials: Credentials,
    http: reqwest::Client,
    cookies: Arc<Jar>,
}

impl Session {
    pub(crate) fn new(
        info: SessionInfo,
        credentials: Credentials,
        http: reqwest::Client,
        cookies: Arc<Jar>,
    ) -> Self {
        Self {
            info,
            credentials,
            http,
            cookies,
        }
    }

    pub fn info(&self) -> &SessionInfo {
        &self.info
    }

    pub fn session_id(&self) -> &str {
        &self.info.session_id
    }

    pub fn new_session_uri(&self) -> &str {
        &self.info.new_session_uri
    }

    pub fn recognize_uri(&self) -> &str {
        &self.info.recognize
    }

    pub fn observe_result_uri(&self) -> &str {
        &self.info.observe_result
    }

    /// The `Cookie` header this session would send to `url`.
    pub fn affinity_cookies(&self, url: &str) -> Option<String> {
        let url = Url::parse(url).ok()?;
        let header = self.cookies.cookies(&url)?;
        header.to_str().ok().map(str::to_string)
    }

    /// GET `{recognize}`. Only HTTP 200 counts as success.
    pub async fn poll_status(&self) -> Result<RecognitionStatus> {
        info!("Get recognize status");

        let response = self
            .http
            .get(&self.info.recognize)
            .send()
            .await
            .inspect_err(|e| error!("Status request failed: {}", e))?;

        let body = accept(response, StatusCode::OK).await?;
        let status: StatusResponse = decode(&body, "status body")?;

        info!(
            "Get recognize status - Done (state {}, model {})",
            status.session.state, status.session.model
        );
        Ok(status.session)
    }

    /// Streams `audio` to `{recognize}?continuous=true` as `audio/wav`.
    ///
    /// Only HTTP 200 counts as success.
    pub async fn upload(&self, audio: &NormalizedAudio) -> Result<RecognitionResult> {
        let path = audio.path();
        info!("Sending audio {}", path.display());

        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| SpeechError::audio(path, e))?;

        let response = self
            .http
            .post(&self.info.recognize)
            .query(&[("continuous", "true")])
            .header(CONTENT_TYPE, "audio/wav")
            .body(Body::from(file))
            .send()
            .await
            .inspect_err(|e| error!("Recognize request failed: {}", e))?;

        let body = accept(response, StatusCode::OK).await?;
        let result: RecognitionResult = decode(&body, "recognize body")?;

        info!(
            "Send audio - Done ({} results, index {})",
            result.results.len(),
            result.result_index
        );
        Ok(result)
    }

    /// GET `{observe_result}` with the credentials in the URL.
    ///
    /// Only HTTP 200 counts as success; the body is not interpreted.
    pub async fn observe_result(&self) -> Result<()> {
        info!("Observe result");

        let url = self.credentials.embed_in(&self.info.observe_result);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .inspect_err(|e| error!("Observe request failed: {}", e))?;

        accept(response, StatusCode::OK).await?;

        info!("Observe result - Done");
        Ok(())
    }

    /// DELETE `{new_session_uri}` with the credentials in the URL.
    ///
    /// Only HTTP 204 counts as success; a 200 is a failure here.
    pub async fn delete(self) -> Result<()> {
        info!("Deleting session {}", self.info.session_id);

        let url = self.credentials.embed_in(&self.info.new_session_uri);
        let response = self
            .http
            .delete(url)
            .send()
            .await
            .inspect_err(|e| error!("Delete request failed: {}", e))?;

        accept(response, StatusCode::NO_CONTENT).await?;

        info!("Session closed!");
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("info", &self.info)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
