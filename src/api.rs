//! HTTP client for the public geobroker API.
//!
//! DESIGN
//! ======
//! Two endpoints, both addressed per unit:
//!
//! ```text
//! GET  {api}/scope/{id}?token={token}       full snapshot
//! POST {api}/positions/{id}?token={token}   own position
//! ```
//!
//! Without both id and token no URL can be built and nothing is sent.
//!
//! ERROR HANDLING
//! ==============
//! `get_scope` never fails: transport errors, error statuses and undecodable
//! bodies are reported to the [`ConnectionStatus`] and yield `None`, so the
//! caller keeps its previous state and simply polls again. A body that is
//! valid JSON but not a snapshot is not a connection problem; it is logged by
//! the model and also yields `None`.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use livemap::model::{Position, Scope};
use reqwest::Url;

use crate::session::Session;
use crate::status::ConnectionStatus;

const REQUEST_TIMEOUT_SECS: u64 = 10;
const CONNECT_TIMEOUT_SECS: u64 = 5;

const SCOPE_PATH: &str = "scope";
const POSITIONS_PATH: &str = "positions";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("no unit id and token configured")]
    NotAuthenticated,
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{path} request returned HTTP {status}")]
    Status { status: u16, path: &'static str },
    #[error("invalid JSON payload: {0}")]
    Decode(#[from] serde_json::Error),
}

pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    credentials: Option<(String, String)>,
    status: ConnectionStatus,
}

impl ApiClient {
    /// Build a client for `api_url`, resolved against `server` if relative.
    pub fn new(api_url: &str, server: &str, session: &Session) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;
        let credentials = match (session.id(), session.token()) {
            (Some(id), Some(token)) => Some((id.to_owned(), token.to_owned())),
            _ => None,
        };
        Ok(Self { http, base: resolve_api_url(api_url, server)?, credentials, status: ConnectionStatus::new() })
    }

    #[must_use]
    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    /// `{api}/{path}/{id}?token={token}` with id and token percent-encoded.
    pub fn build_url(&self, path: &str) -> Result<Url, ApiError> {
        let (id, token) = self.credentials.as_ref().ok_or(ApiError::NotAuthenticated)?;
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .push(path)
            .push(id);
        url.query_pairs_mut().clear().append_pair("token", token);
        Ok(url)
    }

    /// Fetch the current snapshot. `None` on any failure.
    pub async fn get_scope(&self) -> Option<Scope> {
        match self.fetch_scope().await {
            Ok(value) => {
                self.status.clear_connection_error();
                Scope::from_json(value)
            }
            Err(ApiError::NotAuthenticated) => None,
            Err(e) => {
                self.status.set_connection_error("scope request failed", &e);
                None
            }
        }
    }

    async fn fetch_scope(&self) -> Result<serde_json::Value, ApiError> {
        let url = self.build_url(SCOPE_PATH)?;
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { status: status.as_u16(), path: SCOPE_PATH });
        }
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Send the own position and report the outcome.
    pub async fn send_position(&self, position: &Position) -> Result<(), ApiError> {
        let result = self.post_position(position).await;
        match &result {
            Ok(()) => self.status.clear_connection_error(),
            Err(ApiError::NotAuthenticated) => {}
            Err(e) => self.status.set_connection_error("position update failed", e),
        }
        result
    }

    async fn post_position(&self, position: &Position) -> Result<(), ApiError> {
        let url = self.build_url(POSITIONS_PATH)?;
        let response = self.http.post(url).json(position).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { status: status.as_u16(), path: POSITIONS_PATH });
        }
        Ok(())
    }
}

/// Parse `api_url`, joining it onto `server` when it is not absolute.
pub fn resolve_api_url(api_url: &str, server: &str) -> Result<Url, ApiError> {
    if let Ok(url) = Url::parse(api_url) {
        return Ok(url);
    }
    let base = Url::parse(server).map_err(|e| ApiError::InvalidUrl(format!("{server}: {e}")))?;
    base.join(api_url).map_err(|e| ApiError::InvalidUrl(format!("{api_url}: {e}")))
}
