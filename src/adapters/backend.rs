//! Prediction backend REST adapter.
//!
//! One client covers the three read/write boundaries the dashboard uses:
//! value-bet snapshots, match predictions and player search.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::ApiConfig;
use crate::domain::{PlayerSummary, PredictRequest, PredictResponse, ValueBetRecord};
use crate::error::{EdgewatchError, Result, TransportError};
use crate::services::player_search::PlayerSearch;
use crate::sync::fetcher::{parse_snapshot, SnapshotFetcher};

const DEFAULT_API_BASE: &str = "http://localhost:8000";

#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: Option<&str>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = base_url
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
            .to_string();
        url::Url::parse(&base_url)?;

        let mut builder = Client::builder().user_agent("edgewatch/0.1");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| {
            EdgewatchError::Internal(format!("failed to build backend HTTP client: {}", e))
        })?;

        Ok(Self { http, base_url })
    }

    pub fn from_config(cfg: &ApiConfig) -> Result<Self> {
        Self::new(Some(&cfg.base_url), cfg.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `GET /value-bets`: the full current snapshot, validated
    pub async fn fetch_value_bets(
        &self,
    ) -> std::result::Result<Vec<ValueBetRecord>, TransportError> {
        let url = self.endpoint("value-bets");
        debug!("Fetching value bets from: {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: summarize_body(&body, status),
            });
        }

        parse_snapshot(&body)
    }

    /// `POST /predict`. Backend errors carry the server's detail verbatim.
    pub async fn predict(&self, req: &PredictRequest) -> Result<PredictResponse> {
        req.validate()
            .map_err(|errors| EdgewatchError::Validation(errors.join("; ")))?;

        let url = self.endpoint("predict");
        debug!(
            "Predicting {} vs {} on {}",
            req.player_a, req.player_b, req.surface
        );

        let response = self.http.post(&url).json(req).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(EdgewatchError::Api {
                status: status.as_u16(),
                detail: error_detail(&body, status),
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }

    /// `GET /players/search?q=&limit=`, ranked by the backend
    pub async fn search_players(&self, query: &str, limit: u32) -> Result<Vec<PlayerSummary>> {
        let url = self.endpoint("players/search");
        let limit = limit.to_string();

        let response = self
            .http
            .get(&url)
            .query(&[("q", query), ("limit", limit.as_str())])
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(EdgewatchError::Api {
                status: status.as_u16(),
                detail: error_detail(&body, status),
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl SnapshotFetcher for BackendClient {
    async fn fetch(&self) -> std::result::Result<Vec<ValueBetRecord>, TransportError> {
        self.fetch_value_bets().await
    }
}

#[async_trait]
impl PlayerSearch for BackendClient {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<PlayerSummary>> {
        self.search_players(query, limit).await
    }
}

/// Pull the server-provided message out of an error body.
///
/// FastAPI answers `{"detail": "..."}` (or a list of validation errors under
/// `detail`); anything else is returned as raw text.
pub fn error_detail(body: &[u8], status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        match value.get("detail").or_else(|| value.get("error")) {
            Some(Value::String(s)) => return s.clone(),
            Some(other) => return other.to_string(),
            None => {}
        }
    }
    summarize_body(body, status)
}

fn summarize_body(body: &[u8], status: StatusCode) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("empty response")
            .to_string()
    } else {
        text.to_string()
    }
}
