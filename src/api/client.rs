use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use crate::api::models::{decode_records, Reading, StationDetail, StationId, StationSnapshot};
use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Read side of the Station Data API that the synchronizer depends on.
#[async_trait]
pub trait StationSource: Send + Sync {
    /// Stations everyone can see.
    async fn public_stations(&self) -> AppResult<Vec<StationSnapshot>>;

    /// Stations owned by the holder of `token`.
    async fn owned_stations(&self, token: &str) -> AppResult<Vec<StationSnapshot>>;

    /// The two most recent readings of a station, newest first.
    async fn latest_metrics(&self, station_id: StationId) -> AppResult<Vec<Reading>>;

    /// Full detail record of one station.
    async fn station_detail(
        &self,
        station_id: StationId,
        token: Option<&str>,
    ) -> AppResult<StationDetail>;
}

pub struct StationApiClient {
    http_client: Client,
    base_url: String,
}

impl StationApiClient {
    /// Build a client for the API rooted at `config.api_base_url`.
    ///
    /// No request timeout is set: a hung request only delays its own cycle.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the TLS backend cannot be initialised.
    pub fn new(config: &Config) -> AppResult<Self> {
        let http_client = Client::builder()
            .danger_accept_invalid_certs(config.api_skip_tls_verify)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        let request = self.http_client.get(format!("{}{path}", self.base_url));
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a GET and return the decoded JSON body.
    async fn get_json(&self, path: &str, token: Option<&str>) -> AppResult<Value> {
        let response = self
            .get(path, token)
            .send()
            .await
            .map_err(|e| AppError::StationApi(format!("Request to {path} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Http {
                status,
                body: response.text().await.unwrap_or_default(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::StationApi(format!("Failed to read {path} response: {e}")))?;

        serde_json::from_str(&text).map_err(|e| {
            // Authenticated bodies carry plaintext access keys
            if token.is_some() {
                tracing::error!(error = %e, path, body_len = text.len(), "Failed to parse response");
            } else {
                tracing::error!(
                    error = %e,
                    path,
                    body_preview = %text.chars().take(200).collect::<String>(),
                    "Failed to parse response"
                );
            }
            AppError::Decode(format!("{path}: {e}"))
        })
    }
}

#[async_trait]
impl StationSource for StationApiClient {
    async fn public_stations(&self) -> AppResult<Vec<StationSnapshot>> {
        let body = self.get_json("/stations/public", None).await?;
        decode_records(body, "/stations/public")
    }

    async fn owned_stations(&self, token: &str) -> AppResult<Vec<StationSnapshot>> {
        let body = self.get_json("/stations/all", Some(token)).await?;
        decode_records(body, "/stations/all")
    }

    async fn latest_metrics(&self, station_id: StationId) -> AppResult<Vec<Reading>> {
        let path = format!("/stations/{station_id}/latest_metrics");
        let body = self.get_json(&path, None).await?;
        decode_records(body, &path)
    }

    async fn station_detail(
        &self,
        station_id: StationId,
        token: Option<&str>,
    ) -> AppResult<StationDetail> {
        let path = format!("/stations/{station_id}/details");
        let body = self.get_json(&path, token).await?;
        serde_json::from_value(body).map_err(|e| AppError::Decode(format!("{path}: {e}")))
    }
}
