//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use station_view::api::{Reading, StationDetail, StationId, StationSnapshot, StationSource};
use station_view::error::{AppError, AppResult};

/// Scriptable in-memory Station Data API.
///
/// A `None` list makes the matching fetch fail with HTTP 503.
#[derive(Default)]
pub struct FakeSource {
    pub public: Mutex<Option<Vec<StationSnapshot>>>,
    pub owned: Mutex<Option<Vec<StationSnapshot>>>,
    pub readings: Mutex<HashMap<StationId, Vec<Reading>>>,
    pub details: Mutex<HashMap<StationId, StationDetail>>,
    /// Delay applied to every public fetch.
    pub public_delay: Mutex<Duration>,
    pub public_calls: AtomicUsize,
    pub owned_calls: AtomicUsize,
    pub metrics_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
    pub seen_tokens: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn with_public(stations: Vec<StationSnapshot>) -> Self {
        let source = Self::default();
        source.set_public(Some(stations));
        source
    }

    pub fn set_public(&self, stations: Option<Vec<StationSnapshot>>) {
        *self.public.lock().unwrap() = stations;
    }

    pub fn set_owned(&self, stations: Option<Vec<StationSnapshot>>) {
        *self.owned.lock().unwrap() = stations;
    }

    pub fn set_readings(&self, station_id: StationId, readings: Vec<Reading>) {
        self.readings.lock().unwrap().insert(station_id, readings);
    }

    /// `None` makes the detail fetch fail with HTTP 503.
    pub fn set_detail(&self, station_id: StationId, detail: Option<StationDetail>) {
        let mut details = self.details.lock().unwrap();
        match detail {
            Some(detail) => details.insert(station_id, detail),
            None => details.remove(&station_id),
        };
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    pub fn public_calls(&self) -> usize {
        self.public_calls.load(Ordering::SeqCst)
    }

    pub fn owned_calls(&self) -> usize {
        self.owned_calls.load(Ordering::SeqCst)
    }
}

fn unavailable() -> AppError {
    AppError::Http {
        status: StatusCode::SERVICE_UNAVAILABLE,
        body: "down for maintenance".to_string(),
    }
}

#[async_trait]
impl StationSource for FakeSource {
    async fn public_stations(&self) -> AppResult<Vec<StationSnapshot>> {
        self.public_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.public_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.public.lock().unwrap().clone().ok_or_else(unavailable)
    }

    async fn owned_stations(&self, token: &str) -> AppResult<Vec<StationSnapshot>> {
        self.owned_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_tokens.lock().unwrap().push(token.to_string());
        self.owned.lock().unwrap().clone().ok_or_else(unavailable)
    }

    async fn latest_metrics(&self, station_id: StationId) -> AppResult<Vec<Reading>> {
        self.metrics_calls.fetch_add(1, Ordering::SeqCst);
        self.readings
            .lock()
            .unwrap()
            .get(&station_id)
            .cloned()
            .ok_or_else(unavailable)
    }

    async fn station_detail(
        &self,
        station_id: StationId,
        _token: Option<&str>,
    ) -> AppResult<StationDetail> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.details
            .lock()
            .unwrap()
            .get(&station_id)
            .cloned()
            .ok_or_else(unavailable)
    }
}

pub fn snapshot(station_id: StationId, temperature: f64, humidity: f64) -> StationSnapshot {
    StationSnapshot {
        station_id,
        temperature: Some(temperature),
        humidity: Some(humidity),
        pressure: Some(1013.0),
        wind_speed: Some(3.0),
        is_raining: Some(false),
        last_updated: Some(chrono::Utc::now().to_rfc3339()),
        location: Some(format!("Site {station_id}")),
        owner: Some("alice".to_string()),
        is_public: Some(true),
        api_access_key: Some("abcdefghij1234".to_string()),
    }
}

pub fn detail(station_id: StationId, temperature: f64, wind_direction: &str) -> StationDetail {
    StationDetail {
        snapshot: snapshot(station_id, temperature, 55.0),
        wind_direction: Some(wind_direction.to_string()),
        uv_index: Some(2.0),
    }
}

pub fn reading(temperature: f64, humidity: f64) -> Reading {
    Reading {
        temperature: Some(temperature),
        humidity: Some(humidity),
        pressure: Some(1013.0),
        wind_speed: Some(3.0),
        ..Reading::default()
    }
}

/// Let spawned tasks run to their next await point.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
