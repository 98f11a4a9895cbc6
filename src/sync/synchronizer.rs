use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};

use crate::api::{StationId, StationSnapshot, StationSource};
use crate::error::AppError;
use crate::sync::Ticker;
use crate::view::{
    connection_status, format_raining, trend_for, CardRegistry, Metric, StationCard,
};

/// Outcome of one reconciliation cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Distinct stations returned by the API.
    pub fetched: usize,
    /// Stations whose card was patched.
    pub patched: usize,
    /// Stations returned without a mounted card.
    pub skipped: usize,
    /// Station lists that could not be fetched.
    pub failed_fetches: usize,
}

/// Write the metrics and raining flag of `snapshot` onto `card`.
///
/// Fields missing from the snapshot keep whatever the card showed before.
pub fn patch_metrics(card: &mut dyn StationCard, snapshot: &StationSnapshot) {
    for metric in Metric::ALL {
        if let Some(value) = snapshot.metric(metric) {
            card.set_metric(metric, &metric.format(value));
        }
    }
    if let Some(is_raining) = snapshot.is_raining {
        card.set_raining(format_raining(is_raining));
    }
}

/// Write every field of `snapshot` onto `card`, connection badge included.
pub fn patch_card(card: &mut dyn StationCard, snapshot: &StationSnapshot, now: DateTime<Utc>) {
    patch_metrics(card, snapshot);
    card.set_connection(connection_status(snapshot.last_updated.as_deref(), now));
}

/// Everything a cycle needs; cloned into each scheduled run.
#[derive(Clone)]
struct CycleContext {
    source: Arc<dyn StationSource>,
    cards: Arc<Mutex<CardRegistry>>,
    credential: Option<String>,
    trend_concurrency: usize,
}

impl CycleContext {
    fn cards(&self) -> MutexGuard<'_, CardRegistry> {
        self.cards.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run(&self) -> CycleReport {
        let mut report = CycleReport::default();

        // Later lists win for stations present in both
        let mut snapshots: BTreeMap<StationId, StationSnapshot> = BTreeMap::new();

        match self.source.public_stations().await {
            Ok(list) => snapshots.extend(list.into_iter().map(|s| (s.station_id, s))),
            Err(e) => {
                report.failed_fetches += 1;
                log_fetch_failure("/stations/public", &e);
            }
        }

        if let Some(token) = &self.credential {
            match self.source.owned_stations(token).await {
                Ok(list) => snapshots.extend(list.into_iter().map(|s| (s.station_id, s))),
                Err(e) => {
                    report.failed_fetches += 1;
                    log_fetch_failure("/stations/all", &e);
                }
            }
        }

        report.fetched = snapshots.len();

        let matched: Vec<StationId> = {
            let mut cards = self.cards();
            let now = Utc::now();
            snapshots
                .values()
                .filter_map(|snapshot| match cards.get_mut(snapshot.station_id) {
                    Some(card) => {
                        patch_card(card, snapshot, now);
                        Some(snapshot.station_id)
                    }
                    None => {
                        tracing::trace!(station_id = snapshot.station_id, "No mounted card, skipping");
                        None
                    }
                })
                .collect()
        };

        report.patched = matched.len();
        report.skipped = report.fetched - report.patched;

        self.apply_trends(matched).await;

        tracing::debug!(
            fetched = report.fetched,
            patched = report.patched,
            skipped = report.skipped,
            failed_fetches = report.failed_fetches,
            "Reconciliation cycle completed"
        );
        report
    }

    /// Look up the latest readings of each station and set its trend indicators.
    async fn apply_trends(&self, station_ids: Vec<StationId>) {
        let source = &*self.source;
        let mut lookups = stream::iter(station_ids)
            .map(|station_id| async move { (station_id, source.latest_metrics(station_id).await) })
            .buffer_unordered(self.trend_concurrency.max(1));

        while let Some((station_id, result)) = lookups.next().await {
            let readings = match result {
                Ok(readings) => readings,
                Err(e) => {
                    tracing::debug!(station_id, error = %e, "Trend lookup failed");
                    Vec::new()
                }
            };

            let mut cards = self.cards();
            if let Some(card) = cards.get_mut(station_id) {
                for metric in Metric::ALL {
                    card.set_trend(metric, trend_for(&readings, metric));
                }
            }
        }
    }
}

fn log_fetch_failure(endpoint: &str, error: &AppError) {
    if error.is_remote() {
        tracing::warn!(endpoint, error = %error, "Station fetch failed, keeping displayed data");
    } else {
        tracing::error!(endpoint, error = %error, "Station fetch failed, keeping displayed data");
    }
}

/// Keeps mounted station cards in step with the Station Data API.
///
/// The synchronizer never creates or removes cards; it patches whatever
/// the renderer mounted through [`Synchronizer::mount`].
pub struct Synchronizer {
    context: CycleContext,
    ticker: Ticker,
}

impl Synchronizer {
    #[must_use]
    pub fn new(
        source: Arc<dyn StationSource>,
        credential: Option<String>,
        trend_concurrency: usize,
    ) -> Self {
        Self {
            context: CycleContext {
                source,
                cards: Arc::new(Mutex::new(CardRegistry::new())),
                credential,
                trend_concurrency,
            },
            ticker: Ticker::new("station-sync"),
        }
    }

    /// Hand over the cards of a freshly rendered view, dropping the old ones.
    pub fn mount(&self, registry: CardRegistry) {
        *self.context.cards() = registry;
    }

    /// Drop every mounted card.
    pub fn unmount(&self) {
        *self.context.cards() = CardRegistry::new();
    }

    #[must_use]
    pub fn mounted(&self) -> usize {
        self.context.cards().len()
    }

    /// Applies from the next scheduled or manual cycle on.
    ///
    /// A running schedule keeps the credential it started with until it is
    /// restarted.
    pub fn set_credential(&mut self, credential: Option<String>) {
        self.context.credential = credential;
    }

    /// Schedule a reconciliation cycle every `interval`, replacing any
    /// schedule already running.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start_polling(&mut self, interval: Duration) {
        let context = self.context.clone();
        self.ticker.start(interval, move || {
            let context = context.clone();
            async move {
                context.run().await;
            }
        });
    }

    /// Cancel the schedule, if any. Cycles already running still finish.
    pub fn stop_polling(&mut self) {
        self.ticker.stop();
    }

    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.ticker.is_running()
    }

    /// Run one reconciliation cycle now.
    pub async fn refresh(&self) -> CycleReport {
        self.context.run().await
    }
}
