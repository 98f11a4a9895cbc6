use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::api::StationId;
use crate::view::{ConnectionStatus, Metric, Trend};

/// A mounted station card the synchronizer can patch in place.
///
/// Implementations only change what is displayed; they never decide what
/// to display.
pub trait StationCard: Send {
    fn set_metric(&mut self, metric: Metric, text: &str);

    fn set_raining(&mut self, text: &str);

    fn set_connection(&mut self, status: ConnectionStatus);

    /// `None` clears the indicator.
    fn set_trend(&mut self, metric: Metric, trend: Option<Trend>);

    /// Fields only shown by detail panels (wind direction, UV index).
    fn set_extra(&mut self, _name: &str, _text: &str) {}
}

/// Cards currently on screen, at most one per station.
#[derive(Default)]
pub struct CardRegistry {
    cards: HashMap<StationId, Box<dyn StationCard>>,
}

impl CardRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a card, replacing any card already mounted for the station.
    pub fn insert(&mut self, station_id: StationId, card: Box<dyn StationCard>) {
        if self.cards.insert(station_id, card).is_some() {
            tracing::debug!(station_id, "Replaced mounted card");
        }
    }

    pub fn get_mut(&mut self, station_id: StationId) -> Option<&mut (dyn StationCard + 'static)> {
        self.cards.get_mut(&station_id).map(|card| &mut **card)
    }

    #[must_use]
    pub fn contains(&self, station_id: StationId) -> bool {
        self.cards.contains_key(&station_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// What a [`TextCard`] currently displays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardState {
    pub title: String,
    /// "Public" or "Private"
    pub visibility: String,
    pub metrics: BTreeMap<Metric, String>,
    pub raining: String,
    pub badge: String,
    pub badge_class: String,
    pub trends: BTreeMap<Metric, Trend>,
    /// Masked unless the owner revealed it.
    pub api_key: Option<String>,
    pub extras: BTreeMap<String, String>,
}

/// In-memory card used by the headless dashboard.
///
/// Clones share the same state, like several references to one DOM node.
#[derive(Debug, Clone)]
pub struct TextCard {
    station_id: StationId,
    state: Arc<Mutex<CardState>>,
}

impl TextCard {
    #[must_use]
    pub fn new(station_id: StationId) -> Self {
        Self::with_state(station_id, CardState::default())
    }

    #[must_use]
    pub fn with_state(station_id: StationId, state: CardState) -> Self {
        Self {
            station_id,
            state: Arc::new(Mutex::new(state)),
        }
    }

    #[must_use]
    pub fn station_id(&self) -> StationId {
        self.station_id
    }

    /// Copy of everything currently displayed.
    #[must_use]
    pub fn snapshot(&self) -> CardState {
        self.lock().clone()
    }

    /// Show the full key until the card is re-rendered.
    pub fn reveal_api_key(&self, key: &str) {
        self.lock().api_key = Some(key.to_string());
    }

    fn lock(&self) -> MutexGuard<'_, CardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StationCard for TextCard {
    fn set_metric(&mut self, metric: Metric, text: &str) {
        let mut state = self.lock();
        if state.metrics.get(&metric).map(String::as_str) != Some(text) {
            tracing::debug!(station_id = self.station_id, field = %metric, value = text, "Card updated");
            state.metrics.insert(metric, text.to_string());
        }
    }

    fn set_raining(&mut self, text: &str) {
        let mut state = self.lock();
        if state.raining != text {
            tracing::debug!(station_id = self.station_id, field = "is_raining", value = text, "Card updated");
            state.raining = text.to_string();
        }
    }

    fn set_connection(&mut self, status: ConnectionStatus) {
        let mut state = self.lock();
        if state.badge != status.label() {
            tracing::debug!(station_id = self.station_id, status = status.label(), "Connection badge updated");
        }
        state.badge = status.label().to_string();
        state.badge_class = status.badge_class().to_string();
    }

    fn set_trend(&mut self, metric: Metric, trend: Option<Trend>) {
        let mut state = self.lock();
        match trend {
            Some(trend) => {
                state.trends.insert(metric, trend);
            }
            None => {
                state.trends.remove(&metric);
            }
        }
    }

    fn set_extra(&mut self, name: &str, text: &str) {
        self.lock().extras.insert(name.to_string(), text.to_string());
    }
}
