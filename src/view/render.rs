use std::fmt;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;

use crate::api::StationSnapshot;
use crate::sync::patch_card;
use crate::view::{format_station_name, mask_api_key, CardRegistry, CardState, TextCard};

/// Which station list a dashboard shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StationTab {
    /// Stations owned by the signed-in user.
    Owned,
    #[default]
    Public,
}

impl fmt::Display for StationTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Owned => "owned",
            Self::Public => "public",
        })
    }
}

/// Creates the cards of a freshly mounted view.
pub trait Renderer: Send + Sync {
    fn render(&self, tab: StationTab, stations: &[StationSnapshot]) -> CardRegistry;
}

/// Renders [`TextCard`]s and keeps handles to the last mounted grid.
#[derive(Debug, Default)]
pub struct TextRenderer {
    mounted: Mutex<Vec<TextCard>>,
}

impl TextRenderer {
    /// Handles to the cards of the last rendered grid.
    #[must_use]
    pub fn cards(&self) -> Vec<TextCard> {
        self.mounted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// First-paint card for one station.
///
/// Metrics, raining flag and badge go through [`patch_card`] so that first
/// paint and later patches format identically.
#[must_use]
pub fn paint_card(tab: StationTab, station: &StationSnapshot) -> TextCard {
    let visibility = match tab {
        StationTab::Public => "Public",
        StationTab::Owned if station.is_public == Some(true) => "Public",
        StationTab::Owned => "Private",
    };

    let mut card = TextCard::with_state(
        station.station_id,
        CardState {
            title: format_station_name(
                station.owner.as_deref(),
                station.location.as_deref(),
                station.station_id,
            ),
            visibility: visibility.to_string(),
            api_key: match tab {
                StationTab::Owned => station.api_access_key.as_deref().map(mask_api_key),
                StationTab::Public => None,
            },
            ..CardState::default()
        },
    );
    patch_card(&mut card, station, Utc::now());
    card
}

impl Renderer for TextRenderer {
    fn render(&self, tab: StationTab, stations: &[StationSnapshot]) -> CardRegistry {
        let cards: Vec<TextCard> = stations.iter().map(|s| paint_card(tab, s)).collect();

        let mut registry = CardRegistry::new();
        for card in &cards {
            registry.insert(card.station_id(), Box::new(card.clone()));
        }

        tracing::debug!(%tab, count = registry.len(), "Rendered station grid");
        *self.mounted.lock().unwrap_or_else(PoisonError::into_inner) = cards;
        registry
    }
}
