use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;

use crate::api::{StationId, StationSource};
use crate::config::Config;
use crate::error::AppResult;
use crate::sync::{patch_metrics, Synchronizer, Ticker};
use crate::view::{connection_status, format_metric, Renderer, StationCard, StationTab};

/// View state of one dashboard: who is signed in, which tab is shown, and
/// the tasks keeping it live.
///
/// Mounting a tab, switching tabs and logging out all go through here, so
/// polling always matches the cards on screen.
pub struct Session {
    source: Arc<dyn StationSource>,
    renderer: Arc<dyn Renderer>,
    config: Arc<Config>,
    credential: Option<String>,
    tab: StationTab,
    synchronizer: Synchronizer,
    detail: Ticker,
}

impl Session {
    #[must_use]
    pub fn new(
        source: Arc<dyn StationSource>,
        renderer: Arc<dyn Renderer>,
        config: Config,
    ) -> Self {
        let credential = config.api_token.clone();
        let synchronizer = Synchronizer::new(
            Arc::clone(&source),
            credential.clone(),
            config.trend_concurrency,
        );

        Self {
            source,
            renderer,
            config: Arc::new(config),
            credential,
            tab: StationTab::Public,
            synchronizer,
            detail: Ticker::new("station-detail"),
        }
    }

    #[must_use]
    pub fn tab(&self) -> StationTab {
        self.tab
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    /// Owned stations when signed in, public ones otherwise.
    #[must_use]
    pub fn default_tab(&self) -> StationTab {
        if self.is_authenticated() {
            StationTab::Owned
        } else {
            StationTab::Public
        }
    }

    #[must_use]
    pub fn synchronizer(&self) -> &Synchronizer {
        &self.synchronizer
    }

    /// Render `tab` from scratch and keep it live.
    ///
    /// The owned tab falls back to the public one without a credential.
    /// Returns the number of mounted cards.
    ///
    /// # Errors
    ///
    /// Returns the fetch error if the tab's station list cannot be loaded;
    /// polling stays stopped and no cards are mounted.
    pub async fn mount(&mut self, tab: StationTab) -> AppResult<usize> {
        self.synchronizer.stop_polling();
        self.synchronizer.unmount();

        let (tab, stations) = match (tab, self.credential.as_deref()) {
            (StationTab::Owned, Some(token)) => {
                (StationTab::Owned, self.source.owned_stations(token).await)
            }
            (StationTab::Owned, None) => {
                tracing::warn!("No credential, showing public stations instead");
                (StationTab::Public, self.source.public_stations().await)
            }
            (StationTab::Public, _) => (StationTab::Public, self.source.public_stations().await),
        };

        self.tab = tab;
        let stations = stations.inspect_err(|e| {
            tracing::error!(%tab, error = %e, "Failed to load stations");
        })?;

        let registry = self.renderer.render(tab, &stations);
        let count = registry.len();
        self.synchronizer.mount(registry);
        self.synchronizer.start_polling(self.config.poll_interval());

        tracing::info!(%tab, stations = count, "Mounted station view");
        Ok(count)
    }

    /// Replace the visible tab; the previous tab's cards are dropped.
    ///
    /// # Errors
    ///
    /// See [`Session::mount`].
    pub async fn switch_tab(&mut self, tab: StationTab) -> AppResult<usize> {
        self.mount(tab).await
    }

    /// Forget the credential and go back to the public view.
    ///
    /// # Errors
    ///
    /// See [`Session::mount`].
    pub async fn logout(&mut self) -> AppResult<usize> {
        self.close_detail();
        self.synchronizer.stop_polling();
        self.credential = None;
        self.synchronizer.set_credential(None);
        tracing::info!("Logged out");
        self.mount(StationTab::Public).await
    }

    /// Sign in with `token` and show the owned tab.
    ///
    /// # Errors
    ///
    /// See [`Session::mount`].
    pub async fn set_credential(&mut self, token: String) -> AppResult<usize> {
        self.close_detail();
        self.synchronizer.stop_polling();
        self.credential = Some(token.clone());
        self.synchronizer.set_credential(Some(token));
        tracing::info!("Credential set");
        self.mount(StationTab::Owned).await
    }

    /// Pause background polling; the mounted cards stay on screen.
    pub fn stop_polling(&mut self) {
        self.synchronizer.stop_polling();
    }

    /// Resume polling the mounted cards at the configured rate.
    pub fn start_polling(&mut self) {
        self.synchronizer.start_polling(self.config.poll_interval());
    }

    /// Show one station's detail panel and refresh it periodically.
    ///
    /// The panel is painted once immediately. Returns whether that first
    /// fetch succeeded; the refresh schedule starts either way.
    pub async fn open_detail(&mut self, station_id: StationId, panel: Box<dyn StationCard>) -> bool {
        let panel = Arc::new(Mutex::new(panel));
        let source = Arc::clone(&self.source);
        let token = self.credential.clone();

        let painted = refresh_detail(&*source, station_id, token.as_deref(), &panel).await;

        self.detail.start(self.config.detail_refresh_interval(), move || {
            let source = Arc::clone(&source);
            let panel = Arc::clone(&panel);
            let token = token.clone();
            async move {
                refresh_detail(&*source, station_id, token.as_deref(), &panel).await;
            }
        });

        painted
    }

    pub fn close_detail(&mut self) {
        self.detail.stop();
    }

    #[must_use]
    pub fn is_detail_open(&self) -> bool {
        self.detail.is_running()
    }

    /// Stop every background task and drop the mounted cards.
    pub fn shutdown(&mut self) {
        self.close_detail();
        self.synchronizer.stop_polling();
        self.synchronizer.unmount();
    }
}

/// Fetch one station's details and patch its panel. A failed fetch leaves
/// the panel as it was.
async fn refresh_detail(
    source: &dyn StationSource,
    station_id: StationId,
    token: Option<&str>,
    panel: &Mutex<Box<dyn StationCard>>,
) -> bool {
    let detail = match source.station_detail(station_id, token).await {
        Ok(detail) => detail,
        Err(e) => {
            tracing::warn!(station_id, error = %e, "Station detail refresh failed");
            return false;
        }
    };

    let mut panel = panel.lock().unwrap_or_else(PoisonError::into_inner);
    patch_metrics(&mut **panel, &detail.snapshot);
    if let Some(last_updated) = detail.snapshot.last_updated.as_deref() {
        panel.set_connection(connection_status(Some(last_updated), Utc::now()));
    }
    if let Some(location) = detail.snapshot.location.as_deref() {
        panel.set_extra("location", location);
    }
    if let Some(direction) = detail.wind_direction.as_deref() {
        panel.set_extra("wind_direction", direction);
    }
    if let Some(uv_index) = detail.uv_index {
        panel.set_extra("uv_index", &format_metric("uv_index", uv_index));
    }
    true
}
