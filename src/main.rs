use std::sync::Arc;

use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use station_view::api::StationApiClient;
use station_view::common::Session;
use station_view::config::Config;
use station_view::view::{field_label, Metric, TextCard, TextRenderer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,station_view=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting station-view...");

    // Load configuration (fail-fast)
    let config = Config::from_env()?;
    tracing::info!(
        base_url = %config.api_base_url,
        poll_interval_ms = config.poll_interval_ms,
        authenticated = config.api_token.is_some(),
        "Configuration loaded"
    );

    let client = Arc::new(StationApiClient::new(&config)?);
    tracing::info!(base_url = %client.base_url(), "Station API client initialized");

    let renderer = Arc::new(TextRenderer::default());
    let detail_station_id = config.detail_station_id;
    let mut session = Session::new(client, renderer.clone(), config);

    // Initial paint (fail-fast), then keep it live
    let tab = session.default_tab();
    session.mount(tab).await?;

    let detail_panel = match detail_station_id {
        Some(station_id) => {
            let panel = TextCard::new(station_id);
            session.open_detail(station_id, Box::new(panel.clone())).await;
            Some(panel)
        }
        None => None,
    };

    shutdown_signal().await;
    session.shutdown();

    for card in renderer.cards() {
        let state = card.snapshot();
        let metrics = Metric::ALL
            .iter()
            .filter_map(|m| state.metrics.get(m).map(|v| format!("{m}={v}")))
            .collect::<Vec<_>>()
            .join(" ");
        tracing::info!(
            title = %state.title,
            status = %state.badge,
            raining = %state.raining,
            %metrics,
            "Last displayed"
        );
    }

    if let Some(panel) = detail_panel {
        for (name, value) in panel.snapshot().extras {
            tracing::info!(station_id = panel.station_id(), field = %field_label(&name), %value, "Detail panel");
        }
    }

    tracing::info!("Dashboard shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        },
    }
}
