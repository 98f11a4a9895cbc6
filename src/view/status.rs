use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

/// A station counts as connected if it reported within this window.
pub const CONNECTED_WITHIN_MINUTES: i64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    /// No usable `last_updated` timestamp.
    NeverConnected,
}

impl ConnectionStatus {
    #[must_use]
    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
            Self::NeverConnected => "Never Connected",
        }
    }

    #[must_use]
    pub fn badge_class(self) -> &'static str {
        match self {
            Self::Connected => "badge-connected",
            Self::Disconnected | Self::NeverConnected => "badge-disconnected",
        }
    }
}

/// Derive a station's connection status from its `last_updated` field.
///
/// Timestamps in the future count as connected.
#[must_use]
pub fn connection_status(last_updated: Option<&str>, now: DateTime<Utc>) -> ConnectionStatus {
    let Some(last_update) = last_updated.and_then(parse_timestamp) else {
        return ConnectionStatus::NeverConnected;
    };

    if now - last_update <= TimeDelta::minutes(CONNECTED_WITHIN_MINUTES) {
        ConnectionStatus::Connected
    } else {
        ConnectionStatus::Disconnected
    }
}

/// Parse an RFC 3339 timestamp, or a naive ISO-8601 one taken as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    // The API stores UTC without an offset
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
