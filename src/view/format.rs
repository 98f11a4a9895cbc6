//! Display formatting shared by first paint and live patches.
//!
//! Every string a card shows goes through these functions, so a freshly
//! rendered card and one patched by the synchronizer are indistinguishable.

use std::fmt;

/// Shown between the visible head and tail of a masked API key.
pub const MASK_SEPARATOR: &str = "••••";

/// Shown instead of keys too short to mask without leaking their shape.
pub const MASK_PLACEHOLDER: &str = "••••••••••";

const MASK_HEAD: usize = 6;
const MASK_TAIL: usize = 4;

/// Numeric station metrics displayed on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    Temperature,
    Humidity,
    Pressure,
    WindSpeed,
}

impl Metric {
    pub const ALL: [Self; 4] = [
        Self::Temperature,
        Self::Humidity,
        Self::Pressure,
        Self::WindSpeed,
    ];

    /// Field name used by the API.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Pressure => "pressure",
            Self::WindSpeed => "wind_speed",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    #[must_use]
    pub fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Humidity => "%",
            Self::Pressure => " hPa",
            Self::WindSpeed => " m/s",
        }
    }

    #[must_use]
    pub fn decimals(self) -> usize {
        match self {
            Self::Temperature | Self::WindSpeed => 1,
            Self::Humidity | Self::Pressure => 0,
        }
    }

    #[must_use]
    pub fn format(self, value: f64) -> String {
        format!("{value:.prec$}{unit}", prec = self.decimals(), unit = self.unit())
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Format a raw value for display under the given API field name.
///
/// Unknown names are rendered without a unit.
#[must_use]
pub fn format_metric(name: &str, value: f64) -> String {
    match Metric::from_name(name) {
        Some(metric) => metric.format(value),
        None => value.to_string(),
    }
}

/// Mask an owner's API key, keeping the first 6 and last 4 characters.
///
/// Keys under 10 characters become [`MASK_PLACEHOLDER`], which says nothing
/// about the key's length or content.
#[must_use]
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() < MASK_HEAD + MASK_TAIL {
        return MASK_PLACEHOLDER.to_string();
    }

    let head: String = chars[..MASK_HEAD].iter().collect();
    let tail: String = chars[chars.len() - MASK_TAIL..].iter().collect();
    format!("{head}{MASK_SEPARATOR}{tail}")
}

/// Card title: `"Owner - Location (id)"`.
#[must_use]
pub fn format_station_name(owner: Option<&str>, location: Option<&str>, station_id: i64) -> String {
    let owner = owner.filter(|o| !o.is_empty()).unwrap_or("Unknown");
    format!("{owner} - {} ({station_id})", location.unwrap_or_default())
}

#[must_use]
pub fn format_raining(is_raining: bool) -> &'static str {
    if is_raining { "Yes" } else { "No" }
}

/// Human label for an API field, unit included.
#[must_use]
pub fn field_label(name: &str) -> String {
    match name {
        "temperature" => "Temperature (°C)".to_string(),
        "humidity" => "Humidity (%)".to_string(),
        "pressure" => "Pressure (hPa)".to_string(),
        "wind_speed" => "Wind Speed (m/s)".to_string(),
        "uv_index" => "UV Index".to_string(),
        "wind_direction" => "Wind Direction".to_string(),
        other => other.to_string(),
    }
}
