use crate::api::Reading;
use crate::view::Metric;

/// Direction of a metric between its two most recent readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Rising,
    Falling,
    Flat,
}

impl Trend {
    #[must_use]
    pub fn between(latest: f64, previous: f64) -> Self {
        if latest > previous {
            Self::Rising
        } else if latest < previous {
            Self::Falling
        } else {
            Self::Flat
        }
    }

    #[must_use]
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Rising => "▲",
            Self::Falling => "▼",
            Self::Flat => "▬",
        }
    }

    /// Emphasis colour of the indicator.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Rising => "#e74c3c",
            Self::Falling => "#3498db",
            Self::Flat => "#95a5a6",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Rising => "rising",
            Self::Falling => "falling",
            Self::Flat => "flat",
        }
    }
}

/// Trend of `metric` over newest-first `readings`.
///
/// `None` (neutral) unless the two latest readings both carry the metric.
#[must_use]
pub fn trend_for(readings: &[Reading], metric: Metric) -> Option<Trend> {
    let [latest, previous, ..] = readings else {
        return None;
    };
    Some(Trend::between(latest.metric(metric)?, previous.metric(metric)?))
}
