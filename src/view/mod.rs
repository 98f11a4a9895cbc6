pub mod card;
pub mod format;
pub mod render;
pub mod status;
pub mod trend;

pub use card::{CardRegistry, CardState, StationCard, TextCard};
pub use format::{
    field_label, format_metric, format_raining, format_station_name, mask_api_key, Metric,
};
pub use render::{paint_card, Renderer, StationTab, TextRenderer};
pub use status::{connection_status, ConnectionStatus};
pub use trend::{trend_for, Trend};
