pub mod synchronizer;
pub mod ticker;

pub use synchronizer::{patch_card, patch_metrics, CycleReport, Synchronizer};
pub use ticker::Ticker;
