pub mod client;
pub mod models;

pub use client::{StationApiClient, StationSource};
pub use models::{Reading, StationDetail, StationId, StationSnapshot};
