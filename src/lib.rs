//! Station View - live dashboard client for the WAPI weather-station service
//!
//! This library exposes the core modules for testing and reuse.

pub mod api;
pub mod common;
pub mod config;
pub mod error;
pub mod sync;
pub mod view;
