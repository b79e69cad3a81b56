//! # Fairway Sync
//!
//! Process wiring for the golf-data layer: builds the tiered cache and the
//! configured provider, keeps the cache warm on a schedule and sweeps the
//! local tier until shutdown.

pub mod app;
pub mod refresh;
pub mod startup;

pub use app::App;
pub use refresh::{RefreshReport, Refresher};
