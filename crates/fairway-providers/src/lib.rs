//! # Fairway Providers
//!
//! Pluggable golf-data sources behind one contract:
//!
//! ```text
//! caller
//!   ↓  CachedProvider            (cache-aside over TieredCacheStore)
//!   ↓  Arc<dyn GolfDataProvider>
//! DatabaseProvider ── GolfRecordStore ── MySQL
//! ExternalApiProvider ── RetryableFetcher ── third-party HTTP API
//! ```
//!
//! [`ProviderFactory`] builds and initializes the concrete provider for a
//! [`ProviderKind`](fairway_config::ProviderKind).

pub mod cached;
pub mod contract;
pub mod dao;
pub mod database;
pub mod external;
pub mod factory;
pub mod pool;

pub use cached::{CachedProvider, LIVE_TTL, LONG_TTL};
pub use contract::{GolfDataProvider, ProviderState};
pub use dao::{GolfRecordStore, MySqlGolfRecordStore, TournamentRecord};
pub use database::DatabaseProvider;
pub use external::ExternalApiProvider;
pub use factory::{ProviderFactory, Recommendation};
pub use pool::*;
