//! Data model shared between providers, the cache, and callers.
//!
//! Every type here is an immutable snapshot: providers replace values
//! wholesale on refresh and never patch them field by field.

mod golfer;
mod live_score;
mod provider;
mod tournament;

pub use golfer::*;
pub use live_score::*;
pub use provider::*;
pub use tournament::*;
