//! Result type aliases for Fairway.

use crate::FairwayError;

/// A specialized `Result` type for Fairway operations.
pub type FairwayResult<T> = Result<T, FairwayError>;
