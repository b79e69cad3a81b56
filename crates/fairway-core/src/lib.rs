//! # Fairway Core
//!
//! Core types, traits, and error definitions for the Fairway golf-data
//! acquisition layer. Every other crate in the workspace builds on the data
//! model and error taxonomy defined here.

pub mod clock;
pub mod error;
pub mod models;
pub mod result;
pub mod telemetry;

pub use clock::*;
pub use error::*;
pub use models::*;
pub use result::*;
