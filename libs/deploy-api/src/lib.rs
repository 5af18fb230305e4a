//! Deploy API Models
//!
//! Wire types for the Stevedore deployment helper protocol.

pub mod models;

pub use models::*;
