//! Infrastructure layer providing external service integrations.
//!
//! This module contains the key-value stores the board snapshot is kept in,
//! the persistence gateway on top of them, and data directory resolution.

pub mod config;
pub mod persistence;
pub mod store;

pub use config::*;
pub use persistence::*;
pub use store::*;
