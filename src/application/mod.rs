//! Application layer managing state and board workflows.
//!
//! This module coordinates between the domain layer and presentation layer,
//! owning the board, its persistence and the interaction state.

pub mod state;

pub use state::*;
