//! Presentation layer handling terminal UI and user input.
//!
//! This module lays out and renders the board using ratatui, handles
//! keyboard and mouse input, and runs card drag-and-drop.

pub mod drag;
pub mod input;
pub mod layout;
pub mod ui;

pub use drag::*;
pub use input::*;
pub use layout::*;
pub use ui::*;
