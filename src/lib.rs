//! Trellol - Terminal Kanban Board Library
//!
//! A single-board kanban tracker for the terminal with mouse drag-and-drop,
//! built in Rust.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
