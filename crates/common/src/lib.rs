//! Shared types and utilities for cloud-store.
//!
//! This crate provides functionality used by both the orchestration core and
//! the SDK backend:
//! - Generic progress callback trait
//! - Shared constants

pub mod constants;
pub mod progress;

// Re-export commonly used items at crate root
pub use constants::*;
pub use progress::{progress_fn, FnProgress, NoOpProgress, ProgressCallback};
