//! Shared test utilities for the medicane closed-ring workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic wind-field scans (vortex around a storm centre)
//! - Missing-data borders like those of real swaths
//! - Event table fixtures
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
