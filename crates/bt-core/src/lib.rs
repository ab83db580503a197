//! # bt-core
//!
//! Core types, traits, and utilities for BuildTrack.
//!
//! This crate provides the foundational building blocks used across all other crates:
//! - The domain error taxonomy (`TrackerError`) and field-level `ValidationErrors`
//! - Result type aliases
//! - Core traits (Identifiable, ProjectScoped)
//! - Configuration types

pub mod error;
pub mod result;
pub mod traits;
pub mod config;

pub use error::*;
pub use result::*;
pub use traits::*;
