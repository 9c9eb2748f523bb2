//! # StyleSnap Common Library
//!
//! Shared code for the StyleSnap client crates:
//! - Error and result types
//! - Configuration loading (TOML, environment, compiled defaults)
//! - Wire types for the catalog HTTP API
//! - Event types (WardrobeEvent enum) and the EventBus

pub mod api;
pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
