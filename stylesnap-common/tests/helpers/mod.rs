//! Test Helper Utilities
//!
//! Shared utilities for testing stylesnap-common

pub mod log_capture;

pub use log_capture::LogCapture;
