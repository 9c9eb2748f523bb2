//! Test Helper Utilities
//!
//! Shared utilities for testing stylesnap-client against a live HTTP server

pub mod fake_catalog;

pub use fake_catalog::{FakeCatalog, RecordedRequest};

use std::path::PathBuf;
use tempfile::TempDir;

const JPEG_HEADER: &[u8] = b"\xFF\xD8\xFF\xE0\x00\x10JFIF\x00\x01\x01\x00";

/// Write a small JPEG-looking file and return its path
pub fn write_test_jpeg(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, JPEG_HEADER).unwrap();
    path
}
