//! API module for the catalog service HTTP contract
//!
//! # Design Principle
//!
//! This module contains ONLY:
//! - Shared request/response types
//! - Pure conversion helpers
//!
//! The HTTP transport lives in `stylesnap-client`.

pub mod types;

pub use types::{
    AttributeField, CatalogItem, DeleteImageRequest, GarmentAttributes, PredictResponse,
    RecommendRequest, UpdateMetadataRequest,
};

/// Endpoint paths relative to the service base URL
pub mod paths {
    pub const PREDICT: &str = "/predict";
    pub const UPDATE_METADATA: &str = "/update_metadata";
    pub const GET_ALL: &str = "/get_all";
    pub const DELETE_IMAGE: &str = "/delete_image";
    pub const RECOMMEND: &str = "/recommend";
}
