//! StyleSnap client core
//!
//! Turns a photo into a catalogued garment and keeps a local view of the
//! user's wardrobe in step with the catalog service.

pub mod error;
pub mod models;
pub mod services;
pub mod workflow;

pub use error::{CatalogApiError, Capability, PipelineError, RecommendError, SyncError};
pub use models::{CaptureSource, CommittedGarment, GarmentDraft, GarmentRecord, LocalImageRef};
pub use services::{CatalogApi, HttpCatalogClient, ImageSource, Occasion};
pub use workflow::{CapturePipeline, WardrobeSynchronizer};
