//! Data models for stylesnap-client
//!
//! - Garment drafts owned by the capture pipeline
//! - Catalog records mirrored by the wardrobe synchronizer

pub mod draft;
pub mod record;

pub use draft::{CaptureSource, CommittedGarment, Correction, GarmentDraft, LocalImageRef};
pub use record::GarmentRecord;
