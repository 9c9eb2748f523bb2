//! Workflows: the capture pipeline and the wardrobe synchronizer

pub mod capture_pipeline;
pub mod wardrobe_sync;

#[cfg(test)]
mod test_support;

pub use capture_pipeline::CapturePipeline;
pub use wardrobe_sync::WardrobeSynchronizer;
