//! Service modules: collaborators the workflows depend on

pub mod catalog_client;
pub mod image_source;
pub mod recommendations;

pub use catalog_client::{CatalogApi, HttpCatalogClient};
pub use image_source::{describe_image, FileImageSource, ImageSource, PermissionStatus};
pub use recommendations::{recommend, Occasion, DEFAULT_RECOMMENDATION_COUNT};
