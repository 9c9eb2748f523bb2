//! Catalog records as observed by the client

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use stylesnap_common::api::{CatalogItem, GarmentAttributes};

/// Server-owned garment, decoded from `/get_all`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarmentRecord {
    /// Catalog identifier; also the key sent to `/delete_image`
    pub id: String,
    pub attributes: GarmentAttributes,
    pub gender: Option<String>,
    /// Raw image bytes
    #[serde(skip)]
    pub image_data: Vec<u8>,
}

impl GarmentRecord {
    /// Decode a wire item, including its base64 image payload
    pub fn from_catalog_item(item: CatalogItem) -> Result<Self, String> {
        let image_data = match item.image.as_deref() {
            Some(encoded) if !encoded.is_empty() => general_purpose::STANDARD
                .decode(encoded)
                .map_err(|e| format!("Invalid base64 image for item {}: {}", item.id, e))?,
            _ => Vec::new(),
        };

        Ok(Self {
            attributes: item.attributes(),
            gender: item.gender,
            id: item.id,
            image_data,
        })
    }

    /// One-line summary for listings
    pub fn summary(&self) -> String {
        format!(
            "{} | {} / {} | colour: {} | season: {} | usage: {}",
            self.id,
            self.attributes.sub_category,
            self.attributes.article_type,
            self.attributes.base_colour,
            self.attributes.season,
            self.attributes.usage
        )
    }
}
