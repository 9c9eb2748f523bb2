//! Catalog service request/response types
//!
//! Field names follow the service's JSON exactly (camelCase attributes,
//! `image_id` keys, `_id` catalog identifiers).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

// ========================================
// Garment Attributes
// ========================================

/// The five free-text attributes the classifier predicts and the user corrects
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GarmentAttributes {
    pub sub_category: String,
    pub article_type: String,
    pub base_colour: String,
    pub season: String,
    pub usage: String,
}

impl GarmentAttributes {
    /// Read one field
    pub fn get(&self, field: AttributeField) -> &str {
        match field {
            AttributeField::SubCategory => &self.sub_category,
            AttributeField::ArticleType => &self.article_type,
            AttributeField::BaseColour => &self.base_colour,
            AttributeField::Season => &self.season,
            AttributeField::Usage => &self.usage,
        }
    }

    /// Overwrite exactly one field, leaving the others untouched
    pub fn set(&mut self, field: AttributeField, value: impl Into<String>) {
        let slot = match field {
            AttributeField::SubCategory => &mut self.sub_category,
            AttributeField::ArticleType => &mut self.article_type,
            AttributeField::BaseColour => &mut self.base_colour,
            AttributeField::Season => &mut self.season,
            AttributeField::Usage => &mut self.usage,
        };
        *slot = value.into();
    }
}

/// Names one attribute of [`GarmentAttributes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeField {
    SubCategory,
    ArticleType,
    BaseColour,
    Season,
    Usage,
}

impl AttributeField {
    pub const ALL: [AttributeField; 5] = [
        AttributeField::SubCategory,
        AttributeField::ArticleType,
        AttributeField::BaseColour,
        AttributeField::Season,
        AttributeField::Usage,
    ];

    /// Wire name of the field
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeField::SubCategory => "subCategory",
            AttributeField::ArticleType => "articleType",
            AttributeField::BaseColour => "baseColour",
            AttributeField::Season => "season",
            AttributeField::Usage => "usage",
        }
    }
}

impl fmt::Display for AttributeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributeField {
    type Err = String;

    /// Accepts the wire name or snake_case, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "subcategory" | "category" => Ok(AttributeField::SubCategory),
            "articletype" | "article" | "type" => Ok(AttributeField::ArticleType),
            "basecolour" | "basecolor" | "colour" | "color" => Ok(AttributeField::BaseColour),
            "season" => Ok(AttributeField::Season),
            "usage" => Ok(AttributeField::Usage),
            _ => Err(format!("Unknown garment attribute: {}", s)),
        }
    }
}

// ========================================
// /predict
// ========================================

/// Response body of `POST /predict`
///
/// Every field is optional on the wire. Missing attributes become empty
/// strings in [`PredictResponse::attributes`]; numbers are kept as text and
/// any other non-string value counts as missing.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictResponse {
    #[serde(
        rename = "image_id",
        default,
        deserialize_with = "deserialize_lenient_id"
    )]
    pub image_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub sub_category: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub article_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub base_colour: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub season: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub usage: Option<String>,
}

impl PredictResponse {
    /// Attribute set with absent fields defaulted to `""`
    pub fn attributes(&self) -> GarmentAttributes {
        GarmentAttributes {
            sub_category: self.sub_category.clone().unwrap_or_default(),
            article_type: self.article_type.clone().unwrap_or_default(),
            base_colour: self.base_colour.clone().unwrap_or_default(),
            season: self.season.clone().unwrap_or_default(),
            usage: self.usage.clone().unwrap_or_default(),
        }
    }

    /// Server identifier for the uploaded image, if one was assigned
    pub fn remote_id(&self) -> Option<&str> {
        self.image_id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

/// Accepts identifiers sent as JSON strings or numbers
fn deserialize_lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_lenient_text(deserializer)
}

/// Accepts attribute values that are not plain strings
///
/// Numbers keep their textual form; null, booleans, arrays and objects
/// read as absent.
fn deserialize_lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

// ========================================
// /update_metadata
// ========================================

/// Request body of `PUT /update_metadata`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateMetadataRequest {
    pub image_id: String,
    #[serde(flatten)]
    pub attributes: GarmentAttributes,
}

// ========================================
// /get_all
// ========================================

/// One element of the `GET /get_all` array
///
/// The catalog identifier is `_id` in the documented contract and `id` in
/// some server builds, so both are accepted.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    #[serde(rename = "_id", alias = "id", deserialize_with = "deserialize_required_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub sub_category: Option<String>,
    /// Article type (the catalog stores it as `article`)
    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub article: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub base_colour: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub season: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub usage: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub gender: Option<String>,
    /// Base64-encoded image bytes
    #[serde(default)]
    pub image: Option<String>,
}

impl CatalogItem {
    /// Attribute set with missing values defaulted to `""`
    pub fn attributes(&self) -> GarmentAttributes {
        GarmentAttributes {
            sub_category: self.sub_category.clone().unwrap_or_default(),
            article_type: self.article.clone().unwrap_or_default(),
            base_colour: self.base_colour.clone().unwrap_or_default(),
            season: self.season.clone().unwrap_or_default(),
            usage: self.usage.clone().unwrap_or_default(),
        }
    }
}

fn deserialize_required_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match deserialize_lenient_id(deserializer)? {
        Some(id) => Ok(id),
        None => Err(serde::de::Error::custom("catalog item identifier must be a string or number")),
    }
}

// ========================================
// /delete_image, /recommend
// ========================================

/// Request body of `DELETE /delete_image`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteImageRequest {
    pub image_id: String,
}

/// Request body of `POST /recommend`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub occasion: String,
    pub n: u32,
}
