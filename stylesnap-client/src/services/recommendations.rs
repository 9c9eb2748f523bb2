//! Outfit recommendation lookup
//!
//! Sits beside the core: it reads nothing from the wardrobe view and keeps no
//! state. The service answers with opaque JSON.

use crate::error::RecommendError;
use crate::services::CatalogApi;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use stylesnap_common::api::RecommendRequest;

/// Suggestions requested when the caller does not say
pub const DEFAULT_RECOMMENDATION_COUNT: u32 = 2;

/// Occasions the service recommends outfits for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occasion {
    Casual,
    SemiFormal,
    Formal,
    Athletic,
}

impl Occasion {
    pub const ALL: [Occasion; 4] = [
        Occasion::Casual,
        Occasion::SemiFormal,
        Occasion::Formal,
        Occasion::Athletic,
    ];

    /// Label sent to the service
    pub fn as_str(&self) -> &'static str {
        match self {
            Occasion::Casual => "Casual",
            Occasion::SemiFormal => "Semi-Formal",
            Occasion::Formal => "Formal",
            Occasion::Athletic => "Athletic",
        }
    }
}

impl fmt::Display for Occasion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Occasion {
    type Err = RecommendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "casual" => Ok(Occasion::Casual),
            "semiformal" => Ok(Occasion::SemiFormal),
            "formal" => Ok(Occasion::Formal),
            "athletic" => Ok(Occasion::Athletic),
            "" => Err(RecommendError::InvalidInput(
                "Please select an occasion".to_string(),
            )),
            _ => Err(RecommendError::InvalidInput(format!(
                "Unknown occasion '{}'; expected one of Casual, Semi-Formal, Formal, Athletic",
                s
            ))),
        }
    }
}

/// Ask the service for `n` outfit suggestions for `occasion`
pub async fn recommend<A: CatalogApi + ?Sized>(
    api: &A,
    occasion: Occasion,
    n: u32,
) -> Result<Value, RecommendError> {
    if n == 0 {
        return Err(RecommendError::InvalidInput(
            "At least one recommendation must be requested".to_string(),
        ));
    }

    let request = RecommendRequest {
        occasion: occasion.as_str().to_string(),
        n,
    };

    match api.recommend(&request).await {
        Ok(value) => {
            tracing::info!(occasion = %occasion, n, "Recommendations received");
            Ok(value)
        }
        Err(e) => {
            tracing::warn!(occasion = %occasion, error = %e, "Recommendation request failed");
            Err(e.into())
        }
    }
}
