//! Garment draft: the pipeline-owned record between capture and commit

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use stylesnap_common::api::{AttributeField, GarmentAttributes, PredictResponse, UpdateMetadataRequest};
use uuid::Uuid;

/// Where the user wants the image to come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureSource {
    Camera,
    Library,
}

/// Handle to a locally captured image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalImageRef {
    /// Location of the image on the device
    pub path: PathBuf,
    /// MIME type sent with the upload
    pub mime_type: String,
    /// Suggested filename sent with the upload
    pub file_name: String,
}

/// Predicted attributes and the user's working copy
///
/// Both halves are created together, so a draft can never hold one without
/// the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    predicted: GarmentAttributes,
    edited: GarmentAttributes,
}

impl Correction {
    fn seeded(predicted: GarmentAttributes) -> Self {
        Self {
            edited: predicted.clone(),
            predicted,
        }
    }

    pub fn predicted(&self) -> &GarmentAttributes {
        &self.predicted
    }

    pub fn edited(&self) -> &GarmentAttributes {
        &self.edited
    }

    /// Fields where the user diverged from the prediction
    pub fn changed_fields(&self) -> Vec<AttributeField> {
        AttributeField::ALL
            .into_iter()
            .filter(|f| self.predicted.get(*f) != self.edited.get(*f))
            .collect()
    }
}

/// In-progress, not-yet-committed garment
#[derive(Debug, Clone)]
pub struct GarmentDraft {
    draft_id: Uuid,
    image: LocalImageRef,
    remote_id: Option<String>,
    correction: Option<Correction>,
}

impl GarmentDraft {
    /// New draft holding only the captured image
    pub fn new(image: LocalImageRef) -> Self {
        Self {
            draft_id: Uuid::new_v4(),
            image,
            remote_id: None,
            correction: None,
        }
    }

    pub fn draft_id(&self) -> Uuid {
        self.draft_id
    }

    pub fn image(&self) -> &LocalImageRef {
        &self.image
    }

    /// Server identifier assigned by `/predict`
    pub fn remote_id(&self) -> Option<&str> {
        self.remote_id.as_deref()
    }

    pub fn correction(&self) -> Option<&Correction> {
        self.correction.as_ref()
    }

    pub fn predicted(&self) -> Option<&GarmentAttributes> {
        self.correction.as_ref().map(Correction::predicted)
    }

    pub fn edited(&self) -> Option<&GarmentAttributes> {
        self.correction.as_ref().map(Correction::edited)
    }

    /// Seed `predicted` and `edited` from an inference response
    ///
    /// Absent attributes become empty strings. `remote_id` is taken from the
    /// response when present.
    pub(crate) fn apply_prediction(&mut self, response: &PredictResponse) {
        self.correction = Some(Correction::seeded(response.attributes()));
        if let Some(id) = response.remote_id() {
            self.remote_id = Some(id.to_string());
        }
    }

    /// Overwrite one field of `edited`
    ///
    /// Returns false when no prediction has been received yet.
    pub(crate) fn edit(&mut self, field: AttributeField, value: impl Into<String>) -> bool {
        match self.correction.as_mut() {
            Some(correction) => {
                correction.edited.set(field, value);
                true
            }
            None => false,
        }
    }

    /// Body for `/update_metadata`, if the draft is complete enough to send
    pub fn update_request(&self) -> Option<UpdateMetadataRequest> {
        let image_id = self.remote_id.clone()?;
        let attributes = self.edited()?.clone();
        Some(UpdateMetadataRequest {
            image_id,
            attributes,
        })
    }
}

/// Local shadow of a record the catalog accepted
///
/// Authoritative for this client until the next full fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedGarment {
    pub id: String,
    pub attributes: GarmentAttributes,
    pub committed_at: DateTime<Utc>,
}
