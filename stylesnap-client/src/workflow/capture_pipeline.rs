//! Capture-to-catalog pipeline
//!
//! Drives one garment at a time through
//! `Idle → Capturing → Uploading → AwaitingCorrection → Committing →
//! {Committed | Failed}`.
//!
//! Every operation takes `&mut self`, so a second capture, upload or commit
//! cannot start while one is in flight. Each transition is returned to the
//! caller and published on the [`EventBus`].
//!
//! Dropping an operation's future abandons the request without telling the
//! server; the phase stays where the dropped call left it and `cancel`
//! returns the pipeline to `Idle`.

use crate::error::{Capability, PipelineError, PipelineResult};
use crate::models::{CaptureSource, CommittedGarment, GarmentDraft};
use crate::services::{CatalogApi, ImageSource};
use chrono::Utc;
use stylesnap_common::api::{AttributeField, GarmentAttributes};
use stylesnap_common::events::{DiscardReason, DraftPhase, EventBus, FailureKind, WardrobeEvent};
use tracing::{info, warn};

/// Capture-to-catalog state machine
pub struct CapturePipeline<A, S> {
    api: A,
    image_source: S,
    event_bus: EventBus,
    phase: DraftPhase,
    draft: Option<GarmentDraft>,
    camera_granted: bool,
    library_granted: bool,
    last_committed: Option<CommittedGarment>,
}

impl<A: CatalogApi, S: ImageSource> CapturePipeline<A, S> {
    pub fn new(api: A, image_source: S, event_bus: EventBus) -> Self {
        Self {
            api,
            image_source,
            event_bus,
            phase: DraftPhase::Idle,
            draft: None,
            camera_granted: false,
            library_granted: false,
            last_committed: None,
        }
    }

    pub fn phase(&self) -> DraftPhase {
        self.phase
    }

    /// Current draft, if one is alive
    pub fn draft(&self) -> Option<&GarmentDraft> {
        self.draft.as_ref()
    }

    /// Local shadow of the most recent successful commit
    pub fn last_committed(&self) -> Option<&CommittedGarment> {
        self.last_committed.as_ref()
    }

    /// Obtain an image and submit it for inference
    ///
    /// Only permitted from `Idle`. Permission denial leaves the pipeline in
    /// `Idle`; so does the user backing out of the camera or picker.
    pub async fn acquire_image(&mut self, source: CaptureSource) -> PipelineResult<&GarmentDraft> {
        self.require("acquire_image", |p| p == DraftPhase::Idle)?;
        self.ensure_permissions().await?;

        self.transition_to(DraftPhase::Capturing);

        let image = match source {
            CaptureSource::Camera => self.image_source.capture().await,
            CaptureSource::Library => self.image_source.pick_from_library().await,
        };

        let Some(image) = image else {
            info!(source = ?source, "Capture cancelled by user");
            self.transition_to(DraftPhase::Idle);
            return Err(PipelineError::CaptureCancelled);
        };

        let draft = GarmentDraft::new(image);
        info!(
            draft_id = %draft.draft_id(),
            file = %draft.image().file_name,
            mime = %draft.image().mime_type,
            "Draft created"
        );
        self.draft = Some(draft);

        self.submit_for_inference().await
    }

    /// Upload the captured image and seed the draft with the prediction
    ///
    /// On failure the draft is discarded and the pipeline ends in
    /// `Failed(InferenceFailed)`; nothing is retried.
    pub async fn submit_for_inference(&mut self) -> PipelineResult<&GarmentDraft> {
        self.require("submit_for_inference", |p| p == DraftPhase::Capturing)?;
        let image = match self.draft.as_ref() {
            Some(draft) => draft.image().clone(),
            None => return Err(self.invalid("submit_for_inference")),
        };

        self.transition_to(DraftPhase::Uploading);

        let response = match self.api.predict(&image).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Inference failed");
                self.report_failure("submit_for_inference", &e);
                self.discard_draft(DiscardReason::InferenceFailed);
                self.transition_to(DraftPhase::Failed(FailureKind::InferenceFailed));
                return Err(PipelineError::InferenceFailed(e));
            }
        };

        let Some(draft) = self.draft.as_mut() else {
            return Err(self.invalid("submit_for_inference"));
        };
        draft.apply_prediction(&response);

        let draft_id = draft.draft_id();
        let image_id = draft.remote_id().map(str::to_string);
        let predicted = draft.predicted().cloned().unwrap_or_default();
        if image_id.is_none() {
            warn!(draft_id = %draft_id, "Prediction carried no image_id; commit will be refused");
        }

        self.event_bus.emit_lossy(WardrobeEvent::InferenceCompleted {
            draft_id,
            image_id,
            predicted,
            timestamp: Utc::now(),
        });
        self.transition_to(DraftPhase::AwaitingCorrection);

        self.draft.as_ref().ok_or(PipelineError::InvalidState {
            operation: "submit_for_inference",
            phase: DraftPhase::AwaitingCorrection,
        })
    }

    /// Overwrite one corrected attribute
    ///
    /// Pure local mutation, permitted while awaiting correction or after a
    /// failed commit.
    pub fn edit_field(
        &mut self,
        field: AttributeField,
        value: impl Into<String>,
    ) -> PipelineResult<&GarmentAttributes> {
        self.require("edit_field", accepts_edits)?;
        let value = value.into();

        let edited = match self.draft.as_mut() {
            Some(draft) => draft.edit(field, value.clone()),
            None => false,
        };
        if !edited {
            return Err(self.invalid("edit_field"));
        }

        if let Some(draft) = self.draft.as_ref() {
            self.event_bus.emit_lossy(WardrobeEvent::FieldEdited {
                draft_id: draft.draft_id(),
                field,
                value,
                timestamp: Utc::now(),
            });
        }

        match self.draft.as_ref().and_then(GarmentDraft::edited) {
            Some(attributes) => Ok(attributes),
            None => Err(self.invalid("edit_field")),
        }
    }

    /// Persist the corrected attributes against the draft's server reference
    ///
    /// A failed commit keeps the draft so the call can be repeated with the
    /// same `image_id`; no image is re-uploaded.
    pub async fn commit(&mut self) -> PipelineResult<&CommittedGarment> {
        self.require("commit", accepts_edits)?;

        let Some(draft) = self.draft.as_ref() else {
            return Err(self.invalid("commit"));
        };
        let Some(request) = draft.update_request() else {
            warn!(draft_id = %draft.draft_id(), "Commit refused: draft has no server reference");
            self.event_bus.emit_lossy(WardrobeEvent::OperationFailed {
                operation: "commit".to_string(),
                message: PipelineError::MissingServerReference.to_string(),
                timestamp: Utc::now(),
            });
            self.discard_draft(DiscardReason::MissingServerReference);
            self.transition_to(DraftPhase::Failed(FailureKind::MissingServerReference));
            return Err(PipelineError::MissingServerReference);
        };
        let draft_id = draft.draft_id();

        self.transition_to(DraftPhase::Committing);

        if let Err(e) = self.api.update_metadata(&request).await {
            warn!(draft_id = %draft_id, image_id = %request.image_id, error = %e, "Commit failed; edits retained");
            self.report_failure("commit", &e);
            self.transition_to(DraftPhase::Failed(FailureKind::CommitFailed));
            return Err(PipelineError::CommitFailed(e));
        }

        let committed = CommittedGarment {
            id: request.image_id,
            attributes: request.attributes,
            committed_at: Utc::now(),
        };
        info!(draft_id = %draft_id, image_id = %committed.id, "Garment committed");

        self.event_bus.emit_lossy(WardrobeEvent::GarmentCommitted {
            draft_id,
            image_id: committed.id.clone(),
            attributes: committed.attributes.clone(),
            timestamp: committed.committed_at,
        });
        self.discard_draft(DiscardReason::Committed);
        self.transition_to(DraftPhase::Committed);

        Ok(&*self.last_committed.insert(committed))
    }

    /// Abandon the current draft without any server call
    ///
    /// The server keeps whatever record inference created.
    pub fn cancel(&mut self) -> PipelineResult<()> {
        self.require("cancel", |p| {
            matches!(
                p,
                DraftPhase::Capturing
                    | DraftPhase::Uploading
                    | DraftPhase::AwaitingCorrection
                    | DraftPhase::Failed(FailureKind::CommitFailed)
            )
        })?;

        info!(phase = %self.phase, "Draft cancelled");
        self.discard_draft(DiscardReason::Cancelled);
        self.transition_to(DraftPhase::Idle);
        Ok(())
    }

    /// Return a finished pipeline to `Idle` so a new capture can start
    ///
    /// A draft still held after a failed commit is discarded.
    pub fn reset(&mut self) -> PipelineResult<()> {
        self.require("reset", |p| p == DraftPhase::Idle || p.is_terminal())?;
        if self.phase == DraftPhase::Idle {
            return Ok(());
        }

        self.discard_draft(DiscardReason::Cancelled);
        self.transition_to(DraftPhase::Idle);
        Ok(())
    }

    async fn ensure_permissions(&mut self) -> PipelineResult<()> {
        if !self.camera_granted {
            if !self.image_source.request_camera_access().await.is_granted() {
                return Err(self.permission_denied(Capability::Camera));
            }
            self.camera_granted = true;
        }

        if !self.library_granted {
            if !self.image_source.request_library_access().await.is_granted() {
                return Err(self.permission_denied(Capability::Library));
            }
            self.library_granted = true;
        }

        Ok(())
    }

    fn permission_denied(&self, capability: Capability) -> PipelineError {
        let error = PipelineError::PermissionDenied(capability);
        warn!(capability = %capability, "Permission denied");
        self.event_bus.emit_lossy(WardrobeEvent::OperationFailed {
            operation: "acquire_image".to_string(),
            message: error.to_string(),
            timestamp: Utc::now(),
        });
        error
    }

    fn require(&self, operation: &'static str, allowed: impl Fn(DraftPhase) -> bool) -> PipelineResult<()> {
        if allowed(self.phase) {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    fn invalid(&self, operation: &'static str) -> PipelineError {
        PipelineError::InvalidState {
            operation,
            phase: self.phase,
        }
    }

    fn transition_to(&mut self, new_phase: DraftPhase) {
        let old_phase = self.phase;
        self.phase = new_phase;

        let draft_id = self.draft.as_ref().map(GarmentDraft::draft_id);
        tracing::debug!(draft_id = ?draft_id, from = %old_phase, to = %new_phase, "Pipeline transition");

        self.event_bus.emit_lossy(WardrobeEvent::DraftPhaseChanged {
            draft_id,
            old_phase,
            new_phase,
            timestamp: Utc::now(),
        });
    }

    fn discard_draft(&mut self, reason: DiscardReason) {
        if let Some(draft) = self.draft.take() {
            self.event_bus.emit_lossy(WardrobeEvent::DraftDiscarded {
                draft_id: draft.draft_id(),
                reason,
                timestamp: Utc::now(),
            });
        }
    }

    fn report_failure(&self, operation: &str, error: &impl std::fmt::Display) {
        self.event_bus.emit_lossy(WardrobeEvent::OperationFailed {
            operation: operation.to_string(),
            message: error.to_string(),
            timestamp: Utc::now(),
        });
    }
}

fn accepts_edits(phase: DraftPhase) -> bool {
    matches!(
        phase,
        DraftPhase::AwaitingCorrection | DraftPhase::Failed(FailureKind::CommitFailed)
    )
}
