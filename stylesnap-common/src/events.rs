//! Event types for the StyleSnap notification channel
//!
//! The pipeline and synchronizer return their new state to the caller and
//! also publish it here, so any presentation layer can re-render without
//! polling.

use crate::api::{AttributeField, GarmentAttributes};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Phase of the capture-to-catalog pipeline
///
/// `Idle → Capturing → Uploading → AwaitingCorrection → Committing →
/// {Committed | Failed}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftPhase {
    /// No draft; a new capture may start
    Idle,
    /// Permission granted, waiting for camera or library
    Capturing,
    /// Image sent to the classifier
    Uploading,
    /// Prediction received, user is correcting attributes
    AwaitingCorrection,
    /// Corrected attributes sent to the catalog
    Committing,
    /// Catalog accepted the corrected record
    Committed,
    /// Draft failed
    Failed(FailureKind),
}

impl DraftPhase {
    /// Committed and Failed end a draft's life
    pub fn is_terminal(&self) -> bool {
        matches!(self, DraftPhase::Committed | DraftPhase::Failed(_))
    }
}

impl fmt::Display for DraftPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftPhase::Idle => f.write_str("Idle"),
            DraftPhase::Capturing => f.write_str("Capturing"),
            DraftPhase::Uploading => f.write_str("Uploading"),
            DraftPhase::AwaitingCorrection => f.write_str("AwaitingCorrection"),
            DraftPhase::Committing => f.write_str("Committing"),
            DraftPhase::Committed => f.write_str("Committed"),
            DraftPhase::Failed(kind) => write!(f, "Failed({})", kind),
        }
    }
}

/// Why a draft ended in `Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Upload or classification failed; the draft is gone
    InferenceFailed,
    /// Metadata update rejected; edits kept for retry
    CommitFailed,
    /// Commit attempted without a server identifier
    MissingServerReference,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InferenceFailed => f.write_str("InferenceFailed"),
            FailureKind::CommitFailed => f.write_str("CommitFailed"),
            FailureKind::MissingServerReference => f.write_str("MissingServerReference"),
        }
    }
}

/// Why a draft was dropped from memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardReason {
    Committed,
    Cancelled,
    InferenceFailed,
    MissingServerReference,
}

/// StyleSnap event types
///
/// Events are broadcast via EventBus and serialize with a `type` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WardrobeEvent {
    /// Pipeline moved between phases
    DraftPhaseChanged {
        /// Draft the transition belongs to (None before a draft exists)
        draft_id: Option<Uuid>,
        old_phase: DraftPhase,
        new_phase: DraftPhase,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Classifier returned attributes for a draft
    InferenceCompleted {
        draft_id: Uuid,
        /// Server identifier, if the response carried one
        image_id: Option<String>,
        predicted: GarmentAttributes,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// User corrected one attribute
    FieldEdited {
        draft_id: Uuid,
        field: AttributeField,
        value: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Catalog accepted the corrected attributes
    GarmentCommitted {
        draft_id: Uuid,
        image_id: String,
        attributes: GarmentAttributes,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Draft dropped from memory
    DraftDiscarded {
        draft_id: Uuid,
        reason: DiscardReason,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Wardrobe view replaced by a fetch
    WardrobeRefreshed {
        item_count: usize,
        /// Sequence number of the fetch that was applied
        sequence: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Server confirmed a delete and the item left the view
    GarmentDeleted {
        id: String,
        remaining: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// An operation failed and the failure was surfaced to the caller
    OperationFailed {
        /// Operation name (e.g. "commit", "fetch_all")
        operation: String,
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus
///
/// Uses `tokio::sync::broadcast` internally:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use stylesnap_common::events::{DraftPhase, EventBus, WardrobeEvent};
///
/// let event_bus = EventBus::new(16);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(WardrobeEvent::DraftPhaseChanged {
///     draft_id: None,
///     old_phase: DraftPhase::Idle,
///     new_phase: DraftPhase::Capturing,
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(matches!(rx.try_recv(), Ok(WardrobeEvent::DraftPhaseChanged { .. })));
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<WardrobeEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// `capacity` is the number of events buffered before the oldest are
    /// dropped for lagging subscribers. Must be at least 1.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<WardrobeEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if nobody is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: WardrobeEvent,
    ) -> Result<usize, broadcast::error::SendError<WardrobeEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: WardrobeEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
