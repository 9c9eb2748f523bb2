//! Wardrobe synchronizer
//!
//! Holds the client's view of the catalog: the last successful `/get_all`
//! result with locally confirmed deletions applied on top. The view is
//! replaced wholesale on fetch and never merged.
//!
//! Concurrent fetches are resolved latest-request-wins: every fetch draws a
//! sequence number when it starts, and a response is applied only if no
//! fetch that started later has already been applied.

use crate::error::{CatalogApiError, SyncError, SyncResult};
use crate::models::GarmentRecord;
use crate::services::CatalogApi;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use stylesnap_common::api::DeleteImageRequest;
use stylesnap_common::events::{EventBus, WardrobeEvent};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct WardrobeView {
    items: Vec<GarmentRecord>,
    /// Sequence of the fetch whose result is currently shown (0 = none yet)
    applied_sequence: u64,
}

/// Local view of the server catalog
pub struct WardrobeSynchronizer<A> {
    api: A,
    event_bus: EventBus,
    view: RwLock<WardrobeView>,
    next_sequence: AtomicU64,
}

impl<A: CatalogApi> WardrobeSynchronizer<A> {
    /// Create a synchronizer with an empty view
    pub fn new(api: A, event_bus: EventBus) -> Self {
        Self {
            api,
            event_bus,
            view: RwLock::new(WardrobeView::default()),
            next_sequence: AtomicU64::new(0),
        }
    }

    /// Copy of the current view, in server order
    pub async fn items(&self) -> Vec<GarmentRecord> {
        self.view.read().await.items.clone()
    }

    pub async fn len(&self) -> usize {
        self.view.read().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.view.read().await.items.is_empty()
    }

    /// Replace the view with the full server catalog
    ///
    /// Returns the number of records now in view. On failure the previous
    /// view is left untouched. A response that arrives after a newer fetch
    /// has been applied is dropped with [`SyncError::Superseded`].
    pub async fn fetch_all(&self) -> SyncResult<usize> {
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(sequence, "Fetching wardrobe");

        let items = match self.api.get_all().await {
            Ok(items) => items,
            Err(e) => return Err(self.fetch_failed(sequence, e)),
        };

        let records = match items
            .into_iter()
            .map(GarmentRecord::from_catalog_item)
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(records) => records,
            Err(msg) => return Err(self.fetch_failed(sequence, CatalogApiError::Parse(msg))),
        };

        let mut view = self.view.write().await;
        if sequence <= view.applied_sequence {
            info!(
                sequence,
                applied = view.applied_sequence,
                "Discarding stale wardrobe response"
            );
            return Err(SyncError::Superseded { sequence });
        }

        let item_count = records.len();
        view.items = records;
        view.applied_sequence = sequence;
        drop(view);

        info!(sequence, item_count, "Wardrobe refreshed");
        self.event_bus.emit_lossy(WardrobeEvent::WardrobeRefreshed {
            item_count,
            sequence,
            timestamp: Utc::now(),
        });

        Ok(item_count)
    }

    /// Delete a record on the server, then drop it from the view
    ///
    /// The server call is keyed on the record's catalog id. On success the
    /// first view entry with that id is removed and returned; `Ok(None)`
    /// means the server accepted the delete but the view no longer held the
    /// record (a fetch replaced it meanwhile). On failure the view is
    /// unchanged.
    pub async fn delete_item(&self, item: &GarmentRecord) -> SyncResult<Option<GarmentRecord>> {
        let request = DeleteImageRequest {
            image_id: item.id.clone(),
        };

        if let Err(e) = self.api.delete_image(&request).await {
            warn!(id = %item.id, error = %e, "Delete rejected; view unchanged");
            self.event_bus.emit_lossy(WardrobeEvent::OperationFailed {
                operation: "delete_item".to_string(),
                message: e.to_string(),
                timestamp: Utc::now(),
            });
            return Err(SyncError::DeleteFailed(e));
        }

        let mut view = self.view.write().await;
        let removed = view
            .items
            .iter()
            .position(|record| record.id == item.id)
            .map(|index| view.items.remove(index));
        let remaining = view.items.len();
        drop(view);

        match &removed {
            Some(_) => info!(id = %item.id, remaining, "Garment deleted"),
            None => warn!(id = %item.id, "Deleted garment was no longer in view"),
        }

        self.event_bus.emit_lossy(WardrobeEvent::GarmentDeleted {
            id: item.id.clone(),
            remaining,
            timestamp: Utc::now(),
        });

        Ok(removed)
    }

    fn fetch_failed(&self, sequence: u64, error: CatalogApiError) -> SyncError {
        warn!(sequence, error = %error, "Wardrobe fetch failed; keeping previous view");
        self.event_bus.emit_lossy(WardrobeEvent::OperationFailed {
            operation: "fetch_all".to_string(),
            message: error.to_string(),
            timestamp: Utc::now(),
        });
        SyncError::FetchFailed(error)
    }
}
