//! Scripted collaborators for workflow unit tests

use crate::error::CatalogApiError;
use crate::models::LocalImageRef;
use crate::services::{CatalogApi, ImageSource, PermissionStatus};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use stylesnap_common::api::{
    CatalogItem, DeleteImageRequest, PredictResponse, RecommendRequest, UpdateMetadataRequest,
};

type Scripted<T> = Mutex<VecDeque<Result<T, CatalogApiError>>>;

/// Catalog fake that replays queued responses and records every request
#[derive(Default)]
pub struct ScriptedCatalog {
    predict: Scripted<PredictResponse>,
    update: Scripted<()>,
    get_all: Mutex<VecDeque<(Duration, Result<Vec<CatalogItem>, CatalogApiError>)>>,
    delete: Scripted<()>,
    pub predict_calls: AtomicUsize,
    pub update_requests: Mutex<Vec<UpdateMetadataRequest>>,
    pub delete_requests: Mutex<Vec<DeleteImageRequest>>,
}

impl ScriptedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_predict(&self, response: Result<Value, CatalogApiError>) {
        let response = response.map(|v| serde_json::from_value(v).unwrap());
        self.predict.lock().unwrap().push_back(response);
    }

    pub fn push_update(&self, response: Result<(), CatalogApiError>) {
        self.update.lock().unwrap().push_back(response);
    }

    pub fn push_get_all(&self, delay: Duration, response: Result<Value, CatalogApiError>) {
        let response = response.map(|v| serde_json::from_value(v).unwrap());
        self.get_all.lock().unwrap().push_back((delay, response));
    }

    pub fn push_delete(&self, response: Result<(), CatalogApiError>) {
        self.delete.lock().unwrap().push_back(response);
    }

    pub fn update_count(&self) -> usize {
        self.update_requests.lock().unwrap().len()
    }
}

fn next<T>(queue: &Scripted<T>, call: &str) -> Result<T, CatalogApiError> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| panic!("unscripted {} call", call))
}

#[async_trait]
impl CatalogApi for ScriptedCatalog {
    async fn predict(&self, _image: &LocalImageRef) -> Result<PredictResponse, CatalogApiError> {
        self.predict_calls.fetch_add(1, Ordering::SeqCst);
        next(&self.predict, "predict")
    }

    async fn update_metadata(&self, request: &UpdateMetadataRequest) -> Result<(), CatalogApiError> {
        self.update_requests.lock().unwrap().push(request.clone());
        next(&self.update, "update_metadata")
    }

    async fn get_all(&self) -> Result<Vec<CatalogItem>, CatalogApiError> {
        let (delay, response) = self
            .get_all
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted get_all call"));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        response
    }

    async fn delete_image(&self, request: &DeleteImageRequest) -> Result<(), CatalogApiError> {
        self.delete_requests.lock().unwrap().push(request.clone());
        next(&self.delete, "delete_image")
    }

    async fn recommend(&self, request: &RecommendRequest) -> Result<Value, CatalogApiError> {
        Ok(json!({"occasion": request.occasion, "n": request.n}))
    }
}

/// Image source with fixed permission answers
pub struct StubImageSource {
    pub camera: PermissionStatus,
    pub library: PermissionStatus,
    pub image: Option<LocalImageRef>,
    pub camera_prompts: AtomicUsize,
}

impl StubImageSource {
    pub fn granting() -> Self {
        Self {
            camera: PermissionStatus::Granted,
            library: PermissionStatus::Granted,
            image: Some(sample_image()),
            camera_prompts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ImageSource for StubImageSource {
    async fn request_camera_access(&self) -> PermissionStatus {
        self.camera_prompts.fetch_add(1, Ordering::SeqCst);
        self.camera
    }

    async fn request_library_access(&self) -> PermissionStatus {
        self.library
    }

    async fn capture(&self) -> Option<LocalImageRef> {
        self.image.clone()
    }

    async fn pick_from_library(&self) -> Option<LocalImageRef> {
        self.image.clone()
    }
}

pub fn sample_image() -> LocalImageRef {
    LocalImageRef {
        path: PathBuf::from("/sdcard/DCIM/shirt.jpg"),
        mime_type: "image/jpeg".to_string(),
        file_name: "shirt.jpg".to_string(),
    }
}

pub fn catalog_item(id: &str, sub_category: &str) -> Value {
    json!({
        "_id": id,
        "subCategory": sub_category,
        "article": "Tshirts",
        "baseColour": "Black",
        "season": "Summer",
        "usage": "Casual",
        "image": "aGk="
    })
}

pub fn status_error(status: u16, body: &str) -> CatalogApiError {
    CatalogApiError::Status {
        status,
        body: body.to_string(),
    }
}
