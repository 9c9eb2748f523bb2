//! In-process catalog service
//!
//! Serves the five catalog endpoints on an ephemeral port, records every
//! request it receives, and answers from scripted state.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One request as the server saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

struct CatalogState {
    items: Vec<Value>,
    predict_replies: VecDeque<(StatusCode, Value)>,
    update_statuses: VecDeque<StatusCode>,
    delete_statuses: VecDeque<StatusCode>,
    get_all_statuses: VecDeque<StatusCode>,
    requests: Vec<RecordedRequest>,
}

type Shared = Arc<Mutex<CatalogState>>;

/// Running fake catalog; the server task ends with the test runtime
pub struct FakeCatalog {
    pub base_url: String,
    state: Shared,
}

impl FakeCatalog {
    pub async fn start(items: Vec<Value>) -> Self {
        let state: Shared = Arc::new(Mutex::new(CatalogState {
            items,
            predict_replies: VecDeque::new(),
            update_statuses: VecDeque::new(),
            delete_statuses: VecDeque::new(),
            get_all_statuses: VecDeque::new(),
            requests: Vec::new(),
        }));

        let app = Router::new()
            .route("/predict", post(predict))
            .route("/update_metadata", put(update_metadata))
            .route("/get_all", get(get_all))
            .route("/delete_image", delete(delete_image))
            .route("/recommend", post(recommend))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn reply_to_predict(&self, status: StatusCode, body: Value) {
        self.state.lock().unwrap().predict_replies.push_back((status, body));
    }

    pub fn fail_next_update(&self, status: StatusCode) {
        self.state.lock().unwrap().update_statuses.push_back(status);
    }

    pub fn fail_next_delete(&self, status: StatusCode) {
        self.state.lock().unwrap().delete_statuses.push_back(status);
    }

    pub fn fail_next_get_all(&self, status: StatusCode) {
        self.state.lock().unwrap().get_all_statuses.push_back(status);
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    pub fn item_ids(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .items
            .iter()
            .filter_map(|item| item["_id"].as_str().map(str::to_string))
            .collect()
    }
}

fn record(state: &Shared, method: Method, uri: &Uri, headers: &HeaderMap, body: &Bytes) {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state.lock().unwrap().requests.push(RecordedRequest {
        method,
        path: uri.path().to_string(),
        content_type,
        body: body.to_vec(),
    });
}

async fn predict(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    record(&state, method, &uri, &headers, &body);
    let reply = state.lock().unwrap().predict_replies.pop_front();
    match reply {
        Some((status, body)) => (status, Json(body)),
        None => (StatusCode::OK, Json(json!({"image_id": "generated", "subCategory": "Topwear"}))),
    }
}

async fn update_metadata(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    record(&state, method, &uri, &headers, &body);
    match state.lock().unwrap().update_statuses.pop_front() {
        Some(status) => (status, Json(json!({"error": "update failed"}))),
        None => (StatusCode::OK, Json(json!({"message": "Metadata updated"}))),
    }
}

async fn get_all(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    record(&state, method, &uri, &headers, &Bytes::new());
    let mut state = state.lock().unwrap();
    match state.get_all_statuses.pop_front() {
        Some(status) => (status, Json(json!({"error": "catalog unavailable"}))),
        None => (StatusCode::OK, Json(Value::Array(state.items.clone()))),
    }
}

async fn delete_image(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    record(&state, method, &uri, &headers, &body);
    let mut state = state.lock().unwrap();
    if let Some(status) = state.delete_statuses.pop_front() {
        return (status, Json(json!({"error": "delete failed"})));
    }

    let image_id = serde_json::from_slice::<Value>(&body)
        .ok()
        .and_then(|v| v["image_id"].as_str().map(str::to_string))
        .unwrap_or_default();
    let before = state.items.len();
    state.items.retain(|item| item["_id"].as_str() != Some(image_id.as_str()));

    if state.items.len() == before {
        (StatusCode::NOT_FOUND, Json(json!({"error": "Image not found"})))
    } else {
        (StatusCode::OK, Json(json!({"message": "Image deleted"})))
    }
}

async fn recommend(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    record(&state, method, &uri, &headers, &body);
    let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (
        StatusCode::OK,
        Json(json!({
            "occasion": request["occasion"],
            "outfits": vec![json!({"top": "65a1", "bottom": "65a2"}); request["n"].as_u64().unwrap_or(0) as usize]
        })),
    )
}
