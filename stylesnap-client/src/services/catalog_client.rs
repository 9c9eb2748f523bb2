//! Catalog service HTTP client
//!
//! Thin reqwest wrapper over the five service endpoints. No retries and no
//! backoff: a failed call is reported once and the caller decides what to do.
//! The only client-side timeout is the optional one from configuration.

use crate::error::CatalogApiError;
use crate::models::LocalImageRef;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use stylesnap_common::api::{
    paths, CatalogItem, DeleteImageRequest, PredictResponse, RecommendRequest,
    UpdateMetadataRequest,
};
use stylesnap_common::config::ClientConfig;

const USER_AGENT: &str = concat!("StyleSnap/", env!("CARGO_PKG_VERSION"));

/// Catalog service operations used by the pipeline and synchronizer
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// `POST /predict` with the image as multipart field `file`
    async fn predict(&self, image: &LocalImageRef) -> Result<PredictResponse, CatalogApiError>;

    /// `PUT /update_metadata`; the response body is ignored
    async fn update_metadata(&self, request: &UpdateMetadataRequest) -> Result<(), CatalogApiError>;

    /// `GET /get_all`
    async fn get_all(&self) -> Result<Vec<CatalogItem>, CatalogApiError>;

    /// `DELETE /delete_image`
    async fn delete_image(&self, request: &DeleteImageRequest) -> Result<(), CatalogApiError>;

    /// `POST /recommend`; the response is opaque JSON
    async fn recommend(&self, request: &RecommendRequest) -> Result<Value, CatalogApiError>;
}

#[async_trait]
impl<T: CatalogApi + ?Sized> CatalogApi for Arc<T> {
    async fn predict(&self, image: &LocalImageRef) -> Result<PredictResponse, CatalogApiError> {
        (**self).predict(image).await
    }

    async fn update_metadata(&self, request: &UpdateMetadataRequest) -> Result<(), CatalogApiError> {
        (**self).update_metadata(request).await
    }

    async fn get_all(&self) -> Result<Vec<CatalogItem>, CatalogApiError> {
        (**self).get_all().await
    }

    async fn delete_image(&self, request: &DeleteImageRequest) -> Result<(), CatalogApiError> {
        (**self).delete_image(request).await
    }

    async fn recommend(&self, request: &RecommendRequest) -> Result<Value, CatalogApiError> {
        (**self).recommend(request).await
    }
}

/// reqwest-backed [`CatalogApi`]
pub struct HttpCatalogClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpCatalogClient {
    /// Create a client for `base_url` (no trailing slash)
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, CatalogApiError> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| CatalogApiError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }

    /// Create a client from resolved configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self, CatalogApiError> {
        Self::new(config.api_url.clone(), config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, CatalogApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| CatalogApiError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, CatalogApiError> {
        let text = response
            .text()
            .await
            .map_err(|e| CatalogApiError::Network(e.to_string()))?;
        parse_body(&text)
    }
}

/// Decode a 2xx body, surfacing `{"error": ...}` objects as server errors
pub(crate) fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, CatalogApiError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| CatalogApiError::Parse(e.to_string()))?;

    if let Some(message) = value.get("error").and_then(Value::as_str) {
        return Err(CatalogApiError::Server(message.to_string()));
    }

    serde_json::from_value(value).map_err(|e| CatalogApiError::Parse(e.to_string()))
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
    async fn predict(&self, image: &LocalImageRef) -> Result<PredictResponse, CatalogApiError> {
        let bytes = tokio::fs::read(&image.path).await.map_err(|e| {
            CatalogApiError::InvalidRequest(format!(
                "Cannot read image {}: {}",
                image.path.display(),
                e
            ))
        })?;

        let part = Part::bytes(bytes)
            .file_name(image.file_name.clone())
            .mime_str(&image.mime_type)
            .map_err(|e| CatalogApiError::InvalidRequest(format!("Bad MIME type: {}", e)))?;
        let form = Form::new().part("file", part);

        let url = self.url(paths::PREDICT);
        tracing::debug!(url = %url, file = %image.file_name, "Uploading image for inference");

        let response = self.send(self.http_client.post(&url).multipart(form)).await?;
        let prediction: PredictResponse = Self::read_json(response).await?;

        tracing::info!(
            image_id = ?prediction.image_id,
            sub_category = ?prediction.sub_category,
            "Received prediction"
        );
        Ok(prediction)
    }

    async fn update_metadata(&self, request: &UpdateMetadataRequest) -> Result<(), CatalogApiError> {
        let url = self.url(paths::UPDATE_METADATA);
        tracing::debug!(url = %url, image_id = %request.image_id, "Updating metadata");

        self.send(self.http_client.put(&url).json(request)).await?;

        tracing::info!(image_id = %request.image_id, "Metadata updated");
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<CatalogItem>, CatalogApiError> {
        let url = self.url(paths::GET_ALL);
        tracing::debug!(url = %url, "Fetching catalog");

        let response = self.send(self.http_client.get(&url)).await?;
        let items: Vec<CatalogItem> = Self::read_json(response).await?;

        tracing::info!(count = items.len(), "Fetched catalog");
        Ok(items)
    }

    async fn delete_image(&self, request: &DeleteImageRequest) -> Result<(), CatalogApiError> {
        let url = self.url(paths::DELETE_IMAGE);
        tracing::debug!(url = %url, image_id = %request.image_id, "Deleting garment");

        self.send(self.http_client.delete(&url).json(request)).await?;

        tracing::info!(image_id = %request.image_id, "Garment deleted");
        Ok(())
    }

    async fn recommend(&self, request: &RecommendRequest) -> Result<Value, CatalogApiError> {
        let url = self.url(paths::RECOMMEND);
        tracing::debug!(url = %url, occasion = %request.occasion, n = request.n, "Requesting recommendations");

        let response = self.send(self.http_client.post(&url).json(request)).await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| CatalogApiError::Parse(e.to_string()))
    }
}
