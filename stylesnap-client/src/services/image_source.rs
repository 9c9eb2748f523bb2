//! Image source: device permissions plus camera/library acquisition
//!
//! The mobile camera and picker are outside this crate; they plug in through
//! [`ImageSource`]. [`FileImageSource`] serves the command-line front end by
//! treating a file on disk as the captured photo.

use crate::models::LocalImageRef;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// MIME type used when the content cannot be identified
pub const FALLBACK_MIME_TYPE: &str = "image/jpeg";
/// Filename used when the path has none
pub const FALLBACK_FILE_NAME: &str = "upload.jpg";

/// Outcome of a permission prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

/// Device capabilities consumed by the capture pipeline
///
/// `capture` and `pick_from_library` return `None` when the user backs out.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn request_camera_access(&self) -> PermissionStatus;
    async fn request_library_access(&self) -> PermissionStatus;
    async fn capture(&self) -> Option<LocalImageRef>;
    async fn pick_from_library(&self) -> Option<LocalImageRef>;
}

#[async_trait]
impl<T: ImageSource + ?Sized> ImageSource for Arc<T> {
    async fn request_camera_access(&self) -> PermissionStatus {
        (**self).request_camera_access().await
    }

    async fn request_library_access(&self) -> PermissionStatus {
        (**self).request_library_access().await
    }

    async fn capture(&self) -> Option<LocalImageRef> {
        (**self).capture().await
    }

    async fn pick_from_library(&self) -> Option<LocalImageRef> {
        (**self).pick_from_library().await
    }
}

/// Build an image handle for a file, sniffing its MIME type from magic bytes
///
/// Fails if the file is unreadable or is recognised as something other than
/// an image. Unrecognised content falls back to `image/jpeg`.
pub fn describe_image(path: &Path) -> io::Result<LocalImageRef> {
    let mime_type = match infer::get_from_path(path)? {
        Some(kind) if kind.matcher_type() == infer::MatcherType::Image => kind.mime_type().to_string(),
        Some(kind) => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{} is {}, not an image", path.display(), kind.mime_type()),
            ))
        }
        None => FALLBACK_MIME_TYPE.to_string(),
    };

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string());

    Ok(LocalImageRef {
        path: path.to_path_buf(),
        mime_type,
        file_name,
    })
}

/// Image source backed by a file chosen up front
///
/// Permissions are always granted; both acquisition paths yield the file.
#[derive(Debug, Clone)]
pub struct FileImageSource {
    image: LocalImageRef,
}

impl FileImageSource {
    pub fn new(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let image = describe_image(&path)?;
        tracing::debug!(path = %path.display(), mime = %image.mime_type, "Prepared local image");
        Ok(Self { image })
    }

    pub fn image(&self) -> &LocalImageRef {
        &self.image
    }
}

#[async_trait]
impl ImageSource for FileImageSource {
    async fn request_camera_access(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    async fn request_library_access(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    async fn capture(&self) -> Option<LocalImageRef> {
        Some(self.image.clone())
    }

    async fn pick_from_library(&self) -> Option<LocalImageRef> {
        Some(self.image.clone())
    }
}
