//! Image inputs accepted by the service.

use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// Largest thumbnail edge the service accepts, in pixels.
pub const MAX_THUMBNAIL_EDGE: u32 = 1024;

/// Image submitted to the service.
///
/// A URL is sent as a JSON body `{"url": "..."}` and must be publicly
/// reachable by the service; raw bytes are sent as
/// `application/octet-stream`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Publicly reachable image URL.
    Url(Url),
    /// Encoded image bytes (JPEG, PNG, GIF or BMP).
    Bytes(Bytes),
}

impl ImageSource {
    /// Creates a source from an image URL.
    ///
    /// # Errors
    ///
    /// Returns an invalid input error if the URL cannot be parsed.
    pub fn from_url(url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| {
            Error::invalid_input()
                .with_message(format!("Invalid image URL '{url}'"))
                .with_source(e)
        })?;
        Ok(Self::Url(url))
    }

    /// Creates a source from encoded image bytes.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Reads an image file into a byte source.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is empty.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            Error::invalid_input()
                .with_message(format!("Failed to read image '{}'", path.display()))
                .with_source(e)
        })?;

        if bytes.is_empty() {
            return Err(Error::invalid_input()
                .with_message(format!("Image '{}' is empty", path.display())));
        }

        Ok(Self::Bytes(bytes.into()))
    }

    /// Returns the request body size in bytes, if known up front.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Url(_) => None,
            Self::Bytes(bytes) => Some(bytes.len()),
        }
    }

    /// Returns `true` for a byte source without content.
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Returns a short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Url(_) => "url",
            Self::Bytes(_) => "bytes",
        }
    }
}

impl From<Url> for ImageSource {
    fn from(url: Url) -> Self {
        Self::Url(url)
    }
}

impl From<Bytes> for ImageSource {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes.into())
    }
}

/// Parameters of `/generateThumbnail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailRequest {
    /// Thumbnail width in pixels.
    pub width: u32,
    /// Thumbnail height in pixels.
    pub height: u32,
    /// Crop around the region of interest instead of the center.
    pub smart_cropping: bool,
}

impl ThumbnailRequest {
    /// Creates a thumbnail request with smart cropping enabled.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            smart_cropping: true,
        }
    }

    /// Sets whether smart cropping is used.
    #[must_use]
    pub fn with_smart_cropping(mut self, smart_cropping: bool) -> Self {
        self.smart_cropping = smart_cropping;
        self
    }

    /// Validates the dimensions against the service limits.
    ///
    /// # Errors
    ///
    /// Returns an invalid input error if an edge is zero or exceeds
    /// [`MAX_THUMBNAIL_EDGE`].
    pub fn validate(&self) -> Result<()> {
        let valid = 1..=MAX_THUMBNAIL_EDGE;
        if !valid.contains(&self.width) || !valid.contains(&self.height) {
            return Err(Error::invalid_input().with_message(format!(
                "Thumbnail size {}x{} is invalid, edges must be between 1 and {MAX_THUMBNAIL_EDGE}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}
