//! The vision provider trait.

use bytes::Bytes;

use crate::contract::{
    AnalysisInDomainResult, AnalysisResult, Detail, ImageSource, ModelResult, Ocr, TextOperation,
    TextRecognitionMode, ThumbnailRequest, VisualFeature,
};
use crate::health::ServiceHealth;
use crate::operation::OperationQuery;
use crate::Result;

/// Language code asking the service to detect the language itself.
pub const AUTO_DETECT_LANGUAGE: &str = "unk";

/// Core trait for the operations of the vision REST API.
///
/// Implement this trait to create custom providers; the status query used by
/// the poller comes from the [`OperationQuery`] supertrait.
#[async_trait::async_trait]
pub trait VisionProvider: OperationQuery {
    /// Extracts the requested visual features from an image.
    async fn analyze_image(
        &self,
        image: &ImageSource,
        features: &[VisualFeature],
        details: &[Detail],
    ) -> Result<AnalysisResult>;

    /// Runs a domain specific model (see [`Model`](crate::contract::Model)) on an image.
    async fn analyze_image_in_domain(
        &self,
        image: &ImageSource,
        model: &str,
    ) -> Result<AnalysisInDomainResult>;

    /// Generates up to `max_candidates` captions for an image.
    async fn describe(&self, image: &ImageSource, max_candidates: u32) -> Result<AnalysisResult>;

    /// Lists the domain specific models.
    async fn list_models(&self) -> Result<ModelResult>;

    /// Recognizes printed text synchronously.
    async fn recognize_printed_text(
        &self,
        image: &ImageSource,
        language: &str,
        detect_orientation: bool,
    ) -> Result<Ocr>;

    /// Submits an image for asynchronous text recognition.
    async fn create_text_operation(
        &self,
        image: &ImageSource,
        mode: TextRecognitionMode,
    ) -> Result<TextOperation>;

    /// Generates a thumbnail and returns the encoded image.
    async fn generate_thumbnail(
        &self,
        image: &ImageSource,
        request: &ThumbnailRequest,
    ) -> Result<Bytes>;

    /// Performs a health check on the provider.
    async fn health_check(&self) -> Result<ServiceHealth>;
}
