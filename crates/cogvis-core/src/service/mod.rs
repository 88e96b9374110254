//! Vision service wrapper with observability.
//!
//! [`VisionService`] is the handle applications hold: it wraps any
//! [`VisionProvider`] in an `Arc`, logs every call with its duration, and
//! drives text recognition sessions through the poller.
//!
//! # Example
//!
//! ```rust,ignore
//! use cogvis_core::VisionService;
//! use cogvis_core::contract::{ImageSource, TextRecognitionMode};
//! use cogvis_core::operation::PollPolicy;
//! use tokio_util::sync::CancellationToken;
//!
//! let service = VisionService::new(provider);
//! let image = ImageSource::from_url("https://example.com/note.jpg")?;
//! let result = service
//!     .recognize_text(&image, TextRecognitionMode::Handwritten, &PollPolicy::default(), &CancellationToken::new())
//!     .await?;
//! ```

mod handle;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
pub use handle::RecognitionHandle;
use tokio_util::sync::CancellationToken;

use crate::contract::{
    AnalysisInDomainResult, AnalysisResult, Detail, ImageSource, ModelResult, Ocr, TextOperation,
    TextOperationResult, TextRecognitionMode, ThumbnailRequest, VisualFeature,
};
use crate::health::ServiceHealth;
use crate::operation::{OperationQuery, PollError, PollPolicy, poll};
use crate::provider::VisionProvider;
use crate::Result;

/// Tracing target for service calls.
pub const TRACING_TARGET: &str = "cogvis_core::service";

/// Vision service wrapper with observability.
///
/// The inner provider is wrapped in `Arc` for cheap cloning; clones share the
/// provider and nothing else.
#[derive(Clone)]
pub struct VisionService {
    inner: Arc<dyn VisionProvider>,
}

impl fmt::Debug for VisionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisionService").finish_non_exhaustive()
    }
}

impl VisionService {
    /// Create a new vision service wrapper.
    pub fn new<P>(provider: P) -> Self
    where
        P: VisionProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Extracts the requested visual features from an image.
    pub async fn analyze_image(
        &self,
        image: &ImageSource,
        features: &[VisualFeature],
        details: &[Detail],
    ) -> Result<AnalysisResult> {
        tracing::debug!(
            target: TRACING_TARGET,
            image = image.kind(),
            features = ?features,
            details = ?details,
            "Analyzing image"
        );

        observe(
            "analyze_image",
            self.inner.analyze_image(image, features, details),
        )
        .await
    }

    /// Runs a domain specific model on an image.
    pub async fn analyze_image_in_domain(
        &self,
        image: &ImageSource,
        model: impl AsRef<str>,
    ) -> Result<AnalysisInDomainResult> {
        let model = model.as_ref();

        tracing::debug!(
            target: TRACING_TARGET,
            image = image.kind(),
            model,
            "Analyzing image in domain"
        );

        observe(
            "analyze_image_in_domain",
            self.inner.analyze_image_in_domain(image, model),
        )
        .await
    }

    /// Generates up to `max_candidates` captions for an image.
    pub async fn describe(&self, image: &ImageSource, max_candidates: u32) -> Result<AnalysisResult> {
        tracing::debug!(
            target: TRACING_TARGET,
            image = image.kind(),
            max_candidates,
            "Describing image"
        );

        observe("describe", self.inner.describe(image, max_candidates)).await
    }

    /// Lists the domain specific models.
    pub async fn list_models(&self) -> Result<ModelResult> {
        observe("list_models", self.inner.list_models()).await
    }

    /// Recognizes printed text synchronously.
    pub async fn recognize_printed_text(
        &self,
        image: &ImageSource,
        language: &str,
        detect_orientation: bool,
    ) -> Result<Ocr> {
        tracing::debug!(
            target: TRACING_TARGET,
            image = image.kind(),
            language,
            detect_orientation,
            "Recognizing printed text"
        );

        observe(
            "recognize_printed_text",
            self.inner
                .recognize_printed_text(image, language, detect_orientation),
        )
        .await
    }

    /// Submits an image for asynchronous text recognition.
    pub async fn create_text_operation(
        &self,
        image: &ImageSource,
        mode: TextRecognitionMode,
    ) -> Result<TextOperation> {
        tracing::debug!(
            target: TRACING_TARGET,
            image = image.kind(),
            mode = %mode,
            "Submitting text operation"
        );

        observe(
            "create_text_operation",
            self.inner.create_text_operation(image, mode),
        )
        .await
    }

    /// Generates a thumbnail and returns the encoded image.
    pub async fn generate_thumbnail(
        &self,
        image: &ImageSource,
        request: &ThumbnailRequest,
    ) -> Result<Bytes> {
        request.validate()?;

        tracing::debug!(
            target: TRACING_TARGET,
            image = image.kind(),
            width = request.width,
            height = request.height,
            smart_cropping = request.smart_cropping,
            "Generating thumbnail"
        );

        observe(
            "generate_thumbnail",
            self.inner.generate_thumbnail(image, request),
        )
        .await
    }

    /// Performs a health check on the provider.
    pub async fn health_check(&self) -> Result<ServiceHealth> {
        observe("health_check", self.inner.health_check()).await
    }

    /// Polls a submitted operation until it reaches a terminal status.
    ///
    /// Status queries go through this wrapper, so each one is logged with its
    /// duration. See [`poll`] for the exact attempt accounting.
    pub async fn poll_text_operation(
        &self,
        operation: &TextOperation,
        policy: &PollPolicy,
        cancel: &CancellationToken,
    ) -> Result<TextOperationResult, PollError> {
        poll(self, operation, policy, cancel).await
    }

    /// Submits an image and polls the resulting operation.
    ///
    /// A failed submission is reported as [`PollError::Transport`]. A
    /// cancellation observed before submission issues no request at all.
    pub async fn recognize_text(
        &self,
        image: &ImageSource,
        mode: TextRecognitionMode,
        policy: &PollPolicy,
        cancel: &CancellationToken,
    ) -> Result<TextOperationResult, PollError> {
        if cancel.is_cancelled() {
            return Err(PollError::Cancelled { attempts: 0 });
        }

        let operation = self.create_text_operation(image, mode).await?;
        self.poll_text_operation(&operation, policy, cancel).await
    }

    /// Runs [`recognize_text`](Self::recognize_text) on a background task.
    ///
    /// The returned handle owns the session's cancellation token; dropping
    /// the handle cancels the session.
    pub fn spawn_recognize_text(
        &self,
        image: ImageSource,
        mode: TextRecognitionMode,
        policy: PollPolicy,
    ) -> RecognitionHandle {
        let cancel = CancellationToken::new();
        let service = self.clone();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            service.recognize_text(&image, mode, &policy, &token).await
        });

        RecognitionHandle::new(cancel, task)
    }
}

#[async_trait::async_trait]
impl OperationQuery for VisionService {
    async fn query_operation(&self, operation: &TextOperation) -> Result<TextOperationResult> {
        observe("query_operation", self.inner.query_operation(operation)).await
    }
}

/// Logs the outcome and duration of a provider call.
async fn observe<T, F>(call: &'static str, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let started_at = Instant::now();
    let result = future.await;
    let elapsed = started_at.elapsed();

    match &result {
        Ok(_) => {
            tracing::debug!(
                target: TRACING_TARGET,
                call,
                elapsed_ms = elapsed.as_millis(),
                "Vision call completed"
            );
        }
        Err(error) if error.is_retryable() => {
            tracing::warn!(
                target: TRACING_TARGET,
                call,
                kind = %error.kind,
                error = %error,
                elapsed_ms = elapsed.as_millis(),
                "Vision call failed"
            );
        }
        Err(error) => {
            tracing::error!(
                target: TRACING_TARGET,
                call,
                kind = %error.kind,
                error = %error,
                elapsed_ms = elapsed.as_millis(),
                "Vision call error"
            );
        }
    }

    result
}
