//! Mock vision provider for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
#[cfg(feature = "config")]
use clap::Args;
use cogvis_core::contract::{
    AnalysisInDomainResult, AnalysisResult, Caption, Category, Description, Detail, ImageMetadata,
    ImageSource, ModelDescription, ModelResult, Ocr, OcrLine, OcrRegion, OcrWord,
    OperationStatus, RecognitionResult, Tag, TextLine, TextOperation, TextOperationResult,
    TextRecognitionMode, TextWord, ThumbnailRequest, VisualFeature,
};
use cogvis_core::{Error, OperationQuery, Result, ServiceHealth, VisionProvider};
use serde::{Deserialize, Serialize};

/// Scheme of the operation locations handed out by the mock.
const LOCATION_PREFIX: &str = "mock://textOperations/";

/// API root reported by the mock health check.
pub const MOCK_API_ROOT: &str = "mock://";

/// Configuration for the mock vision provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct MockVisionConfig {
    /// Number of `Running` answers before a text operation completes
    #[cfg_attr(
        feature = "config",
        arg(long = "mock-pending-polls", env = "MOCK_PENDING_POLLS", default_value = "0")
    )]
    #[serde(default)]
    pub pending_polls: u32,

    /// Completes text operations with `Failed` instead of `Succeeded`
    #[cfg_attr(
        feature = "config",
        arg(long = "mock-fail-recognition", env = "MOCK_FAIL_RECOGNITION")
    )]
    #[serde(default)]
    pub fail_recognition: bool,
}

/// Mock vision provider for testing.
///
/// Returns canned successes for every operation. Each submitted text
/// operation keeps its own query counter, so concurrent sessions do not
/// affect each other.
#[derive(Clone, Default, Debug)]
pub struct MockVisionProvider {
    config: MockVisionConfig,
    next_operation: Arc<AtomicU64>,
    queries: Arc<Mutex<HashMap<String, u32>>>,
}

impl MockVisionProvider {
    /// Creates a new mock vision provider with the given configuration.
    pub fn new(config: MockVisionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Returns the content every successful text operation carries.
    pub fn recognized_content() -> RecognitionResult {
        RecognitionResult::new(vec![
            TextLine::new(
                "Mock recognized",
                vec![0, 0, 200, 0, 200, 20, 0, 20],
                vec![
                    TextWord::new("Mock", vec![0, 0, 80, 0, 80, 20, 0, 20]),
                    TextWord::new("recognized", vec![90, 0, 200, 0, 200, 20, 90, 20]),
                ],
            ),
            TextLine::new(
                "text",
                vec![0, 30, 60, 30, 60, 50, 0, 50],
                vec![TextWord::new("text", vec![0, 30, 60, 30, 60, 50, 0, 50])],
            ),
        ])
    }

    /// Returns the number of status queries issued for an operation.
    pub fn queries_for(&self, operation: &TextOperation) -> u32 {
        self.queries
            .lock()
            .map(|queries| queries.get(operation.location()).copied().unwrap_or_default())
            .unwrap_or_default()
    }

    fn metadata(image: &ImageSource) -> ImageMetadata {
        ImageMetadata {
            width: 640,
            height: 480,
            format: match image {
                ImageSource::Url(_) => "Jpeg".to_owned(),
                ImageSource::Bytes(_) => "Png".to_owned(),
            },
        }
    }

    fn description(max_candidates: u32) -> Description {
        let captions = ["a mock image", "an image"]
            .into_iter()
            .zip([0.9, 0.5])
            .take(max_candidates as usize)
            .map(|(text, confidence)| Caption {
                text: text.to_owned(),
                confidence,
            })
            .collect();

        Description {
            tags: vec!["mock".to_owned()],
            captions,
        }
    }
}

fn ensure_image(image: &ImageSource) -> Result<()> {
    if image.is_empty() {
        return Err(Error::invalid_input().with_message("Image must not be empty"));
    }
    Ok(())
}

#[async_trait::async_trait]
impl OperationQuery for MockVisionProvider {
    async fn query_operation(&self, operation: &TextOperation) -> Result<TextOperationResult> {
        let location = operation.location();
        if !location.starts_with(LOCATION_PREFIX) {
            return Err(Error::from_status(404).with_context(location.to_owned()));
        }

        let queries = {
            let mut queries = self
                .queries
                .lock()
                .map_err(|_| Error::internal_error().with_message("Query counter poisoned"))?;
            let count = queries.entry(location.to_owned()).or_default();
            *count += 1;
            *count
        };

        if queries <= self.config.pending_polls {
            return Ok(TextOperationResult::pending(OperationStatus::Running));
        }

        if self.config.fail_recognition {
            Ok(TextOperationResult::failed())
        } else {
            Ok(TextOperationResult::succeeded(Self::recognized_content()))
        }
    }
}

#[async_trait::async_trait]
impl VisionProvider for MockVisionProvider {
    async fn analyze_image(
        &self,
        image: &ImageSource,
        features: &[VisualFeature],
        _details: &[Detail],
    ) -> Result<AnalysisResult> {
        ensure_image(image)?;

        let mut result = AnalysisResult {
            request_id: Some("mock-analyze".to_owned()),
            metadata: Some(Self::metadata(image)),
            ..AnalysisResult::default()
        };

        for feature in features {
            match feature {
                VisualFeature::Categories => {
                    result.categories = vec![Category {
                        name: "others_".to_owned(),
                        score: 0.5,
                        detail: None,
                    }];
                }
                VisualFeature::Tags => {
                    result.tags = vec![Tag {
                        name: "mock".to_owned(),
                        confidence: 0.99,
                        hint: None,
                    }];
                }
                VisualFeature::Description => result.description = Some(Self::description(1)),
                VisualFeature::Color => result.color = Some(Default::default()),
                VisualFeature::Adult => result.adult = Some(Default::default()),
                VisualFeature::ImageType => result.image_type = Some(Default::default()),
                VisualFeature::Faces => {}
            }
        }

        Ok(result)
    }

    async fn analyze_image_in_domain(
        &self,
        image: &ImageSource,
        model: &str,
    ) -> Result<AnalysisInDomainResult> {
        ensure_image(image)?;

        let mut result = serde_json::Map::new();
        result.insert(model.to_owned(), serde_json::Value::Array(Vec::new()));

        Ok(AnalysisInDomainResult {
            request_id: Some("mock-domain".to_owned()),
            metadata: Some(Self::metadata(image)),
            result: serde_json::Value::Object(result),
        })
    }

    async fn describe(&self, image: &ImageSource, max_candidates: u32) -> Result<AnalysisResult> {
        ensure_image(image)?;

        Ok(AnalysisResult {
            request_id: Some("mock-describe".to_owned()),
            metadata: Some(Self::metadata(image)),
            description: Some(Self::description(max_candidates)),
            ..AnalysisResult::default()
        })
    }

    async fn list_models(&self) -> Result<ModelResult> {
        Ok(ModelResult {
            models: vec![
                ModelDescription {
                    name: "celebrities".to_owned(),
                    categories: vec!["people_".to_owned()],
                },
                ModelDescription {
                    name: "landmarks".to_owned(),
                    categories: vec!["building_".to_owned(), "outdoor_".to_owned()],
                },
            ],
        })
    }

    async fn recognize_printed_text(
        &self,
        image: &ImageSource,
        language: &str,
        detect_orientation: bool,
    ) -> Result<Ocr> {
        ensure_image(image)?;

        let words = ["Mock", "printed", "text"]
            .into_iter()
            .map(|text| OcrWord {
                bounding_box: "0,0,10,10".to_owned(),
                text: text.to_owned(),
            })
            .collect();

        Ok(Ocr {
            language: language.to_owned(),
            text_angle: detect_orientation.then_some(0.0),
            orientation: if detect_orientation { "Up" } else { "NotDetected" }.to_owned(),
            regions: vec![OcrRegion {
                bounding_box: "0,0,100,10".to_owned(),
                lines: vec![OcrLine {
                    bounding_box: "0,0,100,10".to_owned(),
                    words,
                }],
            }],
        })
    }

    async fn create_text_operation(
        &self,
        image: &ImageSource,
        mode: TextRecognitionMode,
    ) -> Result<TextOperation> {
        ensure_image(image)?;

        let id = self.next_operation.fetch_add(1, Ordering::Relaxed);
        TextOperation::new(format!("{LOCATION_PREFIX}{mode}-{id}"))
    }

    async fn generate_thumbnail(
        &self,
        image: &ImageSource,
        request: &ThumbnailRequest,
    ) -> Result<Bytes> {
        ensure_image(image)?;
        request.validate()?;

        Ok(Bytes::from(format!("thumbnail {}x{}", request.width, request.height)))
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        let listing = self.list_models().await;
        Ok(ServiceHealth::from_model_listing(MOCK_API_ROOT, listing, Duration::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use cogvis_core::{ErrorKind, PollPolicy, ServiceStatus, VisionService};
    use tokio_util::sync::CancellationToken;

    use super::*;

    fn image() -> ImageSource {
        ImageSource::from_url("https://example.com/image.jpg").unwrap()
    }

    #[tokio::test]
    async fn test_analyze_fills_requested_features() {
        let provider = MockVisionProvider::default();
        let result = provider
            .analyze_image(&image(), &[VisualFeature::Tags, VisualFeature::Description], &[])
            .await
            .unwrap();

        assert_eq!(result.tags.len(), 1);
        assert_eq!(result.best_caption().unwrap().text, "a mock image");
        assert!(result.categories.is_empty());
        assert!(result.color.is_none());
    }

    #[tokio::test]
    async fn test_describe_limits_candidates() {
        let provider = MockVisionProvider::default();
        let result = provider.describe(&image(), 2).await.unwrap();
        assert_eq!(result.description.unwrap().captions.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_image_rejected() {
        let provider = MockVisionProvider::default();
        let error = provider
            .describe(&ImageSource::from_bytes(Vec::new()), 1)
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_unknown_operation_not_found() {
        let provider = MockVisionProvider::default();
        let operation = TextOperation::new("https://example.com/textOperations/1").unwrap();
        let error = provider.query_operation(&operation).await.unwrap_err();
        assert_eq!(error.kind, ErrorKind::NotFound);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recognize_text_after_pending_polls() {
        let provider = MockVisionProvider::new(MockVisionConfig {
            pending_polls: 2,
            fail_recognition: false,
        });
        let service = VisionService::new(provider.clone());
        let policy = PollPolicy::new(5, Duration::from_secs(1)).unwrap();

        let operation = service
            .create_text_operation(&image(), TextRecognitionMode::Handwritten)
            .await
            .unwrap();
        let result = service
            .poll_text_operation(&operation, &policy, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            result.recognition_result.unwrap().text(),
            "Mock recognized\ntext"
        );
        assert_eq!(provider.queries_for(&operation), 3);
    }

    #[tokio::test]
    async fn test_fail_recognition() {
        let provider = MockVisionProvider::new(MockVisionConfig {
            pending_polls: 0,
            fail_recognition: true,
        });
        let service = VisionService::new(provider);

        let result = service
            .recognize_text(
                &image(),
                TextRecognitionMode::Printed,
                &PollPolicy::default(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(result.status, OperationStatus::Failed);
        assert!(result.recognition_result.is_none());
    }

    #[tokio::test]
    async fn test_operations_are_counted_independently() {
        let provider = MockVisionProvider::new(MockVisionConfig {
            pending_polls: 1,
            fail_recognition: false,
        });

        let first = provider
            .create_text_operation(&image(), TextRecognitionMode::Printed)
            .await
            .unwrap();
        let second = provider
            .create_text_operation(&image(), TextRecognitionMode::Printed)
            .await
            .unwrap();
        assert_ne!(first, second);

        let pending = provider.query_operation(&first).await.unwrap();
        assert_eq!(pending.status, OperationStatus::Running);
        let done = provider.query_operation(&first).await.unwrap();
        assert!(done.is_succeeded());

        let pending = provider.query_operation(&second).await.unwrap();
        assert_eq!(pending.status, OperationStatus::Running);
    }

    #[tokio::test]
    async fn test_thumbnail_validates_request() {
        let provider = MockVisionProvider::default();

        let bytes = provider
            .generate_thumbnail(&image(), &ThumbnailRequest::new(32, 16))
            .await
            .unwrap();
        assert_eq!(bytes.as_ref(), b"thumbnail 32x16");

        let error = provider
            .generate_thumbnail(&image(), &ThumbnailRequest::new(2048, 16))
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_health_check_counts_models() {
        let provider = MockVisionProvider::default();
        let models = provider.list_models().await.unwrap();

        let health = provider.health_check().await.unwrap();

        assert_eq!(health.status, ServiceStatus::Healthy);
        assert_eq!(health.api_root, MOCK_API_ROOT);
        assert_eq!(health.model_count, Some(models.models.len()));
    }
}
