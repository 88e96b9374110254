//! Scripted text operation provider for testing polling behavior.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use cogvis_core::contract::{
    AnalysisInDomainResult, AnalysisResult, Detail, ImageSource, ModelResult, Ocr,
    OperationStatus, RecognitionResult, TextOperation, TextOperationResult, TextRecognitionMode,
    ThumbnailRequest, VisualFeature,
};
use cogvis_core::{Error, ErrorKind, OperationQuery, Result, ServiceHealth, VisionProvider};
use tokio_util::sync::CancellationToken;

use super::MockVisionProvider;

/// Location of the single operation the scripted provider hands out.
const SCRIPTED_LOCATION: &str = "scripted://textOperations/0";

#[derive(Debug)]
enum Step {
    Respond(TextOperationResult),
    Fault(ErrorKind),
}

#[derive(Debug, Default)]
struct Script {
    steps: VecDeque<Step>,
    queries: u32,
    submissions: u32,
    submission_fault: Option<ErrorKind>,
    cancel_on: Option<(u32, CancellationToken)>,
}

/// Provider replaying a scripted sequence of status responses.
///
/// Each status query pops the next step; once the script is exhausted every
/// query answers `Running`. Operations other than submission and status
/// queries are served by a default [`MockVisionProvider`].
///
/// Clones share the script and the counters.
#[derive(Debug, Clone, Default)]
pub struct ScriptedOperationProvider {
    script: Arc<Mutex<Script>>,
    fallback: MockVisionProvider,
}

impl ScriptedOperationProvider {
    /// Creates a provider with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(self, step: Step) -> Self {
        self.lock().steps.push_back(step);
        self
    }

    /// Appends a response without content carrying `status`.
    #[must_use]
    pub fn then_status(self, status: OperationStatus) -> Self {
        self.push(Step::Respond(TextOperationResult::pending(status)))
    }

    /// Appends `count` `Running` responses.
    #[must_use]
    pub fn then_running(self, count: u32) -> Self {
        (0..count).fold(self, |provider, _| {
            provider.then_status(OperationStatus::Running)
        })
    }

    /// Appends a successful response carrying `content`.
    #[must_use]
    pub fn then_succeeded(self, content: RecognitionResult) -> Self {
        self.push(Step::Respond(TextOperationResult::succeeded(content)))
    }

    /// Appends an arbitrary response, returned as is to the poller.
    #[must_use]
    pub fn then_result(self, result: TextOperationResult) -> Self {
        self.push(Step::Respond(result))
    }

    /// Appends a failing status query.
    #[must_use]
    pub fn then_fault(self, kind: ErrorKind) -> Self {
        self.push(Step::Fault(kind))
    }

    /// Makes every submission fail with `kind`.
    #[must_use]
    pub fn fail_submission(self, kind: ErrorKind) -> Self {
        self.lock().submission_fault = Some(kind);
        self
    }

    /// Cancels `token` while answering the `query`-th status query.
    #[must_use]
    pub fn cancel_on_query(self, query: u32, token: CancellationToken) -> Self {
        self.lock().cancel_on = Some((query, token));
        self
    }

    /// Returns the number of status queries answered so far.
    pub fn queries(&self) -> u32 {
        self.lock().queries
    }

    /// Returns the number of submissions received so far.
    pub fn submissions(&self) -> u32 {
        self.lock().submissions
    }

    /// Returns the operation handle the provider hands out on submission.
    pub fn operation() -> Result<TextOperation> {
        TextOperation::new(SCRIPTED_LOCATION)
    }
}

#[async_trait::async_trait]
impl OperationQuery for ScriptedOperationProvider {
    async fn query_operation(&self, _operation: &TextOperation) -> Result<TextOperationResult> {
        let mut script = self.lock();
        script.queries += 1;

        if let Some((query, token)) = &script.cancel_on
            && *query == script.queries
        {
            token.cancel();
        }

        match script.steps.pop_front() {
            Some(Step::Respond(result)) => Ok(result),
            Some(Step::Fault(kind)) => Err(Error::new(kind).with_message("Scripted fault")),
            None => Ok(TextOperationResult::pending(OperationStatus::Running)),
        }
    }
}

#[async_trait::async_trait]
impl VisionProvider for ScriptedOperationProvider {
    async fn analyze_image(
        &self,
        image: &ImageSource,
        features: &[VisualFeature],
        details: &[Detail],
    ) -> Result<AnalysisResult> {
        self.fallback.analyze_image(image, features, details).await
    }

    async fn analyze_image_in_domain(
        &self,
        image: &ImageSource,
        model: &str,
    ) -> Result<AnalysisInDomainResult> {
        self.fallback.analyze_image_in_domain(image, model).await
    }

    async fn describe(&self, image: &ImageSource, max_candidates: u32) -> Result<AnalysisResult> {
        self.fallback.describe(image, max_candidates).await
    }

    async fn list_models(&self) -> Result<ModelResult> {
        self.fallback.list_models().await
    }

    async fn recognize_printed_text(
        &self,
        image: &ImageSource,
        language: &str,
        detect_orientation: bool,
    ) -> Result<Ocr> {
        self.fallback
            .recognize_printed_text(image, language, detect_orientation)
            .await
    }

    async fn create_text_operation(
        &self,
        _image: &ImageSource,
        _mode: TextRecognitionMode,
    ) -> Result<TextOperation> {
        let mut script = self.lock();
        script.submissions += 1;

        match script.submission_fault {
            Some(kind) => Err(Error::new(kind).with_message("Scripted submission fault")),
            None => Self::operation(),
        }
    }

    async fn generate_thumbnail(
        &self,
        image: &ImageSource,
        request: &ThumbnailRequest,
    ) -> Result<Bytes> {
        self.fallback.generate_thumbnail(image, request).await
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        self.fallback.health_check().await
    }
}
