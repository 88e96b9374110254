//! [`VisionProvider`] implementation over HTTP.

use std::time::Instant;

use bytes::Bytes;
use cogvis_core::contract::{
    AnalysisInDomainResult, AnalysisResult, Detail, ImageSource, ModelResult, Ocr, TextOperation,
    TextOperationResult, TextRecognitionMode, ThumbnailRequest, VisualFeature, join_params,
};
use cogvis_core::{
    AUTO_DETECT_LANGUAGE, Error, OperationQuery, Result, ServiceHealth, VisionProvider,
};
use url::Url;

use crate::connect::{OPERATION_LOCATION_HEADER, read_json};
use crate::{ReqwestClient, TRACING_TARGET_HTTP};

#[cfg(test)]
mod tests;

/// Appends `name=value` to the query of `url` when `value` is present.
fn append_query(url: &mut Url, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        url.query_pairs_mut().append_pair(name, value);
    }
}

fn ensure_image(image: &ImageSource) -> Result<()> {
    if image.is_empty() {
        return Err(Error::invalid_input().with_message("Image must not be empty"));
    }
    Ok(())
}

#[async_trait::async_trait]
impl OperationQuery for ReqwestClient {
    async fn query_operation(&self, operation: &TextOperation) -> Result<TextOperationResult> {
        let url = self.operation_url(operation.location())?;
        let response = self.send(self.get(url)).await?;
        read_json(response).await
    }
}

#[async_trait::async_trait]
impl VisionProvider for ReqwestClient {
    async fn analyze_image(
        &self,
        image: &ImageSource,
        features: &[VisualFeature],
        details: &[Detail],
    ) -> Result<AnalysisResult> {
        ensure_image(image)?;

        let mut url = self.endpoint(&["analyze"])?;
        append_query(&mut url, "visualFeatures", join_params(features).as_deref());
        append_query(&mut url, "details", join_params(details).as_deref());

        let response = self.send(self.post_image(url, image)).await?;
        read_json(response).await
    }

    async fn analyze_image_in_domain(
        &self,
        image: &ImageSource,
        model: &str,
    ) -> Result<AnalysisInDomainResult> {
        ensure_image(image)?;

        let model = model.trim();
        if model.is_empty() {
            return Err(Error::invalid_input().with_message("Model name must not be empty"));
        }

        let url = self.endpoint(&["models", model, "analyze"])?;
        let response = self.send(self.post_image(url, image)).await?;
        read_json(response).await
    }

    async fn describe(&self, image: &ImageSource, max_candidates: u32) -> Result<AnalysisResult> {
        ensure_image(image)?;

        if max_candidates == 0 {
            return Err(Error::invalid_input().with_message("maxCandidates must be at least 1"));
        }

        let mut url = self.endpoint(&["describe"])?;
        append_query(
            &mut url,
            "maxCandidates",
            Some(max_candidates.to_string().as_str()),
        );

        let response = self.send(self.post_image(url, image)).await?;
        read_json(response).await
    }

    async fn list_models(&self) -> Result<ModelResult> {
        let url = self.endpoint(&["models"])?;
        let response = self.send(self.get(url)).await?;
        read_json(response).await
    }

    async fn recognize_printed_text(
        &self,
        image: &ImageSource,
        language: &str,
        detect_orientation: bool,
    ) -> Result<Ocr> {
        ensure_image(image)?;

        let language = match language.trim() {
            "" => AUTO_DETECT_LANGUAGE,
            language => language,
        };

        let mut url = self.endpoint(&["ocr"])?;
        append_query(&mut url, "language", Some(language));
        append_query(
            &mut url,
            "detectOrientation",
            Some(if detect_orientation { "true" } else { "false" }),
        );

        let response = self.send(self.post_image(url, image)).await?;
        read_json(response).await
    }

    async fn create_text_operation(
        &self,
        image: &ImageSource,
        mode: TextRecognitionMode,
    ) -> Result<TextOperation> {
        ensure_image(image)?;

        let mut url = self.endpoint(&["recognizeText"])?;
        append_query(&mut url, "mode", Some(mode.as_ref()));

        let response = self.send(self.post_image(url, image)).await?;

        let location = response
            .headers()
            .get(OPERATION_LOCATION_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                Error::external_error()
                    .with_message("Response carries no Operation-Location header")
                    .with_context(format!("HTTP {}", response.status().as_u16()))
            })?;

        let operation = TextOperation::new(location).map_err(|e| {
            Error::external_error()
                .with_message("Response carries a blank Operation-Location header")
                .with_source(e)
        })?;

        tracing::debug!(
            target: TRACING_TARGET_HTTP,
            location = operation.location(),
            "Text operation accepted"
        );

        Ok(operation)
    }

    async fn generate_thumbnail(
        &self,
        image: &ImageSource,
        request: &ThumbnailRequest,
    ) -> Result<Bytes> {
        ensure_image(image)?;
        request.validate()?;

        let mut url = self.endpoint(&["generateThumbnail"])?;
        url.query_pairs_mut()
            .append_pair("width", &request.width.to_string())
            .append_pair("height", &request.height.to_string())
            .append_pair("smartCropping", &request.smart_cropping.to_string());

        let response = self.send(self.post_image(url, image)).await?;
        let bytes = response.bytes().await.map_err(crate::Error::from)?;
        Ok(bytes)
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        let started_at = Instant::now();
        let listing = self.list_models().await;
        let elapsed = started_at.elapsed();
        let health = ServiceHealth::from_model_listing(self.api_root(), listing, elapsed);

        tracing::debug!(
            target: TRACING_TARGET_HTTP,
            status = %health.status,
            latency_ms = health.latency.as_millis(),
            "Health check completed"
        );

        Ok(health)
    }
}
