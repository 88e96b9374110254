//! Reqwest-based HTTP client for the vision REST API.

use std::sync::Arc;

use cogvis_core::VisionService;
use cogvis_core::contract::ImageSource;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use url::Url;

use super::ReqwestConfig;
use super::response::check_status;
use crate::{Error, TRACING_TARGET, TRACING_TARGET_HTTP};

/// Header carrying the subscription key.
pub(crate) const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Header carrying the location of a submitted operation.
pub(crate) const OPERATION_LOCATION_HEADER: &str = "Operation-Location";

/// Inner client that holds the HTTP client and configuration.
struct ReqwestClientInner {
    http: Client,
    config: ReqwestConfig,
    api_root: String,
}

#[derive(Serialize)]
struct UrlBody<'a> {
    url: &'a str,
}

/// Reqwest-based client for the vision REST API.
///
/// This client implements the [`VisionProvider`](cogvis_core::VisionProvider)
/// trait. Clones share the underlying connection pool.
///
/// # Examples
///
/// ```rust,ignore
/// use cogvis_reqwest::{ReqwestClient, ReqwestConfig};
///
/// let config = ReqwestConfig::new(std::env::var("VISION_SUBSCRIPTION_KEY")?);
/// let client = ReqwestClient::new(config)?;
/// let models = client.into_service().list_models().await?;
/// ```
#[derive(Clone)]
pub struct ReqwestClient {
    inner: Arc<ReqwestClientInner>,
}

impl std::fmt::Debug for ReqwestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestClient")
            .field("config", &self.inner.config)
            .field("api_root", &self.inner.api_root)
            .finish_non_exhaustive()
    }
}

impl ReqwestClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the configuration does not validate
    /// or the HTTP client cannot be built.
    pub fn new(config: ReqwestConfig) -> cogvis_core::Result<Self> {
        config.validate()?;

        let timeout = config.effective_timeout();
        let user_agent = config.effective_user_agent();
        let api_root = config.effective_api_root();

        tracing::debug!(
            target: TRACING_TARGET,
            api_root = %api_root,
            timeout_ms = timeout.as_millis(),
            "Creating reqwest client"
        );

        let mut key = HeaderValue::from_str(config.subscription_key.trim()).map_err(Error::from)?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(SUBSCRIPTION_KEY_HEADER, key);

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(&user_agent)
            .default_headers(headers)
            .build()
            .map_err(|e| {
                cogvis_core::Error::configuration()
                    .with_message("Failed to build HTTP client")
                    .with_source(e)
            })?;

        let inner = ReqwestClientInner {
            http,
            config,
            api_root,
        };

        tracing::info!(
            target: TRACING_TARGET,
            "Reqwest client created successfully"
        );

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &ReqwestConfig {
        &self.inner.config
    }

    /// Gets the API root every endpoint is resolved against.
    pub fn api_root(&self) -> &str {
        &self.inner.api_root
    }

    /// Converts this client into a [`VisionService`] for use with dependency injection.
    pub fn into_service(self) -> VisionService {
        VisionService::new(self)
    }

    /// Appends path segments to the API root.
    ///
    /// Segments are percent-encoded, so a model name cannot escape its
    /// position in the path.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> crate::Result<Url> {
        let mut url = Url::parse(&self.inner.api_root)?;
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithoutBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Resolves an operation location.
    ///
    /// Absolute locations are used as is; relative ones are resolved against
    /// the API root.
    pub(crate) fn operation_url(&self, location: &str) -> crate::Result<Url> {
        match Url::parse(location) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let segments = location
                    .trim_start_matches('/')
                    .split('/')
                    .collect::<Vec<_>>();
                self.endpoint(&segments)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Builds a `GET` request.
    pub(crate) fn get(&self, url: Url) -> RequestBuilder {
        self.inner.http.get(url)
    }

    /// Builds a `POST` request carrying the image.
    pub(crate) fn post_image(&self, url: Url, image: &ImageSource) -> RequestBuilder {
        let request = self.inner.http.post(url);

        match image {
            ImageSource::Url(url) => request.json(&UrlBody { url: url.as_str() }),
            ImageSource::Bytes(bytes) => request
                .header(CONTENT_TYPE, "application/octet-stream")
                .body(bytes.clone()),
        }
    }

    /// Sends a request and checks its status.
    pub(crate) async fn send(&self, request: RequestBuilder) -> cogvis_core::Result<Response> {
        let request = request.build().map_err(Error::from)?;

        tracing::trace!(
            target: TRACING_TARGET_HTTP,
            method = %request.method(),
            url = %request.url(),
            "Sending request"
        );

        let response = self
            .inner
            .http
            .execute(request)
            .await
            .map_err(Error::from)?;

        check_status(response).await
    }
}
