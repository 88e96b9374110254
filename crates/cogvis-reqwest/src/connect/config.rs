//! Reqwest client configuration.

use std::fmt;
use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

/// Default timeout for HTTP requests: 30 seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Region used to build the default API root.
pub const DEFAULT_REGION: &str = "westus";

/// Template of the default API root; `{region}` is replaced by the region.
pub const DEFAULT_API_ROOT_TEMPLATE: &str =
    "https://{region}.api.cognitive.microsoft.com/vision/v1.0";

/// Configuration for the vision REST client.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ReqwestConfig {
    /// Subscription key sent in the `Ocp-Apim-Subscription-Key` header
    #[cfg_attr(
        feature = "config",
        arg(long = "subscription-key", env = "VISION_SUBSCRIPTION_KEY", hide_env_values = true)
    )]
    #[serde(skip_serializing, default)]
    pub subscription_key: String,

    /// API root, overrides the region based default
    #[cfg_attr(feature = "config", arg(long = "api-root", env = "VISION_API_ROOT"))]
    #[serde(default)]
    pub api_root: Option<String>,

    /// Region of the default API root
    #[cfg_attr(
        feature = "config",
        arg(long = "region", env = "VISION_REGION", default_value = DEFAULT_REGION)
    )]
    #[serde(default = "default_region")]
    pub region: String,

    /// HTTP request timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "http-timeout", env = "HTTP_TIMEOUT", default_value = "30")
    )]
    #[serde(default = "default_timeout_secs")]
    pub http_timeout: u64,

    /// User-Agent header to send with requests
    #[cfg_attr(
        feature = "config",
        arg(long = "http-user-agent", env = "HTTP_USER_AGENT")
    )]
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_region() -> String {
    DEFAULT_REGION.to_owned()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl fmt::Debug for ReqwestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestConfig")
            .field("subscription_key", &"[REDACTED]")
            .field("api_root", &self.api_root)
            .field("region", &self.region)
            .field("http_timeout", &self.http_timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for ReqwestConfig {
    fn default() -> Self {
        Self {
            subscription_key: String::new(),
            api_root: None,
            region: default_region(),
            http_timeout: default_timeout_secs(),
            user_agent: None,
        }
    }
}

impl ReqwestConfig {
    /// Create a new configuration with the given subscription key.
    pub fn new(subscription_key: impl Into<String>) -> Self {
        Self {
            subscription_key: subscription_key.into(),
            ..Self::default()
        }
    }

    /// Returns the API root without a trailing `/`.
    ///
    /// An explicit root wins over the region.
    pub fn effective_api_root(&self) -> String {
        let root = match self.api_root.as_deref() {
            Some(root) if !root.trim().is_empty() => root.trim().to_owned(),
            _ => DEFAULT_API_ROOT_TEMPLATE.replace("{region}", self.effective_region()),
        };

        root.trim_end_matches('/').to_owned()
    }

    fn effective_region(&self) -> &str {
        match self.region.trim() {
            "" => DEFAULT_REGION,
            region => region,
        }
    }

    /// Returns the effective timeout, using default if zero.
    pub fn effective_timeout(&self) -> Duration {
        if self.http_timeout == 0 {
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.http_timeout)
        }
    }

    /// Returns the effective user agent, using default if not set.
    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(Self::default_user_agent)
    }

    fn default_user_agent() -> String {
        format!("cogvis/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty subscription key or an API
    /// root that is not an absolute http(s) URL.
    pub fn validate(&self) -> cogvis_core::Result<()> {
        if self.subscription_key.trim().is_empty() {
            return Err(cogvis_core::Error::configuration()
                .with_message("Subscription key must not be empty")
                .with_context("VISION_SUBSCRIPTION_KEY"));
        }

        let root = self.effective_api_root();
        let url = Url::parse(&root).map_err(|e| {
            cogvis_core::Error::configuration()
                .with_message(format!("Invalid API root '{root}'"))
                .with_source(e)
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(cogvis_core::Error::configuration()
                .with_message(format!("API root '{root}' must use http or https")));
        }

        Ok(())
    }

    /// Set the API root.
    #[must_use]
    pub fn with_api_root(mut self, api_root: impl Into<String>) -> Self {
        self.api_root = Some(api_root.into());
        self
    }

    /// Set the region used by the default API root.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Set the timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.http_timeout = timeout_secs;
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}
