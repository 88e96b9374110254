//! Reachability of the vision API as seen by a client.

use std::time::Duration;

use jiff::Timestamp;
use strum::{AsRefStr, Display};

use crate::contract::ModelResult;
use crate::{ErrorKind, Result};

/// Outcome of a health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ServiceStatus {
    /// The API listed its models.
    Healthy,
    /// The API answered but rejected the subscription key.
    Degraded,
    /// The API could not be reached or failed to answer.
    Unhealthy,
}

/// Result of checking the API with `GET /models`.
#[derive(Debug, Clone)]
pub struct ServiceHealth {
    /// Classification of the check outcome.
    pub status: ServiceStatus,
    /// API root the check was sent to.
    pub api_root: String,
    /// Number of domain models listed by a successful check.
    pub model_count: Option<usize>,
    /// Kind of the error a failed check returned.
    pub error_kind: Option<ErrorKind>,
    /// Message of the error a failed check returned.
    pub message: Option<String>,
    /// Round trip time of the check.
    pub latency: Duration,
    pub checked_at: Timestamp,
}

impl ServiceHealth {
    /// Classifies the outcome of a model listing.
    ///
    /// Authentication and authorization failures report
    /// [`ServiceStatus::Degraded`]; any other failure reports
    /// [`ServiceStatus::Unhealthy`].
    pub fn from_model_listing(
        api_root: impl Into<String>,
        listing: Result<ModelResult>,
        latency: Duration,
    ) -> Self {
        let (status, model_count, error_kind, message) = match listing {
            Ok(models) => (ServiceStatus::Healthy, Some(models.models.len()), None, None),
            Err(error) => {
                let status = match error.kind {
                    ErrorKind::Authentication | ErrorKind::Authorization => ServiceStatus::Degraded,
                    _ => ServiceStatus::Unhealthy,
                };
                (status, None, Some(error.kind), Some(error.to_string()))
            }
        };

        Self {
            status,
            api_root: api_root.into(),
            model_count,
            error_kind,
            message,
            latency,
            checked_at: Timestamp::now(),
        }
    }

    /// Returns `true` if the check succeeded.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == ServiceStatus::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::contract::ModelDescription;

    const ROOT: &str = "https://westus.api.cognitive.microsoft.com/vision/v1.0";

    #[test]
    fn test_listed_models_are_healthy() {
        let models = ModelResult {
            models: vec![ModelDescription {
                name: "celebrities".to_owned(),
                categories: vec!["people_".to_owned()],
            }],
        };

        let latency = Duration::from_millis(12);
        let health = ServiceHealth::from_model_listing(ROOT, Ok(models), latency);

        assert!(health.is_healthy());
        assert_eq!(health.model_count, Some(1));
        assert_eq!(health.api_root, ROOT);
        assert_eq!(health.latency, latency);
        assert_eq!(health.error_kind, None);
    }

    #[test]
    fn test_rejected_key_is_degraded() {
        for kind in [ErrorKind::Authentication, ErrorKind::Authorization] {
            let health =
                ServiceHealth::from_model_listing(ROOT, Err(Error::new(kind)), Duration::ZERO);
            assert_eq!(health.status, ServiceStatus::Degraded);
            assert_eq!(health.error_kind, Some(kind));
            assert_eq!(health.model_count, None);
        }
    }

    #[test]
    fn test_other_failures_are_unhealthy() {
        let error = Error::network_error().with_message("Connection failed");
        let health = ServiceHealth::from_model_listing(ROOT, Err(error), Duration::ZERO);

        assert_eq!(health.status, ServiceStatus::Unhealthy);
        assert_eq!(health.status.as_ref(), "unhealthy");
        assert!(health.message.is_some_and(|m| m.contains("Connection failed")));
    }
}
