//! Response handling shared by every endpoint.

use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::{Error, TRACING_TARGET_HTTP};

/// Error payload returned by the service for non-success statuses.
///
/// Older API versions return the fields at the top level, newer ones nest
/// them under `error`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default)]
    error: Option<Box<ServiceErrorBody>>,
}

impl ServiceErrorBody {
    fn flatten(self) -> Self {
        match self.error {
            Some(nested) => Self {
                code: nested.code.or(self.code),
                message: nested.message.or(self.message),
                request_id: nested.request_id.or(self.request_id),
                error: None,
            },
            None => self,
        }
    }
}

/// Converts a non-success response into a classified error.
pub(crate) async fn error_from_response(response: Response) -> cogvis_core::Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    service_error(status, &body)
}

fn service_error(status: StatusCode, body: &str) -> cogvis_core::Error {
    let mut error = cogvis_core::Error::from_status(status.as_u16());

    let Ok(parsed) = serde_json::from_str::<ServiceErrorBody>(body) else {
        if !body.trim().is_empty() {
            error = error.with_context(truncate(body.trim(), 256).to_owned());
        }
        return error;
    };

    let parsed = parsed.flatten();
    if let Some(message) = parsed.message {
        error = error.with_message(message);
    }

    let context = match (parsed.code, parsed.request_id) {
        (Some(code), Some(request_id)) => Some(format!("{code} (request {request_id})")),
        (Some(code), None) => Some(code),
        (None, Some(request_id)) => Some(format!("request {request_id}")),
        (None, None) => None,
    };

    match context {
        Some(context) => error.with_context(context),
        None => error,
    }
}

fn truncate(value: &str, max: usize) -> &str {
    match value.char_indices().nth(max) {
        Some((index, _)) => &value[..index],
        None => value,
    }
}

/// Returns the response when its status is a success, the classified error otherwise.
pub(crate) async fn check_status(response: Response) -> cogvis_core::Result<Response> {
    let status = response.status();

    tracing::debug!(
        target: TRACING_TARGET_HTTP,
        status = status.as_u16(),
        url = %response.url(),
        "Received response"
    );

    if status.is_success() {
        Ok(response)
    } else {
        Err(error_from_response(response).await)
    }
}

/// Reads and decodes a JSON response body.
pub(crate) async fn read_json<T>(response: Response) -> cogvis_core::Result<T>
where
    T: DeserializeOwned,
{
    let bytes = response.bytes().await.map_err(Error::from)?;
    let value = serde_json::from_slice(&bytes).map_err(Error::from)?;
    Ok(value)
}
