//! Conversions from transport errors into domain errors

use flowcal_domain::{Result, WidgetError};
use reqwest::Response;
use serde::de::DeserializeOwned;

pub(crate) fn network_error(error: reqwest::Error) -> WidgetError {
    WidgetError::Network(error.to_string())
}

/// Turn a non-success response into `WidgetError::Request`, keeping the
/// status and the raw body text for the caller. Never retries.
pub(crate) async fn require_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(WidgetError::Request { status: status.as_u16(), body })
}

pub(crate) async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    response.json().await.map_err(|error| WidgetError::Serialization(error.to_string()))
}
