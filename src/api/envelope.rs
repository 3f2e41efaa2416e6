//! The `{ success, message, data }` envelope wrapping every backend response

use serde::{Deserialize, Serialize};

use super::classify::{ErrorCategory, TransportFailure};
use super::error::DashboardError;
use crate::data::DashboardPayload;

/// A backend response in the success envelope convention
///
/// Values are immutable once received; a refresh replaces the whole response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<P> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<P>,
}

impl<P> ApiResponse<P> {
    /// Builds a successful response around `data`
    pub fn ok(data: P) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }
}

/// Envelope as it arrives, before any structural checks
#[derive(Debug, Deserialize)]
struct RawEnvelope {
    success: Option<bool>,
    message: Option<String>,
    data: Option<serde_json::Value>,
}

/// Parses `body` as a JSON object in envelope shape
///
/// Arrays and scalars are rejected even where serde would map them onto the
/// struct's fields positionally.
fn parse_envelope(body: &str) -> Result<RawEnvelope, String> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| e.to_string())?;
    if !value.is_object() {
        return Err("expected a JSON object".to_string());
    }
    serde_json::from_value(value).map_err(|e| e.to_string())
}

/// Extracts the `message` field of an error body, if the body has one
pub fn error_message(body: &str) -> Option<String> {
    parse_envelope(body).ok().and_then(|envelope| envelope.message)
}

/// Decodes and validates a response body
///
/// # Arguments
/// * `status` - HTTP status of the response
/// * `body` - Raw response body
///
/// # Returns
/// * `Ok(ApiResponse)` with `success == true` and populated `data`
/// * `Err(DashboardError::Request)` for non-2xx statuses or an explicit
///   `success: false` carrying a message
/// * `Err(DashboardError::Validation)` for any other malformed envelope
pub fn decode<P: DashboardPayload>(status: u16, body: &str) -> Result<ApiResponse<P>, DashboardError> {
    if !(200..300).contains(&status) {
        return Err(DashboardError::from_failure(&TransportFailure::Status {
            status,
            message: error_message(body),
        }));
    }

    let raw = parse_envelope(body)
        .map_err(|e| DashboardError::Validation(format!("response is not a JSON envelope: {}", e)))?;

    let success = raw
        .success
        .ok_or_else(|| DashboardError::Validation("response has no `success` field".to_string()))?;

    if !success {
        return match raw.message {
            Some(message) => Err(DashboardError::Request {
                category: ErrorCategory::RequestFailed,
                detail: message,
                status: Some(status),
            }),
            None => Err(DashboardError::Validation(
                "unsuccessful response carries no message".to_string(),
            )),
        };
    }

    let data = match raw.data {
        Some(serde_json::Value::Null) | None => {
            return Err(DashboardError::Validation(
                "successful response carries no data".to_string(),
            ))
        }
        Some(value) => serde_json::from_value::<P>(value).map_err(|e| {
            DashboardError::Validation(format!("unexpected {} dashboard payload: {}", P::ROLE, e))
        })?,
    };

    Ok(ApiResponse {
        success,
        message: raw.message,
        data: Some(data),
    })
}
