use thiserror::Error;

use super::classify::{classify, ErrorCategory, TransportFailure};

/// Errors surfaced by the dashboard client
///
/// The type is `Clone` because one in-flight fetch result is handed to every
/// caller awaiting it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    /// No backend URL was configured; raised before any network activity
    #[error("Configuration Error: {0}")]
    Configuration(String),

    /// The backend answered with a malformed success envelope
    #[error("Invalid Response: {0}")]
    Validation(String),

    /// Network, timeout or HTTP status failure
    #[error("{category}: {detail}")]
    Request {
        category: ErrorCategory,
        detail: String,
        /// HTTP status, when the server answered at all
        status: Option<u16>,
    },

    /// The caller cancelled the fetch before it completed
    #[error("request cancelled")]
    Cancelled,
}

impl DashboardError {
    /// Builds a classified request error from a transport failure
    pub fn from_failure(failure: &TransportFailure) -> Self {
        let classification = classify(failure);
        let status = match failure {
            TransportFailure::Status { status, .. } => Some(*status),
            _ => None,
        };
        DashboardError::Request {
            category: classification.category,
            detail: classification.detail,
            status,
        }
    }

    /// Short category label for notifications
    pub fn category_title(&self) -> &'static str {
        match self {
            DashboardError::Configuration(_) => "Configuration Error",
            DashboardError::Validation(_) => "Invalid Response",
            DashboardError::Request { category, .. } => category.title(),
            DashboardError::Cancelled => "Cancelled",
        }
    }

    /// Detail line for notifications
    pub fn detail(&self) -> String {
        match self {
            DashboardError::Configuration(detail) | DashboardError::Validation(detail) => {
                detail.clone()
            }
            DashboardError::Request { detail, .. } => detail.clone(),
            DashboardError::Cancelled => "The request was cancelled.".to_string(),
        }
    }
}
