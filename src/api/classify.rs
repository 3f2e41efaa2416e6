//! Classification of failed dashboard requests
//!
//! Maps a transport failure or HTTP status into a user-facing category and a
//! detail string. The mapping is a fixed table and performs no I/O.

use serde::Serialize;
use std::fmt;

/// A request that did not produce a usable response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// The client-side timeout elapsed before a response arrived
    Timeout,
    /// The request was sent but no response came back (DNS, refused, reset...)
    NoResponse(String),
    /// The server answered with a non-success status
    Status {
        status: u16,
        /// `message` field of the server's error envelope, if any
        message: Option<String>,
    },
}

/// User-facing failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCategory {
    BadRequest,
    AuthenticationRequired,
    AccessDenied,
    ResourceNotFound,
    RateLimitExceeded,
    ServerError,
    BadGateway,
    ServiceUnavailable,
    RequestFailed,
    NetworkConnectionFailed,
    RequestTimeout,
}

impl ErrorCategory {
    /// Title shown to the user
    pub fn title(&self) -> &'static str {
        match self {
            ErrorCategory::BadRequest => "Bad Request",
            ErrorCategory::AuthenticationRequired => "Authentication Required",
            ErrorCategory::AccessDenied => "Access Denied",
            ErrorCategory::ResourceNotFound => "Resource Not Found",
            ErrorCategory::RateLimitExceeded => "Rate Limit Exceeded",
            ErrorCategory::ServerError => "Server Error",
            ErrorCategory::BadGateway => "Bad Gateway",
            ErrorCategory::ServiceUnavailable => "Service Unavailable",
            ErrorCategory::RequestFailed => "Request Failed",
            ErrorCategory::NetworkConnectionFailed => "Network Connection Failed",
            ErrorCategory::RequestTimeout => "Request Timeout",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Outcome of classifying a failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: ErrorCategory,
    pub detail: String,
}

/// Maps an HTTP status code to its category and default detail
pub fn classify_status(status: u16) -> (ErrorCategory, String) {
    let (category, detail) = match status {
        400 => (
            ErrorCategory::BadRequest,
            "The request was invalid. Please check your input.",
        ),
        401 => (
            ErrorCategory::AuthenticationRequired,
            "Please log in to view your dashboard.",
        ),
        403 => (
            ErrorCategory::AccessDenied,
            "You do not have permission to view this dashboard.",
        ),
        404 => (
            ErrorCategory::ResourceNotFound,
            "The dashboard endpoint could not be found.",
        ),
        429 => (
            ErrorCategory::RateLimitExceeded,
            "Too many requests. Please wait a moment and try again.",
        ),
        500 => (
            ErrorCategory::ServerError,
            "The server encountered an error. Please try again later.",
        ),
        502 => (
            ErrorCategory::BadGateway,
            "The server is temporarily unreachable. Please try again later.",
        ),
        503 => (
            ErrorCategory::ServiceUnavailable,
            "The service is temporarily unavailable. Please try again later.",
        ),
        other => {
            return (
                ErrorCategory::RequestFailed,
                format!("Request failed with status {}.", other),
            )
        }
    };
    (category, detail.to_string())
}

/// Classifies a failed request
///
/// A message supplied by the server replaces the table's default detail.
pub fn classify(failure: &TransportFailure) -> Classification {
    match failure {
        TransportFailure::Timeout => Classification {
            category: ErrorCategory::RequestTimeout,
            detail: "The request took too long to complete.".to_string(),
        },
        TransportFailure::NoResponse(_) => Classification {
            category: ErrorCategory::NetworkConnectionFailed,
            detail: "Unable to reach the server. Please check your connection.".to_string(),
        },
        TransportFailure::Status { status, message } => {
            let (category, default_detail) = classify_status(*status);
            let detail = message
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .unwrap_or(default_detail);
            Classification { category, detail }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> TransportFailure {
        TransportFailure::Status {
            status: code,
            message: None,
        }
    }

    #[test]
    fn test_status_table() {
        let expected = [
            (400, "Bad Request"),
            (401, "Authentication Required"),
            (403, "Access Denied"),
            (404, "Resource Not Found"),
            (429, "Rate Limit Exceeded"),
            (500, "Server Error"),
            (502, "Bad Gateway"),
            (503, "Service Unavailable"),
            (418, "Request Failed"),
            (504, "Request Failed"),
        ];

        for (code, title) in expected {
            assert_eq!(classify(&status(code)).category.title(), title, "status {}", code);
        }
    }

    #[test]
    fn test_unknown_status_detail_mentions_code() {
        let classification = classify(&status(418));
        assert!(classification.detail.contains("418"));
    }

    #[test]
    fn test_no_response_is_network_failure() {
        let classification = classify(&TransportFailure::NoResponse("connection refused".into()));
        assert_eq!(classification.category, ErrorCategory::NetworkConnectionFailed);
        assert_eq!(classification.category.to_string(), "Network Connection Failed");
    }

    #[test]
    fn test_timeout() {
        let classification = classify(&TransportFailure::Timeout);
        assert_eq!(classification.category, ErrorCategory::RequestTimeout);
    }

    #[test]
    fn test_server_message_replaces_default_detail() {
        let classification = classify(&TransportFailure::Status {
            status: 500,
            message: Some("boom".to_string()),
        });
        assert_eq!(classification.category, ErrorCategory::ServerError);
        assert_eq!(classification.detail, "boom");
    }

    #[test]
    fn test_blank_server_message_keeps_default_detail() {
        let classification = classify(&TransportFailure::Status {
            status: 401,
            message: Some("  ".to_string()),
        });
        assert_eq!(classification.detail, "Please log in to view your dashboard.");
    }

    #[test]
    fn test_classification_is_pure() {
        let failure = status(429);
        assert_eq!(classify(&failure), classify(&failure));
    }
}
