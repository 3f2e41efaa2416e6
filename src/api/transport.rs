//! HTTP transport used by the dashboard client
//!
//! The client talks to the network only through [`HttpTransport`], so tests can
//! substitute a scripted transport and count calls.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;

use super::classify::TransportFailure;

/// A response as received from the server, successful or not
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Performs GET requests against the backend
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issues a GET to `url`, failing with [`TransportFailure::Timeout`] if no
    /// response arrives within `timeout`
    ///
    /// Any HTTP status is returned as `Ok`; only transport-level failures are
    /// errors.
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, TransportFailure>;
}

/// [`HttpTransport`] backed by reqwest
///
/// Session cookies set by the backend are stored and sent back on every
/// request, and JSON `Accept`/`Content-Type` headers are attached by default.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with a cookie store and JSON default headers
    pub fn new() -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .build()?;

        Ok(Self::with_client(client))
    }

    /// Creates a transport around an existing reqwest client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, TransportFailure> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_error)?;

        Ok(HttpResponse { status, body })
    }
}

fn map_reqwest_error(error: reqwest::Error) -> TransportFailure {
    if error.is_timeout() {
        TransportFailure::Timeout
    } else {
        TransportFailure::NoResponse(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_builds() {
        assert!(ReqwestTransport::new().is_ok());
    }

    #[tokio::test]
    async fn test_with_client_uses_given_client() {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(500))
            .build()
            .unwrap();
        let transport = ReqwestTransport::with_client(client);

        let result = transport
            .get("http://127.0.0.1:9/health", Duration::from_secs(2))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_no_response() {
        let transport = ReqwestTransport::new().unwrap();
        // port 9 on localhost (discard) is expected to refuse connections
        let result = transport
            .get("http://127.0.0.1:9/api/jobseeker/dashboard", Duration::from_secs(2))
            .await;

        assert!(matches!(
            result,
            Err(TransportFailure::NoResponse(_)) | Err(TransportFailure::Timeout)
        ));
    }
}
