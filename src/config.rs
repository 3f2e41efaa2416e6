//! Client configuration

use chrono::Duration as ChronoDuration;
use std::time::Duration;

/// How long a cached dashboard response stays valid
pub const DEFAULT_CACHE_TTL_SECS: i64 = 5 * 60;

/// Client-side timeout for dashboard requests
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Client-side timeout for the health probe
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings for a [`crate::api::DashboardClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend, e.g. `https://jobs.example.com`
    ///
    /// Absence is reported as a configuration error when a fetch is attempted.
    pub backend_url: Option<String>,
    pub cache_ttl: ChronoDuration,
    pub fetch_timeout: Duration,
    pub health_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: None,
            cache_ttl: ChronoDuration::seconds(DEFAULT_CACHE_TTL_SECS),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Creates a default configuration pointing at `backend_url`
    pub fn with_backend_url(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: Some(backend_url.into()),
            ..Default::default()
        }
    }

    /// Returns the backend URL without a trailing slash, if one is set and non-blank
    pub fn base_url(&self) -> Option<&str> {
        self.backend_url
            .as_deref()
            .map(|url| url.trim().trim_end_matches('/'))
            .filter(|url| !url.is_empty())
    }

    /// Joins `path` onto the backend URL
    pub fn endpoint(&self, path: &str) -> Option<String> {
        self.base_url().map(|base| format!("{}{}", base, path))
    }
}
