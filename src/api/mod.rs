//! Dashboard API access
//!
//! Fetching, validating and caching role dashboards from the backend, plus the
//! classification of failed requests into user-facing categories.

pub mod classify;
pub mod client;
pub mod envelope;
pub mod error;
pub mod transport;

pub use classify::{classify, classify_status, Classification, ErrorCategory, TransportFailure};
pub use client::{DashboardClient, EmployerDashboardClient, JobSeekerDashboardClient};
pub use envelope::ApiResponse;
pub use error::DashboardError;
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
