//! Core data models for the job board dashboards
//!
//! This module contains the role-specific dashboard payloads returned by the
//! backend and the [`DashboardPayload`] trait that binds each payload to the
//! endpoint it is fetched from.

pub mod employer;
pub mod jobseeker;

pub use employer::{EmployerDashboard, EmployerStats, JobPerformance};
pub use jobseeker::{JobSeekerDashboard, JobSeekerStats, RecentApplication};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The account role a dashboard belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A candidate browsing and applying for jobs
    JobSeeker,
    /// A company posting jobs and reviewing applications
    Employer,
}

impl Role {
    /// Returns the API path of this role's dashboard endpoint
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::JobSeeker => "/api/jobseeker/dashboard",
            Role::Employer => "/api/employer/dashboard",
        }
    }

    /// Parses a role name as typed on the command line
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "jobseeker" | "job-seeker" | "seeker" | "candidate" => Some(Role::JobSeeker),
            "employer" | "company" => Some(Role::Employer),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::JobSeeker => write!(f, "jobseeker"),
            Role::Employer => write!(f, "employer"),
        }
    }
}

/// A count bucket in a distribution chart (e.g. applications per status)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    /// Bucket label as sent by the backend
    #[serde(alias = "status", alias = "name", alias = "type")]
    pub label: String,
    /// Number of records in the bucket
    pub count: u64,
}

/// A single point of a time series chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimePoint {
    /// Period label, usually an ISO date or a month name
    #[serde(alias = "date", alias = "month")]
    pub period: String,
    /// Value for the period
    pub count: u64,
}

/// A payload that can be fetched from a role dashboard endpoint
///
/// Payloads are display-only aggregates: they are replaced wholesale on every
/// fetch and never mutated in place.
pub trait DashboardPayload:
    DeserializeOwned + Serialize + Clone + fmt::Debug + Send + Sync + 'static
{
    /// Role whose endpoint serves this payload
    const ROLE: Role;

    /// One-line human readable summary of the headline numbers
    fn summary(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_paths() {
        assert_eq!(Role::JobSeeker.dashboard_path(), "/api/jobseeker/dashboard");
        assert_eq!(Role::Employer.dashboard_path(), "/api/employer/dashboard");
    }

    #[test]
    fn test_role_from_str_aliases() {
        assert_eq!(Role::from_str("jobseeker"), Some(Role::JobSeeker));
        assert_eq!(Role::from_str("Job-Seeker"), Some(Role::JobSeeker));
        assert_eq!(Role::from_str("employer"), Some(Role::Employer));
        assert_eq!(Role::from_str("COMPANY"), Some(Role::Employer));
        assert_eq!(Role::from_str("admin"), None);
    }

    #[test]
    fn test_distribution_accepts_status_alias() {
        let bucket: Distribution =
            serde_json::from_str(r#"{"status": "pending", "count": 4}"#).unwrap();
        assert_eq!(bucket.label, "pending");
        assert_eq!(bucket.count, 4);
    }

    #[test]
    fn test_time_point_accepts_date_alias() {
        let point: TimePoint = serde_json::from_str(r#"{"date": "2024-03-01", "count": 2}"#).unwrap();
        assert_eq!(point.period, "2024-03-01");
        assert_eq!(point.count, 2);
    }
}
