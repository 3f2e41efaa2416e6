//! Employer dashboard payload

use serde::{Deserialize, Serialize};

use super::{DashboardPayload, Distribution, Role, TimePoint};

/// Headline counters shown at the top of the employer dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployerStats {
    pub total_jobs: u64,
    pub active_jobs: u64,
    pub closed_jobs: u64,
    pub total_applications: u64,
    /// Applications received but not yet reviewed
    pub new_applications: u64,
    pub hired_candidates: u64,
    pub total_views: u64,
}

/// Per-job performance row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPerformance {
    pub job_title: String,
    #[serde(default)]
    pub applications: u64,
    #[serde(default)]
    pub views: u64,
}

/// Full dashboard payload for the employer role
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployerDashboard {
    pub stats: EmployerStats,
    pub jobs_by_status: Vec<Distribution>,
    pub applications_by_status: Vec<Distribution>,
    pub applications_over_time: Vec<TimePoint>,
    pub top_jobs: Vec<JobPerformance>,
}

impl DashboardPayload for EmployerDashboard {
    const ROLE: Role = Role::Employer;

    fn summary(&self) -> String {
        format!(
            "{} jobs ({} active), {} applications ({} new), {} hired, {} views",
            self.stats.total_jobs,
            self.stats.active_jobs,
            self.stats.total_applications,
            self.stats.new_applications,
            self.stats.hired_candidates,
            self.stats.total_views,
        )
    }
}
