//! Job seeker dashboard payload
//!
//! Aggregates over the candidate's own applications: headline counts, a status
//! distribution, applications over time and the most recent applications.

use serde::{Deserialize, Serialize};

use super::{DashboardPayload, Distribution, Role, TimePoint};

/// Headline counters shown at the top of the job seeker dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobSeekerStats {
    /// Applications ever submitted
    pub total_applications: u64,
    /// Applications still awaiting a decision
    pub pending_applications: u64,
    /// Applications the employer shortlisted
    pub shortlisted_applications: u64,
    /// Applications the employer rejected
    pub rejected_applications: u64,
    /// Applications that ended in a hire
    pub accepted_applications: u64,
    /// Jobs bookmarked for later
    pub saved_jobs: u64,
    /// Times the profile was viewed by employers
    pub profile_views: u64,
}

/// A recently submitted application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentApplication {
    /// Title of the job applied for
    pub job_title: String,
    /// Name of the hiring company
    #[serde(default)]
    pub company_name: Option<String>,
    /// Current application status
    pub status: String,
    /// Submission date as sent by the backend
    #[serde(default)]
    pub applied_at: Option<String>,
}

/// Full dashboard payload for the job seeker role
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobSeekerDashboard {
    pub stats: JobSeekerStats,
    pub application_status_distribution: Vec<Distribution>,
    pub applications_over_time: Vec<TimePoint>,
    pub recent_applications: Vec<RecentApplication>,
}

impl DashboardPayload for JobSeekerDashboard {
    const ROLE: Role = Role::JobSeeker;

    fn summary(&self) -> String {
        format!(
            "{} applications ({} pending, {} shortlisted, {} accepted), {} saved jobs, {} profile views",
            self.stats.total_applications,
            self.stats.pending_applications,
            self.stats.shortlisted_applications,
            self.stats.accepted_applications,
            self.stats.saved_jobs,
            self.stats.profile_views,
        )
    }
}
