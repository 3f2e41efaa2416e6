//! Command-line interface parsing for the dashboard CLI
//!
//! This module handles parsing of CLI arguments using clap and validates them
//! into a [`RunConfig`].

use clap::{ArgAction, Parser};
use std::time::Duration;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::data::Role;

/// Environment variable holding the backend base URL
pub const BACKEND_URL_ENV: &str = "JOBDASH_BACKEND_URL";

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified role name is not recognized
    #[error("Invalid role: '{0}'. Valid roles: jobseeker, employer")]
    InvalidRole(String),

    /// `--health` was combined with a role that has no health probe
    #[error("--health is only available for the employer dashboard")]
    HealthRequiresEmployer,

    /// `--watch 0` would poll continuously
    #[error("--watch interval must be at least 1 second")]
    InvalidWatchInterval,
}

/// Job board dashboard CLI - fetch and follow role dashboards
#[derive(Parser, Debug)]
#[command(name = "jobdash")]
#[command(about = "Fetch job board dashboards with caching and auto-refresh")]
#[command(version)]
pub struct Cli {
    /// Dashboard to load: jobseeker or employer
    #[arg(value_name = "ROLE")]
    pub role: String,

    /// Base URL of the job board backend
    #[arg(long, value_name = "URL", env = BACKEND_URL_ENV)]
    pub backend_url: Option<String>,

    /// Bypass the cache and reload the dashboard
    #[arg(long)]
    pub refresh: bool,

    /// Keep running and refresh every SECS seconds
    #[arg(long, value_name = "SECS")]
    pub watch: Option<u64>,

    /// Only probe the backend health endpoint (employer only)
    #[arg(long)]
    pub health: bool,

    /// Print the raw response envelope as JSON
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// How fetched dashboards are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One-line headline counts
    Summary,
    /// Pretty-printed response envelope
    Json,
}

/// Validated settings for one CLI run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub role: Role,
    pub client: ClientConfig,
    pub force_refresh: bool,
    pub watch: Option<Duration>,
    pub health_check: bool,
    pub output: OutputFormat,
    pub verbosity: u8,
}

/// Parses a role string argument into a Role.
///
/// # Returns
/// * `Ok(Role)` if the string names a known role
/// * `Err(CliError::InvalidRole)` otherwise
pub fn parse_role_arg(s: &str) -> Result<Role, CliError> {
    Role::from_str(s).ok_or_else(|| CliError::InvalidRole(s.to_string()))
}

impl RunConfig {
    /// Creates a RunConfig from parsed CLI arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let role = parse_role_arg(&cli.role)?;

        if cli.health && role != Role::Employer {
            return Err(CliError::HealthRequiresEmployer);
        }

        let watch = match cli.watch {
            Some(0) => return Err(CliError::InvalidWatchInterval),
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        Ok(RunConfig {
            role,
            client: ClientConfig {
                backend_url: cli.backend_url.clone(),
                ..Default::default()
            },
            force_refresh: cli.refresh,
            watch,
            health_check: cli.health,
            output: if cli.json {
                OutputFormat::Json
            } else {
                OutputFormat::Summary
            },
            verbosity: cli.verbose,
        })
    }
}
