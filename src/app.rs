//! Application flow for the dashboard CLI
//!
//! Wires configuration, transport, client, notifications and (in watch mode)
//! the dashboard hook together, and prints what comes back.

use std::io::Write;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::api::{ApiResponse, DashboardClient, DashboardError, HttpTransport, ReqwestTransport};
use crate::cli::{OutputFormat, RunConfig};
use crate::data::{DashboardPayload, EmployerDashboard, JobSeekerDashboard, Role};
use crate::hook::{DashboardHook, HookOptions, HookState, Visibility};
use crate::notify::{spawn_notifier, StderrSink, ToastSink};

/// Errors ending a CLI run
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Dashboard(#[from] DashboardError),

    #[error("failed to set up HTTP client: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("backend health check failed")]
    Unhealthy,
}

/// Runs the CLI with a reqwest transport, rendering toasts on stderr
pub async fn run(config: RunConfig) -> Result<(), AppError> {
    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new()?);
    run_with_transport(config, transport, Arc::new(StderrSink)).await
}

/// Runs the CLI against an arbitrary transport and toast sink
pub async fn run_with_transport(
    config: RunConfig,
    transport: Arc<dyn HttpTransport>,
    toasts: Arc<dyn ToastSink>,
) -> Result<(), AppError> {
    info!(event = "app.started", role = %config.role, watch = config.watch.is_some());

    match config.role {
        Role::JobSeeker => {
            let client: Arc<DashboardClient<JobSeekerDashboard>> =
                Arc::new(DashboardClient::new(config.client.clone(), transport));
            run_dashboard(client, &config, toasts).await
        }
        Role::Employer => {
            let client: Arc<DashboardClient<EmployerDashboard>> =
                Arc::new(DashboardClient::new(config.client.clone(), transport));
            if config.health_check {
                return check_health(&client).await;
            }
            run_dashboard(client, &config, toasts).await
        }
    }
}

async fn check_health(client: &DashboardClient<EmployerDashboard>) -> Result<(), AppError> {
    let healthy = client.check_api_health().await;
    writeln!(
        std::io::stdout(),
        "API health: {}",
        if healthy { "ok" } else { "unreachable" }
    )?;
    if healthy {
        Ok(())
    } else {
        Err(AppError::Unhealthy)
    }
}

async fn run_dashboard<P: DashboardPayload>(
    client: Arc<DashboardClient<P>>,
    config: &RunConfig,
    toasts: Arc<dyn ToastSink>,
) -> Result<(), AppError> {
    let shutdown = CancellationToken::new();
    let notifier = spawn_notifier(client.subscribe(), toasts, shutdown.clone());

    let result = match config.watch {
        None => fetch_once(&client, config).await,
        Some(every) => watch(client, config, every).await,
    };

    shutdown.cancel();
    if let Err(error) = notifier.await {
        warn!(event = "app.notifier_failed", %error);
    }
    result
}

async fn fetch_once<P: DashboardPayload>(
    client: &DashboardClient<P>,
    config: &RunConfig,
) -> Result<(), AppError> {
    let response = if config.force_refresh {
        client.refresh_dashboard().await?
    } else {
        client.get_dashboard_data(false).await?
    };
    print_response(&response, config.output)
}

/// Follows the dashboard until Ctrl-C, printing every new payload
async fn watch<P: DashboardPayload>(
    client: Arc<DashboardClient<P>>,
    config: &RunConfig,
    every: std::time::Duration,
) -> Result<(), AppError> {
    let hook = DashboardHook::mount(
        client,
        HookOptions {
            auto_refresh: Some(every),
        },
        Visibility::always_visible(),
    );
    if config.force_refresh {
        hook.refetch().await;
    }

    let mut states = hook.subscribe();
    let mut retry = tokio::time::interval(every);
    retry.tick().await;
    let mut printed = None;

    loop {
        let state = states.borrow_and_update().clone();
        if !state.loading && state.last_updated != printed {
            if let Some(data) = &state.data {
                print_response(&ApiResponse::ok(data.clone()), config.output)?;
                printed = state.last_updated;
            }
        }

        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = retry.tick() => {
                // Auto-refresh only runs once something has loaded; retry the
                // first load by hand.
                if needs_retry(&state) {
                    hook.refetch().await;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    hook.unmount();
    Ok(())
}

fn needs_retry<P>(state: &HookState<P>) -> bool {
    !state.loading && state.show_retry_panel()
}

fn print_response<P: DashboardPayload>(
    response: &ApiResponse<P>,
    format: OutputFormat,
) -> Result<(), AppError> {
    let mut stdout = std::io::stdout();
    match format {
        OutputFormat::Json => {
            writeln!(stdout, "{}", serde_json::to_string_pretty(response)?)?;
        }
        OutputFormat::Summary => {
            if let Some(data) = &response.data {
                writeln!(stdout, "{} dashboard: {}", P::ROLE, data.summary())?;
            }
        }
    }
    Ok(())
}
