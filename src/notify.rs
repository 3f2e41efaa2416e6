//! Toast notifications for dashboard fetches
//!
//! Subscribes to [`DashboardEvent`]s and turns them into transient progress,
//! success and error toasts. A progress toast is replaced by the terminal toast
//! of the same role.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::data::Role;
use crate::events::{DashboardEvent, Operation};

/// Visual kind of a toast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Loading,
    Success,
    Error,
    /// Removes the progress toast without showing anything
    Dismiss,
}

/// A notification to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// Toasts with the same id replace each other
    pub id: String,
    pub kind: ToastKind,
    pub message: String,
}

/// Where toasts are rendered
pub trait ToastSink: Send + Sync {
    fn show(&self, toast: Toast);
}

/// Maps an event to the toast it should produce
pub fn toast_for(event: &DashboardEvent) -> Toast {
    match event {
        DashboardEvent::Started {
            role, operation, ..
        } => Toast {
            id: toast_id(*role),
            kind: ToastKind::Loading,
            message: match operation {
                Operation::Fetch => format!("Loading {} dashboard...", role_label(*role)),
                Operation::Refresh => format!("Refreshing {} dashboard...", role_label(*role)),
            },
        },
        DashboardEvent::Succeeded { role, operation } => Toast {
            id: toast_id(*role),
            kind: ToastKind::Success,
            message: match operation {
                Operation::Fetch => "Dashboard data loaded successfully".to_string(),
                Operation::Refresh => "Dashboard refreshed successfully".to_string(),
            },
        },
        DashboardEvent::Failed {
            role,
            category,
            detail,
            ..
        } => Toast {
            id: toast_id(*role),
            kind: ToastKind::Error,
            message: format!("{}: {}", category, detail),
        },
        DashboardEvent::Cancelled { role, .. } => Toast {
            id: toast_id(*role),
            kind: ToastKind::Dismiss,
            message: String::new(),
        },
    }
}

fn toast_id(role: Role) -> String {
    format!("dashboard-{}", role)
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::JobSeeker => "job seeker",
        Role::Employer => "employer",
    }
}

/// Forwards every event from `events` to `sink` until the channel closes or
/// `shutdown` fires
///
/// On shutdown, events already queued are still rendered before the task ends,
/// so a terminal toast emitted just before shutdown is never lost.
pub fn spawn_notifier(
    mut events: broadcast::Receiver<DashboardEvent>,
    sink: Arc<dyn ToastSink>,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                received = events.recv() => match received {
                    Ok(event) => sink.show(toast_for(&event)),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(event = "dashboard.notifications_lagged", skipped);
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = shutdown.cancelled() => {
                    drain(&mut events, sink.as_ref());
                    break;
                }
            }
        }
    })
}

fn drain(events: &mut broadcast::Receiver<DashboardEvent>, sink: &dyn ToastSink) {
    loop {
        match events.try_recv() {
            Ok(event) => sink.show(toast_for(&event)),
            Err(TryRecvError::Lagged(skipped)) => {
                warn!(event = "dashboard.notifications_lagged", skipped);
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
}

/// Renders toasts as lines on stderr
#[derive(Debug, Default)]
pub struct StderrSink;

impl ToastSink for StderrSink {
    fn show(&self, toast: Toast) {
        let marker = match toast.kind {
            ToastKind::Loading => "…",
            ToastKind::Success => "✓",
            ToastKind::Error => "✗",
            ToastKind::Dismiss => return,
        };
        let _ = writeln!(std::io::stderr(), "{} {}", marker, toast.message);
    }
}

/// Keeps every toast it is shown, for inspection
#[derive(Debug, Default)]
pub struct RecordingSink {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingSink {
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ToastSink for RecordingSink {
    fn show(&self, toast: Toast) {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(toast);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;

    #[test]
    fn test_started_toast_depends_on_operation() {
        let fetch = toast_for(&DashboardEvent::Started {
            role: Role::JobSeeker,
            operation: Operation::Fetch,
            joined: false,
        });
        let refresh = toast_for(&DashboardEvent::Started {
            role: Role::JobSeeker,
            operation: Operation::Refresh,
            joined: true,
        });

        assert_eq!(fetch.kind, ToastKind::Loading);
        assert_eq!(fetch.message, "Loading job seeker dashboard...");
        assert_eq!(refresh.message, "Refreshing job seeker dashboard...");
        assert_eq!(fetch.id, refresh.id);
    }

    #[test]
    fn test_failure_toast_carries_classified_message() {
        let toast = toast_for(&DashboardEvent::Failed {
            role: Role::Employer,
            operation: Operation::Fetch,
            category: "Authentication Required".to_string(),
            detail: "Please log in to view your dashboard.".to_string(),
        });

        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.id, "dashboard-employer");
        assert_eq!(
            toast.message,
            "Authentication Required: Please log in to view your dashboard."
        );
    }

    #[test]
    fn test_cancel_dismisses() {
        let toast = toast_for(&DashboardEvent::Cancelled {
            role: Role::Employer,
            operation: Operation::Refresh,
        });
        assert_eq!(toast.kind, ToastKind::Dismiss);
    }

    #[tokio::test]
    async fn test_notifier_forwards_until_closed() {
        let bus = EventBus::new();
        let sink = Arc::new(RecordingSink::default());
        let handle = spawn_notifier(bus.subscribe(), sink.clone(), CancellationToken::new());

        bus.emit(DashboardEvent::Started {
            role: Role::Employer,
            operation: Operation::Fetch,
            joined: false,
        });
        bus.emit(DashboardEvent::Succeeded {
            role: Role::Employer,
            operation: Operation::Fetch,
        });
        drop(bus);
        handle.await.unwrap();

        let kinds: Vec<ToastKind> = sink.toasts().iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![ToastKind::Loading, ToastKind::Success]);
    }

    #[tokio::test]
    async fn test_shutdown_drains_queued_events() {
        let bus = EventBus::new();
        let sink = Arc::new(RecordingSink::default());
        let shutdown = CancellationToken::new();
        let handle = spawn_notifier(bus.subscribe(), sink.clone(), shutdown.clone());

        bus.emit(DashboardEvent::Started {
            role: Role::JobSeeker,
            operation: Operation::Fetch,
            joined: false,
        });
        bus.emit(DashboardEvent::Failed {
            role: Role::JobSeeker,
            operation: Operation::Fetch,
            category: "Server Error".to_string(),
            detail: "boom".to_string(),
        });
        shutdown.cancel();
        handle.await.unwrap();

        let toasts = sink.toasts();
        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts[1].kind, ToastKind::Error);
        assert_eq!(toasts[1].message, "Server Error: boom");
    }
}
