//! Dashboard state container bound to a view's lifetime
//!
//! A [`DashboardHook`] binds a [`DashboardClient`] to the state a view renders:
//! `data`, `loading`, `error` and `last_updated`. Mounting shows any cached
//! response at once (even an expired one) and revalidates it in the
//! background; auto-refresh re-polls the backend on an interval while the view
//! is visible. Dropping or unmounting the hook cancels everything it
//! started.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::{ApiResponse, DashboardClient, DashboardError};
use crate::data::DashboardPayload;

/// Coarse state of a hook, derived from [`HookState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing loaded and nothing in progress
    Idle,
    /// A foreground fetch is running
    Loading,
    /// Data is shown and the last fetch succeeded
    Loaded,
    /// The last fetch failed
    Errored,
}

/// What a view renders
#[derive(Debug, Clone, PartialEq)]
pub struct HookState<P> {
    pub data: Option<P>,
    pub loading: bool,
    /// Description of the last failure, cleared by the next success
    pub error: Option<String>,
    /// When the shown data was stored by the client
    pub last_updated: Option<DateTime<Utc>>,
}

impl<P> Default for HookState<P> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
            last_updated: None,
        }
    }
}

impl<P> HookState<P> {
    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Errored
        } else if self.data.is_some() {
            Phase::Loaded
        } else {
            Phase::Idle
        }
    }

    /// True when the view should offer an inline retry: a failure and no data
    /// ever loaded
    pub fn show_retry_panel(&self) -> bool {
        self.error.is_some() && self.data.is_none()
    }
}

/// Whether the hosting view is currently visible to the user
#[derive(Debug, Clone)]
pub struct Visibility {
    receiver: watch::Receiver<bool>,
}

impl Visibility {
    /// A view that is always visible (e.g. a foreground terminal)
    pub fn always_visible() -> Self {
        let (_, receiver) = watch::channel(true);
        Self { receiver }
    }

    /// Creates a visibility flag controlled through the returned sender
    pub fn channel(initially_visible: bool) -> (watch::Sender<bool>, Self) {
        let (sender, receiver) = watch::channel(initially_visible);
        (sender, Self { receiver })
    }

    pub fn is_visible(&self) -> bool {
        *self.receiver.borrow()
    }
}

/// Options for [`DashboardHook::mount`]
#[derive(Debug, Clone, Default)]
pub struct HookOptions {
    /// Poll the backend this often while visible, bypassing the cache
    pub auto_refresh: Option<Duration>,
}

struct HookInner<P> {
    client: Arc<DashboardClient<P>>,
    state: watch::Sender<HookState<P>>,
    cancel: CancellationToken,
}

impl<P: DashboardPayload> HookInner<P> {
    /// Fetch that shows the loading state until it resolves
    async fn foreground(&self, refresh: bool) {
        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let result = if refresh {
            self.client.refresh_dashboard_cancellable(&self.cancel).await
        } else {
            self.client
                .get_dashboard_data_cancellable(false, &self.cancel)
                .await
        };
        self.apply(result, true);
    }

    /// Fetch that leaves the loading state alone; shown data stays visible
    ///
    /// `force` bypasses the cache, so a poll reaches the backend even while the
    /// cached response is fresh.
    async fn background(&self, force: bool) {
        let result = self
            .client
            .get_dashboard_data_cancellable(force, &self.cancel)
            .await;
        self.apply(result, false);
    }

    fn apply(&self, result: Result<ApiResponse<P>, DashboardError>, foreground: bool) {
        match result {
            Err(DashboardError::Cancelled) => {}
            Ok(response) => {
                let stored_at = self
                    .client
                    .cached_snapshot()
                    .map(|cached| cached.cached_at)
                    .unwrap_or_else(Utc::now);
                self.state.send_modify(|state| {
                    state.data = response.data;
                    state.error = None;
                    state.last_updated = Some(stored_at);
                    if foreground {
                        state.loading = false;
                    }
                });
            }
            Err(error) => {
                self.state.send_modify(|state| {
                    state.error = Some(error.to_string());
                    if foreground {
                        state.loading = false;
                    }
                });
            }
        }
    }
}

/// Live dashboard state for one view
pub struct DashboardHook<P> {
    inner: Arc<HookInner<P>>,
}

impl<P: DashboardPayload> DashboardHook<P> {
    /// Mounts a hook, spawning its initial fetch and auto-refresh tasks
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Behavior
    /// - Cached response within TTL: shown immediately, no fetch
    /// - Expired cached response: shown immediately, one background fetch
    /// - Nothing cached: loading state and a foreground fetch
    pub fn mount(
        client: Arc<DashboardClient<P>>,
        options: HookOptions,
        visibility: Visibility,
    ) -> Self {
        let snapshot = client.cached_snapshot();
        let expired = snapshot.as_ref().map(|cached| cached.is_expired);

        let initial = match snapshot {
            Some(cached) => HookState {
                data: cached.data.data,
                loading: false,
                error: None,
                last_updated: Some(cached.cached_at),
            },
            None => HookState {
                loading: true,
                ..Default::default()
            },
        };

        let (state, _) = watch::channel(initial);
        let inner = Arc::new(HookInner {
            client,
            state,
            cancel: CancellationToken::new(),
        });

        match expired {
            Some(false) => {
                debug!(event = "dashboard.hook_mounted", role = %P::ROLE, cache = "fresh");
            }
            Some(true) => {
                debug!(event = "dashboard.hook_mounted", role = %P::ROLE, cache = "stale");
                let task = Arc::clone(&inner);
                tokio::spawn(async move { task.background(false).await });
            }
            None => {
                debug!(event = "dashboard.hook_mounted", role = %P::ROLE, cache = "empty");
                let task = Arc::clone(&inner);
                tokio::spawn(async move { task.foreground(false).await });
            }
        }

        if let Some(every) = options.auto_refresh {
            tokio::spawn(auto_refresh(Arc::clone(&inner), every, visibility));
        }

        Self { inner }
    }

    /// Current state snapshot
    pub fn state(&self) -> HookState<P> {
        self.inner.state.borrow().clone()
    }

    /// Observes state changes
    pub fn subscribe(&self) -> watch::Receiver<HookState<P>> {
        self.inner.state.subscribe()
    }

    /// Forces a refresh that bypasses the cache, showing the loading state
    pub async fn refetch(&self) {
        self.inner.foreground(true).await;
    }

    /// Waits until no foreground fetch is running and returns the state
    pub async fn settled(&self) -> HookState<P> {
        let mut receiver = self.inner.state.subscribe();
        let settled = match receiver.wait_for(|state| !state.loading).await {
            Ok(state) => Some(state.clone()),
            Err(_) => None,
        };
        settled.unwrap_or_else(|| self.state())
    }

    /// Tears the hook down, cancelling in-flight fetches and auto-refresh
    pub fn unmount(self) {}
}

impl<P> Drop for DashboardHook<P> {
    fn drop(&mut self) {
        self.inner.cancel.cancel();
    }
}

async fn auto_refresh<P: DashboardPayload>(
    inner: Arc<HookInner<P>>,
    every: Duration,
    visibility: Visibility,
) {
    let mut interval = tokio::time::interval(every);
    // Skip the first tick (immediate)
    interval.tick().await;

    loop {
        tokio::select! {
            _ = inner.cancel.cancelled() => {
                debug!(event = "dashboard.auto_refresh_stopped", role = %P::ROLE);
                break;
            }
            _ = interval.tick() => {
                if !visibility.is_visible() {
                    debug!(event = "dashboard.auto_refresh_skipped", reason = "hidden");
                    continue;
                }
                let loaded = inner.state.borrow().last_updated.is_some();
                if !loaded {
                    debug!(event = "dashboard.auto_refresh_skipped", reason = "not_loaded");
                    continue;
                }
                info!(event = "dashboard.auto_refresh", role = %P::ROLE);
                inner.background(true).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{HttpResponse, HttpTransport, TransportFailure};
    use crate::cache::ManualClock;
    use crate::config::ClientConfig;
    use crate::data::EmployerDashboard;
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct QueueTransport {
        responses: Mutex<VecDeque<(u16, String)>>,
        calls: AtomicUsize,
        delay: Option<Duration>,
    }

    impl QueueTransport {
        fn new(responses: &[(u16, &str)]) -> Self {
            Self {
                responses: Mutex::new(
                    responses
                        .iter()
                        .map(|(status, body)| (*status, body.to_string()))
                        .collect(),
                ),
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HttpTransport for QueueTransport {
        async fn get(&self, _url: &str, _timeout: Duration) -> Result<HttpResponse, TransportFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.responses.lock().unwrap().pop_front();
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            next.map(|(status, body)| HttpResponse { status, body })
                .ok_or_else(|| TransportFailure::NoResponse("script exhausted".into()))
        }
    }

    fn jobs_body(total_jobs: u64) -> String {
        format!(
            r#"{{"success": true, "data": {{"stats": {{"totalJobs": {}}}}}}}"#,
            total_jobs
        )
    }

    fn setup(
        transport: QueueTransport,
    ) -> (Arc<DashboardClient<EmployerDashboard>>, Arc<QueueTransport>, Arc<ManualClock>) {
        let transport = Arc::new(transport);
        let clock = Arc::new(ManualClock::default());
        let client = Arc::new(DashboardClient::with_clock(
            ClientConfig::with_backend_url("http://backend.test"),
            transport.clone(),
            clock.clone(),
        ));
        (client, transport, clock)
    }

    fn total_jobs(state: &HookState<EmployerDashboard>) -> Option<u64> {
        state.data.as_ref().map(|data| data.stats.total_jobs)
    }

    #[test]
    fn test_phase_derivation() {
        let mut state: HookState<EmployerDashboard> = HookState::default();
        assert_eq!(state.phase(), Phase::Idle);

        state.loading = true;
        assert_eq!(state.phase(), Phase::Loading);

        state.loading = false;
        state.error = Some("Server Error: boom".into());
        assert_eq!(state.phase(), Phase::Errored);
        assert!(state.show_retry_panel());

        state.data = Some(EmployerDashboard::default());
        assert!(!state.show_retry_panel());

        state.error = None;
        assert_eq!(state.phase(), Phase::Loaded);
    }

    #[tokio::test]
    async fn test_cold_mount_loads_in_foreground() {
        let body = jobs_body(4);
        let (client, transport, _clock) = setup(QueueTransport::new(&[(200, body.as_str())]));

        let hook = DashboardHook::mount(client, HookOptions::default(), Visibility::always_visible());
        assert!(hook.state().loading);

        let state = hook.settled().await;
        assert_eq!(state.phase(), Phase::Loaded);
        assert_eq!(total_jobs(&state), Some(4));
        assert!(state.error.is_none());
        assert!(state.last_updated.is_some());
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_fresh_cache_mounts_without_fetch() {
        let body = jobs_body(2);
        let (client, transport, _clock) = setup(QueueTransport::new(&[(200, body.as_str())]));
        client.get_dashboard_data(false).await.unwrap();

        let hook = DashboardHook::mount(client, HookOptions::default(), Visibility::always_visible());
        let state = hook.state();

        assert!(!state.loading);
        assert_eq!(total_jobs(&state), Some(2));
        tokio::task::yield_now().await;
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_stale_cache_is_shown_and_revalidated_once() {
        let first = jobs_body(1);
        let second = jobs_body(2);
        let (client, transport, clock) =
            setup(QueueTransport::new(&[(200, first.as_str()), (200, second.as_str())]));
        client.get_dashboard_data(false).await.unwrap();
        clock.advance(ChronoDuration::minutes(6));

        let hook = DashboardHook::mount(client, HookOptions::default(), Visibility::always_visible());
        let mut receiver = hook.subscribe();

        let immediate = hook.state();
        assert!(!immediate.loading, "no loading flicker");
        assert_eq!(total_jobs(&immediate), Some(1));

        let revalidated = receiver
            .wait_for(|state| state.data.as_ref().map(|d| d.stats.total_jobs) == Some(2))
            .await
            .unwrap()
            .clone();
        assert!(!revalidated.loading);
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_first_load_failure_shows_error() {
        let (client, _transport, _clock) =
            setup(QueueTransport::new(&[(500, r#"{"success": false, "message": "boom"}"#)]));

        let hook = DashboardHook::mount(client, HookOptions::default(), Visibility::always_visible());
        let state = hook.settled().await;

        assert_eq!(state.phase(), Phase::Errored);
        assert!(state.error.as_deref().unwrap().contains("Server Error"));
        assert!(state.data.is_none());
        assert!(state.show_retry_panel());
    }

    #[tokio::test]
    async fn test_refetch_bypasses_cache_and_keeps_data_on_failure() {
        let body = jobs_body(3);
        let (client, transport, _clock) = setup(QueueTransport::new(&[
            (200, body.as_str()),
            (429, r#"{"success": false}"#),
        ]));

        let hook = DashboardHook::mount(client, HookOptions::default(), Visibility::always_visible());
        hook.settled().await;

        hook.refetch().await;
        let state = hook.state();

        assert_eq!(transport.calls(), 2);
        assert!(!state.loading);
        assert!(state.error.as_deref().unwrap().starts_with("Rate Limit Exceeded"));
        assert_eq!(total_jobs(&state), Some(3), "previous data stays visible");
        assert!(!state.show_retry_panel());
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_refresh_only_while_visible() {
        let first = jobs_body(1);
        let second = jobs_body(2);
        let (client, transport, _clock) =
            setup(QueueTransport::new(&[(200, first.as_str()), (200, second.as_str())]));
        let (visible, visibility) = Visibility::channel(false);

        let hook = DashboardHook::mount(
            client,
            HookOptions {
                auto_refresh: Some(Duration::from_secs(60)),
            },
            visibility,
        );
        hook.settled().await;

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(transport.calls(), 1, "hidden view is not polled");

        visible.send(true).unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(transport.calls(), 2);
        assert_eq!(total_jobs(&hook.state()), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_refresh_polls_within_ttl() {
        let bodies: Vec<String> = (1..=4).map(jobs_body).collect();
        let script: Vec<(u16, &str)> = bodies.iter().map(|b| (200, b.as_str())).collect();
        let (client, transport, _clock) = setup(QueueTransport::new(&script));

        let hook = DashboardHook::mount(
            client,
            HookOptions {
                auto_refresh: Some(Duration::from_secs(30)),
            },
            Visibility::always_visible(),
        );
        hook.settled().await;
        assert_eq!(transport.calls(), 1);

        tokio::time::sleep(Duration::from_secs(95)).await;

        assert_eq!(transport.calls(), 4, "one call per tick while the cache is fresh");
        let state = hook.state();
        assert_eq!(total_jobs(&state), Some(4));
        assert!(!state.loading, "polling never shows the loading state");
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_refresh_waits_for_initial_load() {
        let (client, transport, _clock) =
            setup(QueueTransport::new(&[(503, r#"{"success": false}"#)]));

        let hook = DashboardHook::mount(
            client,
            HookOptions {
                auto_refresh: Some(Duration::from_secs(30)),
            },
            Visibility::always_visible(),
        );
        hook.settled().await;

        tokio::time::sleep(Duration::from_secs(95)).await;
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_cancels_fetch_without_caching() {
        let body = jobs_body(9);
        let mut transport = QueueTransport::new(&[(200, body.as_str())]);
        transport.delay = Some(Duration::from_millis(200));
        let (client, _transport, _clock) = setup(transport);

        let hook = DashboardHook::mount(
            Arc::clone(&client),
            HookOptions::default(),
            Visibility::always_visible(),
        );
        let receiver = hook.subscribe();

        tokio::time::sleep(Duration::from_millis(50)).await;
        hook.unmount();
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert!(client.cached_snapshot().is_none());
        assert!(receiver.borrow().data.is_none());
    }
}
