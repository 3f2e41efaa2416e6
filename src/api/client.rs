//! Dashboard API client with TTL cache and in-flight de-duplication
//!
//! A [`DashboardClient`] is the single point of contact with one role's
//! dashboard endpoint. It answers from its cache while the cached response is
//! fresh, shares one network request between concurrent callers, and
//! publishes lifecycle events for the presentation layer.

use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::classify::TransportFailure;
use super::envelope::{self, ApiResponse};
use super::error::DashboardError;
use super::transport::HttpTransport;
use crate::cache::{CacheManager, CachedData, Clock, SystemClock};
use crate::config::ClientConfig;
use crate::data::{DashboardPayload, EmployerDashboard, JobSeekerDashboard};
use crate::events::{DashboardEvent, EventBus, Operation};

/// Key of the single cached dashboard response per client
const CACHE_KEY: &str = "complete";

/// Path of the backend health probe
const HEALTH_PATH: &str = "/health";

type FetchResult<P> = Result<ApiResponse<P>, DashboardError>;
type FetchFuture<P> = BoxFuture<'static, FetchResult<P>>;

/// A network fetch other callers may join
struct InFlight<P> {
    generation: u64,
    /// Weak so that a fetch nobody awaits any more is dropped with its request
    handle: WeakShared<FetchFuture<P>>,
}

/// Client for one role's dashboard endpoint
pub struct DashboardClient<P> {
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
    cache: CacheManager<ApiResponse<P>>,
    in_flight: Mutex<HashMap<&'static str, InFlight<P>>>,
    next_generation: AtomicU64,
    events: EventBus,
}

/// Client for `/api/jobseeker/dashboard`
pub type JobSeekerDashboardClient = DashboardClient<JobSeekerDashboard>;

/// Client for `/api/employer/dashboard`
pub type EmployerDashboardClient = DashboardClient<EmployerDashboard>;

impl<P: DashboardPayload> DashboardClient<P> {
    /// Creates a client using the wall clock
    pub fn new(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self::with_clock(config, transport, Arc::new(SystemClock))
    }

    /// Creates a client judging cache freshness with `clock`
    pub fn with_clock(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = CacheManager::new(clock, config.cache_ttl);
        Self {
            config,
            transport,
            cache,
            in_flight: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(0),
            events: EventBus::new(),
        }
    }

    /// Subscribes to fetch lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    /// Returns the dashboard, from cache when fresh unless `force_refresh` is set
    ///
    /// # Returns
    /// * `Ok(ApiResponse)` - A validated response with populated `data`
    /// * `Err(DashboardError)` - Configuration, validation or request failure;
    ///   the cache is left untouched
    pub async fn get_dashboard_data(&self, force_refresh: bool) -> FetchResult<P> {
        self.load(force_refresh, Operation::Fetch, &CancellationToken::new())
            .await
    }

    /// Like [`Self::get_dashboard_data`], abandoning the wait when `cancel` fires
    ///
    /// A cancelled call returns [`DashboardError::Cancelled`] and never writes
    /// the cache.
    pub async fn get_dashboard_data_cancellable(
        &self,
        force_refresh: bool,
        cancel: &CancellationToken,
    ) -> FetchResult<P> {
        self.load(force_refresh, Operation::Fetch, cancel).await
    }

    /// Clears the cache and fetches a new response
    pub async fn refresh_dashboard(&self) -> FetchResult<P> {
        self.refresh_dashboard_cancellable(&CancellationToken::new())
            .await
    }

    /// Cancellable variant of [`Self::refresh_dashboard`]
    pub async fn refresh_dashboard_cancellable(&self, cancel: &CancellationToken) -> FetchResult<P> {
        self.clear_cache();
        self.load(true, Operation::Refresh, cancel).await
    }

    /// Returns the cached response if it is still within the TTL
    ///
    /// Never touches the network.
    pub fn get_cached_data(&self) -> Option<ApiResponse<P>> {
        self.cache.read_fresh(CACHE_KEY)
    }

    /// Returns the cached response regardless of age, with its timestamp and
    /// staleness
    pub fn cached_snapshot(&self) -> Option<CachedData<ApiResponse<P>>> {
        self.cache.read(CACHE_KEY)
    }

    /// True if nothing is cached or the cached response has expired
    pub fn is_data_stale(&self) -> bool {
        self.cache.is_stale(CACHE_KEY)
    }

    /// Discards the cached response
    pub fn clear_cache(&self) {
        debug!(event = "dashboard.cache_cleared", role = %P::ROLE);
        self.cache.clear(CACHE_KEY);
    }

    async fn load(
        &self,
        force_refresh: bool,
        operation: Operation,
        cancel: &CancellationToken,
    ) -> FetchResult<P> {
        let role = P::ROLE;

        if !force_refresh {
            if let Some(response) = self.cache.read_fresh(CACHE_KEY) {
                debug!(event = "dashboard.cache_hit", role = %role);
                return Ok(response);
            }
        }

        let Some(url) = self.config.endpoint(role.dashboard_path()) else {
            let error = DashboardError::Configuration("backend URL is not configured".to_string());
            self.events.emit(DashboardEvent::Started {
                role,
                operation,
                joined: false,
            });
            self.report_failure(operation, &error);
            return Err(error);
        };

        let (generation, fetch, joined) = self.join_or_start(url);
        self.events.emit(DashboardEvent::Started {
            role,
            operation,
            joined,
        });

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(DashboardError::Cancelled),
            result = fetch => result,
        };

        match &outcome {
            Ok(response) => {
                self.finish(generation);
                let stored = self.cache.write(CACHE_KEY, response.clone(), generation);
                info!(
                    event = "dashboard.fetch_completed",
                    role = %role,
                    generation,
                    joined,
                    stored,
                );
                self.events.emit(DashboardEvent::Succeeded { role, operation });
            }
            Err(DashboardError::Cancelled) => {
                debug!(event = "dashboard.fetch_cancelled", role = %role, generation);
                self.events.emit(DashboardEvent::Cancelled { role, operation });
            }
            Err(error) => {
                self.finish(generation);
                self.report_failure(operation, error);
            }
        }

        outcome
    }

    fn report_failure(&self, operation: Operation, error: &DashboardError) {
        warn!(
            event = "dashboard.fetch_failed",
            role = %P::ROLE,
            category = error.category_title(),
            error = %error,
        );
        self.events.emit(DashboardEvent::Failed {
            role: P::ROLE,
            operation,
            category: error.category_title().to_string(),
            detail: error.detail(),
        });
    }

    /// Returns the in-flight fetch for the cache key, starting one if needed
    fn join_or_start(&self, url: String) -> (u64, Shared<FetchFuture<P>>, bool) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(entry) = in_flight.get(CACHE_KEY) {
            if let Some(fetch) = entry.handle.upgrade() {
                return (entry.generation, fetch, true);
            }
        }

        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let fetch = request::<P>(Arc::clone(&self.transport), url, self.config.fetch_timeout)
            .boxed()
            .shared();

        match fetch.downgrade() {
            Some(handle) => {
                in_flight.insert(CACHE_KEY, InFlight { generation, handle });
            }
            None => {
                in_flight.remove(CACHE_KEY);
            }
        }

        (generation, fetch, false)
    }

    /// Forgets the in-flight fetch of `generation` once it has settled
    fn finish(&self, generation: u64) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if in_flight
            .get(CACHE_KEY)
            .is_some_and(|entry| entry.generation == generation)
        {
            in_flight.remove(CACHE_KEY);
        }
    }
}

impl DashboardClient<EmployerDashboard> {
    /// Probes the backend's health endpoint
    ///
    /// Any 200 response counts as healthy. Every failure, including a missing
    /// backend URL, yields `false`.
    pub async fn check_api_health(&self) -> bool {
        let Some(url) = self.config.endpoint(HEALTH_PATH) else {
            warn!(event = "dashboard.health_check_skipped", reason = "backend URL is not configured");
            return false;
        };

        let timeout = self.config.health_timeout;
        match tokio::time::timeout(timeout, self.transport.get(&url, timeout)).await {
            Ok(Ok(response)) => {
                debug!(event = "dashboard.health_checked", status = response.status);
                response.status == 200
            }
            Ok(Err(failure)) => {
                debug!(event = "dashboard.health_check_failed", ?failure);
                false
            }
            Err(_) => {
                debug!(event = "dashboard.health_check_failed", failure = "timeout");
                false
            }
        }
    }
}

/// Performs one GET and validates the envelope
async fn request<P: DashboardPayload>(
    transport: Arc<dyn HttpTransport>,
    url: String,
    timeout: Duration,
) -> FetchResult<P> {
    debug!(event = "dashboard.request_started", %url);

    let response = match tokio::time::timeout(timeout, transport.get(&url, timeout)).await {
        Ok(Ok(response)) => response,
        Ok(Err(failure)) => return Err(DashboardError::from_failure(&failure)),
        Err(_) => return Err(DashboardError::from_failure(&TransportFailure::Timeout)),
    };

    envelope::decode::<P>(response.status, &response.body)
}
