//! The update coordinator: refresh cycles, rotation state, and reads.
//!
//! One coordinator owns the four feed clients and the cached board state.
//! Two independent triggers drive it: the refresh trigger runs a full
//! fan-out/fan-in cycle across all four feeds and replaces the cache in one
//! step; the rotation trigger advances the headline pointer over the cached
//! set and performs no I/O. All reads are pure projections of the cache.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::{DateTime, Local, Timelike};
use tracing::{debug, error, info};

use crate::config::{
    AFTERNOON_REFRESH_HOUR, CoordinatorConfig, MORNING_REFRESH_HOUR, RefreshSchedule,
};
use crate::data_sources::{AirQualityClient, ExchangeRateClient, FuelPriceClient, HeadlineClient};
use crate::entity::{EntityKind, EntityState};
use crate::error::ConfigError;
use crate::model::{HeadlineSet, Snapshot, TickerView, UPDATE_TIME_FORMAT};
use crate::scheduler::{self, TriggerHandle};

/// Shared mutable board state. Replaced or advanced only under the write
/// lock, and never while holding the lock across an await point.
#[derive(Default)]
struct BoardState {
    snapshot: Option<Snapshot>,
    headline_set: HeadlineSet,
    rotation_index: usize,
    last_success: Option<DateTime<Local>>,
}

/// Coordinates the four feed clients, the cache, and the ticker rotation.
pub struct Coordinator {
    config: CoordinatorConfig,
    headlines: HeadlineClient,
    fuel: FuelPriceClient,
    exchange: ExchangeRateClient,
    air_quality: AirQualityClient,
    state: RwLock<BoardState>,
    /// Held for the duration of one refresh cycle; `try_lock` drops a
    /// trigger that fires while a cycle is already in flight.
    refresh_gate: tokio::sync::Mutex<()>,
    listeners: RwLock<Vec<Box<dyn Fn() + Send + Sync>>>,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig) -> Result<Self, ConfigError> {
        Self::with_base_url_internal(config, None)
    }

    /// Create a coordinator whose clients all target a custom base URL
    /// (for testing).
    pub fn with_base_url(config: CoordinatorConfig, base_url: &str) -> Result<Self, ConfigError> {
        Self::with_base_url_internal(config, Some(base_url))
    }

    fn with_base_url_internal(
        config: CoordinatorConfig,
        base_url: Option<&str>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let base_url = base_url.unwrap_or(crate::data_sources::API_BASE);
        let headlines = HeadlineClient::with_base_url(base_url, &config.api_key);
        let fuel = FuelPriceClient::with_base_url(base_url, &config.api_key, config.fuel_province);
        let exchange = ExchangeRateClient::with_base_url(base_url, &config.api_key);
        let air_quality =
            AirQualityClient::with_base_url(base_url, &config.api_key, &config.air_city);

        Ok(Coordinator {
            config,
            headlines,
            fuel,
            exchange,
            air_quality,
            state: RwLock::new(BoardState::default()),
            refresh_gate: tokio::sync::Mutex::new(()),
            listeners: RwLock::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Host-issued startup refresh; completes one full cycle before
    /// returning so the host can consider the board ready.
    pub async fn first_refresh(&self) {
        self.refresh().await;
    }

    /// Run one refresh cycle stamped with the current wall-clock time.
    pub async fn refresh(&self) {
        self.refresh_at(Local::now()).await;
    }

    /// Run one refresh cycle stamped with an explicit wall-clock time.
    ///
    /// A trigger that fires while another cycle is in flight is dropped; at
    /// most one cycle runs at a time. The rotation tick is never blocked by
    /// an in-flight cycle.
    pub async fn refresh_at(&self, now: DateTime<Local>) {
        let Ok(_guard) = self.refresh_gate.try_lock() else {
            debug!("refresh already in flight; trigger dropped");
            return;
        };
        self.run_cycle(now).await;
    }

    /// One fan-out/fan-in round across all four feeds.
    ///
    /// Individual fetch failures are already converted inside the clients
    /// and do not abort siblings. No per-fetch latency bound is imposed
    /// beyond the HTTP client defaults, so one hung upstream stalls this
    /// cycle until it resolves; the next scheduled trigger is the retry.
    async fn run_cycle(&self, now: DateTime<Local>) {
        let stamp = now.format(UPDATE_TIME_FORMAT).to_string();
        info!(last_update = %stamp, "starting refresh cycle");

        let headlines = tokio::spawn({
            let client = self.headlines.clone();
            async move { client.fetch().await }
        });
        let fuel = tokio::spawn({
            let client = self.fuel.clone();
            async move { client.fetch().await }
        });
        let exchange = tokio::spawn({
            let client = self.exchange.clone();
            async move { client.fetch().await }
        });
        let air_quality = tokio::spawn({
            let client = self.air_quality.clone();
            async move { client.fetch().await }
        });

        let joined = tokio::join!(headlines, fuel, exchange, air_quality);

        let (snapshot, wholesale_failure) = match joined {
            (Ok(headlines), Ok(fuel), Ok(exchange), Ok(air_quality)) => (
                Snapshot {
                    headlines,
                    fuel,
                    exchange,
                    air_quality,
                    last_update: stamp,
                },
                false,
            ),
            (headlines, fuel, exchange, air_quality) => {
                // A panic inside a fetch task surfaces as a join error here;
                // the cycle publishes a uniform failure record instead of
                // unwinding the trigger task or leaving stale data marked
                // current.
                let message = [
                    headlines.err(),
                    fuel.err(),
                    exchange.err(),
                    air_quality.err(),
                ]
                .into_iter()
                .flatten()
                .next()
                .map(|err| err.to_string())
                .unwrap_or_else(|| "refresh cycle failed".to_string());
                error!(error = %message, "refresh cycle failed wholesale");
                (Snapshot::failed(&message, stamp), true)
            }
        };

        let installed = snapshot
            .headlines
            .headline_payload()
            .map(|(set, pointer)| (set.clone(), pointer.saturating_sub(1)));

        {
            // Whole-record replace is the last step of the cycle; a
            // concurrent projection read sees either the previous record or
            // this one, never a mix.
            let mut state = self.write_state();
            if let Some((set, rotation_index)) = installed {
                state.headline_set = set;
                state.rotation_index = rotation_index;
            }
            state.snapshot = Some(snapshot);
            if !wholesale_failure {
                state.last_success = Some(now);
            }
        }

        self.notify_listeners();
        info!("refresh cycle complete");
    }

    /// Rotation tick: advance the headline pointer over the cached set and
    /// republish the cache unchanged. No I/O, never suspends; a tick over an
    /// empty set is a no-op.
    pub fn advance_ticker(&self) {
        let advanced = {
            let mut state = self.write_state();
            if state.headline_set.is_empty() {
                false
            } else {
                state.rotation_index = (state.rotation_index + 1) % state.headline_set.len();
                true
            }
        };

        if advanced {
            self.notify_listeners();
        }
    }

    /// Clone of the cached record, `None` before the first completed cycle.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.read_state().snapshot.clone()
    }

    /// Display projection of the cache plus the rotation pointer.
    pub fn ticker_view(&self) -> Option<TickerView> {
        let state = self.read_state();
        state
            .snapshot
            .as_ref()
            .map(|snapshot| TickerView::project(snapshot, &state.headline_set, state.rotation_index))
    }

    /// Readable state of one entity, `None` before the first completed cycle.
    pub fn entity_state(&self, kind: EntityKind) -> Option<EntityState> {
        let state = self.read_state();
        state.snapshot.as_ref().map(|snapshot| {
            EntityState::project(kind, snapshot, &state.headline_set, state.rotation_index)
        })
    }

    /// Wall-clock time of the last cycle that did not fail wholesale.
    pub fn last_success(&self) -> Option<DateTime<Local>> {
        self.read_state().last_success
    }

    /// Current 0-based rotation index.
    pub fn rotation_index(&self) -> usize {
        self.read_state().rotation_index
    }

    /// Register a callback invoked after every cache replace and every
    /// effective rotation tick.
    pub fn on_update(&self, listener: impl Fn() + Send + Sync + 'static) {
        self.write_listeners().push(Box::new(listener));
    }

    fn notify_listeners(&self) {
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        for listener in listeners.iter() {
            listener();
        }
    }

    /// Wire the configured triggers and return their unsubscribe handles.
    ///
    /// Dropping or cancelling the handles tears the timers down; an
    /// in-flight refresh is left to complete and its result is simply never
    /// re-scheduled.
    pub fn start(self: &Arc<Self>) -> Vec<TriggerHandle> {
        let mut handles = Vec::new();

        let coordinator = Arc::clone(self);
        handles.push(scheduler::spawn_interval(
            Duration::from_secs(self.config.rotation_secs),
            move || {
                let coordinator = Arc::clone(&coordinator);
                async move { coordinator.advance_ticker() }
            },
        ));

        match self.config.schedule {
            RefreshSchedule::TwiceDaily => {
                for hour in [MORNING_REFRESH_HOUR, AFTERNOON_REFRESH_HOUR] {
                    let coordinator = Arc::clone(self);
                    handles.push(scheduler::spawn_daily(hour, 0, move || {
                        let coordinator = Arc::clone(&coordinator);
                        async move { coordinator.refresh().await }
                    }));
                }

                if needs_startup_refresh(Local::now(), self.last_success()) {
                    info!("started mid-window; backfilling today's scheduled refresh");
                    let coordinator = Arc::clone(self);
                    tokio::spawn(async move { coordinator.refresh().await });
                }
            }
            RefreshSchedule::Interval { minutes } => {
                let coordinator = Arc::clone(self);
                handles.push(scheduler::spawn_interval(
                    Duration::from_secs(minutes * 60),
                    move || {
                        let coordinator = Arc::clone(&coordinator);
                        async move { coordinator.refresh().await }
                    },
                ));
            }
        }

        handles
    }

    fn read_state(&self) -> RwLockReadGuard<'_, BoardState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, BoardState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_listeners(&self) -> RwLockWriteGuard<'_, Vec<Box<dyn Fn() + Send + Sync>>> {
        self.listeners.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Whether a process starting now should back-fill a missed scheduled
/// refresh: inside the 07:00–16:00 window with no successful refresh yet
/// today, or past 16:00 with no post-16:00 refresh yet today.
pub fn needs_startup_refresh(
    now: DateTime<Local>,
    last_success: Option<DateTime<Local>>,
) -> bool {
    let hour = now.hour();
    if hour < MORNING_REFRESH_HOUR {
        return false;
    }

    let Some(previous) = last_success else {
        return true;
    };
    if previous.date_naive() < now.date_naive() {
        return true;
    }

    hour >= AFTERNOON_REFRESH_HOUR && previous.hour() < AFTERNOON_REFRESH_HOUR
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::Map;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::model::FetchResult;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn test_coordinator() -> Coordinator {
        Coordinator::new(CoordinatorConfig::new("test-key")).unwrap()
    }

    fn install_headlines(coordinator: &Coordinator, texts: &[&str], index: usize) {
        let set = HeadlineSet::new(texts.iter().map(|t| t.to_string()).collect());
        let mut state = coordinator.write_state();
        state.snapshot = Some(Snapshot {
            headlines: FetchResult::headline_success("📰头条：x", Map::new(), set.clone(), 1),
            fuel: FetchResult::success("fuel", Map::new()),
            exchange: FetchResult::success("rate", Map::new()),
            air_quality: FetchResult::success("air", Map::new()),
            last_update: "2024-01-01 07:00".to_string(),
        });
        state.headline_set = set;
        state.rotation_index = index;
    }

    #[test]
    fn rotation_returns_to_start_after_full_cycle() {
        let coordinator = test_coordinator();
        install_headlines(&coordinator, &["a", "b", "c"], 1);

        for _ in 0..3 {
            coordinator.advance_ticker();
        }

        assert_eq!(coordinator.rotation_index(), 1);
    }

    #[test]
    fn rotation_tick_on_empty_set_is_a_noop() {
        let coordinator = test_coordinator();
        let notified = Arc::new(AtomicUsize::new(0));
        {
            let notified = Arc::clone(&notified);
            coordinator.on_update(move || {
                notified.fetch_add(1, Ordering::SeqCst);
            });
        }

        coordinator.advance_ticker();

        assert_eq!(coordinator.rotation_index(), 0);
        assert_eq!(notified.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn effective_tick_republishes_the_cache() {
        let coordinator = test_coordinator();
        install_headlines(&coordinator, &["a", "b"], 0);

        let notified = Arc::new(AtomicUsize::new(0));
        {
            let notified = Arc::clone(&notified);
            coordinator.on_update(move || {
                notified.fetch_add(1, Ordering::SeqCst);
            });
        }

        coordinator.advance_ticker();

        assert_eq!(coordinator.rotation_index(), 1);
        assert_eq!(notified.load(Ordering::SeqCst), 1);

        // The cache itself is untouched by a tick.
        let snapshot = coordinator.snapshot().unwrap();
        assert_eq!(snapshot.last_update, "2024-01-01 07:00");
    }

    #[test]
    fn no_backfill_before_the_morning_window() {
        assert!(!needs_startup_refresh(local(2024, 1, 2, 6, 59), None));
    }

    #[test]
    fn backfill_inside_window_without_a_refresh_today() {
        let now = local(2024, 1, 2, 9, 0);
        assert!(needs_startup_refresh(now, None));
        assert!(needs_startup_refresh(now, Some(local(2024, 1, 1, 9, 0))));
        assert!(!needs_startup_refresh(now, Some(local(2024, 1, 2, 7, 0))));
    }

    #[test]
    fn backfill_after_sixteen_without_an_afternoon_refresh() {
        let now = local(2024, 1, 2, 18, 0);
        assert!(needs_startup_refresh(now, None));
        assert!(needs_startup_refresh(now, Some(local(2024, 1, 2, 7, 5))));
        assert!(!needs_startup_refresh(now, Some(local(2024, 1, 2, 16, 0))));
    }

    #[test]
    fn ticker_view_is_none_before_the_first_cycle() {
        let coordinator = test_coordinator();
        assert!(coordinator.ticker_view().is_none());
        assert!(coordinator.snapshot().is_none());
        assert!(coordinator.entity_state(EntityKind::Ticker).is_none());
    }
}
