//! Interval and daily wall-clock trigger primitives.
//!
//! The coordinator consumes these through plain functions returning an
//! unsubscribe handle; any host with a tokio runtime can drive them. The
//! fast rotation trigger and the refresh triggers are independent timers
//! and never block each other.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate};
use tokio::task::JoinHandle;
use tracing::debug;

/// Unsubscribe handle for one trigger.
///
/// Cancelling (or dropping) the handle stops the timer; a callback already
/// in flight is not interrupted.
pub struct TriggerHandle {
    task: JoinHandle<()>,
}

impl TriggerHandle {
    pub fn cancel(&self) {
        self.task.abort();
    }
}

impl Drop for TriggerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Run `callback` every `period`, first firing one full period from now.
pub fn spawn_interval<F, Fut>(period: Duration, callback: F) -> TriggerHandle
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // The first tick of a tokio interval completes immediately; consume
        // it so the trigger fires one full period from now.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            callback().await;
        }
    });

    TriggerHandle { task }
}

/// Run `callback` at HH:MM local time every day.
pub fn spawn_daily<F, Fut>(hour: u32, minute: u32, callback: F) -> TriggerHandle
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    let task = tokio::spawn(async move {
        loop {
            let now = Local::now();
            let next = next_daily_occurrence(now, hour, minute);
            let sleep_for = (next - now).to_std().unwrap_or(Duration::ZERO);
            debug!(at = %next, "sleeping until the next daily trigger");
            tokio::time::sleep(sleep_for).await;
            callback().await;
        }
    });

    TriggerHandle { task }
}

/// The next strictly-future occurrence of HH:MM local time.
///
/// An HH:MM that does not exist on a given day (a DST jump) resolves to the
/// following day's occurrence.
pub fn next_daily_occurrence(now: DateTime<Local>, hour: u32, minute: u32) -> DateTime<Local> {
    let at = |date: NaiveDate| {
        date.and_hms_opt(hour, minute, 0)
            .and_then(|naive| naive.and_local_timezone(Local).earliest())
    };

    match at(now.date_naive()) {
        Some(today) if today > now => today,
        _ => at(now.date_naive() + chrono::Duration::days(1))
            .unwrap_or_else(|| now + chrono::Duration::days(1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn occurrence_later_today_when_time_not_passed() {
        let now = Local.with_ymd_and_hms(2024, 1, 2, 6, 30, 0).unwrap();
        let next = next_daily_occurrence(now, 7, 0);
        assert_eq!(next, Local.with_ymd_and_hms(2024, 1, 2, 7, 0, 0).unwrap());
    }

    #[test]
    fn occurrence_rolls_to_tomorrow_when_passed() {
        let now = Local.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap();
        let next = next_daily_occurrence(now, 7, 0);
        assert_eq!(next, Local.with_ymd_and_hms(2024, 1, 3, 7, 0, 0).unwrap());
    }

    #[test]
    fn occurrence_at_the_exact_minute_rolls_over() {
        let now = Local.with_ymd_and_hms(2024, 1, 2, 16, 0, 0).unwrap();
        let next = next_daily_occurrence(now, 16, 0);
        assert_eq!(next, Local.with_ymd_and_hms(2024, 1, 3, 16, 0, 0).unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn interval_trigger_fires_until_cancelled() {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = spawn_interval(Duration::from_secs(10), {
            let count = Arc::clone(&count);
            move || {
                let count = Arc::clone(&count);
                async move {
                    count.fetch_add(1, Ordering::SeqCst);
                }
            }
        });

        tokio::time::sleep(Duration::from_secs(35)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);

        handle.cancel();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_the_trigger() {
        let count = Arc::new(AtomicUsize::new(0));
        {
            let _handle = spawn_interval(Duration::from_secs(10), {
                let count = Arc::clone(&count);
                move || {
                    let count = Arc::clone(&count);
                    async move {
                        count.fetch_add(1, Ordering::SeqCst);
                    }
                }
            });
        }

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
