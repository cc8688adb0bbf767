//! Wake-up recovery background task
//!
//! tokio timers follow the monotonic clock, which stands still while the
//! machine is suspended. After a resume the daily wake-up would fire late by
//! the time spent asleep, so the schedule is recomputed from the wall clock.

use std::{sync::Arc, time::Duration};
use tokio::time::{interval, Instant};
use tracing::{debug, info};

use crate::{engine::Clock, state::AppState};

/// How often wall-clock and monotonic progress are compared
pub const CHECK_INTERVAL: Duration = Duration::from_secs(15);

/// Wall-clock lead over monotonic time that counts as a suspend
const SLEEP_GAP_SECS: i64 = 60;

/// Whether the wall clock ran ahead of the monotonic clock by more than a
/// minute, i.e. the machine was asleep in between.
pub fn slept_through(wall_elapsed: chrono::Duration, monotonic_elapsed: Duration) -> bool {
    let monotonic =
        chrono::Duration::from_std(monotonic_elapsed).unwrap_or_else(|_| chrono::Duration::zero());
    wall_elapsed - monotonic > chrono::Duration::seconds(SLEEP_GAP_SECS)
}

/// Background task that detects system wake-up and reschedules auto-sleep
pub async fn wake_up_recovery_task(state: Arc<AppState>, clock: Arc<dyn Clock>) {
    info!("Starting wake-up recovery task");

    let mut interval = interval(CHECK_INTERVAL);
    let mut last_wall = clock.now();
    let mut last_monotonic = Instant::now();

    loop {
        interval.tick().await;

        let wall = clock.now();
        let monotonic = Instant::now();
        let wall_elapsed = wall - last_wall;
        let monotonic_elapsed = monotonic - last_monotonic;
        last_wall = wall;
        last_monotonic = monotonic;

        if !slept_through(wall_elapsed, monotonic_elapsed) {
            continue;
        }

        info!(
            "System wake-up detected (wall clock ahead by {}s), rescheduling auto-sleep",
            wall_elapsed.num_seconds() - monotonic_elapsed.as_secs() as i64
        );
        match state.scheduler.reschedule() {
            Some(plan) => debug!("Rescheduled after wake-up: {:?}", plan),
            None => debug!("Auto-sleep disabled, nothing to reschedule"),
        }
    }
}
