//! Daily auto-sleep scheduler
//!
//! Applies a [`SleepSettings`] snapshot: arms the countdown right away when
//! the target is inside the lead window, otherwise registers a wake-up task
//! that fires `lead` minutes before the target and every 24 hours after.
//! The wake-up can only be replaced as a whole, by `configure`, or dropped by
//! `cancel`. A countdown the scheduler armed belongs to the schedule: it is
//! stopped when the schedule is replaced, and when a reschedule finds its
//! target already behind the clock.

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant},
};
use tracing::{debug, info, warn};

use super::{
    clock::Clock,
    countdown::{CountdownTimer, SetOutcome},
    events::ArmOrigin,
    recurrence::{plan, validate_lead_minutes, ArmPlan, TimeOfDay},
};
use crate::error::EngineError;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Settings snapshot handed to the scheduler by its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepSettings {
    pub auto_sleep_enabled: bool,
    pub target: TimeOfDay,
    /// Duration loaded into an idle countdown for manual use
    pub default_manual_minutes: u32,
}

#[derive(Debug, Default)]
struct Inner {
    settings: Option<SleepSettings>,
    wakeup: Option<JoinHandle<()>>,
    next_wakeup: Option<NaiveDateTime>,
    /// Target of the last countdown this scheduler armed
    armed_occurrence: Option<NaiveDateTime>,
}

/// Schedules the daily automatic countdown
pub struct DailyScheduler {
    timer: Arc<CountdownTimer>,
    clock: Arc<dyn Clock>,
    lead_minutes: u32,
    inner: Arc<Mutex<Inner>>,
}

impl DailyScheduler {
    pub fn new(
        timer: Arc<CountdownTimer>,
        clock: Arc<dyn Clock>,
        lead_minutes: u32,
    ) -> Result<Self, EngineError> {
        Ok(Self {
            timer,
            clock,
            lead_minutes: validate_lead_minutes(lead_minutes)?,
            inner: Arc::new(Mutex::new(Inner::default())),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn lead_minutes(&self) -> u32 {
        self.lead_minutes
    }

    /// Replace the whole schedule with a new settings snapshot.
    ///
    /// Any pending wake-up is dropped first, together with a running
    /// countdown the previous schedule armed. A manual countdown is left
    /// alone. With auto-sleep enabled the target is planned against the
    /// current time; afterwards an idle countdown is loaded with the default
    /// manual duration.
    pub fn configure(&self, settings: SleepSettings) -> Option<ArmPlan> {
        self.cancel();
        self.drop_scheduled_countdown();
        self.lock().settings = Some(settings);

        let plan = if settings.auto_sleep_enabled {
            Some(self.compute_and_arm(settings.target))
        } else {
            info!("Auto-sleep disabled");
            None
        };

        if self.timer.set(settings.default_manual_minutes) == SetOutcome::Applied {
            debug!(
                "Idle countdown loaded with {} minutes",
                settings.default_manual_minutes
            );
        }
        plan
    }

    /// Plan the target against now and act on it.
    ///
    /// Inside the lead window the countdown is armed with the minutes left
    /// and the daily wake-up starts from tomorrow's occurrence. Otherwise the
    /// wake-up is registered for today's (or tomorrow's) occurrence.
    pub fn compute_and_arm(&self, target: TimeOfDay) -> ArmPlan {
        let now = self.clock.now();
        let plan = plan(target, now, self.lead_minutes);

        let first_fire = match plan {
            ArmPlan::Immediate { minutes, occurrence } => {
                info!(
                    "Auto-sleep target {} is {} minutes away, arming now",
                    target, minutes
                );
                if minutes == 0 {
                    warn!("Less than a minute to the auto-sleep target, nothing to arm");
                } else if self.timer.arm(minutes, ArmOrigin::Scheduled) {
                    self.lock().armed_occurrence = Some(occurrence);
                } else {
                    info!("Countdown already running, leaving it untouched");
                }
                occurrence + chrono::Days::new(1)
                    - chrono::Duration::minutes(i64::from(self.lead_minutes))
            }
            ArmPlan::Deferred { fire_at, .. } => fire_at,
        };

        self.register_wakeup(now, first_fire);
        plan
    }

    /// Recompute from the last settings, e.g. after the machine woke up.
    ///
    /// A scheduled countdown whose target has already passed is stopped
    /// before planning the next occurrence.
    pub fn reschedule(&self) -> Option<ArmPlan> {
        let (settings, armed_occurrence) = {
            let inner = self.lock();
            (inner.settings?, inner.armed_occurrence)
        };
        if !settings.auto_sleep_enabled {
            return None;
        }

        if armed_occurrence.is_some_and(|occurrence| occurrence <= self.clock.now()) {
            info!("Auto-sleep target passed while away, stopping its countdown");
            self.drop_scheduled_countdown();
        }
        self.cancel();
        Some(self.compute_and_arm(settings.target))
    }

    /// Drop the pending daily wake-up, if any
    pub fn cancel(&self) {
        let mut inner = self.lock();
        if let Some(wakeup) = inner.wakeup.take() {
            wakeup.abort();
            debug!("Daily wake-up cancelled");
        }
        inner.next_wakeup = None;
    }

    /// When the daily wake-up fires next
    pub fn next_wakeup(&self) -> Option<NaiveDateTime> {
        self.lock().next_wakeup
    }

    pub fn settings(&self) -> Option<SleepSettings> {
        self.lock().settings
    }

    fn drop_scheduled_countdown(&self) {
        self.lock().armed_occurrence = None;
        self.timer.cancel_armed_by(ArmOrigin::Scheduled);
    }

    fn register_wakeup(&self, now: NaiveDateTime, first_fire: NaiveDateTime) {
        let wait = (first_fire - now).to_std().unwrap_or(Duration::ZERO);
        info!(
            "Daily wake-up registered for {} (in {} minutes)",
            first_fire,
            wait.as_secs() / 60
        );

        let timer = Arc::clone(&self.timer);
        let inner = Arc::clone(&self.inner);
        let lead_minutes = self.lead_minutes;

        let mut guard = self.lock();
        if let Some(previous) = guard.wakeup.take() {
            previous.abort();
        }
        guard.next_wakeup = Some(first_fire);
        guard.wakeup = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + wait, DAY);
            loop {
                interval.tick().await;
                let fired = inner.lock().unwrap_or_else(|e| e.into_inner()).next_wakeup;

                info!("Daily wake-up fired, arming {} minute countdown", lead_minutes);
                let armed = timer.arm(lead_minutes, ArmOrigin::Scheduled);
                if !armed {
                    info!("Countdown already running, skipping this wake-up");
                }

                let mut guard = inner.lock().unwrap_or_else(|e| e.into_inner());
                if armed {
                    guard.armed_occurrence = fired
                        .map(|fire| fire + chrono::Duration::minutes(i64::from(lead_minutes)));
                }
                if let Some(next) = guard.next_wakeup.as_mut() {
                    *next = *next + chrono::Days::new(1);
                }
            }
        }));
    }
}

impl Drop for DailyScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
