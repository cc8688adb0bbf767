//! Countdown timer state machine
//!
//! ```text
//! Stopped --toggle_timer / arm--> Running --tick to 0 / stop_timer--> Stopped
//! ```
//!
//! Every transition and the event it produces happen under one mutex. The
//! ticker task re-checks its cycle id under the same mutex before touching
//! anything, so once `Invalidated` has been emitted no tick from that cycle
//! can follow it.
//!
//! Ticks use a fixed interval measured from activation (one minute by
//! default): a countdown armed with `n` minutes completes `n` intervals after
//! it was started.

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
    time::{interval_at, Instant},
};
use tracing::{debug, info};

use super::events::{ArmOrigin, TimerEvent};
use crate::state::TimerState;

/// Interval between two ticks, each tick removing one minute
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(60);

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Result of a `set` call.
///
/// Reconfiguring a live countdown is not supported: `set` while running is a
/// silent no-op reported as `IgnoredWhileRunning` rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    Applied,
    IgnoredWhileRunning,
}

/// What a `toggle_timer` call did, decided under the countdown lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Started,
    Cancelled,
    /// Stopped with a total of 0 minutes, nothing to start
    Ignored,
}

#[derive(Debug)]
struct Countdown {
    total_minutes: u32,
    remaining_minutes: u32,
    running: bool,
    origin: Option<ArmOrigin>,
    /// Bumped on every start and stop; a ticker only acts for its own cycle
    cycle: u64,
    ticker: Option<JoinHandle<()>>,
}

impl Countdown {
    fn snapshot(&self) -> TimerState {
        TimerState {
            running: self.running,
            total_minutes: self.total_minutes,
            remaining_minutes: self.remaining_minutes,
            origin: self.origin,
        }
    }
}

#[derive(Debug)]
struct Shared {
    countdown: Mutex<Countdown>,
    tick_interval: Duration,
    event_tx: broadcast::Sender<TimerEvent>,
    state_tx: watch::Sender<TimerState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Countdown> {
        // The countdown is plain data, a panic elsewhere cannot leave it torn
        self.countdown.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, countdown: &Countdown) {
        self.state_tx.send_replace(countdown.snapshot());
    }

    fn emit(&self, countdown: &Countdown, event: TimerEvent) {
        self.publish(countdown);
        // Having no subscriber is fine
        let _ = self.event_tx.send(event);
    }

    fn start(self: &Arc<Self>, countdown: &mut Countdown, origin: ArmOrigin) -> bool {
        if countdown.total_minutes == 0 {
            debug!("Ignoring start request, countdown is set to 0 minutes");
            return false;
        }

        countdown.running = true;
        countdown.remaining_minutes = countdown.total_minutes;
        countdown.origin = Some(origin);
        countdown.cycle += 1;
        countdown.ticker = Some(tokio::spawn(run_ticker(Arc::clone(self), countdown.cycle)));

        info!(
            "Countdown started: {} minutes ({:?})",
            countdown.total_minutes, origin
        );
        self.emit(
            countdown,
            TimerEvent::Activated {
                minutes: countdown.total_minutes,
                origin,
            },
        );
        true
    }

    /// Move to stopped and emit `Invalidated`. Returns the ticker handle so the
    /// caller decides whether to abort it.
    fn finish(&self, countdown: &mut Countdown, completed: bool) -> Option<JoinHandle<()>> {
        countdown.running = false;
        countdown.cycle += 1;
        self.emit(countdown, TimerEvent::Invalidated { completed });
        countdown.ticker.take()
    }

    /// Handle one tick. Returns false once the ticker should exit.
    fn tick(&self, cycle: u64) -> bool {
        let mut countdown = self.lock();
        if !countdown.running || countdown.cycle != cycle {
            return false;
        }

        countdown.remaining_minutes = countdown.remaining_minutes.saturating_sub(1);
        let minutes = countdown.remaining_minutes;
        debug!("Countdown tick: {} minutes remaining", minutes);
        self.emit(&countdown, TimerEvent::RemainingChanged { minutes });

        if minutes == 0 {
            info!("Countdown completed");
            // The handle belongs to this very task, dropping it just detaches
            drop(self.finish(&mut countdown, true));
            return false;
        }
        true
    }
}

async fn run_ticker(shared: Arc<Shared>, cycle: u64) {
    let period = shared.tick_interval;
    let mut interval = interval_at(Instant::now() + period, period);

    loop {
        interval.tick().await;
        if !shared.tick(cycle) {
            break;
        }
    }
}

/// The single countdown of the process.
///
/// Construct it once and share it through `Arc`. Starting a countdown spawns
/// a tokio task, so `toggle_timer` and `arm` must be called from within a
/// tokio runtime.
#[derive(Debug)]
pub struct CountdownTimer {
    shared: Arc<Shared>,
}

impl CountdownTimer {
    /// Create a stopped countdown ticking once per minute
    pub fn new() -> Self {
        Self::with_tick_interval(DEFAULT_TICK_INTERVAL)
    }

    /// Create a stopped countdown with a custom (non-zero) tick interval
    pub fn with_tick_interval(tick_interval: Duration) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (state_tx, _) = watch::channel(TimerState::new());

        Self {
            shared: Arc::new(Shared {
                countdown: Mutex::new(Countdown {
                    total_minutes: 0,
                    remaining_minutes: 0,
                    running: false,
                    origin: None,
                    cycle: 0,
                    ticker: None,
                }),
                tick_interval: tick_interval.max(Duration::from_millis(1)),
                event_tx,
                state_tx,
            }),
        }
    }

    /// Set the duration of the next cycle. Ignored while running.
    pub fn set(&self, minutes: u32) -> SetOutcome {
        let mut countdown = self.shared.lock();
        if countdown.running {
            debug!("Ignoring set({}) while the countdown is running", minutes);
            return SetOutcome::IgnoredWhileRunning;
        }

        countdown.total_minutes = minutes;
        countdown.remaining_minutes = minutes;
        self.shared.publish(&countdown);
        SetOutcome::Applied
    }

    /// Start the countdown if stopped, cancel it if running.
    ///
    /// Starting with a total of 0 minutes does nothing.
    pub fn toggle_timer(&self) -> Toggle {
        let mut countdown = self.shared.lock();
        if countdown.running {
            if let Some(ticker) = self.shared.finish(&mut countdown, false) {
                ticker.abort();
            }
            info!("Countdown cancelled");
            Toggle::Cancelled
        } else if self.shared.start(&mut countdown, ArmOrigin::Manual) {
            Toggle::Started
        } else {
            Toggle::Ignored
        }
    }

    /// Stop the countdown, emitting `Invalidated { completed }`.
    ///
    /// Returns false and emits nothing when already stopped.
    pub fn stop_timer(&self, completed: bool) -> bool {
        let mut countdown = self.shared.lock();
        if !countdown.running {
            debug!("stop_timer called while stopped, nothing to do");
            return false;
        }

        if let Some(ticker) = self.shared.finish(&mut countdown, completed) {
            ticker.abort();
        }
        info!("Countdown stopped (completed: {})", completed);
        true
    }

    /// Cancel the running countdown only if `origin` armed it
    pub fn cancel_armed_by(&self, origin: ArmOrigin) -> bool {
        let mut countdown = self.shared.lock();
        if !countdown.running || countdown.origin != Some(origin) {
            return false;
        }

        if let Some(ticker) = self.shared.finish(&mut countdown, false) {
            ticker.abort();
        }
        info!("{:?} countdown cancelled", origin);
        true
    }

    /// Set and start in one step, unless a countdown is already running.
    ///
    /// Returns whether a new cycle was started.
    pub fn arm(&self, minutes: u32, origin: ArmOrigin) -> bool {
        let mut countdown = self.shared.lock();
        if countdown.running {
            debug!("Countdown already running, not arming {} minutes", minutes);
            return false;
        }

        countdown.total_minutes = minutes;
        countdown.remaining_minutes = minutes;
        self.shared.start(&mut countdown, origin)
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock().running
    }

    /// Current snapshot
    pub fn state(&self) -> TimerState {
        self.shared.lock().snapshot()
    }

    /// Subscribe to countdown events emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.shared.event_tx.subscribe()
    }

    /// Read-only handle for consumers that must not drive the countdown
    pub fn observer(&self) -> TimerObserver {
        TimerObserver {
            event_tx: self.shared.event_tx.clone(),
            state_rx: self.shared.state_tx.subscribe(),
        }
    }
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        // The ticker holds the shared state alive, stop it with its owner
        if let Some(ticker) = self.shared.lock().ticker.take() {
            ticker.abort();
        }
    }
}

/// Read access to the countdown: snapshots and event subscriptions
#[derive(Debug, Clone)]
pub struct TimerObserver {
    event_tx: broadcast::Sender<TimerEvent>,
    state_rx: watch::Receiver<TimerState>,
}

impl TimerObserver {
    /// Latest published snapshot
    pub fn state(&self) -> TimerState {
        *self.state_rx.borrow()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.event_tx.subscribe()
    }

    /// Wait until a new snapshot is published
    pub async fn changed(&mut self) -> Option<TimerState> {
        self.state_rx.changed().await.ok()?;
        Some(*self.state_rx.borrow_and_update())
    }
}
