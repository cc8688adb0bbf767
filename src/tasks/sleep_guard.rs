//! Sleep guard background task
//!
//! Reacts to countdown events with the daemon's policy: warn the user when
//! `warn_at_minutes` are left or when the scheduler armed the countdown, and
//! put the machine to sleep when a countdown runs out.

use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, error, info, warn};

use crate::{
    engine::{ArmOrigin, TimerEvent},
    services::Capabilities,
    state::AppState,
};

/// Default number of remaining minutes at which the user is warned
pub const DEFAULT_WARN_AT_MINUTES: u32 = 5;

/// Background task consuming countdown events.
///
/// Takes an already subscribed receiver so no event emitted between spawning
/// and the task's first poll is lost.
pub async fn sleep_guard_task(
    state: Arc<AppState>,
    mut events: broadcast::Receiver<TimerEvent>,
    capabilities: Arc<dyn Capabilities>,
    warn_at_minutes: u32,
) {
    info!("Starting sleep guard task (warning at {} minutes)", warn_at_minutes);

    loop {
        match events.recv().await {
            Ok(event) => {
                debug!("Sleep guard received {:?}", event);
                handle_event(&state, capabilities.as_ref(), warn_at_minutes, event).await;
            }
            Err(RecvError::Lagged(missed)) => {
                warn!("Sleep guard lagged behind, {} countdown events missed", missed);
            }
            Err(RecvError::Closed) => {
                info!("Countdown event channel closed, stopping sleep guard");
                break;
            }
        }
    }
}

async fn handle_event(
    state: &AppState,
    capabilities: &dyn Capabilities,
    warn_at_minutes: u32,
    event: TimerEvent,
) {
    match event {
        TimerEvent::Activated {
            minutes,
            origin: ArmOrigin::Scheduled,
        } => {
            info!("Auto-sleep countdown armed for {} minutes", minutes);
            if let Err(e) = capabilities.warn(minutes).await {
                error!("Failed to deliver auto-sleep notification: {}", e);
                state.add_error(format!("Notification failed: {}", e));
            }
        }
        TimerEvent::Activated { .. } => {}
        TimerEvent::RemainingChanged { minutes } if minutes == warn_at_minutes => {
            info!("{} minutes left before sleep, warning the user", minutes);
            if let Err(e) = capabilities.warn(minutes).await {
                error!("Failed to deliver sleep warning: {}", e);
                state.add_error(format!("Notification failed: {}", e));
            }
        }
        TimerEvent::RemainingChanged { .. } => {}
        TimerEvent::Invalidated { completed: true } => {
            info!("Countdown completed, putting the machine to sleep");
            if let Err(e) = capabilities.sleep().await {
                error!("Failed to put the machine to sleep: {}", e);
                state.add_error(format!("Sleep action failed: {}", e));
            }
        }
        TimerEvent::Invalidated { completed: false } => {
            debug!("Countdown cancelled, nothing to do");
        }
    }
}
