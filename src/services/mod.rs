//! Outbound capabilities invoked in response to countdown events
//!
//! The engine never calls these; the sleep guard task does.

pub mod notify;
pub mod system;

pub use notify::send_warning;
pub use system::*;

use futures::future::{BoxFuture, FutureExt};
use tracing::info;

/// What the daemon can do to the machine
pub trait Capabilities: Send + Sync {
    /// Tell the user the machine sleeps in `minutes`
    fn warn(&self, minutes: u32) -> BoxFuture<'_, Result<(), String>>;

    /// Put the machine to sleep
    fn sleep(&self) -> BoxFuture<'_, Result<(), String>>;
}

/// Real capabilities: notify-send and systemctl
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCapabilities {
    /// Only log what would be done
    pub dry_run: bool,
}

impl SystemCapabilities {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }
}

impl Capabilities for SystemCapabilities {
    fn warn(&self, minutes: u32) -> BoxFuture<'_, Result<(), String>> {
        async move {
            if self.dry_run {
                info!("[dry-run] Would warn: {}", notify::warning_title(minutes));
                return Ok(());
            }
            send_warning(minutes).await
        }
        .boxed()
    }

    fn sleep(&self) -> BoxFuture<'_, Result<(), String>> {
        async move {
            if self.dry_run {
                info!("[dry-run] Would put the machine to sleep");
                return Ok(());
            }
            execute_sleep_action().await
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dry_run_never_touches_the_system() {
        let capabilities = SystemCapabilities::new(true);
        assert_eq!(capabilities.warn(5).await, Ok(()));
        assert_eq!(capabilities.sleep().await, Ok(()));
    }
}
