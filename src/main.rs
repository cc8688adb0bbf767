//! Sleep With Me - countdown and daily auto-sleep daemon
//!
//! This is the main entry point for the sleep-with-me application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use sleep_with_me::{
    config::Config,
    engine::{Clock, CountdownTimer, DailyScheduler, SystemClock},
    state::AppState,
    api::create_router,
    services::{check_systemctl_available, SystemCapabilities},
    tasks::{sleep_guard_task, wake_up_recovery_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("sleep_with_me={},tower_http=info", config.log_level()))
        .init();

    info!("Starting sleep-with-me v{}", env!("CARGO_PKG_VERSION"));

    // Reject bad configuration before touching anything
    let settings = config.sleep_settings()?;
    let lead_minutes = config.lead_minutes()?;
    let tick_interval = config.tick_interval()?;
    info!(
        "Configuration: host={}, port={}, auto_sleep={}, sleep_time={}, default_timer={}min, lead={}min",
        config.host,
        config.port,
        settings.auto_sleep_enabled,
        settings.target,
        settings.default_manual_minutes,
        lead_minutes
    );

    // systemctl is needed to sleep the machine
    if config.dry_run {
        info!("Dry run: notifications and sleep will only be logged");
    } else if let Err(e) = check_systemctl_available().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }

    // Build the engine
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let timer = Arc::new(CountdownTimer::with_tick_interval(tick_interval));
    let scheduler = Arc::new(DailyScheduler::new(
        Arc::clone(&timer),
        Arc::clone(&clock),
        lead_minutes,
    )?);
    let state = Arc::new(AppState::new(timer, scheduler, config.port, config.host.clone()));

    // Subscribe before the schedule can arm anything
    let events = state.timer.subscribe();
    let capabilities = Arc::new(SystemCapabilities::new(config.dry_run));
    tokio::spawn(sleep_guard_task(
        Arc::clone(&state),
        events,
        capabilities,
        config.warn_at,
    ));

    state.configure_schedule(settings);

    tokio::spawn(wake_up_recovery_task(Arc::clone(&state), clock));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/toggle - Start or cancel the countdown");
    info!("  POST /timer/set    - Set the countdown duration");
    info!("  POST /timer/stop   - Cancel the countdown");
    info!("  PUT  /schedule     - Replace the daily auto-sleep schedule");
    info!("  GET  /status       - Countdown and schedule status");
    info!("  GET  /health       - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    state.shutdown();
    info!("Server shutdown complete");
    Ok(())
}
