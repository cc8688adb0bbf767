//! Commands run against the host: suspend and tool checks

use tokio::process::Command;
use tracing::{debug, info};

/// Run `program` to completion, turning a spawn failure or a non-zero exit
/// into an error carrying stderr.
pub(crate) async fn run_checked(program: &str, args: &[&str]) -> Result<(), String> {
    debug!("Running {} {}", program, args.join(" "));

    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| format!("Failed to execute {}: {}", program, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            stderr.trim()
        ));
    }
    Ok(())
}

/// Suspend the machine through systemd
pub async fn execute_sleep_action() -> Result<(), String> {
    info!("Suspending the machine");
    run_checked("systemctl", &["suspend"]).await
}

/// Make sure `systemctl` can be spawned before anything relies on it
pub async fn check_systemctl_available() -> Result<(), String> {
    run_checked("systemctl", &["--version"])
        .await
        .map_err(|e| format!("systemctl is not usable ({}), suspending requires systemd", e))
}
