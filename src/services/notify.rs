//! Desktop notifications through notify-send

use tracing::debug;

use super::system::run_checked;

/// Title of the countdown warning
pub fn warning_title(minutes: u32) -> String {
    format!("{} mins to zzz", minutes)
}

/// Body of the countdown warning
pub fn warning_body(minutes: u32) -> String {
    format!(
        "sleep-with-me will put your machine to sleep with you in {} mins. \
         Stop the timer with POST /timer/stop.",
        minutes
    )
}

/// Deliver a warning that the machine will sleep in `minutes`
pub async fn send_warning(minutes: u32) -> Result<(), String> {
    debug!("Sending sleep warning for {} minutes", minutes);

    let title = warning_title(minutes);
    let body = warning_body(minutes);
    run_checked(
        "notify-send",
        &["--app-name=sleep-with-me", "--urgency=normal", &title, &body],
    )
    .await
}
