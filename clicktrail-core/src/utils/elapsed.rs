use tokio::time::Instant;

/// Returns the time on page in whole seconds, rounded to the nearest second.
pub fn time_on_page(session_start: Instant, now: Instant) -> u64 {
    let millis = now.saturating_duration_since(session_start).as_millis();
    u64::try_from((millis + 500) / 1000).unwrap_or(u64::MAX)
}
