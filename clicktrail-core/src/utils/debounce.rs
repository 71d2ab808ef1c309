//! Trailing-edge debounce.
//!
//! [`Debounce`] keeps only the latest value pushed into it and releases it
//! once `delay` has passed without another push. It owns no timer: the
//! caller asks for the [`deadline`](Debounce::deadline), sleeps until then
//! (see [`sleep_until_deadline`]) and collects the value with
//! [`take_expired`](Debounce::take_expired).

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug)]
pub struct Debounce<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debounce<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace the pending value and restart the quiet period.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending value if its quiet period is over.
    pub fn take_expired(&mut self, now: Instant) -> Option<T> {
        match self.pending {
            Some((_, deadline)) if now >= deadline => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// Drop the pending value, returning it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }
}

/// Sleep until `deadline`, or forever when there is none.
///
/// Meant as a `tokio::select!` branch next to the debounced input.
pub async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(100);

    #[test]
    fn burst_collapses_to_latest_value() {
        let start = Instant::now();
        let mut debounce = Debounce::new(DELAY);

        debounce.push(1, start);
        debounce.push(2, start + Duration::from_millis(40));
        debounce.push(3, start + Duration::from_millis(80));

        assert_eq!(debounce.take_expired(start + Duration::from_millis(150)), None);
        assert_eq!(
            debounce.deadline(),
            Some(start + Duration::from_millis(180))
        );
        assert_eq!(debounce.take_expired(start + Duration::from_millis(180)), Some(3));
        assert!(!debounce.is_pending());
        assert_eq!(debounce.take_expired(start + Duration::from_secs(10)), None);
    }

    #[test]
    fn cancel_discards_pending_value() {
        let start = Instant::now();
        let mut debounce = Debounce::new(DELAY);
        debounce.push("scroll", start);

        assert_eq!(debounce.cancel(), Some("scroll"));
        assert_eq!(debounce.deadline(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn sleep_until_deadline_waits_for_quiet_period() {
        let mut debounce = Debounce::new(DELAY);
        let start = Instant::now();
        debounce.push(7u32, start);

        sleep_until_deadline(debounce.deadline()).await;

        assert!(Instant::now() >= start + DELAY);
        assert_eq!(debounce.take_expired(Instant::now()), Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn no_deadline_never_wakes() {
        let woke = tokio::time::timeout(Duration::from_secs(60), sleep_until_deadline(None)).await;
        assert!(woke.is_err());
    }
}
