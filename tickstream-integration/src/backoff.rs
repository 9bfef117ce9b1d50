use rand::Rng;
use std::time::Duration;

/// Exponential backoff with full jitter, used by reconnecting [`crate::protocol::websocket`]
/// adapters and retrying REST requests.
///
/// Implements the "full jitter" strategy: `sleep = random_between(0, min(cap, base * factor^attempt))`.
/// See <https://aws.amazon.com/blogs/architecture/exponential-backoff-and-jitter/>.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    base: Duration,
    factor: u32,
    cap: Duration,
    max_attempts: u32,
    attempt: u32,
}

impl Backoff {
    /// Construct a new [`Backoff`] with the given base delay, growth factor, ceiling, and the
    /// maximum number of attempts before [`Backoff::next_delay`] returns `None`.
    pub fn new(base: Duration, factor: u32, cap: Duration, max_attempts: u32) -> Self {
        Self {
            base,
            factor,
            cap,
            max_attempts,
            attempt: 0,
        }
    }

    /// The default policy used across Tickstream adapters: base 1s, factor 2, cap 60s, 10
    /// attempts.
    pub fn default_policy() -> Self {
        Self::new(Duration::from_secs(1), 2, Duration::from_secs(60), 10)
    }

    /// Reset the attempt counter, eg/ after a successful connection.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Returns the number of attempts made so far.
    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    /// Compute the next jittered delay and advance the internal attempt counter.
    ///
    /// Returns `None` once `max_attempts` has been exhausted - the caller should treat this as
    /// a fatal [`crate::error::SocketError`].
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempt >= self.max_attempts {
            return None;
        }

        let exp = self.factor.saturating_pow(self.attempt);
        let uncapped = self.base.saturating_mul(exp);
        let ceiling = uncapped.min(self.cap);

        self.attempt += 1;

        if ceiling.is_zero() {
            return Some(Duration::ZERO);
        }

        let jittered_nanos = rand::rng().random_range(0..=ceiling.as_nanos());
        Some(Duration::from_nanos(jittered_nanos as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_exhausts_after_max_attempts() {
        let mut backoff = Backoff::new(Duration::from_millis(1), 2, Duration::from_secs(1), 3);

        assert!(backoff.next_delay().is_some());
        assert!(backoff.next_delay().is_some());
        assert!(backoff.next_delay().is_some());
        assert!(backoff.next_delay().is_none());
        assert_eq!(backoff.attempts(), 3);
    }

    #[test]
    fn test_backoff_respects_cap() {
        let cap = Duration::from_millis(50);
        let mut backoff = Backoff::new(Duration::from_millis(10), 2, cap, 10);

        for _ in 0..10 {
            let delay = backoff.next_delay().expect("attempt available");
            assert!(delay <= cap, "delay {delay:?} exceeded cap {cap:?}");
        }
    }

    #[test]
    fn test_backoff_reset() {
        let mut backoff = Backoff::new(Duration::from_millis(1), 2, Duration::from_secs(1), 2);
        backoff.next_delay();
        backoff.next_delay();
        assert!(backoff.next_delay().is_none());

        backoff.reset();
        assert!(backoff.next_delay().is_some());
    }
}
