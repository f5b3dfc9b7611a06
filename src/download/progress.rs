//! Progress reporting: throttling and the notification seam.

use std::time::{Duration, Instant};

use async_trait::async_trait;

/// A point-in-time snapshot of one transfer's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSample {
    /// Completion percentage, when the total size is known.
    pub percent: Option<u8>,
    /// Bytes written so far.
    pub bytes: u64,
}

impl ProgressSample {
    /// Builds a sample from a byte count and an optional total.
    #[must_use]
    pub fn new(bytes: u64, total: Option<u64>) -> Self {
        let percent = match total {
            Some(total) if total > 0 => {
                // Widened so `bytes * 100` cannot wrap near u64::MAX.
                #[allow(clippy::cast_possible_truncation)]
                Some(((u128::from(bytes.min(total)) * 100) / u128::from(total)) as u8)
            }
            _ => None,
        };
        Self { percent, bytes }
    }
}

/// Receives progress and status updates for in-flight tasks.
///
/// Implementations must swallow their own delivery failures: a broken
/// notification channel never aborts a transfer.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Called with a throttled progress snapshot, and once more with the
    /// final snapshot when the transfer ends.
    async fn progress(&self, task_id: usize, file_name: &str, sample: ProgressSample);

    /// Called with a one-line status message for the task.
    async fn status(&self, task_id: usize, message: &str);
}

/// A sink that discards everything. Useful for tests and fire-and-forget
/// callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

#[async_trait]
impl ProgressSink for NullSink {
    async fn progress(&self, _task_id: usize, _file_name: &str, _sample: ProgressSample) {}

    async fn status(&self, _task_id: usize, _message: &str) {}
}

/// Wall-clock rate limiter for progress updates.
///
/// Over any span of `d` seconds, `ready` returns `true` at most
/// `ceil(d / interval) + 1` times, regardless of how often it is polled.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    /// Creates a throttle that opens once per `interval`.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Returns `true` when enough wall-clock time has passed since the last
    /// accepted update. The first call always returns `true`.
    pub fn ready(&mut self) -> bool {
        let now = Instant::now();
        match self.last {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_percent_from_known_total() {
        let sample = ProgressSample::new(50, Some(200));
        assert_eq!(sample.percent, Some(25));
        assert_eq!(sample.bytes, 50);
    }

    #[test]
    fn test_sample_percent_unknown_without_total() {
        assert_eq!(ProgressSample::new(50, None).percent, None);
        assert_eq!(ProgressSample::new(50, Some(0)).percent, None);
    }

    #[test]
    fn test_sample_percent_clamps_overshoot() {
        // Servers occasionally deliver more bytes than they advertised.
        assert_eq!(ProgressSample::new(250, Some(200)).percent, Some(100));
    }

    #[test]
    fn test_sample_percent_survives_huge_totals() {
        // Near u64::MAX the multiplication must not wrap.
        assert_eq!(
            ProgressSample::new(u64::MAX, Some(u64::MAX)).percent,
            Some(100)
        );
        assert_eq!(
            ProgressSample::new(u64::MAX / 2, Some(u64::MAX)).percent,
            Some(49)
        );
    }

    #[test]
    fn test_throttle_first_call_is_ready() {
        let mut throttle = Throttle::new(Duration::from_secs(60));
        assert!(throttle.ready());
        assert!(!throttle.ready());
    }

    #[test]
    fn test_throttle_bounds_update_rate() {
        let interval = Duration::from_millis(40);
        let mut throttle = Throttle::new(interval);
        let start = Instant::now();
        let mut accepted = 0u32;

        while start.elapsed() < Duration::from_millis(200) {
            if throttle.ready() {
                accepted += 1;
            }
            std::thread::sleep(Duration::from_millis(5));
        }

        // ceil(200 / 40) + 1
        assert!(accepted <= 6, "Accepted {accepted} updates in 200ms");
        assert!(accepted >= 2, "Throttle never reopened");
    }
}
