//! In-process counters for dispatch and open events.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;

/// Counters updated by the HTTP handlers.
#[derive(Debug, Default)]
pub struct TrackingMetrics {
    /// Emails handed to the mailer successfully.
    pub emails_sent: AtomicU64,
    /// Emails the mailer failed to send.
    pub send_failures: AtomicU64,
    /// Pixel fetches for known identifiers.
    pub opens_recorded: AtomicU64,
    /// Pixel fetches for unknown identifiers.
    pub unknown_pixels: AtomicU64,
    /// Milliseconds spent in the mailer, successful or not.
    pub send_time_ms: AtomicU64,
}

impl TrackingMetrics {
    /// Creates zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one send attempt and the time the mailer took.
    pub fn record_send(&self, succeeded: bool, elapsed: Duration) {
        if succeeded {
            self.emails_sent.fetch_add(1, Ordering::Relaxed);
        } else {
            self.send_failures.fetch_add(1, Ordering::Relaxed);
        }
        let ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.send_time_ms.fetch_add(ms, Ordering::Relaxed);
    }

    /// Records a pixel fetch; `known` is whether the identifier matched a record.
    pub fn record_pixel(&self, known: bool) {
        if known {
            self.opens_recorded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.unknown_pixels.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Returns a point-in-time copy of all counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            emails_sent: self.emails_sent.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            opens_recorded: self.opens_recorded.load(Ordering::Relaxed),
            unknown_pixels: self.unknown_pixels.load(Ordering::Relaxed),
            send_time_ms: self.send_time_ms.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of [`TrackingMetrics`], suitable for serialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Emails handed to the mailer successfully.
    pub emails_sent: u64,
    /// Emails the mailer failed to send.
    pub send_failures: u64,
    /// Pixel fetches for known identifiers.
    pub opens_recorded: u64,
    /// Pixel fetches for unknown identifiers.
    pub unknown_pixels: u64,
    /// Milliseconds spent in the mailer, successful or not.
    pub send_time_ms: u64,
}

/// Measures one mail send from hand-off to the mailer until it returns.
#[derive(Debug)]
pub struct SendTimer {
    start: Instant,
}

impl SendTimer {
    /// Starts timing a send.
    #[must_use]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Records the outcome in `metrics` and logs how long the send took.
    ///
    /// Returns the measured duration.
    pub fn finish(self, metrics: &TrackingMetrics, tracking_id: &str, succeeded: bool) -> Duration {
        let elapsed = self.start.elapsed();
        metrics.record_send(succeeded, elapsed);
        tracing::debug!(
            tracking_id,
            outcome = if succeeded { "sent" } else { "failed" },
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "Mail send finished"
        );
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = TrackingMetrics::new();
        metrics.record_send(true, Duration::from_millis(120));
        metrics.record_send(true, Duration::from_millis(80));
        metrics.record_send(false, Duration::from_millis(2_000));
        metrics.record_pixel(true);
        metrics.record_pixel(false);
        metrics.record_pixel(false);

        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                emails_sent: 2,
                send_failures: 1,
                opens_recorded: 1,
                unknown_pixels: 2,
                send_time_ms: 2_200,
            }
        );
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = serde_json::to_value(TrackingMetrics::new().snapshot()).unwrap();
        assert_eq!(json["emails_sent"], 0);
        assert_eq!(json["unknown_pixels"], 0);
        assert_eq!(json["send_time_ms"], 0);
    }

    #[test]
    fn test_failed_send_is_timed() {
        let metrics = TrackingMetrics::new();
        let timer = SendTimer::start();
        std::thread::sleep(Duration::from_millis(5));

        let elapsed = timer.finish(&metrics, "abc", false);

        assert!(elapsed >= Duration::from_millis(5));
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.send_failures, 1);
        assert_eq!(snapshot.emails_sent, 0);
        assert!(snapshot.send_time_ms >= 5);
    }
}
