//! Per-session capture statistics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::RwLock;

use acapture_types::SessionMetrics;

/// Collects and reports session metrics.
pub struct MetricsCollector {
    started_at: RwLock<Option<Instant>>,
    frames_delivered: AtomicU64,
    frames_since_start: AtomicU64,
    frames_skipped: AtomicU64,
    restarts: AtomicU64,
    timeouts: AtomicU64,
}

impl MetricsCollector {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self {
            started_at: RwLock::new(None),
            frames_delivered: AtomicU64::new(0),
            frames_since_start: AtomicU64::new(0),
            frames_skipped: AtomicU64::new(0),
            restarts: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
        }
    }

    /// Record a successful reset. Returns the restart count including it.
    pub fn record_restart(&self) -> u64 {
        *self.started_at.write() = Some(Instant::now());
        self.frames_since_start.store(0, Ordering::Relaxed);
        self.restarts.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Stop the uptime clock.
    pub fn stop(&self) {
        *self.started_at.write() = None;
    }

    /// Record a frame handed to the caller.
    pub fn record_frame(&self) {
        self.frames_delivered.fetch_add(1, Ordering::Relaxed);
        self.frames_since_start.fetch_add(1, Ordering::Relaxed);
    }

    /// Record stale frames discarded while draining.
    pub fn record_skipped(&self, count: u64) {
        self.frames_skipped.fetch_add(count, Ordering::Relaxed);
    }

    /// Record a frame wait that timed out.
    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot.
    pub fn snapshot(&self) -> SessionMetrics {
        let started_at = *self.started_at.read();
        let elapsed = started_at.map(|s| s.elapsed());

        let fps = match elapsed {
            Some(elapsed) if elapsed.as_secs_f32() > 0.0 => {
                self.frames_since_start.load(Ordering::Relaxed) as f32 / elapsed.as_secs_f32()
            }
            _ => 0.0,
        };

        SessionMetrics {
            frames_delivered: self.frames_delivered.load(Ordering::Relaxed),
            frames_skipped: self.frames_skipped.load(Ordering::Relaxed),
            restarts: self.restarts.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            fps,
            uptime_seconds: elapsed.map(|e| e.as_secs()).unwrap_or(0),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
