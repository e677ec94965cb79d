use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::MetricsSummary;

#[derive(Debug, Default)]
struct MetricsState {
    requests_total: u64,
    requests_failed: u64,
    latencies_sec: Vec<f64>,
}

/// Request counters and latency samples shared by every clone of a client.
///
/// All three fields live behind one lock so that a summary never sees a
/// failure counted without its attempt.
#[derive(Debug, Default)]
pub struct Metrics {
    state: Mutex<MetricsState>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MetricsState> {
        // Counters stay meaningful even if a holder panicked.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn record_attempt(&self) {
        self.lock().requests_total += 1;
    }

    pub(crate) fn record_failure(&self) {
        self.lock().requests_failed += 1;
    }

    pub(crate) fn record_latency(&self, elapsed: Duration) {
        self.lock().latencies_sec.push(elapsed.as_secs_f64());
    }

    pub fn requests_total(&self) -> u64 {
        self.lock().requests_total
    }

    pub fn requests_failed(&self) -> u64 {
        self.lock().requests_failed
    }

    /// Copy of the latency samples in recording order.
    pub fn latencies(&self) -> Vec<f64> {
        self.lock().latencies_sec.clone()
    }

    /// Computes totals, mean and p95 latency from a consistent snapshot.
    pub fn summarize(&self) -> MetricsSummary {
        let (requests_total, requests_failed, samples) = {
            let state = self.lock();
            (
                state.requests_total,
                state.requests_failed,
                state.latencies_sec.clone(),
            )
        };
        summarize_samples(requests_total, requests_failed, samples)
    }
}

fn summarize_samples(
    requests_total: u64,
    requests_failed: u64,
    mut samples: Vec<f64>,
) -> MetricsSummary {
    let (avg, p95) = if samples.is_empty() {
        (0.0, 0.0)
    } else {
        let avg = samples.iter().sum::<f64>() / samples.len() as f64;
        samples.sort_by(f64::total_cmp);
        let rank = (0.95 * (samples.len() - 1) as f64).floor() as usize;
        (avg, samples[rank])
    };

    MetricsSummary {
        requests_total,
        requests_failed,
        avg_latency_sec: round4(avg),
        p95_latency_sec: round4(p95),
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
