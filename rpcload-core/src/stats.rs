use crate::{Outcome, ScenarioDescriptor};
use std::fmt;
use std::time::Duration;

/// Statistics reduced from a frozen set of outcomes.
///
/// Latency figures only consider succeeded outcomes and are zero when nothing succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub failed_pct: f64,
    pub min_latency: Duration,
    pub max_latency: Duration,
    pub avg_latency: Duration,
    pub latency_p50: Duration,
    pub latency_p90: Duration,
    pub latency_p99: Duration,
}

impl Statistics {
    /// Pure reduction; the order of `outcomes` does not affect the result.
    pub fn reduce(outcomes: &[Outcome]) -> Self {
        let total = outcomes.len() as u64;
        let mut latencies: Vec<Duration> = outcomes
            .iter()
            .filter(|o| o.succeeded)
            .map(|o| o.latency)
            .collect();
        latencies.sort_unstable();

        let succeeded = latencies.len() as u64;
        let failed = total - succeeded;
        let failed_pct = if total == 0 {
            0.
        } else {
            100. * failed as f64 / total as f64
        };

        let (Some(&min_latency), Some(&max_latency)) = (latencies.first(), latencies.last())
        else {
            return Self {
                total,
                succeeded,
                failed,
                failed_pct,
                min_latency: Duration::ZERO,
                max_latency: Duration::ZERO,
                avg_latency: Duration::ZERO,
                latency_p50: Duration::ZERO,
                latency_p90: Duration::ZERO,
                latency_p99: Duration::ZERO,
            };
        };

        let secs: Vec<f64> = latencies.iter().map(Duration::as_secs_f64).collect();
        // NOTE: Float rounding can push the mean a hair outside the observed range.
        let avg_latency =
            Duration::from_secs_f64(statistical::mean(&secs)).clamp(min_latency, max_latency);

        Self {
            total,
            succeeded,
            failed,
            failed_pct,
            min_latency,
            max_latency,
            avg_latency,
            latency_p50: quantile(&latencies, 0.50),
            latency_p90: quantile(&latencies, 0.90),
            latency_p99: quantile(&latencies, 0.99),
        }
    }
}

/// Nearest-rank quantile over an ascending, non-empty slice.
fn quantile(sorted: &[Duration], q: f64) -> Duration {
    let rank = (q * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

/// One scenario's result, handed to the report writer.
#[derive(Debug, Clone)]
pub struct Summary {
    pub endpoint: String,
    pub method: String,
    pub users: usize,
    pub workers: usize,
    pub duration: Duration,
    pub stats: Statistics,
}

impl Summary {
    pub fn new(descriptor: &ScenarioDescriptor, outcomes: &[Outcome]) -> Self {
        Self {
            endpoint: descriptor.endpoint.to_string(),
            method: descriptor.method.name().to_string(),
            users: descriptor.users,
            workers: descriptor.workers,
            duration: descriptor.duration,
            stats: Statistics::reduce(outcomes),
        }
    }

    pub fn duration_minutes(&self) -> f64 {
        self.duration.as_secs_f64() / 60.
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = &self.stats;
        write!(
            f,
            "{} {} users={} workers={} duration={}: requests={}, failed={} ({:.2}%), min={:?}, avg={:?}, max={:?}, p50={:?}, p90={:?}, p99={:?}",
            self.method,
            self.endpoint,
            self.users,
            self.workers,
            humantime::format_duration(self.duration),
            stats.total,
            stats.failed,
            stats.failed_pct,
            stats.min_latency,
            stats.avg_latency,
            stats.max_latency,
            stats.latency_p50,
            stats.latency_p90,
            stats.latency_p99,
        )
    }
}
