use metrics_util::AtomicBucket;
use rpcload_core::Outcome;

/// Append-only collection of outcomes shared by every virtual user of one run.
///
/// Appends are lock-free. Reading is only meaningful once every writer has finished.
pub(crate) struct MetricsSink {
    #[cfg_attr(not(feature = "metrics"), allow(unused))]
    method: &'static str,
    outcomes: AtomicBucket<Outcome>,
}

impl MetricsSink {
    pub fn new(method: &'static str) -> Self {
        #[cfg(feature = "metrics")]
        metrics::describe_histogram!(
            "rpcload_latency",
            metrics::Unit::Seconds,
            "Latency of succeeded interactions"
        );

        Self {
            method,
            outcomes: AtomicBucket::new(),
        }
    }

    pub fn push(&self, outcome: Outcome) {
        #[cfg(feature = "metrics")]
        self.record(&outcome);

        self.outcomes.push(outcome);
    }

    pub fn snapshot(&self) -> Vec<Outcome> {
        self.outcomes.data()
    }

    #[cfg(feature = "metrics")]
    fn record(&self, outcome: &Outcome) {
        if outcome.succeeded {
            metrics::histogram!("rpcload_latency", "method" => self.method)
                .record(outcome.latency.as_secs_f64());
            metrics::counter!("rpcload_success", "method" => self.method).increment(1);
        } else {
            metrics::counter!("rpcload_error", "method" => self.method).increment(1);
        }
    }
}
