use std::time::Duration;

/// Result of a single interaction attempt.
///
/// One HTTP call, one received stream message, or one failed attempt each produce exactly one
/// `Outcome`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub latency: Duration,
    pub succeeded: bool,
}

impl Outcome {
    pub fn success(latency: Duration) -> Self {
        Self {
            latency,
            succeeded: true,
        }
    }

    /// Attempt that never got a reply: connect error, timeout, broken connection.
    pub fn failure() -> Self {
        Self::rejected(Duration::ZERO)
    }

    /// A reply arrived after `latency` but was judged unsuccessful.
    pub fn rejected(latency: Duration) -> Self {
        Self {
            latency,
            succeeded: false,
        }
    }
}
