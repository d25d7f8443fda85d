use rpcload_core::ScenarioDescriptor;

/// Progress notifications from a running scenario.
///
/// `advance` is called once per pushed outcome for streaming methods and once per finished
/// virtual user for single-shot methods. Implementations must not block.
pub trait Progress: Send + Sync {
    /// A validated scenario is about to launch its workers.
    fn start(&self, _descriptor: &ScenarioDescriptor) {}

    fn advance(&self);

    /// Every worker of the current scenario has joined.
    fn finish(&self) {}
}

/// Discards all progress notifications.
pub struct NoProgress;

impl Progress for NoProgress {
    fn advance(&self) {}
}
