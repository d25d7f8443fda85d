use indicatif::{ProgressBar, ProgressStyle};
use rpcload::Progress;
use rpcload_core::ScenarioDescriptor;

const TEMPLATE: &str = "{msg} [{elapsed_precise}] {wide_bar:.cyan/blue} {pos}/{len} ({per_sec})";

/// Terminal progress bar, reset for each scenario of a batch.
pub struct ProgressDisplay {
    bar: ProgressBar,
}

impl ProgressDisplay {
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(0))
    }

    fn with_bar(bar: ProgressBar) -> Self {
        if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
            bar.set_style(style.progress_chars("=> "));
        }
        Self { bar }
    }
}

impl Default for ProgressDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for ProgressDisplay {
    fn start(&self, descriptor: &ScenarioDescriptor) {
        self.bar.reset();
        self.bar.set_length(estimate(descriptor));
        self.bar
            .set_message(format!("{} {}", descriptor.method.name(), descriptor.endpoint));
    }

    fn advance(&self) {
        self.bar.inc(1);
    }

    fn finish(&self) {
        self.bar.finish();
    }
}

/// Rough number of progress ticks a scenario will produce.
///
/// Single-shot users tick once when they finish. Subscriptions tick per notification, assumed
/// to arrive about once a second.
fn estimate(descriptor: &ScenarioDescriptor) -> u64 {
    let users = descriptor.users as u64;
    if descriptor.method.is_streaming() {
        descriptor.duration.as_secs() * users
    } else {
        users
    }
}
