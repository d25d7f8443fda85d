//! Scenario runner
use crate::progress::{NoProgress, Progress};
use crate::sink::MetricsSink;
use crate::worker::{Completion, Plan, Worker, WorkerError};
use rpcload_core::{
    ScenarioConfig, ScenarioDescriptor, ScenarioError, Summary, DEFAULT_REQUEST_TIMEOUT,
};
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn, Instrument};

/// Settings shared by every scenario a runner executes.
#[derive(Clone)]
pub struct RunnerConfig {
    /// Bound on each single interaction (HTTP round-trip, WebSocket connect, one receive).
    pub request_timeout: Duration,
    pub progress: Arc<dyn Progress>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            progress: Arc::new(NoProgress),
        }
    }
}

/// Lifecycle of one scenario run.
///
/// `Validating -> Running -> Aggregating -> Done`, with `Failed` reachable from `Validating`
/// only. Once workers have launched a run always produces a [`Summary`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Validating,
    Running,
    Aggregating,
    Done,
    Failed,
}

/// Load test scenario
///
/// Resolves to the [`Summary`] of the run. Nothing happens until the future is polled.
///
/// # Example
/// ```no_run
/// use rpcload::prelude::*;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let config = ScenarioConfig::new("http://127.0.0.1:8545", "eth_blockNumber")
///         .duration(Duration::from_secs(30))
///         .users(20)
///         .workers(2);
///
///     let summary = Scenario::new(config)
///         .request_timeout(Duration::from_secs(5))
///         .await
///         .unwrap();
///     println!("{summary}");
/// }
/// ```
#[pin_project::pin_project]
pub struct Scenario {
    config: ScenarioConfig,
    runner: RunnerConfig,
    runner_fut: Option<Pin<Box<dyn Future<Output = Result<Summary, ScenarioError>> + Send>>>,
}

impl Scenario {
    pub fn new(config: ScenarioConfig) -> Self {
        Self {
            config,
            runner: RunnerConfig::default(),
            runner_fut: None,
        }
    }

    pub fn with_runner(mut self, runner: RunnerConfig) -> Self {
        self.runner = runner;
        self
    }

    /// Report progress of the run to `progress`.
    pub fn progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.runner.progress = progress;
        self
    }

    /// Bound every single interaction by `timeout`.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.runner.request_timeout = timeout;
        self
    }
}

impl Future for Scenario {
    type Output = Result<Summary, ScenarioError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        if this.runner_fut.is_none() {
            let config = this.config.clone();
            let runner = this.runner.clone();
            *this.runner_fut = Some(Box::pin(run_scenario(config, runner)));
        }

        if let Some(runner) = this.runner_fut {
            runner.as_mut().poll(cx)
        } else {
            unreachable!()
        }
    }
}

#[instrument(name = "scenario", skip_all, fields(url = %config.url, method = %config.method))]
pub(crate) async fn run_scenario(
    config: ScenarioConfig,
    runner: RunnerConfig,
) -> Result<Summary, ScenarioError> {
    enter(Phase::Validating);
    let descriptor = match ScenarioDescriptor::try_from(&config) {
        Ok(descriptor) => descriptor,
        Err(err) => {
            enter(Phase::Failed);
            return Err(err);
        }
    };
    info!(
        "Running {} against {} with {} users across {} workers for {}",
        descriptor.method.name(),
        descriptor.endpoint,
        descriptor.users,
        descriptor.workers,
        humantime::format_duration(descriptor.duration),
    );

    enter(Phase::Running);
    runner.progress.start(&descriptor);
    let plan = Arc::new(Plan {
        sink: Arc::new(MetricsSink::new(descriptor.method.name())),
        descriptor,
        request_timeout: runner.request_timeout,
        progress: runner.progress.clone(),
    });
    join_workers(launch_workers(&plan)).await;
    runner.progress.finish();

    enter(Phase::Aggregating);
    let outcomes = plan.sink.snapshot();
    let summary = Summary::new(&plan.descriptor, &outcomes);

    enter(Phase::Done);
    info!("Scenario complete: {summary}");
    Ok(summary)
}

fn enter(phase: Phase) {
    info!(?phase, "Scenario phase");
}

fn launch_workers(plan: &Arc<Plan>) -> Vec<(usize, Completion)> {
    let shares = partition(plan.descriptor.users, plan.descriptor.workers);

    let mut completions = Vec::with_capacity(shares.len());
    for (index, users) in shares.into_iter().enumerate() {
        if users == 0 {
            continue;
        }

        match Worker::new(index, users, plan.clone()).spawn() {
            Ok(completion) => completions.push((index, completion)),
            Err(err) => error!("Worker {index} failed to launch: {err}"),
        }
    }
    completions
}

/// Wait for every launched worker. A failed worker never affects its siblings.
async fn join_workers(completions: Vec<(usize, Completion)>) {
    for (index, completion) in completions {
        let res = completion.await.unwrap_or(Err(WorkerError::Lost));
        if let Err(err) = res {
            error!("Worker {index} failed: {err}");
        }
    }
}

/// Split `users` across `workers` as evenly as possible.
///
/// Shares differ by at most one, with the remainder going to the first workers.
pub fn partition(users: usize, workers: usize) -> Vec<usize> {
    if workers == 0 {
        return vec![];
    }

    let base = users / workers;
    let remainder = users % workers;
    (0..workers)
        .map(|i| base + usize::from(i < remainder))
        .collect()
}

/// Run scenarios one after another.
///
/// A scenario that fails to set up is logged and skipped; the returned summaries are those of
/// the scenarios that ran, in order.
pub async fn run_batch<I>(configs: I, runner: &RunnerConfig) -> Vec<Summary>
where
    I: IntoIterator<Item = ScenarioConfig>,
{
    let mut summaries = vec![];
    for config in configs {
        let url = config.url.clone();
        match Scenario::new(config).with_runner(runner.clone()).await {
            Ok(summary) => summaries.push(summary),
            Err(err) => error!("Skipping scenario for {url}: {err}"),
        }
    }
    summaries
}
