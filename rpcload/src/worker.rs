//! Workers
//!
//! A worker is an OS thread with its own async runtime hosting a share of a scenario's virtual
//! users. Workers share nothing with each other except the [`Plan`].
use crate::driver::{HttpDriver, StreamDriver};
use crate::progress::Progress;
use crate::sink::MetricsSink;
use crate::user;
use rpcload_core::{ScenarioDescriptor, Transport};
use std::future::Future;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::oneshot;
use tokio::task::JoinSet;
#[allow(unused)]
use tracing::{debug, error, info, instrument, trace, warn, Instrument};

/// Everything the virtual users of one scenario run share.
pub(crate) struct Plan {
    pub descriptor: ScenarioDescriptor,
    pub request_timeout: Duration,
    pub sink: Arc<MetricsSink>,
    pub progress: Arc<dyn Progress>,
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Failed to build worker runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Worker exited without reporting")]
    Lost,
}

pub(crate) type Completion = oneshot::Receiver<Result<(), WorkerError>>;

pub(crate) struct Worker {
    index: usize,
    users: usize,
    plan: Arc<Plan>,
}

impl Worker {
    pub fn new(index: usize, users: usize, plan: Arc<Plan>) -> Self {
        Self { index, users, plan }
    }

    /// Start the worker on a dedicated thread.
    ///
    /// The returned receiver resolves once every virtual user of this worker has finished. If
    /// the thread dies without reporting, the sender is dropped and the receiver errors.
    pub fn spawn(self) -> Result<Completion, WorkerError> {
        let (tx, rx) = oneshot::channel();
        let span = tracing::Span::current();

        thread::Builder::new()
            .name(format!("rpcload-worker-{}", self.index))
            .spawn(move || {
                let _guard = span.enter();
                // NOTE: The receiver is only gone if the scenario itself was dropped.
                let _ = tx.send(self.run());
            })
            .map_err(WorkerError::Spawn)?;

        Ok(rx)
    }

    #[instrument(name = "worker", skip_all, fields(worker = self.index, users = self.users))]
    fn run(self) -> Result<(), WorkerError> {
        let runtime = self.runtime()?;
        let plan = self.plan;
        let users = self.users;

        runtime.block_on(async move {
            debug!("Starting {users} virtual users");

            let descriptor = &plan.descriptor;
            match descriptor.transport {
                Transport::Http => {
                    let driver = Arc::new(HttpDriver::new(
                        descriptor.endpoint.clone(),
                        plan.request_timeout,
                    )?);
                    run_users(users, || user::request_loop(driver.clone(), plan.clone())).await;
                }
                Transport::WebSocket => {
                    let driver = Arc::new(StreamDriver::new(
                        descriptor.endpoint.clone(),
                        plan.request_timeout,
                    ));
                    if descriptor.method.is_streaming() {
                        run_users(users, || user::subscription(driver.clone(), plan.clone())).await;
                    } else {
                        run_users(users, || user::request_loop(driver.clone(), plan.clone())).await;
                    }
                }
            }

            debug!("All virtual users finished");
            Ok::<_, WorkerError>(())
        })
    }

    fn runtime(&self) -> Result<Runtime, WorkerError> {
        let mut builder = match self.plan.descriptor.transport {
            Transport::Http => {
                let mut builder = Builder::new_multi_thread();
                builder.worker_threads(self.http_threads());
                builder
            }
            Transport::WebSocket => Builder::new_current_thread(),
        };

        builder
            .thread_name(format!("rpcload-worker-{}-rt", self.index))
            .enable_all()
            .build()
            .map_err(WorkerError::Runtime)
    }

    /// One runtime thread per virtual user, bounded by the available cores.
    fn http_threads(&self) -> usize {
        let cores = thread::available_parallelism().map_or(1, |n| n.get());
        self.users.clamp(1, cores)
    }
}

/// Run `users` concurrent copies of `user` and wait for all of them.
async fn run_users<T, F>(users: usize, user: T)
where
    T: Fn() -> F,
    F: Future<Output = ()> + Send + 'static,
{
    let mut set = JoinSet::new();
    for _ in 0..users {
        set.spawn(user().in_current_span());
    }

    while let Some(res) = set.join_next().await {
        if let Err(err) = res {
            error!("Virtual user failed: {err}");
        }
    }
}
