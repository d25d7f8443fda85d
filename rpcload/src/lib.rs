#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod progress;
pub mod scenario;

pub(crate) mod driver;
pub(crate) mod sink;
pub(crate) mod user;
pub(crate) mod worker;

pub use progress::{NoProgress, Progress};
pub use scenario::{partition, run_batch, Phase, RunnerConfig, Scenario};
pub use worker::WorkerError;

pub mod prelude {
    pub use crate::progress::{NoProgress, Progress};
    pub use crate::scenario::{run_batch, RunnerConfig, Scenario};

    pub use rpcload_core::{
        MethodRegistry, ScenarioConfig, ScenarioDescriptor, ScenarioError, Statistics, Summary,
    };
}
