pub mod runtime;

mod error;
mod progress;
mod report;
mod scenarios;

pub use crate::error::RuntimeError;
pub use crate::progress::ProgressDisplay;
pub use crate::report::write_report;
pub use crate::runtime::RpcLoadRuntime;
pub use crate::scenarios::load_scenarios;
