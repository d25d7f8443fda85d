mod config;
mod constants;
mod data;
mod error;
mod methods;
mod stats;

pub use config::*;
pub use constants::*;
pub use data::*;
pub use error::*;
pub use methods::*;
pub use stats::*;
