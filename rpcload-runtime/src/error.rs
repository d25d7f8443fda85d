use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("No scenario to run")]
    NoScenario,

    #[error("Missing argument `--{0}` (required when no config file is given)")]
    MissingArgument(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error in parsing scenario file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Error in writing report: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to install Prometheus exporter: {0}")]
    Prometheus(#[from] metrics_exporter_prometheus::BuildError),
}
