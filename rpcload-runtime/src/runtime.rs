//! Command-line runtime
//!
//! Turns command-line arguments or a YAML scenario file into a batch of scenarios, runs them
//! one after another and writes the CSV report.
use crate::{error::RuntimeError, load_scenarios, write_report, ProgressDisplay};
use clap::{builder::PossibleValuesParser, Parser};
use metrics_exporter_prometheus::PrometheusBuilder;
use rpcload::{run_batch, NoProgress, Progress, RunnerConfig};
use rpcload_core::{
    MethodRegistry, ScenarioConfig, Summary, DEFAULT_REPORT_PATH, DEFAULT_REQUEST_TIMEOUT,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
#[allow(unused)]
use tracing::{debug, error, info, instrument, warn};

#[derive(Parser, Debug)]
#[command(version, about = "Load generator for blockchain JSON-RPC endpoints")]
struct Cli {
    /// YAML file with a `scenarios:` list
    #[arg(short, long, conflicts_with_all = ["url", "time", "users", "workers", "method"])]
    config: Option<PathBuf>,

    /// Endpoint to test (http, https, ws or wss)
    #[arg(long)]
    url: Option<String>,

    /// Duration of the test in minutes
    #[arg(short, long)]
    time: Option<u64>,

    /// Number of concurrent virtual users
    #[arg(short, long)]
    users: Option<usize>,

    /// Number of workers the users are split across
    #[arg(short, long)]
    workers: Option<usize>,

    /// JSON-RPC method to call
    #[arg(short, long, value_parser = PossibleValuesParser::new(MethodRegistry::global().names()))]
    method: Option<String>,

    /// Where to write the CSV report
    #[arg(short, long, default_value = DEFAULT_REPORT_PATH)]
    output: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs())]
    timeout: u64,

    /// Serve Prometheus metrics on this address while running
    #[arg(long)]
    prometheus: Option<SocketAddr>,

    /// Do not render a progress bar
    #[arg(long)]
    no_progress: bool,
}

impl Cli {
    fn scenarios(&self) -> Result<Vec<ScenarioConfig>, RuntimeError> {
        if let Some(path) = &self.config {
            return load_scenarios(path);
        }

        let url = self.url.as_deref().ok_or(RuntimeError::MissingArgument("url"))?;
        let method = self
            .method
            .as_deref()
            .ok_or(RuntimeError::MissingArgument("method"))?;
        let minutes = self.time.ok_or(RuntimeError::MissingArgument("time"))?;
        let users = self.users.ok_or(RuntimeError::MissingArgument("users"))?;
        let workers = self.workers.ok_or(RuntimeError::MissingArgument("workers"))?;

        Ok(vec![ScenarioConfig::new(url, method)
            .minutes(minutes)
            .users(users)
            .workers(workers)])
    }
}

/// Default rpcload runtime.
///
/// # Example
///
/// ```no_run
/// use rpcload_runtime::RpcLoadRuntime;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     RpcLoadRuntime::new().with_args()?.run().await?;
///     Ok(())
/// }
/// ```
pub struct RpcLoadRuntime {
    scenarios: Vec<ScenarioConfig>,
    output: PathBuf,
    request_timeout: Duration,
    progress: bool,
    prometheus: Option<SocketAddr>,
}

impl Default for RpcLoadRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl RpcLoadRuntime {
    pub fn new() -> Self {
        RpcLoadRuntime {
            scenarios: vec![],
            output: PathBuf::from(DEFAULT_REPORT_PATH),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            progress: true,
            prometheus: None,
        }
    }

    /// Use the command-line arguments.
    ///
    /// Either `-c`, `--config` with a YAML scenario file, or all of `--url`, `-t`, `--time`,
    /// `-u`, `--users`, `-w`, `--workers` and `-m`, `--method` for a single scenario.
    ///
    /// # Example
    /// ```ignore
    /// $ rpcload -c scenarios.yaml -o report.csv
    /// $ rpcload --url wss://127.0.0.1:8546 -t 5 -u 100 -w 4 -m eth_subscribe
    /// ```
    pub fn with_args(self) -> Result<Self, RuntimeError> {
        self.with_cli(Cli::parse())
    }

    fn with_cli(mut self, cli: Cli) -> Result<Self, RuntimeError> {
        self.scenarios = cli.scenarios()?;
        self.output = cli.output;
        self.request_timeout = Duration::from_secs(cli.timeout);
        self.progress = !cli.no_progress;
        self.prometheus = cli.prometheus;
        Ok(self)
    }

    pub fn scenario(mut self, config: ScenarioConfig) -> Self {
        self.scenarios.push(config);
        self
    }

    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = path.into();
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn progress(mut self, enabled: bool) -> Self {
        self.progress = enabled;
        self
    }

    pub fn prometheus(mut self, addr: SocketAddr) -> Self {
        self.prometheus = Some(addr);
        self
    }

    /// Run every scenario and write the report, returning the summaries that were produced.
    #[instrument(name = "rpcload", skip_all, fields(scenarios = self.scenarios.len()))]
    pub async fn run(self) -> Result<Vec<Summary>, RuntimeError> {
        if self.scenarios.is_empty() {
            return Err(RuntimeError::NoScenario);
        }

        if let Some(addr) = self.prometheus {
            PrometheusBuilder::new().with_http_listener(addr).install()?;
            info!("Serving Prometheus metrics on {addr}");
        }

        let progress: Arc<dyn Progress> = if self.progress {
            Arc::new(ProgressDisplay::new())
        } else {
            Arc::new(NoProgress)
        };
        let runner = RunnerConfig {
            request_timeout: self.request_timeout,
            progress,
        };

        let total = self.scenarios.len();
        let summaries = run_batch(self.scenarios, &runner).await;
        if summaries.len() < total {
            warn!("{} of {total} scenarios did not run", total - summaries.len());
        }

        write_report(&self.output, &summaries)?;
        info!(
            "Wrote {} results to {}",
            summaries.len(),
            self.output.display()
        );

        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("rpcload").chain(args.iter().copied()))
    }

    #[test]
    fn single_scenario_from_flags() {
        let cli = parse(&[
            "--url",
            "http://127.0.0.1:8545",
            "-t",
            "2",
            "-u",
            "10",
            "-w",
            "3",
            "-m",
            "eth_getBalance",
        ])
        .unwrap();
        assert_eq!(cli.output, PathBuf::from(DEFAULT_REPORT_PATH));
        assert_eq!(cli.timeout, 30);

        let scenarios = cli.scenarios().unwrap();
        assert_eq!(scenarios.len(), 1);
        assert_eq!(scenarios[0].duration, Duration::from_secs(120));
        assert_eq!(scenarios[0].users, 10);
        assert_eq!(scenarios[0].workers, 3);
        assert_eq!(scenarios[0].method, "eth_getBalance");
    }

    #[test]
    fn missing_flag_is_reported() {
        let cli = parse(&["--url", "http://127.0.0.1:8545", "-t", "1", "-u", "1", "-m", "eth_call"])
            .unwrap();
        assert!(matches!(
            cli.scenarios(),
            Err(RuntimeError::MissingArgument("workers"))
        ));
    }

    #[test]
    fn method_outside_the_catalog_is_rejected() {
        assert!(parse(&["--url", "http://x", "-m", "eth_nope"]).is_err());
    }

    #[test]
    fn config_conflicts_with_flags() {
        assert!(parse(&["-c", "scenarios.yaml", "--url", "http://x"]).is_err());
        assert!(parse(&["-c", "scenarios.yaml", "--no-progress", "-o", "out.csv"]).is_ok());
    }

    #[tokio::test]
    async fn empty_runtime_has_nothing_to_run() {
        let res = RpcLoadRuntime::new().progress(false).run().await;
        assert!(matches!(res, Err(RuntimeError::NoScenario)));
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn report_is_written_when_every_scenario_fails() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("report.csv");

        let summaries = RpcLoadRuntime::new()
            .scenario(ScenarioConfig::new("ftp://127.0.0.1:8545", "eth_call"))
            .output(&output)
            .progress(false)
            .run()
            .await
            .unwrap();
        assert!(summaries.is_empty());
        assert!(logs_contain("did not run"));

        let text = std::fs::read_to_string(&output).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
