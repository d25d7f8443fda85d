use std::time::Duration;

/// JSON-RPC protocol version placed in every request envelope.
pub const JSONRPC_VERSION: &str = "2.0";

/// Scenario duration used when a config does not specify one.
pub const DEFAULT_DURATION: Duration = Duration::from_secs(60);

/// Upper bound for a single interaction (HTTP round-trip, WebSocket connect or receive).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// File name used by the CSV reporter when no output path is given.
pub const DEFAULT_REPORT_PATH: &str = "metrics_statistics.csv";
