use crate::error::RuntimeError;
use rpcload_core::ScenarioConfig;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    scenarios: Vec<ScenarioConfig>,
}

/// Read the `scenarios:` list of a YAML scenario file.
///
/// ```yaml
/// scenarios:
///   - url: http://127.0.0.1:8545
///     duration: 1
///     users: 10
///     workers: 2
///     method: eth_blockNumber
/// ```
pub fn load_scenarios(path: impl AsRef<Path>) -> Result<Vec<ScenarioConfig>, RuntimeError> {
    let text = std::fs::read_to_string(path)?;
    parse_scenarios(&text)
}

fn parse_scenarios(text: &str) -> Result<Vec<ScenarioConfig>, RuntimeError> {
    let file: ScenarioFile = serde_yaml::from_str(text)?;
    Ok(file.scenarios)
}
