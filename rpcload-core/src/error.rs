use thiserror::Error;

/// Errors raised while validating a scenario. Nothing has been launched when one of these is
/// returned.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("Unsupported URL scheme `{0}` (expected http, https, ws or wss)")]
    UnsupportedScheme(String),

    #[error("Error in parsing URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),
}
