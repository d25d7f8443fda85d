use crate::{MethodRegistry, MethodSpec, ScenarioError, DEFAULT_DURATION};
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use url::Url;

/// Raw scenario input as it comes from a config file or the command line.
///
/// Nothing is checked here; convert into a [`ScenarioDescriptor`] to validate.
#[derive(Clone, Debug, Deserialize)]
pub struct ScenarioConfig {
    pub url: String,
    /// Whole minutes (`5`) or a humantime string (`"90s"`, `"2m"`).
    #[serde(default = "default_duration", deserialize_with = "deserialize_duration")]
    pub duration: Duration,
    pub users: usize,
    pub workers: usize,
    pub method: String,
}

impl ScenarioConfig {
    pub fn new(url: &str, method: &str) -> Self {
        Self {
            url: url.to_string(),
            duration: DEFAULT_DURATION,
            users: 1,
            workers: 1,
            method: method.to_string(),
        }
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn minutes(self, minutes: u64) -> Self {
        self.duration(Duration::from_secs(minutes.saturating_mul(60)))
    }

    pub fn users(mut self, users: usize) -> Self {
        self.users = users;
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }
}

fn default_duration() -> Duration {
    DEFAULT_DURATION
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDuration {
        Minutes(u64),
        Human(String),
    }

    match RawDuration::deserialize(deserializer)? {
        RawDuration::Minutes(minutes) => Ok(Duration::from_secs(minutes.saturating_mul(60))),
        RawDuration::Human(text) => {
            humantime::parse_duration(&text).map_err(serde::de::Error::custom)
        }
    }
}

/// Wire protocol implied by the endpoint's URL scheme.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Transport {
    Http,
    WebSocket,
}

impl Transport {
    pub fn from_scheme(scheme: &str) -> Result<Self, ScenarioError> {
        match scheme {
            "http" | "https" => Ok(Transport::Http),
            "ws" | "wss" => Ok(Transport::WebSocket),
            other => Err(ScenarioError::UnsupportedScheme(other.to_string())),
        }
    }
}

/// A validated scenario. Read-only once built.
#[derive(Debug, Clone)]
pub struct ScenarioDescriptor {
    pub endpoint: Url,
    pub transport: Transport,
    pub duration: Duration,
    pub users: usize,
    pub workers: usize,
    pub method: &'static MethodSpec,
}

impl ScenarioDescriptor {
    pub fn duration_minutes(&self) -> f64 {
        self.duration.as_secs_f64() / 60.
    }
}

impl TryFrom<&ScenarioConfig> for ScenarioDescriptor {
    type Error = ScenarioError;

    fn try_from(config: &ScenarioConfig) -> Result<Self, Self::Error> {
        let endpoint = Url::parse(&config.url)?;
        let transport = Transport::from_scheme(endpoint.scheme())?;
        let method = MethodRegistry::global().lookup(&config.method)?;

        if config.users == 0 {
            return Err(ScenarioError::InvalidScenario(
                "user count must be positive".to_string(),
            ));
        }
        if config.workers == 0 {
            return Err(ScenarioError::InvalidScenario(
                "worker count must be positive".to_string(),
            ));
        }
        if config.duration.is_zero() {
            return Err(ScenarioError::InvalidScenario(
                "duration must be positive".to_string(),
            ));
        }
        if method.is_streaming() && transport != Transport::WebSocket {
            return Err(ScenarioError::InvalidScenario(format!(
                "{} requires a ws:// or wss:// endpoint",
                method.name()
            )));
        }

        Ok(Self {
            endpoint,
            transport,
            duration: config.duration,
            users: config.users,
            workers: config.workers,
            method,
        })
    }
}

impl TryFrom<ScenarioConfig> for ScenarioDescriptor {
    type Error = ScenarioError;

    fn try_from(config: ScenarioConfig) -> Result<Self, Self::Error> {
        Self::try_from(&config)
    }
}
