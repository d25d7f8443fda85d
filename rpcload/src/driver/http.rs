use super::{check_response, InteractionError, OneShot};
use reqwest::{Client, StatusCode};
use rpcload_core::Outcome;
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;
#[allow(unused)]
use tracing::{debug, error, trace};
use url::Url;

/// Issues JSON-RPC calls as HTTP POST requests.
///
/// Cheap to share: the underlying client pools connections and is safe for concurrent use.
#[derive(Clone)]
pub(crate) struct HttpDriver {
    client: Client,
    endpoint: Url,
}

impl HttpDriver {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    /// POST `request` and read the full body, measuring the round-trip.
    async fn exchange(
        &self,
        request: &Value,
    ) -> Result<(StatusCode, Vec<u8>, Duration), InteractionError> {
        let start = Instant::now();
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        Ok((status, body.to_vec(), start.elapsed()))
    }
}

fn judge(status: StatusCode, body: &[u8]) -> Result<(), InteractionError> {
    if !status.is_success() {
        return Err(InteractionError::Status(status));
    }
    check_response(body)
}

impl OneShot for HttpDriver {
    async fn call(&self, request: Value) -> Outcome {
        let (status, body, latency) = match self.exchange(&request).await {
            Ok(reply) => reply,
            Err(err) => {
                debug!("Request to {} failed: {err}", self.endpoint);
                return Outcome::failure();
            }
        };

        match judge(status, &body) {
            Ok(()) => Outcome::success(latency),
            Err(err) => {
                debug!("Request to {} was rejected: {err}", self.endpoint);
                Outcome::rejected(latency)
            }
        }
    }
}
