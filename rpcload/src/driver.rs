//! Transport drivers
//!
//! A driver performs protocol interactions and turns every failure into a failed
//! [`Outcome`]. Nothing crosses the driver boundary as an error.
mod http;
mod stream;

pub(crate) use http::HttpDriver;
pub(crate) use stream::StreamDriver;

use rpcload_core::Outcome;
use serde_json::{Map, Value};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// A driver completing one request/response exchange per call.
pub(crate) trait OneShot: Send + Sync + 'static {
    fn call(&self, request: Value) -> impl Future<Output = Outcome> + Send;
}

#[derive(Debug, Error)]
pub(crate) enum InteractionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Response is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Response is not a JSON-RPC object")]
    NotAnObject,

    #[error("JSON-RPC error: {0}")]
    Rpc(Value),

    #[error("Response carries no result")]
    NoResult,

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Connection closed by peer")]
    Closed,
}

impl InteractionError {
    /// Fatal errors leave the connection unusable; nothing more will arrive on it.
    pub fn is_fatal(&self) -> bool {
        match self {
            InteractionError::Closed => true,
            InteractionError::WebSocket(err) => {
                !matches!(err, tungstenite::Error::Utf8 | tungstenite::Error::Capacity(_))
            }
            _ => false,
        }
    }
}

/// Accept any JSON object without an `error` member.
pub(crate) fn check_response(body: &[u8]) -> Result<(), InteractionError> {
    parse_reply(body).map(|_| ())
}

/// Accept a JSON-RPC reply that positively acknowledges the request.
pub(crate) fn check_ack(body: &str) -> Result<(), InteractionError> {
    let reply = parse_reply(body.as_bytes())?;
    if reply.contains_key("result") {
        Ok(())
    } else {
        Err(InteractionError::NoResult)
    }
}

fn parse_reply(body: &[u8]) -> Result<Map<String, Value>, InteractionError> {
    match serde_json::from_slice(body)? {
        Value::Object(fields) => match fields.get("error") {
            Some(error) => Err(InteractionError::Rpc(error.clone())),
            None => Ok(fields),
        },
        _ => Err(InteractionError::NotAnObject),
    }
}
