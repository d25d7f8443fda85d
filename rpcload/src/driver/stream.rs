use super::{check_ack, InteractionError, OneShot};
use futures_util::{SinkExt, StreamExt};
use rpcload_core::Outcome;
use serde_json::Value;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{timeout, Instant};
use tokio_tungstenite::{
    connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream,
};
#[allow(unused)]
use tracing::{debug, error, trace};
use url::Url;

type Connection = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Drives JSON-RPC over a WebSocket connection.
///
/// Every connect and every receive is bounded by `timeout`.
#[derive(Clone)]
pub(crate) struct StreamDriver {
    endpoint: Url,
    timeout: Duration,
}

impl StreamDriver {
    pub fn new(endpoint: Url, timeout: Duration) -> Self {
        Self { endpoint, timeout }
    }

    /// Run one connection lifecycle, emitting an outcome per interaction.
    ///
    /// Opens a connection and performs the initial exchange for `request`. With a `deadline`
    /// the connection then keeps receiving pushed messages until the deadline passes.
    pub async fn run<E>(&self, request: Value, deadline: Option<Instant>, mut emit: E)
    where
        E: FnMut(Outcome),
    {
        let mut conn = match self.connect().await {
            Ok(conn) => conn,
            Err(err) => {
                debug!("Failed to connect to {}: {err}", self.endpoint);
                emit(Outcome::failure());
                return;
            }
        };

        match self.initial_exchange(&mut conn, &request).await {
            Ok((latency, reply)) => match check_ack(&reply) {
                Ok(()) => emit(Outcome::success(latency)),
                Err(err) => {
                    debug!("Request to {} was rejected: {err}", self.endpoint);
                    emit(Outcome::rejected(latency));
                }
            },
            Err(err) => {
                debug!("Initial exchange with {} failed: {err}", self.endpoint);
                emit(Outcome::failure());
            }
        }

        if let Some(deadline) = deadline {
            self.receive_loop(&mut conn, deadline, &mut emit).await;
        }

        if let Err(err) = conn.close(None).await {
            trace!("Error closing connection to {}: {err}", self.endpoint);
        }
    }

    async fn connect(&self) -> Result<Connection, InteractionError> {
        let (conn, _) = timeout(self.timeout, connect_async(self.endpoint.as_str()))
            .await
            .map_err(|_| InteractionError::Timeout(self.timeout))??;
        Ok(conn)
    }

    async fn initial_exchange(
        &self,
        conn: &mut Connection,
        request: &Value,
    ) -> Result<(Duration, String), InteractionError> {
        let start = Instant::now();
        conn.send(Message::Text(request.to_string())).await?;
        let reply = self.next_message(conn).await?;

        Ok((start.elapsed(), reply))
    }

    async fn receive_loop<E>(&self, conn: &mut Connection, deadline: Instant, emit: &mut E)
    where
        E: FnMut(Outcome),
    {
        while Instant::now() < deadline {
            // NOTE: Latency is the time spent waiting on this receive, i.e. inter-arrival time.
            let start = Instant::now();
            match self.next_message(conn).await {
                Ok(_) => emit(Outcome::success(start.elapsed())),
                Err(err) if err.is_fatal() => {
                    debug!("Subscription to {} ended early: {err}", self.endpoint);
                    emit(Outcome::failure());
                    break;
                }
                Err(err) => {
                    debug!("Error receiving from {}: {err}", self.endpoint);
                    emit(Outcome::failure());
                }
            }
        }
    }

    /// Wait for the next data message, skipping control frames.
    async fn next_message(&self, conn: &mut Connection) -> Result<String, InteractionError> {
        loop {
            let message = timeout(self.timeout, conn.next())
                .await
                .map_err(|_| InteractionError::Timeout(self.timeout))?;

            match message {
                None | Some(Ok(Message::Close(_))) => return Err(InteractionError::Closed),
                Some(Err(err)) => return Err(err.into()),
                Some(Ok(Message::Text(text))) => return Ok(text),
                Some(Ok(Message::Binary(bytes))) => return Ok(String::from_utf8(bytes)?),
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => continue,
            }
        }
    }
}

impl OneShot for StreamDriver {
    async fn call(&self, request: Value) -> Outcome {
        let mut outcome = Outcome::failure();
        self.run(request, None, |o| outcome = o).await;
        outcome
    }
}
