//! A fake JSON-RPC node for exercising the load generator.
//!
//! Routes:
//! - `POST /`: answers any request with a `result`
//! - `POST /error`: answers with a JSON-RPC `error`
//! - `POST /status/:code`: answers with the given HTTP status
//! - `POST /delay/ms/:delay_ms`: answers with a `result` after a delay
//! - `GET /ws`: WebSocket endpoint; acknowledges `eth_subscribe` and then pushes `newHeads`
//!   notifications at the configured interval
use axum::{
    debug_handler,
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};
#[allow(unused)]
use metrics::{counter, gauge, histogram};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::MissedTickBehavior;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

pub const SUBSCRIPTION_ID: &str = "0xcd0c3e8af590364c09d0fa6a1210faf5";

#[derive(Clone, Debug)]
pub struct MockNode {
    push_interval: Duration,
    close_after: Option<usize>,
}

impl Default for MockNode {
    fn default() -> Self {
        Self {
            push_interval: Duration::from_millis(100),
            close_after: None,
        }
    }
}

impl MockNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interval between two pushed subscription notifications.
    pub fn push_interval(mut self, interval: Duration) -> Self {
        self.push_interval = interval;
        self
    }

    /// Close every subscription after `pushes` notifications.
    pub fn close_after(mut self, pushes: usize) -> Self {
        self.close_after = Some(pushes);
        self
    }

    pub fn router(self) -> Router {
        Router::new()
            .route("/", post(rpc))
            .route("/error", post(rpc_error))
            .route("/status/:code", post(status))
            .route("/delay/ms/:delay_ms", post(delay))
            .route("/ws", get(ws))
            .layer(TraceLayer::new_for_http())
            .with_state(self)
    }

    pub async fn serve(self, addr: SocketAddr) -> std::io::Result<()> {
        let listener = TcpListener::bind(&addr).await?;
        axum::serve(listener, self.router()).await
    }

    /// Serve on an ephemeral local port in the background, returning the bound address.
    ///
    /// Intended for tests: panics if no local port can be bound.
    pub async fn spawn(self) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = self.router();
        tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, router).await {
                error!("Mock node stopped: {err}");
            }
        });
        addr
    }
}

/** Handlers **/

#[debug_handler]
async fn rpc(Json(request): Json<Value>) -> Json<Value> {
    Json(reply(&request))
}

#[debug_handler]
async fn rpc_error(Json(request): Json<Value>) -> Json<Value> {
    record(&request);
    Json(json!({
        "jsonrpc": "2.0",
        "id": request["id"],
        "error": {"code": -32000, "message": "header not found"},
    }))
}

#[debug_handler]
async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

#[debug_handler]
async fn delay(Path(delay_ms): Path<u64>, Json(request): Json<Value>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    Json(reply(&request))
}

async fn ws(State(node): State<MockNode>, upgrade: WebSocketUpgrade) -> Response {
    upgrade.on_upgrade(move |socket| subscription(socket, node))
}

async fn subscription(mut socket: WebSocket, node: MockNode) {
    let mut subscribed = false;
    let mut pushes = 0;
    let mut ticker = tokio::time::interval(node.push_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let outgoing = tokio::select! {
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let Ok(request) = serde_json::from_str::<Value>(&text) else {
                        debug!("Ignoring malformed request {text}");
                        continue;
                    };
                    if request["method"] == "eth_subscribe" {
                        subscribed = true;
                        ticker.reset();
                    }
                    reply(&request)
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => continue,
            },
            _ = ticker.tick(), if subscribed => {
                if node.close_after == Some(pushes) {
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                }
                pushes += 1;
                notification(pushes)
            }
        };

        if socket.send(Message::Text(outgoing.to_string())).await.is_err() {
            break;
        }
    }
}

/** Replies **/

fn reply(request: &Value) -> Value {
    record(request);
    let result = match request["method"].as_str() {
        Some("eth_subscribe") => json!(SUBSCRIPTION_ID),
        Some("eth_blockNumber") => json!(format!("{:#x}", BLOCK_NUMBER.load(Ordering::Relaxed))),
        Some("eth_getBalance") => json!("0x0"),
        Some("eth_sendRawTransaction") | Some("eth_getTransactionByHash") => {
            json!("0x0000000000000000000000000000000000000000000000000000000000000000")
        }
        _ => Value::Null,
    };
    json!({"jsonrpc": "2.0", "id": request["id"], "result": result})
}

fn notification(seq: usize) -> Value {
    let number = BLOCK_NUMBER.fetch_add(1, Ordering::Relaxed);
    json!({
        "jsonrpc": "2.0",
        "method": "eth_subscription",
        "params": {
            "subscription": SUBSCRIPTION_ID,
            "result": {"number": format!("{number:#x}"), "seq": seq},
        },
    })
}

fn record(request: &Value) {
    let method = request["method"].as_str().unwrap_or("unknown").to_string();
    counter!("mock_node_requests", "method" => method).increment(1);
    REQUESTS.fetch_add(1, Ordering::Relaxed);
}

/** Request Printer **/

static BLOCK_NUMBER: AtomicU64 = AtomicU64::new(0x1b4);
static REQUESTS: AtomicU64 = AtomicU64::new(0);

pub async fn rps_measure_task() {
    loop {
        tokio::time::sleep(Duration::from_millis(1000)).await;
        let requests = REQUESTS.swap(0, Ordering::Relaxed);
        tracing::info!("{requests} requests/s");
    }
}
