//! Catalog of JSON-RPC request templates
use crate::{ScenarioError, JSONRPC_VERSION};
use lazy_static::lazy_static;
use serde_json::{json, Value};
use std::collections::BTreeMap;

const ZERO_HASH: &str = "0x0000000000000000000000000000000000000000000000000000000000000000";
const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

lazy_static! {
    static ref REGISTRY: MethodRegistry = MethodRegistry::builtin();
}

/// Request template for one JSON-RPC method.
///
/// The template is a prototype. Use [`MethodSpec::request`] to get a copy with the per-call
/// fields filled in.
#[derive(Debug, Clone)]
pub struct MethodSpec {
    name: &'static str,
    payload: Value,
    streaming: bool,
}

impl MethodSpec {
    fn call(name: &'static str, params: Value) -> Self {
        Self {
            name,
            payload: envelope(name, params),
            streaming: false,
        }
    }

    fn subscription(name: &'static str, params: Value) -> Self {
        Self {
            name,
            payload: envelope(name, params),
            streaming: true,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Streaming methods keep receiving server pushes after the initial exchange.
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub fn template(&self) -> &Value {
        &self.payload
    }

    /// Build a request from the template with the given request id.
    pub fn request(&self, id: u64) -> Value {
        let mut request = self.payload.clone();
        if let Some(fields) = request.as_object_mut() {
            fields.insert("id".to_string(), Value::from(id));
        }
        request
    }
}

fn envelope(method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "method": method,
        "params": params,
        "id": 1,
    })
}

/// Immutable, process-wide set of supported methods.
#[derive(Debug)]
pub struct MethodRegistry {
    methods: BTreeMap<&'static str, MethodSpec>,
}

impl MethodRegistry {
    pub fn global() -> &'static MethodRegistry {
        &REGISTRY
    }

    pub fn lookup(&self, name: &str) -> Result<&MethodSpec, ScenarioError> {
        self.methods
            .get(name)
            .ok_or_else(|| ScenarioError::UnsupportedMethod(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.methods.keys().copied()
    }

    fn builtin() -> Self {
        let methods = [
            MethodSpec::call("eth_blockNumber", json!([])),
            MethodSpec::call("eth_getBlockByNumber", json!(["latest", false])),
            MethodSpec::call("eth_getBlockByHash", json!([ZERO_HASH, false])),
            MethodSpec::call("eth_getTransactionByHash", json!([ZERO_HASH])),
            MethodSpec::call("eth_getTransactionReceipt", json!([ZERO_HASH])),
            MethodSpec::call(
                "eth_call",
                json!([{ "to": ZERO_ADDRESS, "data": "0x" }, "latest"]),
            ),
            MethodSpec::call("eth_sendRawTransaction", json!(["0x"])),
            MethodSpec::call("eth_getBalance", json!([ZERO_ADDRESS, "latest"])),
            MethodSpec::subscription("eth_subscribe", json!(["newHeads"])),
        ];

        Self {
            methods: methods.into_iter().map(|m| (m.name, m)).collect(),
        }
    }
}
