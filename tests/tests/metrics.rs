use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use mock_service::MockNode;
use rpcload::prelude::*;
use std::time::Duration;

// NOTE: Installs a global recorder, so this binary holds a single test.
#[tokio::test]
async fn outcomes_are_mirrored_to_metrics() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder.install().unwrap();

    let addr = MockNode::new().spawn().await;
    let config = ScenarioConfig::new(&format!("http://{addr}/"), "eth_blockNumber")
        .duration(Duration::from_millis(200))
        .users(2);
    let summary = Scenario::new(config).await.unwrap();

    let mut successes = 0;
    let mut latencies = 0;
    for (key, _, _, value) in snapshotter.snapshot().into_vec() {
        let key = key.key();
        if !key.name().starts_with("rpcload_") {
            // mock node metrics
            continue;
        }
        assert!(key
            .labels()
            .any(|l| l.key() == "method" && l.value() == "eth_blockNumber"));

        match (key.name(), value) {
            ("rpcload_success", DebugValue::Counter(n)) => successes += n,
            ("rpcload_latency", DebugValue::Histogram(values)) => latencies += values.len() as u64,
            ("rpcload_error", DebugValue::Counter(n)) => assert_eq!(n, 0),
            (name, _) => panic!("unexpected metric {name}"),
        }
    }

    assert_eq!(successes, summary.stats.total);
    assert_eq!(latencies, summary.stats.total);
}
