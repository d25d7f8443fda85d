mod utils;
#[allow(unused)]
use utils::*;

use mock_service::MockNode;
use rpcload::prelude::*;
use std::time::Duration;

#[tokio::test]
#[tracing_test::traced_test]
async fn batch_continues_past_invalid_scenarios() {
    let addr = MockNode::new().spawn().await;
    let url = format!("http://{addr}/");

    let configs = vec![
        ScenarioConfig::new(&url, "eth_blockNumber").duration(Duration::from_millis(200)),
        ScenarioConfig::new(&url, "eth_nope"),
        ScenarioConfig::new("gopher://127.0.0.1", "eth_call"),
        ScenarioConfig::new(&url, "eth_call").workers(0),
        ScenarioConfig::new(&url, "eth_getBlockByNumber")
            .duration(Duration::from_millis(200))
            .users(2),
    ];
    let summaries = run_batch(configs, &RunnerConfig::default()).await;

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].method, "eth_blockNumber");
    assert_eq!(summaries[1].method, "eth_getBlockByNumber");
    assert!(summaries.iter().all(|s| s.stats.failed == 0));
    assert!(logs_contain("Skipping scenario"));
}
