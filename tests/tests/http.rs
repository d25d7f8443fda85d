mod utils;
#[allow(unused)]
use utils::*;

use mock_service::MockNode;
use ntest::assert_about_eq;
use rpcload::prelude::*;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn all_requests_succeed() {
    init();
    let addr = MockNode::new().spawn().await;

    let config = ScenarioConfig::new(&format!("http://{addr}/"), "eth_blockNumber")
        .duration(Duration::from_millis(500))
        .users(5)
        .workers(1);
    let summary = Scenario::new(config).await.unwrap();

    let stats = &summary.stats;
    assert!(stats.total > 0);
    assert_eq!(stats.failed, 0);
    assert_about_eq!(stats.failed_pct, 0.);
    assert!(stats.min_latency <= stats.avg_latency);
    assert!(stats.avg_latency <= stats.max_latency);
    assert_eq!(summary.users, 5);
    assert_eq!(summary.method, "eth_blockNumber");
}

#[tokio::test]
async fn users_are_spread_across_workers() {
    init();
    let addr = MockNode::new().spawn().await;
    let ticks = Arc::new(Ticks::default());

    let config = ScenarioConfig::new(&format!("http://{addr}/"), "eth_getBalance")
        .duration(Duration::from_millis(300))
        .users(7)
        .workers(3);
    let summary = Scenario::new(config)
        .progress(ticks.clone())
        .await
        .unwrap();

    assert_eq!(summary.workers, 3);
    assert!(summary.stats.total >= 7);
    assert_eq!(summary.stats.failed, 0);
    // one tick per finished virtual user
    assert_eq!(ticks.count(), 7);
}

#[tokio::test]
async fn more_workers_than_users() {
    init();
    let addr = MockNode::new().spawn().await;

    let config = ScenarioConfig::new(&format!("http://{addr}/"), "eth_call")
        .duration(Duration::from_millis(200))
        .users(2)
        .workers(5);
    let summary = Scenario::new(config).await.unwrap();

    assert!(summary.stats.total >= 2);
    assert_eq!(summary.stats.failed, 0);
}

#[tokio::test]
async fn connection_refused() {
    init();
    let addr = closed_port();

    let config = ScenarioConfig::new(&format!("http://{addr}/"), "eth_blockNumber")
        .duration(Duration::from_millis(200))
        .users(2)
        .workers(1);
    let summary = Scenario::new(config)
        .request_timeout(Duration::from_secs(1))
        .await
        .unwrap();

    let stats = &summary.stats;
    assert!(stats.total > 0);
    assert_eq!(stats.succeeded, 0);
    assert_about_eq!(stats.failed_pct, 100.);
    assert_eq!(stats.min_latency, Duration::ZERO);
    assert_eq!(stats.max_latency, Duration::ZERO);
    assert_eq!(stats.avg_latency, Duration::ZERO);
}

#[tokio::test]
async fn rpc_errors_are_counted_as_failures() {
    init();
    let addr = MockNode::new().spawn().await;

    let config = ScenarioConfig::new(&format!("http://{addr}/error"), "eth_getTransactionReceipt")
        .duration(Duration::from_millis(200))
        .users(3);
    let summary = Scenario::new(config).await.unwrap();

    assert!(summary.stats.total > 0);
    assert_eq!(summary.stats.failed, summary.stats.total);
    assert_eq!(summary.stats.avg_latency, Duration::ZERO);
}

#[tokio::test]
async fn slow_node_is_bounded_by_the_request_timeout() {
    init();
    let addr = MockNode::new().spawn().await;

    let config = ScenarioConfig::new(&format!("http://{addr}/delay/ms/5000"), "eth_blockNumber")
        .duration(Duration::from_millis(100))
        .users(2);

    let start = std::time::Instant::now();
    let summary = Scenario::new(config)
        .request_timeout(Duration::from_millis(200))
        .await
        .unwrap();

    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(summary.stats.total, 2);
    assert_eq!(summary.stats.failed, 2);
}
