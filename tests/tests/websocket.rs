mod utils;
#[allow(unused)]
use utils::*;

use mock_service::MockNode;
use rpcload::prelude::*;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn subscription_counts_pushes() {
    init();
    let addr = MockNode::new()
        .push_interval(Duration::from_millis(200))
        .spawn()
        .await;
    let ticks = Arc::new(Ticks::default());

    let config = ScenarioConfig::new(&format!("ws://{addr}/ws"), "eth_subscribe")
        .duration(Duration::from_secs(2))
        .users(1)
        .workers(1);
    let summary = Scenario::new(config)
        .progress(ticks.clone())
        .await
        .unwrap();

    // ack + one push every 200ms for 2s
    let stats = &summary.stats;
    assert!(stats.total >= 10, "got {}", stats.total);
    assert!(stats.total <= 12, "got {}", stats.total);
    assert_eq!(stats.failed, 0);
    // one tick per outcome
    assert_eq!(ticks.count(), stats.total);
}

#[tokio::test]
async fn every_user_subscribes() {
    init();
    let addr = MockNode::new()
        .push_interval(Duration::from_millis(50))
        .spawn()
        .await;

    let config = ScenarioConfig::new(&format!("ws://{addr}/ws"), "eth_subscribe")
        .duration(Duration::from_millis(500))
        .users(6)
        .workers(2);
    let summary = Scenario::new(config).await.unwrap();

    // roughly 10 pushes plus the ack per user
    assert!(summary.stats.total >= 6 * 8, "got {}", summary.stats.total);
    assert_eq!(summary.stats.failed, 0);
    // inter-arrival latency tracks the push interval
    assert!(summary.stats.latency_p50 >= Duration::from_millis(20));
    assert!(summary.stats.latency_p50 <= Duration::from_millis(150));
}

#[tokio::test]
async fn single_shot_over_websocket() {
    init();
    let addr = MockNode::new().spawn().await;
    let ticks = Arc::new(Ticks::default());

    let config = ScenarioConfig::new(&format!("ws://{addr}/ws"), "eth_blockNumber")
        .duration(Duration::from_millis(300))
        .users(3)
        .workers(1);
    let summary = Scenario::new(config)
        .progress(ticks.clone())
        .await
        .unwrap();

    assert!(summary.stats.total >= 3);
    assert_eq!(summary.stats.failed, 0);
    assert_eq!(ticks.count(), 3);
}

#[tokio::test]
async fn closed_subscription_ends_early() {
    init();
    let addr = MockNode::new()
        .push_interval(Duration::from_millis(20))
        .close_after(2)
        .spawn()
        .await;

    let config = ScenarioConfig::new(&format!("ws://{addr}/ws"), "eth_subscribe")
        .duration(Duration::from_secs(30))
        .users(2);

    let start = std::time::Instant::now();
    let summary = Scenario::new(config).await.unwrap();

    assert!(start.elapsed() < Duration::from_secs(5));
    // per user: ack, two pushes, one failure for the close
    assert_eq!(summary.stats.total, 8);
    assert_eq!(summary.stats.failed, 2);
}

#[tokio::test]
async fn unreachable_node() {
    init();
    let addr = closed_port();

    let config = ScenarioConfig::new(&format!("ws://{addr}/ws"), "eth_subscribe")
        .duration(Duration::from_millis(200))
        .users(4)
        .workers(2);
    let summary = Scenario::new(config).await.unwrap();

    assert_eq!(summary.stats.total, 4);
    assert_eq!(summary.stats.succeeded, 0);
    assert_eq!(summary.stats.failed_pct, 100.);
}

#[tokio::test]
async fn subscribing_over_http_is_rejected() {
    init();
    let config = ScenarioConfig::new("http://127.0.0.1:8545", "eth_subscribe");
    let res = Scenario::new(config).await;
    assert!(matches!(res, Err(ScenarioError::InvalidScenario(_))));
}
