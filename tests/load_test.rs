//! Concurrent load against an open breaker.

use futures_util::future::join_all;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use user_aggregator::lifecycle::Shutdown;
use user_aggregator::resilience::CircuitState;
use user_aggregator::HttpServer;

mod common;

#[tokio::test]
async fn test_open_breaker_sheds_all_remote_calls_under_load() {
    let departments = common::start_department_backend(&[(5, "Engineering")]).await;
    departments.set_healthy(false);

    let config = common::config_for(&departments.base_url(), 2, 60_000);
    let shutdown = Shutdown::new();
    let (_, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config).unwrap();
    let state = server.state().clone();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });
    common::settle().await;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let res = client
        .post(format!("http://{}/api/users", addr))
        .json(&serde_json::json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "departmentId": "5",
        }))
        .send()
        .await
        .unwrap();
    let user: serde_json::Value = res.json().await.unwrap();
    let url = format!("http://{}/api/users/{}", addr, user["id"]);

    // Trip the breaker.
    for _ in 0..2 {
        client.get(&url).send().await.unwrap();
    }
    assert_eq!(state.service.breaker().state(), CircuitState::Open);
    assert_eq!(departments.calls(), 2);

    let concurrency = 20;
    let requests_per_task = 10;
    let start = Instant::now();

    let tasks = (0..concurrency).map(|_| {
        let client = client.clone();
        let url = url.clone();
        tokio::spawn(async move {
            let mut fallbacks = 0;
            for _ in 0..requests_per_task {
                let res = client.get(&url).send().await.unwrap();
                assert_eq!(res.status(), 200);
                let body: serde_json::Value = res.json().await.unwrap();
                if body["department"]["id"] == 0 {
                    fallbacks += 1;
                }
            }
            fallbacks
        })
    });

    let fallbacks: u32 = join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .sum();

    assert_eq!(fallbacks, concurrency * requests_per_task);
    assert_eq!(departments.calls(), 2, "open breaker must not reach the department service");
    assert!(start.elapsed() < Duration::from_secs(10), "short-circuited requests should be fast");

    shutdown.trigger();
}
