//! End-to-end flow control: the second of two back-to-back requests is
//! delayed, not rejected.

use std::time::{Duration, Instant};

mod common;

#[tokio::test]
async fn test_second_request_is_delayed_by_roughly_one_fill_interval() {
    let (backend, _seen) = common::start_recording_backend("ok").await;
    let mut config = common::gateway_config(backend);
    config.rate_limit.fill_rate = 1.0;
    config.rate_limit.burst_size = 1;
    let gateway = common::start_gateway(config).await;

    let client = reqwest::Client::new();
    let url = format!("http://{gateway}/resize");

    let first_start = Instant::now();
    let first = client.get(&url).send().await.unwrap();
    assert_eq!(first.status(), 200);
    assert!(
        first_start.elapsed() < Duration::from_millis(500),
        "first request must not be throttled"
    );

    let second_start = Instant::now();
    let second = client.get(&url).send().await.unwrap();
    let second_elapsed = second_start.elapsed();

    // Throttled, never rejected.
    assert_eq!(second.status(), 200);
    assert!(
        second_elapsed >= Duration::from_millis(700),
        "second request should wait about a second, waited {second_elapsed:?}"
    );
    assert!(second_elapsed < Duration::from_secs(3));
}
