//! Integration tests for the external client against the real simulated
//! external service, served on an ephemeral port.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::StreamExt;
use studymap_client::{ExternalClient, StatusFeedPump};
use studymap_common::{StudyRequest, StudymapError};
use studymap_external::ExternalApp;
use studymap_metrics::MetricsRegistry;
use tokio::net::TcpListener;

/// Spawns the simulated external service with the given default delay.
async fn spawn_external(default_delay: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(ExternalApp::with_default_delay(default_delay).serve(listener));
    addr
}

fn client_for(addr: SocketAddr) -> (Arc<ExternalClient>, Arc<MetricsRegistry>) {
    let metrics = Arc::new(MetricsRegistry::new());
    let client = Arc::new(ExternalClient::new(
        format!("http://{addr}"),
        Arc::clone(&metrics),
    ));
    (client, metrics)
}

#[tokio::test]
async fn fetch_returns_dataset_value_for_known_pair() {
    let addr = spawn_external(Duration::from_millis(10)).await;
    let (client, _) = client_for(addr);

    let study = client
        .fetch(&StudyRequest::new("uk-sync", "US", None))
        .await
        .unwrap();
    assert_eq!(study.value, 21.4);
}

#[tokio::test]
async fn fetch_honors_the_timeout_hint() {
    let addr = spawn_external(Duration::from_millis(500)).await;
    let (client, _) = client_for(addr);

    let start = Instant::now();
    client
        .fetch(&StudyRequest::new("uk-sync", "US", Some("20".into())))
        .await
        .unwrap();
    assert!(start.elapsed() < Duration::from_millis(400));
}

#[tokio::test]
async fn malformed_timeout_hint_behaves_like_no_hint_at_all() {
    let addr = spawn_external(Duration::from_millis(30)).await;
    let (client, _) = client_for(addr);

    let with_garbage = client
        .fetch(&StudyRequest::new("uk-sync", "US", Some("abc".into())))
        .await
        .unwrap();
    let without_hint = client
        .fetch(&StudyRequest::new("uk-sync", "US", None))
        .await
        .unwrap();
    assert_eq!(with_garbage, without_hint);
}

#[tokio::test]
async fn unreachable_service_surfaces_external_unavailable() {
    // Bind-then-drop leaves a port with nothing listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (client, _) = client_for(addr);
    let err = client
        .fetch(&StudyRequest::new("uk-sync", "US", None))
        .await
        .unwrap_err();
    assert!(matches!(err, StudymapError::ExternalUnavailable(_)));
}

#[tokio::test]
async fn external_counter_is_restored_after_success_and_failure() {
    let addr = spawn_external(Duration::from_millis(10)).await;
    let (client, metrics) = client_for(addr);

    client
        .fetch(&StudyRequest::new("uk-sync", "US", None))
        .await
        .unwrap();
    assert_eq!(metrics.active_external(), 0);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = listener.local_addr().unwrap();
    drop(listener);
    let (dead_client, dead_metrics) = client_for(dead_addr);
    let _ = dead_client
        .fetch(&StudyRequest::new("uk-sync", "US", None))
        .await;
    assert_eq!(dead_metrics.active_external(), 0);
}

#[tokio::test]
async fn status_feed_delivers_elements_on_the_broadcast_cadence() {
    let addr = spawn_external(Duration::from_millis(10)).await;
    let (client, _) = client_for(addr);

    let feed = client.status_feed().await.unwrap();
    let elements: Vec<_> = feed.take(3).collect().await;
    assert_eq!(elements.len(), 3);
    // Nothing in flight on the external side.
    assert!(elements.iter().all(|s| s.active_requests == 0));
}

#[tokio::test]
async fn status_feed_observes_in_flight_requests() {
    let addr = spawn_external(Duration::from_millis(600)).await;
    let (client, _) = client_for(addr);

    // Park a slow request on the external service, then watch the feed.
    let slow = {
        let client = Arc::clone(&client);
        tokio::spawn(async move {
            client
                .fetch(&StudyRequest::new("uk-sync", "US", None))
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let feed = client.status_feed().await.unwrap();
    let mut feed = std::pin::pin!(feed);
    let observed = feed.next().await.unwrap();
    assert_eq!(observed.active_requests, 1);

    slow.await.unwrap().unwrap();
}

#[tokio::test]
async fn feed_pump_holds_the_latest_element() {
    let addr = spawn_external(Duration::from_millis(10)).await;
    let (client, _) = client_for(addr);

    let pump = StatusFeedPump::spawn(client, Duration::from_millis(100));
    let mut rx = pump.subscribe();

    // Wait until the pump has delivered the first real element.
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            rx.changed().await.unwrap();
            if rx.borrow().is_some() {
                break;
            }
        }
    })
    .await
    .expect("pump never delivered an element");
}

#[tokio::test]
async fn fetch_blocking_matches_the_async_path() {
    let addr = spawn_external(Duration::from_millis(10)).await;
    let (client, _) = client_for(addr);

    let request = StudyRequest::new("uk-sync", "GB", None);
    let async_value = client.fetch(&request).await.unwrap();

    let blocking_value = {
        let client = Arc::clone(&client);
        tokio::task::spawn_blocking(move || client.fetch_blocking(&request))
            .await
            .unwrap()
            .unwrap()
    };
    assert_eq!(async_value, blocking_value);
}
