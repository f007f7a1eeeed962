// tests/pipeline_tests.rs
mod common;

use common::{response_json, serve_once, series_json, MockBackend};
use std::sync::Arc;
use std::time::Duration;
use tapper::cloudera::{ClouderaClient, Query, RoleType, TimeWindow};
use tapper::config::ClouderaConfig;
use tapper::{Forwarder, Pipeline, TapperError};
use tokio::net::TcpListener;

fn cloudera_config(port: u16) -> ClouderaConfig {
    ClouderaConfig {
        host: "127.0.0.1".into(),
        port,
        username: "admin".into(),
        password: "secret".into(),
        ssl: false,
        request_timeout_ms: 2_000,
    }
}

fn sample_body() -> String {
    response_json(&[
        series_json("h1", "c1", r#"[{"value": 10}, {"value": 20}, {"value": 30}]"#),
        series_json("h2", "c1", "[]"),
        series_json("reject", "c2", r#"[{"value": 5}]"#),
    ])
}

#[tokio::test]
async fn test_fetch_sends_query_window_and_basic_auth() {
    let (port, server) = serve_once("HTTP/1.1 200 OK", sample_body()).await;
    let client = ClouderaClient::from_config(&cloudera_config(port)).unwrap();

    let query = Query::open_connections(RoleType::HiveMetastore, TimeWindow::last_minutes(5));
    let body = client.fetch(&query).await.unwrap();
    assert_eq!(body.as_ref(), sample_body().as_bytes());

    let request = server.await.unwrap();
    let request_line = request.lines().next().unwrap();
    assert!(request_line.starts_with("GET /api/v18/timeseries?"), "{}", request_line);
    assert!(request_line.contains("query=select+hive_open_connections+where+roleType%3DHIVEMETASTORE"));
    assert!(request_line.contains("contentType=application%2Fjson"));
    assert!(request_line.contains(&format!("from={}", query.window.from_param().replace(':', "%3A"))));
    assert!(request_line.contains(&format!("to={}", query.window.to_param().replace(':', "%3A"))));

    // "admin:secret"
    assert!(request
        .to_ascii_lowercase()
        .contains("authorization: basic ywrtaw46c2vjcmv0"));
}

#[tokio::test]
async fn test_fetch_error_status_is_transport_error() {
    let (port, _server) = serve_once("HTTP/1.1 401 Unauthorized", "{}".into()).await;
    let client = ClouderaClient::from_config(&cloudera_config(port)).unwrap();

    let query = Query::open_connections(RoleType::HiveServer, TimeWindow::last_minutes(5));
    let err = client.fetch(&query).await.unwrap_err();
    assert!(matches!(err, TapperError::Transport(_)), "{:?}", err);
}

#[tokio::test]
async fn test_fetch_connection_refused_is_transport_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = ClouderaClient::from_config(&cloudera_config(port)).unwrap();

    let query = Query::open_connections(RoleType::HiveServer, TimeWindow::last_minutes(5));
    let err = client.fetch(&query).await.unwrap_err();
    assert!(err.is_no_data());
}

#[tokio::test]
async fn test_fetch_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let _server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        drop(stream);
    });

    let client = ClouderaClient::from_config(&cloudera_config(port))
        .unwrap()
        .with_timeout(Duration::from_millis(200));

    let query = Query::open_connections(RoleType::HiveServer, TimeWindow::last_minutes(5));
    let err = client.fetch(&query).await.unwrap_err();
    assert!(matches!(err, TapperError::Transport(_)));
}

#[tokio::test]
async fn test_run_aggregates_and_forwards() {
    let (port, _server) = serve_once("HTTP/1.1 200 OK", sample_body()).await;
    let client = ClouderaClient::from_config(&cloudera_config(port)).unwrap();
    let backend = Arc::new(MockBackend::default());
    let pipeline = Pipeline::new(client, Forwarder::new(backend.clone(), 2), 5);

    let summary = pipeline.run(RoleType::HiveMetastore).await;
    assert_eq!(summary.role, RoleType::HiveMetastore);
    assert_eq!(summary.points, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);

    let received = backend.received.lock().unwrap();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].name, "cloudera.hive.metastore.openconnections");
    assert_eq!(received[0].value, 20.0);
    assert_eq!(received[0].host, "h1");
    assert_eq!(received[0].tags, vec!["cluster:c1".to_string()]);
}

#[tokio::test]
async fn test_malformed_body_yields_no_points() {
    let (port, _server) = serve_once("HTTP/1.1 200 OK", "not json at all".into()).await;
    let client = ClouderaClient::from_config(&cloudera_config(port)).unwrap();
    let backend = Arc::new(MockBackend::default());
    let pipeline = Pipeline::new(client, Forwarder::new(backend.clone(), 2), 5);

    let summary = pipeline.run(RoleType::HiveServer).await;
    assert_eq!(summary.points, 0);
    assert_eq!(summary.failed, 0);
    assert!(backend.received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_try_collect_reports_decode_error() {
    let (port, _server) = serve_once("HTTP/1.1 200 OK", "{\"items\": [".into()).await;
    let client = ClouderaClient::from_config(&cloudera_config(port)).unwrap();
    let pipeline = Pipeline::new(client, Forwarder::new(Arc::new(MockBackend::default()), 1), 5);

    let err = pipeline
        .try_collect(RoleType::HiveServer, TimeWindow::last_minutes(5))
        .await
        .unwrap_err();
    assert!(matches!(err, TapperError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_role_does_not_stop_the_other() {
    // Only one request is answered; the second role hits a closed listener
    let (port, _server) = serve_once("HTTP/1.1 200 OK", sample_body()).await;
    let client = ClouderaClient::from_config(&cloudera_config(port))
        .unwrap()
        .with_timeout(Duration::from_millis(500));
    let backend = Arc::new(MockBackend::default());
    let pipeline = Pipeline::new(client, Forwarder::new(backend, 2), 5);

    let summaries = pipeline.run_all(&RoleType::ALL).await;
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].role, RoleType::HiveMetastore);
    assert_eq!(summaries[1].role, RoleType::HiveServer);

    let total: usize = summaries.iter().map(|s| s.points).sum();
    assert_eq!(total, 2);
}

#[tokio::test]
async fn test_collect_is_repeatable() {
    let (port_a, _a) = serve_once("HTTP/1.1 200 OK", sample_body()).await;
    let (port_b, _b) = serve_once("HTTP/1.1 200 OK", sample_body()).await;
    let backend = Arc::new(MockBackend::default());

    let first = Pipeline::new(
        ClouderaClient::from_config(&cloudera_config(port_a)).unwrap(),
        Forwarder::new(backend.clone(), 1),
        5,
    )
    .collect(RoleType::HiveMetastore)
    .await;
    let second = Pipeline::new(
        ClouderaClient::from_config(&cloudera_config(port_b)).unwrap(),
        Forwarder::new(backend, 1),
        5,
    )
    .collect(RoleType::HiveMetastore)
    .await;

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}
