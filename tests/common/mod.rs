#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tapper::datadog::{MetricSubmission, MetricsBackend};
use tapper::{Result, TapperError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Backend that accepts everything except hosts named `reject` (Ok(false))
/// and `broken` (Err)
#[derive(Default)]
pub struct MockBackend {
    pub received: Mutex<Vec<MetricSubmission>>,
}

#[async_trait]
impl MetricsBackend for MockBackend {
    async fn post_metric(&self, submission: &MetricSubmission) -> Result<bool> {
        self.received.lock().unwrap().push(submission.clone());
        match submission.host.as_str() {
            "reject" => Ok(false),
            "broken" => Err(TapperError::forward("quota exceeded")),
            _ => Ok(true),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
}

/// Layer that keeps every event it sees
#[derive(Clone, Default)]
pub struct CaptureLayer {
    pub events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureLayer {
    pub fn count(&self, level: Level) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.level == level)
            .count()
    }

    pub fn messages(&self, level: Level) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.level == level)
            .map(|e| e.message.clone())
            .collect()
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.0,
        });
    }
}

/// Minimal HTTP/1.1 server answering one request with a canned response.
/// Returns the bound port and a handle resolving to the raw request.
pub async fn serve_once(status_line: &'static str, body: String) -> (u16, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        // Drain any request body so closing the socket does not reset the connection
        let head_len = request
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .map(|i| i + 4)
            .unwrap_or(request.len());
        let content_length = String::from_utf8_lossy(&request[..head_len])
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                if name.eq_ignore_ascii_case("content-length") {
                    value.trim().parse::<usize>().ok()
                } else {
                    None
                }
            })
            .unwrap_or(0);
        while request.len() < head_len + content_length {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();

        String::from_utf8_lossy(&request).to_string()
    });

    (port, handle)
}

pub fn series_json(hostname: &str, cluster: &str, data: &str) -> String {
    format!(
        r#"{{
            "metadata": {{
                "metricName": "hive_open_connections",
                "entityName": "hive-{host}",
                "attributes": {{ "hostname": "{host}", "clusterName": "{cluster}", "roleType": "HIVEMETASTORE" }}
            }},
            "data": {data}
        }}"#,
        host = hostname,
        cluster = cluster,
        data = data
    )
}

pub fn response_json(series: &[String]) -> String {
    format!(
        r#"{{ "items": [ {{ "timeSeries": [ {} ], "warnings": [], "timeSeriesQuery": "select hive_open_connections" }} ] }}"#,
        series.join(",")
    )
}
