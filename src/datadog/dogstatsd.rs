use async_trait::async_trait;
use std::net::SocketAddr;
use tokio::net::{lookup_host, UdpSocket};

use super::{MetricSubmission, MetricsBackend};
use crate::utils::error::{Result, TapperError};

/// Sends gauges to a local Datadog agent over the DogStatsD UDP protocol
#[derive(Debug)]
pub struct DogstatsdBackend {
    socket: UdpSocket,
    target: SocketAddr,
}

impl DogstatsdBackend {
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        let target = lookup_host((host, port))
            .await
            .map_err(|e| TapperError::configuration(format!("cannot resolve {}:{}: {}", host, port, e)))?
            .next()
            .ok_or_else(|| TapperError::configuration(format!("no address for {}:{}", host, port)))?;

        let bind_addr = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| TapperError::configuration(format!("failed to bind UDP socket: {}", e)))?;

        Ok(Self { socket, target })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

/// Replace characters that delimit fields or tags in a DogStatsD line
pub fn sanitize_tag(tag: &str) -> String {
    tag.chars()
        .map(|c| match c {
            ',' | '|' | '#' | '\n' | '\r' => '_',
            other => other,
        })
        .collect()
}

/// `name:value|g|#tag1,tag2,host:<host>`
pub fn format_datagram(submission: &MetricSubmission) -> String {
    let mut tags: Vec<String> = submission.tags.iter().map(|t| sanitize_tag(t)).collect();
    if !submission.host.is_empty() {
        tags.push(format!("host:{}", sanitize_tag(&submission.host)));
    }

    let mut line = format!("{}:{}|g", submission.name, submission.value);
    if !tags.is_empty() {
        line.push_str("|#");
        line.push_str(&tags.join(","));
    }
    line
}

#[async_trait]
impl MetricsBackend for DogstatsdBackend {
    async fn post_metric(&self, submission: &MetricSubmission) -> Result<bool> {
        let datagram = format_datagram(submission);
        let sent = self.socket.send_to(datagram.as_bytes(), self.target).await?;
        Ok(sent == datagram.len())
    }
}
