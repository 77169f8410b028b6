//! HTTP liveness probe backed by reqwest.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::domain::routing::Target;
use crate::ports::HealthChecker;

/// Probes `GET {scheme}://{instance}{check_path}` and accepts any 2xx.
#[derive(Debug, Clone)]
pub struct HttpHealthChecker {
    client: Client,
}

impl HttpHealthChecker {
    /// Builds a checker with its own connection pool.
    ///
    /// Redirects are not followed: a 3xx counts as unhealthy.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }

    /// Uses a caller-supplied client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HealthChecker for HttpHealthChecker {
    async fn is_healthy(&self, target: &Target, check_path: &str, timeout: Duration) -> bool {
        let url = target.url_for(check_path);
        let probe = self.client.get(&url).timeout(timeout).send();

        match tokio::time::timeout(timeout, probe).await {
            Ok(Ok(response)) => {
                let status = response.status();
                if !status.is_success() {
                    tracing::warn!(endpoint = %target.key(), %url, status = status.as_u16(), "Health probe rejected");
                }
                status.is_success()
            }
            Ok(Err(e)) => {
                tracing::warn!(endpoint = %target.key(), %url, error = %e, "Health probe failed");
                false
            }
            Err(_) => {
                tracing::warn!(endpoint = %target.key(), %url, timeout_ms = timeout.as_millis() as u64, "Health probe timed out");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves a single canned response per connection after an optional delay.
    async fn serve(status_line: &'static str, delay: Duration) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    let _ = socket.read(&mut buf).await;
                    tokio::time::sleep(delay).await;
                    let response = format!("HTTP/1.1 {}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n", status_line);
                    let _ = socket.write_all(response.as_bytes()).await;
                });
            }
        });
        addr.to_string()
    }

    #[tokio::test]
    async fn two_hundred_is_healthy() {
        let addr = serve("200 OK", Duration::ZERO).await;
        let checker = HttpHealthChecker::new().unwrap();
        let target = Target::new("us-east", addr);
        assert!(checker.is_healthy(&target, "/health", Duration::from_secs(2)).await);
    }

    #[tokio::test]
    async fn server_error_is_unhealthy() {
        let addr = serve("503 Service Unavailable", Duration::ZERO).await;
        let checker = HttpHealthChecker::new().unwrap();
        let target = Target::new("us-east", addr);
        assert!(!checker.is_healthy(&target, "/health", Duration::from_secs(2)).await);
    }

    #[tokio::test]
    async fn slow_response_times_out_as_unhealthy() {
        let addr = serve("200 OK", Duration::from_millis(500)).await;
        let checker = HttpHealthChecker::new().unwrap();
        let target = Target::new("us-east", addr);
        assert!(!checker.is_healthy(&target, "/health", Duration::from_millis(50)).await);
    }

    #[tokio::test]
    async fn refused_connection_is_unhealthy() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let checker = HttpHealthChecker::new().unwrap();
        let target = Target::new("us-east", addr);
        assert!(!checker.is_healthy(&target, "/health", Duration::from_secs(1)).await);
    }
}
