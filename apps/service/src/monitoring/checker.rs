use std::time::Duration;

use thiserror::Error;

/// Reasons a probe produced no HTTP response
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("{0}")]
    Transport(String),
}

/// Checker trait for probing a service endpoint
#[async_trait::async_trait]
pub trait Checker: Send + Sync {
    /// Perform one request against `target` and return the HTTP status code.
    ///
    /// Any received status is `Ok`; classifying it is the caller's job.
    async fn probe(&self, target: &str) -> Result<u16, ProbeError>;
}

/// HTTP/HTTPS checker
pub struct HttpChecker {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpChecker {
    pub fn new(timeout: Duration, user_agent: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).user_agent(user_agent).build()?;

        Ok(Self { client, timeout })
    }

    fn map_error(&self, error: reqwest::Error) -> ProbeError {
        if error.is_timeout() {
            ProbeError::Timeout(self.timeout)
        } else {
            ProbeError::Transport(format!("HTTP request failed: {}", error))
        }
    }
}

#[async_trait::async_trait]
impl Checker for HttpChecker {
    async fn probe(&self, target: &str) -> Result<u16, ProbeError> {
        let response = self.client.get(target).send().await.map_err(|e| self.map_error(e))?;
        let status_code = response.status().as_u16();

        // The timeout covers the body as well, so slow bodies count as failures
        response.bytes().await.map_err(|e| self.map_error(e))?;

        Ok(status_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single canned response on a random local port
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{}/", addr)
    }

    fn checker(timeout_secs: u64) -> HttpChecker {
        HttpChecker::new(Duration::from_secs(timeout_secs), "vigil-test").unwrap()
    }

    #[tokio::test]
    async fn test_non_success_status_is_returned() {
        let url = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\ncontent-length: 4\r\nconnection: close\r\n\r\ndown",
        )
        .await;

        assert_eq!(checker(5).probe(&url).await.unwrap(), 503);
    }

    #[tokio::test]
    async fn test_success_status_is_returned() {
        let url =
            serve_once("HTTP/1.1 204 No Content\r\nconnection: close\r\n\r\n").await;

        assert_eq!(checker(5).probe(&url).await.unwrap(), 204);
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = checker(5).probe(&format!("http://{}/", addr)).await.unwrap_err();
        assert!(matches!(err, ProbeError::Transport(_)));
    }

    #[tokio::test]
    async fn test_unresponsive_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let err = checker(1).probe(&format!("http://{}/", addr)).await.unwrap_err();
        assert!(matches!(err, ProbeError::Timeout(_)));
        assert_eq!(err.to_string(), "request timed out after 1s");
    }
}
