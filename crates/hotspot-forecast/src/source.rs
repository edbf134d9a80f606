//! Forecast sources.
//!
//! [`HttpForecastSource`] issues a plain HTTP/1.1 GET against the
//! predictor and decodes the JSON body. The whole exchange is bounded by
//! a timeout; every failure mode surfaces as
//! [`ForecastError::FetchFailed`] so the fetch loop can skip the cycle.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use tracing::debug;

use hotspot_core::ForecastSnapshot;

use crate::error::{ForecastError, ForecastResult};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Anything that can produce forecast snapshots.
pub trait ForecastSource: Send + Sync {
    fn fetch(&self) -> BoxFuture<'_, ForecastResult<ForecastSnapshot>>;
}

/// Fetches forecasts from the predictor's HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpForecastSource {
    uri: http::Uri,
    timeout: Duration,
}

impl HttpForecastSource {
    /// Create a source for an `http://host[:port]/path` URL.
    pub fn new(url: &str, timeout: Duration) -> ForecastResult<Self> {
        let uri: http::Uri = url
            .parse()
            .map_err(|e| ForecastError::FetchFailed(format!("invalid url {url}: {e}")))?;
        if uri.scheme_str().is_some_and(|s| s != "http") {
            return Err(ForecastError::FetchFailed(format!(
                "unsupported scheme in {url}"
            )));
        }
        if uri.authority().is_none() {
            return Err(ForecastError::FetchFailed(format!("missing host in {url}")));
        }
        Ok(Self { uri, timeout })
    }

    /// `host:port` the source connects to.
    pub fn address(&self) -> String {
        let authority = self.uri.authority().map(|a| a.host()).unwrap_or_default();
        let port = self.uri.port_u16().unwrap_or(80);
        format!("{authority}:{port}")
    }

    /// Fetch and decode one snapshot.
    pub async fn fetch_snapshot(&self) -> ForecastResult<ForecastSnapshot> {
        let address = self.address();
        let result = tokio::time::timeout(self.timeout, self.exchange(&address)).await;

        match result {
            Ok(outcome) => outcome,
            Err(_) => {
                debug!(%address, "forecast fetch timed out");
                Err(ForecastError::FetchFailed(format!(
                    "timed out after {}ms",
                    self.timeout.as_millis()
                )))
            }
        }
    }

    async fn exchange(&self, address: &str) -> ForecastResult<ForecastSnapshot> {
        let stream = tokio::net::TcpStream::connect(address)
            .await
            .map_err(|e| ForecastError::FetchFailed(format!("connect {address}: {e}")))?;

        let io = hyper_util::rt::TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| ForecastError::FetchFailed(format!("handshake: {e}")))?;

        // Drive the connection in the background.
        tokio::spawn(async move {
            let _ = conn.await;
        });

        let path = self
            .uri
            .path_and_query()
            .map(|p| p.as_str())
            .unwrap_or("/");
        let host = self.uri.authority().map(|a| a.as_str()).unwrap_or(address);

        let req = http::Request::builder()
            .method("GET")
            .uri(path)
            .header("host", host)
            .header("accept", "application/json")
            .header("user-agent", "hotspot-forecast/0.1")
            .body(Empty::<Bytes>::new())
            .map_err(|e| ForecastError::FetchFailed(format!("build request: {e}")))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| ForecastError::FetchFailed(format!("request: {e}")))?;

        if !resp.status().is_success() {
            return Err(ForecastError::FetchFailed(format!(
                "non-2xx status {}",
                resp.status()
            )));
        }

        let body = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| ForecastError::FetchFailed(format!("read body: {e}")))?
            .to_bytes();
        debug!(bytes = body.len(), "forecast payload received");

        serde_json::from_slice::<ForecastSnapshot>(&body)
            .map_err(|e| ForecastError::FetchFailed(format!("decode payload: {e}")))
    }
}

impl ForecastSource for HttpForecastSource {
    fn fetch(&self) -> BoxFuture<'_, ForecastResult<ForecastSnapshot>> {
        Box::pin(self.fetch_snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const PAYLOAD: &str = r#"{"time": 1700000000, "table_num": 1, "predict_step": 2,
        "history_r2_score_tot": 0.5,
        "table_info": [{"predict": [1.0, 2.0], "start_key": "", "end_key": "",
                        "max_value": 2.0, "min_value": 1.0, "history_r2_score": 0.5}],
        "replicas": 4}"#;

    /// Serve one canned HTTP response and return the bound address.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}/")
    }

    #[tokio::test]
    async fn fetches_and_decodes_snapshot() {
        let url = serve_once("200 OK", PAYLOAD).await;
        let source = HttpForecastSource::new(&url, Duration::from_secs(5)).unwrap();

        let snap = source.fetch().await.unwrap();
        assert_eq!(snap.time, 1_700_000_000);
        assert_eq!(snap.replicas, 4);
        assert_eq!(snap.table_info[0].predict, vec![1.0, 2.0]);
    }

    #[tokio::test]
    async fn non_success_status_is_fetch_failure() {
        let url = serve_once("503 Service Unavailable", "{}").await;
        let source = HttpForecastSource::new(&url, Duration::from_secs(5)).unwrap();

        assert!(matches!(
            source.fetch().await,
            Err(ForecastError::FetchFailed(_))
        ));
    }

    #[tokio::test]
    async fn malformed_body_is_fetch_failure() {
        let url = serve_once("200 OK", "not json").await;
        let source = HttpForecastSource::new(&url, Duration::from_secs(5)).unwrap();

        assert!(matches!(
            source.fetch().await,
            Err(ForecastError::FetchFailed(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_fetch_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source =
            HttpForecastSource::new(&format!("http://{addr}/"), Duration::from_secs(2)).unwrap();
        assert!(matches!(
            source.fetch().await,
            Err(ForecastError::FetchFailed(_))
        ));
    }

    #[tokio::test]
    async fn silent_endpoint_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let source =
            HttpForecastSource::new(&format!("http://{addr}/"), Duration::from_millis(100))
                .unwrap();
        assert!(matches!(
            source.fetch().await,
            Err(ForecastError::FetchFailed(_))
        ));
    }

    #[test]
    fn rejects_https_and_hostless_urls() {
        assert!(HttpForecastSource::new("https://example.com/", Duration::from_secs(1)).is_err());
        assert!(HttpForecastSource::new("/predict", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn default_port_is_80() {
        let source = HttpForecastSource::new("http://10.0.0.4/", Duration::from_secs(1)).unwrap();
        assert_eq!(source.address(), "10.0.0.4:80");
    }
}
