//! HTTP answer service.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use tracing::instrument;

use quizbench_core::error::TransportError;
use quizbench_core::model::ServiceResponse;
use quizbench_core::traits::AnswerService;

/// Where the evaluated service listens unless configured otherwise.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080";

/// Posts each record's raw JSON to a fixed endpoint.
pub struct HttpAnswerService {
    endpoint: Url,
    client: reqwest::Client,
}

impl HttpAnswerService {
    /// Build a client for `endpoint`. With `timeout == None` requests wait
    /// indefinitely for the service.
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self> {
        let endpoint = if endpoint.is_empty() {
            DEFAULT_ENDPOINT
        } else {
            endpoint
        };
        // Malformed URLs must not reach the retry loop.
        let endpoint =
            Url::parse(endpoint).with_context(|| format!("invalid endpoint URL: {endpoint}"))?;
        anyhow::ensure!(
            matches!(endpoint.scheme(), "http" | "https"),
            "invalid endpoint URL: {endpoint} (expected http or https)"
        );

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("failed to build HTTP client")?;

        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Network(err.to_string())
    }
}

#[async_trait]
impl AnswerService for HttpAnswerService {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, body), fields(endpoint = %self.endpoint))]
    async fn submit(&self, body: &str) -> Result<ServiceResponse, TransportError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_owned())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        // A body that fails mid-read is a transport failure, not a wrong answer.
        let text = response.text().await.map_err(classify)?;

        Ok(ServiceResponse { status, body: text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn posts_raw_json_body() {
        let server = MockServer::start().await;
        let record = r##"{"#Q": "2+2?", "A": "3", "B": "4", "^": "4"}"##;

        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("content-type", "application/json"))
            .and(body_string(record))
            .respond_with(ResponseTemplate::new(200).set_body_string("4"))
            .expect(1)
            .mount(&server)
            .await;

        let service = HttpAnswerService::new(&server.uri(), None).unwrap();
        let response = service.submit(record).await.unwrap();

        assert_eq!(response, ServiceResponse::new(200, "4"));
    }

    #[tokio::test]
    async fn error_status_is_a_response_not_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422))
            .mount(&server)
            .await;

        let service = HttpAnswerService::new(&server.uri(), None).unwrap();
        let response = service.submit(r#"{"^": "A"}"#).await.unwrap();

        assert_eq!(response.status, 422);
        assert_eq!(response.body, "");
    }

    #[tokio::test]
    async fn body_is_not_trimmed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Paris\n"))
            .mount(&server)
            .await;

        let service = HttpAnswerService::new(&server.uri(), None).unwrap();
        let response = service.submit(r#"{"^": "Paris"}"#).await.unwrap();

        assert_eq!(response.body, "Paris\n");
    }

    #[tokio::test]
    async fn connection_refused_is_a_transport_error() {
        // Bind then drop to get a port nothing is listening on.
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();

        let service = HttpAnswerService::new(&format!("http://{addr}"), None).unwrap();
        let err = service.submit(r#"{"^": "A"}"#).await.unwrap_err();

        assert!(matches!(err, TransportError::Connect(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn truncated_body_is_a_transport_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let record = r#"{"^": "A"}"#;
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Promise ten bytes of body, send three, then hang up.
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "client closed before sending the request");
                request.extend_from_slice(&chunk[..n]);
                let head_end = request.windows(4).position(|w| w == b"\r\n\r\n");
                if head_end.is_some_and(|end| request.len() >= end + 4 + record.len()) {
                    break;
                }
            }
            socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 10\r\n\r\nABC")
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let service = HttpAnswerService::new(&format!("http://{addr}"), None).unwrap();
        let err = service.submit(record).await.unwrap_err();

        assert!(matches!(err, TransportError::Network(_)), "got: {err:?}");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn slow_service_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("A")
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let service =
            HttpAnswerService::new(&server.uri(), Some(Duration::from_millis(100))).unwrap();
        let err = service.submit(r#"{"^": "A"}"#).await.unwrap_err();

        assert_eq!(err, TransportError::Timeout);
    }

    #[test]
    fn empty_endpoint_falls_back_to_default() {
        let service = HttpAnswerService::new("", None).unwrap();
        assert_eq!(service.endpoint().as_str(), "http://localhost:8080/");
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let err = HttpAnswerService::new("localhost 8080", None).err().unwrap();
        assert!(err.to_string().contains("invalid endpoint URL"));

        let err = HttpAnswerService::new("localhost:8080", None).err().unwrap();
        assert!(err.to_string().contains("expected http or https"));
    }
}
