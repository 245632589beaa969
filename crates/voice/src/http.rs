//! HTTP speech provider.
//!
//! Talks to any OpenAI-compatible `audio/speech` endpoint that accepts
//! `{model, input, voice, speed, pitch, stream}` and answers with a chunked
//! audio body.

use std::time::Duration;

use {
    async_trait::async_trait,
    futures::{StreamExt, TryStreamExt},
    reqwest::{Client, header::CONTENT_TYPE},
    secrecy::{ExposeSecret, Secret},
    tracing::{debug, warn},
};

use crate::{
    config::ProviderConfig,
    error::{RelayError, Result},
    provider::{ProviderPayload, ProviderResponse, SpeechProvider},
};

/// Provider reached over HTTP with bearer authentication.
#[derive(Clone)]
pub struct HttpSpeechProvider {
    client: Client,
    endpoint: String,
    api_key: Option<Secret<String>>,
    timeout: Duration,
}

impl std::fmt::Debug for HttpSpeechProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSpeechProvider")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpSpeechProvider {
    /// Create a provider for `endpoint` with default timeouts.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, api_key: Option<Secret<String>>) -> Self {
        let defaults = ProviderConfig::default();
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key,
            timeout: defaults.timeout(),
        }
    }

    /// Create a provider from configuration.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()?;
        Ok(Self {
            client,
            endpoint: config.base_url.clone(),
            api_key: config.api_key.clone(),
            timeout: config.timeout(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SpeechProvider for HttpSpeechProvider {
    fn id(&self) -> &'static str {
        "http"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn stream(&self, payload: &ProviderPayload) -> Result<ProviderResponse> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(payload);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key.expose_secret()));
        }

        // Only the wait for response headers is bounded; the body may take
        // as long as the audio does.
        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| {
                RelayError::transport(format!(
                    "provider did not respond within {}s",
                    self.timeout.as_secs()
                ))
            })??;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        debug!(status = status.as_u16(), content_type = ?content_type, "provider responded");

        if !status.is_success() {
            let body = response.bytes().await.map_err(|e| {
                warn!(status = status.as_u16(), error = %e, "failed to read provider error body");
                RelayError::transport(format!(
                    "provider returned HTTP {} but its body could not be read: {e}",
                    status.as_u16()
                ))
            })?;
            return Err(RelayError::Upstream {
                status: status.as_u16(),
                content_type,
                body,
            });
        }

        Ok(ProviderResponse {
            content_type,
            body: response.bytes_stream().map_err(RelayError::from).boxed(),
        })
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        bytes::Bytes,
        wiremock::{
            Mock, MockServer, ResponseTemplate,
            matchers::{body_json, header, method, path},
        },
    };

    fn payload() -> ProviderPayload {
        ProviderPayload::new("nova", "Hello".into(), "zh-CN-YunxiNeural".into(), 1.0, 1.0)
    }

    async fn collect(response: ProviderResponse) -> Vec<u8> {
        let chunks: Vec<Bytes> = response.body.try_collect().await.unwrap();
        chunks.concat()
    }

    #[test]
    fn test_provider_metadata() {
        let provider = HttpSpeechProvider::new("http://localhost/speech", None);
        assert_eq!(provider.id(), "http");
        assert!(!provider.is_configured());

        let configured =
            HttpSpeechProvider::new("http://localhost/speech", Some(Secret::new("k".into())));
        assert!(configured.is_configured());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let provider = HttpSpeechProvider::new(
            "http://localhost/speech",
            Some(Secret::new("super-secret-key".into())),
        );
        let debug_output = format!("{:?}", provider);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-secret-key"));
    }

    #[tokio::test]
    async fn test_stream_sends_payload_and_auth() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/audio/speech"))
            .and(header("authorization", "Bearer sk-test"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({
                "model": "tts-1-nova",
                "input": "Hello",
                "voice": "zh-CN-YunxiNeural",
                "speed": 1.0,
                "pitch": 1.0,
                "stream": true,
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "audio/ogg")
                    .set_body_bytes(b"OggS-audio".to_vec()),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = HttpSpeechProvider::new(
            format!("{}/v1/audio/speech", mock_server.uri()),
            Some(Secret::new("sk-test".into())),
        );
        let response = provider.stream(&payload()).await.unwrap();
        assert_eq!(response.content_type.as_deref(), Some("audio/ogg"));
        assert_eq!(collect(response).await, b"OggS-audio");
    }

    #[tokio::test]
    async fn test_error_status_is_passed_through() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("content-type", "application/json")
                    .set_body_string(r#"{"error":"rate limited"}"#),
            )
            .mount(&mock_server)
            .await;

        let provider = HttpSpeechProvider::new(mock_server.uri(), None);
        let err = provider.stream(&payload()).await.unwrap_err();
        match err {
            RelayError::Upstream {
                status,
                content_type,
                body,
            } => {
                assert_eq!(status, 429);
                assert_eq!(content_type.as_deref(), Some("application/json"));
                assert_eq!(&body[..], br#"{"error":"rate limited"}"#);
            },
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_auth_header_without_key() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
            .mount(&mock_server)
            .await;

        let provider = HttpSpeechProvider::new(mock_server.uri(), None);
        provider.stream(&payload()).await.unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        // Bind and immediately drop a listener so the port refuses connections.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider = HttpSpeechProvider::new(format!("http://{addr}/speech"), None);
        let err = provider.stream(&payload()).await.unwrap_err();
        assert!(matches!(err, RelayError::Transport(_)), "got {err:?}");
    }

    /// Read one HTTP request (headers plus `content-length` body) from `socket`.
    async fn read_request(socket: &mut tokio::net::TcpStream) {
        use tokio::io::AsyncReadExt;

        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed before sending a request");
            buf.extend_from_slice(&chunk[..n]);
            let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let body_len: usize = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .map_or(0, |v| v.trim().parse().unwrap());
            if buf.len() >= end + 4 + body_len {
                return;
            }
        }
    }

    #[tokio::test]
    async fn test_truncated_error_body_is_transport_error() {
        use tokio::io::AsyncWriteExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            // Promise 100 bytes, send 8, then hang up.
            socket
                .write_all(
                    b"HTTP/1.1 429 Too Many Requests\r\n\
                      content-type: application/json\r\n\
                      content-length: 100\r\n\r\n\
                      {\"error\"",
                )
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let provider = HttpSpeechProvider::new(format!("http://{addr}/speech"), None);
        let err = provider.stream(&payload()).await.unwrap_err();
        match err {
            RelayError::Transport(message) => assert!(message.contains("HTTP 429"), "{message}"),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&mock_server)
            .await;

        let config = ProviderConfig {
            base_url: mock_server.uri(),
            timeout_secs: 1,
            ..Default::default()
        };
        let provider = HttpSpeechProvider::from_config(&config).unwrap();
        let err = provider.stream(&payload()).await.unwrap_err();
        assert_eq!(err.to_string(), "provider did not respond within 1s");
    }
}
