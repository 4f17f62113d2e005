//! The remote chat backend.
//!
//! [`ChatBackend`] is the seam between the conversation controller and the
//! network. [`HttpBackend`] is the production implementation.

use crate::config::ClientConfig;
use crate::wire::{ChatReply, ChatRequest};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::future::Future;
use tracing::debug;

/// Something that can answer a chat request.
pub trait ChatBackend: Send + Sync + 'static {
    /// Base URL of the service, for display.
    fn endpoint(&self) -> &str;

    /// Perform one request/response round-trip.
    fn chat(
        &self,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<ChatReply, BackendError>> + Send;
}

/// Chat backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    endpoint: String,
    chat_url: String,
}

impl HttpBackend {
    /// Build a backend for the given configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("bistro-chat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(BackendError::Transport)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            chat_url: config.chat_url(),
        })
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }
}

impl ChatBackend for HttpBackend {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        debug!(url = %self.chat_url, context_len = request.context.len(), "POST chat");

        let response = self
            .client
            .post(&self.chat_url)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(BackendError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status));
        }

        let body = response.text().await.map_err(BackendError::Transport)?;
        ChatReply::parse(&body).map_err(BackendError::Decode)
    }
}

/// Errors that can occur while talking to the backend.
///
/// The kind is only logged; every variant reaches the user as the same
/// delivery-failure message.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Connection, timeout or body transfer failure.
    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// Backend answered with a non-2xx status.
    #[error("Backend responded with status {0}")]
    Status(StatusCode),

    /// Body was not JSON.
    #[error("Malformed reply body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The task carrying the request ended without producing a result.
    #[error("Request was interrupted: {0}")]
    Interrupted(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;
    use crate::wire::{ContextEntry, EMPTY_REPLY_FALLBACK};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    fn http_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    fn find_header_end(buf: &[u8]) -> Option<usize> {
        buf.windows(4).position(|w| w == b"\r\n\r\n")
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = find_header_end(&buf) {
                let head = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
                let content_length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= pos + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Serve exactly one canned response and hand back the raw request.
    async fn serve_once(response: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });
        (format!("http://{addr}"), handle)
    }

    fn backend_for(endpoint: &str) -> HttpBackend {
        let config = ClientConfig::resolve(Some(endpoint)).unwrap();
        HttpBackend::new(&config).unwrap()
    }

    fn sample_request() -> ChatRequest {
        ChatRequest {
            message: "When do you open?".into(),
            context: vec![
                ContextEntry {
                    role: Role::Assistant,
                    content: "Hi!".into(),
                },
                ContextEntry {
                    role: Role::User,
                    content: "When do you open?".into(),
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_posts_json_to_chat_path() {
        let body = r#"{"reply":"We open at 11am","suggestions":["View menu","Book a table"]}"#;
        let (endpoint, server) = serve_once(http_response("200 OK", body)).await;
        let backend = backend_for(&endpoint);

        let reply = backend.chat(&sample_request()).await.unwrap();
        assert_eq!(reply.content(), "We open at 11am");
        assert_eq!(reply.suggestions, vec!["View menu", "Book a table"]);

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /api/chat HTTP/1.1"), "raw: {raw}");
        assert!(raw.to_lowercase().contains("content-type: application/json"));

        let (_, sent_body) = raw.split_once("\r\n\r\n").unwrap();
        let sent: serde_json::Value = serde_json::from_str(sent_body).unwrap();
        assert_eq!(sent["message"], "When do you open?");
        assert_eq!(sent["context"].as_array().unwrap().len(), 2);
        assert_eq!(sent["context"][0]["role"], "assistant");
        assert!(sent["context"][0].get("suggestions").is_none());
    }

    #[tokio::test]
    async fn test_empty_object_reply() {
        let (endpoint, _server) = serve_once(http_response("200 OK", "{}")).await;
        let reply = backend_for(&endpoint).chat(&sample_request()).await.unwrap();
        assert_eq!(reply.content(), EMPTY_REPLY_FALLBACK);
        assert!(reply.suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let (endpoint, _server) =
            serve_once(http_response("500 Internal Server Error", r#"{"reply":"boom"}"#)).await;
        let err = backend_for(&endpoint)
            .chat(&sample_request())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Status(s) if s == StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn test_non_json_body_is_decode_error() {
        let (endpoint, _server) = serve_once(http_response("200 OK", "<html>oops</html>")).await;
        let err = backend_for(&endpoint)
            .chat(&sample_request())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = backend_for(&format!("http://{addr}"))
            .chat(&sample_request())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Transport(_)));
    }

    #[tokio::test]
    async fn test_hung_request_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_secs(10)).await;
            drop(socket);
        });

        let config = ClientConfig::resolve(Some(&format!("http://{addr}")))
            .unwrap()
            .with_timeout_seconds(1)
            .unwrap();
        let backend = HttpBackend::new(&config).unwrap();

        let err = backend.chat(&sample_request()).await.unwrap_err();
        match err {
            BackendError::Transport(e) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_endpoint_and_url() {
        let backend = backend_for("http://127.0.0.1:9000/");
        assert_eq!(backend.endpoint(), "http://127.0.0.1:9000");
        assert_eq!(backend.chat_url(), "http://127.0.0.1:9000/api/chat");
    }
}
