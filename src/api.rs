// API client for the chatbot backend
//
// One POST per user message: /api/chatbots/<topic-path> with {"message": ...},
// expecting {"response": ..., "duration": ...} back. A GET on the base URL
// serves as the health probe for the connectivity watcher.
//
// The client enforces a bounded request timeout and retries exactly once
// (with a jittered delay) on network-level failures. HTTP errors and schema
// violations are never retried - they indicate a server-side problem a
// retry won't fix.

use crate::catalog::TopicId;
use crate::config::Config;
use rand::Rng;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Errors from the network boundary
///
/// All variants are recovered at the session boundary: they render as an
/// in-conversation assistant message, never as a crash.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Empty or whitespace-only message (caught before any request)
    #[error("message is empty")]
    EmptyMessage,

    /// Message exceeds the backend's length cap
    #[error("message exceeds {limit} characters")]
    MessageTooLong { limit: usize },

    /// Unknown topic id string reached the dispatch boundary
    #[error("unsupported topic: {id:?}")]
    UnsupportedTopic { id: String },

    /// The server answered with a non-2xx status
    #[error("server returned HTTP {status}")]
    Transport { status: u16 },

    /// The body wasn't JSON, or the `response` field is missing
    #[error("malformed server response: {0}")]
    MalformedResponse(String),

    /// No network path to the server (DNS, refused, timeout)
    #[error("server unreachable")]
    Unreachable(#[source] reqwest::Error),
}

impl ApiError {
    /// Only network-level failures are worth a retry
    fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Unreachable(_))
    }
}

/// A settled reply from the backend
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub text: String,
    /// Server-reported processing time, if provided
    pub latency_seconds: Option<f64>,
}

/// Request body for a chat message
#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// Parse a response body into a reply
///
/// The backend contract is {"response": string, "duration"?: number}; a
/// missing or non-string `response` is a schema violation.
fn parse_reply(body: &str) -> Result<ChatReply, ApiError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| ApiError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    let text = value
        .get("response")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ApiError::MalformedResponse("missing `response` field".to_string()))?
        .to_string();

    let latency_seconds = value.get("duration").and_then(|v| v.as_f64());

    Ok(ChatReply {
        text,
        latency_seconds,
    })
}

/// HTTP client for the chatbot backend
///
/// Stateless per call: holds only the connection pool and resolved settings.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    max_message_len: usize,
    max_retries: u32,
    jitter_ms: (u64, u64),
}

impl ApiClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_message_len: config.max_message_len,
            max_retries: config.retry.max_retries,
            jitter_ms: (config.retry.jitter_min_ms, config.retry.jitter_max_ms),
        })
    }

    /// Send one message to the topic's assistant
    pub async fn send(&self, topic: TopicId, message: &str) -> Result<ChatReply, ApiError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ApiError::EmptyMessage);
        }
        if message.chars().count() > self.max_message_len {
            return Err(ApiError::MessageTooLong {
                limit: self.max_message_len,
            });
        }

        let mut attempt = 0;
        loop {
            match self.send_once(topic, message).await {
                Ok(reply) => return Ok(reply),
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.jittered_delay();
                    tracing::debug!(
                        topic = %topic,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "send failed, retrying: {}",
                        err
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn send_once(&self, topic: TopicId, message: &str) -> Result<ChatReply, ApiError> {
        let url = format!("{}/api/chatbots/{}", self.base_url, topic.path());
        tracing::debug!(topic = %topic, "POST {}", url);

        let response = self
            .http
            .post(&url)
            .json(&ChatRequest { message })
            .send()
            .await
            .map_err(ApiError::Unreachable)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Transport {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(ApiError::Unreachable)?;
        parse_reply(&body)
    }

    /// Lightweight health probe: GET on the backend root
    ///
    /// No retry here - the connectivity watcher calls this on a cadence and
    /// a transient failure just shows up on the next cycle.
    pub async fn probe(&self) -> Result<(), ApiError> {
        let url = format!("{}/", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(ApiError::Unreachable)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::Transport {
                status: status.as_u16(),
            })
        }
    }

    fn jittered_delay(&self) -> Duration {
        let (min, max) = self.jitter_ms;
        let ms = if max > min {
            rand::rng().random_range(min..=max)
        } else {
            min
        };
        Duration::from_millis(ms)
    }
}

/// Resolve a topic id string at the dispatch boundary
///
/// Used by anything that accepts a topic name from outside the closed enum
/// (config, future deep links). Unknown ids fail here instead of producing
/// a request to a route that doesn't exist.
pub fn resolve_topic(id: &str) -> Result<TopicId, ApiError> {
    TopicId::parse(id).ok_or_else(|| ApiError::UnsupportedTopic { id: id.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reply_reads_text_and_duration() {
        let reply = parse_reply(r#"{"response": "Hi there", "duration": 0.8}"#).unwrap();
        assert_eq!(reply.text, "Hi there");
        assert_eq!(reply.latency_seconds, Some(0.8));
    }

    #[test]
    fn parse_reply_duration_is_optional() {
        let reply = parse_reply(r#"{"response": "Hi"}"#).unwrap();
        assert_eq!(reply.latency_seconds, None);
    }

    #[test]
    fn parse_reply_rejects_missing_response_field() {
        let err = parse_reply(r#"{"answer": "Hi"}"#).unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse(_)));
    }

    #[test]
    fn parse_reply_rejects_non_string_response() {
        let err = parse_reply(r#"{"response": 42}"#).unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse(_)));
    }

    #[test]
    fn parse_reply_rejects_invalid_json() {
        let err = parse_reply("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse(_)));
    }

    #[test]
    fn resolve_topic_accepts_known_paths() {
        assert_eq!(resolve_topic("medical").unwrap(), TopicId::Medical);
        assert_eq!(resolve_topic("mental-health").unwrap(), TopicId::MentalHealth);
    }

    #[test]
    fn resolve_topic_rejects_unknown_ids() {
        let err = resolve_topic("horoscope").unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedTopic { .. }));
    }
}

#[cfg(test)]
mod http_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server_uri: &str) -> ApiClient {
        let config = Config {
            base_url: server_uri.to_string(),
            retry: crate::config::RetryConfig {
                max_retries: 1,
                jitter_min_ms: 1,
                jitter_max_ms: 1,
            },
            ..Config::default()
        };
        ApiClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn send_posts_to_the_topic_route() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chatbots/medical"))
            .and(body_json(serde_json::json!({"message": "Hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": "Hi there",
                "duration": 0.8,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let reply = client.send(TopicId::Medical, "Hello").await.unwrap();
        assert_eq!(reply.text, "Hi there");
        assert_eq!(reply.latency_seconds, Some(0.8));
    }

    #[tokio::test]
    async fn send_surfaces_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chatbots/finance"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1) // HTTP failures are not retried
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client.send(TopicId::Finance, "budget?").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { status: 500 }));
    }

    #[tokio::test]
    async fn send_rejects_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chatbots/developer"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client.send(TopicId::Developer, "hi").await.unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn empty_message_never_reaches_the_wire() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client.send(TopicId::General, "   \n  ").await.unwrap_err();
        assert!(matches!(err, ApiError::EmptyMessage));
    }

    #[tokio::test]
    async fn oversized_message_never_reaches_the_wire() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let config = Config {
            base_url: server.uri(),
            max_message_len: 5,
            ..Config::default()
        };
        let client = ApiClient::new(&config).unwrap();
        let err = client.send(TopicId::General, "toolong").await.unwrap_err();
        assert!(matches!(err, ApiError::MessageTooLong { limit: 5 }));
    }

    #[tokio::test]
    async fn probe_maps_success_and_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        assert!(client.probe().await.is_ok());

        server.reset().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client.probe().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { status: 503 }));
    }

    #[tokio::test]
    async fn unreachable_server_is_reported_after_the_retry() {
        // Nothing listens on this port; both attempts fail at the socket
        let client = client_for("http://127.0.0.1:9");
        let err = client.send(TopicId::Legal, "anyone there?").await.unwrap_err();
        assert!(matches!(err, ApiError::Unreachable(_)));
    }
}
