//! Pipeline client: the HTTP exchange with the RAG backend.
//!
//! [`RagBackend`] is one request/response with the debug endpoint. [`PipelineClient`]
//! sits on top and applies the configured [`Protocol`], so the session and the
//! renderer never know whether one or two calls were made.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::BackendConfig;
use crate::error::{RagscopeError, Result};
use crate::request::RequestPayload;
use crate::result::{PipelineResult, Submission};

/// How a submission talks to the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    /// Retrieval-only call with `generate=false`, then the same payload with
    /// `generate=true`. Both responses are merged.
    #[default]
    TwoPhase,
    /// A single `generate=true` call that returns debug data and answer together.
    SinglePhase,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TwoPhase => write!(f, "two_phase"),
            Self::SinglePhase => write!(f, "single_phase"),
        }
    }
}

impl std::str::FromStr for Protocol {
    type Err = RagscopeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "two_phase" | "two" | "2" => Ok(Self::TwoPhase),
            "single_phase" | "single" | "1" => Ok(Self::SinglePhase),
            other => Err(RagscopeError::Config {
                message: format!(
                    "unknown protocol '{}' (expected two_phase or single_phase)",
                    other
                ),
            }),
        }
    }
}

/// One request/response exchange with the debug endpoint.
#[async_trait]
pub trait RagBackend: Send + Sync {
    async fn post_debug(&self, payload: &RequestPayload) -> Result<PipelineResult>;

    /// URL used in logs and connection error messages.
    fn endpoint(&self) -> &str;
}

/// [`RagBackend`] over HTTP with `reqwest`.
pub struct HttpBackend {
    client: Client,
    url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|e| RagscopeError::Config {
            message: format!("failed to build HTTP client: {}", e),
        })?;
        Ok(Self {
            client,
            url: config.endpoint_url(),
        })
    }
}

#[async_trait]
impl RagBackend for HttpBackend {
    async fn post_debug(&self, payload: &RequestPayload) -> Result<PipelineResult> {
        debug!(url = %self.url, generate = payload.generate, top_k = payload.top_k, "Sending RAG debug request");

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %self.url, error = %e, timeout = e.is_timeout(), "RAG backend unreachable");
                RagscopeError::Connection {
                    url: self.url.clone(),
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!(url = %self.url, error = %e, "Failed to read RAG backend response body");
            RagscopeError::Connection {
                url: self.url.clone(),
                message: format!("failed to read response body: {}", e),
            }
        })?;

        if !status.is_success() {
            warn!(status = status.as_u16(), body_len = body.len(), "RAG backend returned an error status");
            return Err(RagscopeError::backend(status.as_u16(), &body));
        }

        serde_json::from_str::<PipelineResult>(&body).map_err(|e| {
            warn!(error = %e, "RAG backend returned an undecodable body");
            RagscopeError::MalformedResponse {
                message: e.to_string(),
            }
        })
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

/// Applies a [`Protocol`] on top of a [`RagBackend`].
#[derive(Clone)]
pub struct PipelineClient {
    backend: Arc<dyn RagBackend>,
    protocol: Protocol,
}

impl PipelineClient {
    pub fn new(backend: Arc<dyn RagBackend>, protocol: Protocol) -> Self {
        Self { backend, protocol }
    }

    /// Build an HTTP-backed client from configuration.
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let backend = HttpBackend::new(config)?;
        Ok(Self::new(Arc::new(backend), config.protocol))
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn endpoint(&self) -> &str {
        self.backend.endpoint()
    }

    /// Run a full submission under the configured protocol.
    ///
    /// The incoming `generate` flag is ignored; the protocol decides it. In the
    /// two-phase protocol a failure of either call fails the whole submission.
    pub async fn submit(&self, payload: &RequestPayload) -> Result<Submission> {
        let result = match self.protocol {
            Protocol::SinglePhase => self.backend.post_debug(&payload.with_generate(true)).await?,
            Protocol::TwoPhase => {
                let debug_result = self.backend.post_debug(&payload.with_generate(false)).await?;
                let generated = self.backend.post_debug(&payload.with_generate(true)).await?;
                PipelineResult::merge_generation(debug_result, generated)
            }
        };
        let submission = Submission::new(result);
        debug!(
            protocol = %self.protocol,
            has_answer = submission.answer.as_generated().is_some(),
            "RAG submission completed"
        );
        Ok(submission)
    }
}

/// In-memory [`RagBackend`] that replays queued responses, for tests and demos.
pub struct MockBackend {
    responses: Mutex<VecDeque<(Duration, Result<PipelineResult>)>>,
    requests: Mutex<Vec<RequestPayload>>,
}

impl MockBackend {
    pub const ENDPOINT: &'static str = "mock://rag/debug";

    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a response to be returned by the next `post_debug` call.
    pub fn queue(&self, response: Result<PipelineResult>) {
        self.queue_delayed(Duration::ZERO, response);
    }

    /// Queue a response that is returned after `delay`.
    pub fn queue_delayed(&self, delay: Duration, response: Result<PipelineResult>) {
        self.lock_responses().push_back((delay, response));
    }

    /// Every payload received so far, in call order.
    pub fn requests(&self) -> Vec<RequestPayload> {
        match self.requests.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn lock_responses(&self) -> std::sync::MutexGuard<'_, VecDeque<(Duration, Result<PipelineResult>)>> {
        match self.responses.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RagBackend for MockBackend {
    async fn post_debug(&self, payload: &RequestPayload) -> Result<PipelineResult> {
        match self.requests.lock() {
            Ok(mut guard) => guard.push(payload.clone()),
            Err(poisoned) => poisoned.into_inner().push(payload.clone()),
        }
        let next = self.lock_responses().pop_front();
        match next {
            Some((delay, response)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                response
            }
            None => Err(RagscopeError::Connection {
                url: Self::ENDPOINT.to_string(),
                message: "no response queued".to_string(),
            }),
        }
    }

    fn endpoint(&self) -> &str {
        Self::ENDPOINT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{Answer, NO_ANSWER_PLACEHOLDER, ScoredChunk};
    use pretty_assertions::assert_eq;

    fn payload() -> RequestPayload {
        RequestPayload {
            query: "What is X?".into(),
            chunk_size: 120,
            chunk_overlap: 30,
            top_k: 5,
            generate: false,
        }
    }

    fn debug_result() -> PipelineResult {
        PipelineResult {
            top_k_chunks: Some(vec![ScoredChunk {
                score: Some(0.8123),
                file: Some("a.txt".into()),
                text: Some("X is a letter.".into()),
                ..Default::default()
            }]),
            ..Default::default()
        }
    }

    #[test]
    fn test_protocol_parse() {
        assert_eq!("two_phase".parse::<Protocol>().unwrap(), Protocol::TwoPhase);
        assert_eq!("Single-Phase".parse::<Protocol>().unwrap(), Protocol::SinglePhase);
        assert!("three".parse::<Protocol>().is_err());
    }

    #[test]
    fn test_protocol_display_matches_serde() {
        for protocol in [Protocol::TwoPhase, Protocol::SinglePhase] {
            let json = serde_json::to_value(protocol).unwrap();
            assert_eq!(json.as_str().unwrap(), protocol.to_string());
        }
    }

    #[tokio::test]
    async fn test_two_phase_sends_generate_false_then_true() {
        let backend = Arc::new(MockBackend::new());
        backend.queue(Ok(debug_result()));
        backend.queue(Ok(PipelineResult {
            answer: Some("X is Y.".into()),
            ..Default::default()
        }));
        let client = PipelineClient::new(backend.clone(), Protocol::TwoPhase);

        let submission = client.submit(&payload()).await.unwrap();

        let requests = backend.requests();
        assert_eq!(requests.len(), 2);
        assert!(!requests[0].generate);
        assert!(requests[1].generate);
        assert_eq!(requests[0].query, requests[1].query);
        assert_eq!(submission.answer, Answer::Generated("X is Y.".into()));
        assert_eq!(submission.result.top_k_chunks.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_two_phase_second_call_failure_fails_submission() {
        let backend = Arc::new(MockBackend::new());
        backend.queue(Ok(debug_result()));
        backend.queue(Err(RagscopeError::backend(500, "llm down")));
        let client = PipelineClient::new(backend, Protocol::TwoPhase);

        let err = client.submit(&payload()).await.unwrap_err();
        assert_eq!(err.user_message(), "llm down");
    }

    #[tokio::test]
    async fn test_two_phase_first_call_failure_skips_second() {
        let backend = Arc::new(MockBackend::new());
        backend.queue(Err(RagscopeError::backend(503, "warming up")));
        let client = PipelineClient::new(backend.clone(), Protocol::TwoPhase);

        assert!(client.submit(&payload()).await.is_err());
        assert_eq!(backend.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_single_phase_sends_one_generate_call() {
        let backend = Arc::new(MockBackend::new());
        let mut full = debug_result();
        full.answer = Some("X is Y.".into());
        backend.queue(Ok(full));
        let client = PipelineClient::new(backend.clone(), Protocol::SinglePhase);

        let submission = client.submit(&payload()).await.unwrap();
        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].generate);
        assert_eq!(submission.answer.display_text(), "X is Y.");
    }

    #[tokio::test]
    async fn test_blank_answer_yields_placeholder() {
        let backend = Arc::new(MockBackend::new());
        backend.queue(Ok(PipelineResult {
            answer: Some("   ".into()),
            ..Default::default()
        }));
        let client = PipelineClient::new(backend, Protocol::SinglePhase);

        let submission = client.submit(&payload()).await.unwrap();
        assert_eq!(submission.answer, Answer::Missing);
        assert_eq!(submission.answer.display_text(), NO_ANSWER_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_mock_without_queued_response_is_connection_error() {
        let backend = MockBackend::new();
        let err = backend.post_debug(&payload()).await.unwrap_err();
        assert!(matches!(err, RagscopeError::Connection { .. }));
    }

    #[test]
    fn test_http_backend_uses_endpoint_url() {
        let config = BackendConfig {
            base_url: "http://127.0.0.1:9/".into(),
            timeout_secs: Some(1),
            ..Default::default()
        };
        let backend = HttpBackend::new(&config).unwrap();
        assert_eq!(backend.endpoint(), "http://127.0.0.1:9/rag/debug");
    }
}
