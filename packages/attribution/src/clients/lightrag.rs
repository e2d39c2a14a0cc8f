//! HTTP client for a LightRAG retrieval server.
//!
//! LightRAG exposes a single `/query` endpoint. The request's `mode` selects
//! the retrieval strategy ("naive" for pure vector similarity, "mix" for
//! knowledge-graph traversal blended with vector results) and
//! `only_need_context` switches between the raw retrieved context, with
//! citation markers embedded, and an LLM-generated answer.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AttributionError, Result};
use crate::security::ApiKey;
use crate::traits::retrieval::{RetrievalMode, RetrievalResponse, Retriever};

/// Results requested when fetching raw context for attribution.
pub const DEFAULT_CONTEXT_TOP_K: usize = 10;

/// Results requested when generating an answer.
pub const DEFAULT_ANSWER_TOP_K: usize = 5;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Maximum characters of an error body carried into the error message.
const ERROR_BODY_EXCERPT_CHARS: usize = 200;

/// Client for the LightRAG query API.
///
/// A single retrieval issues two wire calls per mode: one with
/// `only_need_context = true` for the marker-bearing context, and one with
/// `only_need_context = false` for the generated answer. Both run
/// concurrently.
#[derive(Debug, Clone)]
pub struct LightRagClient {
    base_url: String,
    api_key: Option<ApiKey>,
    client: reqwest::Client,
    context_top_k: usize,
    answer_top_k: usize,
}

impl LightRagClient {
    /// Creates a client for the server at `base_url` with a 60 second
    /// request timeout. Fails if the URL does not parse.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        url::Url::parse(&base_url).map_err(|e| AttributionError::Config(Box::new(e)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| AttributionError::Config(Box::new(e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
            client,
            context_top_k: DEFAULT_CONTEXT_TOP_K,
            answer_top_k: DEFAULT_ANSWER_TOP_K,
        })
    }

    /// Sends a bearer token with every request.
    pub fn with_api_key(mut self, api_key: impl Into<ApiKey>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Replaces the default request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AttributionError::Config(Box::new(e)))?;
        Ok(self)
    }

    /// Sets how many results context retrieval asks for.
    pub fn with_context_top_k(mut self, top_k: usize) -> Self {
        self.context_top_k = top_k;
        self
    }

    /// Sets how many results answer generation asks for.
    pub fn with_answer_top_k(mut self, top_k: usize) -> Self {
        self.answer_top_k = top_k;
        self
    }

    async fn query(
        &self,
        query: &str,
        mode: RetrievalMode,
        top_k: usize,
        only_need_context: bool,
    ) -> Result<String> {
        let url = format!("{}/query", self.base_url);
        let request = QueryRequest {
            query,
            mode: wire_mode(mode),
            top_k,
            only_need_context,
        };

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AttributionError::Retrieval(Box::new(e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AttributionError::Retrieval(Box::new(e)))?;

        if !status.is_success() {
            let excerpt: String = body.chars().take(ERROR_BODY_EXCERPT_CHARS).collect();
            return Err(AttributionError::Retrieval(
                format!("LightRAG returned {status}: {excerpt}").into(),
            ));
        }

        let parsed: QueryResponse = serde_json::from_str(&body)?;
        debug!(
            mode = %mode,
            only_need_context,
            response_chars = parsed.response.chars().count(),
            "lightrag query complete"
        );
        Ok(parsed.response)
    }
}

#[async_trait]
impl Retriever for LightRagClient {
    async fn retrieve(
        &self,
        query: &str,
        mode: RetrievalMode,
        context_only: bool,
    ) -> Result<RetrievalResponse> {
        if context_only {
            let context = self.query(query, mode, self.context_top_k, true).await?;
            return Ok(RetrievalResponse::context_only(context));
        }

        let (context, answer) = tokio::join!(
            self.query(query, mode, self.context_top_k, true),
            self.query(query, mode, self.answer_top_k, false),
        );

        Ok(RetrievalResponse::new(context?, answer?))
    }
}

/// Maps a retrieval mode to LightRAG's wire name for it.
fn wire_mode(mode: RetrievalMode) -> &'static str {
    match mode {
        RetrievalMode::Vector => "naive",
        RetrievalMode::Graph => "mix",
    }
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    mode: &'a str,
    top_k: usize,
    only_need_context: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_mode_names() {
        assert_eq!(wire_mode(RetrievalMode::Vector), "naive");
        assert_eq!(wire_mode(RetrievalMode::Graph), "mix");
    }

    #[test]
    fn test_request_serialization() {
        let request = QueryRequest {
            query: "hva sa Morten om jobb",
            mode: "naive",
            top_k: 10,
            only_need_context: true,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["query"], "hva sa Morten om jobb");
        assert_eq!(json["mode"], "naive");
        assert_eq!(json["top_k"], 10);
        assert_eq!(json["only_need_context"], true);
    }

    #[test]
    fn test_response_deserialization() {
        let parsed: QueryResponse =
            serde_json::from_str(r#"{"response": "some context", "extra": 1}"#).unwrap();
        assert_eq!(parsed.response, "some context");
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = LightRagClient::new("http://localhost:9621/").unwrap();
        assert_eq!(client.base_url, "http://localhost:9621");

        let client = LightRagClient::new("http://localhost:9621").unwrap();
        assert_eq!(client.base_url, "http://localhost:9621");
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        let result = LightRagClient::new("not a url");
        assert!(matches!(result, Err(AttributionError::Config(_))));
    }

    #[test]
    fn test_builders() {
        let client = LightRagClient::new("http://localhost:9621")
            .unwrap()
            .with_api_key("secret-key")
            .with_context_top_k(20)
            .with_answer_top_k(3);

        assert!(client.api_key.is_some());
        assert_eq!(client.context_top_k, 20);
        assert_eq!(client.answer_top_k, 3);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let client = LightRagClient::new("http://localhost:9621")
            .unwrap()
            .with_api_key("super-secret-token");

        let debug = format!("{client:?}");
        assert!(!debug.contains("super-secret-token"));
        assert!(debug.contains("REDACTED"));
    }
}
