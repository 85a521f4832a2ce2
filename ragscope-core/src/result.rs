//! Pipeline result model.
//!
//! Every section of the backend response is optional. Absence is kept as `None` all
//! the way to the renderer, which turns it into a dedicated "unavailable" panel state
//! instead of an empty list.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fallback shown when the backend produced no usable answer.
pub const NO_ANSWER_PLACEHOLDER: &str = "No answer was generated for this query.";

/// Chunk identifier as sent by the backend: usually an index, sometimes a string key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChunkId {
    Index(i64),
    Key(String),
}

impl std::fmt::Display for ChunkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{}", i),
            Self::Key(k) => write!(f, "{}", k),
        }
    }
}

/// One scored chunk from `top_k_chunks`, `similarity_data` or `chunks`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_id: Option<ChunkId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Normalized response of the debug endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Raw source documents by name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<BTreeMap<String, String>>,
    /// Every chunk the backend produced, before scoring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks: Option<Vec<ScoredChunk>>,
    /// First dimensions of each chunk embedding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_embeddings_preview: Option<Vec<Vec<f64>>>,
    /// First dimensions of the query embedding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_embedding_preview: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_data: Option<Vec<ScoredChunk>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k_chunks: Option<Vec<ScoredChunk>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl PipelineResult {
    /// Merge the two responses of the two-phase protocol.
    ///
    /// `answer` and `final_context` come from the generation call when it has them.
    /// Every other section comes from the debug call, filled from the generation call
    /// only where the debug call left it out.
    pub fn merge_generation(debug: PipelineResult, generated: PipelineResult) -> PipelineResult {
        PipelineResult {
            documents: debug.documents.or(generated.documents),
            chunks: debug.chunks.or(generated.chunks),
            chunk_embeddings_preview: debug
                .chunk_embeddings_preview
                .or(generated.chunk_embeddings_preview),
            query_embedding_preview: debug
                .query_embedding_preview
                .or(generated.query_embedding_preview),
            similarity_data: debug.similarity_data.or(generated.similarity_data),
            top_k_chunks: debug.top_k_chunks.or(generated.top_k_chunks),
            final_context: generated.final_context.or(debug.final_context),
            answer: generated.answer.or(debug.answer),
        }
    }
}

/// Answer derived from a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Generated(String),
    Missing,
}

impl Answer {
    /// Absent or whitespace-only answers become [`Answer::Missing`].
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(text) if !text.is_empty() => Self::Generated(text.to_string()),
            _ => Self::Missing,
        }
    }

    pub fn as_generated(&self) -> Option<&str> {
        match self {
            Self::Generated(text) => Some(text),
            Self::Missing => None,
        }
    }

    /// The generated text, or [`NO_ANSWER_PLACEHOLDER`].
    pub fn display_text(&self) -> &str {
        self.as_generated().unwrap_or(NO_ANSWER_PLACEHOLDER)
    }
}

/// What a successful submission hands back to the session.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub result: PipelineResult,
    pub answer: Answer,
}

impl Submission {
    pub fn new(result: PipelineResult) -> Self {
        let answer = Answer::from_raw(result.answer.as_deref());
        Self { result, answer }
    }
}
