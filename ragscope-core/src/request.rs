//! Request builder: turns the current parameters into the backend payload.

use crate::error::{RagscopeError, Result};
use crate::params::{CHUNK_OVERLAP_RANGE, CHUNK_SIZE_RANGE, Parameters, TOP_K_RANGE};
use serde::{Deserialize, Serialize};

/// JSON body of `POST /rag/debug`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestPayload {
    pub query: String,
    pub chunk_size: u32,
    pub chunk_overlap: u32,
    pub top_k: u32,
    pub generate: bool,
}

impl RequestPayload {
    /// Copy of this payload with only the `generate` flag replaced.
    pub fn with_generate(&self, generate: bool) -> Self {
        Self {
            generate,
            ..self.clone()
        }
    }
}

/// Build a payload from `params`.
///
/// Fails with [`RagscopeError::Validation`] when the trimmed query is empty. This runs
/// before any network activity.
pub fn build_request(params: &Parameters, generate: bool) -> Result<RequestPayload> {
    let query = params.query().trim();
    if query.is_empty() {
        return Err(RagscopeError::empty_query());
    }
    Ok(RequestPayload {
        query: query.to_string(),
        chunk_size: CHUNK_SIZE_RANGE.clamp(params.chunk_size()),
        chunk_overlap: CHUNK_OVERLAP_RANGE.clamp(params.chunk_overlap()),
        top_k: TOP_K_RANGE.clamp(params.top_k()),
        generate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_trims_query() {
        let params = Parameters::new("  What is X?\n", 120, 30, 5);
        let payload = build_request(&params, false).unwrap();
        assert_eq!(payload.query, "What is X?");
        assert!(!payload.generate);
    }

    #[test]
    fn test_build_rejects_blank_query() {
        for query in ["", "   ", "\t\n"] {
            let params = Parameters::new(query, 120, 30, 5);
            let err = build_request(&params, true).unwrap_err();
            assert!(matches!(err, RagscopeError::Validation { .. }));
        }
    }

    #[test]
    fn test_payload_wire_format() {
        let params = Parameters::new("What is X?", 120, 30, 5);
        let payload = build_request(&params, true).unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "query": "What is X?",
                "chunk_size": 120,
                "chunk_overlap": 30,
                "top_k": 5,
                "generate": true,
            })
        );
    }

    #[test]
    fn test_with_generate_keeps_other_fields() {
        let params = Parameters::new("q", 200, 40, 3);
        let first = build_request(&params, false).unwrap();
        let second = first.with_generate(true);
        assert!(second.generate);
        assert_eq!(second.query, first.query);
        assert_eq!(second.chunk_size, 200);
        assert_eq!(second.chunk_overlap, 40);
        assert_eq!(second.top_k, 3);
    }
}
