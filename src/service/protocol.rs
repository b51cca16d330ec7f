//! Worker wire protocol
//!
//! Request:  `{ "type": "search", "id": n, "text": "...", "terms": ["..."] }`
//! Response: `{ "type": "result", "id": n, "matches": [{ "term", "start", "end" }] }`
//!
//! Messages of any other `type` are ignored by the worker side.

use serde::{Deserialize, Serialize};

use crate::error::GlossError;
use crate::matcher::{scan, BuildOptions, TermAutomaton, TermMatch};

/// Correlation id chosen by the submitting side
pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub id: RequestId,
    pub text: String,
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub id: RequestId,
    pub matches: Vec<TermMatch>,
}

/// Messages accepted by the worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InboundMessage {
    Search(SearchRequest),
}

/// Messages emitted by the worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    Result(SearchResponse),
}

/// Run one search request: build the automaton, scan once.
pub fn handle_search(request: SearchRequest) -> SearchResponse {
    handle_search_with(request, BuildOptions::default())
}

/// [`handle_search`] with explicit pattern normalization
pub fn handle_search_with(request: SearchRequest, options: BuildOptions) -> SearchResponse {
    let started = instant::Instant::now();
    let automaton = TermAutomaton::build_with(&request.terms, options);
    let matches = scan(&request.text, &automaton);
    log::debug!(
        "search #{}: {} terms over {} bytes -> {} matches in {:?}",
        request.id,
        automaton.pattern_count(),
        request.text.len(),
        matches.len(),
        started.elapsed()
    );
    SearchResponse {
        id: request.id,
        matches,
    }
}

/// Decode a wire value. `Ok(None)` for well-formed messages of another type.
pub fn decode_value(value: serde_json::Value) -> Result<Option<SearchRequest>, GlossError> {
    match value.get("type").and_then(|t| t.as_str()) {
        Some("search") => {}
        Some(_) => return Ok(None),
        None => return Err(GlossError::Protocol("message has no string `type`".to_string())),
    }
    match serde_json::from_value::<InboundMessage>(value) {
        Ok(InboundMessage::Search(request)) => Ok(Some(request)),
        Err(e) => Err(GlossError::Protocol(e.to_string())),
    }
}

/// Decode a JSON wire message; see [`decode_value`]
pub fn decode_request(json: &str) -> Result<Option<SearchRequest>, GlossError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| GlossError::Protocol(e.to_string()))?;
    decode_value(value)
}

pub fn encode_response(response: SearchResponse) -> Result<String, GlossError> {
    serde_json::to_string(&OutboundMessage::Result(response))
        .map_err(|e| GlossError::Protocol(e.to_string()))
}

/// Worker-side entry: answer a `search` message, ignore everything else.
///
/// Undecodable messages are dropped (logged) rather than surfaced, since no
/// pending request can be correlated with them.
pub fn dispatch(json: &str) -> Option<String> {
    let request = match decode_request(json) {
        Ok(Some(request)) => request,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("dropping worker message: {}", e);
            return None;
        }
    };
    match encode_response(handle_search(request)) {
        Ok(out) => Some(out),
        Err(e) => {
            log::error!("failed to encode worker response: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dispatch_search_round_trip() {
        let req = r#"{"type":"search","id":7,"text":"xaby","terms":["a","ab"]}"#;
        let out: serde_json::Value = serde_json::from_str(&dispatch(req).unwrap()).unwrap();
        assert_eq!(
            out,
            json!({
                "type": "result",
                "id": 7,
                "matches": [
                    {"term": "a", "start": 1, "end": 2},
                    {"term": "ab", "start": 1, "end": 3}
                ]
            })
        );
    }

    #[test]
    fn test_other_types_ignored() {
        assert_eq!(dispatch(r#"{"type":"ping","id":1}"#), None);
        assert_eq!(dispatch(r#"{"type":"result","id":1,"matches":[]}"#), None);
    }

    #[test]
    fn test_malformed_dropped() {
        assert_eq!(dispatch("not json"), None);
        assert_eq!(dispatch(r#"{"id":1}"#), None);
        assert_eq!(dispatch(r#"{"type":"search","id":1}"#), None);
    }

    #[test]
    fn test_decode_distinguishes_ignored_from_malformed() {
        assert_eq!(decode_request(r#"{"type":"cancel"}"#), Ok(None));
        assert!(matches!(decode_request("[1,2]"), Err(GlossError::Protocol(_))));
        let req = decode_request(r#"{"type":"search","id":3,"text":"t","terms":[]}"#)
            .unwrap()
            .unwrap();
        assert_eq!(req.id, 3);
        assert!(req.terms.is_empty());
    }

    #[test]
    fn test_untrimmed_search_keeps_padded_terms() {
        let request = SearchRequest {
            id: 3,
            text: "a b".to_string(),
            terms: vec![" b".to_string()],
        };
        let trimmed = handle_search(request.clone());
        assert_eq!(trimmed.matches, vec![TermMatch::new("b", 2, 3)]);
        let raw = handle_search_with(request, BuildOptions { trim: false });
        assert_eq!(raw.matches, vec![TermMatch::new(" b", 1, 3)]);
    }

    #[test]
    fn test_empty_terms_yield_empty_matches() {
        let resp = handle_search(SearchRequest {
            id: 1,
            text: "anything".to_string(),
            terms: vec![" ".to_string()],
        });
        assert!(resp.matches.is_empty());
    }
}
