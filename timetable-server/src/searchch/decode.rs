//! Top-level response decoding.
//!
//! Separates the three shapes a `route.json` body can take and keeps
//! "the upstream found nothing" apart from "the body is not what we expect".

use tracing::debug;

use super::types::{CompletionEntry, RawConnection, RouteResponse};

/// Errors from decoding a response body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The body is not valid JSON for the expected shape
    #[error("invalid JSON: {message} (body: {excerpt})")]
    InvalidJson { message: String, excerpt: String },

    /// Valid JSON, but none of `error`, `connections` or `messages`
    #[error("unrecognised response shape: expected error, connections or messages")]
    UnrecognisedShape,
}

impl DecodeError {
    fn json(err: serde_json::Error, body: &str) -> Self {
        DecodeError::InvalidJson {
            message: err.to_string(),
            excerpt: body.chars().take(500).collect(),
        }
    }
}

/// What a trip-query response contained.
#[derive(Debug, Clone)]
pub enum RouteOutcome {
    /// Zero or more connections to convert.
    Connections(Vec<RawConnection>),
    /// The upstream reported an error or sent only messages.
    NoResult { reason: String },
}

/// Decodes a `route.json` body.
///
/// # Errors
///
/// Returns [`DecodeError`] if the body is not JSON or has none of the
/// recognised top-level shapes.
pub fn decode_route(body: &str) -> Result<RouteOutcome, DecodeError> {
    let response: RouteResponse =
        serde_json::from_str(body).map_err(|e| DecodeError::json(e, body))?;

    if let Some(error) = response.error {
        return Ok(RouteOutcome::NoResult { reason: error });
    }

    if let Some(connections) = response.connections {
        let count = response.count.unwrap_or(connections.len() as i64);
        if count != connections.len() as i64 {
            debug!(
                count,
                received = connections.len(),
                "connection count disagrees with array length"
            );
        }
        return Ok(RouteOutcome::Connections(connections));
    }

    if let Some(messages) = response.messages {
        return Ok(RouteOutcome::NoResult {
            reason: messages.join("; "),
        });
    }

    Err(DecodeError::UnrecognisedShape)
}

/// Decodes a `completion.json` body.
pub fn decode_completions(body: &str) -> Result<Vec<CompletionEntry>, DecodeError> {
    serde_json::from_str(body).map_err(|e| DecodeError::json(e, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_is_no_result() {
        let outcome = decode_route(r#"{"error":"no connections"}"#).unwrap();
        match outcome {
            RouteOutcome::NoResult { reason } => assert_eq!(reason, "no connections"),
            other => panic!("expected NoResult, got {other:?}"),
        }
    }

    #[test]
    fn messages_are_joined() {
        let outcome = decode_route(r#"{"messages":["Datum ungültig","Bitte erneut versuchen"]}"#)
            .unwrap();
        match outcome {
            RouteOutcome::NoResult { reason } => {
                assert_eq!(reason, "Datum ungültig; Bitte erneut versuchen")
            }
            other => panic!("expected NoResult, got {other:?}"),
        }
    }

    #[test]
    fn connections_decoded() {
        let body = r#"{"count":1,"connections":[{"from":"A","to":"B","legs":[]}]}"#;
        match decode_route(body).unwrap() {
            RouteOutcome::Connections(conns) => {
                assert_eq!(conns.len(), 1);
                assert_eq!(conns[0].from.as_deref(), Some("A"));
            }
            other => panic!("expected connections, got {other:?}"),
        }
    }

    #[test]
    fn null_leg_fields_do_not_fail_response() {
        let body = r#"{"connections":[{"legs":[
            {"type":"train","name":"A","infotext":null,"cancelled":null,
             "exit":{"name":"B","arrival":"2024-03-15 08:20:00"}},
            {"name":"B"}
        ]}]}"#;
        match decode_route(body).unwrap() {
            RouteOutcome::Connections(conns) => {
                let leg = &conns[0].legs[0];
                assert!(leg.infotext.is_empty());
                assert!(!leg.cancelled);
            }
            other => panic!("expected connections, got {other:?}"),
        }
    }

    #[test]
    fn empty_connections_without_count() {
        match decode_route(r#"{"connections":[]}"#).unwrap() {
            RouteOutcome::Connections(conns) => assert!(conns.is_empty()),
            other => panic!("expected connections, got {other:?}"),
        }
    }

    #[test]
    fn error_wins_over_connections() {
        let body = r#"{"error":"bad station","connections":[]}"#;
        assert!(matches!(
            decode_route(body).unwrap(),
            RouteOutcome::NoResult { .. }
        ));
    }

    #[test]
    fn unrecognised_shape() {
        assert_eq!(
            decode_route(r#"{"count":0}"#).unwrap_err(),
            DecodeError::UnrecognisedShape
        );
        assert_eq!(decode_route("{}").unwrap_err(), DecodeError::UnrecognisedShape);
    }

    #[test]
    fn invalid_json() {
        let err = decode_route("<html>502 Bad Gateway</html>").unwrap_err();
        match err {
            DecodeError::InvalidJson { excerpt, .. } => {
                assert_eq!(excerpt, "<html>502 Bad Gateway</html>")
            }
            other => panic!("expected InvalidJson, got {other:?}"),
        }
        assert!(matches!(decode_route("[1,2]"), Err(DecodeError::InvalidJson { .. })));
    }

    #[test]
    fn long_body_truncated() {
        let body = "x".repeat(2000);
        match decode_route(&body).unwrap_err() {
            DecodeError::InvalidJson { excerpt, .. } => assert_eq!(excerpt.len(), 500),
            other => panic!("expected InvalidJson, got {other:?}"),
        }
    }

    #[test]
    fn completions() {
        let entries = decode_completions(r#"[{"id":"8507000","label":"Bern"}]"#).unwrap();
        assert_eq!(entries[0].label.as_deref(), Some("Bern"));
        assert!(decode_completions(r#"{"error":"x"}"#).is_err());
    }
}
