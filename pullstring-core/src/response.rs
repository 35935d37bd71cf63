//! Response model and tolerant payload decoding.
//!
//! Decoding never performs I/O and never fails on missing optional fields
//! or on individual outputs/entities of a type this client does not know
//! about; those elements are skipped so that server-side additions do not
//! break older clients.

use crate::error::{PullStringError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single phoneme in a dialog output, e.g. to drive lip sync.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Phoneme {
    pub name: String,
    #[serde(default)]
    pub seconds_since_start: f64,
}

/// A single output returned by the server, in playback/execution order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Output {
    /// A line of dialog, optionally with synthesized audio and timing.
    Dialog {
        #[serde(default)]
        guid: String,
        #[serde(default)]
        text: String,
        #[serde(default)]
        uri: Option<String>,
        #[serde(default)]
        character: Option<String>,
        #[serde(default)]
        user_data: Option<String>,
        #[serde(default)]
        phonemes: Vec<Phoneme>,
        #[serde(default)]
        duration: f64,
    },
    /// A named app-side behavior to trigger, with its parameters.
    Behavior {
        #[serde(default)]
        guid: String,
        behavior: String,
        #[serde(default)]
        parameters: serde_json::Map<String, Value>,
    },
}

/// A named piece of conversation state. The name is unique within one
/// entity list; the variant carries the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Entity {
    Label { name: String, value: String },
    Counter { name: String, value: f64 },
    Flag { name: String, value: bool },
}

impl Entity {
    pub fn name(&self) -> &str {
        match self {
            Entity::Label { name, .. } => name,
            Entity::Counter { name, .. } => name,
            Entity::Flag { name, .. } => name,
        }
    }
}

/// Outcome of a Web API call as reported by the server.
///
/// A response with `success == false` is not a client error; it is a
/// normal response whose status carries the server-side refusal.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub success: bool,
    pub code: i64,
    pub message: Option<String>,
}

impl Status {
    fn ok() -> Self {
        Self { success: true, code: 200, message: None }
    }
}

/// A decoded response from the PullString Web API.
///
/// Continuity fields are `Option` so that a partial response leaves the
/// corresponding session state untouched; not every call kind returns
/// every field.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub outputs: Vec<Output>,
    pub entities: Vec<Entity>,
    pub status: Status,
    pub conversation_id: Option<String>,
    pub participant_id: Option<String>,
    pub state_id: Option<String>,
    pub last_modified: Option<String>,
    pub etag: Option<String>,
    pub timed_response_interval: Option<f64>,
    pub asr_hypothesis: Option<String>,
}

impl Response {
    /// Decode a raw payload, treating an empty or `null` body as a decode
    /// failure. Use [`Response::decode_optional`] for call kinds where the
    /// server legitimately returns no result.
    pub fn decode(bytes: &[u8]) -> Result<Response> {
        Self::decode_optional(bytes)?
            .ok_or_else(|| PullStringError::Decode("empty response body".to_string()))
    }

    /// Decode a raw payload, mapping an empty or JSON `null` body to
    /// `None`. This is the "no result" contract used by timed-response
    /// polling and audio input.
    pub fn decode_optional(bytes: &[u8]) -> Result<Option<Response>> {
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(None);
        }
        let value: Value = serde_json::from_slice(bytes)?;
        if value.is_null() {
            return Ok(None);
        }
        Self::from_value(value).map(Some)
    }

    fn from_value(value: Value) -> Result<Response> {
        let object = value
            .as_object()
            .ok_or_else(|| PullStringError::Decode("response payload is not a JSON object".to_string()))?;

        if let Some(error) = object.get("error") {
            return Ok(Self::from_error_value(error));
        }

        let outputs = decode_elements(object.get("outputs"), "output");
        let entities = decode_elements(object.get("entities"), "entity");

        Ok(Response {
            outputs,
            entities,
            status: Status::ok(),
            conversation_id: string_field(object, "conversation"),
            participant_id: string_field(object, "participant"),
            state_id: string_field(object, "state_id"),
            last_modified: string_field(object, "last_modified"),
            etag: string_field(object, "etag"),
            timed_response_interval: object
                .get("timed_response_interval")
                .and_then(Value::as_f64),
            asr_hypothesis: string_field(object, "asr_hypothesis"),
        })
    }

    fn from_error_value(error: &Value) -> Response {
        let code = error.get("status").and_then(Value::as_i64).unwrap_or(500);
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or("unknown server error")
            .to_string();

        Response {
            outputs: Vec::new(),
            entities: Vec::new(),
            status: Status { success: false, code, message: Some(message) },
            conversation_id: None,
            participant_id: None,
            state_id: None,
            last_modified: None,
            etag: None,
            timed_response_interval: None,
            asr_hypothesis: None,
        }
    }
}

fn string_field(object: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Decode each element of an array independently; an element that does not
/// deserialize (unknown type tag, malformed shape) is skipped, not fatal.
fn decode_elements<T: serde::de::DeserializeOwned>(value: Option<&Value>, kind: &str) -> Vec<T> {
    let Some(elements) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut decoded = Vec::with_capacity(elements.len());
    let mut skipped = 0usize;
    for element in elements {
        match serde_json::from_value::<T>(element.clone()) {
            Ok(item) => decoded.push(item),
            Err(error) => {
                skipped += 1;
                tracing::debug!(kind, %error, "skipping unrecognized element");
            }
        }
    }
    if skipped > 0 {
        tracing::debug!(kind, skipped, "response contained unrecognized elements");
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_dialog_output() {
        let payload = json!({
            "conversation": "c1",
            "participant": "p1",
            "asr_hypothesis": "hello world",
            "outputs": [{
                "type": "dialog",
                "guid": "g1",
                "text": "Hello, world",
                "character": "Narrator",
                "phonemes": [
                    {"name": "HH", "seconds_since_start": 0.0},
                    {"name": "EH", "seconds_since_start": 0.08}
                ],
                "duration": 1.25
            }]
        });

        let response = Response::decode(payload.to_string().as_bytes()).unwrap();
        assert!(response.status.success);
        assert_eq!(response.conversation_id.as_deref(), Some("c1"));
        assert_eq!(response.participant_id.as_deref(), Some("p1"));
        assert_eq!(response.asr_hypothesis.as_deref(), Some("hello world"));
        assert_eq!(response.outputs.len(), 1);
        match &response.outputs[0] {
            Output::Dialog { text, phonemes, duration, .. } => {
                assert_eq!(text, "Hello, world");
                assert_eq!(phonemes.len(), 2);
                assert_eq!(phonemes[1].name, "EH");
                assert_eq!(*duration, 1.25);
            }
            other => panic!("expected dialog output, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_output_type_is_skipped() {
        let payload = json!({
            "outputs": [
                {"type": "dialog", "text": "Hi"},
                {"type": "hologram", "projection": "full"}
            ]
        });

        let response = Response::decode(payload.to_string().as_bytes()).unwrap();
        assert_eq!(response.outputs.len(), 1);
        assert!(matches!(&response.outputs[0], Output::Dialog { text, .. } if text == "Hi"));
    }

    #[test]
    fn test_decode_entities() {
        let payload = json!({
            "entities": [
                {"type": "label", "name": "NAME", "value": "jill"},
                {"type": "counter", "name": "VISITS", "value": 3.0},
                {"type": "flag", "name": "RETURNING", "value": true},
                {"type": "matrix", "name": "UNKNOWN", "value": [1, 2]}
            ]
        });

        let response = Response::decode(payload.to_string().as_bytes()).unwrap();
        assert_eq!(response.entities.len(), 3);
        assert_eq!(
            response.entities[0],
            Entity::Label { name: "NAME".into(), value: "jill".into() }
        );
        assert_eq!(
            response.entities[1],
            Entity::Counter { name: "VISITS".into(), value: 3.0 }
        );
        assert_eq!(
            response.entities[2],
            Entity::Flag { name: "RETURNING".into(), value: true }
        );
    }

    #[test]
    fn test_error_payload_decodes_to_failure_status() {
        let payload = json!({"error": {"status": 401, "message": "invalid api key"}});

        let response = Response::decode(payload.to_string().as_bytes()).unwrap();
        assert!(!response.status.success);
        assert_eq!(response.status.code, 401);
        assert_eq!(response.status.message.as_deref(), Some("invalid api key"));
        assert!(response.outputs.is_empty());
        assert!(response.entities.is_empty());
    }

    #[test]
    fn test_error_payload_without_message_gets_one() {
        let payload = json!({"error": {"status": 500}});

        let response = Response::decode(payload.to_string().as_bytes()).unwrap();
        assert!(!response.status.success);
        assert!(response.status.message.as_deref().is_some_and(|m| !m.is_empty()));
    }

    #[test]
    fn test_missing_fields_are_absent_not_fatal() {
        let response = Response::decode(b"{}").unwrap();
        assert!(response.status.success);
        assert!(response.outputs.is_empty());
        assert!(response.conversation_id.is_none());
        assert!(response.timed_response_interval.is_none());
    }

    #[test]
    fn test_empty_and_null_bodies_decode_to_none() {
        assert_eq!(Response::decode_optional(b"").unwrap(), None);
        assert_eq!(Response::decode_optional(b"  \n").unwrap(), None);
        assert_eq!(Response::decode_optional(b"null").unwrap(), None);
        assert!(Response::decode(b"").is_err());
    }

    #[test]
    fn test_garbage_payload_is_a_decode_error() {
        assert!(Response::decode(b"not json at all").is_err());
        assert!(matches!(
            Response::decode(b"[1, 2, 3]"),
            Err(PullStringError::Decode(_))
        ));
    }

    #[test]
    fn test_timed_response_interval() {
        let payload = json!({"timed_response_interval": 4.5});
        let response = Response::decode(payload.to_string().as_bytes()).unwrap();
        assert_eq!(response.timed_response_interval, Some(4.5));
    }

    #[test]
    fn test_entity_roundtrips_through_json() {
        let entity = Entity::Counter { name: "SCORE".into(), value: 12.0 };
        let value = serde_json::to_value(&entity).unwrap();
        assert_eq!(value["type"], "counter");
        assert_eq!(serde_json::from_value::<Entity>(value).unwrap(), entity);
    }
}
