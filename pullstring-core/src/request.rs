//! Request-side parameters for Web API calls.

use serde::{Deserialize, Serialize};

/// The asset build to target with Web API requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildType {
    Sandbox,
    Staging,
    #[default]
    Production,
}

impl BuildType {
    pub fn as_str(&self) -> &str {
        match self {
            BuildType::Sandbox => "sandbox",
            BuildType::Staging => "staging",
            BuildType::Production => "production",
        }
    }
}

/// Audio formats accepted for speech input.
///
/// Raw audio must be mono 16-bit little-endian PCM at 16000 samples per
/// second. The WAV variant is a RIFF container wrapping the same format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioFormat {
    #[default]
    RawPcm16k,
    Wav16k,
}

/// What to do when a polled conversation has been modified on the server
/// since it was last fetched. Only meaningful for polling-style calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IfModifiedAction {
    Restart,
    Update,
    #[default]
    Nothing,
}

impl IfModifiedAction {
    pub fn as_str(&self) -> &str {
        match self {
            IfModifiedAction::Restart => "restart",
            IfModifiedAction::Update => "update",
            IfModifiedAction::Nothing => "nothing",
        }
    }
}

/// Parameters for a single request to the PullString Web API.
///
/// The API key is required for `start`; the conversation remembers it for
/// subsequent calls, so later requests may leave it empty. Continuity ids
/// (`conversation_id`, `participant_id`, `state_id`) are normally managed
/// by the conversation itself and only need to be supplied here to resume
/// a persisted session.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub api_key: String,
    pub conversation_id: String,
    pub participant_id: String,
    pub state_id: String,
    pub build_type: BuildType,
    pub language: Option<String>,
    pub locale: Option<String>,
    pub time_zone_offset: Option<i32>,
    pub if_modified_action: IfModifiedAction,
}

impl Request {
    /// A request carrying only an API key, the minimum needed for `start`.
    pub fn with_api_key<K: Into<String>>(api_key: K) -> Self {
        Self { api_key: api_key.into(), ..Default::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_type_serializes_lowercase() {
        assert_eq!(serde_json::to_value(BuildType::Sandbox).unwrap(), "sandbox");
        assert_eq!(BuildType::default(), BuildType::Production);
    }

    #[test]
    fn test_request_with_api_key() {
        let request = Request::with_api_key("K");
        assert_eq!(request.api_key, "K");
        assert!(request.conversation_id.is_empty());
        assert_eq!(request.if_modified_action, IfModifiedAction::Nothing);
    }
}
