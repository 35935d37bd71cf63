//! Pure request assembly from call kind, session state, and config.

use crate::config::ApiConfig;
use crate::transport::{RequestBody, RequestDescriptor};
use pullstring_core::{Entity, IfModifiedAction, PullStringError, Request, Result, SessionState};
use serde_json::{Map, Value, json};

/// The per-call payload, one variant per public operation.
#[derive(Debug, Clone)]
pub(crate) enum CallBody {
    Start { project: String },
    Text(String),
    Activity(String),
    Event { name: String, parameters: Map<String, Value> },
    Audio(Vec<u8>),
    GoTo(String),
    TimedResponse,
    GetEntities(Vec<String>),
    SetEntities(Vec<Entity>),
}

/// Assemble a request descriptor. Fails fast, before any network call:
/// a non-`start` call without an active conversation is a `Sequence`
/// error, and a missing API key is a `Config` error. Session state is
/// embedded verbatim and never altered here.
pub(crate) fn build(
    call: CallBody,
    state: &SessionState,
    request: &Request,
    config: &ApiConfig,
) -> Result<RequestDescriptor> {
    let is_start = matches!(&call, CallBody::Start { .. });
    if !is_start && state.conversation_id.is_empty() {
        return Err(PullStringError::Sequence("no active conversation".to_string()));
    }
    if request.api_key.is_empty() {
        return Err(PullStringError::Config("api key is required".to_string()));
    }

    let base = config.base_url(request.build_type);
    let suffix = if is_start {
        "conversation".to_string()
    } else {
        format!("conversation/{}", state.conversation_id)
    };
    let mut url = base
        .join(&suffix)
        .map_err(|e| PullStringError::Config(format!("invalid base URL: {e}")))?;

    if let Some(language) = &request.language {
        url.query_pairs_mut().append_pair("language", language);
    }
    if let Some(locale) = &request.locale {
        url.query_pairs_mut().append_pair("locale", locale);
    }

    let body = match call {
        CallBody::Audio(samples) => RequestBody::Audio(samples),
        call => RequestBody::Json(json_body(call, state, request)?),
    };

    Ok(RequestDescriptor { url, api_key: request.api_key.clone(), body })
}

fn json_body(call: CallBody, state: &SessionState, request: &Request) -> Result<Value> {
    let mut body = Map::new();

    // Continuity ids are echoed back unchanged on every call.
    if !state.participant_id.is_empty() {
        body.insert("participant".to_string(), state.participant_id.clone().into());
    }
    if !state.state_id.is_empty() {
        body.insert("state_id".to_string(), state.state_id.clone().into());
    }
    if let Some(offset) = request.time_zone_offset {
        body.insert("time_zone_offset".to_string(), offset.into());
    }

    match call {
        CallBody::Start { project } => {
            body.insert("project".to_string(), project.into());
            body.insert("build_type".to_string(), request.build_type.as_str().into());
            if !state.conversation_id.is_empty() {
                // Resuming a persisted conversation.
                body.insert("conversation".to_string(), state.conversation_id.clone().into());
            }
        }
        CallBody::Text(text) => {
            body.insert("text".to_string(), text.into());
        }
        CallBody::Activity(activity) => {
            body.insert("activity".to_string(), activity.into());
        }
        CallBody::Event { name, parameters } => {
            body.insert("event".to_string(), json!({"name": name, "parameters": parameters}));
        }
        CallBody::GoTo(response_id) => {
            body.insert("goto".to_string(), response_id.into());
        }
        CallBody::TimedResponse => {
            body.insert("check_for_timed_response".to_string(), true.into());
            if !state.last_modified.is_empty() {
                body.insert("last_modified".to_string(), state.last_modified.clone().into());
            }
            if !state.etag.is_empty() {
                body.insert("etag".to_string(), state.etag.clone().into());
            }
            if request.if_modified_action != IfModifiedAction::Nothing {
                body.insert(
                    "if_modified_action".to_string(),
                    request.if_modified_action.as_str().into(),
                );
            }
        }
        CallBody::GetEntities(names) => {
            body.insert("get_entities".to_string(), names.into());
        }
        CallBody::SetEntities(entities) => {
            body.insert("set_entities".to_string(), serde_json::to_value(entities)?);
        }
        // Audio bodies never reach here; `build` short-circuits them.
        CallBody::Audio(_) => {}
    }

    Ok(Value::Object(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pullstring_core::BuildType;

    fn active_state() -> SessionState {
        SessionState {
            conversation_id: "c1".into(),
            participant_id: "p1".into(),
            state_id: "s1".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_api_key_is_a_config_error() {
        let result = build(
            CallBody::Start { project: "demo".into() },
            &SessionState::default(),
            &Request::default(),
            &ApiConfig::default(),
        );
        assert!(matches!(result, Err(PullStringError::Config(_))));
    }

    #[test]
    fn test_call_without_conversation_is_a_sequence_error() {
        let result = build(
            CallBody::Text("hello".into()),
            &SessionState::default(),
            &Request::with_api_key("K"),
            &ApiConfig::default(),
        );
        assert!(matches!(result, Err(PullStringError::Sequence(_))));
    }

    #[test]
    fn test_start_targets_the_conversation_collection() {
        let descriptor = build(
            CallBody::Start { project: "demo".into() },
            &SessionState::default(),
            &Request::with_api_key("K"),
            &ApiConfig::default(),
        )
        .unwrap();
        assert_eq!(descriptor.url.path(), "/v1/conversation");
        assert_eq!(descriptor.api_key, "K");

        let RequestBody::Json(body) = &descriptor.body else {
            panic!("expected a JSON body");
        };
        assert_eq!(body["project"], "demo");
        assert_eq!(body["build_type"], "production");
    }

    #[test]
    fn test_continuity_ids_are_echoed_verbatim() {
        let descriptor = build(
            CallBody::Text("hello".into()),
            &active_state(),
            &Request::with_api_key("K"),
            &ApiConfig::default(),
        )
        .unwrap();
        assert_eq!(descriptor.url.path(), "/v1/conversation/c1");

        let RequestBody::Json(body) = &descriptor.body else {
            panic!("expected a JSON body");
        };
        assert_eq!(body["text"], "hello");
        assert_eq!(body["participant"], "p1");
        assert_eq!(body["state_id"], "s1");
    }

    #[test]
    fn test_sandbox_build_targets_sandbox_host() {
        let mut request = Request::with_api_key("K");
        request.build_type = BuildType::Sandbox;
        request.language = Some("en-US".into());

        let descriptor = build(
            CallBody::Start { project: "demo".into() },
            &SessionState::default(),
            &request,
            &ApiConfig::default(),
        )
        .unwrap();
        assert_eq!(descriptor.url.host_str(), Some("conversation-sandbox.pullstring.com"));
        assert!(descriptor.url.query_pairs().any(|(k, v)| k == "language" && v == "en-US"));
    }

    #[test]
    fn test_timed_response_echoes_cache_tokens() {
        let mut state = active_state();
        state.last_modified = "Tue, 01 Mar 2016 00:00:00 GMT".into();
        state.etag = "tag-7".into();
        let mut request = Request::with_api_key("K");
        request.if_modified_action = IfModifiedAction::Restart;

        let descriptor =
            build(CallBody::TimedResponse, &state, &request, &ApiConfig::default()).unwrap();
        let RequestBody::Json(body) = &descriptor.body else {
            panic!("expected a JSON body");
        };
        assert_eq!(body["check_for_timed_response"], true);
        assert_eq!(body["etag"], "tag-7");
        assert_eq!(body["if_modified_action"], "restart");
    }

    #[test]
    fn test_set_entities_serializes_tagged_values() {
        let entities = vec![
            Entity::Counter { name: "VISITS".into(), value: 2.0 },
            Entity::Flag { name: "RETURNING".into(), value: true },
        ];
        let descriptor = build(
            CallBody::SetEntities(entities),
            &active_state(),
            &Request::with_api_key("K"),
            &ApiConfig::default(),
        )
        .unwrap();
        let RequestBody::Json(body) = &descriptor.body else {
            panic!("expected a JSON body");
        };
        assert_eq!(body["set_entities"][0]["type"], "counter");
        assert_eq!(body["set_entities"][1]["value"], true);
    }

    #[test]
    fn test_audio_body_passes_bytes_through() {
        let descriptor = build(
            CallBody::Audio(vec![1, 2, 3]),
            &active_state(),
            &Request::with_api_key("K"),
            &ApiConfig::default(),
        )
        .unwrap();
        assert_eq!(descriptor.body, RequestBody::Audio(vec![1, 2, 3]));
    }
}
