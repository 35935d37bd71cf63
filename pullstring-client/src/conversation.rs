//! The conversation orchestrator: public operations, session continuity,
//! and audio accumulation.

use crate::builder::{self, CallBody};
use crate::config::ApiConfig;
use crate::transport::{HttpTransport, RequestDescriptor, Transport};
use pullstring_core::{
    AudioAccumulator, AudioFormat, Entity, PullStringError, Request, Response, Result,
    SessionState, audio::wav,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

/// A conversation thread against the PullString Web API.
///
/// Call [`Conversation::start`] with a project name and a request carrying
/// your API key; the key is remembered for the rest of the session. Every
/// subsequent operation requires the active conversation established by
/// `start` and fails fast with a `Sequence` error otherwise.
///
/// All operations are async and resolve exactly once. Two of them may
/// legitimately resolve with no response at all — invalid audio input and
/// polling when no timed response is pending — and surface that as
/// `Ok(None)` rather than an error.
///
/// Session state is updated from each successful response before the
/// response is returned, so a caller never observes a response whose
/// identifiers have not yet been folded into the session. Mutation is
/// serialized behind a mutex; the audio buffer is likewise a single-writer
/// resource owned by this conversation.
pub struct Conversation {
    transport: Arc<dyn Transport>,
    config: ApiConfig,
    state: Mutex<SessionState>,
    audio: Mutex<AudioAccumulator>,
    api_key: std::sync::Mutex<String>,
}

impl Conversation {
    /// A conversation over HTTPS against the standard deployments.
    pub fn new() -> Self {
        Self::with_transport(Arc::new(HttpTransport::new()))
    }

    /// A conversation over a caller-supplied transport.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            config: ApiConfig::default(),
            state: Mutex::new(SessionState::default()),
            audio: Mutex::new(AudioAccumulator::new()),
            api_key: std::sync::Mutex::new(String::new()),
        }
    }

    /// Override the deployment configuration, e.g. to point at a local
    /// server.
    pub fn with_config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    /// Start a new conversation with the Web API.
    ///
    /// Any previous session is reset first. The request must carry a valid
    /// API key; to resume a persisted session, also supply the
    /// `conversation_id`/`state_id` saved from an earlier process.
    pub async fn start(&self, project: &str, request: &Request) -> Result<Response> {
        if request.api_key.is_empty() {
            return Err(PullStringError::Config("api key is required".to_string()));
        }
        *self.api_key.lock().unwrap() = request.api_key.clone();

        let descriptor = {
            let mut state = self.state.lock().await;
            state.reset();
            if !request.conversation_id.is_empty() {
                state.conversation_id = request.conversation_id.clone();
            }
            if !request.participant_id.is_empty() {
                state.participant_id = request.participant_id.clone();
            }
            if !request.state_id.is_empty() {
                state.state_id = request.state_id.clone();
            }
            builder::build(
                CallBody::Start { project: project.to_string() },
                &state,
                request,
                &self.config,
            )?
        };

        tracing::debug!(project, "starting conversation");
        self.dispatch(descriptor).await
    }

    /// Send user input text to the Web API.
    pub async fn send_text(&self, text: &str, request: &Request) -> Result<Response> {
        let descriptor = self.descriptor(CallBody::Text(text.to_string()), request).await?;
        self.dispatch(descriptor).await
    }

    /// Send an activity name or ID to the Web API.
    pub async fn send_activity(&self, activity: &str, request: &Request) -> Result<Response> {
        let descriptor = self.descriptor(CallBody::Activity(activity.to_string()), request).await?;
        self.dispatch(descriptor).await
    }

    /// Send a named event with its parameters to the Web API.
    pub async fn send_event(
        &self,
        event: &str,
        parameters: Map<String, Value>,
        request: &Request,
    ) -> Result<Response> {
        let call = CallBody::Event { name: event.to_string(), parameters };
        let descriptor = self.descriptor(call, request).await?;
        self.dispatch(descriptor).await
    }

    /// Jump the conversation directly to the response with the given GUID.
    pub async fn go_to(&self, response_id: &str, request: &Request) -> Result<Response> {
        let descriptor = self.descriptor(CallBody::GoTo(response_id.to_string()), request).await?;
        self.dispatch(descriptor).await
    }

    /// Send a complete audio sample of the user speaking.
    ///
    /// Raw input must be mono 16-bit little-endian PCM at 16 kHz; WAV
    /// input must be a container wrapping the same format and is unwrapped
    /// locally. Invalid audio resolves to `Ok(None)` without a network
    /// call; it is a "no result", not an error status.
    pub async fn send_audio(
        &self,
        audio: &[u8],
        format: AudioFormat,
        request: &Request,
    ) -> Result<Option<Response>> {
        let samples = match format {
            AudioFormat::RawPcm16k => audio.to_vec(),
            AudioFormat::Wav16k => match wav::pcm_payload(audio) {
                Some(samples) => samples.to_vec(),
                None => {
                    tracing::warn!("rejecting audio that is not 16-bit mono 16 kHz PCM WAV");
                    return Ok(None);
                }
            },
        };
        let descriptor = self.descriptor(CallBody::Audio(samples), request).await?;
        self.dispatch_optional(descriptor).await
    }

    /// Begin a progressive audio input, where supported.
    ///
    /// Chunked streaming is not currently implemented, so this batches all
    /// audio and sends it in one request when [`Conversation::end_audio`]
    /// is called. Starting again discards any unflushed audio.
    pub async fn start_audio(&self) {
        self.audio.lock().await.start();
    }

    /// Add a chunk of mono 16-bit 16 kHz PCM audio. You must call
    /// [`Conversation::start_audio`] first.
    pub async fn add_audio(&self, chunk: &[u8]) -> Result<()> {
        self.audio.lock().await.append(chunk)
    }

    /// Signal that all audio has been provided and flush the accumulated
    /// buffer as a single raw-PCM upload. The buffer is cleared whether or
    /// not the upload succeeds.
    pub async fn end_audio(&self, request: &Request) -> Result<Option<Response>> {
        let samples = self.audio.lock().await.finish()?;
        self.send_audio(&samples, AudioFormat::RawPcm16k, request).await
    }

    /// Ask the Web API whether a time-based response is ready.
    ///
    /// Only useful after a response reported a non-negative
    /// `timed_response_interval`; set a timer for that many seconds and
    /// then call this. Resolves to `Ok(None)` when nothing is pending.
    pub async fn check_for_timed_response(&self, request: &Request) -> Result<Option<Response>> {
        let descriptor = self.descriptor(CallBody::TimedResponse, request).await?;
        self.dispatch_optional(descriptor).await
    }

    /// Request the current value of the named entities.
    pub async fn get_entities(&self, names: &[String], request: &Request) -> Result<Response> {
        let descriptor = self.descriptor(CallBody::GetEntities(names.to_vec()), request).await?;
        self.dispatch(descriptor).await
    }

    /// Change the value of the given entities.
    pub async fn set_entities(&self, entities: &[Entity], request: &Request) -> Result<Response> {
        let descriptor = self.descriptor(CallBody::SetEntities(entities.to_vec()), request).await?;
        self.dispatch(descriptor).await
    }

    /// The current conversation ID, for callers to persist across process
    /// restarts and feed back into a later `start`.
    pub async fn conversation_id(&self) -> String {
        self.state.lock().await.conversation_id.clone()
    }

    /// The current state ID, for callers to persist across process
    /// restarts and feed back into a later `start`.
    pub async fn state_id(&self) -> String {
        self.state.lock().await.state_id.clone()
    }

    /// The interval reported by the most recent response, if any.
    pub async fn timed_response_interval(&self) -> Option<f64> {
        self.state.lock().await.timed_response_interval
    }

    /// Clone the request and fill in the remembered API key when the
    /// caller left it empty.
    fn effective_request(&self, request: &Request) -> Request {
        let mut request = request.clone();
        if request.api_key.is_empty() {
            request.api_key = self.api_key.lock().unwrap().clone();
        }
        request
    }

    async fn descriptor(&self, call: CallBody, request: &Request) -> Result<RequestDescriptor> {
        let request = self.effective_request(request);
        let state = self.state.lock().await;
        builder::build(call, &state, &request, &self.config)
    }

    async fn dispatch(&self, descriptor: RequestDescriptor) -> Result<Response> {
        let bytes = self.transport.send(&descriptor).await?;
        let response = Response::decode(&bytes)?;
        self.apply(&response).await;
        Ok(response)
    }

    async fn dispatch_optional(&self, descriptor: RequestDescriptor) -> Result<Option<Response>> {
        let bytes = self.transport.send(&descriptor).await?;
        let response = Response::decode_optional(&bytes)?;
        if let Some(response) = &response {
            self.apply(response).await;
        }
        Ok(response)
    }

    /// Fold a decoded response into the session before the caller sees it.
    /// The state mutex keeps concurrent completions from interleaving
    /// partial writes; each apply is atomic in callback-arrival order.
    async fn apply(&self, response: &Response) {
        let mut state = self.state.lock().await;
        state.apply_response(response);
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
