//! Per-session continuity state.

use crate::response::Response;

/// Server-issued identifiers that must be echoed back to keep a
/// conversation coherent across turns.
///
/// Created empty when a conversation is constructed and mutated
/// exclusively through [`SessionState::apply_response`] after a successful
/// decode. The orchestrator serializes access; this type does no locking
/// of its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub conversation_id: String,
    pub participant_id: String,
    pub state_id: String,
    pub last_modified: String,
    pub etag: String,
    /// `Some(secs)` with `secs >= 0` means a timed response is pending and
    /// the caller should poll after that many seconds.
    pub timed_response_interval: Option<f64>,
}

impl SessionState {
    /// Clear all continuity fields. Called when a new conversation starts.
    pub fn reset(&mut self) {
        *self = SessionState::default();
    }

    /// Fold a decoded response into the session.
    ///
    /// The server is authoritative: every field present in the response
    /// overwrites the stored value. Fields absent from the response are
    /// left unchanged, since not every call kind returns every field.
    /// A failure-status response applies as a no-op.
    pub fn apply_response(&mut self, response: &Response) {
        if !response.status.success {
            return;
        }
        if let Some(id) = &response.conversation_id {
            self.conversation_id = id.clone();
        }
        if let Some(id) = &response.participant_id {
            self.participant_id = id.clone();
        }
        if let Some(id) = &response.state_id {
            self.state_id = id.clone();
        }
        if let Some(modified) = &response.last_modified {
            self.last_modified = modified.clone();
        }
        if let Some(etag) = &response.etag {
            self.etag = etag.clone();
        }
        if let Some(interval) = response.timed_response_interval {
            self.timed_response_interval = Some(interval);
        }
    }
}
