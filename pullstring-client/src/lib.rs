//! # pullstring-client
//!
//! Async client for the PullString conversation Web API.
//!
//! To initiate a conversation, call [`Conversation::start`] with your
//! PullString project name and a [`Request`] carrying your API key. The
//! key is remembered for subsequent requests on the same conversation.
//! Responses contain zero or more outputs — lines of dialog or app-side
//! behaviors — plus named entities and the status of the call.
//!
//! ```no_run
//! use pullstring_client::Conversation;
//! use pullstring_core::{Output, Request};
//!
//! # async fn run() -> pullstring_core::Result<()> {
//! let conversation = Conversation::new();
//! let request = Request::with_api_key("YOUR_API_KEY");
//!
//! let response = conversation.start("your-project", &request).await?;
//! for output in &response.outputs {
//!     if let Output::Dialog { text, .. } = output {
//!         println!("{text}");
//!     }
//! }
//!
//! let response = conversation.send_text("hello", &Request::default()).await?;
//! # let _ = response;
//! # Ok(())
//! # }
//! ```

mod builder;
pub mod config;
pub mod conversation;
pub mod transport;

pub use config::{ApiConfig, Feature};
pub use conversation::Conversation;
pub use transport::{HttpTransport, RequestBody, RequestDescriptor, Transport};

// Re-export the model crate so callers need only one dependency.
pub use pullstring_core::{
    AudioAccumulator, AudioFormat, BuildType, Entity, IfModifiedAction, Output, Phoneme,
    PullStringError, Request, Response, Result, SessionState, Status,
};
