//! # pullstring-core
//!
//! Models and session-continuity logic for the PullString Web API,
//! shared by the client crate. This crate performs no I/O.
//!
//! - **`request`** - Per-call parameters: API key, build type, locale,
//!   audio format, if-modified policy
//! - **`response`** - Typed outputs and entities plus tolerant decoding
//! - **`state`** - Server-issued continuity identifiers and how responses
//!   fold into them
//! - **`audio`** - Audio accumulation between start/end signals and WAV
//!   container validation
//! - **`error`** - The crate error type

pub mod audio;
pub mod error;
pub mod request;
pub mod response;
pub mod state;

pub use audio::AudioAccumulator;
pub use error::{PullStringError, Result};
pub use request::{AudioFormat, BuildType, IfModifiedAction, Request};
pub use response::{Entity, Output, Phoneme, Response, Status};
pub use state::SessionState;

/// The version number for this library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
