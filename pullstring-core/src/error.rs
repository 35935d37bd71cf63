#[derive(Debug, thiserror::Error)]
pub enum PullStringError {
    /// Missing or invalid client configuration, such as an empty API key.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An operation was attempted in the wrong session state, such as
    /// sending text before `start` or finishing an idle audio buffer.
    #[error("Sequence error: {0}")]
    Sequence(String),

    /// A network-level failure reported by the transport. Not retried at
    /// this layer.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A response payload that cannot be interpreted at all. Unknown
    /// output or entity types within an otherwise valid payload are not
    /// decode errors; they are skipped.
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PullStringError>;
