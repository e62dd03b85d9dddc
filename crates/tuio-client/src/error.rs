//! Client error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport could not be bound or connected
    #[error("setup failed: {0}")]
    Setup(String),

    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("core error: {0}")]
    Core(#[from] tuio_core::Error),

    /// Alive messages are generated from the session registry
    #[error("alive messages cannot be appended")]
    AliveRejected,

    #[error("adaptor failed: {0}")]
    Adaptor(String),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}
