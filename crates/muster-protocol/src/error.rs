//! Protocol error types

use thiserror::Error;

/// Errors produced while encoding or decoding protocol envelopes
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Frame was not a well-formed envelope
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
