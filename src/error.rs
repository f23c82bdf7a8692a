//! Caller-visible error types

use thiserror::Error;

/// Errors surfaced by [`crate::Context::decode_calldata`].
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("not enough data: calldata must contain a 4-byte selector")]
    NotEnoughData,

    #[error("invalid hex in calldata: {0}")]
    InvalidHex(String),

    #[error("signature directory unavailable: {0}")]
    DirectoryUnavailable(#[from] DirectoryError),

    #[error("unable to decode data for selector 0x{selector}")]
    UndecodableData { selector: String },
}

/// Failures talking to the public signature directory.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    #[error("directory returned HTTP {status}: {body}")]
    Rejected {
        status: u16,
        body: serde_json::Value,
    },

    #[error("directory returned HTTP {status}")]
    Status { status: u16 },

    #[error("directory request failed: {0}")]
    Transport(String),

    #[error("malformed directory response: {0}")]
    Malformed(String),
}

/// Errors surfaced by asset reconciliation.
///
/// Persisted and in-memory registries are left untouched whenever one of
/// these is returned.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("reconciliation abandoned: {0}")]
    Abandoned(String),

    #[error("asset store error: {0:#}")]
    Store(#[from] anyhow::Error),
}
