//! Boundary errors — configuration and replay I/O.
//!
//! Internal tracker logic never returns `Result`: accept/combine/compare and
//! the CPR gating outcomes are expected, statistics-tracked results, not
//! errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed message record: {0}")]
    BadRecord(String),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
