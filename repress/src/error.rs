//! Per-file error taxonomy for the batch orchestrator.
//!
//! None of these abort a batch: the file is recorded as failed with a
//! human-readable message and processing moves on to the next one.

use libpress_audio::CompressError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    /// The path does not look like an audio file.
    #[error("not a supported audio file type")]
    InvalidFileType,

    /// Input exceeds the per-file byte limit.
    #[error("file is {size} bytes, over the {limit} byte limit")]
    FileTooLarge { size: u64, limit: u64 },

    /// Reading the underlying bytes failed.
    #[error("failed to read file: {0}")]
    Read(#[from] std::io::Error),

    /// The bytes could not be decoded as audio.
    #[error("failed to decode audio: {0}")]
    Decode(String),

    /// The pipeline itself failed (encoder unavailable with no fallback
    /// left, or a block encode/flush producing nothing usable).
    #[error(transparent)]
    Compress(#[from] CompressError),

    /// A single file exceeded the processing deadline. The worker is
    /// abandoned; sibling files are unaffected.
    #[error("processing timed out after {0} seconds")]
    Timeout(u64),

    /// The background worker could not be started or died silently.
    #[error("worker failed: {0}")]
    Worker(String),
}
