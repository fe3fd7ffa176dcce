//! Error taxonomy for the compression core.
//!
//! Decode- and I/O-level failures live with the front-end that owns those
//! steps; this crate only reports what its own stages can break.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressError {
    /// The external MP3 encoder is missing or refused to initialize.
    /// Front-ends fall back to WAV output instead of treating this as
    /// fatal.
    #[error("MP3 encoder unavailable: {0}")]
    EncoderUnavailable(String),

    /// A block encode or flush produced no usable output.
    #[error("encoding failed: {0}")]
    Encoding(String),
}
