//! libpress-audio - core pipeline for the press™ batch audio compressor
//!
//! Decoded PCM goes in, compressed bytes come out. The pipeline is
//! decode-agnostic: a front-end hands it a [`PcmBuffer`] plus a
//! [`CompressionSettings`] value and gets back an [`EncodedAudio`] blob
//! ready to write to disk or pack into an archive.
//!
//! The stages, in order:
//!
//! 1. [`TargetParams::derive`] maps the named compression mode onto
//!    concrete resample targets,
//! 2. [`resample`] produces a new buffer at the target sample rate,
//!    channel count and bit depth,
//! 3. the encoder adapter ([`encode::encode_buffer`]) turns that buffer
//!    into MP3 via the external LAME binding, or into uncompressed WAV
//!    when LAME is unavailable.
//!
//! The MP3 bitstream is opaque to this crate; callers must treat
//! [`EncodedAudio::mime`] as authoritative rather than assume MP3 came out.

pub mod buffer;
pub mod edit;
pub mod encode;
pub mod error;
#[cfg(feature = "mp3")]
pub mod mp3;
pub mod pipeline;
pub mod resample;
pub mod settings;
pub mod wav;

pub use buffer::PcmBuffer;
pub use encode::{encode_buffer, EncodedAudio, EncoderBackend};
pub use error::CompressError;
pub use pipeline::{compress_buffer, CompressedAudio};
pub use resample::resample;
pub use settings::{CompressionMode, CompressionSettings, OutputFormat, TargetParams};
pub use wav::{encode_wav, sample_to_i16, WAV_HEADER_LEN};

/// Samples per channel handed to the block encoder per call, matching
/// standard MP3 frame granularity.
pub const ENCODE_BLOCK_FRAMES: usize = 1152;

/// Library version string.
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
