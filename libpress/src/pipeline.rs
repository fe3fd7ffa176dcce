//! Per-file compression pipeline: derive targets, resample, encode.
//!
//! This is the single task abstraction both execution paths share: the
//! batch front-end either calls [`compress_buffer`] in-process or ships
//! the same call to a worker thread; the logic is identical in both cases.

use crate::buffer::PcmBuffer;
use crate::encode::{encode_buffer, EncodedAudio, EncoderBackend};
use crate::error::CompressError;
use crate::resample::resample;
use crate::settings::{CompressionSettings, TargetParams};

/// One file's compressed output plus the stream parameters that produced
/// it. Created once per successfully compressed file, immutable after.
#[derive(Debug, Clone)]
pub struct CompressedAudio {
    pub audio: EncodedAudio,
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub channels: usize,
}

/// Compress one decoded buffer.
///
/// The caller owns per-file progress checkpoints 0-25 (read and decode);
/// this function reports from 30 up to exactly 100, non-decreasing:
/// targets at 30, resample/encoder setup through 45, the block loop over
/// 55-85, finalization at 90 and 100.
pub fn compress_buffer(
    source: &PcmBuffer,
    settings: &CompressionSettings,
    backend: EncoderBackend,
    progress: &mut dyn FnMut(u8),
) -> Result<CompressedAudio, CompressError> {
    let target = TargetParams::derive(source.sample_rate(), source.channel_count(), settings);
    progress(30);

    let shrunk = resample(source, target);
    progress(35);

    progress(45);
    let audio = encode_buffer(&shrunk, settings, backend, &mut |fraction| {
        progress(55 + (fraction.clamp(0.0, 1.0) * 30.0) as u8);
    })?;
    progress(90);

    let result = CompressedAudio {
        duration_secs: shrunk.duration_secs(),
        sample_rate: shrunk.sample_rate(),
        channels: shrunk.channel_count(),
        audio,
    };
    progress(100);

    Ok(result)
}
