//! Nearest-neighbor resampling and bit-depth reduction.
//!
//! This is deliberately the cheap path: no interpolation, no dither, no
//! anti-alias filter. The audible artifacts are the size/quality tradeoff
//! the compression modes ask for.

use crate::buffer::PcmBuffer;
use crate::settings::TargetParams;

/// Resample `source` to the target rate, channel count and bit depth,
/// producing a new buffer.
///
/// Output frame count is `floor(duration * target_rate)`. Each output
/// frame `i` reads source frame `floor(i * source_rate / target_rate)`,
/// or silence when that index is out of range. Channels beyond the source
/// count repeat the last source channel (nearest-channel selection, not a
/// true downmix). Samples are snapped to the target bit-depth grid and
/// clamped to [-1.0, 1.0].
///
/// Zero-length input produces zero-length output; the function cannot fail.
pub fn resample(source: &PcmBuffer, target: TargetParams) -> PcmBuffer {
    let source_rate = source.sample_rate();
    let out_frames = if source_rate == 0 || target.sample_rate == 0 {
        0
    } else {
        (source.frames() as f64 / source_rate as f64 * target.sample_rate as f64).floor() as usize
    };

    let mut channels = Vec::with_capacity(target.channels);
    for ch in 0..target.channels {
        let input: &[f32] = if source.channel_count() == 0 {
            &[]
        } else {
            source.channel(ch.min(source.channel_count() - 1))
        };

        let mut output = Vec::with_capacity(out_frames);
        for i in 0..out_frames {
            let source_index =
                (i as u64 * source_rate as u64 / target.sample_rate as u64) as usize;
            let sample = input.get(source_index).copied().unwrap_or(0.0);
            output.push(quantize(sample, target.bit_depth));
        }
        channels.push(output);
    }

    PcmBuffer::new(target.sample_rate, channels)
}

/// Snap a sample to an 8- or 16-bit value grid, then clamp to [-1.0, 1.0].
fn quantize(sample: f32, bit_depth: u8) -> f32 {
    let snapped = if bit_depth == 8 {
        (sample * 127.0).round() / 127.0
    } else {
        (sample * 32767.0).round() / 32767.0
    };
    snapped.clamp(-1.0, 1.0)
}
