//! Canonical 16-bit PCM WAV serialization.

use crate::buffer::PcmBuffer;

/// RIFF/WAVE header length in bytes.
pub const WAV_HEADER_LEN: usize = 44;

/// Serialize a buffer as a 44-byte-header RIFF/WAVE file: PCM format 1,
/// 16 bits per sample, little-endian, frames interleaved channel-major.
///
/// The container is always 16-bit even when the pipeline quantized to
/// 8 bits upstream; the quantization survives as the reduced value grid.
/// Output length is exactly `44 + frames * channels * 2` bytes.
/// Deterministic, with no failure modes for finite input.
pub fn encode_wav(buffer: &PcmBuffer) -> Vec<u8> {
    let channels = buffer.channel_count();
    let frames = buffer.frames();
    let sample_rate = buffer.sample_rate();

    let block_align = channels as u16 * 2;
    let byte_rate = sample_rate * block_align as u32;
    let data_size = frames * channels * 2;
    let total_size = WAV_HEADER_LEN + data_size;

    let mut out = Vec::with_capacity(total_size);

    // RIFF header
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&((total_size - 8) as u32).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt chunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&(channels as u16).to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());

    // data chunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&(data_size as u32).to_le_bytes());

    for frame in 0..frames {
        for ch in 0..channels {
            let value = sample_to_i16(buffer.channel(ch)[frame]);
            out.extend_from_slice(&value.to_le_bytes());
        }
    }

    out
}

/// Float sample to signed 16-bit: the negative side scales by 0x8000, the
/// non-negative side by 0x7FFF, then the result clamps to [-32768, 32767].
pub fn sample_to_i16(sample: f32) -> i16 {
    let scaled = if sample < 0.0 {
        sample * 0x8000 as f32
    } else {
        sample * 0x7FFF as f32
    };
    scaled.clamp(-32768.0, 32767.0) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_mapping_extremes() {
        assert_eq!(sample_to_i16(-1.0), -32768);
        assert_eq!(sample_to_i16(1.0), 32767);
        assert_eq!(sample_to_i16(0.0), 0);
    }

    #[test]
    fn sample_mapping_clamps_out_of_range() {
        assert_eq!(sample_to_i16(-2.0), -32768);
        assert_eq!(sample_to_i16(2.0), 32767);
    }

    #[test]
    fn empty_buffer_is_header_only() {
        let bytes = encode_wav(&PcmBuffer::new(44100, vec![vec![]]));
        assert_eq!(bytes.len(), WAV_HEADER_LEN);
    }
}
