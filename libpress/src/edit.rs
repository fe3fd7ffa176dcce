//! PCM editing utilities: trim, peak-normalize, fades.
//!
//! Each operation reads its input and returns a fresh buffer.

use crate::buffer::PcmBuffer;

/// Cut the buffer down to `[start_secs, end_secs)`. Bounds are clamped to
/// the buffer; a reversed or empty range yields an empty buffer.
pub fn trim(buffer: &PcmBuffer, start_secs: f64, end_secs: f64) -> PcmBuffer {
    let rate = buffer.sample_rate();
    let frames = buffer.frames();
    let start = ((start_secs.max(0.0) * rate as f64) as usize).min(frames);
    let end = ((end_secs.max(0.0) * rate as f64) as usize).clamp(start, frames);

    let channels = buffer
        .channels()
        .iter()
        .map(|data| data[start..end].to_vec())
        .collect();
    PcmBuffer::new(rate, channels)
}

/// Scale every channel so the loudest sample peaks at 0.99. Silence comes
/// back unchanged.
pub fn normalize(buffer: &PcmBuffer) -> PcmBuffer {
    let peak = buffer
        .channels()
        .iter()
        .flat_map(|data| data.iter())
        .fold(0.0f32, |acc, &s| acc.max(s.abs()));

    if peak == 0.0 {
        return buffer.clone();
    }

    let scale = 0.99 / peak;
    let channels = buffer
        .channels()
        .iter()
        .map(|data| data.iter().map(|&s| s * scale).collect())
        .collect();
    PcmBuffer::new(buffer.sample_rate(), channels)
}

/// Ramp the first `secs` seconds linearly up from silence.
pub fn fade_in(buffer: &PcmBuffer, secs: f64) -> PcmBuffer {
    let fade_frames = fade_frame_count(buffer, secs);
    let channels = buffer
        .channels()
        .iter()
        .map(|data| {
            data.iter()
                .enumerate()
                .map(|(i, &s)| {
                    if i < fade_frames {
                        s * (i as f32 / fade_frames as f32)
                    } else {
                        s
                    }
                })
                .collect()
        })
        .collect();
    PcmBuffer::new(buffer.sample_rate(), channels)
}

/// Ramp the last `secs` seconds linearly down to silence.
pub fn fade_out(buffer: &PcmBuffer, secs: f64) -> PcmBuffer {
    let fade_frames = fade_frame_count(buffer, secs);
    let channels = buffer
        .channels()
        .iter()
        .map(|data| {
            let len = data.len();
            data.iter()
                .enumerate()
                .map(|(i, &s)| {
                    if i + fade_frames > len {
                        s * ((len - i) as f32 / fade_frames as f32)
                    } else {
                        s
                    }
                })
                .collect()
        })
        .collect();
    PcmBuffer::new(buffer.sample_rate(), channels)
}

fn fade_frame_count(buffer: &PcmBuffer, secs: f64) -> usize {
    ((secs.max(0.0) * buffer.sample_rate() as f64) as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(frames: usize) -> PcmBuffer {
        PcmBuffer::new(
            1000,
            vec![(0..frames).map(|i| i as f32 / frames as f32).collect()],
        )
    }

    #[test]
    fn trim_keeps_the_requested_window() {
        let out = trim(&ramp(1000), 0.25, 0.75);
        assert_eq!(out.frames(), 500);
        assert!((out.channel(0)[0] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn trim_clamps_out_of_range_bounds() {
        let out = trim(&ramp(1000), -5.0, 99.0);
        assert_eq!(out.frames(), 1000);
        assert!(trim(&ramp(1000), 0.8, 0.2).is_empty());
    }

    #[test]
    fn normalize_peaks_at_0_99() {
        let buffer = PcmBuffer::new(1000, vec![vec![0.1, -0.5, 0.25]]);
        let out = normalize(&buffer);
        let peak = out.channel(0).iter().fold(0.0f32, |a, &s| a.max(s.abs()));
        assert!((peak - 0.99).abs() < 1e-6);
    }

    #[test]
    fn normalize_leaves_silence_alone() {
        let silence = PcmBuffer::new(1000, vec![vec![0.0; 100]]);
        assert_eq!(normalize(&silence), silence);
    }

    #[test]
    fn fade_in_starts_from_silence() {
        let buffer = PcmBuffer::new(1000, vec![vec![1.0; 1000]]);
        let out = fade_in(&buffer, 0.5);
        assert_eq!(out.channel(0)[0], 0.0);
        assert!(out.channel(0)[250] < 1.0);
        assert_eq!(out.channel(0)[999], 1.0);
    }

    #[test]
    fn fade_out_ends_near_silence() {
        let buffer = PcmBuffer::new(1000, vec![vec![1.0; 1000]]);
        let out = fade_out(&buffer, 0.5);
        assert_eq!(out.channel(0)[0], 1.0);
        assert!(out.channel(0)[999] < 0.01);
    }
}
