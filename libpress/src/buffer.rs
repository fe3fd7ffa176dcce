//! Decoded PCM buffers.

/// Decoded PCM audio: one `Vec<f32>` per channel, samples in [-1.0, 1.0].
///
/// The pipeline treats buffers as immutable; every transformation
/// allocates a fresh buffer instead of mutating its input. Channels are
/// expected to share a length; [`PcmBuffer::frames`] reports the shortest
/// channel so frame-indexed access is always in bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl PcmBuffer {
    /// Build a buffer from planar channel data.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// Build a buffer from interleaved samples (frame-major,
    /// channel-interleaved). Trailing samples that do not fill a whole
    /// frame are dropped.
    pub fn from_interleaved(sample_rate: u32, channel_count: usize, samples: &[f32]) -> Self {
        if channel_count == 0 {
            return Self::new(sample_rate, vec![]);
        }
        let frames = samples.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in 0..frames {
            for (ch, data) in channels.iter_mut().enumerate() {
                data.push(samples[frame * channel_count + ch]);
            }
        }
        Self::new(sample_rate, channels)
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// One channel's samples.
    ///
    /// # Panics
    /// Panics if `index >= channel_count()`.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// All channels, planar.
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Consume the buffer, yielding its planar channel data.
    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }

    /// Frame count (samples per channel); the shortest channel wins.
    pub fn frames(&self) -> usize {
        self.channels.iter().map(Vec::len).min().unwrap_or(0)
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    /// True when the buffer holds no frames at all.
    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interleaved_round_trip() {
        let buf = PcmBuffer::from_interleaved(44100, 2, &[0.1, -0.1, 0.2, -0.2, 0.3, -0.3]);
        assert_eq!(buf.channel_count(), 2);
        assert_eq!(buf.frames(), 3);
        assert_eq!(buf.channel(0), &[0.1, 0.2, 0.3]);
        assert_eq!(buf.channel(1), &[-0.1, -0.2, -0.3]);
    }

    #[test]
    fn partial_trailing_frame_is_dropped() {
        let buf = PcmBuffer::from_interleaved(8000, 2, &[0.5, 0.5, 0.5]);
        assert_eq!(buf.frames(), 1);
    }

    #[test]
    fn empty_buffer() {
        let buf = PcmBuffer::new(44100, vec![]);
        assert!(buf.is_empty());
        assert_eq!(buf.frames(), 0);
        assert_eq!(buf.duration_secs(), 0.0);
    }

    #[test]
    fn duration_is_frames_over_rate() {
        let buf = PcmBuffer::new(16000, vec![vec![0.0; 8000]]);
        assert!((buf.duration_secs() - 0.5).abs() < 1e-9);
    }
}
