//! Encoder adapter: backend resolution and block feeding.
//!
//! The external MP3 encoder may be entirely absent (built without the
//! `mp3` feature, or LAME refusing to initialize). That is resolved ONCE
//! per batch into an [`EncoderBackend`]; per file, the adapter feeds the
//! chosen encoder fixed blocks of 1152 samples per channel and
//! concatenates the returned fragments.

use crate::buffer::PcmBuffer;
use crate::error::CompressError;
use crate::settings::{CompressionSettings, OutputFormat};
use crate::wav::encode_wav;
#[cfg(feature = "mp3")]
use crate::wav::sample_to_i16;
#[cfg(feature = "mp3")]
use crate::ENCODE_BLOCK_FRAMES;

/// Which encoder a batch will actually use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderBackend {
    Mp3,
    Wav,
}

impl EncoderBackend {
    /// Pick the backend for a whole batch.
    ///
    /// A `wav` format request, a build without the `mp3` feature, or a
    /// LAME that fails its init probe all resolve to the WAV fallback.
    /// `aac` has no encoder of its own and follows the active path.
    pub fn resolve(settings: &CompressionSettings) -> Self {
        match settings.format {
            OutputFormat::Wav => EncoderBackend::Wav,
            OutputFormat::Mp3 | OutputFormat::Aac => {
                #[cfg(feature = "mp3")]
                let backend = match crate::mp3::probe() {
                    Ok(()) => EncoderBackend::Mp3,
                    Err(_) => EncoderBackend::Wav,
                };
                #[cfg(not(feature = "mp3"))]
                let backend = EncoderBackend::Wav;
                backend
            }
        }
    }

    /// File extension for outputs produced by this backend.
    pub fn extension(self) -> &'static str {
        match self {
            EncoderBackend::Mp3 => "mp3",
            EncoderBackend::Wav => "wav",
        }
    }

    /// MIME type for outputs produced by this backend.
    pub fn mime(self) -> &'static str {
        match self {
            EncoderBackend::Mp3 => "audio/mp3",
            EncoderBackend::Wav => "audio/wav",
        }
    }
}

/// Encoded output with its authoritative MIME type. Callers must key off
/// `mime`/`extension` rather than assume the format they asked for.
#[derive(Debug, Clone)]
pub struct EncodedAudio {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub extension: &'static str,
}

/// Run the backend over a prepared (already resampled) buffer.
///
/// `on_block` receives the fraction of blocks consumed after each encode
/// call, so the pipeline can map it onto its progress span.
pub fn encode_buffer(
    buffer: &PcmBuffer,
    settings: &CompressionSettings,
    backend: EncoderBackend,
    on_block: &mut dyn FnMut(f32),
) -> Result<EncodedAudio, CompressError> {
    match backend {
        EncoderBackend::Wav => {
            let bytes = encode_wav(buffer);
            on_block(1.0);
            Ok(EncodedAudio {
                bytes,
                mime: backend.mime(),
                extension: backend.extension(),
            })
        }
        EncoderBackend::Mp3 => encode_mp3(buffer, settings, on_block),
    }
}

#[cfg(feature = "mp3")]
fn encode_mp3(
    buffer: &PcmBuffer,
    settings: &CompressionSettings,
    on_block: &mut dyn FnMut(f32),
) -> Result<EncodedAudio, CompressError> {
    let channels = buffer.channel_count().clamp(1, 2);
    let mut encoder = crate::mp3::Mp3Encoder::new(
        channels,
        buffer.sample_rate(),
        settings.bit_rate,
        settings.quality,
    )?;

    let frames = buffer.frames();
    let left = pcm_i16(buffer, 0, frames);
    let right = if channels > 1 {
        pcm_i16(buffer, 1, frames)
    } else {
        Vec::new()
    };

    let total_blocks = frames.div_ceil(ENCODE_BLOCK_FRAMES).max(1);
    let mut bytes = Vec::new();
    let mut block = 0usize;
    let mut start = 0usize;
    while start < frames {
        let end = (start + ENCODE_BLOCK_FRAMES).min(frames);
        let l = &left[start..end];
        let r = if channels > 1 { &right[start..end] } else { l };

        let fragment = encoder.encode_block(l, r)?;
        if !fragment.is_empty() {
            bytes.extend_from_slice(&fragment);
        }

        block += 1;
        on_block(block as f32 / total_blocks as f32);
        start = end;
    }

    let tail = encoder.flush()?;
    if !tail.is_empty() {
        bytes.extend_from_slice(&tail);
    }
    on_block(1.0);

    if bytes.is_empty() && frames > 0 {
        return Err(CompressError::Encoding(
            "encoder produced no output".into(),
        ));
    }

    Ok(EncodedAudio {
        bytes,
        mime: EncoderBackend::Mp3.mime(),
        extension: EncoderBackend::Mp3.extension(),
    })
}

#[cfg(not(feature = "mp3"))]
fn encode_mp3(
    _buffer: &PcmBuffer,
    _settings: &CompressionSettings,
    _on_block: &mut dyn FnMut(f32),
) -> Result<EncodedAudio, CompressError> {
    Err(CompressError::EncoderUnavailable(
        "built without the mp3 feature".into(),
    ))
}

#[cfg(feature = "mp3")]
fn pcm_i16(buffer: &PcmBuffer, channel: usize, frames: usize) -> Vec<i16> {
    let channel = channel.min(buffer.channel_count().saturating_sub(1));
    if buffer.channel_count() == 0 {
        return Vec::new();
    }
    buffer.channel(channel)[..frames]
        .iter()
        .map(|&s| sample_to_i16(s))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_settings() -> CompressionSettings {
        CompressionSettings {
            format: OutputFormat::Wav,
            ..Default::default()
        }
    }

    #[test]
    fn wav_format_resolves_to_wav_backend() {
        assert_eq!(
            EncoderBackend::resolve(&wav_settings()),
            EncoderBackend::Wav
        );
    }

    #[cfg(feature = "mp3")]
    #[test]
    fn mp3_format_resolves_to_mp3_backend() {
        assert_eq!(
            EncoderBackend::resolve(&CompressionSettings::default()),
            EncoderBackend::Mp3
        );
    }

    #[cfg(feature = "mp3")]
    #[test]
    fn aac_falls_through_to_the_active_path() {
        let settings = CompressionSettings {
            format: OutputFormat::Aac,
            ..Default::default()
        };
        assert_eq!(EncoderBackend::resolve(&settings), EncoderBackend::Mp3);
    }

    #[test]
    fn wav_backend_reports_wav_mime() {
        let buffer = PcmBuffer::new(8000, vec![vec![0.1; 800]]);
        let out = encode_buffer(&buffer, &wav_settings(), EncoderBackend::Wav, &mut |_| {})
            .unwrap();
        assert_eq!(out.mime, "audio/wav");
        assert_eq!(out.extension, "wav");
        assert_eq!(out.bytes.len(), 44 + 800 * 2);
    }

    #[cfg(feature = "mp3")]
    #[test]
    fn mp3_backend_produces_bytes_and_reports_blocks() {
        let buffer = PcmBuffer::new(
            44100,
            vec![(0..44100).map(|i| (i as f32 * 0.02).sin() * 0.4).collect()],
        );
        let mut fractions = Vec::new();
        let out = encode_buffer(
            &buffer,
            &CompressionSettings::default(),
            EncoderBackend::Mp3,
            &mut |f| fractions.push(f),
        )
        .unwrap();
        assert_eq!(out.mime, "audio/mp3");
        assert!(!out.bytes.is_empty());
        assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*fractions.last().unwrap(), 1.0);
    }
}
