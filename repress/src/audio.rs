//! Symphonia-based decoding into planar PCM.
//!
//! The decoder is an external collaborator: this module turns raw file
//! bytes into a [`PcmBuffer`] and maps every failure onto a
//! distinguishable [`FileError::Decode`].

use std::io::Cursor;
use std::path::Path;

use libpress_audio::PcmBuffer;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::sample::Sample;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::FileError;

/// Extensions the batch accepts; everything else is rejected up front as
/// a non-audio file. Mirrors the formats symphonia is built with.
const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "wave", "flac", "ogg", "oga", "m4a", "mp4", "aac",
];

/// Cheap MIME-style guard, checked before any bytes are read.
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| AUDIO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Decode audio file bytes to a planar PCM buffer.
///
/// The extension, when known, seeds symphonia's format probe. Corrupt or
/// unsupported input comes back as [`FileError::Decode`].
pub fn decode_bytes(bytes: &[u8], extension: Option<&str>) -> Result<PcmBuffer, FileError> {
    let cursor = Cursor::new(bytes.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| FileError::Decode(format!("unsupported audio format: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| FileError::Decode("no audio track found".into()))?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| FileError::Decode("unknown sample rate".into()))?;
    let channel_count = track
        .codec_params
        .channels
        .ok_or_else(|| FileError::Decode("unknown channel count".into()))?
        .count();

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| FileError::Decode(format!("failed to create decoder: {}", e)))?;

    let mut channels: Vec<Vec<f32>> = vec![Vec::new(); channel_count];

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(e) => return Err(FileError::Decode(format!("error reading packet: {}", e))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // Recoverable corruption within a packet: skip and keep going.
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => return Err(FileError::Decode(format!("error decoding packet: {}", e))),
        };

        append_planar(&decoded, &mut channels);
    }

    if channels.iter().all(Vec::is_empty) {
        return Err(FileError::Decode("no decodable audio data".into()));
    }

    Ok(PcmBuffer::new(sample_rate, channels))
}

/// Append one decoded packet's frames to the planar channel vectors,
/// converting to f32 in [-1.0, 1.0].
fn append_planar(buffer: &AudioBufferRef, channels: &mut [Vec<f32>]) {
    match buffer {
        AudioBufferRef::F32(buf) => copy_channels(buf.as_ref(), channels, |s| s),
        AudioBufferRef::S16(buf) => copy_channels(buf.as_ref(), channels, |s| s as f32 / 32768.0),
        AudioBufferRef::S32(buf) => {
            copy_channels(buf.as_ref(), channels, |s| s as f32 / 2147483648.0)
        }
        AudioBufferRef::U8(buf) => {
            copy_channels(buf.as_ref(), channels, |s| (s as f32 - 128.0) / 128.0)
        }
        _ => {
            // Other sample layouts are not produced by the formats we
            // enable; drop them rather than guess.
        }
    }
}

fn copy_channels<S, F>(buffer: &AudioBuffer<S>, channels: &mut [Vec<f32>], convert: F)
where
    S: Sample,
    F: Fn(S) -> f32,
{
    let available = buffer.spec().channels.count();
    for (ch, out) in channels.iter_mut().enumerate().take(available) {
        out.extend(buffer.chan(ch).iter().copied().map(&convert));
    }
}
