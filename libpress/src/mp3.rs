//! Thin wrapper over the LAME binding.
//!
//! The bitstream is entirely LAME's business; this module only feeds it
//! int16 blocks and collects whatever comes back. Mono streams feed one
//! array per call, stereo streams feed the left and right halves as
//! separate arrays per LAME's planar API.

use std::mem::MaybeUninit;

use mp3lame_encoder::{Bitrate, Builder, DualPcm, Encoder, FlushNoGap, MonoPcm, Quality};

use crate::error::CompressError;

pub struct Mp3Encoder {
    encoder: Encoder,
    channels: usize,
}

impl Mp3Encoder {
    /// Construct a LAME encoder for the given stream parameters.
    pub fn new(
        channels: usize,
        sample_rate: u32,
        bit_rate_kbps: u32,
        quality: f32,
    ) -> Result<Self, CompressError> {
        let mut builder = Builder::new().ok_or_else(|| {
            CompressError::EncoderUnavailable("lame_init returned null".into())
        })?;

        builder
            .set_num_channels(channels.clamp(1, 2) as u8)
            .map_err(init_err)?;
        builder.set_sample_rate(sample_rate).map_err(init_err)?;
        builder
            .set_brate(map_bitrate(bit_rate_kbps))
            .map_err(init_err)?;
        builder.set_quality(map_quality(quality)).map_err(init_err)?;

        let encoder = builder.build().map_err(init_err)?;

        Ok(Self {
            encoder,
            channels: channels.clamp(1, 2),
        })
    }

    /// Encode one block of int16 PCM, returning zero or more MP3 bytes.
    /// For mono streams `right` is ignored.
    pub fn encode_block(&mut self, left: &[i16], right: &[i16]) -> Result<Vec<u8>, CompressError> {
        let mut out: Vec<MaybeUninit<u8>> =
            vec![MaybeUninit::uninit(); mp3lame_encoder::max_required_buffer_size(left.len())];

        let written = if self.channels > 1 {
            self.encoder.encode(DualPcm { left, right }, &mut out)
        } else {
            self.encoder.encode(MonoPcm(left), &mut out)
        }
        .map_err(|e| CompressError::Encoding(format!("{:?}", e)))?;

        Ok(take_init(&out[..written]))
    }

    /// Drain LAME's internal buffers, returning the trailing bytes.
    pub fn flush(&mut self) -> Result<Vec<u8>, CompressError> {
        let mut out: Vec<MaybeUninit<u8>> = vec![MaybeUninit::uninit(); 7200];
        let written = self
            .encoder
            .flush::<FlushNoGap>(&mut out)
            .map_err(|e| CompressError::Encoding(format!("{:?}", e)))?;
        Ok(take_init(&out[..written]))
    }
}

/// Verify that LAME links and initializes at all. Resolved once per batch
/// by the encoder adapter rather than re-checked per file.
pub fn probe() -> Result<(), CompressError> {
    Mp3Encoder::new(2, 44100, 128, 0.8).map(|_| ())
}

fn init_err<E: std::fmt::Debug>(e: E) -> CompressError {
    CompressError::EncoderUnavailable(format!("{:?}", e))
}

fn take_init(bytes: &[MaybeUninit<u8>]) -> Vec<u8> {
    bytes.iter().map(|b| unsafe { b.assume_init() }).collect()
}

fn map_bitrate(kbps: u32) -> Bitrate {
    match kbps {
        8 => Bitrate::Kbps8,
        16 => Bitrate::Kbps16,
        24 => Bitrate::Kbps24,
        32 => Bitrate::Kbps32,
        48 => Bitrate::Kbps48,
        64 => Bitrate::Kbps64,
        80 => Bitrate::Kbps80,
        96 => Bitrate::Kbps96,
        112 => Bitrate::Kbps112,
        160 => Bitrate::Kbps160,
        192 => Bitrate::Kbps192,
        224 => Bitrate::Kbps224,
        256 => Bitrate::Kbps256,
        320 => Bitrate::Kbps320,
        _ => Bitrate::Kbps128,
    }
}

fn map_quality(quality: f32) -> Quality {
    if quality < 0.3 {
        Quality::Worst
    } else if quality < 0.6 {
        Quality::Decent
    } else if quality < 0.8 {
        Quality::Good
    } else {
        Quality::Best
    }
}
