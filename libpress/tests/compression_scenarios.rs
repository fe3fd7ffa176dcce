//! End-to-end scenarios over the resample+encode pipeline.

use libpress_audio::{
    compress_buffer, resample, CompressionMode, CompressionSettings, EncoderBackend,
    OutputFormat, PcmBuffer, TargetParams,
};

fn one_second_mono_44100() -> PcmBuffer {
    PcmBuffer::new(
        44100,
        vec![(0..44100).map(|i| (i as f32 * 0.01).sin() * 0.5).collect()],
    )
}

fn settings(mode: CompressionMode, format: OutputFormat) -> CompressionSettings {
    CompressionSettings {
        mode,
        format,
        ..Default::default()
    }
}

#[test]
fn maximum_mode_mono_second_makes_a_32044_byte_wav() {
    // 44.1kHz mono, 1.0s, maximum mode: 16000 Hz x 1 channel x 2 bytes
    // plus the 44-byte header.
    let out = compress_buffer(
        &one_second_mono_44100(),
        &settings(CompressionMode::Maximum, OutputFormat::Wav),
        EncoderBackend::Wav,
        &mut |_| {},
    )
    .unwrap();
    assert_eq!(out.audio.bytes.len(), 44 + 16000 * 2);
    assert_eq!(out.sample_rate, 16000);
    assert_eq!(out.channels, 1);
}

#[test]
fn aggressive_mode_downmixes_stereo_to_mono() {
    let stereo = PcmBuffer::new(44100, vec![vec![0.3; 44100], vec![-0.3; 44100]]);
    let out = compress_buffer(
        &stereo,
        &settings(CompressionMode::Aggressive, OutputFormat::Wav),
        EncoderBackend::Wav,
        &mut |_| {},
    )
    .unwrap();
    assert_eq!(out.channels, 1);
    assert_eq!(out.sample_rate, 22050);
    assert_eq!(out.audio.bytes.len(), 44 + 22050 * 2);
}

#[test]
fn balanced_mode_preserves_stereo() {
    let stereo = PcmBuffer::new(48000, vec![vec![0.3; 48000], vec![-0.3; 48000]]);
    let out = compress_buffer(
        &stereo,
        &settings(CompressionMode::Balanced, OutputFormat::Wav),
        EncoderBackend::Wav,
        &mut |_| {},
    )
    .unwrap();
    assert_eq!(out.channels, 2);
    assert_eq!(out.sample_rate, 32000);
}

#[test]
fn low_rate_sources_pass_through_unresampled() {
    // An 8kHz source is already below every mode's cap.
    let source = PcmBuffer::new(8000, vec![vec![0.2; 8000]]);
    for mode in [
        CompressionMode::Balanced,
        CompressionMode::Aggressive,
        CompressionMode::Maximum,
    ] {
        let target = TargetParams::derive(8000, 1, &settings(mode, OutputFormat::Wav));
        assert_eq!(target.sample_rate, 8000, "{:?}", mode);
        let out = resample(&source, target);
        assert_eq!(out.frames(), 8000);
    }
}

#[test]
fn empty_input_compresses_to_an_empty_container() {
    let out = compress_buffer(
        &PcmBuffer::new(44100, vec![vec![]]),
        &settings(CompressionMode::Maximum, OutputFormat::Wav),
        EncoderBackend::Wav,
        &mut |_| {},
    )
    .unwrap();
    assert_eq!(out.audio.bytes.len(), 44);
    assert_eq!(out.duration_secs, 0.0);
}

#[cfg(feature = "mp3")]
mod mp3_scenarios {
    use super::*;

    #[test]
    fn mp3_output_is_smaller_than_the_wav_equivalent() {
        let source = one_second_mono_44100();
        let cfg = settings(CompressionMode::Balanced, OutputFormat::Mp3);
        let backend = EncoderBackend::resolve(&cfg);
        assert_eq!(backend, EncoderBackend::Mp3);

        let mp3 = compress_buffer(&source, &cfg, backend, &mut |_| {}).unwrap();
        let wav = compress_buffer(&source, &cfg, EncoderBackend::Wav, &mut |_| {}).unwrap();

        assert_eq!(mp3.audio.mime, "audio/mp3");
        assert!(!mp3.audio.bytes.is_empty());
        assert!(mp3.audio.bytes.len() < wav.audio.bytes.len());
    }

    #[test]
    fn stereo_mp3_encodes_both_channels() {
        let stereo = PcmBuffer::new(
            44100,
            vec![
                (0..44100).map(|i| (i as f32 * 0.01).sin() * 0.4).collect(),
                (0..44100).map(|i| (i as f32 * 0.015).sin() * 0.4).collect(),
            ],
        );
        let cfg = settings(CompressionMode::Balanced, OutputFormat::Mp3);
        let out = compress_buffer(&stereo, &cfg, EncoderBackend::Mp3, &mut |_| {}).unwrap();
        assert_eq!(out.channels, 2);
        assert!(!out.audio.bytes.is_empty());
    }
}
