//! Compression settings and the mode policy that turns them into concrete
//! resample targets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Output container/codec selection.
///
/// `aac` is accepted for compatibility with persisted settings but has no
/// encoder of its own; it follows whichever encoder path is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Mp3,
    Aac,
    Wav,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Mp3 => "mp3",
            OutputFormat::Aac => "aac",
            OutputFormat::Wav => "wav",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mp3" => Ok(OutputFormat::Mp3),
            "aac" => Ok(OutputFormat::Aac),
            "wav" => Ok(OutputFormat::Wav),
            other => Err(format!(
                "invalid format: {}. Use: mp3, aac, wav",
                other
            )),
        }
    }
}

/// Named compression profiles. The mode always wins over the raw
/// quality/sample-rate/bit-depth fields when they disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMode {
    /// Keep the source channel layout, cap at 32 kHz, 16-bit grid.
    Balanced,
    /// Mono, cap at 22.05 kHz, 8-bit grid.
    Aggressive,
    /// Mono, cap at 16 kHz, 8-bit grid. Smallest output, most artifacts.
    Maximum,
}

impl CompressionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CompressionMode::Balanced => "balanced",
            CompressionMode::Aggressive => "aggressive",
            CompressionMode::Maximum => "maximum",
        }
    }
}

impl fmt::Display for CompressionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "balanced" => Ok(CompressionMode::Balanced),
            "aggressive" => Ok(CompressionMode::Aggressive),
            "maximum" | "max" => Ok(CompressionMode::Maximum),
            other => Err(format!(
                "invalid mode: {}. Use: balanced, aggressive, maximum",
                other
            )),
        }
    }
}

/// One compression run's worth of user settings.
///
/// Serializes as the flat camelCase object the settings store persists
/// (`format`, `quality`, `bitRate`, `sampleRate`, `bitDepth`, `mode`).
/// Immutable per run; supplied once per file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompressionSettings {
    pub format: OutputFormat,
    /// Encoder quality, 0.0 (smallest) to 1.0 (best).
    pub quality: f32,
    /// Target MP3 bitrate in kbps.
    pub bit_rate: u32,
    /// Nominal sample rate in Hz; the mode may cap it lower.
    pub sample_rate: u32,
    /// Nominal bit depth (8 or 16); the mode may override it.
    pub bit_depth: u8,
    pub mode: CompressionMode,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Mp3,
            quality: 0.8,
            bit_rate: 128,
            sample_rate: 44100,
            bit_depth: 16,
            mode: CompressionMode::Aggressive,
        }
    }
}

/// Concrete resample targets, derived once per file and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetParams {
    pub sample_rate: u32,
    pub channels: usize,
    pub bit_depth: u8,
}

impl TargetParams {
    /// The mode policy: map a source stream plus user settings to resample
    /// targets.
    ///
    /// Deterministic and total: every input yields a valid target with
    /// `sample_rate <= source_rate` and `1 <= channels <= 2`. Resampling is
    /// exclusively downward or identity; there is no upsampling path.
    pub fn derive(
        source_rate: u32,
        source_channels: usize,
        settings: &CompressionSettings,
    ) -> Self {
        match settings.mode {
            CompressionMode::Aggressive => Self {
                sample_rate: source_rate.min(22_050),
                channels: 1,
                bit_depth: 8,
            },
            CompressionMode::Maximum => Self {
                sample_rate: source_rate.min(16_000),
                channels: 1,
                bit_depth: 8,
            },
            CompressionMode::Balanced => Self {
                sample_rate: source_rate.min(32_000),
                channels: source_channels.clamp(1, 2),
                bit_depth: 16,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_mode(mode: CompressionMode) -> CompressionSettings {
        CompressionSettings {
            mode,
            ..Default::default()
        }
    }

    #[test]
    fn aggressive_caps_at_22050_mono_8bit() {
        let t = TargetParams::derive(44100, 2, &with_mode(CompressionMode::Aggressive));
        assert_eq!(t.sample_rate, 22050);
        assert_eq!(t.channels, 1);
        assert_eq!(t.bit_depth, 8);
    }

    #[test]
    fn maximum_caps_at_16000_mono_8bit() {
        let t = TargetParams::derive(48000, 2, &with_mode(CompressionMode::Maximum));
        assert_eq!(t.sample_rate, 16000);
        assert_eq!(t.channels, 1);
        assert_eq!(t.bit_depth, 8);
    }

    #[test]
    fn balanced_keeps_channels_and_caps_at_32000() {
        let t = TargetParams::derive(44100, 2, &with_mode(CompressionMode::Balanced));
        assert_eq!(t.sample_rate, 32000);
        assert_eq!(t.channels, 2);
        assert_eq!(t.bit_depth, 16);
    }

    #[test]
    fn never_upsamples() {
        for mode in [
            CompressionMode::Balanced,
            CompressionMode::Aggressive,
            CompressionMode::Maximum,
        ] {
            for rate in [8000u32, 11025, 16000, 22050, 32000, 44100, 48000] {
                let t = TargetParams::derive(rate, 2, &with_mode(mode));
                assert!(
                    t.sample_rate <= rate,
                    "{:?} upsampled {} to {}",
                    mode,
                    rate,
                    t.sample_rate
                );
            }
        }
    }

    #[test]
    fn balanced_channel_count_stays_in_1_to_2() {
        let settings = with_mode(CompressionMode::Balanced);
        assert_eq!(TargetParams::derive(44100, 0, &settings).channels, 1);
        assert_eq!(TargetParams::derive(44100, 6, &settings).channels, 2);
    }

    #[test]
    fn derive_is_deterministic() {
        let settings = with_mode(CompressionMode::Aggressive);
        let a = TargetParams::derive(44100, 2, &settings);
        let b = TargetParams::derive(44100, 2, &settings);
        assert_eq!(a, b);
    }

    #[test]
    fn mode_wins_over_raw_fields() {
        // A nominal 44.1kHz/16-bit request still gets the maximum-mode caps.
        let settings = CompressionSettings {
            sample_rate: 44100,
            bit_depth: 16,
            mode: CompressionMode::Maximum,
            ..Default::default()
        };
        let t = TargetParams::derive(44100, 2, &settings);
        assert_eq!(t.sample_rate, 16000);
        assert_eq!(t.bit_depth, 8);
    }

    #[test]
    fn settings_serialize_as_flat_camel_case() {
        let json = serde_json::to_value(CompressionSettings::default()).unwrap();
        assert_eq!(json["format"], "mp3");
        assert_eq!(json["bitRate"], 128);
        assert_eq!(json["sampleRate"], 44100);
        assert_eq!(json["bitDepth"], 16);
        assert_eq!(json["mode"], "aggressive");
    }

    #[test]
    fn settings_round_trip_through_json() {
        let settings = CompressionSettings {
            format: OutputFormat::Wav,
            quality: 0.5,
            bit_rate: 192,
            sample_rate: 48000,
            bit_depth: 8,
            mode: CompressionMode::Balanced,
        };
        let text = serde_json::to_string(&settings).unwrap();
        let back: CompressionSettings = serde_json::from_str(&text).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn partial_settings_blob_fills_defaults() {
        let back: CompressionSettings = serde_json::from_str(r#"{"mode":"maximum"}"#).unwrap();
        assert_eq!(back.mode, CompressionMode::Maximum);
        assert_eq!(back.bit_rate, 128);
    }
}
