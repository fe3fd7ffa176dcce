//! Settings persistence.
//!
//! Settings live in a single flat JSON blob, read once at startup and
//! written back whenever they change. A missing or malformed blob must
//! never stop the program: loading always succeeds, falling back to
//! defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use libpress_audio::CompressionSettings;

/// Default blob name, kept compatible with the historical key.
pub const SETTINGS_FILE: &str = "audioCompressorSettings.json";

/// Load persisted settings, or defaults when the blob is missing or
/// unreadable.
pub fn load(path: &Path) -> CompressionSettings {
    match fs::read_to_string(path) {
        Ok(text) => match serde_json::from_str(&text) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("ignoring malformed settings at {}: {}", path.display(), e);
                CompressionSettings::default()
            }
        },
        Err(_) => CompressionSettings::default(),
    }
}

/// Persist settings as pretty-printed JSON.
pub fn save(path: &Path, settings: &CompressionSettings) -> Result<()> {
    let text = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;
    fs::write(path, text)
        .with_context(|| format!("Failed to write settings to {}", path.display()))
}
