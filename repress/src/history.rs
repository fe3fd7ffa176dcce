//! Compression run history.
//!
//! Every batch appends one entry per successful file to a JSON list:
//! when it ran, what went in, what came out, and the settings that did
//! it. Like the settings blob, a missing or malformed history file is
//! never fatal.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use libpress_audio::CompressionSettings;
use serde::{Deserialize, Serialize};

use crate::batch::CompressedFile;

/// Default history file name.
pub const HISTORY_FILE: &str = "repressHistory.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// UTC timestamp, RFC 3339.
    pub timestamp: String,
    pub original_file: String,
    pub original_size: u64,
    pub compressed_size: u64,
    pub settings: CompressionSettings,
}

impl HistoryEntry {
    pub fn new(result: &CompressedFile, settings: &CompressionSettings) -> Self {
        Self {
            timestamp: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            original_file: result.name.clone(),
            original_size: result.original_size,
            compressed_size: result.size(),
            settings: settings.clone(),
        }
    }
}

/// Read the full history, empty on a missing or malformed file.
pub fn load(path: &Path) -> Vec<HistoryEntry> {
    match fs::read_to_string(path) {
        Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
            log::warn!("ignoring malformed history at {}: {}", path.display(), e);
            Vec::new()
        }),
        Err(_) => Vec::new(),
    }
}

/// Append entries to the history file, creating it when absent.
pub fn append(path: &Path, entries: &[HistoryEntry]) -> Result<()> {
    if entries.is_empty() {
        return Ok(());
    }
    let mut all = load(path);
    all.extend(entries.iter().cloned());
    let text = serde_json::to_string_pretty(&all).context("Failed to serialize history")?;
    fs::write(path, text)
        .with_context(|| format!("Failed to write history to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> HistoryEntry {
        HistoryEntry {
            timestamp: "2025-01-01T00:00:00Z".into(),
            original_file: name.into(),
            original_size: 1000,
            compressed_size: 400,
            settings: CompressionSettings::default(),
        }
    }

    #[test]
    fn append_accumulates_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(HISTORY_FILE);

        append(&path, &[entry("a.mp3")]).unwrap();
        append(&path, &[entry("b.mp3"), entry("c.mp3")]).unwrap();

        let all = load(&path);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].original_file, "a.mp3");
        assert_eq!(all[2].original_file, "c.mp3");
    }

    #[test]
    fn malformed_history_resets_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(HISTORY_FILE);
        fs::write(&path, "][").unwrap();
        assert!(load(&path).is_empty());
    }
}
