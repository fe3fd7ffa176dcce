//! repress - batch audio compressor front-end
//!
//! This crate wires the `libpress-audio` pipeline to the filesystem:
//! symphonia decoding, the sequential batch orchestrator with
//! byte-weighted progress, settings and history persistence, and zip
//! packaging of the results.

pub mod archive;
pub mod audio;
pub mod batch;
pub mod error;
pub mod history;
pub mod progress;
pub mod rename;
pub mod store;
pub mod worker;

pub use batch::{
    run_batch, BatchItem, BatchReport, CompressedFile, Executor, FileOutcome, ProgressUpdate,
    FILE_TIMEOUT, MAX_INPUT_BYTES,
};
pub use error::FileError;
pub use progress::BatchProgress;

/// Human-readable byte count: `0 Bytes`, `1.5 KB`, `12.25 MB`, ...
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let exponent = (bytes as f64).log(1024.0).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    // Two decimals, trailing zeros trimmed.
    let text = format!("{:.2}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", text, UNITS[exponent])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_size_picks_sane_units() {
        assert_eq!(format_size(0), "0 Bytes");
        assert_eq!(format_size(512), "512 Bytes");
        assert_eq!(format_size(1024), "1 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5 MB");
    }
}
