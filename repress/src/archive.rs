//! Bulk packaging of compressed results into a zip archive.
//!
//! The zip format itself is the external `zip` crate's business; this
//! module only names the entries and streams the bytes in.

use std::io::{Cursor, Write};

use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::batch::CompressedFile;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("packaging failed: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("packaging failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Pack every result into one zip buffer, entries named
/// `<stem>_compressed.<ext>`.
pub fn package<'a>(
    results: impl IntoIterator<Item = &'a CompressedFile>,
) -> Result<Vec<u8>, ArchiveError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for result in results {
        writer.start_file(packaged_name(&result.name), options)?;
        writer.write_all(&result.bytes)?;
    }

    Ok(writer.finish()?.into_inner())
}

/// `song.mp3` -> `song_compressed.mp3`. Applied at packaging time only;
/// per-file downloads keep the plain swapped-extension name.
pub fn packaged_name(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{}_compressed.{}", stem, ext),
        None => format!("{}_compressed", name),
    }
}
