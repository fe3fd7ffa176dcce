//! Sequential batch orchestration.
//!
//! Files are processed strictly one at a time, in the order they were
//! queued: read, decode, then the resample+encode pipeline (in-process or
//! on a worker thread). A failing file is recorded and skipped; it never
//! takes the rest of the batch down with it.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use libpress_audio::{compress_buffer, CompressionSettings, EncoderBackend};

use crate::audio;
use crate::error::FileError;
use crate::progress::BatchProgress;
use crate::worker;

/// Hard ceiling on a single input file.
pub const MAX_INPUT_BYTES: u64 = 100 * 1024 * 1024;

/// Per-file processing deadline on the worker path.
pub const FILE_TIMEOUT: Duration = Duration::from_secs(60);

/// How the per-file pipeline runs. The compression logic is identical on
/// both paths; only the execution context differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Executor {
    #[default]
    InProcess,
    Worker,
}

/// One queued input file.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub path: PathBuf,
    /// Size as queued; drives the file's weight in overall progress.
    pub size: u64,
}

impl BatchItem {
    /// Queue a path, reading its size from the filesystem. Unreadable
    /// paths get weight zero and will surface as a read failure when
    /// their turn comes.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        Self { path, size }
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// One successful result, sized and named for download or packaging.
#[derive(Debug, Clone)]
pub struct CompressedFile {
    /// Original basename with the extension swapped for the encoder's.
    pub name: String,
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub original_size: u64,
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub channels: usize,
}

impl CompressedFile {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Where a finished file ended up. Results keep input order.
#[derive(Debug)]
pub enum FileOutcome {
    Succeeded(CompressedFile),
    Failed { name: String, error: FileError },
}

/// Progress snapshot handed to the front-end's callback.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub file_index: usize,
    pub file_count: usize,
    pub file_name: String,
    /// This file's own 0-100 progress, strictly non-decreasing.
    pub file_percent: u8,
    /// Byte-weighted overall 0-100 progress, monotone across the batch.
    pub overall_percent: f64,
}

/// Aggregate statistics for a finished batch run.
#[derive(Debug)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
    pub success_count: usize,
    pub original_bytes: u64,
    pub compressed_bytes: u64,
    pub elapsed: Duration,
}

impl BatchReport {
    /// Original minus compressed; negative when compression expanded the
    /// data (possible on pathological or tiny inputs).
    pub fn bytes_saved(&self) -> i64 {
        self.original_bytes as i64 - self.compressed_bytes as i64
    }

    /// Average compression ratio: saved / original, in [-inf, 1].
    pub fn average_ratio(&self) -> f64 {
        if self.original_bytes == 0 {
            return 0.0;
        }
        self.bytes_saved() as f64 / self.original_bytes as f64
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count
    }

    /// Successful results in input order.
    pub fn results(&self) -> impl Iterator<Item = &CompressedFile> {
        self.outcomes.iter().filter_map(|o| match o {
            FileOutcome::Succeeded(file) => Some(file),
            FileOutcome::Failed { .. } => None,
        })
    }
}

/// Process a queue of files with one settings value.
///
/// The encoder backend is resolved once for the whole batch, never
/// re-checked per file. `on_progress` fires for every per-file checkpoint
/// with the weighted overall value alongside.
pub fn run_batch(
    items: &[BatchItem],
    settings: &CompressionSettings,
    executor: Executor,
    mut on_progress: impl FnMut(&ProgressUpdate),
) -> BatchReport {
    let started = Instant::now();
    let backend = EncoderBackend::resolve(settings);
    log::debug!("batch of {} files, backend {:?}", items.len(), backend);

    let mut progress = BatchProgress::new(items.iter().map(|i| i.size).sum());
    let mut outcomes = Vec::with_capacity(items.len());
    let mut success_count = 0usize;
    let mut original_bytes = 0u64;
    let mut compressed_bytes = 0u64;

    for (index, item) in items.iter().enumerate() {
        let name = item.file_name();
        progress.start_file(item.size);

        let mut emit = |prog: &mut BatchProgress, percent: u8| {
            prog.file_progress(percent);
            on_progress(&ProgressUpdate {
                file_index: index,
                file_count: items.len(),
                file_name: name.clone(),
                file_percent: prog.file_percent(),
                overall_percent: prog.overall(),
            });
        };

        let result = process_file(item, settings, backend, executor, &mut |p| {
            emit(&mut progress, p)
        });
        progress.finish_file();
        emit(&mut progress, 100);

        match result {
            Ok(file) => {
                original_bytes += item.size;
                compressed_bytes += file.size();
                success_count += 1;
                outcomes.push(FileOutcome::Succeeded(file));
            }
            Err(error) => {
                log::warn!("{}: {}", name, error);
                outcomes.push(FileOutcome::Failed { name, error });
            }
        }
    }

    BatchReport {
        outcomes,
        success_count,
        original_bytes,
        compressed_bytes,
        elapsed: started.elapsed(),
    }
}

fn process_file(
    item: &BatchItem,
    settings: &CompressionSettings,
    backend: EncoderBackend,
    executor: Executor,
    progress: &mut dyn FnMut(u8),
) -> Result<CompressedFile, FileError> {
    if !audio::is_audio_file(&item.path) {
        return Err(FileError::InvalidFileType);
    }
    if item.size > MAX_INPUT_BYTES {
        return Err(FileError::FileTooLarge {
            size: item.size,
            limit: MAX_INPUT_BYTES,
        });
    }
    progress(5);

    let bytes = fs::read(&item.path)?;
    progress(15);

    let extension = item.path.extension().and_then(|e| e.to_str());
    let buffer = audio::decode_bytes(&bytes, extension)?;
    progress(25);

    let compressed = match executor {
        Executor::InProcess => compress_buffer(&buffer, settings, backend, progress)?,
        Executor::Worker => {
            worker::compress_on_worker(buffer, settings.clone(), backend, FILE_TIMEOUT, progress)?
        }
    };

    Ok(CompressedFile {
        name: output_name(&item.path, compressed.audio.extension),
        mime: compressed.audio.mime,
        bytes: compressed.audio.bytes,
        original_size: item.size,
        duration_secs: compressed.duration_secs,
        sample_rate: compressed.sample_rate,
        channels: compressed.channels,
    })
}

/// Original basename with the extension swapped for the encoder's actual
/// output format.
pub fn output_name(path: &Path, extension: &str) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".into());
    format!("{}.{}", stem, extension)
}
