//! Background execution of the compression pipeline.
//!
//! The pipeline call is exactly the in-process one; only the transport
//! differs. PCM ownership moves onto a dedicated worker thread and the
//! result comes back over a channel as progress/complete/error messages.
//! Only one worker is ever in flight: files stay strictly sequential even
//! on this path.

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, RecvTimeoutError, Sender};
use libpress_audio::{
    compress_buffer, CompressedAudio, CompressionSettings, EncoderBackend, PcmBuffer,
};

use crate::error::FileError;

enum WorkerMessage {
    Progress(u8),
    Complete(Box<CompressedAudio>),
    Failed(libpress_audio::CompressError),
}

/// Run one file's pipeline on a worker thread, relaying progress into
/// `progress` and enforcing `timeout` as a hard per-file deadline.
///
/// On timeout the thread is abandoned (its eventual result is dropped)
/// and the file reports [`FileError::Timeout`]; the rest of the batch is
/// unaffected.
pub fn compress_on_worker(
    buffer: PcmBuffer,
    settings: CompressionSettings,
    backend: EncoderBackend,
    timeout: Duration,
    progress: &mut dyn FnMut(u8),
) -> Result<CompressedAudio, FileError> {
    let (tx, rx) = unbounded::<WorkerMessage>();

    // Detached on purpose: a timed-out worker keeps running until its
    // pipeline call returns, but nobody is listening anymore.
    let _ = thread::Builder::new()
        .name("repress-worker".into())
        .spawn(move || run_worker(buffer, settings, backend, tx))
        .map_err(|e| FileError::Worker(format!("failed to start worker thread: {}", e)))?;

    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(WorkerMessage::Progress(p)) => progress(p),
            Ok(WorkerMessage::Complete(result)) => return Ok(*result),
            Ok(WorkerMessage::Failed(err)) => return Err(FileError::Compress(err)),
            Err(RecvTimeoutError::Timeout) => {
                return Err(FileError::Timeout(timeout.as_secs()));
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(FileError::Worker("worker exited without a result".into()));
            }
        }
    }
}

fn run_worker(
    buffer: PcmBuffer,
    settings: CompressionSettings,
    backend: EncoderBackend,
    tx: Sender<WorkerMessage>,
) {
    let progress_tx = tx.clone();
    let result = compress_buffer(&buffer, &settings, backend, &mut |p| {
        // A dropped receiver just means the deadline fired; ignore.
        let _ = progress_tx.send(WorkerMessage::Progress(p));
    });

    let message = match result {
        Ok(compressed) => WorkerMessage::Complete(Box::new(compressed)),
        Err(err) => WorkerMessage::Failed(err),
    };
    let _ = tx.send(message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use libpress_audio::{CompressionMode, OutputFormat};

    fn wav_settings() -> CompressionSettings {
        CompressionSettings {
            format: OutputFormat::Wav,
            mode: CompressionMode::Maximum,
            ..Default::default()
        }
    }

    #[test]
    fn worker_result_matches_the_in_process_pipeline() {
        let buffer = PcmBuffer::new(
            44100,
            vec![(0..44100).map(|i| (i as f32 * 0.01).sin() * 0.5).collect()],
        );
        let settings = wav_settings();

        let direct =
            compress_buffer(&buffer, &settings, EncoderBackend::Wav, &mut |_| {}).unwrap();
        let via_worker = compress_on_worker(
            buffer,
            settings,
            EncoderBackend::Wav,
            Duration::from_secs(60),
            &mut |_| {},
        )
        .unwrap();

        assert_eq!(via_worker.audio.bytes, direct.audio.bytes);
        assert_eq!(via_worker.sample_rate, direct.sample_rate);
    }

    #[test]
    fn worker_relays_monotone_progress() {
        let buffer = PcmBuffer::new(8000, vec![vec![0.25; 8000]]);
        let mut seen = Vec::new();
        compress_on_worker(
            buffer,
            wav_settings(),
            EncoderBackend::Wav,
            Duration::from_secs(60),
            &mut |p| seen.push(p),
        )
        .unwrap();
        assert!(!seen.is_empty());
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*seen.last().unwrap(), 100);
    }
}
