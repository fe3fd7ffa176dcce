use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use libpress_audio::{edit, encode_wav, CompressionMode, CompressionSettings, OutputFormat};
use repress::{archive, audio, batch, format_size, history, rename, store};
use repress::{BatchItem, Executor, FileOutcome};

#[derive(Parser)]
#[command(name = "repress")]
#[command(version)]
#[command(about = "Batch audio compressor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a batch of audio files
    Compress {
        /// Input audio files (mp3, wav, flac, ogg, m4a, ...)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
        /// Output format (mp3, aac, wav)
        #[arg(long)]
        format: Option<OutputFormat>,
        /// Compression mode (balanced, aggressive, maximum)
        #[arg(short, long)]
        mode: Option<CompressionMode>,
        /// Encoder quality, 0.0-1.0
        #[arg(short, long)]
        quality: Option<f32>,
        /// MP3 bitrate in kbps
        #[arg(short, long)]
        bitrate: Option<u32>,
        /// Run the pipeline on a background worker thread
        #[arg(long)]
        worker: bool,
        /// Also pack all outputs into compressed_audio.zip
        #[arg(long)]
        zip: bool,
        /// Output naming pattern; {n} = 1-based number, {original} = input stem
        #[arg(long)]
        pattern: Option<String>,
        /// Settings blob location
        #[arg(long, default_value = store::SETTINGS_FILE)]
        settings: PathBuf,
        /// Do not persist the effective settings back to the blob
        #[arg(long)]
        no_save_settings: bool,
        /// History file location
        #[arg(long, default_value = history::HISTORY_FILE)]
        history: PathBuf,
        /// Do not record this run in the history file
        #[arg(long)]
        no_history: bool,
    },
    /// Show stream parameters of an audio file
    Info {
        /// Input audio file
        input: PathBuf,
    },
    /// Trim, normalize or fade an audio file, writing WAV
    Edit {
        /// Input audio file
        input: PathBuf,
        /// Output WAV file
        output: PathBuf,
        /// Keep audio from this point, in seconds
        #[arg(long)]
        trim_start: Option<f64>,
        /// Keep audio up to this point, in seconds
        #[arg(long)]
        trim_end: Option<f64>,
        /// Peak-normalize before writing
        #[arg(long)]
        normalize: bool,
        /// Fade in over this many seconds
        #[arg(long)]
        fade_in: Option<f64>,
        /// Fade out over this many seconds
        #[arg(long)]
        fade_out: Option<f64>,
    },
    /// Show recorded compression history
    History {
        /// History file location
        #[arg(long, default_value = history::HISTORY_FILE)]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Compress {
            inputs,
            out_dir,
            format,
            mode,
            quality,
            bitrate,
            worker,
            zip,
            pattern,
            settings,
            no_save_settings,
            history,
            no_history,
        } => compress(CompressArgs {
            inputs,
            out_dir,
            format,
            mode,
            quality,
            bitrate,
            worker,
            zip,
            pattern,
            settings_path: settings,
            no_save_settings,
            history_path: history,
            no_history,
        }),
        Commands::Info { input } => info(&input),
        Commands::Edit {
            input,
            output,
            trim_start,
            trim_end,
            normalize,
            fade_in,
            fade_out,
        } => edit_file(
            &input, &output, trim_start, trim_end, normalize, fade_in, fade_out,
        ),
        Commands::History { file } => show_history(&file),
    }
}

struct CompressArgs {
    inputs: Vec<PathBuf>,
    out_dir: PathBuf,
    format: Option<OutputFormat>,
    mode: Option<CompressionMode>,
    quality: Option<f32>,
    bitrate: Option<u32>,
    worker: bool,
    zip: bool,
    pattern: Option<String>,
    settings_path: PathBuf,
    no_save_settings: bool,
    history_path: PathBuf,
    no_history: bool,
}

fn compress(args: CompressArgs) -> Result<()> {
    let mut settings = store::load(&args.settings_path);
    let loaded = settings.clone();
    apply_overrides(&mut settings, &args);

    if settings != loaded && !args.no_save_settings {
        if let Err(e) = store::save(&args.settings_path, &settings) {
            log::warn!("could not persist settings: {}", e);
        }
    }

    let items: Vec<BatchItem> = args.inputs.iter().map(BatchItem::from_path).collect();
    let total_bytes: u64 = items.iter().map(|i| i.size).sum();

    println!(
        "Compressing {} files ({}) with {} mode...",
        items.len(),
        format_size(total_bytes),
        settings.mode
    );

    let executor = if args.worker {
        Executor::Worker
    } else {
        Executor::InProcess
    };

    let mut last_index = usize::MAX;
    let report = batch::run_batch(&items, &settings, executor, |update| {
        if update.file_index != last_index {
            last_index = update.file_index;
            println!(
                "[{:>3.0}%] {} ({}/{})",
                update.overall_percent,
                update.file_name,
                update.file_index + 1,
                update.file_count
            );
        }
    });

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;

    let mut result_index = 0usize;
    for outcome in &report.outcomes {
        match outcome {
            FileOutcome::Succeeded(file) => {
                let name = match &args.pattern {
                    Some(pattern) => rename::rename_output(pattern, &file.name, result_index),
                    None => file.name.clone(),
                };
                result_index += 1;

                let dest = args.out_dir.join(&name);
                fs::write(&dest, &file.bytes)
                    .with_context(|| format!("Failed to write {}", dest.display()))?;

                let delta = file.original_size as i64 - file.size() as i64;
                let ratio = if file.original_size > 0 {
                    delta as f64 / file.original_size as f64 * 100.0
                } else {
                    0.0
                };
                println!(
                    "  \u{2713} {} ({}, {}{:.1}%)",
                    name,
                    format_size(file.size()),
                    if ratio >= 0.0 { "-" } else { "+" },
                    ratio.abs()
                );
            }
            FileOutcome::Failed { name, error } => {
                println!("  \u{2717} {}: {}", name, error);
            }
        }
    }

    if args.zip && report.success_count > 0 {
        let pattern = args.pattern.as_deref();
        let packaged: Vec<_> = report
            .results()
            .enumerate()
            .map(|(i, file)| match pattern {
                Some(p) => {
                    let mut renamed = file.clone();
                    renamed.name = rename::rename_output(p, &file.name, i);
                    renamed
                }
                None => file.clone(),
            })
            .collect();
        let bytes = archive::package(packaged.iter()).context("Failed to package results")?;
        let dest = args.out_dir.join("compressed_audio.zip");
        fs::write(&dest, bytes)
            .with_context(|| format!("Failed to write {}", dest.display()))?;
        println!("  Archive: {}", dest.display());
    }

    if !args.no_history {
        let entries: Vec<_> = report
            .results()
            .map(|file| history::HistoryEntry::new(file, &settings))
            .collect();
        if let Err(e) = history::append(&args.history_path, &entries) {
            log::warn!("could not record history: {}", e);
        }
    }

    println!();
    println!(
        "Done: {}/{} files compressed in {:.1}s",
        report.success_count,
        report.outcomes.len(),
        report.elapsed.as_secs_f64()
    );
    let saved = report.bytes_saved();
    if saved >= 0 {
        println!(
            "  Saved {} ({:.0}% average)",
            format_size(saved as u64),
            report.average_ratio() * 100.0
        );
    } else {
        println!(
            "  Grew by {} (+{:.0}% average)",
            format_size(saved.unsigned_abs()),
            report.average_ratio().abs() * 100.0
        );
    }

    if report.success_count == 0 {
        bail!("No files were successfully compressed");
    }

    Ok(())
}

fn apply_overrides(settings: &mut CompressionSettings, args: &CompressArgs) {
    if let Some(format) = args.format {
        settings.format = format;
    }
    if let Some(mode) = args.mode {
        settings.mode = mode;
    }
    if let Some(quality) = args.quality {
        settings.quality = quality.clamp(0.0, 1.0);
    }
    if let Some(bitrate) = args.bitrate {
        settings.bit_rate = bitrate;
    }
}

fn info(input: &PathBuf) -> Result<()> {
    let bytes = fs::read(input).context("Failed to read input file")?;
    let extension = input.extension().and_then(|e| e.to_str());
    let buffer = audio::decode_bytes(&bytes, extension)
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("{}", input.display());
    println!("  Sample rate: {} Hz", buffer.sample_rate());
    println!("  Channels:    {}", buffer.channel_count());
    println!("  Duration:    {:.2}s", buffer.duration_secs());
    println!("  File size:   {}", format_size(bytes.len() as u64));

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn edit_file(
    input: &PathBuf,
    output: &PathBuf,
    trim_start: Option<f64>,
    trim_end: Option<f64>,
    normalize: bool,
    fade_in: Option<f64>,
    fade_out: Option<f64>,
) -> Result<()> {
    let bytes = fs::read(input).context("Failed to read input file")?;
    let extension = input.extension().and_then(|e| e.to_str());
    let mut buffer = audio::decode_bytes(&bytes, extension)
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    if trim_start.is_some() || trim_end.is_some() {
        let start = trim_start.unwrap_or(0.0);
        let end = trim_end.unwrap_or(buffer.duration_secs());
        buffer = edit::trim(&buffer, start, end);
    }
    if normalize {
        buffer = edit::normalize(&buffer);
    }
    if let Some(secs) = fade_in {
        buffer = edit::fade_in(&buffer, secs);
    }
    if let Some(secs) = fade_out {
        buffer = edit::fade_out(&buffer, secs);
    }

    fs::write(output, encode_wav(&buffer)).context("Failed to write output file")?;
    println!(
        "Wrote {} ({:.2}s)",
        output.display(),
        buffer.duration_secs()
    );

    Ok(())
}

fn show_history(file: &PathBuf) -> Result<()> {
    let entries = history::load(file);
    if entries.is_empty() {
        println!("No history recorded");
        return Ok(());
    }

    for entry in &entries {
        println!(
            "{}  {}  {} -> {}  ({} mode)",
            entry.timestamp,
            entry.original_file,
            format_size(entry.original_size),
            format_size(entry.compressed_size),
            entry.settings.mode
        );
    }

    Ok(())
}
