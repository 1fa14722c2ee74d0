// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Sphragis Contributors

//! Sphragis: Batch File Watermarker & Packager
//!
//! Command line front end: batch runs, single-shot tagging and checking,
//! bulk stripping, visible overlays and stored archives.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

use sphragis::archive;
use sphragis::batch::{self, BatchJob, BatchSummary};
use sphragis::codec;
use sphragis::config::AppConfig;
use sphragis::overlay::{self, BitmapOverlay, OverlayRenderer, TextPosition};
use sphragis::progress::{CancelToken, Reporter};
use sphragis::walker;
use sphragis::{Result, SphragisError};

/// Sphragis CLI - Batch File Watermarker & Packager
#[derive(Parser, Debug)]
#[command(name = "sphragis")]
#[command(author = "Sphragis Contributors")]
#[command(version = "1.2.0")]
#[command(about = "Batch watermarker and packager for numbered file deliveries", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Produce numbered, watermarked copies of a directory
    Batch {
        /// Source directory to copy and process
        source: PathBuf,

        /// Number of copies to produce
        #[arg(short = 'n', long, default_value_t = 1)]
        copies: u32,

        /// Watermark base text; a trailing number seeds the order numbers
        #[arg(short, long)]
        base_text: String,

        /// Paint a visible overlay onto one image per copy
        #[arg(long)]
        overlay: bool,

        /// Swap numbered image pairs in each copy
        #[arg(long)]
        swap: bool,

        /// Pack each copy into a stored ZIP replacing its contents
        #[arg(long)]
        zip: bool,

        /// Overlay text (defaults to the copy's order number)
        #[arg(long)]
        overlay_text: Option<String>,

        /// Photo number receiving the overlay (defaults to the order number)
        #[arg(long)]
        photo_number: Option<u32>,
    },

    /// Append an invisible watermark to a file or directory
    Tag {
        /// File or directory to tag
        path: PathBuf,

        /// Watermark payload
        #[arg(short, long)]
        text: String,
    },

    /// Report watermark payloads in a file or directory
    Check {
        /// File or directory to inspect
        path: PathBuf,
    },

    /// Remove invisible watermarks under a directory
    Strip {
        /// Directory to strip
        dir: PathBuf,

        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },

    /// Paint a visible text overlay onto an image
    Overlay {
        /// Image file, or a directory searched by photo number
        path: PathBuf,

        /// Text to paint
        #[arg(short, long)]
        text: String,

        /// Photo number locating the image inside a directory
        #[arg(long)]
        photo_number: Option<u32>,

        /// Anchor corner (defaults to the configured position)
        #[arg(long, value_enum)]
        position: Option<TextPosition>,
    },

    /// Build a stored (uncompressed) ZIP of a folder
    Zip {
        /// Folder to pack
        folder: PathBuf,

        /// Archive name without extension (defaults to the folder name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if !cli.quiet {
        info!("Sphragis v1.2.0 - Batch Watermarker");
    }

    // Load configuration
    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Commands::Batch {
            source,
            copies,
            base_text,
            overlay,
            swap,
            zip,
            overlay_text,
            photo_number,
        } => {
            let job = BatchJob {
                source,
                copies,
                base_text,
                overlay,
                swap,
                zip,
                overlay_text,
                photo_number,
            };
            run_batch(config, job, &cli.format, cli.quiet).await?;
        }
        Commands::Tag { path, text } => run_tag(config, &path, &text)?,
        Commands::Check { path } => run_check(config, &path, &cli.format)?,
        Commands::Strip { dir, force } => run_strip(config, dir, force).await?,
        Commands::Overlay {
            path,
            text,
            photo_number,
            position,
        } => run_overlay(config, &path, &text, photo_number, position)?,
        Commands::Zip { folder, name } => run_zip(&folder, name)?,
        Commands::Config { action } => run_config_command(config, action, &cli.config)?,
    }

    Ok(())
}

/// Run a batch job with console progress and Ctrl+C cancellation
async fn run_batch(config: AppConfig, job: BatchJob, format: &str, quiet: bool) -> Result<()> {
    let mut reporter = Reporter::silent()
        .with_log(|line| info!("{}", line))
        .with_cancel(CancelToken::new());
    if !quiet {
        reporter = reporter.with_progress(percent_logger());
    }

    let ctrl_c_token = reporter.cancel_token();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Cancellation requested, stopping after the current stage");
            ctrl_c_token.cancel();
        }
    });

    let renderer: Arc<dyn OverlayRenderer> = Arc::new(BitmapOverlay::new(&config.overlay));
    let summary = batch::run_async(job, config, renderer, reporter).await?;

    print_summary(&summary, format)?;
    Ok(())
}

fn print_summary(summary: &BatchSummary, format: &str) -> Result<()> {
    if format == "json" {
        let value = serde_json::json!({
            "copies": summary.copies,
            "files_tagged": summary.files_tagged,
            "already_tagged": summary.already_tagged,
            "tag_failures": summary.tag_failures,
            "overlays_applied": summary.overlays_applied,
            "overlays_missed": summary.overlays_missed,
            "overlay_failures": summary.overlay_failures,
            "pairs_swapped": summary.pairs_swapped,
            "swaps_skipped": summary.swaps_skipped,
            "swap_failures": summary.swap_failures,
            "archives_written": summary.archives_written,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Batch complete: {} copies", summary.copies);
    println!("  Tagged: {} ({} already tagged, {} failed)",
        summary.files_tagged, summary.already_tagged, summary.tag_failures);
    if summary.overlays_applied + summary.overlays_missed + summary.overlay_failures > 0 {
        println!("  Overlays: {} applied, {} missed, {} failed",
            summary.overlays_applied, summary.overlays_missed, summary.overlay_failures);
    }
    if summary.pairs_swapped + summary.swaps_skipped + summary.swap_failures > 0 {
        println!("  Swaps: {} pairs ({} skipped, {} failed)",
            summary.pairs_swapped, summary.swaps_skipped, summary.swap_failures);
    }
    if summary.archives_written > 0 {
        println!("  Archives: {}", summary.archives_written);
    }
    Ok(())
}

/// Tag one file, or every supported file under a directory
fn run_tag(config: AppConfig, path: &Path, text: &str) -> Result<()> {
    let files: Vec<PathBuf> = if path.is_dir() {
        walker::supported_files(path, &config.scan.extensions)
    } else {
        vec![path.to_path_buf()]
    };

    if files.is_empty() {
        println!("No supported files under {}", path.display());
        return Ok(());
    }

    let mut added = 0;
    let mut skipped = 0;
    let mut failed = 0;
    for file in &files {
        match codec::add_watermark(file, text) {
            Ok(true) => {
                println!("Watermark added: {}", file.display());
                added += 1;
            }
            Ok(false) => {
                println!("Already has watermark: {}", file.display());
                skipped += 1;
            }
            Err(e) => {
                eprintln!("Failed to tag {}: {}", file.display(), e);
                failed += 1;
            }
        }
    }
    println!(
        "\nTagged {} files ({} already tagged, {} failed)",
        added, skipped, failed
    );
    Ok(())
}

/// Report tag payloads for a file or directory
fn run_check(config: AppConfig, path: &Path, format: &str) -> Result<()> {
    let files: Vec<PathBuf> = if path.is_dir() {
        walker::supported_files(path, &config.scan.extensions)
    } else {
        vec![path.to_path_buf()]
    };

    let mut report = Vec::new();
    for file in &files {
        let payload = codec::extract_watermark(file)?;
        report.push((file.clone(), payload));
    }

    match format {
        "json" => {
            let output: Vec<serde_json::Value> = report
                .iter()
                .map(|(p, payload)| {
                    serde_json::json!({
                        "path": p.to_string_lossy(),
                        "kind": walker::classify(p).as_str(),
                        "payload": payload,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => {
            let mut tagged = 0;
            for (file, payload) in &report {
                match payload {
                    Some(text) => {
                        println!("{}: \"{}\"", file.display(), text);
                        tagged += 1;
                    }
                    None => println!("{}: no watermark", file.display()),
                }
            }
            println!("\n{} of {} files tagged", tagged, report.len());
        }
    }
    Ok(())
}

/// Remove watermarks under a directory
async fn run_strip(config: AppConfig, dir: PathBuf, force: bool) -> Result<()> {
    if !force {
        eprintln!("Use --force to confirm removing watermarks under {}", dir.display());
        return Ok(());
    }

    let reporter = Reporter::silent()
        .with_log(|line| info!("{}", line))
        .with_progress(percent_logger());
    let extensions = config.scan.extensions.clone();

    let summary = tokio::task::spawn_blocking(move || {
        codec::strip_watermarks(&dir, &extensions, &reporter)
    })
    .await??;

    println!(
        "Removed {} watermarks ({} untagged, {} failed)",
        summary.removed, summary.untagged, summary.failed
    );
    Ok(())
}

/// Paint the visible overlay onto an image or a numbered photo in a folder
fn run_overlay(
    config: AppConfig,
    path: &Path,
    text: &str,
    photo_number: Option<u32>,
    position: Option<TextPosition>,
) -> Result<()> {
    let position = position.unwrap_or(config.overlay.position);
    let renderer = BitmapOverlay::new(&config.overlay);

    let painted = if path.is_dir() {
        let number = photo_number.ok_or_else(|| {
            SphragisError::InvalidJob(
                "--photo-number is required when the target is a directory".to_string(),
            )
        })?;
        let reporter = Reporter::silent().with_log(|line| info!("{}", line));
        overlay::overlay_numbered_photo(path, text, number, position, &renderer, &reporter)?
    } else {
        renderer.overlay_text(path, text, position)?
    };

    if painted {
        println!("Painted \"{}\" onto {}", text, path.display());
    } else {
        println!("No overlay painted for {}", path.display());
    }
    Ok(())
}

/// Build a stored archive of a folder
fn run_zip(folder: &Path, name: Option<String>) -> Result<()> {
    let name = match name {
        Some(name) => name,
        None => folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| SphragisError::InvalidJob("folder needs a name".to_string()))?,
    };
    let zip_path = archive::build_stored_zip(folder, &name)?;
    println!("Created ZIP archive: {}", zip_path.display());
    Ok(())
}

/// Run config commands
fn run_config_command(config: AppConfig, action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        ConfigCommands::Generate { output } => {
            let default_config = AppConfig::default();
            default_config.save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            config.validate()?;
            println!("Configuration at {:?} is valid", config_path);
            println!("  Extensions: {:?}", config.scan.extensions);
            println!("  Copy layout: {:?}", config.batch.layout);
            println!("  Overlay position: {:?}", config.overlay.position);
        }
    }

    Ok(())
}

/// Log whole-percent progress changes
fn percent_logger() -> impl Fn(f32) + Send + Sync + 'static {
    let last = AtomicU32::new(u32::MAX);
    move |fraction: f32| {
        let pct = (fraction * 100.0).round() as u32;
        if last.swap(pct, Ordering::Relaxed) != pct {
            info!("Progress: {}%", pct);
        }
    }
}
