//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs logging
//! - resolves the engine configuration (environment, `.env`, `--dataset`)
//! - dispatches to the subcommands and prints their output

use std::io::Write;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{BatchArgs, Cli, Command, ComputeArgs, DatasetCommand};
use crate::config::EngineConfig;
use crate::domain::Point3D;
use crate::engine::Engine;
use crate::error::AppError;
use crate::transform::applied_translation;

pub mod pipeline;

/// Entry point for the `reframe` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = EngineConfig::from_env()?;
    if let Some(path) = &cli.dataset {
        config = config.with_dataset_path(path);
    }

    match cli.command {
        Command::Compute(args) => handle_compute(&Engine::new(config), &args),
        Command::Batch(args) => handle_batch(&Engine::new(config), &args),
        Command::Info => handle_info(&Engine::new(config)),
        Command::Dataset(DatasetCommand::Build { out }) => handle_dataset_build(&out),
    }
}

/// Logs go to stderr; `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_compute(engine: &Engine, args: &ComputeArgs) -> Result<(), AppError> {
    let input = Point3D::new(args.east, args.north, args.height);
    if !args.json {
        println!("{}", crate::report::format_input(&input));
    }

    let frames = args.frames;
    let result = engine
        .compute_transform(input, frames.from_plan, frames.to_plan, frames.from_alt, frames.to_alt)
        .map_err(|err| {
            tracing::debug!(error = ?err, "transformation failed");
            AppError::from(err)
        })?;

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| AppError::new(4, format!("Failed to serialize result: {e}")))?;
        println!("{json}");
        return Ok(());
    }

    if !result.inside_perimeter {
        let dataset = engine.load_grids()?;
        let applied = applied_translation(dataset.metadata.translation, frames.from_plan, frames.to_plan);
        if let Some(applied) = applied {
            println!("{}", crate::report::format_fallback_notice(applied));
        }
    }
    println!("{}", crate::report::format_result(&result));
    Ok(())
}

fn handle_batch(engine: &Engine, args: &BatchArgs) -> Result<(), AppError> {
    let ingested = crate::io::ingest::load_points(&args.input)?;
    info!(
        rows = ingested.rows_read,
        invalid = ingested.row_errors.len(),
        "read {}",
        args.input.display()
    );

    let summary = pipeline::run_batch(engine, ingested, args.frames)?;

    match &args.output {
        Some(path) => {
            crate::io::export::write_results_file(path, &summary.rows)?;
            println!("{}", crate::report::format_batch_summary(&summary));
        }
        None => {
            let stdout = std::io::stdout();
            crate::io::export::write_results_csv(stdout.lock(), &summary.rows)?;
            eprintln!("{}", crate::report::format_batch_summary(&summary));
        }
    }
    Ok(())
}

fn handle_info(engine: &Engine) -> Result<(), AppError> {
    let dataset = engine.load_grids()?;
    let tolerance = engine.fallback_tolerance(&dataset);
    println!(
        "{}",
        crate::report::format_dataset_info(&dataset, engine.cache().source(), tolerance)
    );
    Ok(())
}

fn handle_dataset_build(out: &std::path::Path) -> Result<(), AppError> {
    let dataset = crate::dataset::synthetic::build()
        .map_err(|e| AppError::new(4, format!("Failed to build dataset: {e}")))?;
    let bytes = crate::dataset::encode(&dataset);

    let mut file = std::fs::File::create(out)
        .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", out.display())))?;
    file.write_all(&bytes)
        .map_err(|e| AppError::new(2, format!("Failed to write '{}': {e}", out.display())))?;

    println!("Wrote {} bytes to {}", bytes.len(), out.display());
    Ok(())
}
