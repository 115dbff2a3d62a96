//! Command-line parsing for the `reframe` binary.
//!
//! Parsing lives here; dispatch lives in `app`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{AltimetricFrame, PlanimetricFrame};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "reframe", version, about = "Swiss reference frame transformations (LV03/LV95, LN02/LHN95)")]
pub struct Cli {
    /// Correction dataset file (overrides REFRAME_DATASET; default: embedded dataset).
    #[arg(long, global = true, value_name = "PATH")]
    pub dataset: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Transform a single point.
    Compute(ComputeArgs),
    /// Transform every point of a CSV file (`id,east,north,height`).
    Batch(BatchArgs),
    /// Print correction dataset metadata.
    Info,
    /// Correction dataset maintenance.
    #[command(subcommand)]
    Dataset(DatasetCommand),
}

/// Source and target frames, shared by `compute` and `batch`.
#[derive(Debug, Args, Clone, Copy)]
pub struct FrameArgs {
    #[arg(long, value_enum, default_value_t = PlanimetricFrame::LegacyMilitary)]
    pub from_plan: PlanimetricFrame,

    #[arg(long, value_enum, default_value_t = PlanimetricFrame::Modern)]
    pub to_plan: PlanimetricFrame,

    #[arg(long, value_enum, default_value_t = AltimetricFrame::LegacyLeveling)]
    pub from_alt: AltimetricFrame,

    #[arg(long, value_enum, default_value_t = AltimetricFrame::ModernLeveling)]
    pub to_alt: AltimetricFrame,
}

#[derive(Debug, Args, Clone)]
pub struct ComputeArgs {
    /// Easting in metres.
    #[arg(allow_negative_numbers = true)]
    pub east: f64,

    /// Northing in metres.
    #[arg(allow_negative_numbers = true)]
    pub north: f64,

    /// Height in metres.
    #[arg(allow_negative_numbers = true)]
    pub height: f64,

    #[command(flatten)]
    pub frames: FrameArgs,

    /// Print the result as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    /// Input CSV with columns `id,east,north,height`.
    #[arg(long, short, value_name = "CSV")]
    pub input: PathBuf,

    /// Output CSV (stdout when omitted).
    #[arg(long, short, value_name = "CSV")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub frames: FrameArgs,
}

#[derive(Debug, Subcommand)]
pub enum DatasetCommand {
    /// Write the packaged synthetic correction dataset.
    Build {
        /// Destination file.
        #[arg(long, value_name = "PATH")]
        out: PathBuf,
    },
}
