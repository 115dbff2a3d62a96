//! Batch transformation pipeline.
//!
//! CSV ingest -> dataset load -> parallel transform -> rows in input order.
//!
//! Range errors are recorded per row and never stop the batch; dataset and
//! internal errors abort it, since every remaining row would fail the same way.

use rayon::prelude::*;
use tracing::info;

use crate::cli::FrameArgs;
use crate::domain::{Point3D, TransformResult};
use crate::engine::Engine;
use crate::error::{AppError, TransformError};
use crate::io::ingest::IngestedPoints;

/// What happened to one input row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Transformed(TransformResult),
    /// Range error for a parsed point.
    OutOfRange(String),
    /// The row could not be parsed.
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchRow {
    pub line: usize,
    pub id: String,
    pub input: Option<Point3D>,
    pub outcome: RowOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub rows: Vec<BatchRow>,
    pub transformed: usize,
    pub fallback: usize,
    pub out_of_range: usize,
    pub invalid: usize,
}

/// Transform every ingested point with `engine`.
pub fn run_batch(engine: &Engine, ingested: IngestedPoints, frames: FrameArgs) -> Result<BatchSummary, AppError> {
    // Fail fast on a broken installation instead of once per row.
    engine.load_grids()?;

    let transformed: Vec<Result<BatchRow, TransformError>> = ingested
        .points
        .par_iter()
        .map(|p| {
            let outcome = match engine.compute_transform(
                p.point,
                frames.from_plan,
                frames.to_plan,
                frames.from_alt,
                frames.to_alt,
            ) {
                Ok(result) => RowOutcome::Transformed(result),
                Err(err) if err.is_range_error() => RowOutcome::OutOfRange(err.to_string()),
                Err(err) => return Err(err),
            };
            Ok(BatchRow {
                line: p.line,
                id: p.id.clone(),
                input: Some(p.point),
                outcome,
            })
        })
        .collect();

    let mut rows = transformed.into_iter().collect::<Result<Vec<_>, _>>()?;
    rows.extend(ingested.row_errors.into_iter().map(|e| BatchRow {
        line: e.line,
        id: e.id.unwrap_or_default(),
        input: None,
        outcome: RowOutcome::Invalid(e.message),
    }));
    rows.sort_by_key(|r| r.line);

    let mut summary = BatchSummary::default();
    for row in &rows {
        match &row.outcome {
            RowOutcome::Transformed(result) => {
                summary.transformed += 1;
                if !result.inside_perimeter {
                    summary.fallback += 1;
                }
            }
            RowOutcome::OutOfRange(_) => summary.out_of_range += 1,
            RowOutcome::Invalid(_) => summary.invalid += 1,
        }
    }
    summary.rows = rows;

    info!(
        rows = summary.rows.len(),
        transformed = summary.transformed,
        fallback = summary.fallback,
        out_of_range = summary.out_of_range,
        invalid = summary.invalid,
        "batch complete"
    );
    Ok(summary)
}
