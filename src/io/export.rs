//! Batch results as CSV.
//!
//! One output row per input row, in input order. Failed rows keep their id and
//! line number and carry the error message instead of coordinates.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::app::pipeline::{BatchRow, RowOutcome};
use crate::domain::PerimeterZone;
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct ResultRecord<'a> {
    line: usize,
    id: &'a str,
    status: &'static str,
    east: Option<String>,
    north: Option<String>,
    height: Option<String>,
    inside_perimeter: Option<bool>,
    zone: Option<PerimeterZone>,
    error: Option<&'a str>,
}

impl<'a> ResultRecord<'a> {
    fn from_row(row: &'a BatchRow) -> Self {
        let mut record = ResultRecord {
            line: row.line,
            id: &row.id,
            status: "ok",
            east: None,
            north: None,
            height: None,
            inside_perimeter: None,
            zone: None,
            error: None,
        };
        match &row.outcome {
            RowOutcome::Transformed(result) => {
                record.east = Some(format!("{:.3}", result.point.easting));
                record.north = Some(format!("{:.3}", result.point.northing));
                record.height = Some(format!("{:.3}", result.point.height));
                record.inside_perimeter = Some(result.inside_perimeter);
                record.zone = Some(result.zone);
            }
            RowOutcome::OutOfRange(message) => {
                record.status = "out-of-range";
                record.error = Some(message);
            }
            RowOutcome::Invalid(message) => {
                record.status = "invalid";
                record.error = Some(message);
            }
        }
        record
    }
}

pub fn write_results_csv<W: Write>(output: W, rows: &[BatchRow]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(output);
    for row in rows {
        writer
            .serialize(ResultRecord::from_row(row))
            .map_err(|e| AppError::new(2, format!("Failed to write result row {}: {e}", row.line)))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush results: {e}")))
}

pub fn write_results_file(path: &Path, rows: &[BatchRow]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_results_csv(file, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Point3D, TransformResult};

    #[test]
    fn writes_header_and_one_line_per_row() {
        let rows = vec![
            BatchRow {
                line: 2,
                id: "bern".into(),
                input: Some(Point3D::new(600_100.0, 200_100.0, 500.0)),
                outcome: RowOutcome::Transformed(TransformResult::new(
                    Point3D::new(2_600_100.4567, 1_200_099.8, 499.88),
                    PerimeterZone::Inside,
                )),
            },
            BatchRow {
                line: 3,
                id: "far".into(),
                input: Some(Point3D::new(900_000.0, 200_000.0, 500.0)),
                outcome: RowOutcome::OutOfRange("easting 900000.000 m cannot be transformed".into()),
            },
        ];

        let mut buf = Vec::new();
        write_results_csv(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "line,id,status,east,north,height,inside_perimeter,zone,error");
        assert_eq!(lines[1], "2,bern,ok,2600100.457,1200099.800,499.880,true,inside,");
        assert_eq!(lines[2], "3,far,out-of-range,,,,,,easting 900000.000 m cannot be transformed");
    }
}
