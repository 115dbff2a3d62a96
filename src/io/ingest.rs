//! Point-list CSV ingest.
//!
//! Expected columns: `id,east,north,height` (header names are matched
//! case-insensitively; extra columns are ignored). Rows that cannot be parsed
//! are reported as `RowError`s and skipped, the rest are returned in file
//! order.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::Point3D;
use crate::error::AppError;

const REQUIRED_COLUMNS: [&str; 4] = ["id", "east", "north", "height"];

/// A point read from the input file.
#[derive(Debug, Clone, PartialEq)]
pub struct InputPoint {
    pub line: usize,
    pub id: String,
    pub point: Point3D,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub id: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct IngestedPoints {
    pub points: Vec<InputPoint>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

pub fn load_points(path: &Path) -> Result<IngestedPoints, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_points(file)
}

pub fn read_points<R: Read>(input: R) -> Result<IngestedPoints, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    for column in REQUIRED_COLUMNS {
        if !header_map.contains_key(column) {
            return Err(AppError::new(2, format!("Missing required column: `{column}`")));
        }
    }

    let mut points = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok((id, point)) => points.push(InputPoint { line, id, point }),
            Err((id, message)) => row_errors.push(RowError { line, id, message }),
        }
    }

    Ok(IngestedPoints {
        points,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
) -> Result<(String, Point3D), (Option<String>, String)> {
    let id = get_required(record, header_map, "id").map_err(|e| (None, e))?.to_string();
    let coordinate = |name: &str| -> Result<f64, (Option<String>, String)> {
        let raw = get_required(record, header_map, name).map_err(|e| (Some(id.clone()), e))?;
        parse_f64(raw).map_err(|e| (Some(id.clone()), format!("Invalid `{name}`: {e}")))
    };

    let point = Point3D::new(coordinate("east")?, coordinate("north")?, coordinate("height")?);
    Ok((id, point))
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn parse_f64(s: &str) -> Result<f64, String> {
    let v = s.parse::<f64>().map_err(|_| format!("'{s}' is not a number"))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("'{s}' is not finite"))
    }
}
