//! Binary dataset format, version 1.
//!
//! All numbers are little-endian.
//!
//! ```text
//! magic              8   "RFRMGRID"
//! version            u16
//! reserved           u16
//! published          u32 YYYYMMDD
//! translation        f64 e, f64 n
//! fallback_tolerance f64
//! perimeter_len      u32, then perimeter_len x (f64 e, f64 n)
//! grid_count         u32, then per grid:
//!   kind u8 (1 planimetric, 2 altimetric), components u8, reserved u16
//!   origin f64 e, f64 n; cell f64 e, f64 n; cols u32; rows u32
//!   rows x cols x components f32, row-major from the south-west node
//! sha256             32  digest of every preceding byte
//! ```

use chrono::{Datelike, NaiveDate};
use nalgebra::{Point2, Vector2};
use sha2::{Digest, Sha256};

use crate::dataset::{Dataset, DatasetMetadata};
use crate::error::DatasetError;
use crate::grid::{CorrectionGrid, GridGeometry};
use crate::perimeter::Perimeter;

pub const MAGIC: &[u8; 8] = b"RFRMGRID";
pub const FORMAT_VERSION: u16 = 1;

const DIGEST_LEN: usize = 32;
const KIND_PLANIMETRIC: u8 = 1;
const KIND_ALTIMETRIC: u8 = 2;

/// Decode and validate a dataset.
pub fn decode(bytes: &[u8]) -> Result<Dataset, DatasetError> {
    if bytes.len() < MAGIC.len() + 2 + DIGEST_LEN {
        return Err(DatasetError::Truncated {
            offset: bytes.len(),
            needed: MAGIC.len() + 2 + DIGEST_LEN - bytes.len(),
        });
    }

    let (body, digest) = bytes.split_at(bytes.len() - DIGEST_LEN);
    let mut reader = ByteReader::new(body);

    if reader.take(MAGIC.len())? != MAGIC {
        return Err(DatasetError::BadMagic);
    }
    let version = reader.u16()?;
    if version != FORMAT_VERSION {
        return Err(DatasetError::UnsupportedVersion {
            found: version,
            expected: FORMAT_VERSION,
        });
    }

    let computed = Sha256::digest(body);
    if computed.as_slice() != digest {
        return Err(DatasetError::ChecksumMismatch);
    }

    let _reserved = reader.u16()?;
    let published = decode_date(reader.u32()?)?;
    let translation = Vector2::new(reader.f64()?, reader.f64()?);
    let fallback_tolerance = reader.f64()?;

    let perimeter_len = reader.u32()? as usize;
    reader.ensure(perimeter_len.saturating_mul(16))?;
    let mut vertices = Vec::with_capacity(perimeter_len);
    for _ in 0..perimeter_len {
        vertices.push(Point2::new(reader.f64()?, reader.f64()?));
    }
    let perimeter = Perimeter::new(vertices)?;

    let grid_count = reader.u32()?;
    let mut planimetric: Option<CorrectionGrid<Vector2<f64>>> = None;
    let mut altimetric: Option<CorrectionGrid<f64>> = None;
    for _ in 0..grid_count {
        let kind = reader.u8()?;
        let components = reader.u8()?;
        let _reserved = reader.u16()?;
        let geometry = read_geometry(&mut reader)?;

        match (kind, components) {
            (KIND_PLANIMETRIC, 2) if planimetric.is_none() => {
                let raw = reader.f32_values(geometry.node_count(), 2)?;
                let values = raw.chunks_exact(2).map(|c| Vector2::new(c[0], c[1])).collect();
                planimetric = Some(CorrectionGrid::new(geometry, values)?);
            }
            (KIND_ALTIMETRIC, 1) if altimetric.is_none() => {
                let values = reader.f32_values(geometry.node_count(), 1)?;
                altimetric = Some(CorrectionGrid::new(geometry, values)?);
            }
            _ => {
                return Err(DatasetError::Invalid(format!(
                    "unexpected grid block (kind {kind}, {components} components)"
                )));
            }
        }
    }

    if reader.remaining() != 0 {
        return Err(DatasetError::Invalid(format!(
            "{} trailing bytes after the last grid",
            reader.remaining()
        )));
    }

    let planimetric = planimetric.ok_or_else(|| DatasetError::Invalid("planimetric grid missing".into()))?;
    let altimetric = altimetric.ok_or_else(|| DatasetError::Invalid("altimetric grid missing".into()))?;

    let metadata = DatasetMetadata {
        version,
        published,
        translation,
        fallback_tolerance,
    };
    let checksum = computed.iter().map(|b| format!("{b:02x}")).collect::<String>();
    Ok(Dataset::new(metadata, planimetric, altimetric, perimeter)?.with_checksum(checksum))
}

/// Encode a dataset. Grid values are stored as `f32`.
pub fn encode(dataset: &Dataset) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&encode_date(dataset.metadata.published).to_le_bytes());
    put_f64(&mut out, dataset.metadata.translation.x);
    put_f64(&mut out, dataset.metadata.translation.y);
    put_f64(&mut out, dataset.metadata.fallback_tolerance);

    let vertices = dataset.perimeter.vertices();
    out.extend_from_slice(&(vertices.len() as u32).to_le_bytes());
    for v in vertices {
        put_f64(&mut out, v.x);
        put_f64(&mut out, v.y);
    }

    out.extend_from_slice(&2u32.to_le_bytes());

    put_grid_header(&mut out, KIND_PLANIMETRIC, 2, dataset.planimetric.geometry());
    for v in dataset.planimetric.values() {
        out.extend_from_slice(&(v.x as f32).to_le_bytes());
        out.extend_from_slice(&(v.y as f32).to_le_bytes());
    }

    put_grid_header(&mut out, KIND_ALTIMETRIC, 1, dataset.altimetric.geometry());
    for v in dataset.altimetric.values() {
        out.extend_from_slice(&(*v as f32).to_le_bytes());
    }

    let digest = Sha256::digest(&out);
    out.extend_from_slice(&digest);
    out
}

fn read_geometry(reader: &mut ByteReader<'_>) -> Result<GridGeometry, DatasetError> {
    let origin = Point2::new(reader.f64()?, reader.f64()?);
    let cell = Vector2::new(reader.f64()?, reader.f64()?);
    let cols = reader.u32()? as usize;
    let rows = reader.u32()? as usize;
    GridGeometry::new(origin, cell, cols, rows)
}

fn put_grid_header(out: &mut Vec<u8>, kind: u8, components: u8, geometry: &GridGeometry) {
    out.push(kind);
    out.push(components);
    out.extend_from_slice(&0u16.to_le_bytes());
    put_f64(out, geometry.origin.x);
    put_f64(out, geometry.origin.y);
    put_f64(out, geometry.cell.x);
    put_f64(out, geometry.cell.y);
    out.extend_from_slice(&(geometry.cols as u32).to_le_bytes());
    out.extend_from_slice(&(geometry.rows as u32).to_le_bytes());
}

fn put_f64(out: &mut Vec<u8>, value: f64) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn decode_date(raw: u32) -> Result<NaiveDate, DatasetError> {
    let year = (raw / 10_000) as i32;
    let month = (raw / 100) % 100;
    let day = raw % 100;
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| DatasetError::Invalid(format!("invalid publication date {raw}")))
}

fn encode_date(date: NaiveDate) -> u32 {
    date.year().max(0) as u32 * 10_000 + date.month() * 100 + date.day()
}

/// Bounds-checked little-endian cursor.
struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn ensure(&self, n: usize) -> Result<(), DatasetError> {
        if n > self.remaining() {
            return Err(DatasetError::Truncated {
                offset: self.offset,
                needed: n - self.remaining(),
            });
        }
        Ok(())
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DatasetError> {
        self.ensure(n)?;
        let slice = &self.bytes[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], DatasetError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    fn u8(&mut self) -> Result<u8, DatasetError> {
        Ok(self.array::<1>()?[0])
    }

    fn u16(&mut self) -> Result<u16, DatasetError> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    fn u32(&mut self) -> Result<u32, DatasetError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn f64(&mut self) -> Result<f64, DatasetError> {
        Ok(f64::from_le_bytes(self.array()?))
    }

    /// Read `nodes * components` `f32` values, widened to `f64`.
    fn f32_values(&mut self, nodes: usize, components: usize) -> Result<Vec<f64>, DatasetError> {
        let count = nodes
            .checked_mul(components)
            .ok_or_else(|| DatasetError::Invalid("grid size overflows".into()))?;
        let raw = self.take(count.saturating_mul(4))?;
        Ok(raw
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]) as f64)
            .collect())
    }
}
