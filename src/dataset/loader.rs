//! Lazy, process-wide dataset loading.
//!
//! The dataset is read and validated at most once per cache. Concurrent first
//! callers serialize on a mutex; everyone after that reads the `OnceLock`
//! without locking. A failed load leaves the cache empty, so a later call
//! retries against the (possibly re-provisioned) source.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Instant;

use tracing::{debug, warn};

use crate::dataset::{Dataset, decode, describe_geometry};
use crate::error::DatasetError;

/// The correction dataset shipped with the crate.
pub static EMBEDDED_DATASET: &[u8] = include_bytes!("../../data/swiss-reframe.rfg");

/// Where the dataset bytes come from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DatasetSource {
    #[default]
    Embedded,
    File(PathBuf),
}

impl DatasetSource {
    /// Read and decode the dataset. No caching.
    pub fn load(&self) -> Result<Dataset, DatasetError> {
        match self {
            DatasetSource::Embedded => decode(EMBEDDED_DATASET),
            DatasetSource::File(path) => {
                let bytes = fs::read(path).map_err(|e| match e.kind() {
                    ErrorKind::NotFound => DatasetError::Missing(path.display().to_string()),
                    _ => DatasetError::Io(e),
                })?;
                decode(&bytes)
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DatasetSource::Embedded => "embedded".to_string(),
            DatasetSource::File(path) => path.display().to_string(),
        }
    }
}

/// Load-once holder for a dataset.
#[derive(Debug)]
pub struct DatasetCache {
    source: DatasetSource,
    slot: OnceLock<Arc<Dataset>>,
    load_guard: Mutex<()>,
    loads: AtomicUsize,
}

impl DatasetCache {
    pub fn new(source: DatasetSource) -> Self {
        Self {
            source,
            slot: OnceLock::new(),
            load_guard: Mutex::new(()),
            loads: AtomicUsize::new(0),
        }
    }

    /// A cache that already holds `dataset` and never reads its source.
    pub fn preloaded(dataset: Dataset) -> Self {
        let cache = Self::new(DatasetSource::Embedded);
        let _ = cache.slot.set(Arc::new(dataset));
        cache
    }

    pub fn source(&self) -> &DatasetSource {
        &self.source
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Number of successful reads of the source.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Acquire)
    }

    /// Return the cached dataset, loading it first if needed.
    pub fn get_or_load(&self) -> Result<Arc<Dataset>, DatasetError> {
        if let Some(dataset) = self.slot.get() {
            return Ok(Arc::clone(dataset));
        }

        // Loading holds no shared state, so a poisoned guard is still usable.
        let _guard = self.load_guard.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(dataset) = self.slot.get() {
            return Ok(Arc::clone(dataset));
        }

        let started = Instant::now();
        let dataset = match self.source.load() {
            Ok(dataset) => Arc::new(dataset),
            Err(err) => {
                warn!(source = %self.source.describe(), error = %err, "correction dataset unavailable");
                return Err(err);
            }
        };
        self.loads.fetch_add(1, Ordering::AcqRel);

        debug!(
            source = %self.source.describe(),
            version = dataset.metadata.version,
            checksum = dataset.checksum.as_deref().unwrap_or("-"),
            planimetric = %describe_geometry(dataset.planimetric.geometry()),
            altimetric = %describe_geometry(dataset.altimetric.geometry()),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "correction dataset loaded"
        );

        let _ = self.slot.set(Arc::clone(&dataset));
        Ok(dataset)
    }
}
