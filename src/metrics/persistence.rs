//! Metrics history file
//!
//! A single JSON document `{ version, savedAt, history }`, written atomically.
//! A missing file means "no history yet" and is not an error.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::types::MetricsSnapshot;
use crate::utils::atomic_write_with;

/// Current on-disk format version
pub const METRICS_FILE_VERSION: u32 = 1;

/// File name under the state directory
pub const METRICS_FILE_NAME: &str = "metrics-history.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsFile {
    pub version: u32,
    pub saved_at: i64,
    pub history: Vec<MetricsSnapshot>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MetricsFileRef<'a> {
    version: u32,
    saved_at: i64,
    history: &'a [MetricsSnapshot],
}

/// Loads and saves the metrics history at a fixed path
#[derive(Debug, Clone)]
pub struct MetricsPersistence {
    path: PathBuf,
}

impl MetricsPersistence {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Persistence at `<state_dir>/metrics-history.json`
    pub fn in_state_dir<P: AsRef<Path>>(state_dir: P) -> Self {
        Self::new(state_dir.as_ref().join(METRICS_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved history; `Ok(vec![])` when the file does not exist
    pub fn load(&self) -> Result<Vec<MetricsSnapshot>, PersistenceError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let file: MetricsFile = serde_json::from_str(&content)?;
        if file.version > METRICS_FILE_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                found: file.version,
                supported: METRICS_FILE_VERSION,
            });
        }

        Ok(file.history)
    }

    pub fn save(&self, history: &[MetricsSnapshot], saved_at: i64) -> Result<(), PersistenceError> {
        let document = MetricsFileRef {
            version: METRICS_FILE_VERSION,
            saved_at,
            history,
        };

        atomic_write_with(&self.path, |writer| {
            serde_json::to_writer_pretty(writer, &document).map_err(io::Error::from)
        })?;

        Ok(())
    }
}
