//! Captured screen state for a single pipeline cycle, plus artifact persistence.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::debug;

use crate::errors::AgentError;
use crate::geometry::ScreenGeometry;

/// One capture of the target display. Owned by a single cycle and discarded
/// when that cycle's actions have executed or the cycle aborts.
#[derive(Debug, Clone)]
pub struct Observation {
    /// PNG-encoded capture at physical resolution.
    pub image_bytes: Vec<u8>,
    pub captured_at: DateTime<Local>,
    pub geometry: ScreenGeometry,
}

impl Observation {
    pub fn new(image_bytes: Vec<u8>, geometry: ScreenGeometry) -> Self {
        Self {
            image_bytes,
            captured_at: Local::now(),
            geometry,
        }
    }
}

/// An [`Observation`] with reference markers and a resolution banner drawn in.
/// The source observation is left untouched.
#[derive(Debug, Clone)]
pub struct AnnotatedObservation {
    pub image_bytes: Vec<u8>,
    pub captured_at: DateTime<Local>,
    pub geometry: ScreenGeometry,
}

/// Persist image bytes as `<label>_<YYYYMMDD_HHMMSS>.png` under `dir`.
///
/// The sortable timestamp lets a run be reviewed in chronological order.
/// The timestamp has one-second granularity, so a second artifact with the
/// same label in the same second gets a numeric suffix instead of
/// overwriting the first.
pub fn write_artifact(
    dir: &Path,
    label: &str,
    captured_at: DateTime<Local>,
    bytes: &[u8],
) -> Result<PathBuf, AgentError> {
    fs::create_dir_all(dir).map_err(|e| {
        AgentError::InvalidArgument(format!(
            "cannot create artifact directory {}: {e}",
            dir.display()
        ))
    })?;

    let stem = format!("{label}_{}", captured_at.format("%Y%m%d_%H%M%S"));
    let mut path = dir.join(format!("{stem}.png"));
    let mut suffix = 1;
    while path.exists() {
        path = dir.join(format!("{stem}_{suffix}.png"));
        suffix += 1;
    }
    fs::write(&path, bytes).map_err(|e| {
        AgentError::InvalidArgument(format!("cannot write artifact {}: {e}", path.display()))
    })?;

    debug!(path = %path.display(), size = bytes.len(), "artifact written");
    Ok(path)
}
