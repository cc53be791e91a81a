//! Persisted collection batches.
//!
//! `fetch` writes a RunBatch to disk; `rescore` reads one back and re-scores
//! it without touching the network. A malformed file is reported and treated
//! as "no data" so the operator sees an empty result instead of a crash.

use crate::error::{AnalyzerError, Result};
use crate::types::record::RunBatch;
use std::path::Path;
use tracing::{info, warn};

pub fn save_batch(path: &Path, batch: &RunBatch) -> Result<()> {
    let json = serde_json::to_string_pretty(batch)?;
    std::fs::write(path, json)?;
    info!(
        "saved {} records for {} to {}",
        batch.repository_count,
        batch.organization,
        path.display()
    );
    Ok(())
}

pub fn load_batch(path: &Path) -> Result<RunBatch> {
    if !path.exists() {
        return Err(AnalyzerError::CacheNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| AnalyzerError::CacheParse(format!("{}: {e}", path.display())))
}

/// Load a batch, degrading a malformed file to an empty batch with a warning.
/// A missing file stays an error: pointing at the wrong path is an operator
/// mistake, not bad data.
pub fn load_batch_or_empty(path: &Path) -> Result<RunBatch> {
    match load_batch(path) {
        Ok(batch) => Ok(batch),
        Err(err @ AnalyzerError::CacheNotFound(_)) => Err(err),
        Err(AnalyzerError::CacheParse(message)) => {
            warn!("{message}; continuing with no data");
            Ok(RunBatch::empty("unknown"))
        }
        Err(err) => Err(err),
    }
}
