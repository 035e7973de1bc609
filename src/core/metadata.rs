//! Dataset descriptor and metadata record for a generated product.
//!
//! Both records land next to the raster as `{id}.dataset.json` and
//! `{id}.met.json`. They are staged under temporary names and only moved into
//! place once both have been written, so a failure leaves neither behind.

use crate::types::{DerivedRaster, ProductId, So2Error, So2Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const MAX_VALUE_KEY: &str = "max_val";
pub const PERCENTILE_90_KEY: &str = "90_percentile";

/// Summary statistics over the valid pixels of a derived raster
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterStatistics {
    pub max_val: f64,
    pub percentile_90: f64,
    pub valid_pixels: usize,
}

impl RasterStatistics {
    /// Invalid pixels are skipped; with no valid pixel both statistics are 0.
    pub fn compute(raster: &DerivedRaster) -> Self {
        let mut values = raster.valid_values();
        let valid_pixels = values.len();
        let max_val = values.iter().copied().fold(None, |acc: Option<f64>, v| {
            Some(acc.map_or(v, |m| m.max(v)))
        });
        let percentile_90 = percentile(&mut values, 90.0);

        Self {
            max_val: max_val.unwrap_or(0.0),
            percentile_90: percentile_90.unwrap_or(0.0),
            valid_pixels,
        }
    }
}

/// q-th percentile with linear interpolation between closest ranks
pub fn percentile(values: &mut [f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));

    let rank = (q.clamp(0.0, 100.0) / 100.0) * (values.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;

    Some(values[lower] + (values[upper] - values[lower]) * weight)
}

/// `{id}.dataset.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    pub label: String,
    pub starttime: String,
    pub endtime: String,
    pub location: Value,
    pub version: String,
}

impl DatasetDescriptor {
    pub fn new(id: &ProductId, starttime: &str, endtime: &str, location: &Value, version: &str) -> Self {
        Self {
            label: id.to_string(),
            starttime: starttime.to_string(),
            endtime: endtime.to_string(),
            location: location.clone(),
            version: version.to_string(),
        }
    }
}

/// Caller metadata plus the raster statistics, for `{id}.met.json`
pub fn build_metadata_record(base: &Map<String, Value>, stats: &RasterStatistics) -> Map<String, Value> {
    let mut met = base.clone();
    met.insert(MAX_VALUE_KEY.to_string(), Value::from(stats.max_val));
    met.insert(PERCENTILE_90_KEY.to_string(), Value::from(stats.percentile_90));
    met
}

/// Where the two records were written
#[derive(Debug, Clone)]
pub struct RecordPaths {
    pub dataset: PathBuf,
    pub metadata: PathBuf,
}

impl RecordPaths {
    pub fn for_product(product_dir: &Path, id: &ProductId) -> Self {
        Self {
            dataset: product_dir.join(id.file_name("dataset.json")),
            metadata: product_dir.join(id.file_name("met.json")),
        }
    }
}

/// Write both records, then confirm both exist.
pub fn save_product_records(
    product_dir: &Path,
    id: &ProductId,
    dataset: &DatasetDescriptor,
    met: &Map<String, Value>,
) -> So2Result<RecordPaths> {
    std::fs::create_dir_all(product_dir)?;
    let paths = RecordPaths::for_product(product_dir, id);

    let staged_dataset = staging_path(&paths.dataset);
    let staged_met = staging_path(&paths.metadata);

    let staged = write_json(&staged_dataset, dataset).and_then(|_| write_json(&staged_met, met));
    let committed = staged
        .and_then(|_| std::fs::rename(&staged_dataset, &paths.dataset).map_err(So2Error::from))
        .and_then(|_| std::fs::rename(&staged_met, &paths.metadata).map_err(So2Error::from));

    if let Err(e) = committed {
        discard_records(&paths);
        return Err(So2Error::MetadataWrite(format!(
            "failed writing records for {}: {}",
            id, e
        )));
    }

    verify_records(&paths)?;

    log::info!(
        "Metadata saved to: {} and {}",
        paths.dataset.display(),
        paths.metadata.display()
    );
    Ok(paths)
}

/// Both records must be present; otherwise neither is left behind.
fn verify_records(paths: &RecordPaths) -> So2Result<()> {
    if let Some(missing) = [&paths.dataset, &paths.metadata]
        .into_iter()
        .find(|path| !path.is_file())
    {
        let message = format!("{} missing after write", missing.display());
        discard_records(paths);
        return Err(So2Error::MetadataWrite(message));
    }
    Ok(())
}

/// Remove both records and their staged copies, ignoring files that are absent
fn discard_records(paths: &RecordPaths) {
    for path in [
        staging_path(&paths.dataset),
        staging_path(&paths.metadata),
        paths.dataset.clone(),
        paths.metadata.clone(),
    ] {
        if let Err(e) = std::fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Failed to remove {}: {}", path.display(), e);
            }
        }
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut staged = path.as_os_str().to_owned();
    staged.push(".partial");
    PathBuf::from(staged)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> So2Result<()> {
    let content = serde_json::to_string(value)?;
    std::fs::write(path, content)?;
    Ok(())
}
