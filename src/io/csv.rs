use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::types::Homepass;

/// One row of the ingestion contract: `(id, lon, lat)` in degrees.
#[derive(Debug, Deserialize)]
struct PointRecord {
    id: u64,
    lon: f64,
    lat: f64,
}

/// Read homepass points from a CSV file with `id,lon,lat` headers.
pub fn read_points(path: &Path) -> Result<Vec<Homepass>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open point file {}", path.display()))?;

    let mut points = Vec::new();
    for record in reader.deserialize() {
        let record: PointRecord = record
            .with_context(|| format!("malformed point record in {}", path.display()))?;
        points.push(Homepass::new(record.id, record.lon, record.lat));
    }

    if points.is_empty() {
        bail!("no point records in {}", path.display());
    }
    Ok(points)
}
