//! OSSL Snapshot Loading
//!
//! Loads the Open Soil Spectral Library snapshot with Polars and flattens it
//! into a read-only vector of georeferenced samples. The snapshot is either a
//! Parquet file (preferred) or a CSV export; the format is picked by file
//! extension.
//!
//! Column names follow the OSSL conventions. The organic carbon value for a
//! sample is the first non-null of three measurement columns, ISO method
//! first, matching the upstream dataset's own fallback order. Rows without
//! coordinates or without any carbon value are dropped during ingestion.

use anyhow::{bail, Context, Result};
use polars::prelude::*;

const COL_SAMPLE_ID: &str = "id.layer_uuid_txt";
const COL_LATITUDE: &str = "latitude.point_wgs84_dd";
const COL_LONGITUDE: &str = "longitude.point_wgs84_dd";

/// Organic carbon columns, in fallback order.
const CARBON_COLUMNS: [&str; 3] = [
    "oc_iso.10694_w.pct",
    "oc_usda.c1059_w.pct",
    "oc_usda.c729_w.pct",
];

/// A single georeferenced soil organic carbon measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub sample_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub carbon_pct: f64,
}

/// The preloaded soil sample table.
///
/// Loaded once at process start and shared read-only across request handlers;
/// sample order is the snapshot's row order and is the tie-break order for
/// equidistant matches.
pub struct SoilDataset {
    samples: Vec<Sample>,
}

impl SoilDataset {
    /// Build a dataset from already-materialized samples.
    pub fn from_samples(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Load the OSSL snapshot from a Parquet or CSV file.
    ///
    /// Any failure here (missing file, missing column, wrong dtype) is fatal
    /// at boot; there is no partial load.
    pub fn load(path: &str) -> Result<Self> {
        let df = if path.ends_with(".parquet") {
            LazyFrame::scan_parquet(path, Default::default())
                .with_context(|| format!("Failed to scan parquet: {}", path))?
                .collect()
                .with_context(|| format!("Failed to load OSSL snapshot: {}", path))?
        } else {
            CsvReadOptions::default()
                .with_has_header(true)
                .try_into_reader_with_file_path(Some(path.into()))
                .with_context(|| format!("Failed to create CSV reader: {}", path))?
                .finish()
                .with_context(|| format!("Failed to load OSSL snapshot: {}", path))?
        };

        Self::from_frame(&df)
    }

    /// Flatten a snapshot DataFrame into the sample vector.
    fn from_frame(df: &DataFrame) -> Result<Self> {
        let id_col = df
            .column(COL_SAMPLE_ID)
            .with_context(|| format!("Column '{}' not found", COL_SAMPLE_ID))?
            .str()
            .with_context(|| format!("Column '{}' is not string type", COL_SAMPLE_ID))?;

        let lat_col = df
            .column(COL_LATITUDE)
            .with_context(|| format!("Column '{}' not found", COL_LATITUDE))?
            .f64()
            .with_context(|| format!("Column '{}' is not float type", COL_LATITUDE))?;

        let lon_col = df
            .column(COL_LONGITUDE)
            .with_context(|| format!("Column '{}' not found", COL_LONGITUDE))?
            .f64()
            .with_context(|| format!("Column '{}' is not float type", COL_LONGITUDE))?;

        // Not every snapshot carries all three measurement methods; require
        // at least one.
        let mut carbon_cols = Vec::new();
        for name in CARBON_COLUMNS {
            if let Ok(col) = df.column(name) {
                carbon_cols.push(
                    col.f64()
                        .with_context(|| format!("Column '{}' is not float type", name))?,
                );
            }
        }
        if carbon_cols.is_empty() {
            bail!(
                "No organic carbon column found in snapshot (expected one of {:?})",
                CARBON_COLUMNS
            );
        }

        let mut samples = Vec::with_capacity(df.height());
        for idx in 0..df.height() {
            let (Some(latitude), Some(longitude)) = (lat_col.get(idx), lon_col.get(idx)) else {
                continue;
            };
            let Some(carbon_pct) = carbon_cols.iter().find_map(|col| col.get(idx)) else {
                continue;
            };
            let Some(sample_id) = id_col.get(idx) else {
                continue;
            };

            samples.push(Sample {
                sample_id: sample_id.to_string(),
                latitude,
                longitude,
                carbon_pct,
            });
        }

        tracing::info!(
            "Loaded {} usable samples ({} rows in snapshot)",
            samples.len(),
            df.height()
        );

        Ok(Self { samples })
    }

    /// Samples in snapshot row order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
