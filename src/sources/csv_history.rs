//! CSV-backed price history.
//!
//! One file per asset, `<dir>/<symbol>.csv`, with a header row and columns
//! `timestamp` (unix seconds), `price`, and optionally `tvl_change_7d` and
//! `apy_cv`.

use super::HistorySource;
use crate::calibration::normalize_symbol;
use crate::utils::types::{PricePoint, PriceSeries};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: i64,
    price: f64,
    #[serde(default)]
    tvl_change_7d: Option<f64>,
    #[serde(default)]
    apy_cv: Option<f64>,
}

/// Reads price history from a directory of per-asset CSV files.
#[derive(Debug, Clone)]
pub struct CsvHistorySource {
    dir: PathBuf,
}

impl CsvHistorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", normalize_symbol(symbol)))
    }

    /// Load the whole file, sorted oldest first. A missing file is an empty
    /// history rather than an error.
    pub fn load(path: &Path) -> Result<PriceSeries> {
        if !path.exists() {
            log::debug!("no history file at {}", path.display());
            return Ok(Vec::new());
        }

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(path)
            .map_err(|e| Error::DataError(format!("CSV read error for {}: {e}", path.display())))?;

        let mut series = Vec::new();
        for rec in rdr.deserialize::<CsvRow>() {
            let row = rec.map_err(|e| Error::DataError(format!("CSV parse error in {}: {e}", path.display())))?;
            let timestamp = Utc
                .timestamp_opt(row.timestamp, 0)
                .single()
                .ok_or_else(|| Error::DataError(format!("invalid timestamp {} in {}", row.timestamp, path.display())))?;
            let mut point = PricePoint::new(timestamp, row.price);
            point.tvl_change_7d = row.tvl_change_7d;
            point.apy_cv = row.apy_cv;
            series.push(point);
        }

        series.sort_by_key(|p| p.timestamp);
        Ok(series)
    }
}

#[async_trait]
impl HistorySource for CsvHistorySource {
    async fn fetch_history(&self, symbol: &str, max_points: usize) -> Result<PriceSeries> {
        let path = self.path_for(symbol);
        let mut series = tokio::task::spawn_blocking(move || Self::load(&path))
            .await
            .map_err(|e| Error::Other(format!("history loader panicked: {e}")))??;

        if series.len() > max_points {
            series.drain(..series.len() - max_points);
        }
        Ok(series)
    }
}
