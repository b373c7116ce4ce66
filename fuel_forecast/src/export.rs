//! Forecast table and its CSV download

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// File name offered for the forecast download
pub const FORECAST_FILE_NAME: &str = "forecast.csv";
/// MIME type of the forecast download
pub const FORECAST_MIME: &str = "text/csv";
/// Header row of the forecast CSV
pub const FORECAST_HEADER: [&str; 4] = ["Year", "Forecast", "Lower_CI", "Upper_CI"];

/// One forecast year in original units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    #[serde(rename = "Year")]
    pub year: i64,
    #[serde(rename = "Forecast")]
    pub forecast: f64,
    #[serde(rename = "Lower_CI")]
    pub lower_ci: f64,
    #[serde(rename = "Upper_CI")]
    pub upper_ci: f64,
}

/// Forecast rows for consecutive years
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastTable {
    rows: Vec<ForecastRow>,
}

impl ForecastTable {
    /// Create a table, checking that years follow each other one by one
    pub fn new(rows: Vec<ForecastRow>) -> Result<Self> {
        if let Some(pair) = rows.windows(2).find(|w| w[1].year != w[0].year + 1) {
            return Err(ForecastError::ValidationError(format!(
                "Forecast years must be consecutive, found {} after {}",
                pair[1].year, pair[0].year
            )));
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn years(&self) -> Vec<i64> {
        self.rows.iter().map(|r| r.year).collect()
    }

    /// Write the table as CSV, header first
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv_writer.write_record(FORECAST_HEADER)?;
        for row in &self.rows {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(buffer)
    }

    /// Package the table as the `forecast.csv` download
    pub fn download(&self) -> Result<Download> {
        Ok(Download {
            file_name: FORECAST_FILE_NAME.to_string(),
            mime: FORECAST_MIME.to_string(),
            bytes: self.to_csv_bytes()?,
        })
    }
}

/// A file offered to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Download {
    /// Write the bytes to `path`
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut file = File::create(path)?;
        file.write_all(&self.bytes)?;
        info!(path = %path.display(), bytes = self.bytes.len(), "saved {}", self.file_name);
        Ok(())
    }
}
