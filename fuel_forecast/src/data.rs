//! Yearly fuel consumption series: loading, aggregation and caching

use crate::error::{ForecastError, Result};
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Label of the year key in loaded series
pub const YEAR_LABEL: &str = "Year";
/// Label of the averaged consumption values in loaded series
pub const VALUE_LABEL: &str = "Avg_Fuel_Consumption";

/// Default name of the year column in the input file
pub const DEFAULT_YEAR_COLUMN: &str = "YEAR";
/// Default name of the combined consumption column in the input file
pub const DEFAULT_VALUE_COLUMN: &str = "COMB (L/100 km)";

/// Names of the input columns to aggregate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnSpec {
    pub year: String,
    pub value: String,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self {
            year: DEFAULT_YEAR_COLUMN.to_string(),
            value: DEFAULT_VALUE_COLUMN.to_string(),
        }
    }
}

/// One averaged value per year, ordered by strictly increasing year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSeries {
    years: Vec<i64>,
    values: Vec<f64>,
}

impl YearSeries {
    /// Create a series from `(year, value)` points already sorted by year
    pub fn new(points: Vec<(i64, f64)>) -> Result<Self> {
        if let Some(pair) = points.windows(2).find(|w| w[1].0 <= w[0].0) {
            return Err(ForecastError::DataError(format!(
                "Years must be strictly increasing, found {} after {}",
                pair[1].0, pair[0].0
            )));
        }
        let (years, values) = points.into_iter().unzip();
        Ok(Self { years, values })
    }

    /// Get the years as a slice
    pub fn years(&self) -> &[i64] {
        &self.years
    }

    /// Get the values as a slice
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate over `(year, value)` points
    pub fn points(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.years.iter().copied().zip(self.values.iter().copied())
    }

    /// Value observed for `year`, if any
    pub fn get(&self, year: i64) -> Option<f64> {
        self.years
            .binary_search(&year)
            .ok()
            .map(|idx| self.values[idx])
    }

    /// The most recent year in the series
    pub fn last_year(&self) -> Option<i64> {
        self.years.last().copied()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Get the number of years in the series
    pub fn len(&self) -> usize {
        self.years.len()
    }
}

/// Data loader for yearly series
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file and average `columns.value` per `columns.year`
    pub fn from_csv<P: AsRef<Path>>(path: P, columns: &ColumnSpec) -> Result<YearSeries> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(Some(1000))
            .has_header(true)
            .finish()?;

        info!(path = %path.display(), rows = df.height(), "loaded consumption data");
        Self::aggregate(df, columns)
    }

    /// Aggregate in-memory `(year, value)` rows the same way as a file
    pub fn from_records(records: &[(i64, f64)]) -> Result<YearSeries> {
        let columns = ColumnSpec::default();
        let years: Vec<i64> = records.iter().map(|(y, _)| *y).collect();
        let values: Vec<f64> = records.iter().map(|(_, v)| *v).collect();
        let df = DataFrame::new(vec![
            Series::new(&columns.year, years),
            Series::new(&columns.value, values),
        ])?;

        Self::aggregate(df, &columns)
    }

    /// Group rows by year and average the value column
    fn aggregate(df: DataFrame, columns: &ColumnSpec) -> Result<YearSeries> {
        for name in [&columns.year, &columns.value] {
            if df.column(name).is_err() {
                return Err(ForecastError::DataError(format!(
                    "Column '{}' not found in data",
                    name
                )));
            }
        }

        let grouped = df
            .lazy()
            .groupby([col(&columns.year)])
            .agg([col(&columns.value).mean().alias(VALUE_LABEL)])
            .collect()?;

        let years = grouped.column(&columns.year)?.cast(&DataType::Int64)?;
        let values = grouped.column(VALUE_LABEL)?.cast(&DataType::Float64)?;

        let mut points: Vec<(i64, f64)> = years
            .i64()?
            .into_iter()
            .zip(values.f64()?.into_iter())
            .filter_map(|(year, value)| Some((year?, value?)))
            .collect();
        points.sort_by_key(|(year, _)| *year);

        debug!(years = points.len(), "aggregated consumption by year");
        YearSeries::new(points)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    path: PathBuf,
    columns: ColumnSpec,
}

/// Read-through cache over [`DataLoader::from_csv`], keyed by its inputs
#[derive(Debug, Default)]
pub struct LoaderCache {
    entries: HashMap<CacheKey, Arc<YearSeries>>,
    hits: usize,
    misses: usize,
}

impl LoaderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached series for these inputs, loading it on first use
    pub fn get_or_load<P: AsRef<Path>>(
        &mut self,
        path: P,
        columns: &ColumnSpec,
    ) -> Result<Arc<YearSeries>> {
        let key = CacheKey {
            path: path.as_ref().to_path_buf(),
            columns: columns.clone(),
        };

        if let Some(series) = self.entries.get(&key) {
            self.hits += 1;
            debug!(path = %key.path.display(), "loader cache hit");
            return Ok(Arc::clone(series));
        }

        self.misses += 1;
        debug!(path = %key.path.display(), "loader cache miss");
        let series = Arc::new(DataLoader::from_csv(&key.path, columns)?);
        self.entries.insert(key, Arc::clone(&series));
        Ok(series)
    }

    /// Drop every cached series
    pub fn invalidate(&mut self) {
        self.entries.clear();
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
