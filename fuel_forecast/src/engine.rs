//! Log-scale ARIMA forecasting of a yearly series

use crate::config::ModelConfig;
use crate::data::YearSeries;
use crate::error::{ForecastError, Result};
use crate::export::{ForecastRow, ForecastTable};
use crate::models::arima::{ArimaFit, ArimaModel};
use crate::models::{z_score, ForecastModel, TrainedForecastModel};
use tracing::{debug, info};

/// Fitted model plus the back-transformed forecast table
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastOutcome {
    /// Parameters estimated on the log series
    pub fit: ArimaFit,
    /// One row per forecast year, in original units
    pub table: ForecastTable,
}

/// Fits ARIMA on `ln(value)` and exponentiates forecasts back
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastEngine {
    confidence_level: f64,
    /// Optimizer iteration cap; `None` keeps the model's own default
    iteration_budget: Option<usize>,
}

impl ForecastEngine {
    pub fn new(confidence_level: f64) -> Result<Self> {
        z_score(confidence_level)?;
        Ok(Self {
            confidence_level,
            iteration_budget: None,
        })
    }

    /// Cap the likelihood optimizer at `iterations` steps per fit
    pub fn with_iteration_budget(mut self, iterations: usize) -> Self {
        self.iteration_budget = Some(iterations);
        self
    }

    /// Fit the configured order and forecast `config.horizon()` years past the last one
    pub fn run(&self, series: &YearSeries, config: &ModelConfig) -> Result<ForecastOutcome> {
        let last_year = series
            .last_year()
            .ok_or_else(|| ForecastError::DataError("Cannot forecast an empty series".to_string()))?;
        if let Some((year, value)) = series.points().find(|(_, v)| !(*v > 0.0)) {
            return Err(ForecastError::DataError(format!(
                "Log transform needs positive values, got {} for {}",
                value, year
            )));
        }

        let logged: Vec<f64> = series.values().iter().map(|v| v.ln()).collect();
        let (p, d, q) = config.order();
        let mut model = ArimaModel::new(p, d, q);
        if let Some(iterations) = self.iteration_budget {
            model = model.with_iteration_budget(iterations);
        }
        debug!(model = model.name(), observations = logged.len(), "fitting log series");

        let trained = model.train(&logged)?;
        let forecast = trained
            .forecast(config.horizon(), self.confidence_level)?
            .map_scale(f64::exp);

        let rows = forecast
            .values()
            .iter()
            .zip(forecast.intervals())
            .zip(1_i64..)
            .map(|((&value, &(lower, upper)), step)| ForecastRow {
                year: last_year + step,
                forecast: value,
                lower_ci: lower,
                upper_ci: upper,
            })
            .collect();
        let table = ForecastTable::new(rows)?;

        info!(
            model = model.name(),
            horizon = config.horizon(),
            first_year = last_year + 1,
            "forecast ready"
        );
        Ok(ForecastOutcome {
            fit: trained.fit().clone(),
            table,
        })
    }
}

impl Default for ForecastEngine {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
            iteration_budget: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_values() {
        let series = YearSeries::new(vec![(2000, 1.0), (2001, 0.0), (2002, 2.0)]).unwrap();
        let err = ForecastEngine::default()
            .run(&series, &ModelConfig::default())
            .unwrap_err();
        assert!(matches!(err, ForecastError::DataError(_)));
    }

    #[test]
    fn rejects_bad_confidence_level() {
        assert!(ForecastEngine::new(1.5).is_err());
        assert!(ForecastEngine::new(0.9).is_ok());
    }
}
