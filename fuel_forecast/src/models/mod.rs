//! Forecasting models for yearly series

use crate::error::{ForecastError, Result};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use std::fmt::Debug;

/// Forecast result containing predicted values and their intervals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    /// Forecasted values
    values: Vec<f64>,
    /// Standard error of each forecast
    std_errors: Vec<f64>,
    /// (lower, upper) bounds of the confidence interval
    intervals: Vec<(f64, f64)>,
    /// Coverage of the intervals
    confidence_level: f64,
}

impl ForecastResult {
    /// Create a forecast with symmetric normal intervals `value ± z·se`
    pub fn new_with_intervals(
        values: Vec<f64>,
        std_errors: Vec<f64>,
        confidence_level: f64,
    ) -> Result<Self> {
        if values.len() != std_errors.len() {
            return Err(ForecastError::ValidationError(format!(
                "Values length ({}) doesn't match standard errors length ({})",
                values.len(),
                std_errors.len()
            )));
        }
        if std_errors.iter().any(|se| !(se.is_finite() && *se >= 0.0)) {
            return Err(ForecastError::ValidationError(
                "Standard errors must be finite and non-negative".to_string(),
            ));
        }

        let z = z_score(confidence_level)?;
        let intervals = values
            .iter()
            .zip(&std_errors)
            .map(|(v, se)| (v - z * se, v + z * se))
            .collect();

        Ok(Self {
            values,
            std_errors,
            intervals,
            confidence_level,
        })
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the standard errors
    pub fn std_errors(&self) -> &[f64] {
        &self.std_errors
    }

    /// Get the confidence intervals
    pub fn intervals(&self) -> &[(f64, f64)] {
        &self.intervals
    }

    /// Get the number of periods forecasted
    pub fn horizons(&self) -> usize {
        self.values.len()
    }

    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    /// Apply an increasing transform to the values and both bounds.
    ///
    /// Standard errors refer to the original scale and are kept as-is.
    pub fn map_scale<F: Fn(f64) -> f64>(&self, f: F) -> Self {
        Self {
            values: self.values.iter().map(|&v| f(v)).collect(),
            std_errors: self.std_errors.clone(),
            intervals: self
                .intervals
                .iter()
                .map(|&(lo, hi)| (f(lo), f(hi)))
                .collect(),
            confidence_level: self.confidence_level,
        }
    }
}

/// Two-sided standard normal critical value for `confidence_level`
pub fn z_score(confidence_level: f64) -> Result<f64> {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "Confidence level must be between 0 and 1, got {}",
            confidence_level
        )));
    }
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::ModelError(format!("standard normal: {}", e)))?;
    Ok(normal.inverse_cdf(0.5 + confidence_level / 2.0))
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Forecast `horizons` future periods with intervals at `confidence_level`
    fn forecast(&self, horizons: usize, confidence_level: f64) -> Result<ForecastResult>;

    /// In-sample one-step-ahead prediction errors
    fn residuals(&self) -> &[f64];

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a series of values
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on the observations, oldest first
    fn train(&self, data: &[f64]) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod arima;
