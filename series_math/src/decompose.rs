//! Classical seasonal decomposition
//!
//! Splits a series into trend, seasonal and residual components using a
//! centred moving average for the trend and per-position averages of the
//! detrended series for the seasonal pattern.
//!
//! With a period of 1 the moving average is the identity, so the trend
//! reproduces the observations and the seasonal and residual components
//! are identically zero.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// How the components combine into the observed series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DecompositionModel {
    /// observed = trend + seasonal + residual
    #[default]
    Additive,
    /// observed = trend * seasonal * residual
    Multiplicative,
}

/// Result of a seasonal decomposition.
///
/// Trend and residual values are NaN where the centred moving average
/// window does not fit inside the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    pub observed: Vec<f64>,
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<f64>,
    pub period: usize,
    pub model: DecompositionModel,
}

/// Decompose `data` with the given seasonal `period`.
pub fn seasonal_decompose(
    data: &[f64],
    period: usize,
    model: DecompositionModel,
) -> Result<Decomposition> {
    if period == 0 {
        return Err(MathError::InvalidInput(
            "period must be a positive integer".to_string(),
        ));
    }
    if data.iter().any(|v| !v.is_finite()) {
        return Err(MathError::InvalidInput(
            "This function does not handle missing values".to_string(),
        ));
    }
    if model == DecompositionModel::Multiplicative && data.iter().any(|&v| v <= 0.0) {
        return Err(MathError::InvalidInput(
            "Multiplicative seasonality is not appropriate for zero and negative values"
                .to_string(),
        ));
    }
    let n = data.len();
    if n < 2 * period {
        return Err(MathError::InsufficientData(format!(
            "x must have 2 complete cycles requires {} observations. x only has {} observation(s)",
            2 * period,
            n
        )));
    }

    let trend = centred_moving_average(data, period);

    let detrended: Vec<f64> = data
        .iter()
        .zip(&trend)
        .map(|(&x, &t)| match model {
            DecompositionModel::Additive => x - t,
            DecompositionModel::Multiplicative => x / t,
        })
        .collect();

    let mut period_averages: Vec<f64> = (0..period)
        .map(|pos| {
            let finite: Vec<f64> = detrended
                .iter()
                .skip(pos)
                .step_by(period)
                .copied()
                .filter(|v| v.is_finite())
                .collect();
            if finite.is_empty() {
                f64::NAN
            } else {
                finite.iter().sum::<f64>() / finite.len() as f64
            }
        })
        .collect();

    let centre = period_averages.iter().sum::<f64>() / period as f64;
    for avg in period_averages.iter_mut() {
        match model {
            DecompositionModel::Additive => *avg -= centre,
            DecompositionModel::Multiplicative => *avg /= centre,
        }
    }

    let seasonal: Vec<f64> = (0..n).map(|i| period_averages[i % period]).collect();

    let residual: Vec<f64> = detrended
        .iter()
        .zip(&seasonal)
        .map(|(&d, &s)| match model {
            DecompositionModel::Additive => d - s,
            DecompositionModel::Multiplicative => d / s,
        })
        .collect();

    Ok(Decomposition {
        observed: data.to_vec(),
        trend,
        seasonal,
        residual,
        period,
        model,
    })
}

/// Centred moving average; even periods use the 2×m filter with half
/// weights at both ends.
fn centred_moving_average(data: &[f64], period: usize) -> Vec<f64> {
    let weights: Vec<f64> = if period % 2 == 0 {
        let mut w = vec![1.0 / period as f64; period + 1];
        w[0] = 0.5 / period as f64;
        w[period] = 0.5 / period as f64;
        w
    } else {
        vec![1.0 / period as f64; period]
    };

    let half = weights.len() / 2;
    let n = data.len();
    let mut trend = vec![f64::NAN; n];
    if n < weights.len() {
        return trend;
    }
    for (i, slot) in trend.iter_mut().enumerate().take(n - half).skip(half) {
        *slot = weights
            .iter()
            .enumerate()
            .map(|(j, w)| w * data[i + j - half])
            .sum();
    }
    trend
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_period_one_is_degenerate() {
        let data = [10.0, 12.0, 11.0, 9.0];
        let result = seasonal_decompose(&data, 1, DecompositionModel::Additive).unwrap();

        assert_eq!(result.observed, data.to_vec());
        assert_eq!(result.trend, data.to_vec());
        assert!(result.seasonal.iter().all(|&s| s == 0.0));
        assert!(result.residual.iter().all(|&r| r == 0.0));
    }

    #[test]
    fn test_additive_recovers_pattern() {
        let pattern = [1.0, -1.0, 0.5, -0.5];
        let data: Vec<f64> = (0..16).map(|i| 10.0 + pattern[i % 4]).collect();
        let result = seasonal_decompose(&data, 4, DecompositionModel::Additive).unwrap();

        assert!(result.trend[0].is_nan());
        assert!(result.trend[1].is_nan());
        assert_relative_eq!(result.trend[2], 10.0, epsilon = 1e-12);
        for (i, s) in result.seasonal.iter().enumerate() {
            assert_relative_eq!(*s, pattern[i % 4], epsilon = 1e-12);
        }
        assert_relative_eq!(result.residual[5], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_multiplicative_centres_on_one() {
        let data: Vec<f64> = (0..12).map(|i| if i % 3 == 0 { 12.0 } else { 9.0 }).collect();
        let result = seasonal_decompose(&data, 3, DecompositionModel::Multiplicative).unwrap();
        let mean_seasonal = result.seasonal[..3].iter().sum::<f64>() / 3.0;
        assert_relative_eq!(mean_seasonal, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_failure_conditions() {
        assert!(seasonal_decompose(&[1.0, 2.0], 0, DecompositionModel::Additive).is_err());
        assert!(matches!(
            seasonal_decompose(&[1.0], 1, DecompositionModel::Additive),
            Err(MathError::InsufficientData(_))
        ));
        assert!(seasonal_decompose(&[1.0, f64::NAN, 2.0], 1, DecompositionModel::Additive).is_err());
        assert!(seasonal_decompose(&[1.0, 0.0, 2.0], 1, DecompositionModel::Multiplicative).is_err());
    }
}
