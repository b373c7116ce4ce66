//! ARIMA models for yearly series
//!
//! The series is differenced `d` times and the remaining ARMA(p, q) part is
//! fitted by exact Gaussian maximum likelihood: a Kalman filter evaluates
//! the likelihood, σ² is concentrated out, and Nelder–Mead searches over
//! unconstrained parameters that map onto stationary AR and invertible MA
//! polynomials. A constant is estimated only when `d == 0`.

use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use serde::Serialize;
use series_math::arma::{
    constrain_invertible, constrain_stationary, difference, integrate, integrated_ar,
    psi_weights, ArmaStateSpace, FilterOutput,
};
use series_math::optimize::{nelder_mead, NelderMeadOptions};
use series_math::stats::{mean, variance};
use tracing::{debug, info};

/// ARIMA model (AutoRegressive Integrated Moving Average)
#[derive(Debug, Clone)]
pub struct ArimaModel {
    /// Name of the model
    name: String,
    /// AR order (p)
    p: usize,
    /// Differencing order (d)
    d: usize,
    /// MA order (q)
    q: usize,
    /// Nelder-Mead iteration cap, `1500 * (k + 1)` when unset
    iteration_budget: Option<usize>,
}

/// Estimated ARIMA parameters and fit statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArimaFit {
    pub order: (usize, usize, usize),
    pub ar: Vec<f64>,
    pub ma: Vec<f64>,
    /// Mean of the series, present only without differencing
    pub constant: Option<f64>,
    /// Innovation variance
    pub sigma2: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    /// Observations entering the likelihood (after differencing)
    pub nobs: usize,
    /// Optimizer iterations used
    pub iterations: usize,
}

/// Trained ARIMA model
#[derive(Debug, Clone)]
pub struct TrainedArimaModel {
    /// Name of the model
    name: String,
    /// Estimated parameters
    fit: ArimaFit,
    /// Historical data on the original (undifferenced) scale
    historical_data: Vec<f64>,
    /// One-step prediction errors of the differenced series
    residuals: Vec<f64>,
    /// State-space form at the estimated parameters
    state_space: ArmaStateSpace,
    /// Predicted state for the first period after the sample
    state: Vec<f64>,
}

impl ArimaModel {
    /// Create a new ARIMA model
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self {
            name: format!("ARIMA({},{},{})", p, d, q),
            p,
            d,
            q,
            iteration_budget: None,
        }
    }

    /// Override the optimizer iteration cap
    pub fn with_iteration_budget(mut self, iterations: usize) -> Self {
        self.iteration_budget = Some(iterations);
        self
    }

    /// (p, d, q)
    pub fn order(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }

    fn has_constant(&self) -> bool {
        self.d == 0
    }

    fn parameter_count(&self) -> usize {
        self.p + self.q + usize::from(self.has_constant())
    }

    /// Split an optimizer point into (mean, AR, MA)
    fn unpack(&self, theta: &[f64]) -> (f64, Vec<f64>, Vec<f64>) {
        let offset = usize::from(self.has_constant());
        let mu = if self.has_constant() { theta[0] } else { 0.0 };
        let ar = constrain_stationary(&theta[offset..offset + self.p]);
        let ma = constrain_invertible(&theta[offset + self.p..offset + self.p + self.q]);
        (mu, ar, ma)
    }

    fn run_filter(&self, working: &[f64], theta: &[f64]) -> Option<(FilterOutput, ArmaStateSpace)> {
        let (mu, ar, ma) = self.unpack(theta);
        let centred: Vec<f64> = working.iter().map(|w| w - mu).collect();
        let model = ArmaStateSpace::new(&ar, &ma);
        let out = model.filter(&centred).ok()?;
        let sigma2 = out.sigma2();
        if sigma2.is_finite() && sigma2 > 0.0 {
            Some((out, model))
        } else {
            None
        }
    }
}

impl ForecastModel for ArimaModel {
    type Trained = TrainedArimaModel;

    fn train(&self, data: &[f64]) -> Result<TrainedArimaModel> {
        if data.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ModelError(
                "series contains missing or non-finite values".to_string(),
            ));
        }
        if data.len() <= self.d {
            return Err(ForecastError::ModelError(format!(
                "{} needs more than {} observations, got {}",
                self.name,
                self.d,
                data.len()
            )));
        }

        let working = difference(data, self.d);
        let k = self.parameter_count();
        if working.len() < k.max(1) {
            return Err(ForecastError::ModelError(format!(
                "Insufficient data for {}: {} observations after differencing for {} parameters",
                self.name,
                working.len(),
                k
            )));
        }

        let spread = if self.has_constant() {
            variance(&working)
        } else {
            working.iter().map(|w| w * w).sum::<f64>() / working.len() as f64
        };
        let scale = 1.0 + data.iter().fold(0.0_f64, |m, v| m.max(v * v));
        if !(spread > 1e-20 * scale) {
            return Err(ForecastError::ModelError(format!(
                "{} is degenerate: the series has no variation after differencing",
                self.name
            )));
        }

        let mut start = Vec::with_capacity(k);
        if self.has_constant() {
            start.push(mean(&working));
        }
        start.resize(k, 0.0);

        let objective = |theta: &[f64]| match self.run_filter(&working, theta) {
            Some((out, _)) => -out.log_likelihood(),
            None => f64::INFINITY,
        };
        let options = NelderMeadOptions {
            max_iterations: self.iteration_budget.unwrap_or(1_500 * (k + 1)),
            ..NelderMeadOptions::default()
        };
        let minimum = nelder_mead(objective, &start, options).map_err(|e| {
            ForecastError::ModelError(format!("{} fit failed: {}", self.name, e))
        })?;
        debug!(
            model = %self.name,
            iterations = minimum.iterations,
            neg_log_likelihood = minimum.value,
            "likelihood maximised"
        );

        let (out, state_space) = self.run_filter(&working, &minimum.point).ok_or_else(|| {
            ForecastError::ModelError(format!(
                "{} fit failed: likelihood is not finite at the optimum",
                self.name
            ))
        })?;
        let log_likelihood = out.log_likelihood();
        if !log_likelihood.is_finite() {
            return Err(ForecastError::ModelError(format!(
                "{} fit failed: likelihood is not finite at the optimum",
                self.name
            )));
        }

        let (mu, ar, ma) = self.unpack(&minimum.point);
        let fit = ArimaFit {
            order: self.order(),
            ar,
            ma,
            constant: self.has_constant().then_some(mu),
            sigma2: out.sigma2(),
            log_likelihood,
            aic: -2.0 * log_likelihood + 2.0 * (k + 1) as f64,
            nobs: working.len(),
            iterations: minimum.iterations,
        };
        info!(
            model = %self.name,
            sigma2 = fit.sigma2,
            aic = fit.aic,
            "ARIMA model trained"
        );

        Ok(TrainedArimaModel {
            name: self.name.clone(),
            fit,
            historical_data: data.to_vec(),
            residuals: out.innovations.clone(),
            state_space,
            state: out.state,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedArimaModel {
    /// Estimated parameters and fit statistics
    pub fn fit(&self) -> &ArimaFit {
        &self.fit
    }

    /// Standard error of the h-step forecast for h = 1..=horizon
    fn forecast_std_errors(&self, horizon: usize) -> Vec<f64> {
        let (_, d, _) = self.fit.order;
        let psi = psi_weights(&integrated_ar(&self.fit.ar, d), &self.fit.ma, horizon);
        let mut cumulative = 0.0;
        psi.iter()
            .map(|w| {
                cumulative += w * w;
                (self.fit.sigma2 * cumulative).sqrt()
            })
            .collect()
    }
}

impl TrainedForecastModel for TrainedArimaModel {
    fn forecast(&self, horizon: usize, confidence_level: f64) -> Result<ForecastResult> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least 1".to_string(),
            ));
        }

        let mu = self.fit.constant.unwrap_or(0.0);
        let increments: Vec<f64> = self
            .state_space
            .forecast(&self.state, horizon)
            .into_iter()
            .map(|w| w + mu)
            .collect();
        let (_, d, _) = self.fit.order;
        let values = integrate(&increments, &self.historical_data, d)?;

        ForecastResult::new_with_intervals(values, self.forecast_std_errors(horizon), confidence_level)
    }

    fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    fn name(&self) -> &str {
        &self.name
    }
}
