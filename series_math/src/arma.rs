//! ARMA building blocks
//!
//! Contains:
//! - Differencing and its inverse
//! - The partial-autocorrelation parameterisation that keeps AR
//!   polynomials stationary and MA polynomials invertible
//! - ψ-weights (MA(∞) representation) for forecast variances
//! - A Kalman filter over the Harvey state-space form of a zero-mean
//!   ARMA(p, q), giving the exact Gaussian likelihood
//!
//! Sign conventions: `x_t = Σ φ_i x_{t-i} + ε_t + Σ θ_j ε_{t-j}`.

use crate::linalg::SquareMatrix;
use crate::{MathError, Result};

/// Upper bound on the magnitude of any partial autocorrelation produced by
/// [`constrain_stationary`], keeping filter covariances well conditioned.
pub const MAX_PARTIAL_AUTOCORRELATION: f64 = 0.99;

/// Apply `order` rounds of first differencing.
pub fn difference(data: &[f64], order: usize) -> Vec<f64> {
    let mut result = data.to_vec();
    for _ in 0..order {
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Undo `order` rounds of differencing for values that continue `history`.
///
/// `increments` are future values of the `order`-times differenced series;
/// the result is the matching continuation of `history` itself.
pub fn integrate(increments: &[f64], history: &[f64], order: usize) -> Result<Vec<f64>> {
    if order == 0 {
        return Ok(increments.to_vec());
    }
    if history.len() < order {
        return Err(MathError::InsufficientData(format!(
            "integrating {} difference(s) needs at least {} past values, got {}",
            order,
            order,
            history.len()
        )));
    }

    let mut result = increments.to_vec();
    for level in (0..order).rev() {
        let anchor = *difference(history, level)
            .last()
            .ok_or_else(|| MathError::InsufficientData("empty history".to_string()))?;
        let mut running = anchor;
        for value in result.iter_mut() {
            running += *value;
            *value = running;
        }
    }
    Ok(result)
}

/// Map partial autocorrelations in (-1, 1) to AR coefficients with the
/// Durbin–Levinson recursion. The resulting polynomial is stationary.
pub fn pacf_to_ar(partials: &[f64]) -> Vec<f64> {
    let mut phi: Vec<f64> = Vec::with_capacity(partials.len());
    for (k, &r) in partials.iter().enumerate() {
        let previous = phi.clone();
        phi.push(r);
        for j in 0..k {
            phi[j] = previous[j] - r * previous[k - 1 - j];
        }
    }
    phi
}

/// Inverse of [`pacf_to_ar`]; `None` when the coefficients are not stationary.
pub fn ar_to_pacf(coefficients: &[f64]) -> Option<Vec<f64>> {
    let mut phi = coefficients.to_vec();
    let mut partials = vec![0.0; phi.len()];
    for k in (0..phi.len()).rev() {
        let r = phi[k];
        if r.abs() >= 1.0 || !r.is_finite() {
            return None;
        }
        partials[k] = r;
        let denom = 1.0 - r * r;
        let previous = phi.clone();
        for j in 0..k {
            phi[j] = (previous[j] + r * previous[k - 1 - j]) / denom;
        }
        phi.truncate(k);
    }
    Some(partials)
}

fn squash(u: f64) -> f64 {
    MAX_PARTIAL_AUTOCORRELATION * u / (1.0 + u * u).sqrt()
}

fn unsquash(r: f64) -> f64 {
    let s = (r / MAX_PARTIAL_AUTOCORRELATION).clamp(-0.999_999, 0.999_999);
    s / (1.0 - s * s).sqrt()
}

/// Unconstrained reals → stationary AR coefficients
pub fn constrain_stationary(unconstrained: &[f64]) -> Vec<f64> {
    let partials: Vec<f64> = unconstrained.iter().map(|&u| squash(u)).collect();
    pacf_to_ar(&partials)
}

/// Unconstrained reals → invertible MA coefficients
pub fn constrain_invertible(unconstrained: &[f64]) -> Vec<f64> {
    constrain_stationary(unconstrained)
        .into_iter()
        .map(|c| -c)
        .collect()
}

/// Inverse of [`constrain_stationary`]
pub fn unconstrain_stationary(coefficients: &[f64]) -> Option<Vec<f64>> {
    ar_to_pacf(coefficients).map(|p| p.into_iter().map(unsquash).collect())
}

/// Inverse of [`constrain_invertible`]
pub fn unconstrain_invertible(coefficients: &[f64]) -> Option<Vec<f64>> {
    let negated: Vec<f64> = coefficients.iter().map(|c| -c).collect();
    unconstrain_stationary(&negated)
}

/// AR coefficients of `φ(B)(1 - B)^d`, in the same sign convention as `ar`.
pub fn integrated_ar(ar: &[f64], d: usize) -> Vec<f64> {
    // polynomial 1 - Σ φ_i z^i
    let mut poly = Vec::with_capacity(ar.len() + 1);
    poly.push(1.0);
    poly.extend(ar.iter().map(|c| -c));

    for _ in 0..d {
        let mut next = vec![0.0; poly.len() + 1];
        for (i, c) in poly.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c;
        }
        poly = next;
    }

    poly[1..].iter().map(|c| -c).collect()
}

/// First `n` ψ-weights of the ARMA process, ψ_0 = 1.
pub fn psi_weights(ar: &[f64], ma: &[f64], n: usize) -> Vec<f64> {
    let mut psi = Vec::with_capacity(n);
    for j in 0..n {
        if j == 0 {
            psi.push(1.0);
            continue;
        }
        let mut value = if j <= ma.len() { ma[j - 1] } else { 0.0 };
        for (i, phi) in ar.iter().enumerate().take(j) {
            value += phi * psi[j - 1 - i];
        }
        psi.push(value);
    }
    psi
}

/// Output of [`ArmaStateSpace::filter`]
#[derive(Debug, Clone)]
pub struct FilterOutput {
    /// One-step prediction errors `y_t - E[y_t | y_1..y_{t-1}]`
    pub innovations: Vec<f64>,
    /// Prediction error variances in units of σ²
    pub variances: Vec<f64>,
    /// Predicted state for the first period after the sample
    pub state: Vec<f64>,
}

impl FilterOutput {
    pub fn len(&self) -> usize {
        self.innovations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.innovations.is_empty()
    }

    /// Maximum-likelihood innovation variance with σ² concentrated out
    pub fn sigma2(&self) -> f64 {
        if self.is_empty() {
            return f64::NAN;
        }
        self.innovations
            .iter()
            .zip(&self.variances)
            .map(|(v, f)| v * v / f)
            .sum::<f64>()
            / self.len() as f64
    }

    /// Exact Gaussian log-likelihood at the concentrated σ²
    pub fn log_likelihood(&self) -> f64 {
        let n = self.len() as f64;
        let log_det: f64 = self.variances.iter().map(|f| f.ln()).sum();
        -0.5 * (n * ((2.0 * std::f64::consts::PI).ln() + self.sigma2().ln() + 1.0) + log_det)
    }
}

/// Harvey state-space form of a zero-mean ARMA(p, q):
///
/// `y_t = Z α_t`, `α_{t+1} = T α_t + R ε_{t+1}` with `Z = e_1`.
#[derive(Debug, Clone)]
pub struct ArmaStateSpace {
    transition: SquareMatrix,
    selection: Vec<f64>,
}

impl ArmaStateSpace {
    pub fn new(ar: &[f64], ma: &[f64]) -> Self {
        let r = ar.len().max(ma.len() + 1);
        let mut transition = SquareMatrix::zeros(r);
        for (i, phi) in ar.iter().enumerate() {
            transition[(i, 0)] = *phi;
        }
        for i in 0..r - 1 {
            transition[(i, i + 1)] = 1.0;
        }

        let mut selection = vec![0.0; r];
        selection[0] = 1.0;
        for (j, theta) in ma.iter().enumerate() {
            selection[j + 1] = *theta;
        }

        Self {
            transition,
            selection,
        }
    }

    pub fn state_dim(&self) -> usize {
        self.selection.len()
    }

    /// Unconditional state covariance solving `P = T P T' + R R'`, by the
    /// doubling algorithm.
    pub fn stationary_covariance(&self) -> Result<SquareMatrix> {
        let mut p = SquareMatrix::outer(&self.selection);
        let mut a = self.transition.clone();
        for _ in 0..64 {
            if a.max_abs() < 1e-15 {
                break;
            }
            let step = a.sandwich(&p);
            p.add_assign(&step);
            a = a.matmul(&a);
            if !p.is_finite() {
                return Err(MathError::CalculationError(
                    "state covariance diverged; AR polynomial is not stationary".to_string(),
                ));
            }
        }
        if a.max_abs() >= 1e-8 {
            return Err(MathError::CalculationError(
                "state covariance did not converge; AR polynomial is not stationary".to_string(),
            ));
        }
        Ok(p)
    }

    /// Run the Kalman filter over `observations` from the stationary prior.
    pub fn filter(&self, observations: &[f64]) -> Result<FilterOutput> {
        let r = self.state_dim();
        let rr = SquareMatrix::outer(&self.selection);
        let mut state = vec![0.0; r];
        let mut covariance = self.stationary_covariance()?;

        let mut innovations = Vec::with_capacity(observations.len());
        let mut variances = Vec::with_capacity(observations.len());

        for &y in observations {
            let v = y - state[0];
            let f = covariance[(0, 0)];
            if !(f.is_finite() && f > 1e-12) {
                return Err(MathError::CalculationError(format!(
                    "prediction error variance collapsed to {}",
                    f
                )));
            }
            let gain: Vec<f64> = self
                .transition
                .mul_vec(&covariance.column(0))
                .into_iter()
                .map(|k| k / f)
                .collect();

            let mut next_state = self.transition.mul_vec(&state);
            for (s, k) in next_state.iter_mut().zip(&gain) {
                *s += k * v;
            }

            let mut next_cov = self.transition.sandwich(&covariance);
            next_cov.add_assign(&rr);
            next_cov.add_outer(&gain, -f);

            innovations.push(v);
            variances.push(f);
            state = next_state;
            covariance = next_cov;
        }

        Ok(FilterOutput {
            innovations,
            variances,
            state,
        })
    }

    /// Point forecasts for `horizon` periods from the predicted state
    /// returned by [`filter`](Self::filter).
    pub fn forecast(&self, state: &[f64], horizon: usize) -> Vec<f64> {
        let mut current = state.to_vec();
        let mut out = Vec::with_capacity(horizon);
        for _ in 0..horizon {
            out.push(current[0]);
            current = self.transition.mul_vec(&current);
        }
        out
    }
}
