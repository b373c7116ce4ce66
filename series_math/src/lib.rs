//! # Series Math
//!
//! Numerical routines behind the fuel consumption forecasts.
//! This crate provides the descriptive statistics, differencing,
//! classical seasonal decomposition and the ARMA state-space machinery
//! (Kalman filter, ψ-weights, Nelder–Mead fitting) used by `fuel_forecast`.

use thiserror::Error;

pub mod arma;
pub mod decompose;
pub mod linalg;
pub mod optimize;
pub mod stats;

/// Errors that can occur in series calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),

    #[error("Optimizer did not converge after {0} iterations")]
    NotConverged(usize),
}

/// Result type for series math operations
pub type Result<T> = std::result::Result<T, MathError>;

pub use crate::decompose::{seasonal_decompose, DecompositionModel, Decomposition};
pub use crate::stats::{describe, Summary};
