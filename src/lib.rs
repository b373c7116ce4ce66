//! # Fuelcast
//!
//! Annual fuel consumption analysis and forecasting.
//!
//! The workspace is split into:
//!
//! - [`series_math`]: descriptive statistics, seasonal decomposition and the
//!   ARMA state-space routines
//! - [`fuel_forecast`]: data loading, ARIMA forecasting, CSV export and the
//!   dashboard render pass
//!
//! The `fuel-dashboard` binary in `fuel_dashboard` drives both from a
//! terminal.
//!
//! ## Example
//!
//! ```
//! use fuelcast_workspace::fuel_forecast::{DataLoader, ForecastEngine, ModelConfig};
//!
//! let series = DataLoader::from_records(&[
//!     (2015, 10.0),
//!     (2016, 12.0),
//!     (2017, 11.0),
//!     (2018, 9.0),
//! ])
//! .unwrap();
//! let outcome = ForecastEngine::default()
//!     .run(&series, &ModelConfig::new(2, 1, 1, 2))
//!     .unwrap();
//! assert_eq!(outcome.table.years(), vec![2019, 2020]);
//! ```

pub use fuel_forecast;
pub use series_math;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facade_reexports() {
        let summary = series_math::describe(&[10.0, 12.0, 11.0, 9.0]);
        assert_eq!(summary.count, 4);
        assert_eq!(fuel_forecast::NAME, "fuel_forecast");
    }
}
