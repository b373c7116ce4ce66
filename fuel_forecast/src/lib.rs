//! # Fuel Forecast
//!
//! A Rust library for analysing and forecasting yearly fuel consumption.
//!
//! ## Features
//!
//! - Loading per-vehicle CSV data and averaging it per year
//! - Interactive ARIMA order and horizon controls with clamped ranges
//! - ARIMA(p,d,q) fitted by exact maximum likelihood on the log series
//! - Forecast tables with normal confidence intervals, exported as CSV
//! - A recompute function producing everything the dashboard shows
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fuel_forecast::config::{DashboardSettings, ModelConfig};
//! use fuel_forecast::dashboard::Dashboard;
//!
//! let mut dashboard = Dashboard::new(DashboardSettings::default())?;
//!
//! // ARIMA(2,1,1), five years ahead
//! let payload = dashboard.render(&ModelConfig::new(2, 1, 1, 5))?;
//!
//! for notice in payload.notices() {
//!     println!("{}", notice);
//! }
//! if let Some(download) = payload.download() {
//!     download.save_to(&download.file_name)?;
//! }
//! # Ok::<(), fuel_forecast::ForecastError>(())
//! ```

pub mod config;
pub mod dashboard;
pub mod data;
pub mod engine;
pub mod error;
pub mod export;
pub mod models;

// Re-export commonly used types
pub use crate::config::{DashboardSettings, ModelConfig, Param, ParameterController};
pub use crate::dashboard::{Dashboard, Notice, NoticeLevel, RenderPayload};
pub use crate::data::{DataLoader, LoaderCache, YearSeries};
pub use crate::engine::{ForecastEngine, ForecastOutcome};
pub use crate::error::{ForecastError, Result};
pub use crate::export::{ForecastRow, ForecastTable};
pub use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
