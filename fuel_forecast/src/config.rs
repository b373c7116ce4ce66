//! Model parameters and dashboard settings
//!
//! The four interactive controls (AR order, differencing order, MA order,
//! forecast horizon) are bounded integer ranges. Out-of-range values are
//! clamped, never rejected. Dashboard settings come from an optional TOML
//! file.

use crate::data::{ColumnSpec, DEFAULT_VALUE_COLUMN, DEFAULT_YEAR_COLUMN};
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Inclusive integer range with a default value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamRange {
    pub min: usize,
    pub max: usize,
    pub default: usize,
}

impl ParamRange {
    pub const fn new(min: usize, max: usize, default: usize) -> Self {
        Self { min, max, default }
    }

    pub fn clamp(&self, value: usize) -> usize {
        value.clamp(self.min, self.max)
    }
}

/// AR order bounds
pub const P_RANGE: ParamRange = ParamRange::new(0, 5, 2);
/// Differencing order bounds
pub const D_RANGE: ParamRange = ParamRange::new(0, 3, 1);
/// MA order bounds
pub const Q_RANGE: ParamRange = ParamRange::new(0, 5, 1);
/// Forecast horizon bounds, in years
pub const HORIZON_RANGE: ParamRange = ParamRange::new(1, 10, 5);

/// One of the four interactive controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    P,
    D,
    Q,
    Horizon,
}

impl Param {
    pub fn all() -> [Param; 4] {
        [Param::P, Param::D, Param::Q, Param::Horizon]
    }

    pub fn label(self) -> &'static str {
        match self {
            Param::P => "Order p",
            Param::D => "Order d",
            Param::Q => "Order q",
            Param::Horizon => "Years to forecast",
        }
    }

    pub fn range(self) -> ParamRange {
        match self {
            Param::P => P_RANGE,
            Param::D => D_RANGE,
            Param::Q => Q_RANGE,
            Param::Horizon => HORIZON_RANGE,
        }
    }

    fn next(self) -> Self {
        match self {
            Param::P => Param::D,
            Param::D => Param::Q,
            Param::Q => Param::Horizon,
            Param::Horizon => Param::P,
        }
    }

    fn previous(self) -> Self {
        match self {
            Param::P => Param::Horizon,
            Param::D => Param::P,
            Param::Q => Param::D,
            Param::Horizon => Param::Q,
        }
    }
}

/// ARIMA order plus forecast horizon, always within bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ModelConfig {
    p: usize,
    d: usize,
    q: usize,
    horizon: usize,
}

impl ModelConfig {
    /// Create a configuration, clamping every value into its range
    pub fn new(p: usize, d: usize, q: usize, horizon: usize) -> Self {
        Self {
            p: P_RANGE.clamp(p),
            d: D_RANGE.clamp(d),
            q: Q_RANGE.clamp(q),
            horizon: HORIZON_RANGE.clamp(horizon),
        }
    }

    pub fn p(&self) -> usize {
        self.p
    }

    pub fn d(&self) -> usize {
        self.d
    }

    pub fn q(&self) -> usize {
        self.q
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// (p, d, q)
    pub fn order(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }

    pub fn get(&self, param: Param) -> usize {
        match param {
            Param::P => self.p,
            Param::D => self.d,
            Param::Q => self.q,
            Param::Horizon => self.horizon,
        }
    }

    /// Copy with one control changed (clamped)
    pub fn with(self, param: Param, value: usize) -> Self {
        let mut next = self;
        match param {
            Param::P => next.p = P_RANGE.clamp(value),
            Param::D => next.d = D_RANGE.clamp(value),
            Param::Q => next.q = Q_RANGE.clamp(value),
            Param::Horizon => next.horizon = HORIZON_RANGE.clamp(value),
        }
        next
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::new(
            P_RANGE.default,
            D_RANGE.default,
            Q_RANGE.default,
            HORIZON_RANGE.default,
        )
    }
}

impl fmt::Display for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ARIMA({},{},{}) over {} years",
            self.p, self.d, self.q, self.horizon
        )
    }
}

/// Slider state: the current configuration and which control has focus.
///
/// Every mutator reports whether the configuration changed, which is the
/// signal to recompute everything downstream.
#[derive(Debug, Clone)]
pub struct ParameterController {
    config: ModelConfig,
    selected: Param,
}

impl ParameterController {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            selected: Param::P,
        }
    }

    pub fn config(&self) -> ModelConfig {
        self.config
    }

    pub fn selected(&self) -> Param {
        self.selected
    }

    pub fn select_next(&mut self) {
        self.selected = self.selected.next();
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.previous();
    }

    /// Set a control to `value`, clamped into its range
    pub fn set(&mut self, param: Param, value: usize) -> bool {
        let next = self.config.with(param, value);
        let changed = next != self.config;
        self.config = next;
        changed
    }

    /// Move the selected control one step up or down
    pub fn step(&mut self, up: bool) -> bool {
        let current = self.config.get(self.selected);
        let value = if up {
            current.saturating_add(1)
        } else {
            current.saturating_sub(1)
        };
        self.set(self.selected, value)
    }
}

impl Default for ParameterController {
    fn default() -> Self {
        Self::new(ModelConfig::default())
    }
}

/// Initial slider positions as read from the settings file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SliderDefaults {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub horizon: usize,
}

impl Default for SliderDefaults {
    fn default() -> Self {
        Self {
            p: P_RANGE.default,
            d: D_RANGE.default,
            q: Q_RANGE.default,
            horizon: HORIZON_RANGE.default,
        }
    }
}

impl From<SliderDefaults> for ModelConfig {
    fn from(d: SliderDefaults) -> Self {
        ModelConfig::new(d.p, d.d, d.q, d.horizon)
    }
}

/// Dashboard settings, every field optional in the TOML source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardSettings {
    /// CSV with one row per vehicle
    pub data_path: PathBuf,
    pub year_column: String,
    pub value_column: String,
    /// Where the forecast table is saved
    pub output_path: PathBuf,
    /// Coverage of the forecast interval, strictly between 0 and 1
    pub confidence_level: f64,
    /// Seasonal period used by the decomposition panel
    pub decomposition_period: usize,
    pub defaults: SliderDefaults,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("annual_df.csv"),
            year_column: DEFAULT_YEAR_COLUMN.to_string(),
            value_column: DEFAULT_VALUE_COLUMN.to_string(),
            output_path: PathBuf::from(crate::export::FORECAST_FILE_NAME),
            confidence_level: 0.95,
            decomposition_period: 1,
            defaults: SliderDefaults::default(),
        }
    }
}

impl DashboardSettings {
    /// Parse and validate settings from TOML text
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let settings: DashboardSettings = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ForecastError::ConfigError(format!(
                "cannot read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(ForecastError::ConfigError(format!(
                "confidence_level must be between 0 and 1, got {}",
                self.confidence_level
            )));
        }
        if self.decomposition_period == 0 {
            return Err(ForecastError::ConfigError(
                "decomposition_period must be at least 1".to_string(),
            ));
        }
        if self.year_column.trim().is_empty() || self.value_column.trim().is_empty() {
            return Err(ForecastError::ConfigError(
                "column names must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn columns(&self) -> ColumnSpec {
        ColumnSpec {
            year: self.year_column.clone(),
            value: self.value_column.clone(),
        }
    }

    /// Starting configuration for the sliders
    pub fn initial_config(&self) -> ModelConfig {
        self.defaults.into()
    }
}
