//! One render pass of the dashboard
//!
//! [`Dashboard::render`] takes the current slider configuration and builds
//! everything shown on screen. Decomposition and model failures are caught
//! and turned into notices; anything else (such as an unreadable input
//! file) is returned as an error and aborts the pass.

use crate::config::{DashboardSettings, ModelConfig};
use crate::data::{LoaderCache, YearSeries};
use crate::engine::{ForecastEngine, ForecastOutcome};
use crate::error::Result;
use crate::export::{Download, ForecastTable};
use crate::models::arima::ArimaFit;
use serde::Serialize;
use series_math::{describe, seasonal_decompose, DecompositionModel, Summary};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

pub const PAGE_TITLE: &str = "Fuel Consumption Analysis and Forecast for Canada";
pub const SIDEBAR_TITLE: &str = "ARIMA model configuration";
pub const STATS_HEADER: &str = "Descriptive statistics";
pub const SERIES_HEADER: &str = "Average fuel consumption per year";
pub const DECOMPOSITION_HEADER: &str = "Time series decomposition";
pub const FORECAST_HEADER: &str = "ARIMA forecast";
pub const DOWNLOAD_LABEL: &str = "Download forecast as CSV";
pub const SUCCESS_MESSAGE: &str = "Model trained successfully";
pub const X_LABEL: &str = "Year";
pub const Y_LABEL: &str = "Consumption (L/100km)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A message shown to the user in place of (or above) a section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        write!(f, "[{}] {}", tag, self.message)
    }
}

/// Four aligned component series for the decomposition panels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecompositionView {
    pub years: Vec<i64>,
    pub observed: Vec<f64>,
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<f64>,
    pub period: usize,
}

impl DecompositionView {
    /// Panel titles paired with their values, top to bottom
    pub fn panels(&self) -> [(&'static str, &[f64]); 4] {
        [
            ("Observed", &self.observed),
            ("Trend", &self.trend),
            ("Seasonality", &self.seasonal),
            ("Residuals", &self.residual),
        ]
    }
}

/// Everything the forecast section shows after a successful fit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastView {
    pub title: String,
    pub last_observed_year: i64,
    pub fit: ArimaFit,
    pub table: ForecastTable,
    #[serde(skip)]
    pub download: Download,
    pub notice: Notice,
}

impl ForecastView {
    fn build(config: &ModelConfig, last_observed_year: i64, outcome: ForecastOutcome) -> Result<Self> {
        let (p, d, q) = config.order();
        let download = outcome.table.download()?;
        Ok(Self {
            title: format!(
                "ARIMA({},{},{}) forecast over {} years",
                p,
                d,
                q,
                config.horizon()
            ),
            last_observed_year,
            fit: outcome.fit,
            table: outcome.table,
            download,
            notice: Notice::success(SUCCESS_MESSAGE),
        })
    }
}

/// Output of one render pass
#[derive(Debug, Clone)]
pub struct RenderPayload {
    pub title: &'static str,
    pub config: ModelConfig,
    pub series: Arc<YearSeries>,
    pub summary: Summary,
    /// Warning notice when the decomposition failed
    pub decomposition: std::result::Result<DecompositionView, Notice>,
    /// Error notice when fitting or forecasting failed
    pub forecast: std::result::Result<ForecastView, Notice>,
}

impl RenderPayload {
    /// Notices in page order
    pub fn notices(&self) -> Vec<&Notice> {
        let mut notices = Vec::new();
        if let Err(notice) = &self.decomposition {
            notices.push(notice);
        }
        match &self.forecast {
            Ok(view) => notices.push(&view.notice),
            Err(notice) => notices.push(notice),
        }
        notices
    }

    pub fn table(&self) -> Option<&ForecastTable> {
        self.forecast.as_ref().ok().map(|view| &view.table)
    }

    pub fn download(&self) -> Option<&Download> {
        self.forecast.as_ref().ok().map(|view| &view.download)
    }

    /// The payload as pretty-printed JSON, without the download bytes
    pub fn to_json(&self) -> Result<String> {
        #[derive(Serialize)]
        struct Snapshot<'a> {
            title: &'a str,
            config: ModelConfig,
            series: &'a YearSeries,
            summary: &'a Summary,
            decomposition: &'a std::result::Result<DecompositionView, Notice>,
            forecast: &'a std::result::Result<ForecastView, Notice>,
        }

        let snapshot = Snapshot {
            title: self.title,
            config: self.config,
            series: &self.series,
            summary: &self.summary,
            decomposition: &self.decomposition,
            forecast: &self.forecast,
        };
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }
}

/// Recomputes the dashboard for a configuration, caching the loaded data
#[derive(Debug)]
pub struct Dashboard {
    settings: DashboardSettings,
    cache: LoaderCache,
    engine: ForecastEngine,
}

impl Dashboard {
    pub fn new(settings: DashboardSettings) -> Result<Self> {
        settings.validate()?;
        let engine = ForecastEngine::new(settings.confidence_level)?;
        Ok(Self {
            settings,
            cache: LoaderCache::new(),
            engine,
        })
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    pub fn cache(&self) -> &LoaderCache {
        &self.cache
    }

    /// The loaded series, read from disk only on the first call
    pub fn series(&mut self) -> Result<Arc<YearSeries>> {
        let columns = self.settings.columns();
        self.cache.get_or_load(&self.settings.data_path, &columns)
    }

    /// Forget the cached series so the next render reads the file again
    pub fn reload(&mut self) {
        info!(path = %self.settings.data_path.display(), "reloading data");
        self.cache.invalidate();
    }

    /// Full recompute for `config`
    pub fn render(&mut self, config: &ModelConfig) -> Result<RenderPayload> {
        let series = self.series()?;
        Ok(self.render_series(series, config))
    }

    /// Recompute against an already loaded series
    pub fn render_series(&self, series: Arc<YearSeries>, config: &ModelConfig) -> RenderPayload {
        let summary = describe(series.values());
        let decomposition = self.decompose(&series);
        let forecast = self.forecast(&series, config);

        RenderPayload {
            title: PAGE_TITLE,
            config: *config,
            series,
            summary,
            decomposition,
            forecast,
        }
    }

    fn decompose(&self, series: &YearSeries) -> std::result::Result<DecompositionView, Notice> {
        let period = self.settings.decomposition_period;
        match seasonal_decompose(series.values(), period, DecompositionModel::Additive) {
            Ok(parts) => Ok(DecompositionView {
                years: series.years().to_vec(),
                observed: parts.observed,
                trend: parts.trend,
                seasonal: parts.seasonal,
                residual: parts.residual,
                period,
            }),
            Err(e) => {
                warn!(error = %e, "decomposition failed");
                Err(Notice::warning(format!("Decomposition unavailable: {}", e)))
            }
        }
    }

    fn forecast(
        &self,
        series: &YearSeries,
        config: &ModelConfig,
    ) -> std::result::Result<ForecastView, Notice> {
        let outcome = self.engine.run(series, config).and_then(|outcome| {
            let last = series.last_year().unwrap_or_default();
            ForecastView::build(config, last, outcome)
        });
        outcome.map_err(|e| {
            warn!(error = %e, config = %config, "forecast failed");
            Notice::error(format!("ARIMA model error: {}", e))
        })
    }
}
