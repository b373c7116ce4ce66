//! One-shot render printed to stdout.

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use fuel_forecast::dashboard::{
    DECOMPOSITION_HEADER, FORECAST_HEADER, SERIES_HEADER, STATS_HEADER,
};
use fuel_forecast::{Dashboard, ModelConfig, RenderPayload};
use tracing::info;

use crate::ReportCmd;

/// Render once for `config`, print it, and write the forecast CSV.
pub fn run(mut dashboard: Dashboard, config: ModelConfig, cmd: &ReportCmd) -> Result<()> {
    let payload = dashboard
        .render(&config)
        .with_context(|| format!("rendering {}", dashboard.settings().data_path.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cmd.json {
        writeln!(out, "{}", payload.to_json()?)?;
    } else {
        write_text(&mut out, &payload)?;
    }

    let path = cmd
        .out
        .clone()
        .unwrap_or_else(|| dashboard.settings().output_path.clone());
    save(&payload, &path)
}

fn save(payload: &RenderPayload, path: &Path) -> Result<()> {
    if let Some(download) = payload.download() {
        download
            .save_to(path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "forecast written");
    }
    Ok(())
}

/// Plain-text rendition of a payload
pub fn write_text<W: Write>(out: &mut W, payload: &RenderPayload) -> io::Result<()> {
    writeln!(out, "{}", payload.title)?;
    writeln!(out, "{}", "=".repeat(payload.title.len()))?;
    writeln!(out, "{}\n", payload.config)?;

    writeln!(out, "{}", STATS_HEADER)?;
    write!(out, "{}", payload.summary)?;

    writeln!(out, "\n{}", SERIES_HEADER)?;
    for (year, value) in payload.series.points() {
        writeln!(out, "{:>6} {:>10.3}", year, value)?;
    }

    writeln!(out, "\n{}", DECOMPOSITION_HEADER)?;
    match &payload.decomposition {
        Ok(view) => {
            writeln!(
                out,
                "{:>6} {:>10} {:>10} {:>11} {:>10}",
                "Year", "Observed", "Trend", "Seasonality", "Residuals"
            )?;
            for (i, year) in view.years.iter().enumerate() {
                writeln!(
                    out,
                    "{:>6} {:>10.3} {:>10.3} {:>11.3} {:>10.3}",
                    year, view.observed[i], view.trend[i], view.seasonal[i], view.residual[i]
                )?;
            }
        }
        Err(notice) => writeln!(out, "{}", notice)?,
    }

    writeln!(out, "\n{}", FORECAST_HEADER)?;
    match &payload.forecast {
        Ok(view) => {
            writeln!(out, "{}", view.notice)?;
            writeln!(out, "{}", view.title)?;
            writeln!(
                out,
                "AR {:?}  MA {:?}  sigma2 {:.6}  AIC {:.3}",
                view.fit.ar, view.fit.ma, view.fit.sigma2, view.fit.aic
            )?;
            writeln!(
                out,
                "{:>6} {:>10} {:>10} {:>10}",
                "Year", "Forecast", "Lower_CI", "Upper_CI"
            )?;
            for row in view.table.rows() {
                writeln!(
                    out,
                    "{:>6} {:>10.3} {:>10.3} {:>10.3}",
                    row.year, row.forecast, row.lower_ci, row.upper_ci
                )?;
            }
        }
        Err(notice) => writeln!(out, "{}", notice)?,
    }
    Ok(())
}
