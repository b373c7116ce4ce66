use fuel_forecast::config::{DashboardSettings, ModelConfig};
use fuel_forecast::dashboard::{Dashboard, NoticeLevel, PAGE_TITLE, SUCCESS_MESSAGE};
use fuel_forecast::data::YearSeries;
use fuel_forecast::export::{FORECAST_FILE_NAME, FORECAST_MIME};
use fuel_forecast::ForecastError;
use pretty_assertions::assert_eq;
use std::io::Write;
use std::sync::Arc;
use tempfile::{tempdir, NamedTempFile};

fn settings_for(file: &NamedTempFile) -> DashboardSettings {
    DashboardSettings {
        data_path: file.path().to_path_buf(),
        ..DashboardSettings::default()
    }
}

fn vehicle_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "YEAR,MAKE,COMB (L/100 km)").unwrap();
    let yearly = [
        (2010, [10.4, 11.0]),
        (2011, [10.2, 10.8]),
        (2012, [10.3, 10.5]),
        (2013, [9.9, 10.3]),
        (2014, [9.8, 10.4]),
        (2015, [9.7, 10.1]),
        (2016, [9.9, 9.9]),
        (2017, [9.4, 10.0]),
        (2018, [9.5, 9.7]),
        (2019, [9.2, 9.8]),
        (2020, [9.3, 9.5]),
        (2021, [9.0, 9.6]),
    ];
    for (year, values) in yearly {
        for value in values {
            writeln!(file, "{},FORD,{}", year, value).unwrap();
        }
    }
    file.flush().unwrap();
    file
}

#[test]
fn test_render_default_config() {
    let file = vehicle_csv();
    let mut dashboard = Dashboard::new(settings_for(&file)).unwrap();

    let payload = dashboard.render(&ModelConfig::default()).unwrap();

    assert_eq!(payload.title, PAGE_TITLE);
    assert_eq!(payload.series.len(), 12);
    assert_eq!(payload.summary.count, 12);

    let decomposition = payload.decomposition.as_ref().unwrap();
    assert_eq!(decomposition.period, 1);
    assert_eq!(decomposition.trend, decomposition.observed);
    assert!(decomposition.seasonal.iter().all(|v| *v == 0.0));
    assert!(decomposition.residual.iter().all(|v| *v == 0.0));
    let titles: Vec<&str> = decomposition.panels().iter().map(|(t, _)| *t).collect();
    assert_eq!(titles, vec!["Observed", "Trend", "Seasonality", "Residuals"]);

    let forecast = payload.forecast.as_ref().unwrap();
    assert_eq!(forecast.title, "ARIMA(2,1,1) forecast over 5 years");
    assert_eq!(forecast.last_observed_year, 2021);
    assert_eq!(forecast.notice.level, NoticeLevel::Success);
    assert_eq!(forecast.notice.message, SUCCESS_MESSAGE);
    assert_eq!(forecast.table.years(), vec![2022, 2023, 2024, 2025, 2026]);

    let download = payload.download().unwrap();
    assert_eq!(download.file_name, FORECAST_FILE_NAME);
    assert_eq!(download.mime, FORECAST_MIME);
    let text = String::from_utf8(download.bytes.clone()).unwrap();
    assert!(text.starts_with("Year,Forecast,Lower_CI,Upper_CI\n2022,"));
    assert_eq!(text.lines().count(), 6);
}

#[test]
fn test_render_reuses_loaded_data() {
    let file = vehicle_csv();
    let mut dashboard = Dashboard::new(settings_for(&file)).unwrap();

    let first = dashboard.render(&ModelConfig::new(1, 1, 0, 3)).unwrap();
    let second = dashboard.render(&ModelConfig::new(1, 1, 0, 8)).unwrap();

    assert!(Arc::ptr_eq(&first.series, &second.series));
    assert_eq!(dashboard.cache().misses(), 1);
    assert_eq!(dashboard.cache().hits(), 1);
    assert_eq!(second.table().unwrap().len(), 8);

    dashboard.reload();
    dashboard.render(&ModelConfig::default()).unwrap();
    assert_eq!(dashboard.cache().misses(), 2);
}

#[test]
fn test_model_failure_becomes_error_notice() {
    let series = Arc::new(YearSeries::new((2000..2010).map(|y| (y, 8.0)).collect()).unwrap());
    let dashboard = Dashboard::new(DashboardSettings::default()).unwrap();

    let payload = dashboard.render_series(series, &ModelConfig::new(0, 0, 0, 3));

    let notice = payload.forecast.as_ref().unwrap_err();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.message.starts_with("ARIMA model error: "));
    assert!(payload.table().is_none());
    assert!(payload.download().is_none());
    assert!(payload.decomposition.is_ok());
}

#[test]
fn test_decomposition_failure_becomes_warning() {
    let series = Arc::new(YearSeries::new(vec![(2020, 9.0), (2021, 8.5), (2022, 8.7)]).unwrap());
    let settings = DashboardSettings {
        decomposition_period: 4,
        ..DashboardSettings::default()
    };
    let dashboard = Dashboard::new(settings).unwrap();

    let payload = dashboard.render_series(series, &ModelConfig::new(0, 1, 0, 2));

    let notice = payload.decomposition.as_ref().unwrap_err();
    assert_eq!(notice.level, NoticeLevel::Warning);
    assert!(notice.message.starts_with("Decomposition unavailable: "));
    assert!(payload.forecast.is_ok());
    let levels: Vec<NoticeLevel> = payload.notices().iter().map(|n| n.level).collect();
    assert_eq!(levels, vec![NoticeLevel::Warning, NoticeLevel::Success]);
}

#[test]
fn test_empty_series_summary() {
    let series = Arc::new(YearSeries::new(Vec::new()).unwrap());
    let dashboard = Dashboard::new(DashboardSettings::default()).unwrap();

    let payload = dashboard.render_series(series, &ModelConfig::default());

    assert_eq!(payload.summary.count, 0);
    assert!(payload.summary.mean.is_nan());
    assert!(payload.decomposition.is_err());
    assert!(payload.forecast.is_err());
}

#[test]
fn test_unreadable_file_aborts_render() {
    let dir = tempdir().unwrap();
    let settings = DashboardSettings {
        data_path: dir.path().join("missing.csv"),
        ..DashboardSettings::default()
    };
    let mut dashboard = Dashboard::new(settings).unwrap();

    let err = dashboard.render(&ModelConfig::default()).unwrap_err();
    assert!(matches!(err, ForecastError::IoError(_)));
}

#[test]
fn test_download_save_and_json() {
    let file = vehicle_csv();
    let mut dashboard = Dashboard::new(settings_for(&file)).unwrap();
    let payload = dashboard.render(&ModelConfig::new(1, 1, 1, 4)).unwrap();

    let dir = tempdir().unwrap();
    let out = dir.path().join(FORECAST_FILE_NAME);
    payload.download().unwrap().save_to(&out).unwrap();

    let mut reader = csv::Reader::from_path(&out).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["Year", "Forecast", "Lower_CI", "Upper_CI"]
    );
    let rows: Vec<fuel_forecast::ForecastRow> =
        reader.deserialize().collect::<Result<_, _>>().unwrap();
    assert_eq!(rows, payload.table().unwrap().rows());

    let json: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
    assert_eq!(json["title"], PAGE_TITLE);
    assert_eq!(json["config"]["horizon"], 4);
    assert_eq!(json["forecast"]["Ok"]["table"]["rows"][0]["Year"], 2022);
}
