use fuel_forecast::config::{
    DashboardSettings, ModelConfig, Param, ParameterController, D_RANGE, HORIZON_RANGE, P_RANGE,
    Q_RANGE,
};
use fuel_forecast::ForecastError;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

#[test]
fn test_defaults() {
    let config = ModelConfig::default();
    assert_eq!(config.order(), (2, 1, 1));
    assert_eq!(config.horizon(), 5);
    assert_eq!(config.to_string(), "ARIMA(2,1,1) over 5 years");
}

#[test]
fn test_ranges() {
    assert_eq!((P_RANGE.min, P_RANGE.max), (0, 5));
    assert_eq!((D_RANGE.min, D_RANGE.max), (0, 3));
    assert_eq!((Q_RANGE.min, Q_RANGE.max), (0, 5));
    assert_eq!((HORIZON_RANGE.min, HORIZON_RANGE.max), (1, 10));
}

#[rstest]
#[case(ModelConfig::new(9, 9, 9, 99), (5, 3, 5), 10)]
#[case(ModelConfig::new(0, 0, 0, 0), (0, 0, 0), 1)]
#[case(ModelConfig::new(3, 2, 4, 7), (3, 2, 4), 7)]
fn test_clamping(
    #[case] config: ModelConfig,
    #[case] order: (usize, usize, usize),
    #[case] horizon: usize,
) {
    assert_eq!(config.order(), order);
    assert_eq!(config.horizon(), horizon);
}

#[test]
fn test_controller_reports_changes() {
    let mut controller = ParameterController::default();
    assert_eq!(controller.selected(), Param::P);

    assert!(controller.step(true));
    assert_eq!(controller.config().p(), 3);
    assert!(!controller.set(Param::P, 3));

    controller.select_previous();
    assert_eq!(controller.selected(), Param::Horizon);
    assert!(controller.set(Param::Horizon, 10));
    assert!(!controller.step(true));
    assert_eq!(controller.config().horizon(), 10);

    controller.select_next();
    controller.select_next();
    assert_eq!(controller.selected(), Param::D);
    assert!(controller.step(false));
    assert!(!controller.step(false));
    assert_eq!(controller.config().d(), 0);
}

#[test]
fn test_param_labels() {
    let labels: Vec<&str> = Param::all().iter().map(|p| p.label()).collect();
    assert_eq!(
        labels,
        vec!["Order p", "Order d", "Order q", "Years to forecast"]
    );
}

#[test]
fn test_settings_from_toml() {
    let settings = DashboardSettings::from_toml_str(
        r#"
        data_path = "data/annual.csv"
        confidence_level = 0.9

        [defaults]
        p = 1
        horizon = 12
        "#,
    )
    .unwrap();

    assert_eq!(settings.data_path, PathBuf::from("data/annual.csv"));
    assert_eq!(settings.year_column, "YEAR");
    assert_eq!(settings.value_column, "COMB (L/100 km)");
    assert_eq!(settings.output_path, PathBuf::from("forecast.csv"));
    assert_eq!(settings.decomposition_period, 1);

    let initial = settings.initial_config();
    assert_eq!(initial.order(), (1, 1, 1));
    assert_eq!(initial.horizon(), 10);
}

#[test]
fn test_empty_toml_is_default() {
    let settings = DashboardSettings::from_toml_str("").unwrap();
    assert_eq!(settings, DashboardSettings::default());
}

#[rstest]
#[case("confidence_level = 1.0")]
#[case("confidence_level = 0.0")]
#[case("decomposition_period = 0")]
#[case("year_column = \"\"")]
#[case("unknown_key = 3")]
#[case("confidence_level = \"high\"")]
fn test_invalid_settings(#[case] source: &str) {
    let err = DashboardSettings::from_toml_str(source).unwrap_err();
    assert!(matches!(err, ForecastError::ConfigError(_)), "{err}");
}

#[test]
fn test_settings_load_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "value_column = \"HWY (L/100 km)\"").unwrap();
    file.flush().unwrap();

    let settings = DashboardSettings::load(file.path()).unwrap();
    assert_eq!(settings.columns().value, "HWY (L/100 km)");

    let missing = DashboardSettings::load("/nonexistent/fuel.toml");
    assert!(matches!(missing, Err(ForecastError::ConfigError(_))));
}
