use fuel_forecast::error::ForecastError;
use series_math::MathError;
use std::io;

#[test]
fn test_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let forecast_error = ForecastError::from(io_error);
    assert!(matches!(forecast_error, ForecastError::IoError(_)));

    let math_error = MathError::NotConverged(42);
    let forecast_error = ForecastError::from(math_error.clone());
    match forecast_error {
        ForecastError::MathError(inner) => assert_eq!(inner, math_error),
        other => panic!("Expected MathError variant, got {other:?}"),
    }

    let toml_error = toml::from_str::<toml::Value>("= broken").unwrap_err();
    assert!(matches!(
        ForecastError::from(toml_error),
        ForecastError::ConfigError(_)
    ));

    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(matches!(
        ForecastError::from(json_error),
        ForecastError::SerializationError(_)
    ));
}

#[test]
fn test_error_display() {
    let error = ForecastError::ModelError("fit did not converge".to_string());
    assert_eq!(error.to_string(), "Model error: fit did not converge");

    let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
    let error_string = ForecastError::from(io_error).to_string();
    assert!(error_string.contains("IO error"));
    assert!(error_string.contains("permission denied"));

    let error = ForecastError::from(MathError::NotConverged(7));
    assert_eq!(
        error.to_string(),
        "Math error: Optimizer did not converge after 7 iterations"
    );
}
