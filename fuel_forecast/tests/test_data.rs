use fuel_forecast::data::{ColumnSpec, DataLoader, LoaderCache, YearSeries, VALUE_LABEL};
use fuel_forecast::ForecastError;
use pretty_assertions::assert_eq;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

fn vehicle_csv(rows: &[(i64, f64)]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "YEAR,MAKE,MODEL,COMB (L/100 km)").unwrap();
    for (year, value) in rows {
        writeln!(file, "{},ACURA,ILX,{}", year, value).unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn test_data_loader_from_csv() {
    let file = vehicle_csv(&[
        (2016, 9.0),
        (2015, 10.0),
        (2016, 11.0),
        (2015, 12.0),
        (2017, 8.5),
        (2015, 8.0),
    ]);

    let series = DataLoader::from_csv(file.path(), &ColumnSpec::default()).unwrap();

    assert_eq!(series.years(), &[2015, 2016, 2017]);
    assert_eq!(series.values(), &[10.0, 10.0, 8.5]);
    assert_eq!(series.get(2016), Some(10.0));
    assert_eq!(series.get(2014), None);
    assert_eq!(series.last_year(), Some(2017));
}

#[test]
fn test_one_row_per_year_with_mean() {
    let records: Vec<(i64, f64)> = (0..60)
        .map(|i| (2000 + (i % 7), 5.0 + (i as f64) * 0.25))
        .collect();

    let series = DataLoader::from_records(&records).unwrap();

    assert_eq!(series.len(), 7);
    assert!(series.years().windows(2).all(|w| w[0] < w[1]));
    for (year, value) in series.points() {
        let group: Vec<f64> = records
            .iter()
            .filter(|(y, _)| *y == year)
            .map(|(_, v)| *v)
            .collect();
        let expected = group.iter().sum::<f64>() / group.len() as f64;
        approx::assert_relative_eq!(value, expected, epsilon = 1e-12);
    }
}

#[test]
fn test_custom_columns() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "model_year,fuel").unwrap();
    writeln!(file, "2020,7.0").unwrap();
    writeln!(file, "2020,9.0").unwrap();
    writeln!(file, "2021,6.0").unwrap();
    file.flush().unwrap();

    let columns = ColumnSpec {
        year: "model_year".to_string(),
        value: "fuel".to_string(),
    };
    let series = DataLoader::from_csv(file.path(), &columns).unwrap();
    assert_eq!(series.values(), &[8.0, 6.0]);
}

#[test]
fn test_missing_column() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "YEAR,CITY (L/100 km)").unwrap();
    writeln!(file, "2020,7.0").unwrap();
    file.flush().unwrap();

    let err = DataLoader::from_csv(file.path(), &ColumnSpec::default()).unwrap_err();
    match err {
        ForecastError::DataError(msg) => assert!(msg.contains("COMB (L/100 km)")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_file() {
    let result = DataLoader::from_csv("/nonexistent/annual_df.csv", &ColumnSpec::default());
    assert!(matches!(result, Err(ForecastError::IoError(_))));
}

#[test]
fn test_year_series_rejects_unsorted() {
    assert!(YearSeries::new(vec![(2001, 1.0), (2000, 2.0)]).is_err());
    assert!(YearSeries::new(vec![(2000, 1.0), (2000, 2.0)]).is_err());
    assert!(YearSeries::new(vec![]).unwrap().is_empty());
}

#[test]
fn test_value_label() {
    assert_eq!(VALUE_LABEL, "Avg_Fuel_Consumption");
}

#[test]
fn test_loader_cache_reuses_series() {
    let file = vehicle_csv(&[(2015, 10.0), (2016, 12.0)]);
    let columns = ColumnSpec::default();
    let mut cache = LoaderCache::new();

    let first = cache.get_or_load(file.path(), &columns).unwrap();
    let second = cache.get_or_load(file.path(), &columns).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.misses(), 1);
    assert_eq!(cache.hits(), 1);
    assert_eq!(cache.len(), 1);

    cache.invalidate();
    assert!(cache.is_empty());
    let third = cache.get_or_load(file.path(), &columns).unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(*first, *third);
    assert_eq!(cache.misses(), 2);
}

#[test]
fn test_loader_cache_keys_on_columns() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "YEAR,COMB (L/100 km),HWY (L/100 km)").unwrap();
    writeln!(file, "2015,10.0,8.0").unwrap();
    writeln!(file, "2016,12.0,9.0").unwrap();
    file.flush().unwrap();

    let mut cache = LoaderCache::new();
    let comb = cache.get_or_load(file.path(), &ColumnSpec::default()).unwrap();
    let hwy_columns = ColumnSpec {
        value: "HWY (L/100 km)".to_string(),
        ..ColumnSpec::default()
    };
    let hwy = cache.get_or_load(file.path(), &hwy_columns).unwrap();

    assert_eq!(cache.len(), 2);
    assert_eq!(comb.values(), &[10.0, 12.0]);
    assert_eq!(hwy.values(), &[8.0, 9.0]);
}
