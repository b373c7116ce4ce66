use fuel_forecast::config::ModelConfig;
use fuel_forecast::data::DataLoader;
use fuel_forecast::engine::ForecastEngine;
use series_math::describe;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Fuel Forecast: Basic Forecasting Example");
    println!("========================================\n");

    // Two vehicles per model year, averaged into one value per year
    let records: Vec<(i64, f64)> = (2005..2023)
        .flat_map(|year| {
            let base = 11.5 - 0.11 * (year - 2005) as f64;
            [(year, base + 0.3), (year, base - 0.2)]
        })
        .collect();
    let series = DataLoader::from_records(&records)?;
    println!(
        "Aggregated {} rows into {} years ({}-{})\n",
        records.len(),
        series.len(),
        series.years()[0],
        series.last_year().unwrap_or_default()
    );

    println!("Descriptive statistics:");
    println!("{}", describe(series.values()));

    let engine = ForecastEngine::default();
    for config in [ModelConfig::new(1, 1, 0, 5), ModelConfig::default()] {
        let outcome = engine.run(&series, &config)?;
        println!("\n{}", config);
        println!(
            "  AR {:?}  MA {:?}  sigma2 {:.6}  AIC {:.2}",
            outcome.fit.ar, outcome.fit.ma, outcome.fit.sigma2, outcome.fit.aic
        );
        println!("  {:>6} {:>10} {:>10} {:>10}", "Year", "Forecast", "Lower", "Upper");
        for row in outcome.table.rows() {
            println!(
                "  {:>6} {:>10.3} {:>10.3} {:>10.3}",
                row.year, row.forecast, row.lower_ci, row.upper_ci
            );
        }
    }

    Ok(())
}
