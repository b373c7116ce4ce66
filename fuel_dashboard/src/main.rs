//! fuel-dashboard - annual fuel consumption analysis and ARIMA forecasts.

mod app;
mod event;
mod report;
mod ui;
mod widgets;

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use fuel_forecast::{Dashboard, DashboardSettings, ModelConfig};
use ratatui::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use app::App;
use event::{handle_key_event, poll_event};
use ui::draw_ui;

const DEFAULT_LOG_FILTER: &str = "fuel_forecast=info,fuel_dashboard=info";

#[derive(Parser)]
#[command(version, about = "Fuel consumption analysis and forecast")]
struct Cli {
    /// TOML settings file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Vehicle CSV, overrides `data_path` from the settings
    #[arg(long, value_name = "FILE", global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Option<Cmd>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Interactive terminal dashboard (default)
    Tui(TuiCmd),
    /// Render once and print the result
    Report(ReportCmd),
}

#[derive(Args, Default)]
struct TuiCmd {
    /// Write logs here instead of discarding them
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

#[derive(Args)]
pub struct ReportCmd {
    /// AR order
    #[arg(short = 'p', long)]
    pub p: Option<usize>,
    /// Differencing order
    #[arg(short = 'd', long)]
    pub d: Option<usize>,
    /// MA order
    #[arg(short = 'q', long)]
    pub q: Option<usize>,
    /// Years to forecast
    #[arg(long)]
    pub horizon: Option<usize>,
    /// Where to write the forecast CSV
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
    /// Print the payload as JSON
    #[arg(long)]
    pub json: bool,
}

impl ReportCmd {
    /// Flags override the settings defaults; values are clamped into range
    fn model_config(&self, defaults: ModelConfig) -> ModelConfig {
        ModelConfig::new(
            self.p.unwrap_or(defaults.p()),
            self.d.unwrap_or(defaults.d()),
            self.q.unwrap_or(defaults.q()),
            self.horizon.unwrap_or(defaults.horizon()),
        )
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into())
}

fn load_settings(cli: &Cli) -> Result<DashboardSettings> {
    let mut settings = match &cli.config {
        Some(path) => DashboardSettings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => DashboardSettings::default(),
    };
    if let Some(data) = &cli.data {
        settings.data_path = data.clone();
    }
    Ok(settings)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;

    match cli.cmd {
        Some(Cmd::Report(cmd)) => {
            tracing_subscriber::registry()
                .with(env_filter())
                .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
                .init();
            let config = cmd.model_config(settings.initial_config());
            let dashboard = Dashboard::new(settings)?;
            report::run(dashboard, config, &cmd)
        }
        Some(Cmd::Tui(cmd)) => run_tui(settings, cmd),
        None => run_tui(settings, TuiCmd::default()),
    }
}

fn run_tui(settings: DashboardSettings, cmd: TuiCmd) -> Result<()> {
    // the alternate screen owns stdout and stderr
    match &cmd.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(env_filter())
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(EnvFilter::new("off"))
                .with(tracing_subscriber::fmt::layer().with_writer(io::sink))
                .init();
        }
    }

    let initial = settings.initial_config();
    let mut app = App::new(Dashboard::new(settings)?, initial);
    // a bad input file should fail before the terminal is taken over
    app.recompute()?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(100);

    loop {
        terminal.draw(|frame| draw_ui(frame, app))?;
        app.clear_expired_status();

        if let Some(Event::Key(key)) = poll_event(tick_rate)? {
            handle_key_event(app, key)?;
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_flags_override_defaults() {
        let cli = Cli::parse_from(["fuel-dashboard", "report", "-p", "0", "--horizon", "40"]);
        let Some(Cmd::Report(cmd)) = cli.cmd else {
            panic!("expected report command");
        };
        let config = cmd.model_config(ModelConfig::default());
        assert_eq!(config.order(), (0, 1, 1));
        assert_eq!(config.horizon(), 10);
    }

    #[test]
    fn tui_is_the_default_command() {
        let cli = Cli::parse_from(["fuel-dashboard", "--data", "annual.csv"]);
        assert!(cli.cmd.is_none());
        let settings = load_settings(&cli).unwrap();
        assert_eq!(settings.data_path, PathBuf::from("annual.csv"));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
