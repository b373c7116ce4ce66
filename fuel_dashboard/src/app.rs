//! Application state for the terminal dashboard.

use std::time::Instant;

use anyhow::Result;
use fuel_forecast::{Dashboard, ModelConfig, ParameterController, RenderPayload};
use tracing::{info, warn};

/// Content panels, cycled with Tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Overview,
    Decomposition,
    Forecast,
}

impl Panel {
    pub fn all() -> [Panel; 3] {
        [Panel::Overview, Panel::Decomposition, Panel::Forecast]
    }

    pub fn title(self) -> &'static str {
        match self {
            Panel::Overview => "Overview",
            Panel::Decomposition => "Decomposition",
            Panel::Forecast => "Forecast",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Panel::Overview => 0,
            Panel::Decomposition => 1,
            Panel::Forecast => 2,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Panel::Overview => Panel::Decomposition,
            Panel::Decomposition => Panel::Forecast,
            Panel::Forecast => Panel::Overview,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Panel::Overview => Panel::Forecast,
            Panel::Decomposition => Panel::Overview,
            Panel::Forecast => Panel::Decomposition,
        }
    }
}

/// Main application state.
pub struct App {
    /// Recompute function and loaded data
    pub dashboard: Dashboard,
    /// Slider values and focus
    pub controller: ParameterController,
    /// Result of the last render pass
    pub payload: Option<RenderPayload>,
    pub panel: Panel,
    /// Status message with the time it was set
    pub status_message: Option<(String, Instant)>,
    pub should_quit: bool,
}

impl App {
    pub fn new(dashboard: Dashboard, config: ModelConfig) -> Self {
        Self {
            dashboard,
            controller: ParameterController::new(config),
            payload: None,
            panel: Panel::default(),
            status_message: None,
            should_quit: false,
        }
    }

    /// Run a full render pass for the current slider values.
    pub fn recompute(&mut self) -> Result<()> {
        let config = self.controller.config();
        let payload = self.dashboard.render(&config)?;
        info!(config = %config, "dashboard recomputed");
        self.payload = Some(payload);
        Ok(())
    }

    /// Re-read the input file, then recompute.
    pub fn reload(&mut self) -> Result<()> {
        self.dashboard.reload();
        self.recompute()?;
        self.set_status("Data reloaded");
        Ok(())
    }

    /// Write the forecast CSV to the configured output path.
    ///
    /// A failed write is reported in the status line; the dashboard stays open.
    pub fn save_forecast(&mut self) {
        let path = self.dashboard.settings().output_path.clone();
        let Some(download) = self.payload.as_ref().and_then(|p| p.download()) else {
            self.set_status("No forecast to save");
            return;
        };
        match download.save_to(&path) {
            Ok(()) => self.set_status(format!("Saved {}", path.display())),
            Err(e) => {
                warn!(error = %e, path = %path.display(), "saving forecast failed");
                self.set_status(format!("Could not save {}: {}", path.display(), e));
            }
        }
    }

    /// Apply a slider step and recompute if anything changed.
    pub fn adjust(&mut self, up: bool) -> Result<()> {
        if self.controller.step(up) {
            self.recompute()?;
        }
        Ok(())
    }

    /// Set a status message that will be displayed temporarily.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    /// Clear expired status messages (older than 5 seconds).
    pub fn clear_expired_status(&mut self) {
        if let Some((_, instant)) = &self.status_message {
            if instant.elapsed().as_secs() > 5 {
                self.status_message = None;
            }
        }
    }
}
