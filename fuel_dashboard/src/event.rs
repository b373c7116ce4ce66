//! Keyboard handling.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::App;

/// Handle one key press.
///
/// Only unhandled render failures (an unreadable input file) are returned;
/// model and decomposition failures end up as notices in the payload.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    if key.kind != KeyEventKind::Press {
        return Ok(());
    }

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Tab => app.panel = app.panel.next(),
        KeyCode::BackTab => app.panel = app.panel.previous(),
        KeyCode::Up | KeyCode::Char('k') => app.controller.select_previous(),
        KeyCode::Down | KeyCode::Char('j') => app.controller.select_next(),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('+') => app.adjust(true)?,
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('-') => app.adjust(false)?,
        KeyCode::Char('s') => app.save_forecast(),
        KeyCode::Char('r') => app.reload()?,
        _ => {}
    }
    Ok(())
}

/// Wait up to `timeout` for a terminal event.
pub fn poll_event(timeout: Duration) -> std::io::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::sample_app;
    use crate::app::Panel;
    use fuel_forecast::{Dashboard, Param};

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE)).unwrap();
    }

    #[test]
    fn keys_move_focus_and_values() {
        let (mut app, _file) = sample_app();
        app.recompute().unwrap();

        press(&mut app, KeyCode::Down);
        assert_eq!(app.controller.selected(), Param::D);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.controller.config().d(), 0);
        assert_eq!(app.payload.as_ref().unwrap().config.d(), 0);

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.panel, Panel::Decomposition);

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn reload_reads_the_file_again() {
        let (mut app, _file) = sample_app();
        app.recompute().unwrap();
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.dashboard.cache().misses(), 2);
        assert!(app.status_message.is_some());
    }

    #[test]
    fn save_failure_keeps_dashboard_open() {
        let (mut app, _file) = sample_app();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("missing").join("forecast.csv");
        app.dashboard = {
            let mut settings = app.dashboard.settings().clone();
            settings.output_path = out.clone();
            Dashboard::new(settings).unwrap()
        };
        app.recompute().unwrap();

        let key = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE);
        let result = handle_key_event(&mut app, key);
        assert!(result.is_ok());
        assert!(!app.should_quit);
        assert!(!out.exists());
        let (status, _) = app.status_message.as_ref().unwrap();
        assert!(status.starts_with("Could not save"));

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.panel, Panel::Decomposition);
    }
}
