//! Screen layout.

use fuel_forecast::dashboard::{
    DecompositionView, ForecastView, NoticeLevel, DECOMPOSITION_HEADER, DOWNLOAD_LABEL,
    FORECAST_HEADER, PAGE_TITLE, SERIES_HEADER, SIDEBAR_TITLE, STATS_HEADER,
};
use fuel_forecast::{Notice, Param, RenderPayload};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, LineGauge, Paragraph, Row, Table, Tabs, Wrap},
};
use series_math::Summary;

use crate::app::{App, Panel};
use crate::widgets::{
    draw_line_chart, forecast_axes, forecast_lines, series_lines, year_points, LineSeries,
};

/// Draw the whole screen.
pub fn draw_ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Length(3), // Panel tabs
            Constraint::Min(10),   // Body
            Constraint::Length(4), // Notices
            Constraint::Length(2), // Footer
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], app);
    draw_tabs(frame, chunks[1], app);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(40)])
        .split(chunks[2]);
    draw_sidebar(frame, body[0], app);

    match &app.payload {
        Some(payload) => {
            match app.panel {
                Panel::Overview => draw_overview(frame, body[1], payload),
                Panel::Decomposition => draw_decomposition(frame, body[1], payload),
                Panel::Forecast => draw_forecast(frame, body[1], payload),
            }
            draw_notices(frame, chunks[3], payload);
        }
        None => frame.render_widget(
            Paragraph::new("No data loaded").block(Block::default().borders(Borders::ALL)),
            body[1],
        ),
    }

    draw_footer(frame, chunks[4], app);
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let config = app.controller.config();
    let header = Paragraph::new(Line::from(vec![
        Span::styled(PAGE_TITLE, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(config.to_string(), Style::default().fg(Color::Yellow)),
    ]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}

fn draw_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = Panel::all().iter().map(|p| Line::from(p.title())).collect();
    let tabs = Tabs::new(titles)
        .select(app.panel.index())
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn draw_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", SIDEBAR_TITLE));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(inner);

    let config = app.controller.config();
    for (param, row) in Param::all().into_iter().zip(rows.iter()) {
        let range = param.range();
        let value = config.get(param);
        let ratio = (value - range.min) as f64 / (range.max - range.min) as f64;
        let selected = param == app.controller.selected();
        let label_style = if selected {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let gauge = LineGauge::default()
            .block(Block::default().title(Span::styled(param.label(), label_style)))
            .filled_style(Style::default().fg(if selected { Color::Yellow } else { Color::Cyan }))
            .label(format!("{:>2}", value))
            .ratio(ratio);
        frame.render_widget(gauge, *row);
    }
}

fn summary_table(summary: &Summary) -> Table<'static> {
    let rows: Vec<Row> = summary
        .rows()
        .into_iter()
        .map(|(label, value)| {
            let text = if label == "count" {
                summary.count.to_string()
            } else {
                format!("{:.4}", value)
            };
            Row::new(vec![Cell::from(label), Cell::from(text)])
        })
        .collect();

    Table::new(rows, [Constraint::Length(6), Constraint::Min(10)])
        .header(
            Row::new(vec!["", "Avg_Fuel_Consumption"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", STATS_HEADER)),
        )
}

fn draw_overview(frame: &mut Frame, area: Rect, payload: &RenderPayload) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(30)])
        .split(area);

    frame.render_widget(summary_table(&payload.summary), chunks[0]);
    draw_line_chart(
        frame,
        chunks[1],
        SERIES_HEADER,
        &series_lines(&payload.series),
        None,
    );
}

fn draw_decomposition(frame: &mut Frame, area: Rect, payload: &RenderPayload) {
    match &payload.decomposition {
        Ok(view) => draw_decomposition_panels(frame, area, view),
        Err(notice) => draw_notice_panel(frame, area, DECOMPOSITION_HEADER, notice),
    }
}

fn draw_decomposition_panels(frame: &mut Frame, area: Rect, view: &DecompositionView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for ((title, values), chunk) in view.panels().into_iter().zip(chunks.iter()) {
        let line = LineSeries::new(title, year_points(&view.years, values), Color::Cyan);
        draw_line_chart(frame, *chunk, title, &[line], None);
    }
}

fn draw_forecast(frame: &mut Frame, area: Rect, payload: &RenderPayload) {
    match &payload.forecast {
        Ok(view) => draw_forecast_view(frame, area, payload, view),
        Err(notice) => draw_notice_panel(frame, area, FORECAST_HEADER, notice),
    }
}

fn draw_forecast_view(frame: &mut Frame, area: Rect, payload: &RenderPayload, view: &ForecastView) {
    let table_height = view.table.len() as u16 + 4;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(table_height)])
        .split(area);

    draw_line_chart(
        frame,
        chunks[0],
        &view.title,
        &forecast_lines(&payload.series, view),
        forecast_axes(),
    );

    let rows: Vec<Row> = view
        .table
        .rows()
        .iter()
        .map(|r| {
            Row::new(vec![
                r.year.to_string(),
                format!("{:.3}", r.forecast),
                format!("{:.3}", r.lower_ci),
                format!("{:.3}", r.upper_ci),
            ])
        })
        .collect();
    let table = Table::new(rows, [Constraint::Length(10); 4])
        .header(
            Row::new(vec!["Year", "Forecast", "Lower_CI", "Upper_CI"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", FORECAST_HEADER))
                .title_bottom(format!(" [s] {} ", DOWNLOAD_LABEL)),
        );
    frame.render_widget(table, chunks[1]);
}

fn notice_style(level: NoticeLevel) -> Style {
    match level {
        NoticeLevel::Success => Style::default().fg(Color::Green),
        NoticeLevel::Warning => Style::default().fg(Color::Yellow),
        NoticeLevel::Error => Style::default().fg(Color::Red),
    }
}

fn draw_notice_panel(frame: &mut Frame, area: Rect, title: &str, notice: &Notice) {
    let paragraph = Paragraph::new(Span::styled(notice.message.clone(), notice_style(notice.level)))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", title)),
        );
    frame.render_widget(paragraph, area);
}

fn draw_notices(frame: &mut Frame, area: Rect, payload: &RenderPayload) {
    let lines: Vec<Line> = payload
        .notices()
        .into_iter()
        .map(|n| Line::styled(n.message.clone(), notice_style(n.level)))
        .collect();
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(paragraph, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let help = "[↑↓] Select  [←→] Adjust  [Tab] Panel  [s] Save CSV  [r] Reload  [q] Quit";
    let text = match &app.status_message {
        Some((status, _)) => format!("{} | {}", status, help),
        None => help.to_string(),
    };
    let footer = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::sample_app;
    use ratatui::backend::TestBackend;

    #[test]
    fn draws_every_panel() {
        let (mut app, _file) = sample_app();
        app.recompute().unwrap();
        let mut terminal = Terminal::new(TestBackend::new(120, 48)).unwrap();

        for panel in Panel::all() {
            app.panel = panel;
            terminal.draw(|frame| draw_ui(frame, &app)).unwrap();
        }

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Model trained successfully"));
        assert!(text.contains("Year"));
    }
}
