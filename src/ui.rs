pub mod charting;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, Widget,
        Wrap,
    },
};

use crate::{
    app::{App, AppState, InputMode},
    goal::LapStatus,
    summary::SessionSummary,
    time_series::lap_points,
    util::{format_delta, format_seconds, format_time},
};

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

fn status_style(status: LapStatus) -> Style {
    match status {
        LapStatus::On => Style::default().fg(Color::Green),
        LapStatus::Fast => Style::default().fg(Color::Yellow),
        LapStatus::Slow => Style::default().fg(Color::Red),
        LapStatus::None => Style::default(),
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Min(1),    // view
                Constraint::Length(1), // status / prompt
                Constraint::Length(1), // legend
            ])
            .split(area);

        match self.state {
            AppState::Timer => render_timer(self, chunks[0], buf),
            AppState::Sessions => render_sessions(self, chunks[0], buf),
        }

        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let status_line = if self.input_mode != InputMode::Normal {
            Line::from(vec![
                Span::styled(
                    format!("{}: ", self.input_mode.prompt()),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(self.input.clone()),
                Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
            ])
        } else {
            Line::from(Span::styled(
                self.status.clone().unwrap_or_default(),
                Style::default().fg(Color::Cyan),
            ))
        };
        Paragraph::new(status_line).render(chunks[1], buf);

        let legend = match (self.input_mode, self.state) {
            (InputMode::Normal, AppState::Timer) => {
                "(space) start/pause / (l)ap / (r)eset / (s)ave / (e)xport / (g)oal / (t)olerance / (tab) sessions / (esc)ape"
            }
            (InputMode::Normal, AppState::Sessions) => {
                "(↑/↓) select / e(x)port / (d)elete / (tab) timer / (esc)ape"
            }
            _ => "(enter) confirm / (esc) cancel",
        };
        Paragraph::new(Span::styled(legend, italic_style))
            .wrap(Wrap { trim: true })
            .render(chunks[2], buf);
    }
}

fn render_timer(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let timer = &app.timer;
    let goal = timer.goal();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // goal settings
            Constraint::Length(3), // clocks
            Constraint::Min(4),    // laps + summary/chart
        ])
        .split(area);

    let settings = if goal.is_set() {
        format!(
            "Goal {}   Tolerance ±{}",
            format_time(goal.goal_ms as i64),
            format_seconds(goal.tolerance_ms as f64, 1)
        )
    } else {
        "No goal set".to_string()
    };
    Paragraph::new(Span::styled(settings, dim_style))
        .alignment(Alignment::Center)
        .render(rows[0], buf);

    let clocks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    let clock_style = if timer.is_running() {
        bold_style.fg(Color::Green)
    } else {
        bold_style
    };
    for (chunk, title, ms) in [
        (clocks[0], "TOTAL", timer.total_ms()),
        (clocks[1], "CURRENT LAP", timer.current_lap_ms()),
    ] {
        Paragraph::new(Span::styled(format_time(ms as i64), clock_style))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(title))
            .render(chunk, buf);
    }

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);

    render_lap_table(app, body[0], buf);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(3)])
        .split(body[1]);

    render_summary(&app.summary(), right[0], buf);
    render_chart(app, right[1], buf);
}

fn render_lap_table(app: &App, area: Rect, buf: &mut Buffer) {
    let laps = app.timer.laps();
    let goal = app.timer.goal();
    let goal_cell = format_time(goal.goal_ms as i64);

    // newest laps stay visible once the table overflows
    let visible = area.height.saturating_sub(3) as usize;
    let skip = laps.len().saturating_sub(visible);

    let rows = laps.iter().enumerate().skip(skip).map(|(i, lap)| {
        let status = goal.status(lap.delta);
        Row::new(vec![
            Cell::from((i + 1).to_string()),
            Cell::from(format_time(lap.lap_time as i64)),
            Cell::from(goal_cell.clone()),
            Cell::from(format_delta(lap.delta)),
            Cell::from(status.to_string()),
        ])
        .style(status_style(status))
    });

    let header = Row::new(vec!["#", "TIME", "GOAL", "Δ", "STATUS"]).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(8),
            Constraint::Length(6),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title("Laps"))
    .render(area, buf);
}

fn render_summary(summary: &SessionSummary, area: Rect, buf: &mut Buffer) {
    let lines = if summary.is_empty() {
        vec![Line::from(Span::styled(
            "Record a lap to see the summary",
            Style::default().fg(Color::Gray),
        ))]
    } else {
        vec![
            Line::from(format!("Average Lap: {}", format_time(summary.avg as i64))),
            Line::from(format!("Best Lap: {}", format_time(summary.best as i64))),
            Line::from(format!("Worst Lap: {}", format_time(summary.worst as i64))),
            Line::from(format!("On Target: {:.1}%", summary.on_target_pct)),
            Line::from(format!(
                "Consistency (SD): {}",
                format_seconds(summary.consistency, 2)
            )),
        ]
    };

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Session Summary"))
        .render(area, buf);
}

fn render_chart(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let goal = app.timer.goal();
    let points = lap_points(app.timer.laps());
    let goal_secs = goal.is_set().then(|| goal.goal_ms as f64 / 1000.0);

    let (last_lap, highest_secs) = charting::compute_chart_params(&points, goal_secs);

    let lap_data: Vec<(f64, f64)> = points.iter().copied().map(Into::into).collect();
    let goal_data = goal_secs.map(|g| charting::goal_line(g, last_lap));

    let mut datasets = vec![Dataset::default()
        .name("lap")
        .marker(Marker::Braille)
        .style(Style::default().fg(Color::Magenta))
        .graph_type(GraphType::Line)
        .data(&lap_data)];
    if let Some(goal_data) = goal_data.as_ref() {
        datasets.push(
            Dataset::default()
                .name("goal")
                .marker(Marker::Braille)
                .style(Style::default().fg(Color::Red))
                .graph_type(GraphType::Line)
                .data(goal_data),
        );
    }

    Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title("Lap Times"))
        .x_axis(
            Axis::default()
                .title("lap")
                .bounds([1.0, last_lap])
                .labels(vec![
                    Span::styled("1", bold_style),
                    Span::styled(charting::format_label(last_lap), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("s")
                .bounds([0.0, highest_secs])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(highest_secs), bold_style),
                ]),
        )
        .render(area, buf);
}

fn render_sessions(app: &App, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Past Sessions ({})", app.store.len()));

    if app.store.is_empty() {
        Paragraph::new("No saved sessions yet.\nRecord some laps and press (s) to save one.")
            .block(block)
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .render(area, buf);
        return;
    }

    let visible = area.height.saturating_sub(2) as usize;
    let skip = (app.selected + 1).saturating_sub(visible);

    let lines: Vec<Line> = app
        .store
        .sessions()
        .iter()
        .enumerate()
        .skip(skip)
        .take(visible)
        .map(|(i, s)| {
            let text = format!(
                "{} ({}) - {} laps, Avg: {}",
                s.display_name(),
                s.date,
                s.laps.len(),
                format_time(s.summary.avg as i64)
            );
            if i == app.selected {
                Line::from(Span::styled(
                    format!("> {text}"),
                    Style::default()
                        .bg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(format!("  {text}"))
            }
        })
        .collect();

    Paragraph::new(lines).block(block).render(area, buf);
}
