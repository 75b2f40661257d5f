//! Rendering of the terminal UI.

use std::time::Instant;

use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, Tabs, Wrap};
use ratatui::Frame;

use super::app::App;
use crate::controllers::{PaneId, TabId};
use crate::models::ScrapeResult;
use crate::render::{camera_box, mountain_box, scrape_cells, stats_box, InfoBox, SCRAPE_HEADER};

const HELP: &[(&str, &str)] = &[
    ("m / M", "next / previous mountain"),
    ("c / C", "next / previous camera"),
    ("s / e", "edit start / end date (YYYY-MM-DD, empty clears)"),
    ("l", "toggle query in the mountain's local time"),
    ("Enter", "load photos"),
    ("w", "load weather (written to an HTML file)"),
    ("1-5, Tab", "switch tab"),
    ("Left / Right", "previous / next frame"),
    ("Space", "play / pause the timelapse"),
    ("+ / -", "timelapse speed"),
    ("Up / Down", "scroll the log"),
    ("q", "quit"),
];

pub fn draw(frame: &mut Frame, app: &App, now: Instant) {
    let [top, tabs, body, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_selection(frame, app, top);
    draw_tabs(frame, app, tabs, now);

    let session = app.session();
    match session.tabs().selected_pane() {
        Some(pane) if session.tabs().is_pane_visible(pane) => match pane {
            PaneId::Help => draw_help(frame, body),
            PaneId::Info => draw_info(frame, app, body),
            PaneId::Timelapse => draw_timelapse(frame, app, body),
            PaneId::Scrapes => draw_scrapes(frame, app, body),
            PaneId::Weather => draw_weather(frame, app, body),
        },
        _ => frame.render_widget(Block::default().borders(Borders::ALL), body),
    }

    draw_footer(frame, app, footer);

    if let Some(message) = app.alert() {
        draw_alert(frame, message);
    }
}

fn draw_selection(frame: &mut Frame, app: &App, area: Rect) {
    let session = app.session();
    let mountain = session
        .mountain()
        .map(|m| m.label())
        .unwrap_or_else(|| "(loading)".to_string());
    let camera = session
        .camera()
        .map(|c| c.label())
        .unwrap_or_else(|| "(none)".to_string());
    let range = session.range();
    let date = |param: String| if param.is_empty() { "(none)".to_string() } else { param };

    let key = Style::default().fg(Color::DarkGray);
    let line = Line::from(vec![
        Span::styled("[m] ", key),
        Span::raw(mountain),
        Span::styled("  [c] ", key),
        Span::raw(camera),
        Span::styled("  [s] ", key),
        Span::raw(date(range.start_param())),
        Span::styled("  [e] ", key),
        Span::raw(date(range.end_param())),
        Span::styled("  [l] ", key),
        Span::raw(format!("local time {}", if session.as_local_time() { "on" } else { "off" })),
    ]);
    let block = Block::default().borders(Borders::ALL).title(" mtcam ");
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_tabs(frame: &mut Frame, app: &App, area: Rect, now: Instant) {
    let tabs = app.session().tabs();
    let visible: Vec<TabId> = tabs.visible_tabs().collect();
    let titles: Vec<Line> = visible
        .iter()
        .map(|id| {
            let number = TabId::ALL.iter().position(|t| t == id).unwrap_or(0) + 1;
            let style = if tabs.is_flashing(*id, now) {
                Style::default().fg(Color::Black).bg(Color::Yellow)
            } else {
                Style::default()
            };
            Line::from(Span::styled(format!("{} {}", number, id.label()), style))
        })
        .collect();
    let selected = tabs
        .selected()
        .and_then(|id| visible.iter().position(|v| *v == id));

    let widget = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL))
        .select(selected)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));
    frame.render_widget(widget, area);
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let lines: Vec<Line> = HELP
        .iter()
        .map(|(keys, action)| {
            Line::from(vec![
                Span::styled(format!("{:>14}  ", keys), Style::default().fg(Color::Cyan)),
                Span::raw(*action),
            ])
        })
        .collect();
    let block = Block::default().borders(Borders::ALL).title(" Help ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn info_paragraph(info: &InfoBox) -> Paragraph<'_> {
    let mut lines = Vec::with_capacity(info.rows.len() + 1);
    if !info.subtitle.is_empty() {
        lines.push(Line::from(Span::styled(
            info.subtitle.as_str(),
            Style::default().fg(Color::DarkGray),
        )));
    }
    for row in &info.rows {
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", row.property), Style::default().fg(Color::Cyan)),
            Span::raw(row.value.as_str()),
        ]));
    }
    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", info.title)))
}

fn draw_info(frame: &mut Frame, app: &App, area: Rect) {
    let session = app.session();
    let mut boxes = Vec::new();
    if let Some(mountain) = session.mountain() {
        boxes.push(mountain_box(mountain));
    }
    if let Some(camera) = session.camera() {
        boxes.push(camera_box(camera));
    }
    if let Some(stats) = session.stats() {
        boxes.push(stats_box(stats));
    }
    if boxes.is_empty() {
        let block = Block::default().borders(Borders::ALL).title(" Info ");
        frame.render_widget(Paragraph::new("No mountain selected").block(block), area);
        return;
    }

    let columns = Layout::horizontal(vec![Constraint::Fill(1); boxes.len()]).split(area);
    for (info, column) in boxes.iter().zip(columns.iter()) {
        frame.render_widget(info_paragraph(info), *column);
    }
}

fn draw_timelapse(frame: &mut Frame, app: &App, area: Rect) {
    let timelapse = app.session().timelapse();
    let block = Block::default().borders(Borders::ALL).title(" Timelapse ");

    let Some(current) = timelapse.current_frame() else {
        frame.render_widget(
            Paragraph::new("no images").alignment(Alignment::Center).block(block),
            area,
        );
        return;
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);
    let [details, gauge, controls] = Layout::vertical([
        Constraint::Min(2),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let lines = vec![
        Line::from(Span::styled(
            current.time.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(current.url.as_str()),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), details);

    let index = timelapse.current_index().unwrap_or(0);
    let ratio = (index + 1) as f64 / timelapse.len() as f64;
    let progress = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(timelapse.progress().unwrap_or_default());
    frame.render_widget(progress, gauge);

    let status = Line::from(vec![
        Span::styled("[Space] ", Style::default().fg(Color::DarkGray)),
        Span::raw(timelapse.play_label()),
        Span::styled("  [+/-] ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{} fps", timelapse.frames_per_second())),
    ]);
    frame.render_widget(Paragraph::new(status), controls);
}

fn draw_scrapes(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Log ");
    let Some(records) = app.session().scrapes() else {
        frame.render_widget(Paragraph::new("No scrapes loaded").block(block), area);
        return;
    };

    let rows: Vec<Row> = records
        .iter()
        .skip(app.log_scroll())
        .map(|record| {
            let style = match record.result {
                ScrapeResult::Success => Style::default().fg(Color::Green),
                ScrapeResult::Failure => Style::default().fg(Color::Red),
                ScrapeResult::Idle => Style::default().fg(Color::DarkGray),
            };
            let [time, result, detail, file] = scrape_cells(record, app.session().frame_base());
            Row::new(vec![
                Cell::from(time),
                Cell::from(result).style(style),
                Cell::from(detail),
                Cell::from(file).style(Style::default().fg(Color::Blue)),
            ])
        })
        .collect();

    let header = Row::new(SCRAPE_HEADER.to_vec())
        .style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED));
    let table = Table::new(
        rows,
        [
            Constraint::Length(24),
            Constraint::Length(8),
            Constraint::Fill(1),
            Constraint::Fill(2),
        ],
    )
    .header(header)
    .block(block.title_bottom(format!(" {} records ", records.len())));
    frame.render_widget(table, area);
}

fn draw_weather(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Weather ");
    let text = match app.weather_written() {
        Some(path) => format!("Weather plot written to {}", path.display()),
        None => "No weather loaded".to_string(),
    };
    frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }).block(block), area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let line = match app.input() {
        Some(input) => Line::from(vec![
            Span::styled(
                format!("{} date: ", input.field.label()),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw(input.buffer.as_str()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]),
        None => Line::from(Span::styled(app.status(), Style::default().fg(Color::DarkGray))),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_alert(frame: &mut Frame, message: &str) {
    let area = centered(frame.area(), 60, 7);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Alert ")
        .title_bottom(" press any key ");
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(message).wrap(Wrap { trim: true }).block(block),
        area,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::services::Session;
    use crate::tui::app::Response;
    use chrono::NaiveDate;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::path::PathBuf;

    fn app() -> App {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let session = Session::new(&Settings::default(), today).unwrap();
        let mut app = App::new(session, PathBuf::from("weather.html"));
        app.on_response(Response::Catalog(Ok(serde_json::from_str(
            r#"[{"id": 1, "name": "Mt. Hood", "state": "OR", "cams": [
                {"id": 4, "name": "Timberline", "elevation_ft": 6000, "interval": 10,
                 "is_active": true}]}]"#,
        )
        .unwrap())));
        app
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| draw(frame, app, Instant::now())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_initial_screen_shows_help() {
        let screen = render(&app());
        assert!(screen.contains("Mt. Hood (OR)"));
        assert!(screen.contains("Timberline (6000ft)"));
        assert!(screen.contains("1 Help"));
        assert!(screen.contains("2 Info"));
        assert!(!screen.contains("3 Timelapse"));
        assert!(screen.contains("load photos"));
    }

    #[test]
    fn test_info_pane_after_loading_photos() {
        let mut app = app();
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), Instant::now());
        let screen = render(&app);
        assert!(screen.contains("3 Timelapse"));
        assert!(screen.contains("4 Log"));
        assert!(!screen.contains("1 Help"));
        assert!(screen.contains("Interval (min): 10"));
    }

    #[test]
    fn test_log_table_shows_image_url() {
        let mut app = app();
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), Instant::now());
        app.on_response(Response::Scrapes(Ok(serde_json::from_str(
            r#"[{"time": "2024-01-01 10:00", "result": "success", "file": "/img/a.jpg", "detail": ""},
                {"time": "2024-01-01 10:10", "result": "failure", "file": "", "detail": "HTTP 503"}]"#,
        )
        .unwrap())));
        app.handle_key(KeyEvent::new(KeyCode::Char('4'), KeyModifiers::NONE), Instant::now());

        let screen = render(&app);
        assert!(screen.contains("File"));
        assert!(screen.contains("http://127.0.0.1:5000/img/a.jpg"));
        assert!(screen.contains("HTTP 503"));
    }

    #[test]
    fn test_alert_popup() {
        let mut app = app();
        app.on_response(Response::Catalog(Err(crate::api::ApiError::Status {
            url: "http://127.0.0.1:5000/api/data".into(),
            status: 503,
        })));
        let screen = render(&app);
        assert!(screen.contains("Alert"));
        assert!(screen.contains("(loading mountains) error 503 was returned"));
    }
}
