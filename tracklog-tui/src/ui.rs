use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget, Wrap},
    Frame,
};

use tracklog_device::tracklog::{SessionState, Status, Waypoint};
use tui_logger::{TuiLoggerLevelOutput, TuiLoggerWidget};
use unicode_width::UnicodeWidthStr;

use crate::tui::View;

pub const TITLE: &str = "GPS Logging App";

#[derive(Debug, Default)]
pub struct LogWidget;

impl Widget for &mut LogWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        TuiLoggerWidget::default()
            .block(Block::bordered().title("Log"))
            .style_error(Style::default().fg(Color::Red))
            .style_warn(Style::default().fg(Color::Yellow))
            .style_info(Style::default().fg(Color::Green))
            .style_debug(Style::default().fg(Color::White))
            .style_trace(Style::default().fg(Color::Magenta))
            .output_separator(':')
            .output_timestamp(Some("%H:%M:%S%.3f".to_string()))
            .output_level(Some(TuiLoggerLevelOutput::Long))
            .output_target(false)
            .output_file(false)
            .output_line(false)
            .style(Style::default().fg(Color::White))
            .render(area, buf);
    }
}

pub fn draw(frame: &mut Frame, view: &mut View) {
    let chunks = Layout::vertical([
        Constraint::Length(4),
        Constraint::Min(5),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(8),
    ])
    .split(frame.area());

    render_header(frame, chunks[0], view.screen.state);
    render_points(frame, chunks[1], &view.screen.points);
    render_status(frame, chunks[2], &view.screen.status);
    render_input(frame, chunks[3], view);
    frame.render_widget(&mut view.log_widget, chunks[4]);
}

fn key_hints(state: SessionState) -> &'static str {
    match state {
        SessionState::Idle => {
            "[Press q to Save and Exit]   [Press x to Enter Delete Mode]   [Press ENTER to Log a New Point]"
        },
        SessionState::AwaitingFix => "[Press ESC to stop waiting for a fix]",
        SessionState::NamingPoint => "Type exit and press ENTER to cancel creating a new point",
        SessionState::DeleteMode => "Enter 0 to cancel",
        SessionState::Exiting => "Saving...",
    }
}

fn render_header(frame: &mut Frame, area: Rect, state: SessionState) {
    let block = Block::bordered()
        .title(Span::styled(
            TITLE,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);
    let hints = Paragraph::new(Line::from(Span::styled(
        key_hints(state),
        Style::default().fg(Color::Cyan),
    )))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(block);
    frame.render_widget(hints, area);
}

fn pad(name: &str, width: usize) -> String {
    let fill = width.saturating_sub(name.width());
    format!("{name}{}", " ".repeat(fill))
}

/// One numbered row per point, names padded to the widest one
pub fn point_lines(points: &[Waypoint]) -> Vec<Line<'static>> {
    let width = points.iter().map(|p| p.name.width()).max().unwrap_or(0);
    let value = Style::default().fg(Color::Green);
    points
        .iter()
        .enumerate()
        .map(|(idx, point)| {
            Line::from(vec![
                Span::raw(format!("{}. Name: ", idx + 1)),
                Span::styled(pad(&point.name, width), value),
                Span::raw("  Latitude: "),
                Span::styled(point.lat.clone(), value),
                Span::raw("   Longitude: "),
                Span::styled(point.lon.clone(), value),
            ])
        })
        .collect()
}

fn render_points(frame: &mut Frame, area: Rect, points: &[Waypoint]) {
    // Keep the newest points visible once the list outgrows the pane
    let rows = area.height.saturating_sub(2) as usize;
    let lines = point_lines(points);
    let skip = lines.len().saturating_sub(rows);
    let paragraph = Paragraph::new(lines.into_iter().skip(skip).collect::<Vec<_>>())
        .block(Block::bordered().title("Points Recorded This Run"));
    frame.render_widget(paragraph, area);
}

pub fn status_line(status: &Status) -> Line<'static> {
    let red = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);
    match status {
        Status::None => Line::default(),
        Status::ExistingOutput(path) => Line::from(Span::styled(
            format!("Output file ({}) already exists.", path.display()),
            red,
        )),
        Status::WaitingForFix { utc_time: None } => Line::from(Span::styled(
            "Waiting for a GPS fix...",
            Style::default().fg(Color::Yellow),
        )),
        Status::WaitingForFix {
            utc_time: Some(time),
        } => Line::from(Span::styled(
            format!("Positioning not obtained yet! {time}"),
            Style::default().fg(Color::Yellow),
        )),
        Status::FixAcquired(pos) => Line::from(Span::styled(
            format!(
                "Lat: {}   Lon: {}   ({:.6}, {:.6})",
                pos.lat, pos.lon, pos.lat_deg, pos.lon_deg
            ),
            Style::default().fg(Color::Green),
        )),
        Status::PortUnavailable(msg) => Line::from(Span::styled(
            format!("{msg}. Press any key to continue"),
            red,
        )),
        Status::CaptureFailed(msg) => Line::from(Span::styled(
            format!("Point not recorded: {msg}"),
            red,
        )),
    }
}

fn render_status(frame: &mut Frame, area: Rect, status: &Status) {
    let paragraph = Paragraph::new(status_line(status)).block(Block::bordered().title("Status"));
    frame.render_widget(paragraph, area);
}

fn render_input(frame: &mut Frame, area: Rect, view: &View) {
    let block = Block::bordered().title("Input");
    if let Some(question) = &view.question {
        let line = Line::from(vec![
            Span::styled(question.clone(), Style::default().fg(Color::Yellow)),
            Span::raw(" [y/n]"),
        ]);
        frame.render_widget(Paragraph::new(line).block(block), area);
    } else if let Some(input) = &view.input {
        let line = Line::from(vec![
            Span::styled(input.prompt.clone(), Style::default().fg(Color::Cyan)),
            Span::raw(input.text.clone()),
        ]);
        frame.render_widget(Paragraph::new(line).block(block), area);
        let typed = input.prompt.width() + input.text.width();
        let x = area
            .x
            .saturating_add(1)
            .saturating_add(u16::try_from(typed).unwrap_or(u16::MAX))
            .min(area.right().saturating_sub(2));
        frame.set_cursor_position(Position::new(x, area.y + 1));
    } else {
        frame.render_widget(block, area);
    }
}
