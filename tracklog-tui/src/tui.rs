use std::{
    io::{self, Stdout},
    path::Path,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::ArgMatches;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    crossterm::{
        event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    },
    Terminal,
};
use tracing::{debug, info};
use tracklog_device::{
    cli::Command,
    tracklog::{CaptureSession, Key, Operator, Screen, SessionState, Status},
    SerialProvider,
};

use crate::{cli, ui, ui::LogWidget};

/// A line being typed by the operator
#[derive(Debug, Clone, Default)]
pub struct InputLine {
    pub prompt: String,
    pub text: String,
}

/// What the next frame shows
pub struct View {
    pub screen: Screen,
    pub input: Option<InputLine>,
    pub question: Option<String>,
    pub log_widget: LogWidget,
}

impl Default for View {
    fn default() -> Self {
        Self {
            screen: Screen {
                state: SessionState::Idle,
                points: Vec::new(),
                status: Status::None,
            },
            input: None,
            question: None,
            log_widget: LogWidget,
        }
    }
}

pub fn to_key(key: KeyEvent) -> Key {
    match key.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Esc,
        _ => Key::Other,
    }
}

/// Draws the session with ratatui and reads the operator's keys from crossterm.
pub struct TerminalOperator<B: Backend> {
    terminal: Terminal<B>,
    view: View,
    tick_rate: Duration,
}

impl TerminalOperator<CrosstermBackend<Stdout>> {
    pub fn setup(tick_rate: Duration) -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self::new(terminal, tick_rate))
    }

    pub fn restore(mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()
    }
}

impl<B: Backend> TerminalOperator<B> {
    pub fn new(terminal: Terminal<B>, tick_rate: Duration) -> Self {
        Self {
            terminal,
            view: View::default(),
            tick_rate,
        }
    }

    fn draw(&mut self) -> io::Result<()> {
        self.terminal.draw(|frame| ui::draw(frame, &mut self.view))?;
        Ok(())
    }

    /// Redraws every tick so the log pane stays live until a key is pressed
    fn next_key(&mut self) -> io::Result<KeyEvent> {
        loop {
            self.draw()?;
            if event::poll(self.tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        return Ok(key);
                    }
                }
            }
        }
    }
}

impl<B: Backend> Operator for TerminalOperator<B> {
    fn render(&mut self, screen: &Screen) -> io::Result<()> {
        self.view.screen = screen.clone();
        self.draw()
    }

    fn read_key(&mut self) -> io::Result<Key> {
        let key = self.next_key()?;
        Ok(to_key(key))
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        self.view.input = Some(InputLine {
            prompt: prompt.to_string(),
            text: String::new(),
        });
        loop {
            let key = self.next_key()?;
            let input = match self.view.input.as_mut() {
                Some(input) => input,
                None => break,
            };
            match key.code {
                KeyCode::Enter => break,
                KeyCode::Backspace => {
                    input.text.pop();
                },
                KeyCode::Char(c) => input.text.push(c),
                _ => {},
            }
        }
        let line = self.view.input.take().map(|i| i.text).unwrap_or_default();
        self.draw()?;
        Ok(line)
    }

    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        self.view.question = Some(question.to_string());
        let answer = loop {
            match self.next_key()?.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => break true,
                KeyCode::Char('n') | KeyCode::Char('N') => break false,
                _ => {},
            }
        };
        self.view.question = None;
        self.draw()?;
        Ok(answer)
    }

    fn cancel_requested(&mut self) -> io::Result<bool> {
        self.draw()?;
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && key.code == KeyCode::Esc {
                    return Ok(true);
                }
                debug!("Ignoring {:?} while waiting for a fix", key.code);
            }
        }
        Ok(false)
    }
}

pub fn run(cli: &ArgMatches, log_dir: &Path) -> Result<()> {
    let settings = Command::port_settings(cli)?;
    let output = Command::output(cli)?;
    let tick_rate = Duration::from_millis(cli::tui_rate(cli));
    info!("Waypoints are saved to {}", output.display());

    let operator = TerminalOperator::setup(tick_rate).context("Failed to set up the terminal")?;
    let mut session = CaptureSession::new(SerialProvider::new(settings), operator, &output);
    let result = session.run();
    let saved = session.store().len();

    // Restore terminal
    session
        .into_operator()
        .restore()
        .context("Failed to restore the terminal")?;

    result.context("Capture session failed")?;
    println!("Saved {saved} points to {}", output.display());
    if !log_dir.as_os_str().is_empty() {
        println!("See the log file in {}", log_dir.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, crossterm::event::KeyModifiers};
    use tracklog_device::tracklog::Waypoint;

    fn text(operator: &TerminalOperator<TestBackend>) -> String {
        operator
            .terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn key_mapping() {
        let key = |code| to_key(KeyEvent::new(code, KeyModifiers::NONE));
        assert_eq!(key(KeyCode::Char('q')), Key::Char('q'));
        assert_eq!(key(KeyCode::Enter), Key::Enter);
        assert_eq!(key(KeyCode::Esc), Key::Esc);
        assert_eq!(key(KeyCode::Tab), Key::Other);
    }

    #[test]
    fn renders_points_and_status() {
        let terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        let mut operator = TerminalOperator::new(terminal, Duration::from_millis(10));
        let screen = Screen {
            state: SessionState::Idle,
            points: vec![Waypoint::new("gate", "480702.2800N", "113100.0000E")],
            status: Status::WaitingForFix {
                utc_time: Some("101500.00".to_string()),
            },
        };
        operator.render(&screen).unwrap();

        assert_eq!(operator.view.screen, screen);
        let shown = text(&operator);
        assert!(shown.contains(ui::TITLE));
        assert!(shown.contains("1. Name: gate"));
        assert!(shown.contains("Positioning not obtained yet! 101500.00"));
    }
}
