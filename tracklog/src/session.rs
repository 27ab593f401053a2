//! Interactive waypoint capture.
//!
//! ```text
//!            record key              fix decoded
//!   Idle ────────────────▶ AwaitingFix ─────────▶ NamingPoint ──▶ Idle
//!    │ ▲                        │ Esc / port lost                   (append or "exit")
//!    │ └────────────────────────┘
//!    │ delete key
//!    ├──────────▶ DeleteMode ──▶ Idle   (remove, or cancel on 0 / bad input)
//!    │ quit key
//!    └──────────▶ Exiting               (save row file)
//! ```
//!
//! The session owns the receiver connection and the point list. Both blocking
//! points, waiting for a valid fix and waiting for the operator, run on the
//! calling thread.

use std::{
    io,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::{
    coordinate::{tag_hemisphere, to_decimal_degrees, to_packed_dms},
    error::{CoordinateError, DecodeError, SessionError},
    framer::SentenceFramer,
    nmea::{self, DecodedFix},
    port::{ByteSource, PortProvider},
    store::{Waypoint, WaypointStore},
};

/// Bytes requested from the receiver per read
pub const READ_CHUNK: usize = 256;

pub const NAME_PROMPT: &str = "Point Name: ";
pub const DELETE_PROMPT: &str = "Delete which point number?: ";
pub const RESUME_QUESTION: &str =
    "Do you want to continue where you last left off (answer 'N' to overwrite the data and start again)?";
/// Point name that abandons the capture instead of recording it
pub const CANCEL_NAME: &str = "exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingFix,
    NamingPoint,
    DeleteMode,
    Exiting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Esc,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Record,
    Delete,
}

impl Command {
    pub fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Char('q') => Some(Command::Quit),
            Key::Char('x') => Some(Command::Delete),
            Key::Enter | Key::Char('\n') | Key::Char('\r') => Some(Command::Record),
            _ => None,
        }
    }
}

/// Status line shown below the point list
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Status {
    #[default]
    None,
    /// The row file already exists and may be overwritten
    ExistingOutput(PathBuf),
    WaitingForFix {
        utc_time: Option<String>,
    },
    FixAcquired(Position),
    PortUnavailable(String),
    /// The last capture was abandoned
    CaptureFailed(String),
}

/// A converted fix: the stored packed DMS values with the hemisphere appended,
/// and decimal degrees for display
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub lat: String,
    pub lon: String,
    pub lat_deg: f64,
    pub lon_deg: f64,
}

impl Position {
    pub fn from_fix(fix: &DecodedFix) -> Result<Self, CoordinateError> {
        let lat = to_packed_dms(&fix.lat_raw, false)?;
        let lon = to_packed_dms(&fix.lon_raw, true)?;
        Ok(Self {
            lat: tag_hemisphere(lat, &fix.lat_hemisphere),
            lon: tag_hemisphere(lon, &fix.lon_hemisphere),
            lat_deg: to_decimal_degrees(&fix.lat_raw, false)?,
            lon_deg: to_decimal_degrees(&fix.lon_raw, true)?,
        })
    }
}

/// Everything the operator interface needs to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub state: SessionState,
    pub points: Vec<Waypoint>,
    pub status: Status,
}

/// The operator's terminal.
pub trait Operator {
    fn render(&mut self, screen: &Screen) -> io::Result<()>;

    /// Blocks until the next keypress.
    fn read_key(&mut self) -> io::Result<Key>;

    /// Blocks until the operator submits a line, returned without its terminator.
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;

    fn confirm(&mut self, question: &str) -> io::Result<bool>;

    /// Polled between reads while waiting for a fix. The default never cancels,
    /// which keeps the wait blocking until a fix arrives.
    fn cancel_requested(&mut self) -> io::Result<bool> {
        Ok(false)
    }
}

pub struct CaptureSession<P: PortProvider, O: Operator> {
    provider: P,
    port: Option<P::Port>,
    operator: O,
    framer: SentenceFramer,
    store: WaypointStore,
    output: PathBuf,
    state: SessionState,
    status: Status,
}

impl<P: PortProvider, O: Operator> CaptureSession<P, O> {
    pub fn new(provider: P, operator: O, output: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            port: None,
            operator,
            framer: SentenceFramer::default(),
            store: WaypointStore::new(),
            output: output.into(),
            state: SessionState::Idle,
            status: Status::None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn store(&self) -> &WaypointStore {
        &self.store
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    pub fn operator(&self) -> &O {
        &self.operator
    }

    pub fn into_operator(self) -> O {
        self.operator
    }

    /// Connects, offers to resume, then handles operator input until quit.
    pub fn run(&mut self) -> Result<(), SessionError> {
        self.connect()?;
        self.resume_or_overwrite()?;
        while self.state != SessionState::Exiting {
            self.step()?;
        }
        Ok(())
    }

    /// Tries to open the receiver. A failure is shown to the operator, who must
    /// acknowledge it with any key; the session then continues without a port.
    pub fn connect(&mut self) -> Result<bool, SessionError> {
        match self.provider.acquire() {
            Ok(port) => {
                info!("GPS receiver connected");
                self.port = Some(port);
                self.framer.reset();
                Ok(true)
            },
            Err(e) => {
                warn!("Couldn't connect to GPS: {e}");
                self.port_unavailable(format!("Couldn't connect to GPS: {e}"))?;
                Ok(false)
            },
        }
    }

    /// If the row file exists, asks whether to continue from it. Answering no
    /// starts from an empty list and the file is overwritten on quit.
    pub fn resume_or_overwrite(&mut self) -> Result<(), SessionError> {
        if !self.output.is_file() {
            return Ok(());
        }
        self.status = Status::ExistingOutput(self.output.clone());
        self.render()?;
        if self.operator.confirm(RESUME_QUESTION)? {
            self.store = WaypointStore::load(&self.output)?;
            info!(
                "Resumed {} points from {}",
                self.store.len(),
                self.output.display()
            );
        } else {
            info!("Starting over, {} will be overwritten", self.output.display());
            self.store.clear();
        }
        self.status = Status::None;
        Ok(())
    }

    /// Handles one keypress in the idle state.
    pub fn step(&mut self) -> Result<(), SessionError> {
        self.state = SessionState::Idle;
        self.render()?;
        let key = self.operator.read_key()?;
        match Command::from_key(key) {
            Some(Command::Quit) => self.quit(),
            Some(Command::Record) => {
                self.status = Status::None;
                self.record_point()
            },
            Some(Command::Delete) => {
                self.status = Status::None;
                self.delete_point()
            },
            None => Ok(()),
        }
    }

    fn quit(&mut self) -> Result<(), SessionError> {
        self.store.save(&self.output)?;
        info!(
            "Saved {} points to {}",
            self.store.len(),
            self.output.display()
        );
        self.state = SessionState::Exiting;
        Ok(())
    }

    fn record_point(&mut self) -> Result<(), SessionError> {
        if self.port.is_none() && !self.connect()? {
            self.state = SessionState::Idle;
            return Ok(());
        }

        self.state = SessionState::AwaitingFix;
        self.status = Status::WaitingForFix { utc_time: None };
        self.render()?;

        let fix = match self.wait_for_fix()? {
            Some(fix) => fix,
            None => {
                self.state = SessionState::Idle;
                if matches!(self.status, Status::WaitingForFix { .. }) {
                    self.status = Status::None;
                }
                return Ok(());
            },
        };

        let position = match Position::from_fix(&fix) {
            Ok(v) => v,
            Err(e) => {
                warn!("Discarding fix: {e}");
                self.status = Status::CaptureFailed(e.to_string());
                self.state = SessionState::Idle;
                return Ok(());
            },
        };

        self.state = SessionState::NamingPoint;
        self.status = Status::FixAcquired(position.clone());
        self.render()?;
        let name = self.operator.read_line(NAME_PROMPT)?;
        let name = name.trim_end_matches(['\r', '\n']);

        if name == CANCEL_NAME {
            debug!("Point capture cancelled");
        } else {
            info!(
                "Recorded point {:?} at {} {}",
                name, position.lat, position.lon
            );
            self.store.push(Waypoint::new(name, position.lat, position.lon));
        }
        self.status = Status::None;
        self.state = SessionState::Idle;
        Ok(())
    }

    /// Reads until a `$GNRMC` sentence with a valid fix arrives.
    ///
    /// There is no retry limit or deadline: this returns `None` only when the
    /// operator cancels or the connection breaks.
    pub fn wait_for_fix(&mut self) -> Result<Option<DecodedFix>, SessionError> {
        let mut buf = [0u8; READ_CHUNK];
        self.framer.reset();
        if let Some(port) = self.port.as_mut() {
            if let Err(e) = port.discard_buffered() {
                debug!("Could not flush receiver input: {e}");
            }
        }

        loop {
            if self.operator.cancel_requested()? {
                info!("Waiting for fix cancelled");
                return Ok(None);
            }
            let port = match self.port.as_mut() {
                Some(port) => port,
                None => return Ok(None),
            };
            let nbytes = match port.read_bytes(&mut buf) {
                Ok(n) => n,
                Err(e) => {
                    warn!("GPS connection lost: {e}");
                    self.port = None;
                    self.framer.reset();
                    self.port_unavailable(format!("GPS connection lost: {e}"))?;
                    return Ok(None);
                },
            };
            if nbytes == 0 {
                continue;
            }

            let mut waiting = None;
            for sentence in self.framer.consume(&buf[..nbytes]) {
                match nmea::decode(&sentence) {
                    Ok(fix) => {
                        debug!("Fix: {sentence}");
                        return Ok(Some(fix));
                    },
                    Err(DecodeError::FixNotAcquired { utc_time }) => {
                        waiting = Some(utc_time);
                    },
                    Err(e) => {
                        debug!("Skipping {sentence:?}: {e}");
                    },
                }
            }
            if let Some(utc_time) = waiting {
                self.status = Status::WaitingForFix {
                    utc_time: Some(utc_time),
                };
                self.render()?;
            }
        }
    }

    fn delete_point(&mut self) -> Result<(), SessionError> {
        self.state = SessionState::DeleteMode;
        self.render()?;
        let input = self.operator.read_line(DELETE_PROMPT)?;
        match input.trim().parse::<usize>() {
            Ok(index) => match self.store.delete(index) {
                Ok(Some(point)) => info!("Deleted point {index} {:?}", point.name),
                Ok(None) => debug!("Delete cancelled"),
                Err(e) => debug!("Delete ignored: {e}"),
            },
            Err(_) => debug!("Delete cancelled, {:?} is not a point number", input),
        }
        self.state = SessionState::Idle;
        Ok(())
    }

    fn port_unavailable(&mut self, message: String) -> Result<(), SessionError> {
        self.status = Status::PortUnavailable(message);
        self.render()?;
        self.operator.read_key()?;
        Ok(())
    }

    fn render(&mut self) -> Result<(), SessionError> {
        let screen = Screen {
            state: self.state,
            points: self.store.points().to_vec(),
            status: self.status.clone(),
        };
        self.operator.render(&screen)?;
        Ok(())
    }
}
