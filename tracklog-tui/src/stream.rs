use std::{
    fs::File,
    io::{self, Write},
    path::Path,
};

use anyhow::{Context, Result};
use log::info;
use tracklog_device::tracklog::{
    decode, to_decimal_degrees, ByteSource, CandidateSentence, DecodeError, DecodedFix,
    SentenceFramer, READ_CHUNK,
};

/// Written to the working directory, truncated on every start
pub const STREAM_LOG: &str = "gps_log.txt";

/// Appends every valid `$GNRMC` sentence to `out`, one per line, verbatim.
pub struct FixLogger<W: Write> {
    out: W,
    fixes: usize,
}

impl<W: Write> FixLogger<W> {
    pub fn new(out: W) -> Self {
        Self { out, fixes: 0 }
    }

    /// Returns the line to show for `sentence`, if it is worth showing.
    pub fn handle(&mut self, sentence: &CandidateSentence) -> io::Result<Option<String>> {
        match decode(sentence) {
            Ok(fix) => {
                writeln!(self.out, "{sentence}")?;
                self.out.flush()?;
                self.fixes += 1;
                Ok(Some(format!("#{} {}", self.fixes, describe(&fix))))
            },
            Err(DecodeError::FixNotAcquired { utc_time }) => {
                Ok(Some(format!("Positioning not obtained yet! {utc_time}")))
            },
            Err(_) => Ok(None),
        }
    }
}

fn describe(fix: &DecodedFix) -> String {
    let position = match (
        to_decimal_degrees(&fix.lat_raw, false),
        to_decimal_degrees(&fix.lon_raw, true),
    ) {
        (Ok(lat), Ok(lon)) => format!(
            "{lat:.6}{} {lon:.6}{}",
            fix.lat_hemisphere, fix.lon_hemisphere
        ),
        _ => format!(
            "{}{} {}{}",
            fix.lat_raw, fix.lat_hemisphere, fix.lon_raw, fix.lon_hemisphere
        ),
    };
    match fix.time() {
        Some(time) => format!("{} {position}", time.format("%H:%M:%S")),
        None => position,
    }
}

/// Streams fixes from `port` into the file at `path` until the connection
/// breaks.
pub fn run<S: ByteSource>(mut port: S, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    info!("Logging valid fixes to {}", path.display());

    let mut logger = FixLogger::new(file);
    let mut framer = SentenceFramer::default();
    let mut buf = [0u8; READ_CHUNK];
    loop {
        let nbytes = port.read_bytes(&mut buf).context("GPS connection lost")?;
        for sentence in framer.consume(&buf[..nbytes]) {
            let line = logger
                .handle(&sentence)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if let Some(line) = line {
                info!("{line}");
            }
        }
    }
}
