//! # tracklog
//!
//! Decodes the `$GNRMC` position sentences of an NMEA-0183 GPS receiver and lets an
//! operator record named waypoints into a `name,lat,lon` row file.
//!
//! A terminal front end for a serial receiver lives in the `tracklog-tui` crate of
//! this workspace, the serial port adapter in `tracklog-device`.
//!
//! Framing Sentences
//! =================
//!
//! Feed whatever the serial port returned into a `SentenceFramer`. It keeps the
//! unterminated tail between calls and yields each complete line:
//! ```
//! use tracklog::{decode, SentenceFramer};
//!
//! let mut framer = SentenceFramer::default();
//! let reads: [&[u8]; 2] = [b"$GNRMC,123519,A,4807.03", b"8,N,01131.000,E,022.4\r\n"];
//! let mut fixes = Vec::new();
//! for data in reads {
//!     for sentence in framer.consume(data) {
//!         if let Ok(fix) = decode(&sentence) {
//!             fixes.push(fix);
//!         }
//!     }
//! }
//! assert_eq!(fixes[0].lat_raw, "4807.038");
//! ```
//!
//! A framer that never allocates can be built over a borrowed buffer:
//! ```
//! let mut buf = [0; 128];
//! let buf = tracklog::FixedLinearBuffer::new(&mut buf[..]);
//! let framer = tracklog::SentenceFramer::new(buf);
//! assert!(framer.is_buffer_empty());
//! ```
//!
//! Converting Coordinates
//! ======================
//!
//! ```
//! let lat = tracklog::to_decimal_degrees("4807.038", false).unwrap();
//! assert!((lat - 48.1173).abs() < 1e-4);
//!
//! let packed = tracklog::to_packed_dms("4807.03800", false).unwrap();
//! assert_eq!(packed as u64 / 10000, 48);
//! ```
//!
//! Capturing Waypoints
//! ===================
//!
//! `CaptureSession` drives the capture loop over two seams: a `PortProvider` that
//! opens the receiver and an `Operator` that draws the screen and reads keys.

pub use crate::{
    coordinate::{
        tag_hemisphere, to_decimal_degrees, to_packed_dms, Axis, DegreesMinutes,
    },
    error::{CoordinateError, DecodeError, SessionError, StoreError},
    framer::{
        CandidateSentence, FixedLinearBuffer, SentenceFramer, SentenceIter, UnderlyingBuffer,
        MAX_SENTENCE_LEN,
    },
    nmea::{decode, parse_utc_time, DecodedFix, GNRMC_TALKER, MIN_GNRMC_FIELDS},
    port::{ByteSource, PortProvider, ReaderSource},
    session::{
        CaptureSession, Command, Key, Operator, Position, Screen, SessionState, Status,
        CANCEL_NAME, DELETE_PROMPT, NAME_PROMPT, READ_CHUNK, RESUME_QUESTION,
    },
    store::{Waypoint, WaypointStore, HEADER},
};

pub mod coordinate;
mod error;
mod framer;
pub mod nmea;
mod port;
pub mod session;
mod store;
