//! Conversions from the NMEA degrees-decimal-minutes fields (`ddmm.mmmm` for
//! latitude, `dddmm.mmmm` for longitude).
//!
//! Two output forms are provided:
//!
//! * decimal degrees, `dd + mm.mmmm / 60`, used for display;
//! * packed degrees-minutes-seconds, a single number laid out as `dddmmss.ssss`,
//!   used for stored waypoints.
//!
//! Neither applies the hemisphere as a sign. Stored values carry the hemisphere
//! letter as a suffix, see [`tag_hemisphere`].

use crate::error::CoordinateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    pub fn from_is_longitude(is_longitude: bool) -> Self {
        if is_longitude {
            Axis::Longitude
        } else {
            Axis::Latitude
        }
    }

    /// Number of leading degree digits in the NMEA field
    pub const fn degree_digits(self) -> usize {
        match self {
            Axis::Latitude => 2,
            Axis::Longitude => 3,
        }
    }

    /// Exact field length accepted by the packed conversion
    pub const fn packed_len(self) -> usize {
        match self {
            Axis::Latitude => 10,
            Axis::Longitude => 11,
        }
    }
}

/// A validated degrees-decimal-minutes value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegreesMinutes {
    pub degrees: u32,
    pub minutes: f64,
}

fn invalid(raw: &str, reason: &'static str) -> CoordinateError {
    CoordinateError::InvalidFormat {
        raw: raw.to_string(),
        reason,
    }
}

impl DegreesMinutes {
    /// Splits `raw` after the axis' fixed number of degree digits.
    pub fn parse(raw: &str, axis: Axis) -> Result<Self, CoordinateError> {
        let split = axis.degree_digits();
        if !raw.is_ascii() || raw.len() <= split {
            return Err(invalid(raw, "too short"));
        }
        let (deg, min) = raw.split_at(split);
        if !deg.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid(raw, "degrees are not numeric"));
        }
        if !min.starts_with(|c: char| c.is_ascii_digit())
            || !min.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        {
            return Err(invalid(raw, "minutes are not a decimal number"));
        }
        let minutes: f64 = min
            .parse()
            .map_err(|_| invalid(raw, "minutes are not a decimal number"))?;
        if minutes >= 60.0 {
            return Err(invalid(raw, "minutes out of range"));
        }
        let degrees = deg
            .parse()
            .map_err(|_| invalid(raw, "degrees are not numeric"))?;
        Ok(Self { degrees, minutes })
    }

    pub fn decimal_degrees(&self) -> f64 {
        self.degrees as f64 + self.minutes / 60.0
    }

    pub fn packed_dms(&self) -> f64 {
        let whole_minutes = self.minutes.trunc();
        let seconds = (self.minutes - whole_minutes) * 60.0;
        self.degrees as f64 * 10000.0 + whole_minutes * 100.0 + seconds
    }
}

/// `ddmm.mmmm` / `dddmm.mmmm` to decimal degrees. Any length is accepted.
pub fn to_decimal_degrees(raw: &str, is_longitude: bool) -> Result<f64, CoordinateError> {
    DegreesMinutes::parse(raw, Axis::from_is_longitude(is_longitude)).map(|v| v.decimal_degrees())
}

/// `ddmm.mmmmmmm` / `dddmm.mmmmmmm` to `dddmmss.ssss`.
///
/// The field must be exactly 10 (latitude) or 11 (longitude) characters long.
pub fn to_packed_dms(raw: &str, is_longitude: bool) -> Result<f64, CoordinateError> {
    let axis = Axis::from_is_longitude(is_longitude);
    if raw.len() != axis.packed_len() {
        return Err(invalid(
            raw,
            match axis {
                Axis::Latitude => "latitude must be 10 characters",
                Axis::Longitude => "longitude must be 11 characters",
            },
        ));
    }
    DegreesMinutes::parse(raw, axis).map(|v| v.packed_dms())
}

/// Formats a converted value for storage: four decimals followed by the
/// hemisphere letter, e.g. `480702.2800N`.
pub fn tag_hemisphere(value: f64, hemisphere: &str) -> String {
    format!("{:.4}{}", value, hemisphere)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn decimal_degrees() {
        assert!(close(to_decimal_degrees("4807.038", false).unwrap(), 48.1173));
        assert!(close(to_decimal_degrees("01131.000", true).unwrap(), 11.5167));
        assert!(close(to_decimal_degrees("0000.0", false).unwrap(), 0.0));
    }

    #[test]
    fn decimal_degrees_rejects_garbage() {
        for (raw, lon) in [
            ("", false),
            ("48", false),
            ("4x07.038", false),
            ("48-7.038", false),
            ("48inf", false),
            ("4807.03.8", false),
            ("011", true),
        ] {
            assert!(
                matches!(
                    to_decimal_degrees(raw, lon),
                    Err(CoordinateError::InvalidFormat { .. })
                ),
                "{raw:?} accepted"
            );
        }
    }

    #[test]
    fn minutes_must_stay_below_sixty() {
        assert!(to_decimal_degrees("4860.000", false).is_err());
        assert!(close(to_decimal_degrees("4859.999", false).unwrap(), 48.99998));
    }

    #[test]
    fn packed_dms() {
        let lat = to_packed_dms("4807.03800", false).unwrap();
        assert_eq!((lat as u64) / 10000, 48);
        assert!(close(lat, 480702.28));

        let lon = to_packed_dms("01131.50000", true).unwrap();
        assert_eq!((lon as u64) / 10000, 11);
        assert!(close(lon, 113130.0));
    }

    #[test]
    fn packed_dms_checks_length() {
        assert!(to_packed_dms("4807.038", false).is_err());
        assert!(to_packed_dms("4807.038000", false).is_err());
        assert!(to_packed_dms("01131.0000", true).is_err());
        assert!(to_packed_dms("01131.000000", true).is_err());
    }

    #[test]
    fn hemisphere_is_a_suffix() {
        assert_eq!(tag_hemisphere(480702.28, "N"), "480702.2800N");
        assert_eq!(tag_hemisphere(113130.0, "W"), "113130.0000W");
    }
}
