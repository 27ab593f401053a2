use chrono::NaiveTime;

use crate::error::DecodeError;

/// Talker and sentence identifier of the recommended minimum position sentence
pub const GNRMC_TALKER: &str = "$GNRMC";

/// Fields up to and including the longitude hemisphere
pub const MIN_GNRMC_FIELDS: usize = 7;

const STATUS_VALID: &str = "A";
const STATUS_INVALID: &str = "V";

/// Position data of a valid `$GNRMC` sentence, copied verbatim from its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFix {
    pub talker_id: String,
    pub utc_time: String,
    pub fix_valid: bool,
    pub lat_raw: String,
    pub lat_hemisphere: String,
    pub lon_raw: String,
    pub lon_hemisphere: String,
}

impl DecodedFix {
    /// UTC time of the fix (`hhmmss.ss`), if the receiver filled it in.
    pub fn time(&self) -> Option<NaiveTime> {
        parse_utc_time(&self.utc_time)
    }
}

pub fn parse_utc_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H%M%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H%M%S"))
        .ok()
}

/// Decodes one framed sentence.
///
/// The status field is checked before the field count so that a receiver still
/// searching for satellites, which sends `$GNRMC,<time>,V,,,,...` with empty or
/// truncated position fields, is always reported as [`DecodeError::FixNotAcquired`].
pub fn decode(sentence: &str) -> Result<DecodedFix, DecodeError> {
    let fields: Vec<&str> = sentence.split(',').collect();
    if fields[0] != GNRMC_TALKER {
        return Err(DecodeError::WrongTalker);
    }
    if fields.get(2) == Some(&STATUS_INVALID) {
        return Err(DecodeError::FixNotAcquired {
            utc_time: fields[1].to_string(),
        });
    }
    if fields.len() < MIN_GNRMC_FIELDS || fields[2] != STATUS_VALID {
        return Err(DecodeError::Malformed {
            fields: fields.len(),
        });
    }

    Ok(DecodedFix {
        talker_id: fields[0].to_string(),
        utc_time: fields[1].to_string(),
        fix_valid: true,
        lat_raw: fields[3].to_string(),
        lat_hemisphere: fields[4].to_string(),
        lon_raw: fields[5].to_string(),
        lon_hemisphere: fields[6].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_valid_fix() {
        let fix = decode("$GNRMC,123519.00,A,4807.038,N,01131.000,E,022.4,084.4,230394,,,A*6A")
            .unwrap();
        assert_eq!(fix.talker_id, "$GNRMC");
        assert!(fix.fix_valid);
        assert_eq!(fix.lat_raw, "4807.038");
        assert_eq!(fix.lat_hemisphere, "N");
        assert_eq!(fix.lon_raw, "01131.000");
        assert_eq!(fix.lon_hemisphere, "E");
        assert_eq!(fix.time(), NaiveTime::from_hms_opt(12, 35, 19));
    }

    #[test]
    fn exactly_seven_fields_is_enough() {
        let fix = decode("$GNRMC,1,A,4807.038,S,01131.000,W").unwrap();
        assert_eq!(fix.lat_hemisphere, "S");
        assert_eq!(fix.lon_hemisphere, "W");
        assert_eq!(fix.time(), None);
    }

    #[test]
    fn rejects_other_talkers() {
        assert_eq!(decode("$GPGGA,1,A,2,N,3,E"), Err(DecodeError::WrongTalker));
        assert_eq!(decode("GNRMC,1,A,2,N,3,E"), Err(DecodeError::WrongTalker));
        assert_eq!(decode(""), Err(DecodeError::WrongTalker));
    }

    #[test]
    fn void_status_wins_over_field_count() {
        assert_eq!(
            decode("$GNRMC,12345,V,..."),
            Err(DecodeError::FixNotAcquired {
                utc_time: "12345".to_string()
            })
        );
    }

    #[test]
    fn short_or_unknown_status_is_malformed() {
        assert_eq!(
            decode("$GNRMC,1,A,4807.038,N"),
            Err(DecodeError::Malformed { fields: 5 })
        );
        assert_eq!(decode("$GNRMC"), Err(DecodeError::Malformed { fields: 1 }));
        assert_eq!(
            decode("$GNRMC,1,X,4807.038,N,01131.000,E"),
            Err(DecodeError::Malformed { fields: 7 })
        );
    }
}
