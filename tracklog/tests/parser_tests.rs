use proptest::prelude::*;
use tracklog::{decode, DecodeError, DecodedFix, FixedLinearBuffer, SentenceFramer};

static MIXED_STREAM: &[u8] =
    b"$GPXXX,...\r\n$GNRMC,12345,V,...\r\n$GNRMC,12345,A,4807.038,N,01131.000,E,...\r\n";

fn decode_all<I: IntoIterator<Item = tracklog::CandidateSentence>>(
    sentences: I,
) -> Vec<Result<DecodedFix, DecodeError>> {
    sentences.into_iter().map(|s| decode(&s)).collect()
}

#[test]
fn test_mixed_stream_yields_one_fix() {
    let mut framer = SentenceFramer::default();
    let results = decode_all(framer.consume(MIXED_STREAM));
    assert_eq!(results.len(), 3);
    assert_eq!(results[0], Err(DecodeError::WrongTalker));
    assert_eq!(
        results[1],
        Err(DecodeError::FixNotAcquired {
            utc_time: "12345".to_string()
        })
    );
    let fix = results[2].as_ref().unwrap();
    assert!(fix.fix_valid);
    assert_eq!(fix.lat_raw, "4807.038");
    assert_eq!(fix.lon_raw, "01131.000");
    assert!(framer.is_buffer_empty());
}

#[test]
fn test_mixed_stream_any_chunk_size() {
    for chunk in 1..MIXED_STREAM.len() {
        let mut framer = SentenceFramer::default();
        let mut fixes = vec![];
        for part in MIXED_STREAM.chunks(chunk) {
            fixes.extend(decode_all(framer.consume(part)).into_iter().filter_map(Result::ok));
        }
        assert_eq!(fixes.len(), 1, "chunk size {chunk}");
        assert_eq!(fixes[0].lat_hemisphere, "N");
        assert_eq!(fixes[0].lon_hemisphere, "E");
    }
}

#[test]
fn test_fixed_buffer_stream() {
    let mut storage = [0u8; 96];
    let mut framer = SentenceFramer::new(FixedLinearBuffer::new(&mut storage));
    let mut fixes = vec![];
    for part in MIXED_STREAM.chunks(10) {
        fixes.extend(decode_all(framer.consume(part)).into_iter().filter_map(Result::ok));
    }
    assert_eq!(fixes.len(), 1);
}

#[test]
fn test_stream_starting_mid_sentence() {
    let mut framer = SentenceFramer::default();
    let data = b"07.038,N,01131.000,E\r\n$GNRMC,2,A,4807.038,N,01131.000,E\r\n";
    let results = decode_all(framer.consume(data));
    assert_eq!(results[0], Err(DecodeError::WrongTalker));
    assert_eq!(results[1].as_ref().unwrap().utc_time, "2");
}

fn lat_field() -> impl Strategy<Value = String> {
    "[0-8][0-9][0-5][0-9]\\.[0-9]{1,7}"
}

fn lon_field() -> impl Strategy<Value = String> {
    "(0[0-9][0-9]|1[0-7][0-9])[0-5][0-9]\\.[0-9]{1,7}"
}

proptest! {
    #[test]
    fn valid_fix_fields_are_verbatim(
        time in "[0-9]{6}\\.[0-9]{2}",
        lat in lat_field(),
        lat_hem in "[NS]",
        lon in lon_field(),
        lon_hem in "[EW]",
        tail in "(,[0-9.A-Z]*){0,6}",
    ) {
        let sentence = format!("$GNRMC,{time},A,{lat},{lat_hem},{lon},{lon_hem}{tail}");
        let fix = decode(&sentence).unwrap();
        prop_assert!(fix.fix_valid);
        prop_assert_eq!(&fix.talker_id, "$GNRMC");
        prop_assert!(sentence.contains(&fix.talker_id));
        prop_assert_eq!(&fix.lat_hemisphere, &lat_hem);
        prop_assert_eq!(&fix.lon_hemisphere, &lon_hem);
        prop_assert_eq!(&fix.lat_raw, &lat);
        prop_assert_eq!(&fix.lon_raw, &lon);
    }

    #[test]
    fn void_status_never_decodes(time in "[0-9.]*", tail in "(,.*)?") {
        let sentence = format!("$GNRMC,{time},V{tail}");
        let is_not_acquired = matches!(decode(&sentence), Err(DecodeError::FixNotAcquired { .. }));
        prop_assert!(is_not_acquired);
    }

    #[test]
    fn decimal_degrees_of_valid_latitude(lat in lat_field()) {
        let deg = tracklog::to_decimal_degrees(&lat, false).unwrap();
        let whole: f64 = lat[..2].parse().unwrap();
        prop_assert!(deg >= whole && deg < whole + 1.0);
    }
}
