//! Unit tests for the timestamp formats accepted by the converter.

use std::str::FromStr;

use candle_downloader::convert::{
    convert_text, parse_timestamp, ConvertError, ConvertOptions, DateFormat,
};

#[test]
fn test_format_names() {
    assert_eq!(DateFormat::from_str("ms").unwrap(), DateFormat::Ms);
    assert_eq!(DateFormat::from_str("datetime").unwrap(), DateFormat::DateTime);
    assert_eq!(DateFormat::from_str("s").unwrap(), DateFormat::Seconds);
    assert_eq!(DateFormat::from_str("half").unwrap(), DateFormat::Half);
}

#[test]
fn test_unknown_format_name_is_fatal() {
    let err = DateFormat::from_str("rfc3339").unwrap_err();
    assert!(matches!(err, ConvertError::UnknownDateFormat(_)));
}

#[test]
fn test_ms_values() {
    assert_eq!(
        parse_timestamp("1609459200000", DateFormat::Ms, 1).unwrap(),
        1609459200
    );
    // Legacy rows carry truncated millisecond values; padding must restore
    // the same instant as the full 13-digit form.
    for truncated in ["16094592", "160945920", "16094592000"] {
        assert_eq!(
            parse_timestamp(truncated, DateFormat::Ms, 1).unwrap(),
            1609459200,
            "padding failed for {truncated}"
        );
    }
}

#[test]
fn test_seconds_values() {
    assert_eq!(
        parse_timestamp("1609459200", DateFormat::Seconds, 1).unwrap(),
        1609459200
    );
}

#[test]
fn test_half_heuristic() {
    // Fractional field means float seconds, integer means milliseconds.
    assert_eq!(
        parse_timestamp("1609459200.5", DateFormat::Half, 1).unwrap(),
        1609459200
    );
    assert_eq!(
        parse_timestamp("1609459200000", DateFormat::Half, 1).unwrap(),
        1609459200
    );
}

#[test]
fn test_datetime_local_round_trip() {
    use chrono::TimeZone;

    let seconds = parse_timestamp("20200102 030405", DateFormat::DateTime, 1).unwrap();
    let back = chrono::Local.timestamp_opt(seconds as i64, 0).unwrap();
    assert_eq!(back.format("%Y%m%d %H%M%S").to_string(), "20200102 030405");

    // Same fixed offsets regardless of the separator byte.
    let dashed = parse_timestamp("20200102-030405", DateFormat::DateTime, 1).unwrap();
    assert_eq!(dashed, seconds);
}

#[test]
fn test_bad_timestamp_reports_line_number() {
    let input = "timestamp,open,high,low,close\n1609459200000,1,2,3,4\nnot-a-time,1,2,3,4\n";
    let err = convert_text(input, &ConvertOptions::default()).unwrap_err();
    match err {
        ConvertError::BadTimestamp { line, value } => {
            assert_eq!(line, 3);
            assert_eq!(value, "not-a-time");
        }
        other => panic!("unexpected error: {other}"),
    }
}
