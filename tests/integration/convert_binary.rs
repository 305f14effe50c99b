//! Integration tests for CSV and ZIP to binary conversion.

use std::io::Write;
use std::path::Path;

use tempfile::TempDir;

use candle_downloader::convert::binary::RECORD_SIZE;
use candle_downloader::convert::{convert_file, convert_text, ConvertOptions, DateFormat};

#[test]
fn test_single_row_encodes_to_twenty_bytes() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("BTCUSDT-1h-futures-binance-data.csv");
    std::fs::write(
        &input,
        "timestamp,open,high,low,close\n1609459200000,100,110,90,105\n",
    )
    .unwrap();

    let output = convert_file(&input, dir.path().join("out").as_path(), &ConvertOptions::default())
        .unwrap();
    assert_eq!(
        output,
        dir.path().join("out/BTCUSDT-1h-futures-binance-data.bin")
    );

    let bytes = std::fs::read(&output).unwrap();
    assert_eq!(bytes.len(), RECORD_SIZE);
    assert_eq!(&bytes[0..4], &1609459200i32.to_le_bytes());
    assert_eq!(&bytes[4..8], &100.0f32.to_le_bytes());
    assert_eq!(&bytes[8..12], &110.0f32.to_le_bytes());
    assert_eq!(&bytes[12..16], &90.0f32.to_le_bytes());
    assert_eq!(&bytes[16..20], &105.0f32.to_le_bytes());
}

#[test]
fn test_truncated_legacy_timestamps_encode_identically() {
    let full = convert_text(
        "h\n1609459200000,100,110,90,105\n",
        &ConvertOptions::default(),
    )
    .unwrap();
    let truncated = convert_text(
        "h\n16094592000,100,110,90,105\n",
        &ConvertOptions::default(),
    )
    .unwrap();
    assert_eq!(full, truncated);
}

#[test]
fn test_adjacent_duplicate_rows_collapse() {
    let input = "h\n\
                 1609459200000,1,1,1,1\n\
                 1609459200000,9,9,9,9\n\
                 1609462800000,2,2,2,2\n";
    let records = convert_text(input, &ConvertOptions::default()).unwrap();
    assert_eq!(records.len(), 2);
    // The first occurrence wins.
    assert_eq!(records[0].open, 1.0);
}

#[test]
fn test_historical_layout_newest_first() {
    // Historical dumps put OHLC in columns 3..=6 and list rows newest-first.
    let options = ConvertOptions {
        ohlc_columns: [3, 4, 5, 6],
        reverse: true,
        ..ConvertOptions::default()
    };
    let input = "h\n\
                 1609462800000,x,y,200,210,190,205\n\
                 1609459200000,x,y,100,110,90,105\n";
    let records = convert_text(input, &options).unwrap();
    assert_eq!(records[0].time_s, 1609459200);
    assert_eq!(records[0].open, 100.0);
    assert_eq!(records[1].time_s, 1609462800);
    assert_eq!(records[1].close, 205.0);
}

#[test]
fn test_fx_rows_use_semicolons() {
    let options = ConvertOptions {
        delimiter: b';',
        date_format: DateFormat::DateTime,
        skip_lines: 0,
        ..ConvertOptions::default()
    };
    let records = convert_text("20200102 030405;1.1000;1.1010;1.0990;1.1005\n", &options).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].open, 1.1000);
    assert_eq!(records[0].close, 1.1005);
}

#[test]
fn test_zip_archives_convert_like_plain_csv() {
    let dir = TempDir::new().unwrap();
    let zip_path = dir.path().join("BTCUSDT-1m-2021-01.zip");
    write_zip(
        &zip_path,
        "BTCUSDT-1m-2021-01.csv",
        "timestamp,open,high,low,close\n1609459200000,100,110,90,105\n1609459260000,105,115,95,110\n",
    );

    let output = convert_file(&zip_path, dir.path().join("out").as_path(), &ConvertOptions::default())
        .unwrap();
    assert_eq!(output.extension().unwrap(), "bin");

    let bytes = std::fs::read(&output).unwrap();
    assert_eq!(bytes.len(), 2 * RECORD_SIZE);
    assert_eq!(&bytes[20..24], &1609459260i32.to_le_bytes());
}

fn write_zip(path: &Path, entry_name: &str, contents: &str) {
    let file = std::fs::File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    writer
        .start_file(entry_name, zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(contents.as_bytes()).unwrap();
    writer.finish().unwrap();
}
