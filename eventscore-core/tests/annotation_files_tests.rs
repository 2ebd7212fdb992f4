//! Tests for reading annotation files from disk
//!
//! These tests verify:
//! - Byte-order marks, CRLF line endings and multi-line labels
//! - Malformed files: an error from the parser, no entries from the loaders
//! - Timestamp fields too large for a millisecond count
//! - Label filtering of ground-truth files

use eventscore_core::annotations::{LabelFilter, load_events, load_truths};
use eventscore_core::subrip::{self, parse_str};
use eventscore_core::{CoreError, MatchingPolicy, Timestamp};
use std::fs;
use tempfile::tempdir;

const GROUND_TRUTH: &str = "1\r\n\
00:00:10,000 --> 00:00:20,000\r\n\
Intrusion: person climbing\r\n\
the fence\r\n\
\r\n\
\r\n\
2\r\n\
00:01:00,000 --> 00:01:10,500\r\n\
bird\r\n\
\r\n\
3\r\n\
00:02:00,000 --> 00:02:05,000\r\n\
intrusion ambiguous\r\n";

fn utf16le_with_bom(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes
}

#[test]
fn test_parse_crlf_and_multiline_labels() -> Result<(), Box<dyn std::error::Error>> {
    let entries = parse_str(GROUND_TRUTH)?;
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].text, "Intrusion: person climbing\nthe fence");
    assert_eq!(entries[1].end, Timestamp::from_millis(70_500));
    assert_eq!(entries[2].number, 3);
    Ok(())
}

#[test]
fn test_read_file_with_boms() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;

    let utf8 = dir.path().join("utf8.srt");
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(GROUND_TRUTH.as_bytes());
    fs::write(&utf8, bytes)?;

    let utf16 = dir.path().join("utf16.srt");
    fs::write(&utf16, utf16le_with_bom(GROUND_TRUTH))?;

    let expected = parse_str(GROUND_TRUTH)?;
    assert_eq!(subrip::read_file(&utf8)?, expected);
    assert_eq!(subrip::read_file(&utf16)?, expected);
    Ok(())
}

#[test]
fn test_missing_file_is_empty() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    assert!(subrip::read_file(&dir.path().join("absent.srt"))?.is_empty());
    Ok(())
}

#[test]
fn test_malformed_timestamp() -> Result<(), Box<dyn std::error::Error>> {
    let broken = "1\n00:00:1O,000 --> 00:00:20,000\nintrusion\n";
    assert!(matches!(
        parse_str(broken),
        Err(CoreError::Parse { line: 2, .. }) | Err(CoreError::Timestamp(_))
    ));

    let dir = tempdir()?;
    let path = dir.path().join("event.srt");
    fs::write(&path, broken)?;
    assert!(load_events(&path, Timestamp::ZERO).is_empty());
    Ok(())
}

#[test]
fn test_oversized_timestamp_fields() -> Result<(), Box<dyn std::error::Error>> {
    let broken = "1\n00:00:9999999999999999,000 --> 00:00:01,000\nintrusion\n";
    assert!(parse_str(broken).is_err());

    let dir = tempdir()?;
    let events = dir.path().join("event.srt");
    fs::write(&events, broken)?;
    assert!(load_events(&events, Timestamp::ZERO).is_empty());

    let truths = dir.path().join("ground_truth.srt");
    fs::write(&truths, "1\n9999999999999999:00:00,000 --> 00:00:01,000\nintrusion\n")?;
    let filter = LabelFilter::new("intrusion", "");
    assert!(load_truths(&truths, &filter, &MatchingPolicy::new(0.0, 3.0, false)).is_empty());
    Ok(())
}

#[test]
fn test_load_truths_filters_labels() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("ground_truth.srt");
    fs::write(&path, GROUND_TRUTH)?;

    let filter = LabelFilter::new("intrusion", "ambiguous");
    let truths = load_truths(&path, &filter, &MatchingPolicy::new(2.0, 1.0, true));

    let ids: Vec<i64> = truths.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert!(!truths[0].is_ambiguous);
    assert!(truths[1].is_ambiguous);

    let window = truths[0].window.ok_or("window not derived")?;
    assert_eq!(window.begin, Timestamp::from_millis(11_000));
    assert_eq!(window.end, Timestamp::from_millis(23_000));
    Ok(())
}
