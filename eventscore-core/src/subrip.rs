//! SubRip (`.srt`) parsing.
//!
//! Both the detector output and the ground-truth annotations are stored as
//! SubRip files:
//!
//! ```text
//! 1
//! 00:00:10,000 --> 00:00:20,000
//! intrusion: person climbing the fence
//!
//! 2
//! ...
//! ```
//!
//! Files may start with a UTF-8, UTF-16 or UTF-32 byte-order mark.

use std::fs;
use std::path::Path;

use log::debug;

use crate::error::{CoreError, CoreResult, io_error_at};
use crate::time::Timestamp;

/// One numbered block of a SubRip file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtitle {
    pub number: u32,
    pub begin: Timestamp,
    pub end: Timestamp,
    /// Label lines joined with `\n`.
    pub text: String,
}

const TIMING_ARROW: &str = "-->";

/// Parses SubRip text into its blocks.
pub fn parse_str(input: &str) -> CoreResult<Vec<Subtitle>> {
    let mut entries = Vec::new();
    let mut lines = input.lines().enumerate().peekable();

    loop {
        // Blank separators, possibly several in a row
        while lines.next_if(|(_, line)| line.trim().is_empty()).is_some() {}

        let Some((index, number_line)) = lines.next() else {
            break;
        };
        let number = number_line
            .trim()
            .trim_start_matches('\u{feff}')
            .parse::<u32>()
            .map_err(|_| CoreError::Parse {
                line: index + 1,
                message: format!("expected subtitle number, found '{}'", number_line.trim()),
            })?;

        let (timing_index, timing_line) = lines.next().ok_or_else(|| CoreError::Parse {
            line: index + 2,
            message: format!("subtitle {number} has no timing line"),
        })?;
        let (begin, end) = parse_timing(timing_line).map_err(|message| CoreError::Parse {
            line: timing_index + 1,
            message,
        })?;

        let mut text_lines = Vec::new();
        while let Some((_, line)) = lines.next_if(|(_, line)| !line.trim().is_empty()) {
            text_lines.push(line.trim_end());
        }

        entries.push(Subtitle {
            number,
            begin,
            end,
            text: text_lines.join("\n"),
        });
    }

    Ok(entries)
}

fn parse_timing(line: &str) -> Result<(Timestamp, Timestamp), String> {
    let (begin, end) = line
        .split_once(TIMING_ARROW)
        .ok_or_else(|| format!("expected '{TIMING_ARROW}' in timing line '{}'", line.trim()))?;
    // Some writers append display coordinates after the end stamp
    let end = end.split_whitespace().next().unwrap_or_default();

    let begin = Timestamp::parse_srt(begin).map_err(|e| e.to_string())?;
    let end = Timestamp::parse_srt(end).map_err(|e| e.to_string())?;
    Ok((begin, end))
}

/// Reads and parses a SubRip file.
///
/// A path that does not point to a file yields an empty list; a file that
/// exists but cannot be read or parsed is an error.
pub fn read_file(path: &Path) -> CoreResult<Vec<Subtitle>> {
    if !path.is_file() {
        debug!("No subtitle file at {}, treating as empty", path.display());
        return Ok(Vec::new());
    }

    let bytes = fs::read(path).map_err(|e| io_error_at(path, e))?;
    let text = decode_text(&bytes);
    let entries = parse_str(&text)?;
    debug!("Parsed {} subtitles from {}", entries.len(), path.display());
    Ok(entries)
}

/// Decodes file content according to its byte-order mark, UTF-8 otherwise.
pub fn decode_text(bytes: &[u8]) -> String {
    match bytes {
        [0xFF, 0xFE, 0x00, 0x00, rest @ ..] => decode_utf32(rest, u32::from_le_bytes),
        [0x00, 0x00, 0xFE, 0xFF, rest @ ..] => decode_utf32(rest, u32::from_be_bytes),
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8_lossy(rest).into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> String {
    let units = bytes.chunks_exact(2).map(|c| to_unit([c[0], c[1]]));
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

fn decode_utf32(bytes: &[u8], to_scalar: fn([u8; 4]) -> u32) -> String {
    bytes
        .chunks_exact(4)
        .map(|c| {
            char::from_u32(to_scalar([c[0], c[1], c[2], c[3]]))
                .unwrap_or(char::REPLACEMENT_CHARACTER)
        })
        .collect()
}
