//! Capture file input.
//!
//! A capture holds one hub frame per line, prefixed by its channel:
//!
//! ```text
//! # recorded 2018-03-01
//! situation;{"GPSLatitude":40.0,"GPSLongitude":-75.0}
//! traffic;{"Icao_addr":101,"Lat":40.1,"Lng":-75.0,"Position_valid":true}
//! ```
//!
//! Blank lines and `#` comments are skipped.

use std::fs;
use std::io::{self, BufRead};
use std::path::Path;

use stratux_core::{Channel, StratuxError};

/// One frame read from a capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFrame {
    pub line_no: usize,
    pub channel: Channel,
    pub frame: String,
}

/// Open a capture file, or stdin for `-`.
pub fn open(path: &Path) -> io::Result<Box<dyn BufRead>> {
    if path.to_str() == Some("-") {
        Ok(Box::new(io::stdin().lock()))
    } else {
        Ok(Box::new(io::BufReader::new(fs::File::open(path)?)))
    }
}

/// Split a capture line into channel and frame.
///
/// `None` for blank and comment lines.
pub fn parse_capture_line(line: &str) -> Option<Result<(Channel, &str), StratuxError>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (channel, frame) = line.split_once(';').unwrap_or((line, ""));
    Some(channel.parse::<Channel>().map(|c| (c, frame.trim())))
}

/// Iterate over the frames of a capture, reporting bad lines through
/// `on_error` and skipping them.
pub fn frames<R: BufRead>(
    reader: R,
    mut on_error: impl FnMut(usize, StratuxError),
) -> impl Iterator<Item = CapturedFrame> {
    reader
        .lines()
        .enumerate()
        .filter_map(move |(i, line)| {
            let line_no = i + 1;
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    on_error(line_no, e.into());
                    return None;
                }
            };
            match parse_capture_line(&line)? {
                Ok((channel, frame)) => Some(CapturedFrame {
                    line_no,
                    channel,
                    frame: frame.to_string(),
                }),
                Err(e) => {
                    on_error(line_no, e);
                    None
                }
            }
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
