use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::input::{InputError, RawTable};

const DELIMITERS: [u8; 3] = [b'\t', b';', b','];

pub fn open_maybe_gz(path: &Path) -> Result<Box<dyn BufRead>, InputError> {
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Picks the delimiter that occurs most often in the header line.
/// Ties resolve in the order tab, semicolon, comma.
pub fn detect_delimiter(header_line: &str) -> u8 {
    let mut best = b',';
    let mut best_count = 0usize;
    for d in DELIMITERS {
        let count = header_line.bytes().filter(|&b| b == d).count();
        if count > best_count {
            best = d;
            best_count = count;
        }
    }
    best
}

pub fn read_raw_table<R: Read>(mut reader: R) -> Result<RawTable, InputError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let header_line = text
        .lines()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| InputError::InvalidInput("import is empty".to_string()))?;
    let delimiter = detect_delimiter(header_line);

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if columns.iter().all(|c| c.is_empty()) {
        return Err(InputError::InvalidInput("import header is empty".to_string()));
    }

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if record.iter().all(|v| v.is_empty()) {
            continue;
        }
        let mut row: Vec<String> = record.iter().map(|v| v.to_string()).collect();
        row.resize(columns.len(), String::new());
        rows.push(row);
    }

    Ok(RawTable::new(columns, rows))
}
