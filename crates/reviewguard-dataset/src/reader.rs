//! CSV ingestion with encoding and delimiter detection
//!
//! The first [`SAMPLE_BYTES`] bytes decide the text encoding and the field
//! delimiter. Neither step fails outward: an undecodable sample falls back to
//! a lossy UTF-8 decode and an inconclusive sniff falls back to a comma.

use encoding_rs::{Encoding, UTF_8, WINDOWS_1254};
use reviewguard_core::{Dataset, Error, RawRecord, Result};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Bytes inspected for encoding and delimiter detection
pub const SAMPLE_BYTES: usize = 4096;

/// Delimiters considered by the sniffer, in tie-break order
pub const CANDIDATE_DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

/// Cell values treated as missing (pandas' default NA tokens)
pub const NA_TOKENS: [&str; 17] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan",
];

/// Text encoding selected for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8Bom,
    Utf8,
    Windows1254,
    /// No candidate decoded the sample; undecodable bytes are replaced
    Utf8Lossy,
}

impl TextEncoding {
    /// Detect the encoding of a byte sample
    pub fn detect(sample: &[u8]) -> Self {
        if sample.starts_with(&[0xEF, 0xBB, 0xBF]) {
            return Self::Utf8Bom;
        }

        match std::str::from_utf8(sample) {
            Ok(_) => return Self::Utf8,
            // A sample cut inside a multibyte sequence is still UTF-8
            Err(e) if e.error_len().is_none() => return Self::Utf8,
            Err(_) => {}
        }

        // encoding_rs maps the code page's unassigned bytes to C1 controls,
        // so a control character means the sample is not windows-1254 text.
        let (text, had_errors) = WINDOWS_1254.decode_without_bom_handling(sample);
        if !had_errors && !text.chars().any(is_foreign_control) {
            return Self::Windows1254;
        }

        Self::Utf8Lossy
    }

    fn encoding(self) -> &'static Encoding {
        match self {
            Self::Windows1254 => WINDOWS_1254,
            Self::Utf8Bom | Self::Utf8 | Self::Utf8Lossy => UTF_8,
        }
    }

    /// Decode a full buffer, replacing undecodable bytes
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8Bom => UTF_8.decode_with_bom_removal(bytes).0.into_owned(),
            _ => self.encoding().decode_without_bom_handling(bytes).0.into_owned(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Utf8Bom => "utf-8-sig",
            Self::Utf8 => "utf-8",
            Self::Windows1254 => "windows-1254",
            Self::Utf8Lossy => "utf-8 (lossy)",
        }
    }
}

fn is_foreign_control(c: char) -> bool {
    c.is_control() && !matches!(c, '\t' | '\n' | '\r')
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sniff the field delimiter from decoded sample text.
///
/// A candidate qualifies when it occurs (outside double quotes) the same
/// non-zero number of times on every complete record of the sample. The
/// trailing record is ignored when the sample was cut short.
pub fn sniff_delimiter(sample: &str, truncated: bool) -> u8 {
    let mut records: Vec<[usize; CANDIDATE_DELIMITERS.len()]> = Vec::new();
    let mut counts = [0usize; CANDIDATE_DELIMITERS.len()];
    let mut in_quotes = false;
    let mut has_content = false;

    for c in sample.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_content = true;
            }
            '\n' if !in_quotes => {
                if has_content {
                    records.push(counts);
                }
                counts = [0; CANDIDATE_DELIMITERS.len()];
                has_content = false;
            }
            '\r' => {}
            _ => {
                has_content = true;
                if !in_quotes {
                    if let Some(i) = CANDIDATE_DELIMITERS.iter().position(|&d| d as char == c) {
                        counts[i] += 1;
                    }
                }
            }
        }
    }
    if has_content && !truncated {
        records.push(counts);
    }

    if records.is_empty() {
        return b',';
    }

    (0..CANDIDATE_DELIMITERS.len())
        .find(|&i| {
            let first = records[0][i];
            first > 0 && records.iter().all(|r| r[i] == first)
        })
        .map(|i| CANDIDATE_DELIMITERS[i])
        .unwrap_or(b',')
}

/// Whether a raw cell counts as a missing value
pub fn is_missing(cell: &str) -> bool {
    let trimmed = cell.trim();
    trimmed.is_empty() || NA_TOKENS.contains(&trimmed)
}

/// Numeric coercion of a cell; non-numeric or non-finite values yield `None`
pub fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Read a CSV file into a [`Dataset`]
pub fn read_dataset(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    info!(path = %path.display(), bytes = bytes.len(), "Reading dataset");
    read_dataset_bytes(&bytes)
}

/// Parse CSV bytes into a [`Dataset`]
pub fn read_dataset_bytes(bytes: &[u8]) -> Result<Dataset> {
    let sample_len = bytes.len().min(SAMPLE_BYTES);
    let sample = &bytes[..sample_len];

    let encoding = TextEncoding::detect(sample);
    let delimiter = sniff_delimiter(&encoding.decode(sample), bytes.len() > SAMPLE_BYTES);
    info!(
        encoding = %encoding,
        delimiter = ?(delimiter as char),
        "Detected CSV format"
    );

    let text = encoding.decode(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| Error::dataset(format!("Failed to read CSV header: {e}")))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if columns.is_empty() || columns.iter().all(|c| c.is_empty()) {
        return Err(Error::dataset("CSV input has no header row"));
    }

    let mut dataset = Dataset::new(columns);
    for record in reader.records() {
        let record = record.map_err(|e| Error::dataset(format!("Failed to parse CSV record: {e}")))?;
        let values = record
            .iter()
            .map(|cell| (!is_missing(cell)).then(|| cell.to_string()))
            .collect();
        dataset.push_row(RawRecord::new(values));
    }

    debug!(
        columns = dataset.columns().len(),
        rows = dataset.len(),
        "Parsed CSV"
    );
    metrics::counter!("reviewguard_dataset_rows_read_total").increment(dataset.len() as u64);

    Ok(dataset)
}
