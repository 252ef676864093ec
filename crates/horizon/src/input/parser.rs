//! Header location and delimited parsing for survey exports.
//!
//! Archive exports ship a free-text preamble of variable length before the
//! real header row. [`HeaderLocator`] walks candidate offsets, probes a small
//! window at each one and accepts the first offset whose header carries a known
//! target column.

use std::io::{BufRead, BufReader};

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::source::{DataTable, SourceMetadata};
use crate::error::{HorizonError, Result};
use crate::schema::vocabulary::TARGET_ALIASES;

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect per probed offset).
    pub delimiter: Option<u8>,
    /// Quote character.
    pub quote: u8,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            quote: b'"',
            max_rows: None,
        }
    }
}

/// Header scan configuration.
#[derive(Debug, Clone)]
pub struct LocatorConfig {
    /// Number of candidate offsets to try (offsets `0..max_scan_rows`).
    pub max_scan_rows: usize,
    /// Data rows parsed under a candidate header before accepting it.
    pub probe_rows: usize,
    /// Column names that mark a real header (compared case-insensitively).
    pub target_aliases: Vec<String>,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            max_scan_rows: 300,
            probe_rows: 5,
            target_aliases: TARGET_ALIASES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A table found inside a raw export.
#[derive(Debug, Clone)]
pub struct LocatedTable {
    /// Zero-based line index of the header row.
    pub header_line: usize,
    /// The parsed table below (and including) the header.
    pub table: DataTable,
}

/// Finds the real header row in a raw export and parses the table below it.
pub struct HeaderLocator {
    parser: ParserConfig,
    config: LocatorConfig,
}

impl HeaderLocator {
    /// Create a locator with default configuration.
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default(), LocatorConfig::default())
    }

    /// Create a locator with custom configuration.
    pub fn with_config(parser: ParserConfig, config: LocatorConfig) -> Self {
        Self { parser, config }
    }

    /// Locate the header in `raw` and parse everything from it onwards.
    ///
    /// Offsets are tried in increasing order, so the lowest matching offset wins.
    /// A probe that fails to parse only moves the scan to the next offset.
    ///
    /// A data row that happens to contain an alias token in every position it is
    /// compared at would be mistaken for a header; survey exports do not do this.
    pub fn locate(&self, raw: &str) -> Result<LocatedTable> {
        let starts = line_starts(raw);

        for (offset, &start) in starts.iter().enumerate().take(self.config.max_scan_rows) {
            let remainder = &raw[start..];
            let delimiter = match self.parser.delimiter {
                Some(d) => d,
                None => match detect_delimiter(remainder.as_bytes()) {
                    Ok(d) => d,
                    Err(_) => continue,
                },
            };

            let headers = match self.probe(remainder.as_bytes(), delimiter) {
                Some(headers) => headers,
                None => continue,
            };

            if !self.matches_target(&headers) {
                continue;
            }

            debug!(offset, columns = headers.len(), "header candidate accepted");
            let table = match self.parse_bytes(remainder.as_bytes(), delimiter) {
                Ok(table) => table,
                Err(e) => {
                    debug!(offset, error = %e, "header candidate failed full parse");
                    continue;
                }
            };
            info!(
                header_line = offset,
                rows = table.row_count(),
                columns = table.column_count(),
                "located survey table"
            );
            return Ok(LocatedTable {
                header_line: offset,
                table,
            });
        }

        Err(HorizonError::HeaderNotFound {
            scanned: self.config.max_scan_rows.min(starts.len()),
        })
    }

    /// Decode raw upload bytes, locate the table and describe its source.
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected.
    pub fn locate_bytes(
        &self,
        name: &str,
        bytes: &[u8],
    ) -> Result<(DataTable, SourceMetadata)> {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let raw = String::from_utf8_lossy(bytes);
        let located = self.locate(&raw)?;

        let format = match located.table.delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        }
        .to_string();

        let metadata = SourceMetadata::new(
            name,
            hash,
            bytes.len() as u64,
            format,
            located.header_line,
            located.table.row_count(),
            located.table.column_count(),
        );

        Ok((located.table, metadata))
    }

    /// Parse the header plus a few rows; `None` if the window is not tabular.
    fn probe(&self, bytes: &[u8], delimiter: u8) -> Option<Vec<String>> {
        let mut reader = self.reader(bytes, delimiter);
        let headers: Vec<String> = reader.headers().ok()?.iter().map(|s| s.to_string()).collect();
        if headers.is_empty() {
            return None;
        }

        for result in reader.records().take(self.config.probe_rows) {
            let record = result.ok()?;
            // More fields than header names means the candidate is not the header.
            if record.len() > headers.len() {
                return None;
            }
        }

        Some(headers)
    }

    fn matches_target(&self, headers: &[String]) -> bool {
        headers.iter().any(|h| {
            self.config
                .target_aliases
                .iter()
                .any(|alias| h.trim().eq_ignore_ascii_case(alias))
        })
    }

    fn reader<'a>(&self, bytes: &'a [u8], delimiter: u8) -> csv::Reader<&'a [u8]> {
        csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .quote(self.parser.quote)
            .trim(csv::Trim::Headers)
            .flexible(true)
            .from_reader(bytes)
    }

    /// Parse bytes directly, starting at the header row.
    fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<DataTable> {
        let mut reader = self.reader(bytes, delimiter);

        let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
        if headers.is_empty() {
            return Err(HorizonError::EmptyData("No columns found".to_string()));
        }

        let expected_cols = headers.len();
        let mut rows = Vec::new();

        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.parser.max_rows {
                if row_idx >= max {
                    break;
                }
            }

            let record = result?;
            let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();

            // Pad row if needed
            while row.len() < expected_cols {
                row.push(String::new());
            }
            // Truncate if too many columns
            row.truncate(expected_cols);

            rows.push(row);
        }

        if rows.is_empty() {
            return Err(HorizonError::EmptyData("No data rows found".to_string()));
        }

        Ok(DataTable::new(headers, rows, delimiter))
    }
}

impl Default for HeaderLocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte offsets at which each line of `raw` starts.
fn line_starts(raw: &str) -> Vec<usize> {
    if raw.is_empty() {
        return Vec::new();
    }
    let mut starts = vec![0];
    starts.extend(
        raw.match_indices('\n')
            .map(|(i, _)| i + 1)
            .filter(|&i| i < raw.len()),
    );
    starts
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(HorizonError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let variance: f64 = if counts.len() > 1 {
            let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
            counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / counts.len() as f64
        } else {
            0.0
        };

        // Higher count with lower variance wins; tab is rarer inside values.
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preamble(lines: usize) -> String {
        (0..lines)
            .map(|i| format!("# comment line {}, with, commas\n", i))
            .collect()
    }

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6";
        assert_eq!(detect_delimiter(data).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(data).unwrap(), b'\t');
    }

    #[test]
    fn test_line_starts() {
        assert_eq!(line_starts(""), Vec::<usize>::new());
        assert_eq!(line_starts("a\nb\n"), vec![0, 2]);
        assert_eq!(line_starts("a\nb"), vec![0, 2]);
    }

    #[test]
    fn test_locate_without_preamble() {
        let raw = "kepid,koi_disposition,koi_prad\n1,CONFIRMED,2.0\n2,CANDIDATE,1.1\n";
        let located = HeaderLocator::new().locate(raw).unwrap();
        assert_eq!(located.header_line, 0);
        assert_eq!(located.table.row_count(), 2);
        assert_eq!(located.table.headers[1], "koi_disposition");
    }

    #[test]
    fn test_locate_after_preamble() {
        let raw = format!(
            "{}kepid,koi_disposition,koi_prad\n1,CONFIRMED,2.0\n",
            preamble(12)
        );
        let located = HeaderLocator::new().locate(&raw).unwrap();
        assert_eq!(located.header_line, 12);
        assert_eq!(located.table.headers, vec!["kepid", "koi_disposition", "koi_prad"]);
    }

    #[test]
    fn test_locate_is_case_insensitive() {
        let raw = "# note\nTFOPWG_DISP,pl_rade\nPC,1.0\n";
        let located = HeaderLocator::new().locate(raw).unwrap();
        assert_eq!(located.header_line, 1);
    }

    #[test]
    fn test_locate_not_found_within_bound() {
        let raw = format!("{}disposition,pl_rade\nCONFIRMED,1.0\n", preamble(10));
        let config = LocatorConfig {
            max_scan_rows: 5,
            ..LocatorConfig::default()
        };
        let locator = HeaderLocator::with_config(ParserConfig::default(), config);
        let err = locator.locate(&raw).unwrap_err();
        assert!(matches!(err, HorizonError::HeaderNotFound { scanned: 5 }));
    }

    #[test]
    fn test_header_without_rows_keeps_scanning() {
        let raw = "# koi table\nkepoi_name,koi_disposition,koi_prad\n";
        let err = HeaderLocator::new().locate(raw).unwrap_err();
        assert!(matches!(err, HorizonError::HeaderNotFound { scanned: 2 }));
    }

    #[test]
    fn test_locate_without_target_column() {
        let raw = "a,b\n1,2\n";
        let err = HeaderLocator::new().locate(raw).unwrap_err();
        assert!(matches!(err, HorizonError::HeaderNotFound { .. }));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let raw = "disposition,pl_rade,pl_orbper\nCONFIRMED,1.0\n";
        let located = HeaderLocator::new().locate(raw).unwrap();
        assert_eq!(located.table.rows[0], vec!["CONFIRMED", "1.0", ""]);
    }

    #[test]
    fn test_locate_bytes_metadata() {
        let raw = format!("{}disposition,pl_rade\nCONFIRMED,1.0\n", preamble(3));
        let (table, meta) = HeaderLocator::new()
            .locate_bytes("k2.csv", raw.as_bytes())
            .unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(meta.header_line, 3);
        assert_eq!(meta.format, "csv");
        assert!(meta.hash.starts_with("sha256:"));
    }
}
