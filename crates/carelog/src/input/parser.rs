//! CSV/TSV parser with delimiter detection and encoding fallback.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::encoding::TextEncoding;
use super::source::{DataTable, SourceMetadata};
use crate::error::{CarelogError, Result};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
    /// Encodings to try, in order.
    pub encodings: Vec<TextEncoding>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            max_rows: None,
            quote: b'"',
            encodings: TextEncoding::FALLBACK_ORDER.to_vec(),
        }
    }
}

/// Parses tabular data files.
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file, trying each configured encoding in turn.
    ///
    /// When `required_column` is given, an encoding whose decoded header
    /// lacks that column is treated as a wrong guess and the next encoding is
    /// tried. If some encoding decoded the file but none produced the column,
    /// the result is [`CarelogError::MissingColumn`].
    pub fn parse_file(
        &self,
        path: impl AsRef<Path>,
        required_column: Option<&str>,
    ) -> Result<(DataTable, SourceMetadata)> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| CarelogError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| CarelogError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
        let size_bytes = contents.len() as u64;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let mut decoded_without_column = false;
        let mut last_parse_error = None;

        for encoding in &self.config.encodings {
            let Some(text) = encoding.decode(&contents) else {
                debug!(encoding = %encoding, file = %path.display(), "decode failed, trying next encoding");
                continue;
            };

            let delimiter = match self.config.delimiter {
                Some(d) => d,
                None => detect_delimiter(text.as_bytes())?,
            };

            let table = match self.parse_bytes(text.as_bytes(), delimiter) {
                Ok(table) => table,
                Err(CarelogError::EmptyData(msg)) => return Err(CarelogError::EmptyData(msg)),
                Err(e) => {
                    debug!(encoding = %encoding, error = %e, "parse failed, trying next encoding");
                    last_parse_error = Some(e);
                    continue;
                }
            };

            if let Some(column) = required_column {
                if table.column_index(column).is_none() {
                    debug!(encoding = %encoding, column, "decoded header lacks required column");
                    decoded_without_column = true;
                    continue;
                }
            }

            let format = match delimiter {
                b'\t' => "tsv",
                b',' => "csv",
                b';' => "csv-semicolon",
                b'|' => "psv",
                _ => "delimited",
            }
            .to_string();

            let metadata = SourceMetadata::new(
                path.to_path_buf(),
                hash,
                size_bytes,
                format,
                encoding.label(),
                table.row_count(),
                table.column_count(),
            );

            info!(
                file = %metadata.file,
                encoding = %metadata.encoding,
                format = %metadata.format,
                rows = metadata.row_count,
                columns = metadata.column_count,
                "loaded table"
            );
            debug!(
                path = %metadata.path.display(),
                hash = %metadata.hash,
                size_bytes = metadata.size_bytes,
                loaded_at = %metadata.loaded_at.to_rfc3339(),
                "source fingerprint"
            );

            return Ok((table, metadata));
        }

        if decoded_without_column {
            if let Some(column) = required_column {
                return Err(CarelogError::MissingColumn(column.to_string()));
            }
        }

        if let Some(e) = last_parse_error {
            return Err(e);
        }

        Err(CarelogError::EncodingUnsupported {
            path: path.to_path_buf(),
            tried: self
                .config
                .encodings
                .iter()
                .map(|e| e.label().to_string())
                .collect(),
        })
    }

    /// Parse already-decoded bytes.
    pub fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<DataTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();

        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(CarelogError::EmptyData("No columns found".to_string()));
        }
        let headers = dedupe_headers(headers);

        let expected_cols = headers.len();
        let mut rows = Vec::new();

        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }

            let record = result?;
            let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();

            // Pad short rows, truncate long ones
            row.resize(expected_cols, String::new());

            rows.push(row);
        }

        Ok(DataTable::new(headers, rows, delimiter))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Read `path` with the default encoding fallback, requiring `required_column`.
pub fn read_table_with_fallback(
    path: impl AsRef<Path>,
    required_column: &str,
) -> Result<(DataTable, SourceMetadata)> {
    Parser::new().parse_file(path, Some(required_column))
}

/// Rename repeated headers to `name.1`, `name.2`, ... so every column keeps
/// its own key downstream.
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut suffixes: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .map(|header| {
            let mut n = suffixes.get(&header).copied().unwrap_or(0);
            let mut name = header.clone();
            while seen.contains(&name) {
                n += 1;
                name = format!("{}.{}", header, n);
            }
            suffixes.insert(header, n);
            seen.insert(name.clone());
            name
        })
        .collect()
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
        return Err(CarelogError::EmptyData("No lines to analyze".to_string()));
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

        // Higher count with lower variance wins
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

    #[test]
    fn test_detect_delimiter_csv() {
        let data = "分類,内容\n記録,「おはよう」\n".as_bytes();
        assert_eq!(detect_delimiter(data).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(data).unwrap(), b'\t');
    }

    #[test]
    fn test_parse_pads_short_rows() {
        let parser = Parser::new();
        let table = parser.parse_bytes(b"a,b,c\n1,2\n4,5,6,7", b',').unwrap();

        assert_eq!(table.headers, vec!["a", "b", "c"]);
        assert_eq!(table.rows[0], vec!["1", "2", ""]);
        assert_eq!(table.rows[1], vec!["4", "5", "6"]);
    }

    #[test]
    fn test_duplicate_headers_get_suffixes() {
        let parser = Parser::new();
        let table = parser
            .parse_bytes("メモ,メモ,内容,メモ\na,b,c,d".as_bytes(), b',')
            .unwrap();

        assert_eq!(table.headers, vec!["メモ", "メモ.1", "内容", "メモ.2"]);
        assert_eq!(table.rows[0], vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_dedupe_skips_existing_suffixed_names() {
        let headers = dedupe_headers(vec!["a".into(), "a.1".into(), "a".into()]);
        assert_eq!(headers, vec!["a", "a.1", "a.2"]);
    }

    #[test]
    fn test_parse_file_fills_source_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records_1F.csv");
        let content = "分類,内容\n記録,朝食\n";
        std::fs::write(&path, content).unwrap();

        let (_, source) = Parser::new().parse_file(&path, Some("分類")).unwrap();

        assert_eq!(source.file, "records_1F.csv");
        assert_eq!(source.format, "csv");
        assert_eq!(source.encoding, "utf-8");
        assert_eq!(source.size_bytes, content.len() as u64);
        assert!(source.hash.starts_with("sha256:"));
        assert_eq!(source.hash.len(), "sha256:".len() + 64);
        assert!(source.loaded_at <= chrono::Utc::now());
    }

    #[test]
    fn test_header_only_is_not_an_error() {
        let parser = Parser::new();
        let table = parser.parse_bytes(b"a,b\n", b',').unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn test_max_rows() {
        let parser = Parser::with_config(ParserConfig {
            max_rows: Some(1),
            ..Default::default()
        });
        let table = parser.parse_bytes(b"a\n1\n2\n3", b',').unwrap();
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_is_null_value() {
        assert!(DataTable::is_null_value(""));
        assert!(DataTable::is_null_value("  "));
        assert!(DataTable::is_null_value("NA"));
        assert!(DataTable::is_null_value("NaN"));
        assert!(DataTable::is_null_value("null"));
        assert!(!DataTable::is_null_value("na "));
        assert!(!DataTable::is_null_value("1F"));
        assert!(!DataTable::is_null_value("0"));
    }
}
