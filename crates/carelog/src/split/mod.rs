//! Row filtering and floor partitioning.
//!
//! The splitter drops administrative record categories from a facility
//! export and writes one CSV per floor, each encoded as UTF-8 with a BOM so
//! spreadsheet tools downstream open it correctly.
//!
//! # Example
//!
//! ```no_run
//! use carelog::split::Splitter;
//!
//! let paths = Splitter::new().run("records.csv").unwrap();
//! for path in paths {
//!     println!("{}", path.display());
//! }
//! ```

mod partition;
mod writer;

pub use partition::{FloorPartition, filter_blocked, partition_by_floor};
pub use writer::write_csv;

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{CarelogError, Result};
use crate::input::{Parser, ParserConfig};

/// Column holding the record category.
pub const CATEGORY_COLUMN: &str = "分類";

/// Prefix of the column holding the floor name.
pub const FLOOR_COLUMN_PREFIX: &str = "フロア名";

/// Record categories that never reach the per-floor files.
pub const BLOCKED_CATEGORIES: &[&str] = &["業務日誌", "リハビリ", "モニタリング", "ヒヤリ・トラブル報告"];

/// Configuration for a split run.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Parser configuration (encodings, delimiter).
    pub parser: ParserConfig,
    /// Column matched against the blocklist.
    pub category_column: String,
    /// Categories removed before partitioning (exact match).
    pub blocked_categories: Vec<String>,
    /// Prefix identifying the floor column.
    pub floor_column_prefix: String,
    /// Directory for output files (None = next to the input).
    pub output_dir: Option<PathBuf>,
    /// Text inserted between the input stem and the floor name.
    pub suffix: String,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            category_column: CATEGORY_COLUMN.to_string(),
            blocked_categories: BLOCKED_CATEGORIES.iter().map(|s| s.to_string()).collect(),
            floor_column_prefix: FLOOR_COLUMN_PREFIX.to_string(),
            output_dir: None,
            suffix: "_processed_temp".to_string(),
        }
    }
}

/// Reads, filters, partitions and writes a facility export.
pub struct Splitter {
    config: SplitConfig,
    parser: Parser,
}

impl Splitter {
    /// Create a splitter with default configuration.
    pub fn new() -> Self {
        Self::with_config(SplitConfig::default())
    }

    /// Create a splitter with custom configuration.
    pub fn with_config(config: SplitConfig) -> Self {
        let parser = Parser::with_config(config.parser.clone());
        Self { config, parser }
    }

    /// Run the split and return the absolute paths of the files written.
    ///
    /// On error, any file already written by this run is removed.
    pub fn run(&self, input: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let input = input.as_ref();
        if !input.exists() {
            return Err(CarelogError::Io {
                path: input.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            });
        }

        let (table, source) = self
            .parser
            .parse_file(input, Some(&self.config.category_column))?;

        let filtered = filter_blocked(
            &table,
            &self.config.category_column,
            &self.config.blocked_categories,
        )?;
        info!(
            file = %source.file,
            before = table.row_count(),
            after = filtered.row_count(),
            "removed blocked categories"
        );

        let partitions = partition_by_floor(&filtered, &self.config.floor_column_prefix)?;
        self.write_partitions(input, &partitions)
    }

    /// Write one file per partition, named after `input`.
    ///
    /// All or nothing: if any write fails, the files already written are
    /// removed before the error is returned.
    pub fn write_partitions(&self, input: &Path, partitions: &[FloorPartition]) -> Result<Vec<PathBuf>> {
        let mut written: Vec<PathBuf> = Vec::with_capacity(partitions.len());
        for partition in partitions {
            let result = self
                .output_path(input, &partition.floor)
                .and_then(|path| write_csv(&partition.table, &path).map(|_| path));
            match result {
                Ok(path) => {
                    info!(floor = %partition.floor, rows = partition.table.row_count(), path = %path.display(), "wrote floor file");
                    written.push(path);
                }
                Err(e) => {
                    remove_all(&written);
                    return Err(e);
                }
            }
        }
        Ok(written)
    }

    /// `{dir}/{stem}{suffix}_{floor}{.ext}`, made absolute.
    fn output_path(&self, input: &Path, floor: &str) -> Result<PathBuf> {
        let dir = match &self.config.output_dir {
            Some(dir) => dir.clone(),
            None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = input
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let name = format!("{}{}_{}{}", stem, self.config.suffix, sanitize(floor), ext);
        absolute(&dir.join(name))
    }
}

impl Default for Splitter {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace characters that would escape the output directory.
fn sanitize(floor: &str) -> String {
    floor
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect()
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| CarelogError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

fn remove_all(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = std::fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "could not remove partial output");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_floor_name() {
        assert_eq!(sanitize("2F/東"), "2F_東");
        assert_eq!(sanitize("小規模多機能"), "小規模多機能");
    }

    #[test]
    fn test_output_path_naming() {
        let splitter = Splitter::with_config(SplitConfig {
            output_dir: Some(PathBuf::from("/tmp/out")),
            ..Default::default()
        });
        let path = splitter
            .output_path(Path::new("/data/records.csv"), "1F")
            .unwrap();
        assert_eq!(path, PathBuf::from("/tmp/out/records_processed_temp_1F.csv"));
    }
}
