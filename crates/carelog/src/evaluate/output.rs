//! The merged result table and its JSON form.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::{Number, Value};
use tracing::info;

use crate::error::{CarelogError, Result};
use crate::input::DataTable;

/// Prefix of the floor column.
pub const FLOOR_COLUMN_PREFIX: &str = "フロア名";

/// Room column dropped for small multi-function sites.
pub const ROOM_COLUMN: &str = "部屋名";

/// Floor value of small multi-function sites, which have no room numbers.
pub const SMALL_MULTIFUNCTION: &str = "小規模多機能";

/// Ordered columns of typed JSON cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl ResultTable {
    /// Convert a parsed table, typing each column from its values.
    ///
    /// A column whose non-empty cells are all integers becomes numbers, all
    /// floats numbers, all `true`/`false` booleans, anything else strings.
    /// Empty and null-marker cells become `null`.
    pub fn from_data_table(table: &DataTable) -> Self {
        let kinds: Vec<CellKind> = (0..table.column_count())
            .map(|c| CellKind::infer(table.column_values(c)))
            .collect();

        let rows = table
            .rows
            .iter()
            .map(|row| {
                kinds
                    .iter()
                    .enumerate()
                    .map(|(c, kind)| kind.convert(row.get(c).map(String::as_str).unwrap_or("")))
                    .collect()
            })
            .collect();

        Self {
            columns: table.headers.clone(),
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row` of column `name`.
    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        let c = self.column_index(name)?;
        self.rows.get(row).and_then(|r| r.get(c))
    }

    /// Replace column `name`, or append it when absent.
    pub fn set_column(&mut self, name: &str, cells: Vec<Value>) -> Result<()> {
        if cells.len() != self.rows.len() {
            return Err(CarelogError::Persistence(format!(
                "column '{}' has {} cells for {} rows",
                name,
                cells.len(),
                self.rows.len()
            )));
        }

        match self.column_index(name) {
            Some(c) => {
                for (row, cell) in self.rows.iter_mut().zip(cells) {
                    row[c] = cell;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, cell) in self.rows.iter_mut().zip(cells) {
                    row.push(cell);
                }
            }
        }
        Ok(())
    }

    /// Remove column `name`. Returns false when it was not present.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(c) = self.column_index(name) else {
            return false;
        };
        self.columns.remove(c);
        for row in &mut self.rows {
            row.remove(c);
        }
        true
    }

    /// Rows as ordered column → value maps.
    pub fn records(&self) -> Vec<IndexMap<&str, &Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(String::as_str)
                    .zip(row.iter())
                    .collect()
            })
            .collect()
    }

    /// Write the table as a pretty-printed JSON array of row objects.
    ///
    /// Parent directories are created. Returns the absolute path written.
    pub fn write_json(&self, path: &Path) -> Result<PathBuf> {
        let io_err = |e: std::io::Error| CarelogError::Io {
            path: path.to_path_buf(),
            source: e,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let file = File::create(path).map_err(io_err)?;
        let mut out = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut out, &self.records())?;
        out.flush().map_err(io_err)?;

        let absolute = std::path::absolute(path).map_err(io_err)?;
        info!(rows = self.rows.len(), columns = self.columns.len(), path = %absolute.display(), "wrote results");
        Ok(absolute)
    }
}

/// Drop the room column when every row belongs to a small multi-function
/// site. Returns true when the column was dropped.
pub fn drop_room_for_small_multifunction(table: &mut ResultTable) -> bool {
    let Some(floor) = table
        .columns
        .iter()
        .position(|c| c.starts_with(FLOOR_COLUMN_PREFIX))
    else {
        return false;
    };
    if table.rows.is_empty() {
        return false;
    }

    let all_small = table
        .rows
        .iter()
        .all(|row| matches!(&row[floor], Value::String(s) if s.trim() == SMALL_MULTIFUNCTION));

    all_small && table.drop_column(ROOM_COLUMN)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CellKind {
    Integer,
    Float,
    Boolean,
    Text,
}

impl CellKind {
    fn infer<'a>(values: impl Iterator<Item = &'a str>) -> Self {
        let mut kind: Option<CellKind> = None;
        for value in values.filter(|v| !DataTable::is_null_value(v)) {
            let v = value.trim();
            let this = if v.parse::<i64>().is_ok() {
                CellKind::Integer
            } else if v.parse::<f64>().is_ok_and(f64::is_finite) {
                CellKind::Float
            } else if parse_bool(v).is_some() {
                CellKind::Boolean
            } else {
                return CellKind::Text;
            };
            kind = Some(match (kind, this) {
                (None, k) => k,
                (Some(a), b) if a == b => a,
                (Some(CellKind::Integer), CellKind::Float)
                | (Some(CellKind::Float), CellKind::Integer) => CellKind::Float,
                _ => return CellKind::Text,
            });
        }
        kind.unwrap_or(CellKind::Text)
    }

    fn convert(&self, raw: &str) -> Value {
        if DataTable::is_null_value(raw) {
            return Value::Null;
        }
        let v = raw.trim();
        let typed = match self {
            CellKind::Integer => v.parse::<i64>().ok().map(Value::from),
            CellKind::Float => v
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            CellKind::Boolean => parse_bool(v).map(Value::Bool),
            CellKind::Text => None,
        };
        typed.unwrap_or_else(|| Value::String(raw.to_string()))
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> DataTable {
        DataTable::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
            b',',
        )
    }

    #[test]
    fn test_column_typing() {
        let t = table(
            &["id", "score", "flag", "内容"],
            &[&["1", "2.5", "True", "a"], &["2", "3", "", "b"], &["", "", "false", "c"]],
        );
        let r = ResultTable::from_data_table(&t);

        assert_eq!(r.get(0, "id"), Some(&Value::from(1)));
        assert_eq!(r.get(2, "id"), Some(&Value::Null));
        assert_eq!(r.get(1, "score"), Some(&Value::from(3.0)));
        assert_eq!(r.get(0, "flag"), Some(&Value::Bool(true)));
        assert_eq!(r.get(1, "flag"), Some(&Value::Null));
        assert_eq!(r.get(2, "内容"), Some(&Value::from("c")));
    }

    #[test]
    fn test_set_column_appends_then_replaces() {
        let mut r = ResultTable::from_data_table(&table(&["a"], &[&["x"], &["y"]]));
        r.set_column("speech", vec![Value::from("s1"), Value::Null]).unwrap();
        assert_eq!(r.columns(), &["a".to_string(), "speech".to_string()]);

        r.set_column("a", vec![Value::from(1), Value::from(2)]).unwrap();
        assert_eq!(r.columns().len(), 2);
        assert_eq!(r.get(1, "a"), Some(&Value::from(2)));

        assert!(r.set_column("short", vec![Value::Null]).is_err());
    }

    #[test]
    fn test_room_dropped_only_when_every_row_is_small_multifunction() {
        let headers = ["フロア名", "部屋名", "内容"];

        let mut all = ResultTable::from_data_table(&table(
            &headers,
            &[&["小規模多機能", "101", "a"], &["小規模多機能", "102", "b"]],
        ));
        assert!(drop_room_for_small_multifunction(&mut all));
        assert!(all.column_index(ROOM_COLUMN).is_none());

        let mut mixed = ResultTable::from_data_table(&table(
            &headers,
            &[&["小規模多機能", "101", "a"], &["2F", "201", "b"]],
        ));
        assert!(!drop_room_for_small_multifunction(&mut mixed));
        assert!(mixed.column_index(ROOM_COLUMN).is_some());

        let mut empty = ResultTable::from_data_table(&table(&headers, &[]));
        assert!(!drop_room_for_small_multifunction(&mut empty));
    }

    #[test]
    fn test_repeated_headers_keep_every_column() {
        let parsed = crate::input::Parser::new()
            .parse_bytes("メモ,メモ,内容\na,b,c".as_bytes(), b',')
            .unwrap();
        let r = ResultTable::from_data_table(&parsed);

        let records = r.records();
        assert_eq!(records[0].len(), 3);
        assert_eq!(records[0]["メモ"], &Value::from("a"));
        assert_eq!(records[0]["メモ.1"], &Value::from("b"));
    }

    #[test]
    fn test_json_keeps_order_and_non_ascii() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.json");
        let mut r = ResultTable::from_data_table(&table(&["内容", "id"], &[&["笑顔", "7"]]));
        r.set_column("emotion1", vec![Value::from("positive")]).unwrap();

        let written = r.write_json(&path).unwrap();
        assert!(written.is_absolute());

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"内容\": \"笑顔\""));
        let content_at = text.find("内容").unwrap();
        let emotion_at = text.find("emotion1").unwrap();
        assert!(content_at < emotion_at);

        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[0]["id"], 7);
    }
}
