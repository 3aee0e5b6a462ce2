//! Blocklist filtering and floor partitioning.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{CarelogError, Result};
use crate::input::DataTable;

/// Rows sharing one floor value.
#[derive(Debug, Clone)]
pub struct FloorPartition {
    /// The floor value every row in `table` carries.
    pub floor: String,
    /// Rows of this floor, with the full original header.
    pub table: DataTable,
}

/// Remove every row whose `column` value exactly equals one of `blocked`.
pub fn filter_blocked(table: &DataTable, column: &str, blocked: &[String]) -> Result<DataTable> {
    let index = table
        .column_index(column)
        .ok_or_else(|| CarelogError::MissingColumn(column.to_string()))?;

    Ok(table.filter_rows(|row| {
        let value = row.get(index).map(String::as_str).unwrap_or("");
        !blocked.iter().any(|b| b == value)
    }))
}

/// Group rows by the first column whose name starts with `floor_prefix`.
///
/// Partitions come back in order of first appearance. Rows with a missing
/// floor value belong to no partition.
pub fn partition_by_floor(table: &DataTable, floor_prefix: &str) -> Result<Vec<FloorPartition>> {
    let index = table
        .column_index_with_prefix(floor_prefix)
        .ok_or_else(|| CarelogError::MissingColumn(format!("{}*", floor_prefix)))?;
    debug!(column = %table.headers[index], "partitioning by floor column");

    let mut groups: IndexMap<String, Vec<Vec<String>>> = IndexMap::new();
    for row in &table.rows {
        let floor = row.get(index).map(String::as_str).unwrap_or("");
        if DataTable::is_null_value(floor) {
            continue;
        }
        groups.entry(floor.to_string()).or_default().push(row.clone());
    }

    Ok(groups
        .into_iter()
        .map(|(floor, rows)| FloorPartition {
            floor,
            table: DataTable::new(table.headers.clone(), rows, table.delimiter),
        })
        .collect())
}
