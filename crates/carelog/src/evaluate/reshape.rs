//! Variable-length annotation lists and their fixed-width column form.

use serde_json::Value;

/// Per-row annotation lists produced by one stage.
///
/// Rows keep their own length in memory. Fixed-width `prefixN` columns are
/// only produced by [`AnnotationSet::columns`], at the serialization
/// boundary. A slot may be empty (`None`) when a later stage leaves a gap at
/// a position, as labeling does when a code cannot be parsed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnnotationSet {
    rows: Vec<Vec<Option<String>>>,
}

impl AnnotationSet {
    /// Build from dense per-row lists.
    pub fn from_lists(lists: Vec<Vec<String>>) -> Self {
        Self {
            rows: lists
                .into_iter()
                .map(|row| row.into_iter().map(Some).collect())
                .collect(),
        }
    }

    /// A set of `rows` empty rows.
    pub fn empty(rows: usize) -> Self {
        Self {
            rows: vec![Vec::new(); rows],
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Longest row length in the batch.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn row(&self, index: usize) -> &[Option<String>] {
        self.rows.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Place `value` at `position` of `row`, growing the row with gaps.
    pub fn set(&mut self, row: usize, position: usize, value: String) {
        if row >= self.rows.len() {
            self.rows.resize(row + 1, Vec::new());
        }
        let slots = &mut self.rows[row];
        if position >= slots.len() {
            slots.resize(position + 1, None);
        }
        slots[position] = Some(value);
    }

    /// Every present value with its row and position, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &str)> {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(p, slot)| slot.as_deref().map(|v| (r, p, v)))
        })
    }

    /// Pad every row to the batch width.
    pub fn reshape(&self) -> Self {
        let width = self.width();
        Self {
            rows: self
                .rows
                .iter()
                .map(|row| {
                    let mut row = row.clone();
                    row.resize(width, None);
                    row
                })
                .collect(),
        }
    }

    /// Materialize `prefix1..` columns.
    ///
    /// A column is emitted only when at least one row has a value at that
    /// position; names keep the 1-based position, so gaps in the numbering
    /// are possible.
    pub fn columns(&self, prefix: &str) -> Vec<(String, Vec<Value>)> {
        let fixed = self.reshape();
        (0..fixed.width())
            .filter(|&p| fixed.rows.iter().any(|row| row[p].is_some()))
            .map(|p| {
                let cells = fixed
                    .rows
                    .iter()
                    .map(|row| row[p].clone().map(Value::String).unwrap_or(Value::Null))
                    .collect();
                (format!("{}{}", prefix, p + 1), cells)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lists(rows: &[&[&str]]) -> AnnotationSet {
        AnnotationSet::from_lists(
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_columns_are_padded_with_null() {
        let set = lists(&[&["a", "b"], &[], &["c"]]);
        let cols = set.columns("person");

        assert_eq!(cols.len(), 2);
        assert_eq!(cols[0].0, "person1");
        assert_eq!(cols[0].1, vec![Value::from("a"), Value::Null, Value::from("c")]);
        assert_eq!(cols[1].0, "person2");
        assert_eq!(cols[1].1, vec![Value::from("b"), Value::Null, Value::Null]);
    }

    #[test]
    fn test_sparse_positions_keep_their_numbers() {
        let mut set = AnnotationSet::empty(2);
        set.set(0, 2, "d450".into());
        set.set(1, 0, "d550".into());

        let names: Vec<String> = set.columns("icf").into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["icf1", "icf3"]);
    }

    #[test]
    fn test_all_empty_yields_no_columns() {
        assert!(AnnotationSet::empty(3).columns("icf_abst").is_empty());
    }

    #[test]
    fn test_iter_is_row_major() {
        let set = lists(&[&["a", "b"], &["c"]]);
        let seen: Vec<(usize, usize, &str)> = set.iter().collect();
        assert_eq!(seen, vec![(0, 0, "a"), (0, 1, "b"), (1, 0, "c")]);
    }
}
