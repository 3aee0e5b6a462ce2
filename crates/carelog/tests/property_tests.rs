//! Property-based tests for carelog.
//!
//! These tests use proptest to generate random tables and responses and
//! verify that the core transformations keep their invariants.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p carelog --test property_tests
//! ```

use proptest::prelude::*;

use carelog::anonymize::{Anonymizer, PatternAnonymizer};
use carelog::evaluate::AnnotationSet;
use carelog::evaluate::parse::{parse_emotion, parse_icf_abstraction, parse_icf_code};
use carelog::input::DataTable;
use carelog::split::{filter_blocked, partition_by_floor};

const CATEGORIES: &[&str] = &[
    "ケア記録",
    "業務日誌",
    "リハビリ",
    "モニタリング",
    "ヒヤリ・トラブル報告",
    "バイタル",
];
const FLOORS: &[&str] = &["1F", "2F", "3F", "小規模多機能", ""];

// =============================================================================
// Test Strategies
// =============================================================================

/// Rows of (category, floor, content).
fn record_rows() -> impl Strategy<Value = Vec<(usize, usize, String)>> {
    prop::collection::vec(
        (0..CATEGORIES.len(), 0..FLOORS.len(), "[a-zあ-ん]{0,12}"),
        0..40,
    )
}

fn table_from(rows: &[(usize, usize, String)]) -> DataTable {
    DataTable::new(
        vec!["分類".into(), "フロア名".into(), "内容".into()],
        rows.iter()
            .map(|(c, f, text)| {
                vec![
                    CATEGORIES[*c].to_string(),
                    FLOORS[*f].to_string(),
                    text.clone(),
                ]
            })
            .collect(),
        b',',
    )
}

fn blocked() -> Vec<String> {
    carelog::split::BLOCKED_CATEGORIES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Ragged annotation lists.
fn annotation_lists() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec("[a-z]{1,5}", 0..6), 0..20)
}

// =============================================================================
// Splitter
// =============================================================================

mod split_props {
    use super::*;

    proptest! {
        /// No blocked category survives filtering and partitioning.
        #[test]
        fn blocked_rows_never_partitioned(rows in record_rows()) {
            let table = table_from(&rows);
            let filtered = filter_blocked(&table, "分類", &blocked()).unwrap();
            let parts = partition_by_floor(&filtered, "フロア名").unwrap();

            for part in &parts {
                for category in part.table.column_values(0) {
                    prop_assert!(!blocked().iter().any(|b| b == category));
                }
            }
        }

        /// Every kept row with a floor lands in exactly its floor's partition.
        #[test]
        fn partitions_cover_kept_rows(rows in record_rows()) {
            let table = table_from(&rows);
            let filtered = filter_blocked(&table, "分類", &blocked()).unwrap();
            let parts = partition_by_floor(&filtered, "フロア名").unwrap();

            let with_floor = filtered.column_values(1).filter(|f| !f.is_empty()).count();
            let partitioned: usize = parts.iter().map(|p| p.table.row_count()).sum();
            prop_assert_eq!(with_floor, partitioned);

            let mut distinct: Vec<&str> = filtered.column_values(1).filter(|f| !f.is_empty()).collect();
            distinct.sort();
            distinct.dedup();
            prop_assert_eq!(parts.len(), distinct.len());

            for part in &parts {
                prop_assert!(part.table.column_values(1).all(|f| f == part.floor));
            }
        }
    }
}

// =============================================================================
// Reshape
// =============================================================================

mod reshape_props {
    use super::*;

    proptest! {
        /// Reshaping a fixed-width set changes nothing.
        #[test]
        fn reshape_is_idempotent(lists in annotation_lists()) {
            let once = AnnotationSet::from_lists(lists).reshape();
            prop_assert_eq!(once.reshape(), once);
        }

        /// Every row of a reshaped set has the batch width.
        #[test]
        fn reshape_uniform_width(lists in annotation_lists()) {
            let width = lists.iter().map(Vec::len).max().unwrap_or(0);
            let fixed = AnnotationSet::from_lists(lists).reshape();
            for r in 0..fixed.row_count() {
                prop_assert_eq!(fixed.row(r).len(), width);
            }
        }

        /// Dense lists materialize exactly `width` columns of `rows` cells.
        #[test]
        fn columns_match_width(lists in annotation_lists()) {
            let rows = lists.len();
            let set = AnnotationSet::from_lists(lists);
            let cols = set.columns("person");
            prop_assert_eq!(cols.len(), set.width());
            for (_, cells) in &cols {
                prop_assert_eq!(cells.len(), rows);
            }
        }
    }
}

// =============================================================================
// Parsing and anonymization
// =============================================================================

mod parse_props {
    use super::*;

    proptest! {
        /// Parsers never panic on arbitrary model output.
        #[test]
        fn parsers_never_panic(response in "\\PC{0,200}") {
            let _ = parse_icf_abstraction(&response);
            let _ = parse_emotion(&response);
            let _ = parse_icf_code(&response);
        }

        /// A parsed code is always one lowercase letter and three digits.
        #[test]
        fn codes_are_normalized(response in "\\PC{0,80}") {
            if let Some(code) = parse_icf_code(&response).value() {
                let s = code.as_str();
                prop_assert_eq!(s.chars().count(), 4);
                prop_assert!(s.chars().next().unwrap().is_lowercase());
                prop_assert!(s.chars().skip(1).all(|c| c.is_ascii_digit()));
            }
        }

        /// Anonymization is reversible.
        #[test]
        fn anonymize_round_trip(text in "[ぁ-んァ-ン一-龥、。]{0,30}") {
            let anonymized = PatternAnonymizer::new().anonymize(&text);
            prop_assert_eq!(anonymized.deanonymize(&anonymized.text), text);
        }
    }
}
