//! Property-based tests for mapping construction and substitution
//!
//! - Unique keys: row order does not change the table
//! - Duplicate keys: the last row for a key wins
//! - A second pass over rewritten output changes nothing when values and keys are disjoint

use std::collections::HashMap;

use proptest::prelude::*;
use post_id_replacer::pipeline::processing::{FieldLocator, MappingRow, MappingTable, Transformer, XmlTransformer};

/// Postnr-like keys, optionally padded with whitespace
fn key_strategy() -> impl Strategy<Value = String> {
    prop_oneof!["[0-9]{4}", " [0-9]{4}", "[0-9]{4}\t"]
}

/// Replacement ids; letters first so they never collide with keys
fn value_strategy() -> impl Strategy<Value = String> {
    "[A-Z][A-Z0-9]{1,5}"
}

fn rows_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec((key_strategy(), value_strategy()), 0..20)
}

fn table(rows: &[(String, String)]) -> MappingTable {
    MappingTable::build(rows.iter().map(|(k, v)| MappingRow::new(k.clone(), v.clone())))
}

fn document(values: &[String]) -> String {
    let body: String = values
        .iter()
        .map(|v| format!("<Rad><Postnummer>{}</Postnummer></Rad>", v))
        .collect();
    format!("<Liste>{}</Liste>", body)
}

proptest! {
    #[test]
    fn test_unique_keys_are_order_independent(
        rows in prop::collection::hash_map("[0-9]{4}", value_strategy(), 0..20),
        seed in any::<u64>(),
    ) {
        let forward: Vec<(String, String)> = rows.into_iter().collect();
        let mut shuffled = forward.clone();
        // Deterministic rotation + reverse stands in for a permutation
        if !shuffled.is_empty() {
            let len = shuffled.len();
            shuffled.rotate_left((seed as usize) % len);
            shuffled.reverse();
        }

        prop_assert_eq!(table(&forward), table(&shuffled));
    }

    #[test]
    fn test_last_row_wins(rows in rows_strategy()) {
        let built = table(&rows);

        let mut expected: HashMap<String, String> = HashMap::new();
        for (k, v) in &rows {
            expected.insert(k.trim().to_string(), v.trim().to_string());
        }

        prop_assert_eq!(built.len(), expected.len());
        for (k, v) in &expected {
            prop_assert_eq!(built.get(k), Some(v.as_str()));
        }
    }

    #[test]
    fn test_second_pass_is_a_no_op(
        rows in rows_strategy(),
        values in prop::collection::vec(key_strategy(), 0..10),
    ) {
        let mapping = table(&rows);
        let transformer = XmlTransformer::new(FieldLocator::flat());
        let xml = document(&values);

        let first = transformer.transform(xml.as_bytes(), &mapping).unwrap();
        let expected_hits = values.iter().filter(|v| mapping.get(v).is_some()).count();
        prop_assert_eq!(first.report.replacements.len(), expected_hits);
        prop_assert_eq!(first.report.modified, expected_hits > 0);
        prop_assert_eq!(first.output.is_some(), first.report.modified);

        if let Some(output) = first.output {
            let second = transformer.transform(&output, &mapping).unwrap();
            prop_assert!(!second.report.modified);
            prop_assert!(second.output.is_none());
        }
    }
}

