//! Query engine - positional rows in, field-keyed records out.

use crate::{CellValue, Record, Sheet};
use std::collections::HashMap;

/// Query-string keys that are never treated as equality filters.
pub const RESERVED_KEYS: [&str; 7] = [
    "sheet", "action", "id", "data", "callback", "window", "interval",
];

/// Whether a query key is reserved for the transport rather than filtering.
pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Zip a sheet's positional rows into field maps, preserving row order.
///
/// A row shorter than the header list reads as empty strings for the
/// missing columns; extra cells beyond the headers are dropped. Native
/// value types are preserved, never coerced.
pub fn to_records(sheet: &Sheet) -> Vec<Record> {
    sheet
        .rows
        .iter()
        .map(|row| {
            let mut record = Record::new();
            for (i, header) in sheet.headers.iter().enumerate() {
                let value = row.get(i).cloned().unwrap_or(CellValue::String(String::new()));
                record.insert(header.clone(), value);
            }
            record
        })
        .collect()
}

/// Find the first record whose `id` field string-matches `id`.
///
/// Duplicate ids are a caller error; the scan stops at the first match.
pub fn find_by_id<'a>(records: &'a [Record], id: &str) -> Option<&'a Record> {
    records
        .iter()
        .find(|r| r.get("id").map(value_to_string).as_deref() == Some(id))
}

/// Index of the first row whose `id` field string-matches `id`.
///
/// Positions are only valid until the next mutation of the sheet.
pub fn position_by_id(records: &[Record], id: &str) -> Option<usize> {
    records
        .iter()
        .position(|r| r.get("id").map(value_to_string).as_deref() == Some(id))
}

/// Whether a record satisfies every filter, comparing string forms.
pub fn matches_filters(record: &Record, filters: &HashMap<String, String>) -> bool {
    filters.iter().all(|(key, expected)| {
        let actual = record.get(key).map(value_to_string).unwrap_or_default();
        actual == *expected
    })
}

/// Keep the records matching all filters, in their original order.
pub fn filter_records(records: Vec<Record>, filters: &HashMap<String, String>) -> Vec<Record> {
    records
        .into_iter()
        .filter(|r| matches_filters(r, filters))
        .collect()
}

/// The string form of a cell value used for id lookup and filtering.
///
/// Strings are taken as-is (no added quotes), null reads as empty.
pub fn value_to_string(value: &CellValue) -> String {
    match value {
        CellValue::Null => String::new(),
        CellValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sheet() -> Sheet {
        Sheet {
            headers: vec!["id".into(), "name".into(), "price".into()],
            rows: vec![
                vec![json!("1"), json!("Widget"), json!(9.5)],
                vec![json!("2"), json!("Gadget"), json!(12)],
                vec![json!("3"), json!("Widget"), json!(7)],
            ],
        }
    }

    #[test]
    fn records_keep_order_and_types() {
        let records = to_records(&sheet());

        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["id"], json!("1"));
        assert_eq!(records[0]["price"], json!(9.5));
        assert!(records[1]["price"].is_number());
    }

    #[test]
    fn short_rows_pad_with_empty_strings() {
        let sheet = Sheet {
            headers: vec!["id".into(), "name".into(), "price".into()],
            rows: vec![vec![json!("1")]],
        };

        let records = to_records(&sheet);
        assert_eq!(records[0]["name"], json!(""));
        assert_eq!(records[0]["price"], json!(""));
    }

    #[test]
    fn find_by_id_string_compares() {
        let sheet = Sheet {
            headers: vec!["id".into(), "name".into()],
            rows: vec![vec![json!(2), json!("numeric id")]],
        };
        let records = to_records(&sheet);

        // The stored id is a number; lookup still matches by string form.
        assert!(find_by_id(&records, "2").is_some());
        assert!(find_by_id(&records, "3").is_none());
    }

    #[test]
    fn position_matches_row_index() {
        let records = to_records(&sheet());
        assert_eq!(position_by_id(&records, "2"), Some(1));
        assert_eq!(position_by_id(&records, "9"), None);
    }

    #[test]
    fn filters_match_on_string_form() {
        let records = to_records(&sheet());
        let filters = HashMap::from([("name".to_string(), "Widget".to_string())]);

        let matched = filter_records(records, &filters);
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0]["id"], json!("1"));
        assert_eq!(matched[1]["id"], json!("3"));
    }

    #[test]
    fn numeric_filter_value_matches_number_cell() {
        let records = to_records(&sheet());
        let filters = HashMap::from([("price".to_string(), "12".to_string())]);

        let matched = filter_records(records, &filters);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0]["id"], json!("2"));
    }

    #[test]
    fn missing_field_matches_only_empty_filter() {
        let records = to_records(&sheet());
        let filters = HashMap::from([("supplier".to_string(), "Acme".to_string())]);
        assert!(filter_records(records.clone(), &filters).is_empty());

        let empty = HashMap::from([("supplier".to_string(), String::new())]);
        assert_eq!(filter_records(records, &empty).len(), 3);
    }

    #[test]
    fn reserved_keys() {
        for key in ["sheet", "action", "id", "data", "callback", "window", "interval"] {
            assert!(is_reserved_key(key), "{}", key);
        }
        assert!(!is_reserved_key("category"));
    }
}
