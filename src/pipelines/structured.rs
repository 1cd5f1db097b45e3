use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info, warn};
use serde_json::Value;

use crate::error::RecipeError;
use crate::model::Recipe;
use crate::store::{KeyValueBacking, RecipeStore};

/// Parse a structured export: a JSON array of recipe objects.
///
/// Bytes that are not UTF-8 JSON are a [`RecipeError::ParseFailure`]; JSON
/// whose top level is not an array is a [`RecipeError::InvalidFormat`].
/// Elements that are not objects are skipped with a warning, and so is a
/// non-empty array none of whose elements is an object. Records are not
/// validated; legacy and oddly typed fields are normalized by [`Recipe`]'s
/// deserializer.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<Recipe>, RecipeError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| RecipeError::ParseFailure(format!("not valid UTF-8: {}", e)))?;
    // Some editors save JSON with a byte order mark
    let text = text.trim_start_matches('\u{feff}');

    let value: Value =
        serde_json::from_str(text).map_err(|e| RecipeError::ParseFailure(e.to_string()))?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(RecipeError::InvalidFormat(format!(
                "expected a list of recipes, found {}",
                describe(&other)
            )))
        }
    };

    let total = items.len();
    let records = decode_records(items);

    if total > 0 && records.is_empty() {
        return Err(RecipeError::InvalidFormat(format!(
            "none of the {} entries is a recipe",
            total
        )));
    }
    if records.len() < total {
        warn!(
            "Skipped {} of {} entries that are not recipes",
            total - records.len(),
            total
        );
    }
    Ok(records)
}

/// Decode each element on its own so one bad entry never costs the rest
fn decode_records(items: Vec<Value>) -> Vec<Recipe> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            if !item.is_object() {
                debug!("Entry {} is {}, not a recipe", index, describe(&item));
                return None;
            }
            match serde_json::from_value(item) {
                Ok(recipe) => Some(recipe),
                Err(e) => {
                    debug!("Entry {} could not be read: {}", index, e);
                    None
                }
            }
        })
        .collect()
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Render the collection as pretty-printed JSON
pub fn export_records(records: &[Recipe]) -> Result<String, RecipeError> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Export file name carrying the export date, e.g. `recepten-2024-05-01.json`
pub fn export_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}-{}.json", prefix, date.format("%Y-%m-%d"))
}

/// Append the records in `bytes` after the existing collection.
///
/// Incoming ids are kept as they are unless `fresh_ids` is set, in which case
/// blank or already-taken ids are replaced by newly minted ones. Returns the
/// number of records imported.
pub fn import_merge<B: KeyValueBacking>(
    store: &mut RecipeStore<B>,
    bytes: &[u8],
    fresh_ids: bool,
    now: DateTime<Utc>,
) -> Result<usize, RecipeError> {
    let mut incoming = parse_records(bytes)?;

    let mut taken: HashSet<String> = store.snapshot().iter().map(|r| r.id.clone()).collect();
    let mut duplicates = 0;
    for record in incoming.iter_mut() {
        let clash = record.id.is_empty() || taken.contains(&record.id);
        if clash && fresh_ids {
            record.id = loop {
                let id = store.next_id(now);
                if !taken.contains(&id) {
                    break id;
                }
            };
        } else if clash {
            duplicates += 1;
        }
        taken.insert(record.id.clone());
    }

    if duplicates > 0 {
        warn!(
            "{} imported recipes have a blank or duplicate id; lookups by id may hit either copy",
            duplicates
        );
    }

    let count = incoming.len();
    store.append(incoming)?;
    info!("Merged {} recipes from structured import", count);
    Ok(count)
}

/// Replace the whole collection with the records in `bytes`.
///
/// Destructive and irreversible; callers confirm with the user first.
pub fn import_replace<B: KeyValueBacking>(
    store: &mut RecipeStore<B>,
    bytes: &[u8],
) -> Result<usize, RecipeError> {
    let incoming = parse_records(bytes)?;
    let count = incoming.len();
    let discarded = store.snapshot().len();
    store.replace_all(incoming)?;
    info!(
        "Replaced {} recipes with {} from structured import",
        discarded, count
    );
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryBacking, DEFAULT_STORAGE_KEY};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn store_with(json: &str) -> RecipeStore<MemoryBacking> {
        let mut backing = MemoryBacking::new();
        backing.write(DEFAULT_STORAGE_KEY, json).unwrap();
        RecipeStore::open(backing, DEFAULT_STORAGE_KEY)
    }

    #[test]
    fn test_parse_failure_on_bad_json() {
        assert!(matches!(
            parse_records(b"[{\"name\": "),
            Err(RecipeError::ParseFailure(_))
        ));
    }

    #[test]
    fn test_parse_failure_on_invalid_utf8() {
        assert!(matches!(
            parse_records(&[0x5b, 0xff, 0xfe, 0x5d]),
            Err(RecipeError::ParseFailure(_))
        ));
    }

    #[test]
    fn test_invalid_format_when_not_a_list() {
        let result = parse_records(br#"{"recipes": []}"#);
        match result {
            Err(RecipeError::InvalidFormat(msg)) => assert!(msg.contains("an object")),
            other => panic!("expected InvalidFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_non_object_entries_are_skipped() {
        let records = parse_records(br#"[{"name": "Soep"}, 3, null, {"name": "Stoof"}]"#).unwrap();
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Soep", "Stoof"]);
    }

    #[test]
    fn test_invalid_format_when_no_entry_is_an_object() {
        assert!(matches!(
            parse_records(b"[1, 2, 3]"),
            Err(RecipeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_oddly_typed_record_passes_through() {
        let records = parse_records(
            br#"[{"id": "1", "name": "Soep"},
                 {"id": "2", "name": "Stoof", "categories": ["Vis", null], "sourceKind": false}]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].categories, vec!["Vis"]);
    }

    #[test]
    fn test_merge_keeps_oddly_typed_records() {
        let mut store = store_with(r#"[{"id": "0", "name": "Hutspot"}]"#);
        let count = import_merge(
            &mut store,
            br#"[{"id": "1", "name": "Soep"}, {"id": "2", "name": "Stoof", "category": 7}]"#,
            false,
            now(),
        )
        .unwrap();
        assert_eq!(count, 2);
        let names: Vec<_> = store.snapshot().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Hutspot", "Soep", "Stoof"]);
    }

    #[test]
    fn test_parse_accepts_byte_order_mark() {
        let records = parse_records("\u{feff}[]".as_bytes()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_records_are_not_validated() {
        let records = parse_records(br#"[{"name": ""}, {"id": "1"}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "");
        assert_eq!(records[1].id, "1");
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(
            export_file_name("recepten", date),
            "recepten-2024-05-01.json"
        );
    }

    #[test]
    fn test_export_is_pretty_printed() {
        let records = parse_records(br#"[{"id": "1", "name": "Soep"}]"#).unwrap();
        let json = export_records(&records).unwrap();
        assert!(json.starts_with("[\n  {\n    \"id\": \"1\""));
        assert_eq!(parse_records(json.as_bytes()).unwrap(), records);
    }

    #[test]
    fn test_merge_keeps_duplicate_ids_by_default() {
        let mut store = store_with(r#"[{"id": "1", "name": "Soep"}]"#);
        let count = import_merge(
            &mut store,
            br#"[{"id": "1", "name": "Andere soep"}]"#,
            false,
            now(),
        )
        .unwrap();
        assert_eq!(count, 1);
        let ids: Vec<_> = store.snapshot().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "1"]);
    }

    #[test]
    fn test_merge_with_fresh_ids() {
        let mut store = store_with(r#"[{"id": "1", "name": "Soep"}]"#);
        import_merge(
            &mut store,
            br#"[{"id": "1", "name": "Andere soep"}, {"name": "Zonder id"}, {"id": "7", "name": "Eigen id"}]"#,
            true,
            now(),
        )
        .unwrap();

        let ids: Vec<_> = store.snapshot().iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids[0], "1");
        assert_eq!(ids[1], now().timestamp_millis().to_string());
        assert_eq!(ids[2], format!("{}_1", now().timestamp_millis()));
        assert_eq!(ids[3], "7");
    }

    #[test]
    fn test_merge_rejects_before_writing() {
        let mut store = store_with(r#"[{"id": "1", "name": "Soep"}]"#);
        let version = store.version();
        assert!(import_merge(&mut store, b"\"nope\"", false, now()).is_err());
        assert_eq!(store.version(), version);
        assert_eq!(store.snapshot().len(), 1);
    }

    #[test]
    fn test_replace_discards_existing() {
        let mut store = store_with(r#"[{"id": "1", "name": "Soep"}, {"id": "2", "name": "Stoof"}]"#);
        let count = import_replace(&mut store, br#"[{"id": "9", "name": "Taart"}]"#).unwrap();
        assert_eq!(count, 1);
        assert_eq!(store.load().len(), 1);
        assert_eq!(store.snapshot()[0].name, "Taart");
    }
}
