use crate::domain::schema::Column;
use crate::domain::{Cell, ListingRecord};
use serde_json::Value;

/// Walk `path` through nested objects. Any missing key or non-object hop gives `None`.
pub fn lookup<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(root, |node, key| node.as_object()?.get(*key))
}

/// Project one home object onto `columns`. Never fails; missing fields are `Null`.
pub fn project(home: &Value, columns: &[Column]) -> ListingRecord {
    columns
        .iter()
        .map(|col| lookup(home, col.path).map(Cell::from_json).unwrap_or(Cell::Null))
        .collect()
}

/// Every element of the array at `list_path`, projected. A missing or non-array list is empty.
pub fn extract_records(data: &Value, list_path: &[&str], columns: &[Column]) -> Vec<ListingRecord> {
    lookup(data, list_path)
        .and_then(Value::as_array)
        .map(|homes| homes.iter().map(|h| project(h, columns)).collect())
        .unwrap_or_default()
}
