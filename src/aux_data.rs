//! Auxiliary cell data
//!
//! Some cell types need more than a code (a sign carries a message). Those
//! cells own one [`AuxRecord`] keyed by their coordinate.

use crate::coords::CellCoord;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Extra data attached to one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuxRecord {
    /// The owning cell.
    pub cell: CellCoord,
    /// Type-specific fields, written alongside `cell`.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl AuxRecord {
    /// A fresh record for `cell` populated from a type's defaults.
    pub fn with_defaults(cell: CellCoord, defaults: &Map<String, Value>) -> Self {
        let mut fields = defaults.clone();
        // `cell` is reserved for the owning coordinate
        fields.remove("cell");
        Self { cell, fields }
    }
}

/// At most one record per coordinate, iterated row-major.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuxTable {
    records: BTreeMap<CellCoord, AuxRecord>,
}

impl AuxTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record at its own coordinate, returning any record it replaced.
    pub fn insert(&mut self, record: AuxRecord) -> Option<AuxRecord> {
        self.records.insert(record.cell, record)
    }

    pub fn remove(&mut self, cell: CellCoord) -> Option<AuxRecord> {
        self.records.remove(&cell)
    }

    pub fn get(&self, cell: CellCoord) -> Option<&AuxRecord> {
        self.records.get(&cell)
    }

    pub fn get_mut(&mut self, cell: CellCoord) -> Option<&mut AuxRecord> {
        self.records.get_mut(&cell)
    }

    pub fn contains(&self, cell: CellCoord) -> bool {
        self.records.contains_key(&cell)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records sorted by row, then column.
    pub fn iter(&self) -> impl Iterator<Item = &AuxRecord> {
        self.records.values()
    }

    /// Keep only records for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&AuxRecord) -> bool) {
        self.records.retain(|_, record| keep(record));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message_defaults() -> Map<String, Value> {
        let mut defaults = Map::new();
        defaults.insert("message".to_string(), json!(""));
        defaults
    }

    #[test]
    fn test_with_defaults_copies_fields() {
        let record = AuxRecord::with_defaults(CellCoord::new(2, 3), &message_defaults());
        assert_eq!(record.cell, CellCoord::new(2, 3));
        assert_eq!(record.fields.get("message"), Some(&json!("")));
    }

    #[test]
    fn test_with_defaults_ignores_cell_field() {
        let mut defaults = message_defaults();
        defaults.insert("cell".to_string(), json!({"x": 9, "y": 9}));
        let record = AuxRecord::with_defaults(CellCoord::new(1, 1), &defaults);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, json!({"cell": {"x": 1, "y": 1}, "message": ""}));
    }

    #[test]
    fn test_one_record_per_cell() {
        let mut table = AuxTable::new();
        let cell = CellCoord::new(4, 0);
        assert!(table.insert(AuxRecord::with_defaults(cell, &message_defaults())).is_none());
        assert!(table.insert(AuxRecord::with_defaults(cell, &Map::new())).is_some());
        assert_eq!(table.len(), 1);
        assert!(table.get(cell).unwrap().fields.is_empty());
    }

    #[test]
    fn test_iter_is_row_major() {
        let mut table = AuxTable::new();
        for (x, y) in [(3, 1), (0, 2), (7, 0), (1, 1)] {
            table.insert(AuxRecord::with_defaults(CellCoord::new(x, y), &Map::new()));
        }
        let order: Vec<_> = table.iter().map(|r| (r.cell.x, r.cell.y)).collect();
        assert_eq!(order, vec![(7, 0), (1, 1), (3, 1), (0, 2)]);
    }

    #[test]
    fn test_deserialize_extra_fields() {
        let record: AuxRecord =
            serde_json::from_value(json!({"cell": {"x": 5, "y": 6}, "message": "hi", "ttl": 3}))
                .unwrap();
        assert_eq!(record.cell, CellCoord::new(5, 6));
        assert_eq!(record.fields.len(), 2);
    }
}
