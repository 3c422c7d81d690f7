//! Record tables
//!
//! Builds [`Record`]s from enriched rows delivered as JSON objects keyed by
//! column name. A column that no row carries at all is tracked separately
//! from a per-row empty cell: under [`ColumnPolicy::Lenient`] it is logged
//! and scored as absent everywhere, under [`ColumnPolicy::Strict`] loading
//! fails with [`Error::MissingColumn`].

use crate::feature::{Categorical, Dimension, GradeProperty};
use crate::record::{GradeRange, Interval, Record, RecordId};
use crate::{Error, Result};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, warn};

/// How to treat a feature column that is absent from the whole table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnPolicy {
    /// Score the column as absent for every row
    #[default]
    Lenient,
    /// Reject the table
    Strict,
}

/// An ordered set of records plus the columns the source table lacked
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    records: Vec<Record>,
    missing_columns: Vec<String>,
}

impl RecordTable {
    /// Wrap already-built records. No column tracking applies.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            missing_columns: Vec::new(),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Feature columns not present in any input row
    pub fn missing_columns(&self) -> &[String] {
        &self.missing_columns
    }

    /// Load from a file holding either a JSON array of rows or one row per line
    pub fn from_path<P: AsRef<Path>>(path: P, policy: ColumnPolicy) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text, policy)
    }

    pub fn from_json_str(text: &str, policy: ColumnPolicy) -> Result<Self> {
        let mut values = serde_json::Deserializer::from_str(text)
            .into_iter::<Value>()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let rows = if values.len() == 1 && values[0].is_array() {
            match values.pop() {
                Some(Value::Array(rows)) => rows,
                _ => Vec::new(),
            }
        } else {
            values
        };

        Self::from_json_rows(&rows, policy)
    }

    pub fn from_json_rows(rows: &[Value], policy: ColumnPolicy) -> Result<Self> {
        let objects = rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                row.as_object().ok_or_else(|| Error::InvalidRow {
                    index,
                    reason: "expected a JSON object".to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        // Column presence is only observable through rows
        if objects.is_empty() {
            return Ok(Self::default());
        }

        let present: AHashSet<&str> = objects
            .iter()
            .flat_map(|row| row.keys().map(String::as_str))
            .collect();

        let missing_columns = missing_feature_columns(&present);
        if !missing_columns.is_empty() {
            if policy == ColumnPolicy::Strict {
                return Err(Error::MissingColumn(missing_columns.join(", ")));
            }
            for column in &missing_columns {
                warn!("Column '{}' absent from input; scoring it as missing for every row", column);
            }
        }

        let records = objects
            .iter()
            .enumerate()
            .map(|(index, row)| record_from_row(index, row))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            records,
            missing_columns,
        })
    }
}

impl From<Vec<Record>> for RecordTable {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

fn missing_feature_columns(present: &AHashSet<&str>) -> Vec<String> {
    let mut missing = Vec::new();

    for dim in Dimension::ALL {
        for column in [dim.min_column(), dim.max_column()] {
            if !present.contains(column.as_str()) {
                missing.push(column);
            }
        }
    }

    for field in Categorical::ALL {
        if !present.contains(field.column()) {
            missing.push(field.column().to_string());
        }
    }

    // A grade column is satisfied by its midpoint or by either range bound
    for grade in GradeProperty::ALL {
        let mid = grade.mid_column();
        let has_range = present.contains(grade.min_column().as_str())
            || present.contains(grade.max_column().as_str());
        if !present.contains(mid.as_str()) && !has_range {
            missing.push(mid);
        }
    }

    missing
}

fn record_from_row(index: usize, row: &Map<String, Value>) -> Result<Record> {
    let id = row
        .get("id")
        .and_then(parse_id)
        .ok_or(Error::MissingId { index })?;

    let mut record = Record::new(id);

    for dim in Dimension::ALL {
        let min = numeric_cell(row, &dim.min_column());
        let max = numeric_cell(row, &dim.max_column());
        record.set_dimension(dim, Interval::new(min, max));
    }

    for field in Categorical::ALL {
        record.set_categorical(field, text_cell(row, field.column()));
    }

    for grade in GradeProperty::ALL {
        let mid = numeric_cell(row, &grade.mid_column()).or_else(|| {
            GradeRange::new(
                numeric_cell(row, &grade.min_column()),
                numeric_cell(row, &grade.max_column()),
            )
            .midpoint()
        });
        record.set_grade(grade, mid);
    }

    Ok(record)
}

fn parse_id(value: &Value) -> Option<RecordId> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::Number(n) => Some(match n.as_u64() {
            Some(i) => RecordId::Integer(i),
            None => RecordId::String(n.to_string()),
        }),
        other => serde_json::from_value(other.clone()).ok(),
    }
}

fn numeric_cell(row: &Map<String, Value>, column: &str) -> Option<f64> {
    match row.get(column)? {
        Value::Null => None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(v) => Some(v),
            Err(_) => {
                debug!("Unparsable numeric cell {}={:?}; treating as missing", column, s);
                None
            }
        },
        other => {
            debug!("Unexpected value in numeric column {}: {}; treating as missing", column, other);
            None
        }
    }
}

fn text_cell(row: &Map<String, Value>, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => {
            debug!("Unexpected value in categorical column {}: {}; treating as missing", column, other);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_row(id: u64) -> Value {
        json!({
            "id": id,
            "thickness_min": 1.0, "thickness_max": 2.0,
            "width_min": 1000.0, "width_max": 1250.0,
            "length_min": null, "length_max": null,
            "height_min": null, "height_max": null,
            "weight_min": null, "weight_max": null,
            "inner_diameter_min": null, "inner_diameter_max": null,
            "outer_diameter_min": null, "outer_diameter_max": null,
            "coating": "Z140", "finish": "", "form": "coil",
            "surface_type": null, "surface_protection": null,
            "tensile_mid": 410.0, "yield_mid": 280.0, "elongation_mid": 22.0,
            "reduction_mid": null, "hardness_mid": null
        })
    }

    #[test]
    fn test_load_full_rows() {
        let table = RecordTable::from_json_rows(&[full_row(1), full_row(2)], ColumnPolicy::Strict).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.missing_columns().is_empty());

        let record = &table.records()[0];
        assert_eq!(record.id, RecordId::Integer(1));
        assert_eq!(record.dimension(Dimension::Thickness).bounds(), Some((1.0, 2.0)));
        assert_eq!(record.dimension(Dimension::Length).bounds(), None);
        assert_eq!(record.categorical(Categorical::Coating), Some("Z140"));
        assert_eq!(record.categorical(Categorical::Finish), None);
        assert_eq!(record.grade(GradeProperty::Tensile), Some(410.0));
        assert_eq!(record.grade(GradeProperty::Hardness), None);
    }

    #[test]
    fn test_missing_column_lenient() {
        let rows = vec![json!({"id": "a", "thickness_min": 1.0, "thickness_max": 2.0})];
        let table = RecordTable::from_json_rows(&rows, ColumnPolicy::Lenient).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.missing_columns().contains(&"coating".to_string()));
        assert!(table.missing_columns().contains(&"tensile_mid".to_string()));
        assert!(!table.missing_columns().contains(&"thickness_min".to_string()));
    }

    #[test]
    fn test_missing_column_strict() {
        let rows = vec![json!({"id": "a", "thickness_min": 1.0})];
        let result = RecordTable::from_json_rows(&rows, ColumnPolicy::Strict);
        assert!(matches!(result, Err(Error::MissingColumn(ref cols)) if cols.contains("thickness_max")));
    }

    #[test]
    fn test_empty_input_is_not_missing_columns() {
        for policy in [ColumnPolicy::Strict, ColumnPolicy::Lenient] {
            let table = RecordTable::from_json_str("[]", policy).unwrap();
            assert_eq!(table.len(), 0);
            assert!(table.missing_columns().is_empty());
        }
        let table = RecordTable::from_json_rows(&[], ColumnPolicy::Strict).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_grade_range_columns_fill_midpoint() {
        let rows = vec![json!({"id": 1, "tensile_min": 400, "tensile_max": 500, "yield_min": 300})];
        let table = RecordTable::from_json_rows(&rows, ColumnPolicy::Lenient).unwrap();
        let record = &table.records()[0];
        assert_eq!(record.grade(GradeProperty::Tensile), Some(450.0));
        assert_eq!(record.grade(GradeProperty::Yield), Some(300.0));
        assert!(!table.missing_columns().contains(&"tensile_mid".to_string()));
    }

    #[test]
    fn test_mid_column_wins_over_range() {
        let rows = vec![json!({"id": 1, "tensile_mid": 420, "tensile_min": 400, "tensile_max": 500})];
        let table = RecordTable::from_json_rows(&rows, ColumnPolicy::Lenient).unwrap();
        assert_eq!(table.records()[0].grade(GradeProperty::Tensile), Some(420.0));
    }

    #[test]
    fn test_numeric_strings_and_garbage() {
        let rows = vec![json!({"id": 1, "width_min": " 12.5 ", "width_max": "wide"})];
        let table = RecordTable::from_json_rows(&rows, ColumnPolicy::Lenient).unwrap();
        let width = table.records()[0].dimension(Dimension::Width);
        assert_eq!(width.min(), Some(12.5));
        assert_eq!(width.max(), None);
    }

    #[test]
    fn test_non_object_row_rejected() {
        let rows = vec![json!({"id": 1}), json!([1, 2, 3])];
        let result = RecordTable::from_json_rows(&rows, ColumnPolicy::Lenient);
        assert!(matches!(result, Err(Error::InvalidRow { index: 1, .. })));
    }

    #[test]
    fn test_missing_id_rejected() {
        let rows = vec![json!({"id": null, "coating": "Z"})];
        let result = RecordTable::from_json_rows(&rows, ColumnPolicy::Lenient);
        assert!(matches!(result, Err(Error::MissingId { index: 0 })));
    }

    #[test]
    fn test_json_lines_and_array() {
        let lines = "{\"id\": 1}\n{\"id\": 2}\n";
        let array = "[{\"id\": 1}, {\"id\": 2}]";
        let a = RecordTable::from_json_str(lines, ColumnPolicy::Lenient).unwrap();
        let b = RecordTable::from_json_str(array, ColumnPolicy::Lenient).unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 2);
        assert_eq!(a.records()[1].id, b.records()[1].id);
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rfq_enriched.json");
        std::fs::write(&path, serde_json::to_string(&vec![full_row(5)]).unwrap()).unwrap();

        let table = RecordTable::from_path(&path, ColumnPolicy::Strict).unwrap();
        assert_eq!(table.records()[0].id, RecordId::Integer(5));
    }
}
