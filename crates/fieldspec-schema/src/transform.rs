use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::assembler::DatasetSchema;
use crate::error::{Result, SchemaError};
use crate::identifier::FieldIdentifier;

/// Renames raw source columns onto convention field names before records
/// are written to a strict index.
///
/// Columns without a rename are dropped, except those the caller asks to
/// keep as-is (ids, join keys).
///
/// ```json
/// {"tier0_to_tier1": {"application_id": "id_of_project", "project_title": "title_of_project"}}
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldTransform {
    renames: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct TransformFile {
    tier0_to_tier1: BTreeMap<String, String>,
}

impl FieldTransform {
    /// Every target must be a well-formed field name, and no two columns may
    /// land on the same field.
    pub fn new(renames: BTreeMap<String, String>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for (column, field) in &renames {
            FieldIdentifier::parse(field)?;
            if !seen.insert(field.as_str()) {
                return Err(SchemaError::Definition(format!(
                    "column {column:?} renames onto {field:?}, which another column already targets"
                )));
            }
        }
        Ok(Self { renames })
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let file: TransformFile =
            serde_json::from_str(data).map_err(|e| SchemaError::Definition(e.to_string()))?;
        Self::new(file.tier0_to_tier1)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| SchemaError::Definition(format!("{}: {e}", path.display())))?;
        Self::from_json(&data)
    }

    pub fn target(&self, column: &str) -> Option<&str> {
        self.renames.get(column).map(String::as_str)
    }

    /// Fail unless every target is a field of `schema`.
    pub fn check_schema(&self, schema: &DatasetSchema) -> Result<()> {
        for (column, field) in &self.renames {
            if schema.get(field).is_none() {
                return Err(SchemaError::UnknownTransformTarget {
                    column: column.clone(),
                    field: field.clone(),
                    dataset: schema.name().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Rename one record. Columns in `ignore` are copied through unchanged
    /// and take precedence over a renamed column of the same name.
    pub fn apply_record(&self, record: Map<String, Value>, ignore: &[&str]) -> Map<String, Value> {
        let mut out = Map::new();
        let mut kept = Vec::new();
        for (column, value) in record {
            if ignore.contains(&column.as_str()) {
                kept.push((column, value));
            } else if let Some(field) = self.renames.get(&column) {
                out.insert(field.clone(), value);
            }
        }
        out.extend(kept);
        out
    }

    /// Transform a single record or an array of records.
    pub fn apply(&self, data: Value, ignore: &[&str]) -> Result<Value> {
        match data {
            Value::Object(record) => Ok(Value::Object(self.apply_record(record, ignore))),
            Value::Array(rows) => {
                let count = rows.len();
                let rows = rows
                    .into_iter()
                    .map(|row| match row {
                        Value::Object(record) => Ok(Value::Object(self.apply_record(record, ignore))),
                        other => Err(not_a_record(&other)),
                    })
                    .collect::<Result<Vec<_>>>()?;
                debug!(records = count, "applied field transform");
                Ok(Value::Array(rows))
            }
            other => Err(not_a_record(&other)),
        }
    }
}

fn not_a_record(value: &Value) -> SchemaError {
    let kind = match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    };
    SchemaError::Definition(format!(
        "field transform expects a record or a list of records, got {kind}"
    ))
}
