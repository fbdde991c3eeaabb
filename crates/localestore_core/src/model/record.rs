//! Owned result row used for entity hydration and array/scalar shapes.

use crate::error::{StoreError, StoreResult};
use crate::model::entity::EntityId;
use rusqlite::types::Value;
use serde_json::{Map, Number, Value as JsonValue};
use uuid::Uuid;

/// One result row, columns kept in select order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    columns: Vec<(String, Value)>,
}

impl Record {
    pub fn new(columns: Vec<(String, Value)>) -> Self {
        Self { columns }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> &[(String, Value)] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn into_columns(self) -> Vec<(String, Value)> {
        self.columns
    }

    fn require(&self, column: &str) -> StoreResult<&Value> {
        self.get(column)
            .ok_or_else(|| StoreError::InvalidData(format!("missing column `{column}` in result row")))
    }

    pub fn opt_text(&self, column: &str) -> StoreResult<Option<String>> {
        match self.require(column)? {
            Value::Null => Ok(None),
            Value::Text(text) => Ok(Some(text.clone())),
            other => Err(type_error(column, "text", other)),
        }
    }

    pub fn text(&self, column: &str) -> StoreResult<String> {
        self.opt_text(column)?
            .ok_or_else(|| StoreError::InvalidData(format!("column `{column}` is NULL")))
    }

    pub fn opt_integer(&self, column: &str) -> StoreResult<Option<i64>> {
        match self.require(column)? {
            Value::Null => Ok(None),
            Value::Integer(value) => Ok(Some(*value)),
            other => Err(type_error(column, "integer", other)),
        }
    }

    pub fn integer(&self, column: &str) -> StoreResult<i64> {
        self.opt_integer(column)?
            .ok_or_else(|| StoreError::InvalidData(format!("column `{column}` is NULL")))
    }

    pub fn id(&self, column: &str) -> StoreResult<EntityId> {
        let raw = self.text(column)?;
        Uuid::parse_str(&raw).map_err(|_| {
            StoreError::InvalidData(format!("invalid uuid value `{raw}` in column `{column}`"))
        })
    }

    /// Array-shaped view: column name to JSON value.
    pub fn to_json(&self) -> Map<String, JsonValue> {
        self.columns
            .iter()
            .map(|(name, value)| (name.clone(), value_to_json(value)))
            .collect()
    }
}

fn type_error(column: &str, expected: &str, found: &Value) -> StoreError {
    StoreError::InvalidData(format!(
        "column `{column}` expected {expected}, found {:?}",
        found.data_type()
    ))
}

pub(crate) fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Integer(number) => JsonValue::Number(Number::from(*number)),
        Value::Real(number) => Number::from_f64(*number).map_or(JsonValue::Null, JsonValue::Number),
        Value::Text(text) => JsonValue::String(text.clone()),
        Value::Blob(bytes) => JsonValue::Array(
            bytes
                .iter()
                .map(|byte| JsonValue::Number(Number::from(*byte)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::Record;
    use rusqlite::types::Value;

    fn sample() -> Record {
        Record::new(vec![
            ("id".to_string(), Value::Text("00000000-0000-4000-8000-000000000001".to_string())),
            ("title".to_string(), Value::Text("Bonjour".to_string())),
            ("rank".to_string(), Value::Integer(4)),
            ("summary".to_string(), Value::Null),
        ])
    }

    #[test]
    fn typed_getters_read_columns() {
        let record = sample();
        assert_eq!(record.text("title").unwrap(), "Bonjour");
        assert_eq!(record.integer("rank").unwrap(), 4);
        assert_eq!(record.opt_text("summary").unwrap(), None);
        assert_eq!(record.id("id").unwrap().to_string(), "00000000-0000-4000-8000-000000000001");
    }

    #[test]
    fn typed_getters_reject_missing_and_mistyped_columns() {
        let record = sample();
        assert!(record.text("missing").is_err());
        assert!(record.integer("title").is_err());
        assert!(record.text("summary").is_err());
    }

    #[test]
    fn json_view_keeps_values() {
        let json = sample().to_json();
        assert_eq!(json["title"], "Bonjour");
        assert_eq!(json["rank"], 4);
        assert!(json["summary"].is_null());
    }
}
