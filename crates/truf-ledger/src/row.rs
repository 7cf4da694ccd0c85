//! Canonical read rows.
//!
//! The node answers read calls either column-oriented
//! (`{"column_names": [...], "values": [[...], ...]}`) or row-oriented
//! (`[{"col": value, ...}, ...]`). Both normalize into `Vec<Row>` here, and
//! typed getters fail with a decode error that names the column.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{LedgerError, LedgerResult};

/// One result row, columns in node order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.0.insert(column.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, column: &str, value: impl Into<Value>) {
        self.0.insert(column.to_string(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn required(&self, column: &str) -> LedgerResult<&Value> {
        match self.0.get(column) {
            None | Some(Value::Null) => Err(LedgerError::decode(format!(
                "missing column '{column}'"
            ))),
            Some(v) => Ok(v),
        }
    }

    fn optional(&self, column: &str) -> Option<&Value> {
        self.0.get(column).filter(|v| !v.is_null())
    }

    /// Text value. Numbers and booleans are rendered.
    pub fn get_string(&self, column: &str) -> LedgerResult<String> {
        value_to_string(column, self.required(column)?)
    }

    pub fn get_opt_string(&self, column: &str) -> LedgerResult<Option<String>> {
        self.optional(column)
            .map(|v| value_to_string(column, v))
            .transpose()
    }

    /// Integer value. Numeric strings are accepted.
    pub fn get_i64(&self, column: &str) -> LedgerResult<i64> {
        value_to_i64(column, self.required(column)?)
    }

    pub fn get_opt_i64(&self, column: &str) -> LedgerResult<Option<i64>> {
        self.optional(column)
            .map(|v| value_to_i64(column, v))
            .transpose()
    }

    pub fn get_bool(&self, column: &str) -> LedgerResult<bool> {
        value_to_bool(column, self.required(column)?)
    }

    pub fn get_opt_bool(&self, column: &str) -> LedgerResult<Option<bool>> {
        self.optional(column)
            .map(|v| value_to_bool(column, v))
            .transpose()
    }

    /// Byte value: `0x`-prefixed hex, otherwise base64 (the node's wire form).
    pub fn get_bytes(&self, column: &str) -> LedgerResult<Vec<u8>> {
        value_to_bytes(column, self.required(column)?)
    }

    pub fn get_opt_bytes(&self, column: &str) -> LedgerResult<Option<Vec<u8>>> {
        self.optional(column)
            .map(|v| value_to_bytes(column, v))
            .transpose()
    }

    /// Byte value rendered as `0x`-prefixed lowercase hex.
    pub fn get_hex(&self, column: &str) -> LedgerResult<String> {
        Ok(format!("0x{}", hex::encode(self.get_bytes(column)?)))
    }
}

impl From<Map<String, Value>> for Row {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Normalize a read result into rows.
pub fn normalize_rows(value: Value) -> LedgerResult<Vec<Row>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| match item {
                Value::Object(map) => Ok(Row(map)),
                other => Err(LedgerError::decode(format!(
                    "row {idx} is not an object: {other}"
                ))),
            })
            .collect(),
        Value::Object(mut map) => {
            if let Some(inner) = map.remove("query_result") {
                return normalize_rows(inner);
            }
            let names = match map.remove("column_names") {
                Some(Value::Array(names)) => names,
                _ => {
                    return Err(LedgerError::decode(
                        "result has neither rows nor column_names",
                    ))
                }
            };
            let names = names
                .into_iter()
                .map(|n| match n {
                    Value::String(s) => Ok(s),
                    other => Err(LedgerError::decode(format!(
                        "column name is not a string: {other}"
                    ))),
                })
                .collect::<LedgerResult<Vec<String>>>()?;

            let values = match map.remove("values") {
                Some(Value::Array(values)) => values,
                None | Some(Value::Null) => Vec::new(),
                Some(other) => {
                    return Err(LedgerError::decode(format!(
                        "values is not an array: {other}"
                    )))
                }
            };

            values
                .into_iter()
                .enumerate()
                .map(|(idx, row)| {
                    let cells = match row {
                        Value::Array(cells) => cells,
                        other => {
                            return Err(LedgerError::decode(format!(
                                "row {idx} is not an array: {other}"
                            )))
                        }
                    };
                    if cells.len() != names.len() {
                        return Err(LedgerError::decode(format!(
                            "row {idx} has {} cells for {} columns",
                            cells.len(),
                            names.len()
                        )));
                    }
                    Ok(Row(names.iter().cloned().zip(cells).collect()))
                })
                .collect()
        }
        other => Err(LedgerError::decode(format!("unexpected read result: {other}"))),
    }
}

fn value_to_string(column: &str, value: &Value) -> LedgerResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(LedgerError::decode(format!("column '{column}' is not text: {other}"))),
    }
}

fn value_to_i64(column: &str, value: &Value) -> LedgerResult<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| LedgerError::decode(format!("column '{column}' is not an integer: {value}")))
}

fn value_to_bool(column: &str, value: &Value) -> LedgerResult<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "t" | "1" => Some(true),
            "false" | "f" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        _ => None,
    }
    .ok_or_else(|| LedgerError::decode(format!("column '{column}' is not a boolean: {value}")))
}

fn value_to_bytes(column: &str, value: &Value) -> LedgerResult<Vec<u8>> {
    let text = match value {
        Value::String(s) => s,
        other => {
            return Err(LedgerError::decode(format!(
                "column '{column}' is not bytes: {other}"
            )))
        }
    };
    match text.strip_prefix("0x") {
        Some(hex_part) => hex::decode(hex_part)
            .map_err(|e| LedgerError::decode(format!("column '{column}': invalid hex: {e}"))),
        None => BASE64
            .decode(text)
            .map_err(|e| LedgerError::decode(format!("column '{column}': invalid base64: {e}"))),
    }
}
