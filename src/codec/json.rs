//! JSON array-of-objects codec.
//!
//! Decoding collects columns in order of first appearance across all
//! objects; objects missing a key get an empty cell there.

use super::{RowCodec, decode_utf8};
use crate::core::{PolicyError, Result};
use crate::mapper::{Cell, Table};
use serde_json::{Map, Number, Value as JsonValue};

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl JsonCodec {
    fn to_cell(value: &JsonValue) -> Cell {
        match value {
            JsonValue::Null => Cell::Empty,
            JsonValue::String(s) => Cell::Text(s.clone()),
            JsonValue::Number(n) => n.as_f64().map_or(Cell::Empty, Cell::Number),
            JsonValue::Bool(b) => Cell::Text(b.to_string()),
            // Nested values are kept as their JSON text
            JsonValue::Array(_) | JsonValue::Object(_) => Cell::Text(value.to_string()),
        }
    }

    fn to_json(cell: &Cell) -> JsonValue {
        match cell {
            Cell::Empty => JsonValue::Null,
            Cell::Text(s) => JsonValue::String(s.clone()),
            Cell::Number(n) => Number::from_f64(*n).map_or(JsonValue::Null, JsonValue::Number),
        }
    }
}

impl RowCodec for JsonCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Table> {
        let text = decode_utf8(bytes)?;
        let parsed: JsonValue = serde_json::from_str(text)?;
        let JsonValue::Array(items) = parsed else {
            return Err(PolicyError::CodecFailure(
                "expected a JSON array of objects".to_string(),
            ));
        };

        let mut objects = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            match item {
                JsonValue::Object(obj) => objects.push(obj),
                other => {
                    return Err(PolicyError::CodecFailure(format!(
                        "array element {} is not an object: {}",
                        i + 1,
                        other
                    )));
                }
            }
        }

        let mut columns: Vec<String> = Vec::new();
        for obj in &objects {
            for key in obj.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let mut table = Table::new(&columns);
        for obj in &objects {
            let cells = columns
                .iter()
                .map(|col| obj.get(col).map_or(Cell::Empty, Self::to_cell))
                .collect();
            table.push_row(cells);
        }
        Ok(table)
    }

    fn encode(&self, table: &Table) -> Result<Vec<u8>> {
        let rows: Vec<JsonValue> = table
            .rows()
            .iter()
            .map(|cells| {
                let obj: Map<String, JsonValue> = table
                    .columns()
                    .iter()
                    .zip(cells)
                    .map(|(col, cell)| (col.clone(), Self::to_json(cell)))
                    .collect();
                JsonValue::Object(obj)
            })
            .collect();
        Ok(serde_json::to_vec_pretty(&rows)?)
    }
}
