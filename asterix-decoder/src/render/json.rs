//! JSON rendering, compact and hierarchical.

use asterix_core::FieldValue;
use asterix_registry::DataItem;
use serde_json::{Map, Number, Value, json};

use crate::error::AsterixError;
use crate::render::Renderer;
use crate::types::{DataBlock, DataRecord, hex_string};

pub(crate) fn block_json(
    r: &Renderer<'_>,
    block: &DataBlock,
    hierarchical: bool,
) -> Result<String, AsterixError> {
    let records: Vec<Value> = block
        .records
        .iter()
        .map(|rec| record_json(r, block.category, rec, hierarchical))
        .collect();

    let root = if hierarchical {
        json!({
            "category": block.category,
            "length": block.length,
            "timestamp_ms": block.timestamp_ms,
            "hex_data": block.hex_data,
            "records": records,
        })
    } else {
        json!({ "category": block.category, "records": records })
    };

    let rendered = if hierarchical {
        serde_json::to_string_pretty(&root)
    } else {
        serde_json::to_string(&root)
    };
    rendered.map_err(|e| AsterixError::Internal(format!("JSON rendering failed: {e}")))
}

fn record_json(r: &Renderer<'_>, cat: u8, record: &DataRecord, hierarchical: bool) -> Value {
    let mut map = Map::new();
    for item in &record.items {
        let descr = r.item_descr(cat, &item.id);
        let value = if hierarchical {
            value_json(descr, None, &item.value)
        } else {
            value_json_flat(descr, &item.value)
        };
        map.insert(item.id.clone(), value);
    }
    if let Some(err) = &record.error {
        map.insert("_error".to_string(), Value::String(err.clone()));
    }
    Value::Object(map)
}

/// Mirrors the decoded tree: maps become objects, arrays become arrays.
fn value_json(item: Option<&DataItem>, name: Option<&str>, value: &FieldValue) -> Value {
    match value {
        FieldValue::Nested(map) => Value::Object(
            map.iter()
                .map(|(n, v)| (n.to_string(), value_json(item, Some(n), v)))
                .collect(),
        ),
        FieldValue::Array(values) => Value::Array(
            values
                .iter()
                .map(|v| value_json(item, name, v))
                .collect(),
        ),
        leaf => leaf_json(item, name, leaf),
    }
}

/// Flattens nested maps into dotted keys; arrays stay arrays, with each
/// element flattened in place.
fn value_json_flat(item: Option<&DataItem>, value: &FieldValue) -> Value {
    match value {
        FieldValue::Nested(_) => {
            let mut out = Map::new();
            flatten_into(item, "", None, value, &mut out);
            Value::Object(out)
        }
        FieldValue::Array(values) => {
            Value::Array(values.iter().map(|v| value_json_flat(item, v)).collect())
        }
        leaf => leaf_json(item, None, leaf),
    }
}

fn flatten_into(
    item: Option<&DataItem>,
    prefix: &str,
    name: Option<&str>,
    value: &FieldValue,
    out: &mut Map<String, Value>,
) {
    match value {
        FieldValue::Nested(map) => {
            for (n, v) in map.iter() {
                let path = if prefix.is_empty() {
                    n.to_string()
                } else {
                    format!("{prefix}.{n}")
                };
                flatten_into(item, &path, Some(n), v, out);
            }
        }
        FieldValue::Array(values) => {
            out.insert(
                prefix.to_string(),
                Value::Array(values.iter().map(|v| value_json_flat(item, v)).collect()),
            );
        }
        leaf => {
            out.insert(prefix.to_string(), leaf_json(item, name, leaf));
        }
    }
}

fn leaf_json(item: Option<&DataItem>, name: Option<&str>, value: &FieldValue) -> Value {
    match value {
        FieldValue::Integer(v) => json!(v),
        FieldValue::Unsigned(v) => json!(v),
        FieldValue::Float(v) => {
            // Round to the field's declared precision; JSON numbers carry
            // no trailing zeros, so rounding is all precision means here.
            let rounded = match name
                .and_then(|n| item.and_then(|it| it.find_field(n)))
                .map(|f| f.decimals)
            {
                Some(d) => {
                    let p = 10f64.powi(d as i32);
                    (v * p).round() / p
                }
                None => *v,
            };
            Number::from_f64(rounded).map(Value::Number).unwrap_or(Value::Null)
        }
        FieldValue::String(s) => Value::String(s.clone()),
        FieldValue::Bytes(b) => Value::String(hex_string(b)),
        FieldValue::BitFlag(b) => Value::Bool(*b),
        FieldValue::Nested(_) | FieldValue::Array(_) => Value::Null,
    }
}
