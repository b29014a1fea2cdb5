use recwire_codec::{Schema, TypeTag, Value};
use serde_json::{Number, Value as Json};

use crate::exit::{CliError, CliResult};

/// Parse a comma-separated type list such as `bytes,u64,text`.
pub fn parse_schema(list: &str) -> CliResult<Schema> {
    let mut tags = Vec::new();
    for (i, piece) in list.split(',').enumerate() {
        let piece = piece.trim();
        if piece.is_empty() {
            return Err(CliError::usage(format!("schema entry {i} is empty")));
        }
        let tag: TypeTag = piece.parse().unwrap_or_else(|never| match never {});
        if !tag.is_builtin() {
            return Err(CliError::usage(format!(
                "unknown type `{piece}` (expected one of bytes, u64, i64, f64, f32, bool, text)"
            )));
        }
        tags.push(tag);
    }
    Ok(Schema::from_tags("cli", tags))
}

/// Parse a JSON array holding one entry per schema field.
pub fn parse_values(schema: &Schema, json: &str) -> CliResult<Vec<Value>> {
    let parsed: Json =
        serde_json::from_str(json).map_err(|err| CliError::usage(format!("invalid JSON: {err}")))?;
    let Json::Array(items) = parsed else {
        return Err(CliError::usage("values must be a JSON array"));
    };
    if items.len() != schema.len() {
        return Err(CliError::data(format!(
            "schema has {} fields, got {} values",
            schema.len(),
            items.len()
        )));
    }

    schema
        .fields()
        .iter()
        .zip(&items)
        .map(|(field, item)| {
            json_to_value(&field.tag, item).ok_or_else(|| {
                CliError::data(format!(
                    "{}: expected {} value, got {item}",
                    field.name, field.tag
                ))
            })
        })
        .collect()
}

fn json_to_value(tag: &TypeTag, json: &Json) -> Option<Value> {
    let value = match tag {
        TypeTag::Bytes => match json {
            Json::String(s) => Value::from(s.as_bytes()),
            Json::Array(items) => {
                let bytes = items
                    .iter()
                    .map(|item| item.as_u64().and_then(|b| u8::try_from(b).ok()))
                    .collect::<Option<Vec<u8>>>()?;
                Value::from(bytes)
            }
            _ => return None,
        },
        TypeTag::UInt => Value::UInt(json.as_u64()?),
        TypeTag::Int => Value::Int(json.as_i64()?),
        TypeTag::F64 => Value::F64(json.as_f64()?),
        TypeTag::F32 => Value::F32(json.as_f64()? as f32),
        TypeTag::Bool => Value::Bool(json.as_bool()?),
        TypeTag::Text => Value::Text(json.as_str()?.to_string()),
        TypeTag::Named(_) => return None,
    };
    Some(value)
}

/// JSON form of a decoded value. Byte strings become arrays of numbers, so
/// the output of `decode` can be fed back into `encode`.
pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Bytes(b) => Json::Array(b.iter().map(|&byte| Json::from(byte)).collect()),
        Value::UInt(v) => Json::from(*v),
        Value::Int(v) => Json::from(*v),
        Value::F64(v) => Number::from_f64(*v).map_or(Json::Null, Json::Number),
        // Go through the shortest f32 rendering so 1.234f32 prints as 1.234.
        Value::F32(v) => v
            .to_string()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map_or(Json::Null, Json::Number),
        Value::Bool(v) => Json::Bool(*v),
        Value::Text(s) => Json::String(s.clone()),
        Value::Record(values) => Json::Array(values.iter().map(value_to_json).collect()),
    }
}

/// Single-line human form, used by the table and pretty outputs.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Bytes(b) => format!("0x{}", hex::encode(b)),
        Value::UInt(v) => v.to_string(),
        Value::Int(v) => v.to_string(),
        Value::F64(v) => v.to_string(),
        Value::F32(v) => v.to_string(),
        Value::Bool(v) => v.to_string(),
        Value::Text(s) => s.clone(),
        Value::Record(values) => {
            let parts: Vec<String> = values.iter().map(display_value).collect();
            format!("({})", parts.join(", "))
        }
    }
}
