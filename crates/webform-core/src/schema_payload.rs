//! Parsing of raw dataset schema payloads
//!
//! The schema service answers with loosely shaped JSON whose keys vary between
//! deployments. These helpers turn such a payload into catalog types. Fetching
//! the payload is the caller's job.

use serde_json::Value;

use crate::{Dataset, Field, Result, Table, WebformError};

/// Map a schema service type name to a form input type
pub fn map_api_field_type(api_type: &str) -> &'static str {
    match api_type.to_lowercase().as_str() {
        "text" | "string" => "text",
        "email" => "email",
        "number" | "integer" | "decimal" => "number",
        "date" | "datetime" => "date",
        "boolean" => "checkbox",
        "textarea" | "longtext" => "textarea",
        "select" | "dropdown" => "select",
        "phone" | "telephone" => "tel",
        _ => "text",
    }
}

/// Parse the tables of a dataset schema payload.
///
/// Accepts either an object holding a `tableSchemas` array or a bare array of
/// table schemas. Any other shape yields no tables.
pub fn parse_table_schemas(payload: &Value) -> Vec<Table> {
    let entries = match payload {
        Value::Object(map) => match map.get("tableSchemas") {
            Some(Value::Array(entries)) => entries,
            _ => {
                tracing::warn!("schema payload has no tableSchemas array");
                return Vec::new();
            }
        },
        Value::Array(entries) => entries,
        _ => {
            tracing::warn!("schema payload is neither an object nor an array");
            return Vec::new();
        }
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| parse_table(entry, index))
        .collect()
}

/// Build a dataset from its id, name and raw schema payload
pub fn parse_dataset(id: impl Into<String>, name: impl Into<String>, payload: &Value) -> Dataset {
    Dataset {
        id: id.into(),
        name: name.into(),
        tables: parse_table_schemas(payload),
    }
}

/// Strict variant of [`parse_dataset`] for raw response text.
///
/// Fails on unparsable JSON and on payloads without table schemas.
pub fn parse_dataset_str(id: impl Into<String>, name: impl Into<String>, json: &str) -> Result<Dataset> {
    let payload: Value = serde_json::from_str(json)?;
    let has_tables = payload.is_array() || payload.get("tableSchemas").is_some_and(Value::is_array);
    if !has_tables {
        return Err(WebformError::InvalidSchema(
            "expected a tableSchemas array".to_string(),
        ));
    }
    Ok(parse_dataset(id, name, &payload))
}

fn parse_table(entry: &Value, index: usize) -> Table {
    let id = first_id(entry, &["idTableSchema", "tableSchemaId", "id"])
        .unwrap_or_else(|| format!("table_{index}"));
    let name = first_str(entry, &["nameTableSchema", "name"]).unwrap_or("Unnamed Table");

    let fields = entry
        .pointer("/recordSchema/fieldSchema")
        .and_then(Value::as_array)
        .map(|fields| fields.iter().map(parse_field).collect())
        .unwrap_or_default();

    Table {
        id,
        name: name.to_string(),
        fields,
    }
}

fn parse_field(entry: &Value) -> Field {
    let id = first_id(entry, &["id", "fieldSchemaId"]).unwrap_or_default();
    let name = first_str(entry, &["name", "headerName"]).unwrap_or("Unnamed Field");
    let api_type = first_str(entry, &["type", "typeData"]).unwrap_or("");
    let required = ["required", "requiredField"]
        .iter()
        .any(|key| entry.get(key).and_then(Value::as_bool).unwrap_or(false));
    let description = first_str(entry, &["description"]).unwrap_or("");

    let mut field = Field::new(id, name, map_api_field_type(api_type));
    field.required = required;
    field.description = Some(description.to_string());
    field
}

/// First key holding a non-empty string or a number, rendered as a string
fn first_id(entry: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match entry.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// First key holding a non-empty string
fn first_str<'a>(entry: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| entry.get(key).and_then(Value::as_str).filter(|s| !s.is_empty()))
}
