//! Entity extraction from loosely-typed table metadata.
//!
//! Input is a JSON document describing one table, in the shape admin tooling
//! exports: a table name plus a `columns` array. Key spellings vary between
//! producers, so several are accepted. A document without a usable table name
//! is an error; damaged column entries are skipped so a diagram degrades to
//! an emptier box instead of failing outright.

use log::warn;
use serde_json::Value;

use crate::schema::{Column, Entity, ForeignKey};

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("table metadata is not a JSON object")]
    NotAnObject,
    #[error("table metadata has no table name")]
    MissingTableName,
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a JSON string and extract an [`Entity`] from it.
pub fn extract_str(json: &str) -> Result<Entity, ExtractError> {
    let value: Value = serde_json::from_str(json)?;
    extract(&value)
}

/// Extract an [`Entity`] from a table metadata document.
pub fn extract(metadata: &Value) -> Result<Entity, ExtractError> {
    let object = metadata.as_object().ok_or(ExtractError::NotAnObject)?;

    let table_name = get_str(metadata, &["tableName", "table_name", "name"])
        .ok_or(ExtractError::MissingTableName)?
        .to_string();

    let mut columns = Vec::new();
    match object.get("columns") {
        Some(Value::Array(items)) => {
            for item in items {
                match extract_column(item) {
                    Some(column) => columns.push(column),
                    None => warn!("{}: skipping malformed column entry", table_name),
                }
            }
        }
        Some(_) => warn!("{}: columns is not an array, treating as empty", table_name),
        None => {}
    }

    let mut primary_keys: Vec<String> = Vec::new();
    if let Some(Value::Array(keys)) = object
        .get("primaryKeys")
        .or_else(|| object.get("primary_keys"))
    {
        for key in keys {
            if let Some(name) = key.as_str() {
                primary_keys.push(name.to_string());
            }
        }
    }
    // Column-level flags extend the table-level list
    for item in object
        .get("columns")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        if get_bool(item, &["primaryKey", "primary_key"]) {
            if let Some(name) = get_str(item, &["name"]) {
                if !primary_keys.iter().any(|k| k == name) {
                    primary_keys.push(name.to_string());
                }
            }
        }
    }

    Ok(Entity {
        table_name,
        columns,
        primary_keys,
    })
}

fn extract_column(item: &Value) -> Option<Column> {
    let name = get_str(item, &["name", "columnName", "column_name"])?.to_string();

    let type_name = get_str(item, &["type", "dataType", "data_type"])
        .unwrap_or("unknown")
        .to_string();

    let foreign_key = item
        .get("references")
        .or_else(|| item.get("foreignKey"))
        .or_else(|| item.get("foreign_key"))
        .and_then(extract_foreign_key);

    Some(Column {
        name,
        type_name,
        length: get_length(item),
        nullable: get_nullable(item),
        extra: get_str(item, &["extra"]).map(str::to_string),
        foreign_key,
    })
}

fn extract_foreign_key(value: &Value) -> Option<ForeignKey> {
    let table = get_str(value, &["table", "tableName", "entity"])?;
    let column = get_str(value, &["column", "columnName"])?;
    Some(ForeignKey {
        table: table.to_string(),
        column: column.to_string(),
    })
}

fn get_str<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| value.get(k).and_then(Value::as_str))
}

fn get_bool(value: &Value, keys: &[&str]) -> bool {
    keys.iter()
        .find_map(|k| value.get(k).and_then(Value::as_bool))
        .unwrap_or(false)
}

/// Length arrives as a number from some producers and a numeric string from
/// information_schema-style dumps.
fn get_length(value: &Value) -> Option<u32> {
    let raw = value.get("length").or_else(|| value.get("maxLength"))?;
    match raw {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Nullable is a bool or an information_schema "YES"/"NO" string.
fn get_nullable(value: &Value) -> bool {
    match value.get("nullable").or_else(|| value.get("isNullable")) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("yes"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_full_document() {
        let entity = extract_str(
            r#"{
                "tableName": "order",
                "columns": [
                    {"name": "order_id", "type": "bigint", "length": 20,
                     "nullable": false, "extra": "auto_increment", "primaryKey": true},
                    {"name": "customer_id", "type": "bigint", "length": "20",
                     "nullable": "YES",
                     "references": {"table": "customer", "column": "customer_id"}}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(entity.table_name, "order");
        assert_eq!(entity.columns.len(), 2);
        assert_eq!(entity.primary_keys, vec!["order_id"]);
        assert_eq!(entity.columns[0].length, Some(20));
        assert_eq!(entity.columns[1].length, Some(20));
        assert!(entity.columns[1].nullable);
        let fk = entity.columns[1].foreign_key.as_ref().unwrap();
        assert_eq!(fk.table, "customer");
        assert_eq!(fk.column, "customer_id");
    }

    #[test]
    fn test_missing_columns_yields_empty_entity() {
        let entity = extract_str(r#"{"tableName": "audit_log"}"#).unwrap();
        assert_eq!(entity.table_name, "audit_log");
        assert!(entity.columns.is_empty());
    }

    #[test]
    fn test_malformed_columns_are_skipped() {
        let entity = extract_str(
            r#"{
                "tableName": "user",
                "columns": [
                    {"name": "user_id", "type": "bigint"},
                    {"type": "varchar"},
                    "not an object",
                    {"name": "email"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(entity.columns.len(), 2);
        assert_eq!(entity.columns[0].name, "user_id");
        assert_eq!(entity.columns[1].name, "email");
        assert_eq!(entity.columns[1].type_name, "unknown");
    }

    #[test]
    fn test_columns_not_an_array_degrades_to_empty() {
        let entity = extract_str(r#"{"tableName": "user", "columns": 42}"#).unwrap();
        assert!(entity.columns.is_empty());
    }

    #[test]
    fn test_table_level_primary_keys() {
        let entity = extract_str(
            r#"{
                "table_name": "order_item",
                "primary_keys": ["order_id", "product_id"],
                "columns": [
                    {"name": "order_id", "type": "bigint"},
                    {"name": "product_id", "type": "bigint"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(entity.primary_keys, vec!["order_id", "product_id"]);
    }

    #[test]
    fn test_missing_table_name_is_an_error() {
        let err = extract_str(r#"{"columns": []}"#).unwrap_err();
        assert!(matches!(err, ExtractError::MissingTableName));
    }

    #[test]
    fn test_non_object_is_an_error() {
        let err = extract_str(r#"[1, 2, 3]"#).unwrap_err();
        assert!(matches!(err, ExtractError::NotAnObject));
    }
}
