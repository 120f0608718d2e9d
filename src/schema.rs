//! Schema model for diagrammed entities.
//!
//! Column order is declaration order and is preserved through layout and
//! rendering. Primary keys are referenced by column name so composite keys
//! need no special casing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub table_name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub primary_keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub extra: Option<String>,
    #[serde(default)]
    pub foreign_key: Option<ForeignKey>,
}

/// A reference from one column to another entity's column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
}

impl Entity {
    pub fn is_primary_key(&self, column_name: &str) -> bool {
        self.primary_keys.iter().any(|k| k == column_name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

impl Column {
    /// Type label as shown in diagram rows: `varchar(40)`, `bigint`.
    pub fn type_label(&self) -> String {
        match self.length {
            Some(len) => format!("{}({})", self.type_name, len),
            None => self.type_name.clone(),
        }
    }
}
