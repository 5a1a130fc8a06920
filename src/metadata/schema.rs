//! Schema view of the resolved metadata graph

use crate::model::jdbc::JdbcType;

/// All physical tables, in first-appearance order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchemaModel {
    pub database_name: String,
    pub tables: Vec<Table>,
}

impl SchemaModel {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indices: Vec<Index>,
    pub description: Option<String>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub jdbc_type: JdbcType,
    /// `"254"` for character types, `"20,0"` for decimal types
    pub size: Option<String>,
    pub primary_key: bool,
    pub required: bool,
    pub auto_increment: bool,
    pub default_value: Option<String>,
    pub description: Option<String>,
}

/// Foreign-key constraint from the owning table to `foreign_table`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub foreign_table: String,
    /// (local column, foreign column) pairs in primary-key order
    pub references: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub name: String,
    pub unique: bool,
    pub columns: Vec<String>,
}
