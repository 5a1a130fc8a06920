//! Accumulates the physical schema while classes are resolved
//!
//! Tables keep first-appearance order. Classes that share a table are merged
//! column by column; a column declared twice must agree on type and size.

use std::collections::HashMap;

use crate::error::{MappingError, MappingResult};
use crate::metadata::{Column, ForeignKey, Index, SchemaModel, Table};

#[derive(Debug, Default)]
pub(crate) struct SchemaBuilder {
    tables: Vec<Table>,
    by_name: HashMap<String, usize>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn table_mut(&mut self, name: &str) -> &mut Table {
        let key = name.to_lowercase();
        let idx = match self.by_name.get(&key) {
            Some(idx) => *idx,
            None => {
                self.tables.push(Table::new(name));
                self.by_name.insert(key, self.tables.len() - 1);
                self.tables.len() - 1
            }
        };
        &mut self.tables[idx]
    }

    /// Register a table, keeping the first description given for it
    pub fn add_table(&mut self, name: &str, description: Option<&str>) {
        let table = self.table_mut(name);
        if table.description.is_none() {
            table.description = description.map(str::to_string);
        }
    }

    /// Add or merge a column. `owner` names the class for error reporting.
    pub fn add_column(&mut self, table_name: &str, column: Column, owner: &str) -> MappingResult<()> {
        let table = self.table_mut(table_name);
        let Some(pos) = table
            .columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(&column.name))
        else {
            table.columns.push(column);
            return Ok(());
        };
        let existing = &mut table.columns[pos];

        if existing.jdbc_type != column.jdbc_type || existing.size != column.size {
            return Err(MappingError::conflict(
                owner,
                format!(
                    "column '{}' of table '{}' is declared as {}{} and as {}{}",
                    column.name,
                    table.name,
                    existing.jdbc_type,
                    size_suffix(&existing.size),
                    column.jdbc_type,
                    size_suffix(&column.size),
                ),
            ));
        }
        existing.primary_key |= column.primary_key;
        existing.required |= column.required;
        existing.auto_increment |= column.auto_increment;
        if existing.default_value.is_none() {
            existing.default_value = column.default_value;
        }
        if existing.description.is_none() {
            existing.description = column.description;
        }
        Ok(())
    }

    /// Add a foreign-key constraint unless an identical one exists
    pub fn add_foreign_key(&mut self, table_name: &str, foreign_key: ForeignKey) {
        let table = self.table_mut(table_name);
        let duplicate = table.foreign_keys.iter().any(|fk| {
            fk.foreign_table.eq_ignore_ascii_case(&foreign_key.foreign_table)
                && fk.references == foreign_key.references
        });
        if !duplicate {
            table.foreign_keys.push(foreign_key);
        }
    }

    /// Add an index; a second index of the same name must be identical
    pub fn add_index(&mut self, table_name: &str, index: Index, owner: &str) -> MappingResult<()> {
        let table = self.table_mut(table_name);
        match table
            .indices
            .iter()
            .find(|i| i.name.eq_ignore_ascii_case(&index.name))
        {
            Some(existing) if *existing == index => Ok(()),
            Some(_) => Err(MappingError::conflict(
                owner,
                format!(
                    "index '{}' of table '{}' is declared with different columns",
                    index.name, table.name
                ),
            )),
            None => {
                table.indices.push(index);
                Ok(())
            }
        }
    }

    pub fn finish(self, database_name: &str) -> SchemaModel {
        SchemaModel {
            database_name: database_name.to_string(),
            tables: self.tables,
        }
    }
}

fn size_suffix(size: &Option<String>) -> String {
    size.as_ref().map(|s| format!("({})", s)).unwrap_or_default()
}
