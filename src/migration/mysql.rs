//! MySQL statement builder
//!
//! Composite indexes in InnoDB are limited to a 767 byte key. Columns that
//! would push the key over that limit are indexed on a prefix instead.

use crate::migration::{
    AddIndexCommand, AlterColumnCommand, Dialect, MigrationError, SchemaCatalog, TablePrefix,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Maximum index key length, in bytes
pub const INDEX_KEY_MAX_LENGTH: i64 = 767;

pub struct MySqlCommandInterpreter {
    dialect: Dialect,
    prefix: TablePrefix,
    catalog: Arc<dyn SchemaCatalog>,
}

impl MySqlCommandInterpreter {
    pub fn new(prefix: TablePrefix, catalog: Arc<dyn SchemaCatalog>) -> Self {
        Self {
            dialect: Dialect::MySql,
            prefix,
            catalog,
        }
    }

    /// `modify column` for a type change, `alter column ... set default` for a new default.
    pub fn alter_column_statements(
        &self,
        command: &AlterColumnCommand,
    ) -> Result<Vec<String>, MigrationError> {
        let table = self
            .dialect
            .quote_for_table_name(&self.prefix.apply(&command.table_name));
        let column = self.dialect.quote_for_column_name(&command.column_name);
        let mut statements = Vec::new();

        match command.db_type {
            Some(db_type) => statements.push(format!(
                "alter table {} modify column {} {}",
                table,
                column,
                self.dialect
                    .type_name(db_type, command.length, command.precision, command.scale)
            )),
            None if command.has_type_parameters() => {
                return Err(MigrationError::MissingColumnType {
                    table: command.table_name.clone(),
                    column: command.column_name.clone(),
                });
            }
            None => {}
        }

        if let Some(default) = &command.default {
            statements.push(format!(
                "alter table {} alter column {}  set default {} ",
                table,
                column,
                self.dialect.sql_value(default)
            ));
        }

        Ok(statements)
    }

    /// A single `create index`, with long columns reduced to a key prefix.
    pub async fn add_index_statements(
        &self,
        command: &AddIndexCommand,
    ) -> Result<Vec<String>, MigrationError> {
        if command.column_names.is_empty() {
            return Err(MigrationError::EmptyIndex {
                index: command.index_name.clone(),
            });
        }

        let table_name = self.prefix.apply(&command.table_name);
        let columns = &command.column_names;
        let mut budget = INDEX_KEY_MAX_LENGTH;

        let long_columns = {
            let mut session = self.catalog.session().await?;

            if columns.len() > 1 {
                if let Some(declared) = session.sum_varchar_lengths(&table_name, columns).await? {
                    budget -= declared;
                    if budget < 0 {
                        warn!(
                            table = %table_name,
                            index = %command.index_name,
                            declared,
                            "Index columns exceed the maximum key length"
                        );
                        return Err(MigrationError::IndexKeyTooLong {
                            table: table_name,
                            index: command.index_name.clone(),
                            declared,
                            maximum: INDEX_KEY_MAX_LENGTH,
                        });
                    }
                }
            }

            session.long_columns(&table_name, columns, budget).await?
        };

        let column_list = prefix_long_columns(&table_name, columns, &long_columns, budget)?;
        debug!(table = %table_name, budget, ?long_columns, "Planned index key");

        Ok(vec![format!(
            "create index {} on {} ({}) ",
            self.dialect
                .quote_for_table_name(&self.prefix.apply(&command.index_name)),
            self.dialect.quote_for_table_name(&table_name),
            column_list.join(", ")
        )])
    }
}

/// Rewrite long columns as `name(prefix)`, sharing the budget evenly.
/// Input order and spelling are kept.
fn prefix_long_columns(
    table: &str,
    columns: &[String],
    long_columns: &[String],
    budget: i64,
) -> Result<Vec<String>, MigrationError> {
    if let Some(unknown) = long_columns
        .iter()
        .find(|long| !columns.iter().any(|c| c.eq_ignore_ascii_case(long)))
    {
        return Err(MigrationError::UnknownCatalogColumn {
            table: table.to_string(),
            column: unknown.clone(),
        });
    }

    if long_columns.is_empty() {
        return Ok(columns.to_vec());
    }

    let key_part_length = budget / long_columns.len() as i64;

    Ok(columns
        .iter()
        .map(|column| {
            if long_columns.iter().any(|long| long.eq_ignore_ascii_case(column)) {
                format!("{}({})", column, key_part_length)
            } else {
                column.clone()
            }
        })
        .collect())
}
