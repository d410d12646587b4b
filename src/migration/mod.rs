//! Data migration statement builders
//!
//! Turns abstract schema change commands into literal DDL for the
//! configured data provider.

mod catalog;
mod command;
mod default;
mod dialect;
mod mysql;
mod runner;

pub use catalog::{MySqlCatalog, SchemaCatalog};
pub use command::{AddIndexCommand, AlterColumnCommand, DbType, MigrationCommand, SqlValue};
pub use default::DefaultCommandInterpreter;
pub use dialect::Dialect;
pub use mysql::MySqlCommandInterpreter;
pub use runner::MigrationRunner;

use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error(
        "You need to specify the field's type in order to change its properties ({table}.{column})"
    )]
    MissingColumnType { table: String, column: String },

    #[error("Index {index} has no columns")]
    EmptyIndex { index: String },

    #[error(
        "Cannot create index {index} on {table}: declared column lengths ({declared}) \
         exceed the maximum key length ({maximum})"
    )]
    IndexKeyTooLong {
        table: String,
        index: String,
        declared: i64,
        maximum: i64,
    },

    #[error(
        "Schema catalog returned column {column} which is not part of the index on {table}"
    )]
    UnknownCatalogColumn { table: String, column: String },

    #[error("No migration database is configured")]
    NotConnected,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Statements already executed stay applied; DDL is not transactional
    #[error(
        "Migration stopped after {count} executed statement(s): {source}",
        count = .executed.len()
    )]
    Partial {
        executed: Vec<String>,
        source: Box<MigrationError>,
    },
}

/// Tenant prefix prepended to table and index names as `<prefix>_<name>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TablePrefix(Option<String>);

impl TablePrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if prefix.is_empty() {
            Self(None)
        } else {
            Self(Some(prefix))
        }
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub fn apply(&self, name: &str) -> String {
        match &self.0 {
            Some(prefix) => format!("{}_{}", prefix, name),
            None => name.to_string(),
        }
    }
}

impl From<Option<String>> for TablePrefix {
    fn from(prefix: Option<String>) -> Self {
        prefix.map(TablePrefix::new).unwrap_or_else(TablePrefix::none)
    }
}

/// The statement builder selected for the configured data provider
pub enum StatementBuilder {
    MySql(MySqlCommandInterpreter),
    Default(DefaultCommandInterpreter),
}

impl StatementBuilder {
    /// Pick the builder for a data provider name. MySQL needs a schema
    /// catalog; without one no builder is available.
    pub fn for_provider(
        data_provider: &str,
        prefix: TablePrefix,
        catalog: Option<Arc<dyn SchemaCatalog>>,
    ) -> Option<Self> {
        if data_provider.eq_ignore_ascii_case("mysql") {
            catalog.map(|catalog| {
                StatementBuilder::MySql(MySqlCommandInterpreter::new(prefix, catalog))
            })
        } else {
            Some(StatementBuilder::Default(DefaultCommandInterpreter::new(
                Dialect::Ansi,
                prefix,
            )))
        }
    }

    pub fn data_provider(&self) -> &'static str {
        match self {
            StatementBuilder::MySql(_) => "MySql",
            StatementBuilder::Default(_) => "Default",
        }
    }

    pub async fn create_statements(
        &self,
        command: &MigrationCommand,
    ) -> Result<Vec<String>, MigrationError> {
        match (self, command) {
            (StatementBuilder::MySql(i), MigrationCommand::AlterColumn(c)) => {
                i.alter_column_statements(c)
            }
            (StatementBuilder::MySql(i), MigrationCommand::AddIndex(c)) => {
                i.add_index_statements(c).await
            }
            (StatementBuilder::Default(i), MigrationCommand::AlterColumn(c)) => {
                i.alter_column_statements(c)
            }
            (StatementBuilder::Default(i), MigrationCommand::AddIndex(c)) => {
                i.add_index_statements(c)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::catalog::memory::MemoryCatalog;

    #[test]
    fn test_table_prefix() {
        assert_eq!(TablePrefix::new("t1").apply("Users"), "t1_Users");
        assert_eq!(TablePrefix::new("").apply("Users"), "Users");
        assert_eq!(TablePrefix::from(None).apply("Users"), "Users");
    }

    #[test]
    fn test_builder_selection() {
        let catalog: Arc<dyn SchemaCatalog> = Arc::new(MemoryCatalog::default());

        let mysql =
            StatementBuilder::for_provider("MySql", TablePrefix::none(), Some(catalog.clone()));
        assert_eq!(mysql.map(|b| b.data_provider()), Some("MySql"));

        let generic = StatementBuilder::for_provider("SqlServer", TablePrefix::none(), None);
        assert_eq!(generic.map(|b| b.data_provider()), Some("Default"));

        assert!(StatementBuilder::for_provider("mysql", TablePrefix::none(), None).is_none());
    }

    #[tokio::test]
    async fn test_dispatch_uses_dialect_of_selected_builder() {
        let catalog: Arc<dyn SchemaCatalog> = Arc::new(MemoryCatalog::default());
        let command = MigrationCommand::AlterColumn(
            AlterColumnCommand::new("Users", "Email").with_type(DbType::String),
        );

        let mysql =
            StatementBuilder::for_provider("MySql", TablePrefix::none(), Some(catalog)).unwrap();
        let generic = StatementBuilder::for_provider("Sqlite", TablePrefix::none(), None).unwrap();

        assert_eq!(
            mysql.create_statements(&command).await.unwrap(),
            vec!["alter table `Users` modify column `Email` VARCHAR(255)".to_string()]
        );
        assert_eq!(
            generic.create_statements(&command).await.unwrap(),
            vec!["alter table \"Users\" alter column \"Email\" VARCHAR(255)".to_string()]
        );
    }
}
