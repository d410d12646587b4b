//! Generic statement builder for data providers without a dedicated one

use crate::migration::{AddIndexCommand, AlterColumnCommand, Dialect, MigrationError, TablePrefix};

pub struct DefaultCommandInterpreter {
    dialect: Dialect,
    prefix: TablePrefix,
}

impl DefaultCommandInterpreter {
    pub fn new(dialect: Dialect, prefix: TablePrefix) -> Self {
        Self { dialect, prefix }
    }

    pub fn alter_column_statements(
        &self,
        command: &AlterColumnCommand,
    ) -> Result<Vec<String>, MigrationError> {
        let head = format!(
            "alter table {} alter column {} ",
            self.dialect
                .quote_for_table_name(&self.prefix.apply(&command.table_name)),
            self.dialect.quote_for_column_name(&command.column_name)
        );
        let mut statement = head.clone();

        match command.db_type {
            Some(db_type) => statement.push_str(&self.dialect.type_name(
                db_type,
                command.length,
                command.precision,
                command.scale,
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
            statement.push_str(" set default ");
            statement.push_str(&self.dialect.sql_value(default));
            statement.push(' ');
        }

        if statement.len() == head.len() {
            return Ok(Vec::new());
        }
        Ok(vec![statement])
    }

    pub fn add_index_statements(
        &self,
        command: &AddIndexCommand,
    ) -> Result<Vec<String>, MigrationError> {
        if command.column_names.is_empty() {
            return Err(MigrationError::EmptyIndex {
                index: command.index_name.clone(),
            });
        }

        Ok(vec![format!(
            "create index {} on {} ({}) ",
            self.dialect
                .quote_for_column_name(&self.prefix.apply(&command.index_name)),
            self.dialect
                .quote_for_table_name(&self.prefix.apply(&command.table_name)),
            command.column_names.join(", ")
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::{DbType, SqlValue};
    use pretty_assertions::assert_eq;

    fn interpreter() -> DefaultCommandInterpreter {
        DefaultCommandInterpreter::new(Dialect::Ansi, TablePrefix::new("site"))
    }

    #[test]
    fn test_alter_column_is_a_single_statement() {
        let command = AlterColumnCommand::new("Users", "Score")
            .with_type(DbType::Decimal)
            .with_precision(10, 2)
            .with_default(SqlValue::Integer(0));

        let statements = interpreter().alter_column_statements(&command).unwrap();

        assert_eq!(
            statements,
            vec![
                "alter table \"site_Users\" alter column \"Score\" DECIMAL(10, 2) set default 0 "
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_alter_without_changes_emits_nothing() {
        let command = AlterColumnCommand::new("Users", "Score");
        assert!(interpreter().alter_column_statements(&command).unwrap().is_empty());
    }

    #[test]
    fn test_alter_precision_without_type_fails() {
        let command = AlterColumnCommand::new("Users", "Score").with_precision(10, 2);
        assert!(interpreter().alter_column_statements(&command).is_err());
    }

    #[test]
    fn test_add_index_keeps_columns_unchanged() {
        let command = AddIndexCommand::new("Posts", "IDX_Body", ["Title", "Body"]);

        let statements = interpreter().add_index_statements(&command).unwrap();

        assert_eq!(
            statements,
            vec!["create index \"site_IDX_Body\" on \"site_Posts\" (Title, Body) ".to_string()]
        );
    }
}
