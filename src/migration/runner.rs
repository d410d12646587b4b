//! Builds and executes the statements of a migration run

use crate::migration::{MigrationCommand, MigrationError, StatementBuilder};
use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::{MySql, MySqlPool};
use tracing::{info, warn};

/// Where migration statements are executed
#[async_trait]
pub trait MigrationTarget: Send {
    async fn execute(&mut self, statement: &str) -> Result<(), MigrationError>;
}

#[async_trait]
impl MigrationTarget for PoolConnection<MySql> {
    async fn execute(&mut self, statement: &str) -> Result<(), MigrationError> {
        sqlx::query(statement).execute(&mut **self).await?;
        Ok(())
    }
}

pub struct MigrationRunner {
    builder: StatementBuilder,
    pool: Option<MySqlPool>,
}

impl MigrationRunner {
    pub fn new(builder: StatementBuilder, pool: Option<MySqlPool>) -> Self {
        Self { builder, pool }
    }

    pub fn data_provider(&self) -> &'static str {
        self.builder.data_provider()
    }

    /// Statements for every command, in order, built against the current
    /// schema. An index added after an alter of the same columns is sized
    /// from the columns as they are now. Any failing command aborts the
    /// whole run before anything is returned.
    pub async fn statements(
        &self,
        commands: &[MigrationCommand],
    ) -> Result<Vec<String>, MigrationError> {
        let mut statements = Vec::new();
        for command in commands {
            statements.extend(self.builder.create_statements(command).await?);
        }
        Ok(statements)
    }

    /// Execute the commands in order on one connection.
    pub async fn apply(
        &self,
        commands: &[MigrationCommand],
    ) -> Result<Vec<String>, MigrationError> {
        let pool = self.pool.as_ref().ok_or(MigrationError::NotConnected)?;
        let mut conn = pool.acquire().await?;
        self.apply_to(&mut conn, commands).await
    }

    /// Each command is built only once the previous ones have been executed,
    /// so catalog lookups see the schema the statement will run against.
    pub(crate) async fn apply_to(
        &self,
        target: &mut dyn MigrationTarget,
        commands: &[MigrationCommand],
    ) -> Result<Vec<String>, MigrationError> {
        let mut executed = Vec::new();

        for command in commands {
            let statements = match self.builder.create_statements(command).await {
                Ok(statements) => statements,
                Err(e) => return Err(stopped(executed, e)),
            };

            for statement in statements {
                info!(statement = %statement, "Executing migration statement");
                if let Err(e) = target.execute(&statement).await {
                    return Err(stopped(executed, e));
                }
                executed.push(statement);
            }
        }

        info!(count = executed.len(), "Migration applied");
        Ok(executed)
    }
}

fn stopped(executed: Vec<String>, source: MigrationError) -> MigrationError {
    if executed.is_empty() {
        return source;
    }
    warn!(?executed, error = %source, "Migration stopped after executing statements");
    MigrationError::Partial {
        executed,
        source: Box::new(source),
    }
}
