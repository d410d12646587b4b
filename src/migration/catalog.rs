//! Schema catalog lookups used to size composite index keys
//!
//! A catalog hands out a session bound to one connection; the connection
//! goes back to the pool when the session is dropped.

use crate::migration::MigrationError;
use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::{MySql, MySqlPool};
use tracing::debug;

#[async_trait]
pub trait SchemaCatalog: Send + Sync {
    async fn session(&self) -> Result<Box<dyn CatalogSession>, MigrationError>;
}

/// Lookups against the columns of one table in the current schema
#[async_trait]
pub trait CatalogSession: Send {
    /// Sum of declared maximum lengths of the `varchar` columns among
    /// `columns`; `None` when none of them is a `varchar`.
    async fn sum_varchar_lengths(
        &mut self,
        table: &str,
        columns: &[String],
    ) -> Result<Option<i64>, MigrationError>;

    /// Columns among `columns` typed `text`, or `varchar` longer than `max_length`.
    async fn long_columns(
        &mut self,
        table: &str,
        columns: &[String],
        max_length: i64,
    ) -> Result<Vec<String>, MigrationError>;
}

const SUM_VARCHAR_LENGTHS: &str = r#"
    SELECT CAST(SUM(CHARACTER_MAXIMUM_LENGTH) AS SIGNED)
    FROM INFORMATION_SCHEMA.COLUMNS
    WHERE TABLE_NAME = ?
        AND COLUMN_NAME IN ({columns})
        AND TABLE_SCHEMA = DATABASE()
        AND DATA_TYPE = 'varchar'
"#;

const LONG_COLUMNS: &str = r#"
    SELECT COLUMN_NAME
    FROM INFORMATION_SCHEMA.COLUMNS
    WHERE TABLE_NAME = ?
        AND COLUMN_NAME IN ({columns})
        AND TABLE_SCHEMA = DATABASE()
        AND ((DATA_TYPE = 'varchar' AND CHARACTER_MAXIMUM_LENGTH > ?) OR DATA_TYPE = 'text')
"#;

fn with_column_placeholders(template: &str, count: usize) -> String {
    template.replace("{columns}", &vec!["?"; count].join(", "))
}

/// Catalog backed by MySQL's `INFORMATION_SCHEMA`
#[derive(Clone)]
pub struct MySqlCatalog {
    pool: MySqlPool,
}

impl MySqlCatalog {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SchemaCatalog for MySqlCatalog {
    async fn session(&self) -> Result<Box<dyn CatalogSession>, MigrationError> {
        let conn = self.pool.acquire().await?;
        Ok(Box::new(MySqlCatalogSession { conn }))
    }
}

struct MySqlCatalogSession {
    conn: PoolConnection<MySql>,
}

#[async_trait]
impl CatalogSession for MySqlCatalogSession {
    async fn sum_varchar_lengths(
        &mut self,
        table: &str,
        columns: &[String],
    ) -> Result<Option<i64>, MigrationError> {
        let sql = with_column_placeholders(SUM_VARCHAR_LENGTHS, columns.len());
        let mut query = sqlx::query_scalar::<MySql, Option<i64>>(&sql).bind(table);
        for column in columns {
            query = query.bind(column.as_str());
        }

        let sum = query.fetch_one(&mut *self.conn).await?;
        debug!(table, ?columns, ?sum, "Declared varchar length of index columns");
        Ok(sum)
    }

    async fn long_columns(
        &mut self,
        table: &str,
        columns: &[String],
        max_length: i64,
    ) -> Result<Vec<String>, MigrationError> {
        let sql = with_column_placeholders(LONG_COLUMNS, columns.len());
        let mut query = sqlx::query_scalar::<MySql, String>(&sql).bind(table);
        for column in columns {
            query = query.bind(column.as_str());
        }

        let long = query.bind(max_length).fetch_all(&mut *self.conn).await?;
        debug!(table, max_length, ?long, "Index columns needing a key prefix");
        Ok(long)
    }
}
