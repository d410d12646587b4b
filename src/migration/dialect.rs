//! Quoting, type names and literals per target database

use crate::migration::{DbType, SqlValue};

/// Target SQL dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    MySql,
    /// Standard double-quoted SQL, used by the generic builder
    Ansi,
}

impl Dialect {
    pub fn quote_for_table_name(&self, name: &str) -> String {
        self.quote(name)
    }

    pub fn quote_for_column_name(&self, name: &str) -> String {
        self.quote(name)
    }

    fn quote(&self, ident: &str) -> String {
        match self {
            Dialect::MySql => format!("`{}`", ident.replace('`', "``")),
            Dialect::Ansi => format!("\"{}\"", ident.replace('"', "\"\"")),
        }
    }

    pub fn boolean_literal(&self, value: bool) -> &'static str {
        match (self, value) {
            (Dialect::MySql, true) => "1",
            (Dialect::MySql, false) => "0",
            (Dialect::Ansi, true) => "true",
            (Dialect::Ansi, false) => "false",
        }
    }

    /// Render a default value as a SQL literal
    pub fn sql_value(&self, value: &SqlValue) -> String {
        match value {
            SqlValue::Null => "null".to_string(),
            SqlValue::Bool(b) => self.boolean_literal(*b).to_string(),
            SqlValue::Integer(i) => i.to_string(),
            SqlValue::Float(f) => f.to_string(),
            SqlValue::DateTime(dt) => format!("'{}'", dt.format("%Y-%m-%d %H:%M:%S")),
            SqlValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
        }
    }

    /// Column type name; precision wins over length, length over the bare type.
    pub fn type_name(
        &self,
        db_type: DbType,
        length: Option<u32>,
        precision: u8,
        scale: u8,
    ) -> String {
        if precision > 0 {
            if let Some(name) = self.type_with_precision(db_type, precision, scale) {
                return name;
            }
        } else if let Some(length) = length {
            if let Some(name) = self.type_with_length(db_type, length) {
                return name;
            }
        }
        self.default_type(db_type).to_string()
    }

    fn type_with_precision(&self, db_type: DbType, precision: u8, scale: u8) -> Option<String> {
        match db_type {
            DbType::Decimal | DbType::Currency => {
                Some(format!("DECIMAL({}, {})", precision, scale))
            }
            _ => None,
        }
    }

    fn type_with_length(&self, db_type: DbType, length: u32) -> Option<String> {
        match (self, db_type) {
            (Dialect::MySql, DbType::AnsiString | DbType::String) => Some(match length {
                0..=65_535 => format!("VARCHAR({})", length),
                65_536..=16_777_215 => "MEDIUMTEXT".to_string(),
                _ => "LONGTEXT".to_string(),
            }),
            (Dialect::MySql, DbType::Binary) => Some(
                match length {
                    0..=255 => "TINYBLOB",
                    256..=65_535 => "BLOB",
                    65_536..=16_777_215 => "MEDIUMBLOB",
                    _ => "LONGBLOB",
                }
                .to_string(),
            ),
            (Dialect::Ansi, DbType::AnsiString | DbType::String) => Some(match length {
                0..=4_000 => format!("VARCHAR({})", length),
                _ => "TEXT".to_string(),
            }),
            (Dialect::Ansi, DbType::Binary) => Some(format!("VARBINARY({})", length)),
            (_, DbType::AnsiStringFixedLength | DbType::StringFixedLength) if length <= 255 => {
                Some(format!("CHAR({})", length))
            }
            _ => None,
        }
    }

    fn default_type(&self, db_type: DbType) -> &'static str {
        match self {
            Dialect::MySql => match db_type {
                DbType::AnsiString | DbType::String => "VARCHAR(255)",
                DbType::AnsiStringFixedLength | DbType::StringFixedLength => "CHAR(255)",
                DbType::Binary => "LONGBLOB",
                DbType::Boolean => "TINYINT(1)",
                DbType::Byte => "TINYINT UNSIGNED",
                DbType::Int16 => "SMALLINT",
                DbType::Int32 => "INTEGER",
                DbType::Int64 => "BIGINT",
                DbType::Single => "FLOAT",
                DbType::Double => "DOUBLE",
                DbType::Decimal => "DECIMAL(19, 5)",
                DbType::Currency => "DECIMAL(19, 4)",
                DbType::Date => "DATE",
                DbType::DateTime => "DATETIME",
                DbType::Time => "TIME",
                DbType::Guid => "VARCHAR(40)",
            },
            Dialect::Ansi => match db_type {
                DbType::AnsiString | DbType::String => "VARCHAR(255)",
                DbType::AnsiStringFixedLength | DbType::StringFixedLength => "CHAR(255)",
                DbType::Binary => "BLOB",
                DbType::Boolean => "BOOLEAN",
                DbType::Byte | DbType::Int16 => "SMALLINT",
                DbType::Int32 => "INTEGER",
                DbType::Int64 => "BIGINT",
                DbType::Single => "REAL",
                DbType::Double => "DOUBLE PRECISION",
                DbType::Decimal => "DECIMAL(19, 5)",
                DbType::Currency => "DECIMAL(19, 4)",
                DbType::Date => "DATE",
                DbType::DateTime => "TIMESTAMP",
                DbType::Time => "TIME",
                DbType::Guid => "CHAR(36)",
            },
        }
    }
}
