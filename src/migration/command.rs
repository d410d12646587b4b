//! Abstract schema change commands handed to the statement builders

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Unquoted identifiers accepted from migration requests
static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*$").expect("identifier pattern is valid"));

/// Column types a migration can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DbType {
    AnsiString,
    AnsiStringFixedLength,
    String,
    StringFixedLength,
    Binary,
    Boolean,
    Byte,
    Int16,
    Int32,
    Int64,
    Single,
    Double,
    Decimal,
    Currency,
    Date,
    DateTime,
    Time,
    Guid,
}

/// Literal used as a column default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    DateTime(NaiveDateTime),
    Text(String),
}

/// Change the definition of an existing column
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AlterColumnCommand {
    #[validate(regex(path = *IDENTIFIER, message = "Invalid table name"))]
    pub table_name: String,

    #[validate(regex(path = *IDENTIFIER, message = "Invalid column name"))]
    pub column_name: String,

    /// New type; `None` leaves the type unchanged
    #[serde(default)]
    pub db_type: Option<DbType>,

    #[serde(default)]
    pub length: Option<u32>,

    #[serde(default)]
    pub precision: u8,

    #[serde(default)]
    pub scale: u8,

    #[serde(default)]
    pub default: Option<SqlValue>,
}

impl AlterColumnCommand {
    /// Length, precision or scale only make sense together with a type
    pub fn has_type_parameters(&self) -> bool {
        self.length.is_some_and(|l| l > 0) || self.precision > 0 || self.scale > 0
    }
}

#[cfg(test)]
impl AlterColumnCommand {
    pub fn new(table_name: impl Into<String>, column_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            column_name: column_name.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, db_type: DbType) -> Self {
        self.db_type = Some(db_type);
        self
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_precision(mut self, precision: u8, scale: u8) -> Self {
        self.precision = precision;
        self.scale = scale;
        self
    }

    pub fn with_default(mut self, default: SqlValue) -> Self {
        self.default = Some(default);
        self
    }
}

/// Create a (possibly composite) index
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddIndexCommand {
    #[validate(regex(path = *IDENTIFIER, message = "Invalid table name"))]
    pub table_name: String,

    #[validate(regex(path = *IDENTIFIER, message = "Invalid index name"))]
    pub index_name: String,

    #[validate(length(min = 1, message = "At least one column is required"))]
    #[validate(custom(function = "validate_column_names"))]
    pub column_names: Vec<String>,
}

#[cfg(test)]
impl AddIndexCommand {
    pub fn new<I, S>(
        table_name: impl Into<String>,
        index_name: impl Into<String>,
        columns: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table_name: table_name.into(),
            index_name: index_name.into(),
            column_names: columns.into_iter().map(Into::into).collect(),
        }
    }
}

/// A single schema change
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MigrationCommand {
    AlterColumn(AlterColumnCommand),
    AddIndex(AddIndexCommand),
}

impl MigrationCommand {
    pub fn validate(&self) -> Result<(), validator::ValidationErrors> {
        match self {
            MigrationCommand::AlterColumn(c) => c.validate(),
            MigrationCommand::AddIndex(c) => c.validate(),
        }
    }
}

fn validate_column_names(columns: &[String]) -> Result<(), ValidationError> {
    if columns.iter().all(|c| IDENTIFIER.is_match(c)) {
        return Ok(());
    }
    let mut err = ValidationError::new("invalid_identifier");
    err.message = Some("Index columns must be plain identifiers".into());
    Err(err)
}
