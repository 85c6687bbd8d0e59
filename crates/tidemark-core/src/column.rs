//! Column definitions and the fluent column builder.
//!
//! Columns carry an abstract [`DbType`] plus optional size/precision/scale;
//! the concrete SQL type is resolved per dialect by the
//! [`TypeMap`](crate::typemap::TypeMap).

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Abstract column data types, independent of any dialect.
///
/// Capacity (size, precision, scale) is tracked on the column, not the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DbType {
    /// Non-unicode variable-length string.
    AnsiString,
    /// Non-unicode fixed-length string.
    AnsiStringFixedLength,
    /// Unicode variable-length string.
    String,
    /// Unicode fixed-length string.
    StringFixedLength,
    /// Binary data.
    Binary,
    /// Boolean.
    Boolean,
    /// Unsigned 8-bit integer.
    Byte,
    /// 16-bit integer.
    Int16,
    /// 32-bit integer.
    Int32,
    /// 64-bit integer.
    Int64,
    /// Single-precision float.
    Single,
    /// Double-precision float.
    Double,
    /// Exact decimal with precision and scale.
    Decimal,
    /// Money amount.
    Currency,
    /// Date only.
    Date,
    /// Time only.
    Time,
    /// Date and time.
    DateTime,
    /// Date and time with time zone offset.
    DateTimeOffset,
    /// Globally unique identifier.
    Guid,
    /// XML document.
    Xml,
}

impl DbType {
    /// Returns the canonical name of the abstract type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AnsiString => "AnsiString",
            Self::AnsiStringFixedLength => "AnsiStringFixedLength",
            Self::String => "String",
            Self::StringFixedLength => "StringFixedLength",
            Self::Binary => "Binary",
            Self::Boolean => "Boolean",
            Self::Byte => "Byte",
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::Single => "Single",
            Self::Double => "Double",
            Self::Decimal => "Decimal",
            Self::Currency => "Currency",
            Self::Date => "Date",
            Self::Time => "Time",
            Self::DateTime => "DateTime",
            Self::DateTimeOffset => "DateTimeOffset",
            Self::Guid => "Guid",
            Self::Xml => "Xml",
        }
    }
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dialect-rendered system methods usable as defaults or inserted values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SystemMethod {
    /// The current local date and time.
    CurrentDateTime,
    /// The current UTC date and time.
    CurrentUtcDateTime,
    /// The current database user.
    CurrentUser,
    /// A freshly generated GUID.
    NewGuid,
}

/// A literal value, used for column defaults and data expressions.
///
/// Rendering into SQL text is dialect-specific and handled by the
/// [`Quoter`](crate::quoter::Quoter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    String(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Date value.
    Date(NaiveDate),
    /// Date and time value.
    DateTime(NaiveDateTime),
    /// GUID rendered as its canonical string form.
    Guid(String),
    /// Raw SQL expression, emitted verbatim.
    Expression(String),
    /// Dialect-rendered system method.
    Method(SystemMethod),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Foreign key referential action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ForeignKeyAction {
    /// No action.
    #[default]
    NoAction,
    /// Restrict deletion/update.
    Restrict,
    /// Cascade the operation.
    Cascade,
    /// Set the referencing column to NULL.
    SetNull,
    /// Set the referencing column to its default.
    SetDefault,
}

impl ForeignKeyAction {
    /// Returns the SQL representation of the action.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

/// An inline foreign key reference on a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyRef {
    /// The referenced table name.
    pub table: String,
    /// The referenced column name.
    pub column: String,
    /// Action on delete.
    pub on_delete: Option<ForeignKeyAction>,
    /// Action on update.
    pub on_update: Option<ForeignKeyAction>,
}

/// A complete column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name.
    pub name: String,
    /// Abstract data type.
    pub db_type: DbType,
    /// Capacity for string/binary types.
    pub size: Option<u32>,
    /// Precision for decimal types.
    pub precision: Option<u8>,
    /// Scale for decimal types.
    pub scale: Option<u8>,
    /// Whether the column is nullable.
    pub nullable: bool,
    /// Default value.
    pub default: Option<Value>,
    /// Whether this column auto-generates its value.
    pub identity: bool,
    /// Whether this is a primary key column.
    pub primary_key: bool,
    /// Whether this column is unique.
    pub unique: bool,
    /// Inline foreign key reference, if any.
    pub references: Option<ForeignKeyRef>,
    /// Check constraint expression, if any.
    pub check: Option<String>,
}

impl ColumnDefinition {
    /// Creates a new column definition with defaults.
    #[must_use]
    pub fn new(name: impl Into<String>, db_type: DbType) -> Self {
        Self {
            name: name.into(),
            db_type,
            size: None,
            precision: None,
            scale: None,
            nullable: true,
            default: None,
            identity: false,
            primary_key: false,
            unique: false,
            references: None,
            check: None,
        }
    }
}

/// Fluent builder for [`ColumnDefinition`].
#[derive(Debug, Clone)]
pub struct ColumnBuilder {
    column: ColumnDefinition,
}

impl ColumnBuilder {
    /// Creates a new column builder with name and type.
    #[must_use]
    pub fn new(name: impl Into<String>, db_type: DbType) -> Self {
        Self {
            column: ColumnDefinition::new(name, db_type),
        }
    }

    /// Sets the capacity for string/binary types.
    #[must_use]
    pub fn size(mut self, size: u32) -> Self {
        self.column.size = Some(size);
        self
    }

    /// Sets precision and scale for decimal types.
    #[must_use]
    pub fn precision(mut self, precision: u8, scale: u8) -> Self {
        self.column.precision = Some(precision);
        self.column.scale = Some(scale);
        self
    }

    /// Marks the column as NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.column.nullable = false;
        self
    }

    /// Marks the column as nullable (default).
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.column.nullable = true;
        self
    }

    /// Marks the column as PRIMARY KEY.
    ///
    /// Primary key columns are implicitly NOT NULL.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.column.primary_key = true;
        self.column.nullable = false;
        self
    }

    /// Marks the column as auto-generating its value.
    #[must_use]
    pub fn identity(mut self) -> Self {
        self.column.identity = true;
        self
    }

    /// Marks the column as UNIQUE.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.column.unique = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.column.default = Some(value.into());
        self
    }

    /// Sets a raw SQL expression as default.
    #[must_use]
    pub fn default_expr(mut self, expr: impl Into<String>) -> Self {
        self.column.default = Some(Value::Expression(expr.into()));
        self
    }

    /// Sets a system method as default (e.g. the dialect's CURRENT_TIMESTAMP).
    #[must_use]
    pub fn default_method(mut self, method: SystemMethod) -> Self {
        self.column.default = Some(Value::Method(method));
        self
    }

    /// Sets a foreign key reference.
    #[must_use]
    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.column.references = Some(ForeignKeyRef {
            table: table.into(),
            column: column.into(),
            on_delete: None,
            on_update: None,
        });
        self
    }

    /// Sets a foreign key reference with an ON DELETE action.
    #[must_use]
    pub fn references_on_delete(
        mut self,
        table: impl Into<String>,
        column: impl Into<String>,
        on_delete: ForeignKeyAction,
    ) -> Self {
        self.column.references = Some(ForeignKeyRef {
            table: table.into(),
            column: column.into(),
            on_delete: Some(on_delete),
            on_update: None,
        });
        self
    }

    /// Adds a CHECK constraint.
    #[must_use]
    pub fn check(mut self, expr: impl Into<String>) -> Self {
        self.column.check = Some(expr.into());
        self
    }

    /// Builds the column definition.
    #[must_use]
    pub fn build(self) -> ColumnDefinition {
        self.column
    }
}

// =============================================================================
// Shorthand constructors for common types
// =============================================================================

/// Creates a non-unicode string column of the given size.
#[must_use]
pub fn ansi_string(name: impl Into<String>, size: u32) -> ColumnBuilder {
    ColumnBuilder::new(name, DbType::AnsiString).size(size)
}

/// Creates a unicode string column of the given size.
#[must_use]
pub fn string(name: impl Into<String>, size: u32) -> ColumnBuilder {
    ColumnBuilder::new(name, DbType::String).size(size)
}

/// Creates an unbounded unicode text column.
#[must_use]
pub fn text(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, DbType::String)
}

/// Creates a fixed-length string column.
#[must_use]
pub fn fixed_string(name: impl Into<String>, size: u32) -> ColumnBuilder {
    ColumnBuilder::new(name, DbType::StringFixedLength).size(size)
}

/// Creates a boolean column.
#[must_use]
pub fn boolean(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, DbType::Boolean)
}

/// Creates a 16-bit integer column.
#[must_use]
pub fn smallint(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, DbType::Int16)
}

/// Creates a 32-bit integer column.
#[must_use]
pub fn integer(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, DbType::Int32)
}

/// Creates a 64-bit integer column.
#[must_use]
pub fn bigint(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, DbType::Int64)
}

/// Creates a single-precision float column.
#[must_use]
pub fn real(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, DbType::Single)
}

/// Creates a double-precision float column.
#[must_use]
pub fn double(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, DbType::Double)
}

/// Creates a decimal column with precision and scale.
#[must_use]
pub fn decimal(name: impl Into<String>, precision: u8, scale: u8) -> ColumnBuilder {
    ColumnBuilder::new(name, DbType::Decimal).precision(precision, scale)
}

/// Creates a money column.
#[must_use]
pub fn currency(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, DbType::Currency)
}

/// Creates a date column.
#[must_use]
pub fn date(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, DbType::Date)
}

/// Creates a time column.
#[must_use]
pub fn time(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, DbType::Time)
}

/// Creates a date/time column.
#[must_use]
pub fn datetime(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, DbType::DateTime)
}

/// Creates a GUID column.
#[must_use]
pub fn guid(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, DbType::Guid)
}

/// Creates a binary column of the given size.
#[must_use]
pub fn binary(name: impl Into<String>, size: u32) -> ColumnBuilder {
    ColumnBuilder::new(name, DbType::Binary).size(size)
}
