//! Column model.
//!
//! A [`Column`] is a type tag plus a bag of optional attributes. Every
//! attribute is an `Option` so the grammar can tell "never set" apart from an
//! explicit `false` or `0`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Dialect-neutral column type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "String")]
pub enum TypeTag {
    /// Fixed-length character string.
    Char,
    /// Variable-length character string.
    String,
    /// Text.
    Text,
    /// Medium text.
    MediumText,
    /// Long text.
    LongText,
    /// 64-bit integer.
    BigInteger,
    /// 32-bit integer.
    Integer,
    /// 24-bit integer.
    MediumInteger,
    /// 16-bit integer.
    SmallInteger,
    /// 8-bit integer.
    TinyInteger,
    /// Single precision float.
    Float,
    /// Double precision float.
    Double,
    /// Exact decimal with total digits and places.
    Decimal,
    /// Boolean.
    Boolean,
    /// Enumeration of allowed string values.
    Enum,
    /// JSON document.
    Json,
    /// Binary JSON document.
    Jsonb,
    /// Date only.
    Date,
    /// Date and time.
    DateTime,
    /// Date and time with time zone.
    DateTimeTz,
    /// Time only.
    Time,
    /// Time with time zone.
    TimeTz,
    /// Timestamp.
    Timestamp,
    /// Timestamp with time zone.
    TimestampTz,
    /// Binary large object.
    Binary,
    /// UUID.
    Uuid,
    /// IPv4 or IPv6 address.
    IpAddress,
    /// MAC address.
    MacAddress,
}

impl TypeTag {
    /// Every tag, in declaration order.
    pub const ALL: [Self; 28] = [
        Self::Char,
        Self::String,
        Self::Text,
        Self::MediumText,
        Self::LongText,
        Self::BigInteger,
        Self::Integer,
        Self::MediumInteger,
        Self::SmallInteger,
        Self::TinyInteger,
        Self::Float,
        Self::Double,
        Self::Decimal,
        Self::Boolean,
        Self::Enum,
        Self::Json,
        Self::Jsonb,
        Self::Date,
        Self::DateTime,
        Self::DateTimeTz,
        Self::Time,
        Self::TimeTz,
        Self::Timestamp,
        Self::TimestampTz,
        Self::Binary,
        Self::Uuid,
        Self::IpAddress,
        Self::MacAddress,
    ];

    /// Returns the tag name as used in serialized blueprints.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Char => "char",
            Self::String => "string",
            Self::Text => "text",
            Self::MediumText => "mediumText",
            Self::LongText => "longText",
            Self::BigInteger => "bigInteger",
            Self::Integer => "integer",
            Self::MediumInteger => "mediumInteger",
            Self::SmallInteger => "smallInteger",
            Self::TinyInteger => "tinyInteger",
            Self::Float => "float",
            Self::Double => "double",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Enum => "enum",
            Self::Json => "json",
            Self::Jsonb => "jsonb",
            Self::Date => "date",
            Self::DateTime => "dateTime",
            Self::DateTimeTz => "dateTimeTz",
            Self::Time => "time",
            Self::TimeTz => "timeTz",
            Self::Timestamp => "timestamp",
            Self::TimestampTz => "timestampTz",
            Self::Binary => "binary",
            Self::Uuid => "uuid",
            Self::IpAddress => "ipAddress",
            Self::MacAddress => "macAddress",
        }
    }

    /// Returns whether the tag belongs to the integer family, the only
    /// types that can auto-increment.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::BigInteger
                | Self::Integer
                | Self::MediumInteger
                | Self::SmallInteger
                | Self::TinyInteger
        )
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| SchemaError::UnknownType(s.to_string()))
    }
}

impl TryFrom<String> for TypeTag {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Default value for a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    /// Boolean default, stored as `'1'` or `'0'`.
    Bool(bool),
    /// Integer default.
    Integer(i64),
    /// Float default.
    Float(f64),
    /// String default.
    String(String),
    /// Raw SQL expression (e.g., `CURRENT_TIMESTAMP`), emitted unquoted.
    Expression(String),
}

/// Index requested directly on a column definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnIndex {
    /// Let the blueprint derive the index name.
    Default,
    /// Use the given index name.
    Named(String),
}

/// A column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Type tag.
    #[serde(rename = "type")]
    pub type_tag: TypeTag,
    /// Length for character types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    /// Total digits for numeric types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
    /// Digits after the decimal point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub places: Option<u32>,
    /// Allowed values of an enum column, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<String>,
    /// Unsigned flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unsigned: Option<bool>,
    /// Nullable flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    /// Default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
    /// Auto-increment flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_increment: Option<bool>,
    /// Expression of a generated virtual column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_as: Option<String>,
    /// Expression of a generated stored column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_as: Option<String>,
    /// Column character set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    /// Column collation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,
    /// Column comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Place the column first in the table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<bool>,
    /// Place the column after another column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    /// Default timestamps to the current time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_current: Option<bool>,
    /// Primary key requested on the column itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<ColumnIndex>,
    /// Unique index requested on the column itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<ColumnIndex>,
    /// Plain index requested on the column itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<ColumnIndex>,
}

impl Column {
    /// Creates a column with every attribute absent.
    #[must_use]
    pub fn new(name: impl Into<String>, type_tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            type_tag,
            length: None,
            total: None,
            places: None,
            allowed: Vec::new(),
            unsigned: None,
            nullable: None,
            default: None,
            auto_increment: None,
            virtual_as: None,
            stored_as: None,
            charset: None,
            collation: None,
            comment: None,
            first: None,
            after: None,
            use_current: None,
            primary: None,
            unique: None,
            index: None,
        }
    }

    /// Returns whether the column is an auto-incrementing integer.
    ///
    /// The flag on any other type is ignored.
    #[must_use]
    pub fn is_auto_increment(&self) -> bool {
        self.type_tag.is_integer() && self.auto_increment == Some(true)
    }
}

/// Mutable handle to a column that was just added to a blueprint.
///
/// # Example
///
/// ```rust
/// use milky_schema::Blueprint;
///
/// let mut table = Blueprint::new("users");
/// table.integer("votes").unsigned().nullable().default_int(0);
///
/// let votes = &table.columns[0];
/// assert_eq!(votes.unsigned, Some(true));
/// assert_eq!(votes.nullable, Some(true));
/// ```
#[derive(Debug)]
pub struct ColumnHandle<'a> {
    column: &'a mut Column,
}

// Handles are routinely dropped after the last setter.
#[allow(clippy::return_self_not_must_use)]
impl<'a> ColumnHandle<'a> {
    pub(crate) fn new(column: &'a mut Column) -> Self {
        Self { column }
    }

    /// Returns the column as configured so far.
    #[must_use]
    pub fn column(&self) -> &Column {
        self.column
    }

    /// Sets the length of a character column.
    pub fn length(self, length: u32) -> Self {
        self.column.length = Some(length);
        self
    }

    /// Sets the total digits and places of a numeric column.
    pub fn precision(self, total: u32, places: u32) -> Self {
        self.column.total = Some(total);
        self.column.places = Some(places);
        self
    }

    /// Sets the allowed values of an enum column.
    pub fn allowed<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.column.allowed = values.into_iter().map(Into::into).collect();
        self
    }

    /// Marks the column as UNSIGNED.
    pub fn unsigned(self) -> Self {
        self.column.unsigned = Some(true);
        self
    }

    /// Allows NULL values.
    pub fn nullable(self) -> Self {
        self.column.nullable = Some(true);
        self
    }

    /// Marks the column as NOT NULL explicitly.
    pub fn not_null(self) -> Self {
        self.column.nullable = Some(false);
        self
    }

    /// Marks the column as auto-incrementing.
    pub fn auto_increment(self) -> Self {
        self.column.auto_increment = Some(true);
        self
    }

    /// Sets a boolean default value.
    pub fn default_bool(self, value: bool) -> Self {
        self.column.default = Some(DefaultValue::Bool(value));
        self
    }

    /// Sets an integer default value.
    pub fn default_int(self, value: i64) -> Self {
        self.column.default = Some(DefaultValue::Integer(value));
        self
    }

    /// Sets a float default value.
    pub fn default_float(self, value: f64) -> Self {
        self.column.default = Some(DefaultValue::Float(value));
        self
    }

    /// Sets a string default value.
    pub fn default_str(self, value: impl Into<String>) -> Self {
        self.column.default = Some(DefaultValue::String(value.into()));
        self
    }

    /// Sets a raw SQL expression as default (e.g., `CURRENT_TIMESTAMP`).
    pub fn default_expr(self, expr: impl Into<String>) -> Self {
        self.column.default = Some(DefaultValue::Expression(expr.into()));
        self
    }

    /// Turns the column into a generated virtual column.
    pub fn virtual_as(self, expr: impl Into<String>) -> Self {
        self.column.virtual_as = Some(expr.into());
        self
    }

    /// Turns the column into a generated stored column.
    pub fn stored_as(self, expr: impl Into<String>) -> Self {
        self.column.stored_as = Some(expr.into());
        self
    }

    /// Sets the column character set.
    pub fn charset(self, charset: impl Into<String>) -> Self {
        self.column.charset = Some(charset.into());
        self
    }

    /// Sets the column collation.
    pub fn collation(self, collation: impl Into<String>) -> Self {
        self.column.collation = Some(collation.into());
        self
    }

    /// Sets the column comment.
    pub fn comment(self, comment: impl Into<String>) -> Self {
        self.column.comment = Some(comment.into());
        self
    }

    /// Places the column first in the table.
    pub fn first(self) -> Self {
        self.column.first = Some(true);
        self
    }

    /// Places the column after another column.
    pub fn after(self, column: impl Into<String>) -> Self {
        self.column.after = Some(column.into());
        self
    }

    /// Defaults a timestamp column to the current time.
    pub fn use_current(self) -> Self {
        self.column.use_current = Some(true);
        self
    }

    /// Adds a primary key on this column.
    pub fn primary(self) -> Self {
        self.column.primary = Some(ColumnIndex::Default);
        self
    }

    /// Adds a unique index on this column.
    pub fn unique(self) -> Self {
        self.column.unique = Some(ColumnIndex::Default);
        self
    }

    /// Adds a unique index with an explicit name.
    pub fn unique_named(self, name: impl Into<String>) -> Self {
        self.column.unique = Some(ColumnIndex::Named(name.into()));
        self
    }

    /// Adds a plain index on this column.
    pub fn index(self) -> Self {
        self.column.index = Some(ColumnIndex::Default);
        self
    }

    /// Adds a plain index with an explicit name.
    pub fn index_named(self, name: impl Into<String>) -> Self {
        self.column.index = Some(ColumnIndex::Named(name.into()));
        self
    }
}
