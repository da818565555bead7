use chrono::NaiveDate;
use std::fmt::Display;

/// Supported column data types for declared sheet formats.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// 64-bit signed integers
    Integer,
    /// Double-precision floating point numbers
    Double,
    /// Boolean values (true/false)
    Boolean,
    /// Calendar dates without a time component
    Date,
    /// Variable-length strings
    String,
}

impl ColumnType {
    /// Returns the lowercase string representation of the column type.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Double => "double",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::String => "string",
        }
    }
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed cell value produced by the loader.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Integer(i64),
    Double(f64),
    Boolean(bool),
    Date(NaiveDate),
    String(String),
}

impl Value {
    /// Returns the column type this value belongs to.
    pub const fn kind(&self) -> ColumnType {
        match self {
            Value::Integer(_) => ColumnType::Integer,
            Value::Double(_) => ColumnType::Double,
            Value::Boolean(_) => ColumnType::Boolean,
            Value::Date(_) => ColumnType::Date,
            Value::String(_) => ColumnType::String,
        }
    }

    /// Extracts the integer value if present.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Extracts the double value if present.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(value) => Some(*value),
            _ => None,
        }
    }

    /// Extracts the boolean value if present.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// Extracts the date value if present.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(value) => Some(*value),
            _ => None,
        }
    }

    /// Extracts the string value if present.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

/// Declaration of a single column, consumed by [`Schema::declare`].
///
/// Built with chainable setters so that a declaration reads close to the
/// tabular format it describes:
///
/// ```
/// use sheetload::{ColumnDef, ColumnType, Value};
///
/// let column = ColumnDef::new("amount", ColumnType::Integer)
///     .required()
///     .default_value(Value::Integer(0));
/// # let _ = column;
/// ```
///
/// [`Schema::declare`]: crate::Schema::declare
#[derive(Clone, Debug)]
pub struct ColumnDef {
    pub(crate) name: String,
    pub(crate) kind: ColumnType,
    pub(crate) is_key: bool,
    pub(crate) is_required: bool,
    pub(crate) default: Option<Value>,
    pub(crate) pattern: Option<String>,
}

impl ColumnDef {
    /// Starts a declaration for a column with the given name and type.
    pub fn new(name: impl Into<String>, kind: ColumnType) -> Self {
        Self {
            name: name.into(),
            kind,
            is_key: false,
            is_required: false,
            default: None,
            pattern: None,
        }
    }

    /// Marks the column as the key column of its schema.
    pub fn key(mut self) -> Self {
        self.is_key = true;
        self
    }

    /// Marks the column as required: a row without a usable value is dropped.
    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    /// Sets the value substituted when a cell is blank or coerces to nothing.
    /// The value's type must match the declared column type.
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Sets the date format pattern (strftime syntax, e.g. `%d/%m/%Y`).
    /// Only meaningful for [`ColumnType::Date`] columns.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }
}

/// Immutable descriptor of one declared column.
#[derive(Clone, Debug)]
pub struct Column {
    /// Position in declaration order (0-based)
    pub position: usize,
    /// Column name, unique within its schema
    pub name: String,
    /// Declared data type
    pub kind: ColumnType,
    /// Whether this is the key column
    pub is_key: bool,
    /// Whether a value must be present after defaulting
    pub is_required: bool,
    /// Value substituted for blank cells
    pub default: Option<Value>,
    /// Date format pattern for [`ColumnType::Date`] columns
    pub pattern: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_kind_matches_column_type() {
        assert_eq!(Value::Integer(1).kind(), ColumnType::Integer);
        assert_eq!(Value::Double(1.5).kind(), ColumnType::Double);
        assert_eq!(Value::Boolean(true).kind(), ColumnType::Boolean);
        assert_eq!(
            Value::Date(NaiveDate::from_ymd_opt(2021, 3, 5).unwrap()).kind(),
            ColumnType::Date
        );
        assert_eq!(Value::String("x".to_owned()).kind(), ColumnType::String);
    }

    #[test]
    fn value_accessors() {
        assert_eq!(Value::Integer(42).as_integer(), Some(42));
        assert_eq!(Value::Integer(42).as_double(), None);
        assert_eq!(Value::Boolean(false).as_boolean(), Some(false));
        assert_eq!(Value::String("abc".to_owned()).as_str(), Some("abc"));
    }
}
