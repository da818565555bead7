//! Declared sheet formats: columns, types, and their validation rules.

pub(crate) mod column;

pub use column::{Column, ColumnDef, ColumnType, Value};

use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while declaring a schema.
///
/// All of these are fatal at declaration time: the schema is left unchanged
/// and the offending column is not added.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("column name must be declared")]
    BlankName,

    #[error("column '{0}' already declared")]
    DuplicateName(String),

    #[error("key column already declared")]
    DuplicateKey,

    #[error("default value for column '{name}' is {actual}, expected {expected}")]
    DefaultTypeMismatch {
        name: String,
        expected: ColumnType,
        actual: ColumnType,
    },
}

/// An ordered, name-keyed set of column declarations.
///
/// A schema is built incrementally with [`Schema::declare`] and is read-only
/// for the rest of a load session. Column positions are assigned in
/// declaration order.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    columns: Vec<Column>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column declaration.
    ///
    /// The column's position is the current column count. Fails, leaving the
    /// schema untouched, when the name is blank or already declared, when a
    /// second key column is requested, or when the declared default value
    /// does not match the column type.
    pub fn declare(&mut self, def: ColumnDef) -> Result<(), SchemaError> {
        if def.name.trim().is_empty() {
            return Err(SchemaError::BlankName);
        }
        if self.index.contains_key(&def.name) {
            return Err(SchemaError::DuplicateName(def.name));
        }
        if def.is_key && self.key_column().is_some() {
            return Err(SchemaError::DuplicateKey);
        }
        if let Some(default) = &def.default {
            if default.kind() != def.kind {
                return Err(SchemaError::DefaultTypeMismatch {
                    name: def.name,
                    expected: def.kind,
                    actual: default.kind(),
                });
            }
        }

        let position = self.columns.len();
        self.index.insert(def.name.clone(), position);
        self.columns.push(Column {
            position,
            name: def.name,
            kind: def.kind,
            is_key: def.is_key,
            is_required: def.is_required,
            default: def.default,
            pattern: def.pattern,
        });
        Ok(())
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.index.get(name).map(|position| &self.columns[*position])
    }

    /// Returns all declared columns in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    /// Returns the key column, if one was declared.
    pub fn key_column(&self) -> Option<&Column> {
        self.columns.iter().find(|column| column.is_key)
    }

    /// Number of declared columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if no columns have been declared.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_assigns_positions_in_order() {
        let mut schema = Schema::new();
        schema.declare(ColumnDef::new("id", ColumnType::Integer)).unwrap();
        schema.declare(ColumnDef::new("name", ColumnType::String)).unwrap();
        schema.declare(ColumnDef::new("born", ColumnType::Date)).unwrap();

        assert_eq!(schema.len(), 3);
        assert_eq!(schema.column("id").unwrap().position, 0);
        assert_eq!(schema.column("name").unwrap().position, 1);
        assert_eq!(schema.column("born").unwrap().position, 2);
    }

    #[test]
    fn declare_blank_name_fails_and_leaves_schema_unchanged() {
        let mut schema = Schema::new();
        schema.declare(ColumnDef::new("id", ColumnType::Integer)).unwrap();

        let result = schema.declare(ColumnDef::new("   ", ColumnType::String));
        assert!(matches!(result, Err(SchemaError::BlankName)));
        assert_eq!(schema.len(), 1);
    }

    #[test]
    fn declare_duplicate_name_fails_and_leaves_schema_unchanged() {
        let mut schema = Schema::new();
        schema.declare(ColumnDef::new("id", ColumnType::Integer)).unwrap();

        let result = schema.declare(ColumnDef::new("id", ColumnType::String));
        assert!(matches!(result, Err(SchemaError::DuplicateName(name)) if name == "id"));
        assert_eq!(schema.len(), 1);
    }

    #[test]
    fn declare_second_key_fails_and_leaves_schema_unchanged() {
        let mut schema = Schema::new();
        schema.declare(ColumnDef::new("id", ColumnType::Integer).key()).unwrap();

        let result = schema.declare(ColumnDef::new("code", ColumnType::String).key());
        assert!(matches!(result, Err(SchemaError::DuplicateKey)));
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.key_column().unwrap().name, "id");
    }

    #[test]
    fn declare_mismatched_default_fails() {
        let mut schema = Schema::new();
        let result = schema.declare(
            ColumnDef::new("amount", ColumnType::Integer).default_value(Value::String("0".to_owned())),
        );
        assert!(matches!(result, Err(SchemaError::DefaultTypeMismatch { .. })));
        assert!(schema.is_empty());
    }

    #[test]
    fn key_column_absent_by_default() {
        let mut schema = Schema::new();
        schema.declare(ColumnDef::new("id", ColumnType::Integer)).unwrap();
        assert!(schema.key_column().is_none());
    }
}
