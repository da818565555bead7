//! # sheetload
//!
//! A schema-validated streaming loader for spreadsheet-style tabular data.
//! Callers declare the columns they expect, point the loader at a row source,
//! and pull strongly-typed records one at a time.
//!
//! ## Features
//!
//! - **Declared schemas**: column name, type, key/required flags, default
//!   value, and date format pattern, validated at declaration time
//! - **Two mapping strategies**: match header cells by name (tolerating
//!   reordered and extra columns) or trust declared positions
//! - **Typed coercion**: integer, double, boolean, date, and string cells,
//!   with per-column defaults and required-field enforcement
//! - **Row-level failure isolation**: a bad cell drops its row, never the
//!   load; failures route to a pluggable policy (log-and-drop or accumulate)
//! - **Lazy, single-pass iteration**: rows are decoded only when pulled, in
//!   input order
//!
//! ## Example
//!
//! ```
//! use sheetload::{Accumulate, ColumnDef, ColumnMapping, ColumnType, MemoryRowSource,
//!                 RawValue, Schema, SheetLoader};
//!
//! let mut schema = Schema::new();
//! schema.declare(ColumnDef::new("id", ColumnType::Integer).key().required())?;
//! schema.declare(ColumnDef::new("name", ColumnType::String))?;
//!
//! let source = MemoryRowSource::from_values(vec![
//!     vec![RawValue::String("id".into()), RawValue::String("name".into())],
//!     vec![RawValue::Number(1.0), RawValue::String("first".into())],
//!     vec![RawValue::String("oops".into()), RawValue::String("second".into())],
//! ]);
//!
//! let mut loader = SheetLoader::with_policy(schema, source, Accumulate::new(), ColumnMapping::ByName)?;
//! let records: Vec<_> = loader.records().collect();
//!
//! assert_eq!(records.len(), 1);
//! assert_eq!(loader.policy().failures().len(), 1);
//! # Ok::<(), sheetload::LoadError>(())
//! ```
//!
//! Spreadsheet files are adapted through the [`RowSource`] trait;
//! [`XlsxRowSource`] covers Excel 2007+ workbooks, and any other container
//! can be plugged in by implementing the trait.

mod error;
mod loader;
mod schema;
mod source;

pub use crate::error::LoadError;
pub use crate::loader::{
    Accumulate, CellError, ColumnMapping, LogAndDrop, Record, Records, RowFailure,
    RowFailurePolicy, SheetLoader, UNKNOWN_COLUMN,
};
pub use crate::schema::{Column, ColumnDef, ColumnType, Schema, SchemaError, Value};
pub use crate::source::{
    MemoryRowSource, RawCell, RawRow, RawValue, RowSource, SourceError, XlsxRowSource,
};
