//! The load session: header resolution, lazy row decoding, and failure
//! routing.

pub(crate) mod coerce;
pub(crate) mod header;
pub(crate) mod policy;

pub use coerce::CellError;
pub use header::ColumnMapping;
pub use policy::{Accumulate, LogAndDrop, RowFailure, RowFailurePolicy, UNKNOWN_COLUMN};

use crate::error::LoadError;
use crate::loader::coerce::{coerce, FormatCache};
use crate::loader::header::HeaderMapping;
use crate::schema::{Schema, Value};
use crate::source::{RawRow, RowSource};
use std::collections::HashMap;

/// One decoded row, keyed by declared column name.
///
/// Every declared column is present in every record. A non-required column
/// whose cell was blank (and had no default) is present with no value, so
/// records always carry the full declared column set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    values: HashMap<String, Option<Value>>,
}

impl Record {
    /// The value of a column, or `None` when the column is absent or empty.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).and_then(|value| value.as_ref())
    }

    /// Returns true when the column is present but resolved to no value.
    pub fn is_null(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(None))
    }

    /// Returns true when the column belongs to this record's schema.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of columns in the record.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true for a record with no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over all columns and their values, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_ref()))
    }
}

/// A schema-validated load session over one row source.
///
/// Construction consumes the source's first row to resolve the header
/// mapping; [`SheetLoader::records`] then decodes the remaining rows lazily,
/// one per pull. Rows that fail to decode are dropped and routed to the row
/// failure policy; they never surface through the iterator.
///
/// The source is released exactly once on every exit path: explicit
/// [`SheetLoader::close`], drop, or a header resolution failure during
/// construction.
///
/// ```
/// use sheetload::{ColumnDef, ColumnType, MemoryRowSource, RawValue, Schema, SheetLoader};
///
/// let mut schema = Schema::new();
/// schema.declare(ColumnDef::new("id", ColumnType::Integer).key().required())?;
/// schema.declare(ColumnDef::new("name", ColumnType::String))?;
///
/// let source = MemoryRowSource::from_values(vec![
///     vec![RawValue::String("id".into()), RawValue::String("name".into())],
///     vec![RawValue::Number(1.0), RawValue::String("first".into())],
/// ]);
///
/// let mut loader = SheetLoader::new(schema, source)?;
/// for record in loader.records() {
///     assert_eq!(record.get("id").and_then(|value| value.as_integer()), Some(1));
/// }
/// # Ok::<(), sheetload::LoadError>(())
/// ```
pub struct SheetLoader<S: RowSource, P: RowFailurePolicy = LogAndDrop> {
    schema: Schema,
    source: S,
    policy: P,
    header: HeaderMapping,
    cache: FormatCache,
    last_row: usize,
    finished: bool,
    closed: bool,
}

impl<S: RowSource> SheetLoader<S, LogAndDrop> {
    /// Opens a session with by-name column mapping and the log-and-drop
    /// failure policy.
    pub fn new(schema: Schema, source: S) -> Result<Self, LoadError> {
        Self::with_policy(schema, source, LogAndDrop, ColumnMapping::default())
    }
}

impl<S: RowSource, P: RowFailurePolicy> SheetLoader<S, P> {
    /// Opens a session with an explicit failure policy and mapping strategy.
    ///
    /// Reads the source's first physical row and reconciles it with the
    /// schema. On a header failure the source is closed and no session is
    /// constructed.
    pub fn with_policy(
        schema: Schema,
        mut source: S,
        policy: P,
        mapping: ColumnMapping,
    ) -> Result<Self, LoadError> {
        let header_row = match source.next_row() {
            Ok(row) => row,
            Err(error) => {
                source.close();
                return Err(error.into());
            }
        };
        let header = match HeaderMapping::resolve(&schema, header_row.as_ref(), mapping) {
            Ok(header) => header,
            Err(error) => {
                source.close();
                return Err(error);
            }
        };
        let last_row = header_row.map(|row| row.index()).unwrap_or(0);

        Ok(Self {
            schema,
            source,
            policy,
            header,
            cache: FormatCache::new(),
            last_row,
            finished: false,
            closed: false,
        })
    }

    /// The lazy record sequence. Rows are decoded one per pull, in input
    /// order; the underlying source is consumed in a single forward pass and
    /// the sequence is not restartable.
    pub fn records(&mut self) -> Records<'_, S, P> {
        Records { loader: self }
    }

    /// The schema this session decodes against.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The session's failure policy, for post-session inspection.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Mutable access to the session's failure policy.
    pub fn policy_mut(&mut self) -> &mut P {
        &mut self.policy
    }

    /// Releases the row source. Safe to call more than once; only the first
    /// call releases.
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.source.close();
        }
    }
}

impl<S: RowSource, P: RowFailurePolicy> Drop for SheetLoader<S, P> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Lazy iterator over successfully decoded rows. See [`SheetLoader::records`].
pub struct Records<'a, S: RowSource, P: RowFailurePolicy> {
    loader: &'a mut SheetLoader<S, P>,
}

impl<S: RowSource, P: RowFailurePolicy> Iterator for Records<'_, S, P> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        let loader = &mut *self.loader;
        loop {
            if loader.finished || loader.closed {
                return None;
            }
            match loader.source.next_row() {
                Ok(Some(row)) => {
                    loader.last_row = row.index();
                    match decode_row(&loader.schema, &loader.header, &mut loader.cache, &row) {
                        Ok(record) => return Some(record),
                        Err(failure) => loader.policy.handle(failure),
                    }
                }
                Ok(None) => {
                    loader.finished = true;
                    return None;
                }
                Err(error) => {
                    // A source that cannot produce the next row ends the
                    // sequence; the failure is still observable through the
                    // policy.
                    loader.finished = true;
                    let failure = RowFailure::unattributed(loader.last_row + 1, error);
                    loader.policy.handle(failure);
                    return None;
                }
            }
        }
    }
}

/// Decodes one raw row into a record, or reports the first failing column.
fn decode_row(
    schema: &Schema,
    header: &HeaderMapping,
    cache: &mut FormatCache,
    row: &RawRow,
) -> Result<Record, RowFailure> {
    let mut values = HashMap::with_capacity(schema.len());
    for column in schema.columns() {
        let index = header
            .index_of(&column.name)
            .expect("header mapping validated against schema");
        match coerce(row.cell(index), column, cache) {
            Ok(value) => {
                values.insert(column.name.clone(), value);
            }
            Err(error) => {
                return Err(RowFailure::new(
                    column.name.clone(),
                    index,
                    row.index(),
                    error,
                ));
            }
        }
    }
    Ok(Record { values })
}
