use crate::schema::{Column, ColumnType, Value};
use crate::source::RawCell;
use chrono::format::{parse, Item, Parsed, StrftimeItems};
use chrono::NaiveDate;
use std::collections::HashMap;
use thiserror::Error;

/// Per-cell coercion failures. These never surface to the caller directly:
/// the owning row is dropped and the failure is routed to the row failure
/// policy.
#[derive(Error, Debug)]
pub enum CellError {
    #[error("no value for required column '{column}'")]
    RequiredValueMissing { column: String },

    #[error("'{value}' in column '{column}' is not a boolean")]
    InvalidBoolean { column: String, value: String },

    #[error("cannot parse '{value}' in column '{column}' as {kind}: {cause}")]
    Parse {
        column: String,
        value: String,
        kind: ColumnType,
        #[source]
        cause: anyhow::Error,
    },
}

/// Session-owned cache of compiled date format patterns.
///
/// Patterns are compiled on first use and kept for the lifetime of the load
/// session; compiling the same pattern twice is harmless, so the cache only
/// grows.
#[derive(Debug, Default)]
pub(crate) struct FormatCache {
    formats: HashMap<String, Vec<Item<'static>>>,
    compilations: usize,
}

impl FormatCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Parses a calendar date with the given pattern, compiling and caching
    /// the pattern on first use.
    pub(crate) fn parse_date(
        &mut self,
        text: &str,
        pattern: &str,
    ) -> Result<NaiveDate, chrono::ParseError> {
        if !self.formats.contains_key(pattern) {
            let items = StrftimeItems::new(pattern).parse_to_owned()?;
            self.formats.insert(pattern.to_owned(), items);
            self.compilations += 1;
        }
        let items = self.formats.get(pattern).expect("pattern just cached");
        let mut parsed = Parsed::new();
        parse(&mut parsed, text, items.iter())?;
        parsed.to_naive_date()
    }

    /// Number of patterns compiled so far. A repeated pattern does not bump
    /// the counter, which makes cache hits observable in tests.
    pub(crate) fn compilations(&self) -> usize {
        self.compilations
    }
}

/// Coerces one raw cell to the typed value of its column.
///
/// A missing cell is treated as blank. Blank cells resolve to the column
/// default, then `None` for non-required columns; a required column with no
/// usable value fails. The returned `Some` value always matches the column's
/// declared type, and a required column never yields `Ok(None)`.
pub(crate) fn coerce(
    cell: Option<&RawCell>,
    column: &Column,
    cache: &mut FormatCache,
) -> Result<Option<Value>, CellError> {
    let cell = match cell {
        Some(cell) if !cell.is_blank() => cell,
        _ => return finish(column, None),
    };
    let text = cell.text();
    let text = text.trim();
    if text.is_empty() {
        return finish(column, None);
    }

    let coerced = match column.kind {
        ColumnType::Integer => {
            let value = text.parse::<i64>().map_err(|cause| CellError::Parse {
                column: column.name.clone(),
                value: text.to_owned(),
                kind: column.kind,
                cause: cause.into(),
            })?;
            Some(Value::Integer(value))
        }
        ColumnType::Double => {
            // Native numeric form only, no string round-trip.
            let value = cell.as_number().ok_or_else(|| CellError::Parse {
                column: column.name.clone(),
                value: text.to_owned(),
                kind: column.kind,
                cause: anyhow::anyhow!("cell has no numeric form"),
            })?;
            Some(Value::Double(value))
        }
        ColumnType::Boolean => match text.to_ascii_lowercase().as_str() {
            "yes" | "1" | "true" => Some(Value::Boolean(true)),
            "no" | "0" | "false" => Some(Value::Boolean(false)),
            "" => None,
            other => {
                return Err(CellError::InvalidBoolean {
                    column: column.name.clone(),
                    value: other.to_owned(),
                })
            }
        },
        ColumnType::Date => Some(Value::Date(coerce_date(cell, text, column, cache)?)),
        ColumnType::String => Some(Value::String(text.to_owned())),
    };

    finish(column, coerced)
}

/// Substitutes the column default for a missing value and enforces the
/// required-column rule.
fn finish(column: &Column, coerced: Option<Value>) -> Result<Option<Value>, CellError> {
    let value = coerced.or_else(|| column.default.clone());
    if value.is_none() && column.is_required {
        return Err(CellError::RequiredValueMissing {
            column: column.name.clone(),
        });
    }
    Ok(value)
}

/// Dates prefer the cell's native date/time form, normalized to a calendar
/// date. String cells fall back to the column pattern, or the ISO calendar
/// date format when no pattern is declared.
fn coerce_date(
    cell: &RawCell,
    text: &str,
    column: &Column,
    cache: &mut FormatCache,
) -> Result<NaiveDate, CellError> {
    if let Some(datetime) = cell.as_datetime() {
        return Ok(datetime.date());
    }

    let parsed = match &column.pattern {
        Some(pattern) => cache.parse_date(text, pattern),
        None => NaiveDate::parse_from_str(text, "%Y-%m-%d"),
    };
    parsed.map_err(|cause| CellError::Parse {
        column: column.name.clone(),
        value: text.to_owned(),
        kind: column.kind,
        cause: cause.into(),
    })
}
