//! Row sources: the boundary between the loader and physical sheet data.
//!
//! A [`RowSource`] supplies raw rows in physical order, exactly once, and owns
//! whatever buffering its container format needs. The loader never touches the
//! container format itself; it only sees [`RawRow`]s of [`RawCell`]s.

pub(crate) mod xlsx;

pub use xlsx::XlsxRowSource;

use chrono::NaiveDateTime;
use std::borrow::Cow;
use std::collections::VecDeque;
use thiserror::Error;

/// Errors raised at the row-source boundary.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("invalid workbook: {0}")]
    Workbook(#[from] calamine::XlsxError),

    #[error("workbook has no sheets")]
    NoSheet,
}

/// Untyped cell content as supplied by a row source.
#[derive(Clone, Debug, PartialEq)]
pub enum RawValue {
    /// Blank cell
    Empty,
    /// Textual content
    String(String),
    /// Native numeric content
    Number(f64),
    /// Native boolean content
    Boolean(bool),
    /// Native date/time content
    DateTime(NaiveDateTime),
}

/// One raw cell: a physical column index plus its untyped content.
///
/// Supplied per row by a [`RowSource`] and consumed immediately by the
/// loader's coercion step.
#[derive(Clone, Debug, PartialEq)]
pub struct RawCell {
    index: usize,
    value: RawValue,
}

impl RawCell {
    /// Creates a cell at the given physical column index.
    pub fn new(index: usize, value: RawValue) -> Self {
        Self { index, value }
    }

    /// Physical column index (0-based).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns true for cells with no content.
    pub fn is_blank(&self) -> bool {
        matches!(self.value, RawValue::Empty)
    }

    /// The cell's string form. Numbers with no fractional part render without
    /// a decimal point, matching how sheet applications display them.
    pub fn text(&self) -> Cow<'_, str> {
        match &self.value {
            RawValue::Empty => Cow::Borrowed(""),
            RawValue::String(value) => Cow::Borrowed(value.as_str()),
            RawValue::Number(value) => {
                if value.fract() == 0.0 && *value >= i64::MIN as f64 && *value <= i64::MAX as f64 {
                    Cow::Owned(format!("{}", *value as i64))
                } else {
                    Cow::Owned(value.to_string())
                }
            }
            RawValue::Boolean(value) => Cow::Borrowed(if *value { "true" } else { "false" }),
            RawValue::DateTime(value) => Cow::Owned(value.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }

    /// The cell's native numeric form, if it has one.
    pub fn as_number(&self) -> Option<f64> {
        match &self.value {
            RawValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// The cell's native date/time form, if it has one.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match &self.value {
            RawValue::DateTime(value) => Some(*value),
            _ => None,
        }
    }
}

/// One physical row: its row index plus a sparse list of cells.
///
/// Cells are looked up by physical column index; a missing cell is
/// indistinguishable from a blank one to the loader.
#[derive(Clone, Debug)]
pub struct RawRow {
    index: usize,
    cells: Vec<RawCell>,
}

impl RawRow {
    /// Creates a row at the given physical row index.
    pub fn new(index: usize, cells: Vec<RawCell>) -> Self {
        Self { index, cells }
    }

    /// Physical row index (0-based).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Looks up a cell by physical column index.
    pub fn cell(&self, column: usize) -> Option<&RawCell> {
        self.cells.iter().find(|cell| cell.index == column)
    }

    /// All cells present in the row, in physical order.
    pub fn cells(&self) -> &[RawCell] {
        &self.cells
    }
}

/// A supplier of raw rows in physical order, consumed in one forward pass.
pub trait RowSource {
    /// Pulls the next physical row, or `None` once the source is exhausted.
    fn next_row(&mut self) -> Result<Option<RawRow>, SourceError>;

    /// Releases the source's resources. Further `next_row` calls return `None`.
    fn close(&mut self);
}

/// A [`RowSource`] over rows already held in memory.
pub struct MemoryRowSource {
    rows: VecDeque<RawRow>,
    closed: bool,
}

impl MemoryRowSource {
    /// Creates a source yielding the given rows in order.
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self {
            rows: rows.into(),
            closed: false,
        }
    }

    /// Creates a source from plain cell values, numbering rows and columns
    /// from zero. The first row is the header row.
    pub fn from_values(rows: Vec<Vec<RawValue>>) -> Self {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(row_index, values)| {
                let cells = values
                    .into_iter()
                    .enumerate()
                    .map(|(column, value)| RawCell::new(column, value))
                    .collect();
                RawRow::new(row_index, cells)
            })
            .collect();
        Self {
            rows,
            closed: false,
        }
    }
}

impl RowSource for MemoryRowSource {
    fn next_row(&mut self) -> Result<Option<RawRow>, SourceError> {
        if self.closed {
            return Ok(None);
        }
        Ok(self.rows.pop_front())
    }

    fn close(&mut self) {
        self.closed = true;
        self.rows.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn text_forms() {
        assert_eq!(RawCell::new(0, RawValue::Empty).text(), "");
        assert_eq!(RawCell::new(0, RawValue::String("abc".to_owned())).text(), "abc");
        assert_eq!(RawCell::new(0, RawValue::Number(42.0)).text(), "42");
        assert_eq!(RawCell::new(0, RawValue::Number(1.5)).text(), "1.5");
        assert_eq!(RawCell::new(0, RawValue::Boolean(true)).text(), "true");
    }

    #[test]
    fn datetime_text_form() {
        let datetime = NaiveDate::from_ymd_opt(2021, 3, 5)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(
            RawCell::new(0, RawValue::DateTime(datetime)).text(),
            "2021-03-05 10:30:00"
        );
    }

    #[test]
    fn native_accessors() {
        assert_eq!(RawCell::new(0, RawValue::Number(1.5)).as_number(), Some(1.5));
        assert_eq!(RawCell::new(0, RawValue::String("1.5".to_owned())).as_number(), None);
        assert!(RawCell::new(0, RawValue::String("x".to_owned())).as_datetime().is_none());
    }

    #[test]
    fn row_lookup_by_physical_index() {
        let row = RawRow::new(3, vec![
            RawCell::new(1, RawValue::Number(1.0)),
            RawCell::new(4, RawValue::String("x".to_owned())),
        ]);
        assert_eq!(row.index(), 3);
        assert!(row.cell(0).is_none());
        assert_eq!(row.cell(4).unwrap().text(), "x");
    }

    #[test]
    fn memory_source_single_forward_pass() {
        let mut source = MemoryRowSource::from_values(vec![
            vec![RawValue::String("a".to_owned())],
            vec![RawValue::Number(1.0)],
        ]);
        assert_eq!(source.next_row().unwrap().unwrap().index(), 0);
        assert_eq!(source.next_row().unwrap().unwrap().index(), 1);
        assert!(source.next_row().unwrap().is_none());
    }

    #[test]
    fn memory_source_close_stops_iteration() {
        let mut source = MemoryRowSource::from_values(vec![vec![RawValue::Number(1.0)]]);
        source.close();
        assert!(source.next_row().unwrap().is_none());
    }
}
