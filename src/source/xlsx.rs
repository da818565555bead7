use crate::source::{RawCell, RawRow, RawValue, RowSource, SourceError};
use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::VecDeque;
use std::io::{Read, Seek};
use std::path::Path;

/// A [`RowSource`] over the first worksheet of an Excel 2007+ workbook.
///
/// The workbook is decoded up front into raw rows; the adapter then hands
/// them out one at a time in physical order. Row and column indices are the
/// physical sheet coordinates, so sheets whose data does not start at `A1`
/// keep their original numbering.
pub struct XlsxRowSource {
    rows: VecDeque<RawRow>,
    closed: bool,
}

impl XlsxRowSource {
    /// Opens a workbook from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let workbook: Xlsx<_> = open_workbook(path)?;
        Self::from_workbook(workbook)
    }

    /// Opens a workbook from any seekable byte stream.
    pub fn from_reader<RS: Read + Seek>(reader: RS) -> Result<Self, SourceError> {
        let workbook = Xlsx::new(reader)?;
        Self::from_workbook(workbook)
    }

    fn from_workbook<RS: Read + Seek>(mut workbook: Xlsx<RS>) -> Result<Self, SourceError> {
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(SourceError::NoSheet)?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let mut rows = VecDeque::new();
        if let Some((row_offset, column_offset)) = range.start() {
            for (index, row) in range.rows().enumerate() {
                let cells = row
                    .iter()
                    .enumerate()
                    .filter_map(|(column, data)| {
                        convert(data).map(|value| {
                            RawCell::new(column_offset as usize + column, value)
                        })
                    })
                    .collect();
                rows.push_back(RawRow::new(row_offset as usize + index, cells));
            }
        }

        Ok(Self {
            rows,
            closed: false,
        })
    }
}

/// Maps a workbook cell onto the raw value model. Returns `None` for empty
/// cells so they stay absent from the sparse row.
fn convert(data: &Data) -> Option<RawValue> {
    match data {
        Data::Empty => None,
        Data::String(value) => Some(RawValue::String(value.clone())),
        Data::Int(value) => Some(RawValue::Number(*value as f64)),
        Data::Float(value) => Some(RawValue::Number(*value)),
        Data::Bool(value) => Some(RawValue::Boolean(*value)),
        Data::DateTime(value) => Some(match value.as_datetime() {
            Some(datetime) => RawValue::DateTime(datetime),
            None => RawValue::Number(value.as_f64()),
        }),
        Data::DateTimeIso(value) => Some(parse_iso(value)),
        Data::DurationIso(value) => Some(RawValue::String(value.clone())),
        Data::Error(value) => Some(RawValue::String(value.to_string())),
    }
}

fn parse_iso(value: &str) -> RawValue {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(RawValue::DateTime)
        .unwrap_or_else(|| RawValue::String(value.to_owned()))
}

impl RowSource for XlsxRowSource {
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
