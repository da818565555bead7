use crate::error::LoadError;
use crate::schema::Schema;
use crate::source::RawRow;
use std::collections::HashMap;

/// How declared columns are matched against the physical sheet.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ColumnMapping {
    /// Match header cell text against declared column names. Unrecognized
    /// physical columns are tolerated.
    #[default]
    ByName,
    /// Ignore the header row's content and use declared positions directly.
    ByIndex,
}

/// The resolved name↔physical-index correspondence for one load session.
///
/// Built once from the schema and the first physical row, validated, and
/// read-only afterwards.
#[derive(Debug)]
pub(crate) struct HeaderMapping {
    by_name: HashMap<String, usize>,
    by_index: HashMap<usize, String>,
}

impl HeaderMapping {
    /// Reconciles the schema with the header row under the chosen strategy.
    ///
    /// Fails with [`LoadError::MissingHeader`] when the sheet has no rows at
    /// all or when by-name matching finds no declared column, and with
    /// [`LoadError::MissingColumn`] when any declared column is absent from
    /// the result.
    pub(crate) fn resolve(
        schema: &Schema,
        header: Option<&RawRow>,
        mapping: ColumnMapping,
    ) -> Result<Self, LoadError> {
        let header = header.ok_or(LoadError::MissingHeader)?;

        let by_name: HashMap<String, usize> = match mapping {
            ColumnMapping::ByIndex => schema
                .columns()
                .map(|column| (column.name.clone(), column.position))
                .collect(),
            ColumnMapping::ByName => header
                .cells()
                .iter()
                .filter(|cell| !cell.is_blank())
                .filter_map(|cell| {
                    let name = cell.text().trim().to_owned();
                    schema.column(&name).map(|_| (name, cell.index()))
                })
                .collect(),
        };

        if by_name.is_empty() {
            return Err(LoadError::MissingHeader);
        }
        for column in schema.columns() {
            if !by_name.contains_key(&column.name) {
                return Err(LoadError::MissingColumn {
                    name: column.name.clone(),
                });
            }
        }

        let by_index = by_name
            .iter()
            .map(|(name, index)| (*index, name.clone()))
            .collect();
        Ok(Self { by_name, by_index })
    }

    /// Physical column index for a declared name.
    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Declared name at a physical column index.
    #[allow(dead_code)]
    pub(crate) fn name_of(&self, index: usize) -> Option<&str> {
        self.by_index.get(&index).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnDef, ColumnType};
    use crate::source::{RawCell, RawRow, RawValue};

    fn schema() -> Schema {
        let mut schema = Schema::new();
        schema.declare(ColumnDef::new("id", ColumnType::Integer)).unwrap();
        schema.declare(ColumnDef::new("name", ColumnType::String)).unwrap();
        schema
    }

    fn header(names: &[&str]) -> RawRow {
        let cells = names
            .iter()
            .enumerate()
            .map(|(index, name)| RawCell::new(index, RawValue::String((*name).to_owned())))
            .collect();
        RawRow::new(0, cells)
    }

    #[test]
    fn by_name_matches_in_any_order_with_extras() {
        let row = header(&["extra", "name", "id"]);
        let mapping = HeaderMapping::resolve(&schema(), Some(&row), ColumnMapping::ByName).unwrap();

        assert_eq!(mapping.index_of("id"), Some(2));
        assert_eq!(mapping.index_of("name"), Some(1));
        assert_eq!(mapping.index_of("extra"), None);
        assert_eq!(mapping.name_of(1), Some("name"));
    }

    #[test]
    fn by_name_trims_header_cells() {
        let row = header(&[" id ", "name"]);
        let mapping = HeaderMapping::resolve(&schema(), Some(&row), ColumnMapping::ByName).unwrap();
        assert_eq!(mapping.index_of("id"), Some(0));
    }

    #[test]
    fn by_name_missing_declared_column_fails() {
        let row = header(&["id", "other"]);
        let result = HeaderMapping::resolve(&schema(), Some(&row), ColumnMapping::ByName);
        assert!(matches!(result, Err(LoadError::MissingColumn { name }) if name == "name"));
    }

    #[test]
    fn by_name_no_matches_fails_as_missing_header() {
        let row = header(&["a", "b"]);
        let result = HeaderMapping::resolve(&schema(), Some(&row), ColumnMapping::ByName);
        assert!(matches!(result, Err(LoadError::MissingHeader)));
    }

    #[test]
    fn no_rows_at_all_fails_as_missing_header() {
        let result = HeaderMapping::resolve(&schema(), None, ColumnMapping::ByName);
        assert!(matches!(result, Err(LoadError::MissingHeader)));
        let result = HeaderMapping::resolve(&schema(), None, ColumnMapping::ByIndex);
        assert!(matches!(result, Err(LoadError::MissingHeader)));
    }

    #[test]
    fn by_index_ignores_header_content() {
        let row = header(&["whatever", "junk"]);
        let mapping = HeaderMapping::resolve(&schema(), Some(&row), ColumnMapping::ByIndex).unwrap();
        assert_eq!(mapping.index_of("id"), Some(0));
        assert_eq!(mapping.index_of("name"), Some(1));
    }
}
