use crate::loader::coerce::CellError;
use crate::schema::SchemaError;
use crate::source::SourceError;
use thiserror::Error;

/// Top-level error type for a load session.
///
/// Schema declaration, header reconciliation, and source-open failures are
/// fatal and surface to the caller. Per-cell failures ([`CellError`]) are
/// recovered at row granularity and only ever reach the caller through the
/// row failure policy.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("{0}")]
    Schema(#[from] SchemaError),

    #[error("file header not found")]
    MissingHeader,

    #[error("column '{name}' not found")]
    MissingColumn { name: String },

    #[error("{0}")]
    Cell(#[from] CellError),

    #[error("{0}")]
    Source(#[from] SourceError),
}
