//! Builder error types

use thiserror::Error;

/// Result type for worksheet building and serialization
pub type BuildResult<T> = std::result::Result<T, EnumBuildError>;

/// Errors raised while rendering or encoding a workbook
#[derive(Debug, Error)]
pub enum EnumBuildError {
    /// Host library rejected an operation (sheet name, merge, encode)
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// No explicit columns and no field description to generate them from
    #[error("worksheet {sheet:?} has no columns and its row type describes no public fields")]
    NoColumns { sheet: String },

    /// A column extractor failed; the render is aborted
    #[error("worksheet {sheet:?}, row {row}, column {header:?}: {message}")]
    Extract {
        sheet: String,
        row: usize,
        header: String,
        message: String,
    },

    /// Titles, header and rows do not fit in one Excel worksheet
    #[error("worksheet {sheet:?} needs {rows} rows x {cols} columns, exceeding Excel limits")]
    SheetTooLarge {
        sheet: String,
        rows: usize,
        cols: usize,
    },

    /// Row or column index does not fit the host library's coordinate type
    #[error("index overflow: {0}")]
    IndexOverflow(String),
}
