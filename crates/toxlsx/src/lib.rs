//! `toxlsx` v1:
//! Map in-memory record lists onto XLSX worksheets.
//!
//! Sheets are declared with a fluent builder, rendered once in a fixed order
//! (titles, header, data, columns) and chained into one workbook.
//!
//! - `conf`    : constants and default presets
//! - `spec`    : cell values, formats, columns, titles, hooks, options
//! - `range`   : staging handles edited by hooks
//! - `reflect` : field description and default column generation
//! - `context` : workbook container shared along a chain
//! - `writer`  : worksheet builder, renderer and serializers
//! - `util`    : pure helper functions
//!
//! ```
//! toxlsx::describable! {
//!     #[derive(Clone)]
//!     pub struct Pet {
//!         pub name: String,
//!         pub age: u32,
//!     }
//! }
//!
//! let v_bytes = toxlsx::to_worksheet(vec![Pet { name: "Al".into(), age: 3 }], "Pets")
//!     .with_title("Pets")
//!     .to_xlsx()
//!     .unwrap();
//! assert_eq!(&v_bytes[..2], b"PK");
//! ```
pub mod conf;
pub mod context;
pub mod error;
pub mod range;
pub mod reflect;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    C_NUM_FORMAT_DATE, C_NUM_FORMAT_DATETIME, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX,
    N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL, derive_default_xlsx_write_options, derive_header_format,
};
pub use context::XlsxWorkbookContext;
pub use error::{BuildResult, EnumBuildError};
pub use range::{XlsxCellRange, XlsxColumnRange};
pub use reflect::{Describable, SpecFieldDescriptor, auto_generate_columns};
pub use spec::{
    EnumCellValue, FnConfigureCell, FnConfigureColumn, FnConfigureRange, FnExtractValue,
    SpecAutofitCellsPolicy, SpecCellFormat, SpecColumnHooks, SpecSheetHooks, SpecXlsxColumn,
    SpecXlsxTitleRow, SpecXlsxWriteOptions,
};
pub use util::{humanize_header, sanitize_sheet_name};
pub use writer::{
    XlsxWorksheetBuilder, to_package_from_rows, to_worksheet, to_worksheet_with_context,
    to_worksheet_with_hooks, to_xlsx_from_rows,
};
