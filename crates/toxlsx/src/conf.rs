//! XLSX constants and default preset factories.

use crate::spec::{SpecAutofitCellsPolicy, SpecCellFormat, SpecXlsxWriteOptions};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Number format applied to date cells that carry no explicit format.
pub const C_NUM_FORMAT_DATE: &str = "yyyy-mm-dd";
/// Number format applied to date-time cells that carry no explicit format.
pub const C_NUM_FORMAT_DATETIME: &str = "yyyy-mm-dd hh:mm:ss";

/// Build default auto-fit policy used by column hooks.
pub fn derive_default_autofit_policy() -> SpecAutofitCellsPolicy {
    SpecAutofitCellsPolicy {
        width_cell_min: 8,
        width_cell_max: 60,
        width_cell_padding: 2,
    }
}

/// Build the bold, centered header preset.
///
/// Not applied implicitly; pass it to a header hook, e.g.
/// `range.patch_format(&derive_header_format())`.
pub fn derive_header_format() -> SpecCellFormat {
    SpecCellFormat {
        bold: Some(true),
        align: Some("center".to_string()),
        valign: Some("vcenter".to_string()),
        ..Default::default()
    }
}

/// Build default write options.
pub fn derive_default_xlsx_write_options() -> SpecXlsxWriteOptions {
    SpecXlsxWriteOptions::default()
}
