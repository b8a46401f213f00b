//! Workbook container handed from one worksheet builder to the next.

use log::debug;
use rust_xlsxwriter::Workbook;

use crate::conf::derive_default_xlsx_write_options;
use crate::error::BuildResult;
use crate::spec::SpecXlsxWriteOptions;

/// Lazily created workbook plus the options every sheet is rendered with.
///
/// A chain of builders owns exactly one context; it moves by value to the
/// next builder and is consumed by serialization.
pub struct XlsxWorkbookContext {
    workbook: Option<Workbook>,
    write_options: SpecXlsxWriteOptions,
    n_sheets_rendered: usize,
}

impl Default for XlsxWorkbookContext {
    fn default() -> Self {
        Self::new(derive_default_xlsx_write_options())
    }
}

impl XlsxWorkbookContext {
    pub fn new(write_options: SpecXlsxWriteOptions) -> Self {
        Self {
            workbook: None,
            write_options,
            n_sheets_rendered: 0,
        }
    }

    pub fn write_options(&self) -> &SpecXlsxWriteOptions {
        &self.write_options
    }

    pub(crate) fn set_write_options(&mut self, write_options: SpecXlsxWriteOptions) {
        self.write_options = write_options;
    }

    /// True once the first worksheet has been rendered.
    pub fn has_workbook(&self) -> bool {
        self.workbook.is_some()
    }

    /// Number of worksheets rendered into this context.
    pub fn sheets_rendered(&self) -> usize {
        self.n_sheets_rendered
    }

    pub(crate) fn mark_sheet_rendered(&mut self) {
        self.n_sheets_rendered += 1;
    }

    /// Return the workbook, creating it on first use.
    pub(crate) fn ensure_workbook(&mut self) -> &mut Workbook {
        self.workbook.get_or_insert_with(|| {
            debug!("creating workbook");
            Workbook::new()
        })
    }

    /// Hand the workbook to the caller.
    pub fn into_workbook(self) -> Workbook {
        self.workbook.unwrap_or_else(Workbook::new)
    }

    /// Encode the workbook to XLSX bytes and release it.
    ///
    /// The workbook is dropped on every return path, including encode failure.
    pub fn encode(self) -> BuildResult<Vec<u8>> {
        let mut workbook = self.into_workbook();
        let v_bytes = workbook.save_to_buffer()?;
        debug!("encoded workbook: {} bytes", v_bytes.len());
        Ok(v_bytes)
    }
}
