//! Staging handles passed to configuration hooks.
//!
//! `rust_xlsxwriter` writes each cell once, so hooks edit a staged value and
//! format which the writer commits after the last hook has run. Coordinates
//! reported to callers are 1-based; the writer uses the 0-based fields.

use crate::spec::{EnumCellValue, SpecCellFormat};

/// A staged cell or rectangular range.
#[derive(Debug, Clone, PartialEq)]
pub struct XlsxCellRange {
    pub(crate) n_row_first: usize,
    pub(crate) n_col_first: usize,
    pub(crate) n_row_last: usize,
    pub(crate) n_col_last: usize,
    pub(crate) value: Option<EnumCellValue>,
    pub(crate) format: SpecCellFormat,
    pub(crate) if_merged: bool,
    pub(crate) if_auto_filter: bool,
}

impl XlsxCellRange {
    pub(crate) fn new_cell(n_row: usize, n_col: usize, value: EnumCellValue) -> Self {
        Self {
            n_row_first: n_row,
            n_col_first: n_col,
            n_row_last: n_row,
            n_col_last: n_col,
            value: Some(value),
            format: SpecCellFormat::default(),
            if_merged: false,
            if_auto_filter: false,
        }
    }

    pub(crate) fn new_row_span(
        n_row: usize,
        n_col_first: usize,
        n_col_last: usize,
        value: Option<EnumCellValue>,
    ) -> Self {
        Self {
            n_row_first: n_row,
            n_col_first,
            n_row_last: n_row,
            n_col_last,
            value,
            format: SpecCellFormat::default(),
            if_merged: false,
            if_auto_filter: false,
        }
    }

    /// First row, 1-based.
    pub fn row(&self) -> usize {
        self.n_row_first + 1
    }

    /// First column, 1-based.
    pub fn col(&self) -> usize {
        self.n_col_first + 1
    }

    /// Last row, 1-based.
    pub fn row_last(&self) -> usize {
        self.n_row_last + 1
    }

    /// Last column, 1-based.
    pub fn col_last(&self) -> usize {
        self.n_col_last + 1
    }

    pub fn is_single_cell(&self) -> bool {
        self.n_row_first == self.n_row_last && self.n_col_first == self.n_col_last
    }

    /// Staged value; `None` on a range whose value was never set.
    pub fn value(&self) -> Option<&EnumCellValue> {
        self.value.as_ref()
    }

    pub fn set_value(&mut self, value: impl Into<EnumCellValue>) {
        self.value = Some(value.into());
    }

    pub fn format(&self) -> &SpecCellFormat {
        &self.format
    }

    /// Overlay `patch` onto the staged format.
    pub fn patch_format(&mut self, patch: &SpecCellFormat) {
        self.format = self.format.merge(patch);
    }

    pub fn set_bold(&mut self) {
        self.format.bold = Some(true);
    }

    pub fn set_italic(&mut self) {
        self.format.italic = Some(true);
    }

    pub fn set_text_wrap(&mut self) {
        self.format.text_wrap = Some(true);
    }

    pub fn set_num_format(&mut self, num_format: impl Into<String>) {
        self.format.num_format = Some(num_format.into());
    }

    pub fn set_align(&mut self, align: impl Into<String>) {
        self.format.align = Some(align.into());
    }

    pub fn set_bg_color(&mut self, color: impl Into<String>) {
        self.format.bg_color = Some(color.into());
    }

    pub fn set_font_color(&mut self, color: impl Into<String>) {
        self.format.font_color = Some(color.into());
    }

    /// Border style for all sides (0 = none, 1 = thin, 2 = medium, ...).
    pub fn set_border(&mut self, border: i64) {
        self.format.border = Some(border);
    }

    pub fn is_merged(&self) -> bool {
        self.if_merged
    }

    pub fn set_merged(&mut self, if_merged: bool) {
        self.if_merged = if_merged;
    }

    pub fn is_auto_filter(&self) -> bool {
        self.if_auto_filter
    }

    pub fn set_auto_filter(&mut self, if_auto_filter: bool) {
        self.if_auto_filter = if_auto_filter;
    }
}

/// A staged whole-column configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct XlsxColumnRange {
    pub(crate) n_col: usize,
    pub(crate) width: Option<f64>,
    pub(crate) if_autofit: bool,
    pub(crate) if_hidden: bool,
    pub(crate) format: SpecCellFormat,
}

impl XlsxColumnRange {
    pub(crate) fn new(n_col: usize) -> Self {
        Self {
            n_col,
            width: None,
            if_autofit: false,
            if_hidden: false,
            format: SpecCellFormat::default(),
        }
    }

    /// Column index, 1-based.
    pub fn col(&self) -> usize {
        self.n_col + 1
    }

    pub fn width(&self) -> Option<f64> {
        self.width
    }

    /// Fixed width in character units. Clears a pending auto-fit.
    pub fn set_width(&mut self, width: f64) {
        self.width = Some(width);
        self.if_autofit = false;
    }

    /// Size the column to its widest header or data cell.
    pub fn autofit(&mut self) {
        self.if_autofit = true;
        self.width = None;
    }

    pub fn is_autofit(&self) -> bool {
        self.if_autofit
    }

    pub fn set_hidden(&mut self, if_hidden: bool) {
        self.if_hidden = if_hidden;
    }

    pub fn is_hidden(&self) -> bool {
        self.if_hidden
    }

    pub fn format(&self) -> &SpecCellFormat {
        &self.format
    }

    /// Overlay `patch` onto the column format applied to empty cells.
    pub fn patch_format(&mut self, patch: &SpecCellFormat) {
        self.format = self.format.merge(patch);
    }
}
