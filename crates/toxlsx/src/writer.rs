//! Deferred worksheet builder: accumulate configuration, render once, chain.

use std::fmt;
use std::rc::Rc;

use log::{debug, trace};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::conf::{N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX};
use crate::context::XlsxWorkbookContext;
use crate::error::{BuildResult, EnumBuildError};
use crate::range::{XlsxCellRange, XlsxColumnRange};
use crate::reflect::{Describable, auto_generate_columns};
use crate::spec::{
    EnumCellValue, SpecAutofitCellsPolicy, SpecCellFormat, SpecColumnHooks, SpecSheetHooks,
    SpecXlsxColumn, SpecXlsxTitleRow, SpecXlsxWriteOptions,
};
use crate::util::{
    cast_col_num, cast_row_num, derive_rust_xlsx_format, derive_sheet_name_from_type,
    estimate_width_len,
};

type FnAutoColumns<T> = fn() -> Vec<SpecXlsxColumn<T>>;

////////////////////////////////////////////////////////////////////////////////
// #region EntryPoints

/// Start a chain with a sheet of describable rows.
///
/// Columns default to every public field of `T` when none are added.
pub fn to_worksheet<T: Describable>(
    rows: Vec<T>,
    name: impl Into<String>,
) -> XlsxWorksheetBuilder<T> {
    to_worksheet_with_hooks(rows, name, SpecSheetHooks::new())
}

/// Start a chain with sheet-level hooks.
pub fn to_worksheet_with_hooks<T: Describable>(
    rows: Vec<T>,
    name: impl Into<String>,
    hooks: SpecSheetHooks<T>,
) -> XlsxWorksheetBuilder<T> {
    XlsxWorksheetBuilder::from_parts(
        name.into(),
        XlsxWorkbookContext::default(),
        rows,
        hooks,
        Some(auto_generate_columns::<T>),
    )
}

/// Start a chain inside a caller-built context, e.g. one created with
/// [`XlsxWorkbookContext::new`] and custom write options.
pub fn to_worksheet_with_context<T: Describable>(
    context: XlsxWorkbookContext,
    rows: Vec<T>,
    name: impl Into<String>,
) -> XlsxWorksheetBuilder<T> {
    XlsxWorksheetBuilder::from_parts(
        name.into(),
        context,
        rows,
        SpecSheetHooks::new(),
        Some(auto_generate_columns::<T>),
    )
}

/// One-sheet workbook named after `T`, encoded to XLSX bytes.
pub fn to_xlsx_from_rows<T: Describable>(rows: Vec<T>) -> BuildResult<Vec<u8>> {
    to_worksheet(rows, derive_sheet_name_from_type::<T>()).to_xlsx()
}

/// One-sheet workbook named after `T`, returned live.
pub fn to_package_from_rows<T: Describable>(rows: Vec<T>) -> BuildResult<Workbook> {
    to_worksheet(rows, derive_sheet_name_from_type::<T>()).to_package()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WorksheetBuilder

/// Pending definition of one worksheet.
///
/// Nothing is written until [`Self::append_worksheet`] runs, which the chain
/// methods ([`Self::next_worksheet`], [`Self::to_package`], [`Self::to_xlsx`])
/// call exactly once by consuming the builder.
pub struct XlsxWorksheetBuilder<T> {
    name: String,
    context: XlsxWorkbookContext,
    rows: Vec<T>,
    columns: Vec<SpecXlsxColumn<T>>,
    titles: Vec<SpecXlsxTitleRow>,
    hooks: SpecSheetHooks<T>,
    fn_auto_columns: Option<FnAutoColumns<T>>,
}

impl<T> XlsxWorksheetBuilder<T> {
    /// Start a chain for a row type without field description.
    ///
    /// At least one column must be added before rendering.
    pub fn new(rows: Vec<T>, name: impl Into<String>) -> Self {
        Self::from_parts(
            name.into(),
            XlsxWorkbookContext::default(),
            rows,
            SpecSheetHooks::new(),
            None,
        )
    }

    fn from_parts(
        name: String,
        context: XlsxWorkbookContext,
        rows: Vec<T>,
        hooks: SpecSheetHooks<T>,
        fn_auto_columns: Option<FnAutoColumns<T>>,
    ) -> Self {
        Self {
            name,
            context,
            rows,
            columns: Vec::new(),
            titles: Vec::new(),
            hooks,
            fn_auto_columns,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn columns(&self) -> &[SpecXlsxColumn<T>] {
        &self.columns
    }

    pub fn titles(&self) -> &[SpecXlsxTitleRow] {
        &self.titles
    }

    pub fn hooks(&self) -> &SpecSheetHooks<T> {
        &self.hooks
    }

    pub fn context(&self) -> &XlsxWorkbookContext {
        &self.context
    }

    ////////////////////////////////////////////////////////////////////////////
    // Columns and titles

    /// Append a column mapped by an infallible extractor.
    pub fn with_column<V, F>(self, extract: F, header: impl Into<String>) -> Self
    where
        V: Into<EnumCellValue>,
        F: Fn(&T) -> V + 'static,
    {
        self.with_column_spec(SpecXlsxColumn::new(extract, header))
    }

    /// Append a column whose extractor may fail; a failure aborts the render.
    pub fn with_column_try<V, E, F>(self, extract: F, header: impl Into<String>) -> Self
    where
        V: Into<EnumCellValue>,
        E: fmt::Display,
        F: Fn(&T) -> Result<V, E> + 'static,
    {
        self.with_column_spec(SpecXlsxColumn::new_try(extract, header))
    }

    /// Append a column with column-level hooks.
    pub fn with_column_hooks<V, F>(
        self,
        extract: F,
        header: impl Into<String>,
        hooks: SpecColumnHooks<T>,
    ) -> Self
    where
        V: Into<EnumCellValue>,
        F: Fn(&T) -> V + 'static,
    {
        self.with_column_spec(SpecXlsxColumn::new(extract, header).with_hooks(hooks))
    }

    /// Append a prepared column.
    pub fn with_column_spec(mut self, column: SpecXlsxColumn<T>) -> Self {
        self.columns.push(column);
        self
    }

    /// Append a merged title row above the headers.
    pub fn with_title(mut self, text: impl Into<String>) -> Self {
        self.titles.push(SpecXlsxTitleRow {
            text: text.into(),
            configure_title: None,
        });
        self
    }

    /// Append a merged title row with a hook for its range.
    pub fn with_title_hook(
        mut self,
        text: impl Into<String>,
        f: impl Fn(&mut XlsxCellRange) + 'static,
    ) -> Self {
        self.titles.push(SpecXlsxTitleRow {
            text: text.into(),
            configure_title: Some(Rc::new(f)),
        });
        self
    }

    ////////////////////////////////////////////////////////////////////////////
    // Sheet-level hooks and options

    pub fn with_configure_column(mut self, f: impl Fn(&mut XlsxColumnRange) + 'static) -> Self {
        self.hooks.configure_column = Some(Rc::new(f));
        self
    }

    pub fn with_configure_header(mut self, f: impl Fn(&mut XlsxCellRange) + 'static) -> Self {
        self.hooks.configure_header = Some(Rc::new(f));
        self
    }

    /// Replaces the default auto-filter on the header row.
    pub fn with_configure_header_row(mut self, f: impl Fn(&mut XlsxCellRange) + 'static) -> Self {
        self.hooks.configure_header_row = Some(Rc::new(f));
        self
    }

    pub fn with_configure_cell(mut self, f: impl Fn(&mut XlsxCellRange, &T) + 'static) -> Self {
        self.hooks.configure_cell = Some(Rc::new(f));
        self
    }

    /// Replace all sheet-level hooks.
    pub fn with_sheet_hooks(mut self, hooks: SpecSheetHooks<T>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Replace the write options of the whole chain.
    ///
    /// Applies to this sheet and every later one; earlier sheets are already rendered.
    pub fn with_write_options(mut self, write_options: SpecXlsxWriteOptions) -> Self {
        self.context.set_write_options(write_options);
        self
    }

    ////////////////////////////////////////////////////////////////////////////
    // Chaining

    /// Render this sheet, then start the next one in the same workbook.
    ///
    /// The new sheet inherits this sheet's column, header and header-row hooks.
    pub fn next_worksheet<U: Describable>(
        self,
        rows: Vec<U>,
        name: impl Into<String>,
    ) -> BuildResult<XlsxWorksheetBuilder<U>> {
        self.chain_into(
            rows,
            name.into(),
            SpecSheetHooks::new(),
            Some(auto_generate_columns::<U>),
        )
    }

    /// Like [`Self::next_worksheet`]; hooks left unset in `hooks` are inherited.
    pub fn next_worksheet_with_hooks<U: Describable>(
        self,
        rows: Vec<U>,
        name: impl Into<String>,
        hooks: SpecSheetHooks<U>,
    ) -> BuildResult<XlsxWorksheetBuilder<U>> {
        self.chain_into(rows, name.into(), hooks, Some(auto_generate_columns::<U>))
    }

    /// Like [`Self::next_worksheet`] for a row type without field description.
    pub fn next_worksheet_mapped<U>(
        self,
        rows: Vec<U>,
        name: impl Into<String>,
    ) -> BuildResult<XlsxWorksheetBuilder<U>> {
        self.chain_into(rows, name.into(), SpecSheetHooks::new(), None)
    }

    fn chain_into<U>(
        mut self,
        rows: Vec<U>,
        name: String,
        hooks: SpecSheetHooks<U>,
        fn_auto_columns: Option<FnAutoColumns<U>>,
    ) -> BuildResult<XlsxWorksheetBuilder<U>> {
        self.append_worksheet()?;
        trace!("worksheet {:?} inherits hooks from {:?}", name, self.name);
        let hooks = hooks.inherit_from(&self.hooks);
        Ok(XlsxWorksheetBuilder::from_parts(
            name,
            self.context,
            rows,
            hooks,
            fn_auto_columns,
        ))
    }

    ////////////////////////////////////////////////////////////////////////////
    // Serialization

    /// Render this sheet and hand the live workbook to the caller.
    pub fn to_package(mut self) -> BuildResult<Workbook> {
        self.append_worksheet()?;
        Ok(self.context.into_workbook())
    }

    /// Render this sheet, encode the workbook to XLSX bytes and release it.
    pub fn to_xlsx(mut self) -> BuildResult<Vec<u8>> {
        self.append_worksheet()?;
        self.context.encode()
    }

    ////////////////////////////////////////////////////////////////////////////
    // Rendering

    /// Render this definition into a new worksheet of the shared workbook.
    ///
    /// Not idempotent: a second call adds another worksheet with the same
    /// name and content. Order: titles, header cells, header row, data
    /// cells, columns. Sheet-level hooks run before column-level ones.
    pub fn append_worksheet(&mut self) -> BuildResult<()> {
        let Self {
            name,
            context,
            rows,
            columns,
            titles,
            hooks,
            fn_auto_columns,
        } = self;

        let write_options = context.write_options().clone();
        let worksheet = context.ensure_workbook().add_worksheet();
        worksheet.set_name(name.as_str())?;

        if columns.is_empty()
            && let Some(fn_auto) = *fn_auto_columns
        {
            *columns = fn_auto();
            trace!("worksheet {:?}: generated {} columns", name, columns.len());
        }
        if columns.is_empty() {
            return Err(EnumBuildError::NoColumns {
                sheet: name.clone(),
            });
        }

        let n_cols = columns.len();
        let n_rows_total = titles.len() + 1 + rows.len();
        if n_rows_total > N_NROWS_EXCEL_MAX || n_cols > N_NCOLS_EXCEL_MAX {
            return Err(EnumBuildError::SheetTooLarge {
                sheet: name.clone(),
                rows: n_rows_total,
                cols: n_cols,
            });
        }

        debug!(
            "rendering worksheet {:?}: {} titles, {} columns, {} rows",
            name,
            titles.len(),
            n_cols,
            rows.len()
        );

        let n_col_last = n_cols - 1;
        let mut l_width_by_col = vec![0usize; n_cols];

        for (n_idx_title, title) in titles.iter().enumerate() {
            let mut range = XlsxCellRange::new_row_span(
                n_idx_title,
                0,
                n_col_last,
                Some(EnumCellValue::String(title.text.clone())),
            );
            range.set_merged(true);
            if let Some(hook) = &title.configure_title {
                hook(&mut range);
            }
            write_range(worksheet, &range, &write_options)?;
        }

        let n_row_header = titles.len();
        write_header(
            worksheet,
            n_row_header,
            columns,
            hooks,
            &mut l_width_by_col,
            &write_options,
        )?;

        let n_row_data_first = n_row_header + 1;
        for (n_idx_row, row) in rows.iter().enumerate() {
            for (n_idx_col, column) in columns.iter().enumerate() {
                let value = (column.extract)(row).map_err(|message| EnumBuildError::Extract {
                    sheet: name.clone(),
                    row: n_idx_row,
                    header: column.header.clone(),
                    message,
                })?;

                let mut cell =
                    XlsxCellRange::new_cell(n_row_data_first + n_idx_row, n_idx_col, value);
                if let Some(hook) = &hooks.configure_cell {
                    hook(&mut cell, row);
                }
                if let Some(hook) = &column.hooks.configure_cell {
                    hook(&mut cell, row);
                }

                record_width(&mut l_width_by_col[n_idx_col], &cell);
                write_range(worksheet, &cell, &write_options)?;
            }
        }

        for (n_idx_col, column) in columns.iter().enumerate() {
            let mut column_range = XlsxColumnRange::new(n_idx_col);
            if let Some(hook) = &hooks.configure_column {
                hook(&mut column_range);
            }
            if let Some(hook) = &column.hooks.configure_column {
                hook(&mut column_range);
            }
            write_column(
                worksheet,
                &column_range,
                l_width_by_col[n_idx_col],
                &write_options.policy_autofit,
            )?;
        }

        context.mark_sheet_rendered();
        debug!("rendered worksheet {:?}", name);
        Ok(())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellWriting

fn write_header<T>(
    worksheet: &mut Worksheet,
    n_row_header: usize,
    columns: &[SpecXlsxColumn<T>],
    hooks: &SpecSheetHooks<T>,
    l_width_by_col: &mut [usize],
    write_options: &SpecXlsxWriteOptions,
) -> BuildResult<()> {
    let mut l_header_cells = Vec::with_capacity(columns.len());
    for (n_idx_col, column) in columns.iter().enumerate() {
        let mut cell = XlsxCellRange::new_cell(
            n_row_header,
            n_idx_col,
            EnumCellValue::String(column.header.clone()),
        );
        if let Some(hook) = &hooks.configure_header {
            hook(&mut cell);
        }
        if let Some(hook) = &column.hooks.configure_header {
            hook(&mut cell);
        }
        l_header_cells.push(cell);
    }

    let mut header_row =
        XlsxCellRange::new_row_span(n_row_header, 0, columns.len().saturating_sub(1), None);
    match &hooks.configure_header_row {
        Some(hook) => hook(&mut header_row),
        None => header_row.set_auto_filter(true),
    }

    let value_anchor = l_header_cells
        .first()
        .and_then(|cell| cell.value.clone())
        .unwrap_or_default();

    for mut cell in l_header_cells {
        cell.patch_format(&header_row.format);
        if let Some(value) = &header_row.value {
            cell.value = Some(value.clone());
        }
        record_width(&mut l_width_by_col[cell.n_col_first], &cell);
        write_range(worksheet, &cell, write_options)?;
    }

    if header_row.is_merged() && !header_row.is_single_cell() {
        if header_row.value.is_none() {
            header_row.value = Some(value_anchor);
        }
        write_range(worksheet, &header_row, write_options)?;
    } else {
        apply_auto_filter(worksheet, &header_row)?;
    }

    Ok(())
}

/// Write a staged range: merged ranges carry the value in the anchor cell,
/// unmerged ranges repeat it in every cell.
fn write_range(
    worksheet: &mut Worksheet,
    range: &XlsxCellRange,
    write_options: &SpecXlsxWriteOptions,
) -> BuildResult<()> {
    let value = range.value.clone().unwrap_or_default();
    let format = derive_rust_xlsx_format(&derive_effective_format(
        &value,
        &range.format,
        write_options,
    ));

    if range.is_merged() && !range.is_single_cell() {
        let c_text = match &value {
            EnumCellValue::String(val) => val.as_str(),
            _ => "",
        };
        worksheet.merge_range(
            cast_row_num(range.n_row_first)?,
            cast_col_num(range.n_col_first)?,
            cast_row_num(range.n_row_last)?,
            cast_col_num(range.n_col_last)?,
            c_text,
            &format,
        )?;
        if !value.is_none() && !matches!(value, EnumCellValue::String(_)) {
            write_cell_with_format(
                worksheet,
                range.n_row_first,
                range.n_col_first,
                &value,
                &format,
            )?;
        }
    } else {
        for n_row in range.n_row_first..=range.n_row_last {
            for n_col in range.n_col_first..=range.n_col_last {
                write_cell_with_format(worksheet, n_row, n_col, &value, &format)?;
            }
        }
    }

    apply_auto_filter(worksheet, range)
}

fn apply_auto_filter(worksheet: &mut Worksheet, range: &XlsxCellRange) -> BuildResult<()> {
    if !range.is_auto_filter() {
        return Ok(());
    }
    worksheet.autofilter(
        cast_row_num(range.n_row_first)?,
        cast_col_num(range.n_col_first)?,
        cast_row_num(range.n_row_last)?,
        cast_col_num(range.n_col_last)?,
    )?;
    Ok(())
}

/// Dates without an explicit number format get the configured default.
fn derive_effective_format(
    value: &EnumCellValue,
    format: &SpecCellFormat,
    write_options: &SpecXlsxWriteOptions,
) -> SpecCellFormat {
    let num_format_default = match value {
        EnumCellValue::Date(_) => &write_options.num_format_date,
        EnumCellValue::DateTime(_) => &write_options.num_format_datetime,
        _ => return format.clone(),
    };
    if format.num_format.is_some() {
        return format.clone();
    }
    format.with_(SpecCellFormat {
        num_format: Some(num_format_default.clone()),
        ..Default::default()
    })
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: &Format,
) -> BuildResult<()> {
    let n_row = cast_row_num(row_idx)?;
    let n_col = cast_col_num(col_idx)?;
    match value {
        EnumCellValue::None => {
            worksheet.write_blank(n_row, n_col, format)?;
        }
        EnumCellValue::String(val) => {
            worksheet.write_string_with_format(n_row, n_col, val, format)?;
        }
        EnumCellValue::Number(val) => {
            worksheet.write_number_with_format(n_row, n_col, *val, format)?;
        }
        EnumCellValue::Boolean(val) => {
            worksheet.write_boolean_with_format(n_row, n_col, *val, format)?;
        }
        EnumCellValue::Date(val) => {
            worksheet.write_datetime_with_format(n_row, n_col, val, format)?;
        }
        EnumCellValue::DateTime(val) => {
            worksheet.write_datetime_with_format(n_row, n_col, val, format)?;
        }
    }
    Ok(())
}

fn record_width(n_width: &mut usize, cell: &XlsxCellRange) {
    if let Some(value) = &cell.value {
        *n_width = usize::max(*n_width, estimate_width_len(value));
    }
}

fn write_column(
    worksheet: &mut Worksheet,
    column: &XlsxColumnRange,
    n_width_recorded: usize,
    policy_autofit: &SpecAutofitCellsPolicy,
) -> BuildResult<()> {
    let n_col = cast_col_num(column.n_col)?;

    if column.is_autofit() {
        let n_min = usize::max(1, policy_autofit.width_cell_min);
        let n_max = usize::min(255, usize::max(n_min, policy_autofit.width_cell_max));
        let n_width_final = usize::min(
            n_max,
            usize::max(n_min, n_width_recorded + policy_autofit.width_cell_padding),
        );
        worksheet.set_column_width(n_col, n_width_final as f64)?;
    } else if let Some(width) = column.width() {
        worksheet.set_column_width(n_col, width)?;
    }

    if !column.format.is_empty() {
        worksheet.set_column_format(n_col, &derive_rust_xlsx_format(&column.format))?;
    }
    if column.is_hidden() {
        worksheet.set_column_hidden(n_col)?;
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io::Cursor;

    use calamine::{Reader, Xlsx, open_workbook_from_rs};

    use super::*;

    crate::describable! {
        #[derive(Debug, Clone)]
        pub struct Person {
            pub name: String,
            pub age: u32,
        }
    }

    struct Opaque {
        id: u32,
    }

    fn people() -> Vec<Person> {
        vec![
            Person {
                name: "Al".to_string(),
                age: 3,
            },
            Person {
                name: "Bo".to_string(),
                age: 5,
            },
        ]
    }

    fn new_log() -> Rc<RefCell<Vec<String>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn test_hooks_run_sheet_level_first_for_every_cell() {
        let log = new_log();
        let (log_sheet, log_col) = (log.clone(), log.clone());

        let builder = to_worksheet(people(), "People")
            .with_configure_cell(move |cell, person: &Person| {
                log_sheet
                    .borrow_mut()
                    .push(format!("sheet {}:{} {}", cell.row(), cell.col(), person.name));
            })
            .with_column_hooks(
                |p: &Person| p.name.clone(),
                "name",
                SpecColumnHooks::new().with_configure_cell(move |cell, person: &Person| {
                    log_col
                        .borrow_mut()
                        .push(format!("column {}:{} {}", cell.row(), cell.col(), person.name));
                }),
            );
        builder.to_package().unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["sheet 2:1 Al", "column 2:1 Al", "sheet 3:1 Bo", "column 3:1 Bo"]
        );
    }

    #[test]
    fn test_header_and_column_hook_order() {
        let log = new_log();
        let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
        let (l4, l5) = (log.clone(), log.clone());

        to_worksheet(people(), "People")
            .with_configure_header(move |cell| {
                l1.borrow_mut().push(format!("sheet header {}", cell.col()))
            })
            .with_configure_header_row(move |row| {
                l2.borrow_mut()
                    .push(format!("header row {}:{}-{}", row.row(), row.col(), row.col_last()))
            })
            .with_configure_column(move |column| {
                l3.borrow_mut().push(format!("sheet column {}", column.col()))
            })
            .with_column_hooks(
                |p: &Person| p.age,
                "age",
                SpecColumnHooks::new()
                    .with_configure_header(move |cell| {
                        l4.borrow_mut().push(format!("column header {}", cell.col()))
                    })
                    .with_configure_column(move |column| {
                        l5.borrow_mut().push(format!("column column {}", column.col()))
                    }),
            )
            .with_column(|p: &Person| p.name.clone(), "name")
            .to_package()
            .unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                "sheet header 1",
                "column header 1",
                "sheet header 2",
                "header row 1:1-2",
                "sheet column 1",
                "column column 1",
                "sheet column 2",
            ]
        );
    }

    #[test]
    fn test_titles_shift_header_and_data_rows() {
        let log = new_log();
        let (l_title, l_header, l_cell) = (log.clone(), log.clone(), log.clone());

        to_worksheet(people(), "People")
            .with_title_hook("Report", move |range| {
                l_title.borrow_mut().push(format!(
                    "title {} merged={} {}-{}",
                    range.row(),
                    range.is_merged(),
                    range.col(),
                    range.col_last()
                ))
            })
            .with_title("Subtitle")
            .with_configure_header(move |cell| {
                l_header.borrow_mut().push(format!("header {}", cell.row()))
            })
            .with_configure_cell(move |cell, _| {
                l_cell.borrow_mut().push(format!("cell {}", cell.row()))
            })
            .to_package()
            .unwrap();

        // 2 titles: header on row 3, data from row 4
        assert_eq!(
            *log.borrow(),
            vec![
                "title 1 merged=true 1-2",
                "header 3",
                "header 3",
                "cell 4",
                "cell 4",
                "cell 5",
                "cell 5",
            ]
        );
    }

    #[test]
    fn test_cell_hook_sees_extracted_value() {
        let seen = new_log();
        let seen_hook = seen.clone();

        to_worksheet(people(), "People")
            .with_configure_cell(move |cell, _| {
                seen_hook
                    .borrow_mut()
                    .push(cell.value().map(ToString::to_string).unwrap_or_default());
                if cell.col() == 2 {
                    cell.set_num_format("0.0");
                }
            })
            .to_package()
            .unwrap();

        assert_eq!(*seen.borrow(), vec!["Al", "3", "Bo", "5"]);
    }

    #[test]
    fn test_append_twice_duplicates_the_sheet() {
        let log = new_log();
        let (log_header, log_cell) = (log.clone(), log.clone());

        let mut builder = to_worksheet(people(), "People")
            .with_configure_header(move |cell| {
                log_header.borrow_mut().push(format!("header {}", cell.col()));
            })
            .with_configure_cell(move |cell, _: &Person| {
                log_cell.borrow_mut().push(format!("cell {}", cell.col()));
            });
        builder.append_worksheet().unwrap();
        builder.append_worksheet().unwrap();
        assert_eq!(builder.context().sheets_rendered(), 2);

        let mut workbook = builder.to_package().unwrap();
        let l_calls = log.borrow();
        assert_eq!(l_calls.iter().filter(|c| c.starts_with("header")).count(), 3 * 2);
        assert_eq!(l_calls.iter().filter(|c| c.starts_with("cell")).count(), 3 * 2 * 2);

        for n_idx in 0..3 {
            let worksheet = workbook.worksheet_from_index(n_idx).unwrap();
            assert_eq!(worksheet.name(), "People");
            // distinct names so the copies can be encoded and compared
            worksheet.set_name(format!("People{n_idx}")).unwrap();
        }
        let v_bytes = workbook.save_to_buffer().unwrap();
        let mut reader: Xlsx<_> = open_workbook_from_rs(Cursor::new(v_bytes)).unwrap();
        let l_grids: Vec<Vec<Vec<String>>> = (0..3)
            .map(|n_idx| {
                let range = reader.worksheet_range(&format!("People{n_idx}")).unwrap();
                range
                    .rows()
                    .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                    .collect()
            })
            .collect();
        assert_eq!(l_grids[0], vec![vec!["name", "age"], vec!["Al", "3"], vec!["Bo", "5"]]);
        assert_eq!(l_grids[1], l_grids[0]);
        assert_eq!(l_grids[2], l_grids[0]);
    }

    #[test]
    fn test_next_worksheet_renders_previous_first_and_inherits_hooks() {
        let log = new_log();
        let l_header = log.clone();

        let first = to_worksheet(people(), "First")
            .with_configure_header(move |cell| {
                l_header.borrow_mut().push(format!("header {}", cell.col()))
            })
            .with_configure_cell(|cell, _| cell.set_bold());
        assert!(!first.context().has_workbook());

        let second = first.next_worksheet(Vec::<Person>::new(), "Second").unwrap();
        assert_eq!(second.context().sheets_rendered(), 1);
        assert!(second.hooks().configure_header.is_some());
        assert!(second.hooks().configure_cell.is_none());

        let mut workbook = second.to_package().unwrap();
        assert_eq!(workbook.worksheet_from_index(0).unwrap().name(), "First");
        assert_eq!(workbook.worksheet_from_index(1).unwrap().name(), "Second");
        assert_eq!(*log.borrow(), vec!["header 1", "header 2", "header 1", "header 2"]);
    }

    #[test]
    fn test_own_hooks_override_inherited_ones() {
        let log = new_log();
        let (l_first, l_second) = (log.clone(), log.clone());

        to_worksheet(people(), "First")
            .with_configure_header_row(move |_| l_first.borrow_mut().push("first".to_string()))
            .next_worksheet_with_hooks(
                people(),
                "Second",
                SpecSheetHooks::new().with_configure_header_row(move |_| {
                    l_second.borrow_mut().push("second".to_string())
                }),
            )
            .unwrap()
            .to_package()
            .unwrap();

        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_mapped_rows_without_columns_fail() {
        let err = XlsxWorksheetBuilder::new(vec![Opaque { id: 1 }], "Opaque")
            .to_xlsx()
            .unwrap_err();
        assert!(matches!(err, EnumBuildError::NoColumns { ref sheet } if sheet == "Opaque"));

        let v_bytes = XlsxWorksheetBuilder::new(vec![Opaque { id: 1 }], "Opaque")
            .with_column(|o: &Opaque| o.id, "id")
            .to_xlsx()
            .unwrap();
        assert!(!v_bytes.is_empty());
    }

    #[test]
    fn test_extractor_failure_aborts_render() {
        let err = to_worksheet(people(), "People")
            .with_column(|p: &Person| p.name.clone(), "name")
            .with_column_try(
                |p: &Person| {
                    if p.age > 4 {
                        Err(format!("age {} out of range", p.age))
                    } else {
                        Ok(p.age)
                    }
                },
                "age",
            )
            .to_xlsx()
            .unwrap_err();

        match err {
            EnumBuildError::Extract {
                sheet,
                row,
                header,
                message,
            } => {
                assert_eq!(sheet, "People");
                assert_eq!(row, 1);
                assert_eq!(header, "age");
                assert_eq!(message, "age 5 out of range");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_sheet_name_is_reported_by_host_library() {
        let err = to_worksheet(people(), "bad[name]").to_xlsx().unwrap_err();
        assert!(matches!(err, EnumBuildError::Xlsx(_)));
    }

    #[test]
    fn test_rows_shortcut_names_sheet_after_type() {
        let mut workbook = to_package_from_rows(people()).unwrap();
        assert_eq!(workbook.worksheet_from_index(0).unwrap().name(), "Person");
    }

    #[test]
    fn test_effective_format_defaults_date_number_format() {
        let write_options = SpecXlsxWriteOptions::default();
        let date = EnumCellValue::Date(chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());

        let fmt_default =
            derive_effective_format(&date, &SpecCellFormat::default(), &write_options);
        assert_eq!(fmt_default.num_format.as_deref(), Some("yyyy-mm-dd"));

        let fmt_explicit = SpecCellFormat {
            num_format: Some("dd/mm/yyyy".to_string()),
            ..Default::default()
        };
        let fmt_kept = derive_effective_format(&date, &fmt_explicit, &write_options);
        assert_eq!(fmt_kept.num_format.as_deref(), Some("dd/mm/yyyy"));

        let fmt_text = derive_effective_format(
            &EnumCellValue::from("x"),
            &SpecCellFormat::default(),
            &write_options,
        );
        assert!(fmt_text.is_empty());
    }
}
