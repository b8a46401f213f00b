//! Shared XLSX specification models.

use std::fmt;
use std::rc::Rc;

use chrono::{NaiveDate, NaiveDateTime};

use crate::conf::{C_NUM_FORMAT_DATE, C_NUM_FORMAT_DATETIME, derive_default_autofit_policy};
use crate::range::{XlsxCellRange, XlsxColumnRange};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification, translated to `rust_xlsxwriter::Format` at write time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Italic style.
    pub italic: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,
    /// Text wrap.
    pub text_wrap: Option<bool>,

    /// Top border override.
    pub top: Option<i64>,
    /// Bottom border override.
    pub bottom: Option<i64>,
    /// Left border override.
    pub left: Option<i64>,
    /// Right border override.
    pub right: Option<i64>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color.
    pub bg_color: Option<String>,
    /// Font color.
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            text_wrap: other.text_wrap.or(self.text_wrap),
            top: other.top.or(self.top),
            bottom: other.bottom.or(self.bottom),
            left: other.left.or(self.left),
            right: other.right.or(self.right),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }

    /// True when no property is set.
    pub fn is_empty(&self) -> bool {
        *self == SpecCellFormat::default()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellValueSpecification

/// Scalar cell value produced by a column extractor.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EnumCellValue {
    /// Missing/blank value.
    #[default]
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Boolean value.
    Boolean(bool),
    /// Calendar date, written as an Excel serial date.
    Date(NaiveDate),
    /// Date and time, written as an Excel serial date-time.
    DateTime(NaiveDateTime),
}

impl EnumCellValue {
    /// True for [`EnumCellValue::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, EnumCellValue::None)
    }
}

impl fmt::Display for EnumCellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumCellValue::None => Ok(()),
            EnumCellValue::String(val) => f.write_str(val),
            EnumCellValue::Number(val) => write!(f, "{val}"),
            EnumCellValue::Boolean(val) => f.write_str(if *val { "TRUE" } else { "FALSE" }),
            EnumCellValue::Date(val) => write!(f, "{}", val.format("%Y-%m-%d")),
            EnumCellValue::DateTime(val) => write!(f, "{}", val.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<String> for EnumCellValue {
    fn from(value: String) -> Self {
        EnumCellValue::String(value)
    }
}

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        EnumCellValue::String(value.to_string())
    }
}

impl From<bool> for EnumCellValue {
    fn from(value: bool) -> Self {
        EnumCellValue::Boolean(value)
    }
}

impl From<NaiveDate> for EnumCellValue {
    fn from(value: NaiveDate) -> Self {
        EnumCellValue::Date(value)
    }
}

impl From<NaiveDateTime> for EnumCellValue {
    fn from(value: NaiveDateTime) -> Self {
        EnumCellValue::DateTime(value)
    }
}

impl<V: Into<EnumCellValue>> From<Option<V>> for EnumCellValue {
    fn from(value: Option<V>) -> Self {
        value.map_or(EnumCellValue::None, Into::into)
    }
}

macro_rules! impl_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for EnumCellValue {
                fn from(value: $ty) -> Self {
                    EnumCellValue::Number(value as f64)
                }
            }
        )*
    };
}

impl_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region HookSpecification

/// Column-wide hook, run once per column after all data cells are written.
pub type FnConfigureColumn = Rc<dyn Fn(&mut XlsxColumnRange)>;
/// Range hook used for titles, header cells and the header row.
pub type FnConfigureRange = Rc<dyn Fn(&mut XlsxCellRange)>;
/// Data-cell hook; receives the source row alongside the staged cell.
pub type FnConfigureCell<T> = Rc<dyn Fn(&mut XlsxCellRange, &T)>;
/// Row-to-value extractor. `Err` aborts the render.
pub type FnExtractValue<T> = Rc<dyn Fn(&T) -> Result<EnumCellValue, String>>;

/// Hooks attached to one column.
///
/// Each one runs after the sheet-level hook of the same kind.
pub struct SpecColumnHooks<T> {
    /// Applied to the whole column.
    pub configure_column: Option<FnConfigureColumn>,
    /// Applied to the column's header cell.
    pub configure_header: Option<FnConfigureRange>,
    /// Applied to every data cell of the column.
    pub configure_cell: Option<FnConfigureCell<T>>,
}

impl<T> SpecColumnHooks<T> {
    pub fn new() -> Self {
        Self {
            configure_column: None,
            configure_header: None,
            configure_cell: None,
        }
    }

    pub fn with_configure_column(mut self, f: impl Fn(&mut XlsxColumnRange) + 'static) -> Self {
        self.configure_column = Some(Rc::new(f));
        self
    }

    pub fn with_configure_header(mut self, f: impl Fn(&mut XlsxCellRange) + 'static) -> Self {
        self.configure_header = Some(Rc::new(f));
        self
    }

    pub fn with_configure_cell(mut self, f: impl Fn(&mut XlsxCellRange, &T) + 'static) -> Self {
        self.configure_cell = Some(Rc::new(f));
        self
    }
}

impl<T> Default for SpecColumnHooks<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for SpecColumnHooks<T> {
    fn clone(&self) -> Self {
        Self {
            configure_column: self.configure_column.clone(),
            configure_header: self.configure_header.clone(),
            configure_cell: self.configure_cell.clone(),
        }
    }
}

/// Sheet-level hooks, run before the matching column-level hook.
pub struct SpecSheetHooks<T> {
    /// Applied to every column.
    pub configure_column: Option<FnConfigureColumn>,
    /// Applied to every header cell.
    pub configure_header: Option<FnConfigureRange>,
    /// Applied to the full header row; when unset the row gets an auto-filter.
    pub configure_header_row: Option<FnConfigureRange>,
    /// Applied to every data cell.
    pub configure_cell: Option<FnConfigureCell<T>>,
}

impl<T> SpecSheetHooks<T> {
    pub fn new() -> Self {
        Self {
            configure_column: None,
            configure_header: None,
            configure_header_row: None,
            configure_cell: None,
        }
    }

    pub fn with_configure_column(mut self, f: impl Fn(&mut XlsxColumnRange) + 'static) -> Self {
        self.configure_column = Some(Rc::new(f));
        self
    }

    pub fn with_configure_header(mut self, f: impl Fn(&mut XlsxCellRange) + 'static) -> Self {
        self.configure_header = Some(Rc::new(f));
        self
    }

    pub fn with_configure_header_row(mut self, f: impl Fn(&mut XlsxCellRange) + 'static) -> Self {
        self.configure_header_row = Some(Rc::new(f));
        self
    }

    pub fn with_configure_cell(mut self, f: impl Fn(&mut XlsxCellRange, &T) + 'static) -> Self {
        self.configure_cell = Some(Rc::new(f));
        self
    }

    /// Fill unset sheet-wide hooks from a previous sheet.
    ///
    /// `configure_cell` is typed by row and never inherited.
    pub fn inherit_from<K>(mut self, previous: &SpecSheetHooks<K>) -> Self {
        if self.configure_column.is_none() {
            self.configure_column = previous.configure_column.clone();
        }
        if self.configure_header.is_none() {
            self.configure_header = previous.configure_header.clone();
        }
        if self.configure_header_row.is_none() {
            self.configure_header_row = previous.configure_header_row.clone();
        }
        self
    }
}

impl<T> Default for SpecSheetHooks<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for SpecSheetHooks<T> {
    fn clone(&self) -> Self {
        Self {
            configure_column: self.configure_column.clone(),
            configure_header: self.configure_header.clone(),
            configure_header_row: self.configure_header_row.clone(),
            configure_cell: self.configure_cell.clone(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnSpecification

/// One column mapping: extractor, header text and column-level hooks.
pub struct SpecXlsxColumn<T> {
    /// Row-to-value extractor.
    pub extract: FnExtractValue<T>,
    /// Header text.
    pub header: String,
    /// Column-level hooks.
    pub hooks: SpecColumnHooks<T>,
}

impl<T> SpecXlsxColumn<T> {
    /// Build a column from an infallible extractor.
    pub fn new<V, F>(extract: F, header: impl Into<String>) -> Self
    where
        V: Into<EnumCellValue>,
        F: Fn(&T) -> V + 'static,
    {
        Self {
            extract: Rc::new(move |row: &T| Ok(extract(row).into())),
            header: header.into(),
            hooks: SpecColumnHooks::new(),
        }
    }

    /// Build a column from a fallible extractor.
    pub fn new_try<V, E, F>(extract: F, header: impl Into<String>) -> Self
    where
        V: Into<EnumCellValue>,
        E: fmt::Display,
        F: Fn(&T) -> Result<V, E> + 'static,
    {
        Self {
            extract: Rc::new(move |row: &T| {
                extract(row).map(Into::into).map_err(|err| err.to_string())
            }),
            header: header.into(),
            hooks: SpecColumnHooks::new(),
        }
    }

    /// Replace column-level hooks.
    pub fn with_hooks(mut self, hooks: SpecColumnHooks<T>) -> Self {
        self.hooks = hooks;
        self
    }
}

impl<T> Clone for SpecXlsxColumn<T> {
    fn clone(&self) -> Self {
        Self {
            extract: self.extract.clone(),
            header: self.header.clone(),
            hooks: self.hooks.clone(),
        }
    }
}

/// Merged banner row rendered above the header row.
#[derive(Clone)]
pub struct SpecXlsxTitleRow {
    /// Title text.
    pub text: String,
    /// Optional hook applied to the merged title range.
    pub configure_title: Option<FnConfigureRange>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Width bounds for auto-fit columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAutofitCellsPolicy {
    /// Minimum final width.
    pub width_cell_min: usize,
    /// Maximum final width.
    pub width_cell_max: usize,
    /// Width padding added after inference.
    pub width_cell_padding: usize,
}

impl Default for SpecAutofitCellsPolicy {
    fn default() -> Self {
        derive_default_autofit_policy()
    }
}

/// Workbook-wide options shared by every sheet of a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxWriteOptions {
    /// Auto-fit width bounds.
    pub policy_autofit: SpecAutofitCellsPolicy,
    /// Number format for date cells without an explicit one.
    pub num_format_date: String,
    /// Number format for date-time cells without an explicit one.
    pub num_format_datetime: String,
}

impl Default for SpecXlsxWriteOptions {
    fn default() -> Self {
        Self {
            policy_autofit: SpecAutofitCellsPolicy::default(),
            num_format_date: C_NUM_FORMAT_DATE.to_string(),
            num_format_datetime: C_NUM_FORMAT_DATETIME.to_string(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
