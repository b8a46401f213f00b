//! Shared helpers: decode workbook bytes with calamine, or read raw sheet XML.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::{Cursor, Read};

use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
use regex::Regex;
use zip::ZipArchive;

toxlsx::describable! {
    #[derive(Debug, Clone)]
    pub struct Person {
        pub name: String,
        pub age: u32,
    }
}

pub fn people() -> Vec<Person> {
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

pub fn open(v_bytes: &[u8]) -> Xlsx<Cursor<Vec<u8>>> {
    open_workbook_from_rs(Cursor::new(v_bytes.to_vec())).expect("decodable xlsx")
}

pub fn sheet_names(v_bytes: &[u8]) -> Vec<String> {
    open(v_bytes).sheet_names()
}

/// Cell at 0-based `(row, col)`, absolute to A1.
pub fn read_cell(v_bytes: &[u8], sheet: &str, pos: (u32, u32)) -> Data {
    let range = open(v_bytes).worksheet_range(sheet).expect("sheet exists");
    range.get_value(pos).cloned().unwrap_or(Data::Empty)
}

/// Displayed text of every cell from A1 to the last used cell.
pub fn read_grid(v_bytes: &[u8], sheet: &str) -> Vec<Vec<String>> {
    let range = open(v_bytes).worksheet_range(sheet).expect("sheet exists");
    let Some((n_row_end, n_col_end)) = range.end() else {
        return vec![];
    };

    (0..=n_row_end)
        .map(|n_row| {
            (0..=n_col_end)
                .map(|n_col| {
                    range
                        .get_value((n_row, n_col))
                        .map(ToString::to_string)
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect()
}

pub fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

/// Merged ranges of one sheet as 0-based `((row, col), (row, col))` corners.
pub fn read_merged_regions(v_bytes: &[u8], sheet: &str) -> Vec<((u32, u32), (u32, u32))> {
    let mut workbook = open(v_bytes);
    workbook.load_merged_regions().expect("merged regions");
    workbook
        .merged_regions_by_sheet(sheet)
        .into_iter()
        .map(|(_, _, dims)| (dims.start, dims.end))
        .collect()
}

/// Raw XML of the `n`-th worksheet part (1-based, as stored in the package).
pub fn read_sheet_xml(v_bytes: &[u8], n_sheet: usize) -> String {
    let mut archive = ZipArchive::new(Cursor::new(v_bytes.to_vec())).expect("zip package");
    let mut part = archive
        .by_name(&format!("xl/worksheets/sheet{n_sheet}.xml"))
        .expect("worksheet part");
    let mut c_xml = String::new();
    part.read_to_string(&mut c_xml).expect("utf-8 xml");
    c_xml
}

/// The `ref` of the sheet's `<autoFilter>` element, if any.
pub fn read_auto_filter(c_xml: &str) -> Option<String> {
    let re = Regex::new(r#"<autoFilter ref="([^"]+)""#).expect("pattern");
    re.captures(c_xml).map(|caps| caps[1].to_string())
}

/// Attributes of every `<col>` element keyed by its 1-based `min` column.
pub fn read_col_attrs(c_xml: &str) -> BTreeMap<u32, BTreeMap<String, String>> {
    let re_col = Regex::new(r"<col (.*?)/>").expect("pattern");
    let re_attr = Regex::new(r#"(\w+)="([^"]*)""#).expect("pattern");

    re_col
        .captures_iter(c_xml)
        .map(|caps| {
            let dict_attrs: BTreeMap<String, String> = re_attr
                .captures_iter(&caps[1])
                .map(|attr| (attr[1].to_string(), attr[2].to_string()))
                .collect();
            let n_col = dict_attrs["min"].parse().expect("numeric min");
            (n_col, dict_attrs)
        })
        .collect()
}

/// `width` attribute of a `<col>` element.
pub fn col_width(dict_attrs: &BTreeMap<String, String>) -> f64 {
    dict_attrs["width"].parse().expect("numeric width")
}
