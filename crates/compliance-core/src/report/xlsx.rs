//! XLSX rendering of a [`ReportLayout`].

use std::collections::HashMap;
use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, XlsxError};

use super::{CellStyle, CellValue, ReportLayout};
use crate::domain::{ComplianceError, Result};

const FONT_SIZE: f64 = 10.0;

/// Write `layout` as a workbook at `path`, one worksheet per sheet.
pub fn write_xlsx(path: &Path, layout: &ReportLayout, font_name: &str) -> Result<()> {
    let to_write_error = |e: XlsxError| ComplianceError::FileWrite {
        path: path.to_path_buf(),
        detail: e.to_string(),
    };

    let mut formats = FormatCache::new(font_name);
    let header = formats.get(CellStyle::header());
    let mut workbook = Workbook::new();

    for sheet in &layout.sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name).map_err(to_write_error)?;

        for (col, column) in sheet.columns.iter().enumerate() {
            let col = col as u16;
            worksheet
                .set_column_width(col, column.width)
                .map_err(to_write_error)?;
            worksheet
                .write_string_with_format(0, col, &column.title, &header)
                .map_err(to_write_error)?;
        }

        for (r, row) in sheet.rows.iter().enumerate() {
            let row_num = (r + 1) as u32;
            for (c, cell) in row.iter().enumerate() {
                let format = formats.get(cell.style);
                let written = match &cell.value {
                    CellValue::Text(text) => {
                        worksheet.write_string_with_format(row_num, c as u16, text, &format)
                    }
                    CellValue::Number(n) => {
                        worksheet.write_number_with_format(row_num, c as u16, *n, &format)
                    }
                };
                written.map_err(to_write_error)?;
            }
        }
    }

    workbook.save(path).map_err(to_write_error)?;
    Ok(())
}

/// Builds each distinct cell style into an xlsx [`Format`] once.
struct FormatCache {
    font_name: String,
    formats: HashMap<CellStyle, Format>,
}

impl FormatCache {
    fn new(font_name: &str) -> Self {
        Self {
            font_name: font_name.to_string(),
            formats: HashMap::new(),
        }
    }

    fn get(&mut self, style: CellStyle) -> Format {
        let font_name = &self.font_name;
        self.formats
            .entry(style)
            .or_insert_with(|| build_format(&style, font_name))
            .clone()
    }
}

fn build_format(style: &CellStyle, font_name: &str) -> Format {
    let mut format = Format::new()
        .set_font_name(font_name)
        .set_font_size(FONT_SIZE)
        .set_border(FormatBorder::Thin)
        .set_text_wrap()
        .set_align(FormatAlign::Left)
        .set_align(FormatAlign::Top);
    if style.bold {
        format = format.set_bold();
    }
    if let Some(rgb) = style.fill {
        format = format.set_background_color(Color::RGB(rgb));
    }
    if let Some(rgb) = style.font_color {
        format = format.set_font_color(Color::RGB(rgb));
    }
    format
}
