//! XLSX rendering for normalized tables.
//!
//! Every sheet gets the same presentation: a colored, bold, centered and
//! wrapped header row frozen at the top, thin borders around every cell in the
//! table range, and column widths sized to content.

use crate::domain::model::Table;
use crate::utils::error::{ExportError, Result};
use rust_xlsxwriter::{ColNum, Format, FormatAlign, FormatBorder, RowNum, Workbook, Worksheet};
use serde_json::Value;

pub const MAX_COLUMN_WIDTH: f64 = 50.0;
pub const COLUMN_PADDING: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetStyle {
    /// RGB, e.g. `0x0077C8`.
    pub header_color: u32,
}

pub const REQUESTS_STYLE: SheetStyle = SheetStyle {
    header_color: 0x0077C8,
};

pub const QUOTAS_STYLE: SheetStyle = SheetStyle {
    header_color: 0x22C55E,
};

#[derive(Debug, Clone, Copy)]
pub struct Sheet<'a> {
    pub name: &'a str,
    pub table: &'a Table,
    pub style: SheetStyle,
}

struct SheetFormats {
    header: Format,
    cell: Format,
}

impl SheetFormats {
    fn new(style: SheetStyle) -> Self {
        let header = Format::new()
            .set_bold()
            .set_font_size(11)
            .set_font_color(0xFFFFFF)
            .set_background_color(style.header_color)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap()
            .set_border(FormatBorder::Thin);

        let cell = Format::new().set_border(FormatBorder::Thin);

        Self { header, cell }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportRenderer;

impl ReportRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Renders `sheets` in order into workbook bytes. Sheets without rows are
    /// left out; if that leaves nothing, fails with `EmptyReport` instead of
    /// saving a workbook with a default sheet.
    pub fn render(&self, sheets: &[Sheet<'_>]) -> Result<Vec<u8>> {
        if sheets.iter().all(|s| s.table.is_empty()) {
            return Err(ExportError::EmptyReport);
        }

        let mut workbook = Workbook::new();

        for sheet in sheets {
            if sheet.table.is_empty() {
                tracing::debug!("Skipping empty sheet '{}'", sheet.name);
                continue;
            }

            let worksheet = workbook.add_worksheet();
            worksheet.set_name(sheet.name)?;
            self.write_sheet(worksheet, sheet)?;
        }

        Ok(workbook.save_to_buffer()?)
    }

    fn write_sheet(&self, worksheet: &mut Worksheet, sheet: &Sheet<'_>) -> Result<()> {
        let formats = SheetFormats::new(sheet.style);
        let table = sheet.table;

        for (col, name) in table.columns.iter().enumerate() {
            worksheet.write_string_with_format(0, col as ColNum, name, &formats.header)?;
        }

        for (idx, row) in table.rows.iter().enumerate() {
            let row_num = (idx + 1) as RowNum;
            for (col, value) in row.iter().enumerate() {
                write_cell(worksheet, row_num, col as ColNum, value, &formats.cell)?;
            }
        }

        for col in 0..table.columns.len() {
            worksheet.set_column_width(col as ColNum, column_width(table, col))?;
        }

        worksheet.set_freeze_panes(1, 0)?;

        tracing::debug!(
            "Rendered sheet '{}' ({} rows x {} columns)",
            sheet.name,
            table.rows.len(),
            table.columns.len()
        );
        Ok(())
    }
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: RowNum,
    col: ColNum,
    value: &Value,
    format: &Format,
) -> Result<()> {
    match value {
        Value::Null => {
            worksheet.write_blank(row, col, format)?;
        }
        Value::Bool(b) => {
            worksheet.write_boolean_with_format(row, col, *b, format)?;
        }
        Value::Number(n) => match n.as_f64() {
            Some(f) => {
                worksheet.write_number_with_format(row, col, f, format)?;
            }
            None => {
                worksheet.write_string_with_format(row, col, n.to_string(), format)?;
            }
        },
        Value::String(s) => {
            worksheet.write_string_with_format(row, col, s, format)?;
        }
        nested => {
            worksheet.write_string_with_format(row, col, nested.to_string(), format)?;
        }
    }
    Ok(())
}

/// Text a cell shows, used for width estimation. Null shows nothing.
pub fn rendered_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        other => other.to_string(),
    }
}

/// Longest rendered value (header included) plus padding, capped at
/// [`MAX_COLUMN_WIDTH`].
pub fn column_width(table: &Table, col: usize) -> f64 {
    let header = table.columns.get(col).map(|c| c.chars().count()).unwrap_or(0);
    let longest = table
        .rows
        .iter()
        .filter_map(|row| row.get(col))
        .map(|v| rendered_text(v).chars().count())
        .fold(header, usize::max);

    ((longest + COLUMN_PADDING) as f64).min(MAX_COLUMN_WIDTH)
}
