//! Spreadsheet workbooks.
//!
//! Decoding reads the first sheet of any workbook calamine recognises
//! (`.xlsx`, `.xls`, `.xlsb`, `.ods`): the first row is the header, numeric
//! cells stay numeric and date-formatted cells become ISO text. Encoding
//! writes a single `.xlsx` sheet.

use super::RowCodec;
use crate::core::{PolicyError, Result};
use crate::mapper::{Cell, Table};
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use chrono::NaiveTime;
use rust_xlsxwriter::Workbook;
use std::fmt::Display;
use std::io::Cursor;

/// Name of the exported sheet.
pub const SHEET_NAME: &str = "ข้อมูลประกันรถยนต์";

/// Column widths (in characters) of the exported sheet, by position.
const COLUMN_WIDTHS: [u8; 31] = [
    20, 15, 15, 15, 30, 30, 15, 20, 10, 15, 20, 10, 10, 10, 20, 15, 15, 15, 20, 12, 12, 20, 12,
    12, 12, 12, 12, 12, 12, 15, 15,
];

#[derive(Debug, Default, Clone, Copy)]
pub struct XlsxCodec;

fn codec_error(context: &str, err: impl Display) -> PolicyError {
    PolicyError::CodecFailure(format!("{}: {}", context, err))
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(text) => Cell::Text(text.clone()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(t) if t.time() == NaiveTime::MIN => Cell::Text(t.format("%Y-%m-%d").to_string()),
            Some(t) => Cell::Text(t.format("%Y-%m-%dT%H:%M:%S").to_string()),
            None => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(text) | Data::DurationIso(text) => Cell::Text(text.clone()),
    }
}

impl RowCodec for XlsxCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Table> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| codec_error("cannot open spreadsheet", e))?;
        let Some(sheet) = workbook.sheet_names().into_iter().next() else {
            return Err(PolicyError::CodecFailure("spreadsheet has no sheets".to_string()));
        };
        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|e| codec_error(&format!("cannot read sheet '{}'", sheet), e))?;

        let mut rows = range.rows();
        let Some(header) = rows.next() else {
            return Err(PolicyError::CodecFailure(format!(
                "sheet '{}' has no header row",
                sheet
            )));
        };
        let mut table = Table::new(header.iter().map(|cell| cell.to_string()));
        for row in rows {
            table.push_row(row.iter().map(to_cell).collect());
        }
        Ok(table)
    }

    fn encode(&self, table: &Table) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet
            .set_name(SHEET_NAME)
            .map_err(|e| codec_error("cannot name sheet", e))?;

        for (i, name) in table.columns().iter().enumerate() {
            let col = u16::try_from(i).map_err(|e| codec_error("too many columns", e))?;
            sheet
                .write_string(0, col, name)
                .map_err(|e| codec_error("cannot write header", e))?;
            if let Some(&width) = COLUMN_WIDTHS.get(i) {
                sheet
                    .set_column_width(col, width)
                    .map_err(|e| codec_error("cannot size column", e))?;
            }
        }

        for (r, cells) in table.rows().iter().enumerate() {
            let row = u32::try_from(r + 1).map_err(|e| codec_error("too many rows", e))?;
            for (c, cell) in cells.iter().enumerate() {
                let col = u16::try_from(c).map_err(|e| codec_error("too many columns", e))?;
                let written = match cell {
                    // Left unwritten; reads back as an empty cell
                    Cell::Empty => continue,
                    Cell::Text(text) if text.is_empty() => continue,
                    Cell::Text(text) => sheet.write_string(row, col, text),
                    Cell::Number(n) => sheet.write_number(row, col, *n),
                };
                written.map_err(|e| codec_error(&format!("cannot write row {}", r + 1), e))?;
            }
        }

        workbook
            .save_to_buffer()
            .map_err(|e| codec_error("cannot encode workbook", e))
    }
}
