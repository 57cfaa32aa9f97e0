//! Comma-separated values with a UTF-8 byte-order mark.
//!
//! Output: header row, then one line per row, joined with `\n`. Text cells
//! are always double-quoted (`"` doubled inside), numbers are written
//! bare, header names are quoted only when they need it.
//!
//! Input accepts an optional BOM, quoted fields containing commas, quotes
//! and line breaks, and either `\n` or `\r\n` line endings. Every non-empty
//! field decodes as text; numeric interpretation is left to the mapper so
//! values such as phone numbers keep their leading zeros.

use super::{RowCodec, UTF8_BOM, decode_utf8};
use crate::core::{PolicyError, Result};
use crate::mapper::{Cell, Table};

const DELIMITER: char = ',';
const QUOTE: char = '"';

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvCodec;

#[derive(Debug, Default)]
struct RawField {
    text: String,
    quoted: bool,
}

impl RawField {
    fn is_blank(&self) -> bool {
        !self.quoted && self.text.is_empty()
    }

    fn into_cell(self) -> Cell {
        if self.is_blank() {
            Cell::Empty
        } else {
            Cell::Text(self.text)
        }
    }
}

fn parse_records(text: &str) -> Result<Vec<Vec<RawField>>> {
    let mut records = Vec::new();
    let mut record: Vec<RawField> = Vec::new();
    let mut field = RawField::default();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == QUOTE {
                if chars.peek() == Some(&QUOTE) {
                    chars.next();
                    field.text.push(QUOTE);
                } else {
                    in_quotes = false;
                }
            } else {
                field.text.push(c);
            }
            continue;
        }

        match c {
            QUOTE if field.is_blank() => {
                in_quotes = true;
                field.quoted = true;
            }
            DELIMITER => record.push(std::mem::take(&mut field)),
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            // Stray quote inside an unquoted field is kept literally
            _ => field.text.push(c),
        }
    }

    if in_quotes {
        return Err(PolicyError::CodecFailure(
            "unterminated quoted field".to_string(),
        ));
    }
    if !record.is_empty() || !field.is_blank() {
        record.push(field);
        records.push(record);
    }

    // Blank lines carry no row
    records.retain(|r| !(r.len() == 1 && r[0].is_blank()));
    Ok(records)
}

fn quote(text: &str, out: &mut String) {
    out.push(QUOTE);
    for c in text.chars() {
        if c == QUOTE {
            out.push(QUOTE);
        }
        out.push(c);
    }
    out.push(QUOTE);
}

fn write_header(name: &str, out: &mut String) {
    if name.contains([DELIMITER, QUOTE, '\r', '\n']) {
        quote(name, out);
    } else {
        out.push_str(name);
    }
}

fn write_cell(cell: &Cell, out: &mut String) {
    match cell {
        Cell::Empty => {}
        Cell::Text(text) => quote(text, out),
        Cell::Number(n) => out.push_str(&n.to_string()),
    }
}

impl RowCodec for CsvCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Table> {
        let text = decode_utf8(bytes)?;
        let mut records = parse_records(text)?.into_iter();

        let Some(header) = records.next() else {
            return Err(PolicyError::CodecFailure("CSV file has no header row".to_string()));
        };
        let mut table = Table::new(header.iter().map(|f| f.text.as_str()));
        for record in records {
            table.push_row(record.into_iter().map(RawField::into_cell).collect());
        }
        Ok(table)
    }

    fn encode(&self, table: &Table) -> Result<Vec<u8>> {
        let mut out = String::new();

        for (i, name) in table.columns().iter().enumerate() {
            if i > 0 {
                out.push(DELIMITER);
            }
            write_header(name, &mut out);
        }

        for row in table.rows() {
            out.push('\n');
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    out.push(DELIMITER);
                }
                write_cell(cell, &mut out);
            }
        }

        let mut bytes = Vec::with_capacity(UTF8_BOM.len() + out.len());
        bytes.extend_from_slice(UTF8_BOM);
        bytes.extend_from_slice(out.as_bytes());
        Ok(bytes)
    }
}
