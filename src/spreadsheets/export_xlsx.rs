use crate::domain::{Cell, ListingTable};
use crate::errors::AppError;
use rust_xlsxwriter::{Workbook, Worksheet};
use std::path::Path;

/// Render a listing table as an in-memory workbook. Header row = column names; nulls stay blank.
pub fn listings_xlsx_buffer(table: &ListingTable) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(format!("{}_listings", table.kind()))
        .map_err(|e| AppError::XlsxError(format!("Failed to name sheet: {}", e)))?;

    for (col, column) in table.columns().iter().enumerate() {
        worksheet
            .write_string(0, col as u16, column.name)
            .map_err(|e| {
                AppError::XlsxError(format!("Failed to write header '{}': {}", column.name, e))
            })?;
    }

    for (i, row) in table.rows().iter().enumerate() {
        let r = (i + 1) as u32;
        for (c, cell) in row.iter().enumerate() {
            write_cell(worksheet, r, c as u16, cell)?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| AppError::XlsxError(format!("Failed to save workbook: {}", e)))
}

pub fn export_listings_xlsx(table: &ListingTable, path: &Path) -> Result<(), AppError> {
    let buffer = listings_xlsx_buffer(table)?;
    std::fs::write(path, buffer)?;
    Ok(())
}

fn write_cell(ws: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> Result<(), AppError> {
    let res = match cell {
        Cell::Null => return Ok(()),
        Cell::Text(s) => ws.write_string(row, col, s),
        Cell::Int(i) => ws.write_number(row, col, *i as f64),
        Cell::Float(f) => ws.write_number(row, col, *f),
    };
    res.map(|_| ())
        .map_err(|e| AppError::XlsxError(format!("Failed to write cell ({row}, {col}): {e}")))
}
