//! Excel import/export.
//!
//! Exports render with `rust_xlsxwriter`; imports parse with `calamine`.
//! Money travels in the sheets as rupees (what back-office staff type);
//! paise conversion happens at the boundary, here and nowhere else.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook};

use crate::error::ApiError;
use backbar_core::dsr::{DaySummary, SizeTotal};
use backbar_core::{DsrLine, Money, PriceEntry, StockLevel};
use backbar_db::repository::price::PriceInput;
use backbar_db::repository::stock::OpeningStockInput;

// =============================================================================
// Helpers
// =============================================================================

fn rupees(paise: i64) -> f64 {
    paise as f64 / 100.0
}

fn to_paise(rupees: f64) -> i64 {
    (rupees * 100.0).round() as i64
}

fn cell_string(cell: Option<&Data>) -> Option<String> {
    match cell? {
        Data::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => {
            // Codes typed as numbers come back as floats; keep them integral.
            if f.fract() == 0.0 {
                Some(format!("{}", *f as i64))
            } else {
                Some(f.to_string())
            }
        }
        _ => None,
    }
}

fn cell_f64(cell: Option<&Data>) -> Option<f64> {
    match cell? {
        Data::Int(i) => Some(*i as f64),
        Data::Float(f) => Some(*f),
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn cell_i64(cell: Option<&Data>) -> Option<i64> {
    cell_f64(cell).map(|f| f.round() as i64)
}

fn open_first_sheet(bytes: &[u8]) -> Result<calamine::Range<Data>, ApiError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| ApiError::BadRequest(format!("not a valid xlsx file: {}", e)))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ApiError::BadRequest("workbook has no sheets".to_string()))?;

    workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ApiError::BadRequest(format!("could not read sheet: {}", e)))
}

// =============================================================================
// Price master
// =============================================================================

/// Renders the price grid: one row per item × size.
pub fn export_prices(entries: &[PriceEntry]) -> Result<Vec<u8>, ApiError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet
        .set_name("Prices")
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let headers = [
        "Item Code",
        "Item Name",
        "Size Code",
        "Size Name",
        "Purchase Price",
        "MRP",
    ];
    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *header, &bold)
            .map_err(|e| ApiError::Internal(e.to_string()))?;
    }

    for (idx, entry) in entries.iter().enumerate() {
        let row = (idx + 1) as u32;
        sheet
            .write_string(row, 0, &entry.item_code)
            .and_then(|s| s.write_string(row, 1, &entry.item_name))
            .and_then(|s| s.write_string(row, 2, &entry.size_code))
            .and_then(|s| s.write_string(row, 3, &entry.size_name))
            .and_then(|s| s.write_number(row, 4, rupees(entry.purchase_price_paise)))
            .and_then(|s| s.write_number(row, 5, rupees(entry.mrp_paise)))
            .map_err(|e| ApiError::Internal(e.to_string()))?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// Parses an uploaded price sheet.
///
/// Bad rows are collected as messages rather than failing the import; the
/// screen shows them next to the accepted count.
pub fn import_prices(bytes: &[u8]) -> Result<(Vec<PriceInput>, Vec<String>), ApiError> {
    let range = open_first_sheet(bytes)?;

    let mut inputs = Vec::new();
    let mut errors = Vec::new();

    for (idx, row) in range.rows().enumerate().skip(1) {
        let line_no = idx + 1;
        let Some(item_code) = cell_string(row.first()) else {
            errors.push(format!("row {}: missing item code", line_no));
            continue;
        };
        let Some(size_code) = cell_string(row.get(2)) else {
            errors.push(format!("row {}: missing size code", line_no));
            continue;
        };
        let Some(purchase) = cell_f64(row.get(4)) else {
            errors.push(format!("row {}: missing purchase price", line_no));
            continue;
        };
        let Some(mrp) = cell_f64(row.get(5)) else {
            errors.push(format!("row {}: missing MRP", line_no));
            continue;
        };
        if purchase < 0.0 || mrp < 0.0 {
            errors.push(format!("row {}: negative price", line_no));
            continue;
        }

        inputs.push(PriceInput {
            item_code,
            item_name: cell_string(row.get(1)).unwrap_or_default(),
            size_code,
            size_name: cell_string(row.get(3)).unwrap_or_default(),
            purchase_price_paise: to_paise(purchase),
            mrp_paise: to_paise(mrp),
        });
    }

    Ok((inputs, errors))
}

// =============================================================================
// Opening stock
// =============================================================================

/// Renders a store's stock positions as an opening-stock template.
pub fn export_inventory(levels: &[StockLevel]) -> Result<Vec<u8>, ApiError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet
        .set_name("Opening Inventory")
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let headers = [
        "Store Code",
        "Item Code",
        "Item Name",
        "Size Code",
        "Size Name",
        "Opening",
    ];
    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *header, &bold)
            .map_err(|e| ApiError::Internal(e.to_string()))?;
    }

    for (idx, level) in levels.iter().enumerate() {
        let row = (idx + 1) as u32;
        sheet
            .write_string(row, 0, &level.store_code)
            .and_then(|s| s.write_string(row, 1, &level.item_code))
            .and_then(|s| s.write_string(row, 2, &level.item_name))
            .and_then(|s| s.write_string(row, 3, &level.size_code))
            .and_then(|s| s.write_string(row, 4, &level.size_name))
            .and_then(|s| s.write_number(row, 5, level.opening as f64))
            .map_err(|e| ApiError::Internal(e.to_string()))?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// Parses an uploaded opening-stock sheet. `default_store` fills rows whose
/// store column is blank.
pub fn import_inventory(
    bytes: &[u8],
    default_store: &str,
) -> Result<(Vec<OpeningStockInput>, Vec<String>), ApiError> {
    let range = open_first_sheet(bytes)?;

    let mut inputs = Vec::new();
    let mut errors = Vec::new();

    for (idx, row) in range.rows().enumerate().skip(1) {
        let line_no = idx + 1;
        let store_code =
            cell_string(row.first()).unwrap_or_else(|| default_store.to_string());
        let Some(item_code) = cell_string(row.get(1)) else {
            errors.push(format!("row {}: missing item code", line_no));
            continue;
        };
        let Some(size_code) = cell_string(row.get(3)) else {
            errors.push(format!("row {}: missing size code", line_no));
            continue;
        };
        let Some(opening) = cell_i64(row.get(5)) else {
            errors.push(format!("row {}: missing opening quantity", line_no));
            continue;
        };
        if store_code.is_empty() {
            errors.push(format!("row {}: missing store code", line_no));
            continue;
        }

        inputs.push(OpeningStockInput {
            store_code,
            item_code,
            item_name: cell_string(row.get(2)).unwrap_or_default(),
            size_code,
            size_name: cell_string(row.get(4)).unwrap_or_default(),
            business_date: None,
            opening,
        });
    }

    Ok((inputs, errors))
}

// =============================================================================
// Daily Sale Report
// =============================================================================

/// Renders the reconciled DSR: item grid, per-size totals, category sales
/// and the ledger settlement with the day's variance.
pub fn export_dsr(
    store_code: &str,
    date: &str,
    lines: &[DsrLine],
    size_totals: &[SizeTotal],
    category_totals: &[(String, Money)],
    other_sales: &[(String, Money)],
    expenses: &[(String, Money)],
    tenders: &[(String, Money)],
    summary: &DaySummary,
) -> Result<Vec<u8>, ApiError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let title = Format::new().set_bold().set_font_size(14);

    let sheet = workbook.add_worksheet();
    sheet
        .set_name("DSR")
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let err = |e: rust_xlsxwriter::XlsxError| ApiError::Internal(e.to_string());

    sheet
        .write_string_with_format(
            0,
            0,
            &format!("Daily Sale Report - {} - {}", store_code, date),
            &title,
        )
        .map_err(err)?;

    // Item grid
    let headers = [
        "Item Code", "Item Name", "Size", "MRP", "Opening", "Inward", "Outward", "Sale",
        "Closing", "Sale Amount",
    ];
    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(2, col as u16, *header, &bold)
            .map_err(err)?;
    }

    let mut row: u32 = 3;
    for line in lines {
        sheet
            .write_string(row, 0, &line.item_code)
            .and_then(|s| s.write_string(row, 1, &line.item_name))
            .and_then(|s| s.write_string(row, 2, &line.size_name))
            .and_then(|s| s.write_number(row, 3, rupees(line.mrp_paise)))
            .and_then(|s| s.write_number(row, 4, line.opening as f64))
            .and_then(|s| s.write_number(row, 5, line.inward as f64))
            .and_then(|s| s.write_number(row, 6, line.outward as f64))
            .and_then(|s| s.write_number(row, 7, line.sale as f64))
            .and_then(|s| s.write_number(row, 8, line.closing as f64))
            .and_then(|s| s.write_number(row, 9, rupees(line.sale_amount().paise())))
            .map_err(err)?;
        row += 1;
    }

    // Per-size grand totals
    row += 1;
    sheet
        .write_string_with_format(row, 0, "Size Totals", &bold)
        .map_err(err)?;
    row += 1;
    let size_headers = ["Size", "Opening", "Inward", "Outward", "Sale", "Closing", "Amount"];
    for (col, header) in size_headers.iter().enumerate() {
        sheet
            .write_string_with_format(row, col as u16, *header, &bold)
            .map_err(err)?;
    }
    row += 1;
    for total in size_totals {
        sheet
            .write_string(row, 0, &total.size_name)
            .and_then(|s| s.write_number(row, 1, total.opening as f64))
            .and_then(|s| s.write_number(row, 2, total.inward as f64))
            .and_then(|s| s.write_number(row, 3, total.outward as f64))
            .and_then(|s| s.write_number(row, 4, total.sale as f64))
            .and_then(|s| s.write_number(row, 5, total.closing as f64))
            .and_then(|s| s.write_number(row, 6, rupees(total.sale_amount_paise)))
            .map_err(err)?;
        row += 1;
    }

    // Category sales
    row += 1;
    sheet
        .write_string_with_format(row, 0, "Category Sales", &bold)
        .map_err(err)?;
    row += 1;
    for (name, amount) in category_totals {
        sheet
            .write_string(row, 0, name)
            .and_then(|s| s.write_number(row, 1, rupees(amount.paise())))
            .map_err(err)?;
        row += 1;
    }

    // Ledger settlement
    for (section, rows) in [
        ("Other Sales", other_sales),
        ("Expenses", expenses),
        ("Tenders", tenders),
    ] {
        row += 1;
        sheet
            .write_string_with_format(row, 0, section, &bold)
            .map_err(err)?;
        row += 1;
        for (code, amount) in rows.iter() {
            sheet
                .write_string(row, 0, code)
                .and_then(|s| s.write_number(row, 1, rupees(amount.paise())))
                .map_err(err)?;
            row += 1;
        }
    }

    // Settlement summary
    row += 1;
    let summary_rows = [
        ("Item Sales", summary.item_sale),
        ("Other Sales", summary.other_sale),
        ("Expenses", summary.expense),
        ("Tenders", summary.tender),
        ("Variance", summary.variance),
    ];
    for (label, amount) in summary_rows {
        sheet
            .write_string_with_format(row, 0, label, &bold)
            .and_then(|s| s.write_number(row, 1, rupees(amount.paise())))
            .map_err(err)?;
        row += 1;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| ApiError::Internal(e.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paise_round_trip() {
        assert_eq!(to_paise(520.0), 52_000);
        assert_eq!(to_paise(520.55), 52_055);
        assert_eq!(rupees(52_055), 520.55);
    }

    #[test]
    fn test_price_sheet_round_trip() {
        // export, then re-import, and the rows survive
        let entries = vec![PriceEntry {
            id: "x".into(),
            item_code: "IT001".into(),
            item_name: "Old Oak Whisky".into(),
            size_code: "750".into(),
            size_name: "750ml".into(),
            purchase_price_paise: 40_000,
            mrp_paise: 52_000,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }];
        let bytes = export_prices(&entries).unwrap();

        let (inputs, errors) = import_prices(&bytes).unwrap();
        assert!(errors.is_empty());
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].item_code, "IT001");
        assert_eq!(inputs[0].purchase_price_paise, 40_000);
        assert_eq!(inputs[0].mrp_paise, 52_000);
    }

    #[test]
    fn test_inventory_sheet_round_trip() {
        let levels = vec![StockLevel {
            id: "x".into(),
            store_code: "S001".into(),
            item_code: "IT001".into(),
            item_name: "Old Oak Whisky".into(),
            size_code: "750".into(),
            size_name: "750ml".into(),
            business_date: None,
            opening: 24,
            purchase: 0,
            inward: 0,
            outward: 0,
            closing: 24,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }];
        let bytes = export_inventory(&levels).unwrap();

        let (inputs, errors) = import_inventory(&bytes, "S001").unwrap();
        assert!(errors.is_empty());
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].opening, 24);
        assert_eq!(inputs[0].store_code, "S001");
    }

    #[test]
    fn test_import_collects_row_errors() {
        // a sheet whose second data row is missing its size code
        let entries = vec![
            PriceEntry {
                id: "x".into(),
                item_code: "IT001".into(),
                item_name: "A".into(),
                size_code: "750".into(),
                size_name: "750ml".into(),
                purchase_price_paise: 100,
                mrp_paise: 200,
                created_at: chrono::Utc::now(),
                updated_at: chrono::Utc::now(),
            },
            PriceEntry {
                id: "y".into(),
                item_code: "IT002".into(),
                item_name: "B".into(),
                size_code: "".into(),
                size_name: "".into(),
                purchase_price_paise: 100,
                mrp_paise: 200,
                created_at: chrono::Utc::now(),
                updated_at: chrono::Utc::now(),
            },
        ];
        let bytes = export_prices(&entries).unwrap();

        let (inputs, errors) = import_prices(&bytes).unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("size code"));
    }
}
