//! Inventory report export (spreadsheet, document, delimited text)

use std::str::FromStr;

use chrono::{DateTime, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use rust_xlsxwriter::{Format, Workbook};
use serde::{Deserialize, Serialize};
use shared::export::{project_rows, ExportTotals, EXPORT_HEADERS};
use shared::{format_currency, ExportRow, LabelLookup, Product};

use crate::error::{InventoryError, InventoryResult};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    #[serde(rename = "xlsx", alias = "spreadsheet")]
    Spreadsheet,
    #[serde(rename = "pdf", alias = "document")]
    Document,
    #[serde(rename = "csv", alias = "delimited_text")]
    DelimitedText,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Spreadsheet => "xlsx",
            ExportFormat::Document => "pdf",
            ExportFormat::DelimitedText => "csv",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Document => "application/pdf",
            ExportFormat::DelimitedText => "text/csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = InventoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "xlsx" | "excel" | "spreadsheet" => Ok(ExportFormat::Spreadsheet),
            "pdf" | "document" => Ok(ExportFormat::Document),
            "csv" | "delimited_text" => Ok(ExportFormat::DelimitedText),
            other => Err(InventoryError::Export(format!("Unsupported export format: {}", other))),
        }
    }
}

/// A generated report, ready to be saved or downloaded
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Serialize `products` into `format`. An empty collection is an error.
pub fn serialize(
    products: &[Product],
    format: ExportFormat,
    labels: &LabelLookup,
    now: DateTime<Utc>,
) -> InventoryResult<ExportArtifact> {
    if products.is_empty() {
        return Err(InventoryError::NoDataToExport);
    }

    let (rows, totals) = project_rows(products, labels, now.date_naive());
    let bytes = match format {
        ExportFormat::DelimitedText => write_csv(&rows)?,
        ExportFormat::Spreadsheet => write_xlsx(&rows, &totals)?,
        ExportFormat::Document => write_pdf(&rows, &totals, now)?,
    };

    let file_name = format!(
        "inventory_{}.{}",
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    );
    tracing::info!(file_name = %file_name, rows = rows.len(), size = bytes.len(), "Generated export");

    Ok(ExportArtifact {
        file_name,
        mime_type: format.mime_type(),
        bytes,
    })
}

fn write_csv(rows: &[ExportRow]) -> InventoryResult<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for row in rows {
        wtr.serialize(row)
            .map_err(|e| InventoryError::Export(format!("CSV serialization error: {}", e)))?;
    }
    wtr.into_inner()
        .map_err(|e| InventoryError::Export(format!("CSV writer error: {}", e)))
}

fn write_xlsx(rows: &[ExportRow], totals: &ExportTotals) -> InventoryResult<Vec<u8>> {
    let xlsx_err = |e: rust_xlsxwriter::XlsxError| InventoryError::Export(format!("Spreadsheet error: {}", e));

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Inventory").map_err(xlsx_err)?;

    for (col, header) in EXPORT_HEADERS.iter().enumerate() {
        let col = col as u16;
        worksheet
            .write_string_with_format(0, col, *header, &bold)
            .map_err(xlsx_err)?;
        worksheet.set_column_width(col, 16).map_err(xlsx_err)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let line = index as u32 + 1;
        for (col, cell) in row.cells().iter().enumerate() {
            let col = col as u16;
            // Stock and min stock stay numeric so they can be summed
            if col == 5 || col == 6 {
                let value = cell.parse::<f64>().unwrap_or_default();
                worksheet.write_number(line, col, value).map_err(xlsx_err)?;
            } else {
                worksheet.write_string(line, col, cell).map_err(xlsx_err)?;
            }
        }
    }

    let footer = rows.len() as u32 + 2;
    worksheet
        .write_string_with_format(footer, 0, "Total", &bold)
        .map_err(xlsx_err)?;
    worksheet
        .write_number(footer, 5, totals.total_units as f64)
        .map_err(xlsx_err)?;
    worksheet
        .write_string_with_format(footer, 12, format_currency(totals.total_value), &bold)
        .map_err(xlsx_err)?;

    workbook.save_to_buffer().map_err(xlsx_err)
}

const PAGE_WIDTH: i64 = 842;
const PAGE_HEIGHT: i64 = 595;
const MARGIN: i64 = 36;
const ROWS_PER_PAGE: usize = 40;
const LINE_HEIGHT: i64 = 11;
const TABLE_FONT_SIZE: i64 = 7;

/// Column widths in characters, in header order
const COLUMN_WIDTHS: [usize; 13] = [10, 22, 14, 14, 12, 6, 6, 11, 11, 8, 18, 10, 13];

fn fixed_width_line(cells: &[String]) -> String {
    cells
        .iter()
        .zip(COLUMN_WIDTHS)
        .map(|(cell, width)| {
            let clipped: String = cell
                .chars()
                .map(|c| if c.is_ascii() { c } else { '?' })
                .take(width)
                .collect();
            format!("{:<width$}", clipped, width = width)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn text_op(font: &str, size: i64, x: i64, y: i64, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.into(), Object::Integer(size)]),
        Operation::new("Td", vec![Object::Integer(x), Object::Integer(y)]),
        Operation::new("Tj", vec![Object::string_literal(text)]),
        Operation::new("ET", vec![]),
    ]
}

fn write_pdf(rows: &[ExportRow], totals: &ExportTotals, now: DateTime<Utc>) -> InventoryResult<Vec<u8>> {
    let pdf_err = |e: lopdf::Error| InventoryError::Export(format!("PDF error: {}", e));

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let title_font = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let table_font = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => title_font,
            "F2" => table_font,
        },
    });

    let header_line = fixed_width_line(&EXPORT_HEADERS.map(str::to_string));
    let generated = format!("Generated {}", now.format("%Y-%m-%d %H:%M:%S UTC"));
    let chunks: Vec<&[ExportRow]> = rows.chunks(ROWS_PER_PAGE).collect();
    let page_count = chunks.len();
    let mut page_ids: Vec<ObjectId> = Vec::with_capacity(page_count);

    for (page_index, chunk) in chunks.iter().enumerate() {
        let mut operations = Vec::new();
        let mut y = PAGE_HEIGHT - MARGIN - 14;

        operations.extend(text_op("F1", 14, MARGIN, y, "Inventory Report"));
        y -= 16;
        operations.extend(text_op("F2", 8, MARGIN, y, &generated));
        y -= 20;
        operations.extend(text_op("F2", TABLE_FONT_SIZE, MARGIN, y, &header_line));
        y -= LINE_HEIGHT;

        for row in chunk.iter() {
            let line = fixed_width_line(&row.cells());
            operations.extend(text_op("F2", TABLE_FONT_SIZE, MARGIN, y, &line));
            y -= LINE_HEIGHT;
        }

        if page_index + 1 == page_count {
            let footer = format!(
                "Products: {}   Units: {}   Total value: {}",
                totals.rows,
                totals.total_units,
                format_currency(totals.total_value)
            );
            operations.extend(text_op("F1", 9, MARGIN, y - LINE_HEIGHT, &footer));
        }

        let page_label = format!("Page {} of {}", page_index + 1, page_count);
        operations.extend(text_op("F2", 8, PAGE_WIDTH - MARGIN - 60, MARGIN / 2, &page_label));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().map_err(pdf_err)?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => page_ids.into_iter().map(Object::from).collect::<Vec<Object>>(),
        "Count" => page_count as i64,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(PAGE_WIDTH),
            Object::Integer(PAGE_HEIGHT),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| InventoryError::Export(format!("PDF write error: {}", e)))?;
    Ok(bytes)
}
