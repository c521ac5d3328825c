//! 分析結果匯出（xlsx 打包為 zip）

use chrono::NaiveDate;
use mrp_calc::AnalysisResult;
use mrp_core::calendar::{archive_date_stamp, format_date_label, parse_date_header};
use mrp_core::{AnalysisConfig, Cell, Field, InputData, MrpError, Result, Table};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::{write::FileOptions, CompressionMethod, ZipWriter};

const ARCHIVE_PREFIX: &str = "All_Component_Results";

pub const SHEET_PLAN: &str = "Plan";
pub const SHEET_NEED_BY_DATE: &str = "Need_By_Date";
pub const SHEET_NEED_BY_ORDER_TYPE: &str = "Need_By_Order_Type";
pub const SHEET_COVERAGE: &str = "Stock_Coverage_Analysis";
pub const SHEET_BOM_MEMBERSHIP: &str = "Component_in_BOMs";
pub const SHEET_COMPONENT: &str = "Component";
pub const SHEET_CONTROLLER: &str = "MRP_Controller";

/// 子件表額外輸出的訂單類型標籤欄位
pub const ORDER_TYPE_LABEL_COLUMN: &str = "Order Type Label";

const PIVOT_LEADING: [&str; 6] = [
    "Component",
    "Component Description",
    "MRP Controller",
    "Component UoM",
    "Current Stock",
    "Component Order Type",
];

const COVERAGE_HEADERS: [&str; 12] = [
    "Component",
    "Component Description",
    "MRP Controller",
    "Component UoM",
    "Component Order Type",
    "Hierarchy Level",
    "Order Types",
    "Current Stock",
    "Total Required",
    "Coverage %",
    "Status",
    "Priority",
];

/// 匯出檔名，例如 `All_Component_Results_19_Oct_2026.zip`
pub fn archive_file_name(date: NaiveDate) -> String {
    format!("{}_{}.zip", ARCHIVE_PREFIX, archive_date_stamp(date))
}

/// 壓縮檔內的活頁簿檔名
pub fn workbook_file_name(date: NaiveDate) -> String {
    format!("{}_{}.xlsx", ARCHIVE_PREFIX, archive_date_stamp(date))
}

/// 匯出的壓縮檔
#[derive(Debug, Clone)]
pub struct ExportArchive {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ExportArchive {
    /// 寫入目錄，回傳完整路徑
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        tracing::info!("匯出完成: {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// 結果匯出器
pub struct ResultExporter<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> ResultExporter<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// 產生匯出壓縮檔
    pub fn export(
        &self,
        result: &AnalysisResult,
        input: &InputData,
        date: NaiveDate,
    ) -> Result<ExportArchive> {
        let workbook = self.build_workbook(result, input)?;

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        zip.start_file(workbook_file_name(date), options)
            .map_err(|e| MrpError::Export(e.to_string()))?;
        zip.write_all(&workbook)
            .map_err(|e| MrpError::Export(e.to_string()))?;
        let cursor = zip.finish().map_err(|e| MrpError::Export(e.to_string()))?;

        Ok(ExportArchive {
            file_name: archive_file_name(date),
            bytes: cursor.into_inner(),
        })
    }

    /// 產生 xlsx 活頁簿
    pub fn build_workbook(&self, result: &AnalysisResult, input: &InputData) -> Result<Vec<u8>> {
        self.write_sheets(result, input).map_err(|e| {
            tracing::error!("活頁簿產生失敗: {:?}", e);
            MrpError::Export(e.to_string())
        })
    }

    fn write_sheets(
        &self,
        result: &AnalysisResult,
        input: &InputData,
    ) -> std::result::Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();
        let date_format = self.config.date_label_format.as_str();

        let sheet = add_sheet(&mut workbook, SHEET_PLAN)?;
        let plan_headers: Vec<Cell> = input
            .plan
            .headers
            .iter()
            .map(|h| {
                parse_date_header(h)
                    .map(|d| Cell::Text(format_date_label(d, date_format)))
                    .unwrap_or_else(|| h.clone())
            })
            .collect();
        write_table(sheet, &plan_headers, &input.plan.rows, &header)?;

        let sheet = add_sheet(&mut workbook, SHEET_NEED_BY_DATE)?;
        write_pivot(
            sheet,
            &result.by_date.column_labels(date_format),
            &result.by_date.rows,
            &header,
        )?;

        let sheet = add_sheet(&mut workbook, SHEET_NEED_BY_ORDER_TYPE)?;
        write_pivot(
            sheet,
            &result.by_order_type.column_labels(date_format),
            &result.by_order_type.rows,
            &header,
        )?;

        let sheet = add_sheet(&mut workbook, SHEET_COVERAGE)?;
        write_headers(sheet, COVERAGE_HEADERS.iter().copied(), &header)?;
        let rows = result.filtered_coverage(&mrp_calc::CoverageFilter::new());
        for (i, record) in rows.iter().enumerate() {
            let row = i as u32 + 1;
            let texts = [
                &record.component_id,
                &record.component_description,
                &record.mrp_controller,
                &record.component_uom,
                &record.component_order_type,
                &record.hierarchy_level,
                &record.order_types,
            ];
            for (col, text) in texts.iter().enumerate() {
                sheet.write_string(row, col as u16, text.as_str())?;
            }
            sheet.write_number(row, 7, to_f64(record.current_stock))?;
            sheet.write_number(row, 8, to_f64(record.total_required))?;
            if let Some(pct) = record.coverage_pct {
                sheet.write_number(row, 9, to_f64(pct))?;
            }
            sheet.write_string(row, 10, record.status.label())?;
            sheet.write_string(row, 11, record.priority.label())?;
        }

        let sheet = add_sheet(&mut workbook, SHEET_BOM_MEMBERSHIP)?;
        let leading = ["MRP Controller", "Component", "Component Order Type"];
        write_headers(
            sheet,
            leading
                .iter()
                .copied()
                .chain(result.bom_membership.materials.iter().map(String::as_str)),
            &header,
        )?;
        for (i, membership) in result.bom_membership.rows.iter().enumerate() {
            let row = i as u32 + 1;
            sheet.write_string(row, 0, membership.mrp_controller.as_str())?;
            sheet.write_string(row, 1, membership.component_id.as_str())?;
            sheet.write_string(row, 2, membership.component_order_type.as_str())?;
            for (j, cell) in membership.cells.iter().enumerate() {
                if !cell.is_empty() {
                    sheet.write_string(row, (j + 3) as u16, cell.as_str())?;
                }
            }
        }

        let sheet = add_sheet(&mut workbook, SHEET_COMPONENT)?;
        let components = self.components_with_labels(&input.components);
        write_table(sheet, &components.headers, &components.rows, &header)?;

        if input.has_controllers() {
            let sheet = add_sheet(&mut workbook, SHEET_CONTROLLER)?;
            write_table(sheet, &input.controllers.headers, &input.controllers.rows, &header)?;
        }

        workbook.save_to_buffer()
    }

    /// 子件表加上訂單類型標籤欄位
    fn components_with_labels(&self, components: &Table) -> Table {
        let mut table = components.clone();
        let labels: Vec<String> = table
            .column_texts(Field::ComponentOrderType.canonical())
            .iter()
            .map(|code| self.config.order_type_label(code).to_string())
            .collect();
        table.add_column(ORDER_TYPE_LABEL_COLUMN, Cell::Empty);
        let col = table.width() - 1;
        for (row, label) in table.rows.iter_mut().zip(labels) {
            row[col] = Cell::Text(label);
        }
        table
    }
}

fn add_sheet<'w>(
    workbook: &'w mut Workbook,
    name: &str,
) -> std::result::Result<&'w mut Worksheet, XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(name)?;
    Ok(sheet)
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

fn write_headers<'s>(
    sheet: &mut Worksheet,
    headers: impl Iterator<Item = &'s str>,
    format: &Format,
) -> std::result::Result<(), XlsxError> {
    for (col, name) in headers.enumerate() {
        sheet.write_string_with_format(0, col as u16, name, format)?;
    }
    Ok(())
}

fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
) -> std::result::Result<(), XlsxError> {
    match cell {
        Cell::Empty => {}
        Cell::Number(n) => {
            sheet.write_number(row, col, *n)?;
        }
        Cell::Text(s) => {
            sheet.write_string(row, col, s.as_str())?;
        }
        Cell::DateTime(_) => {
            sheet.write_string(row, col, cell.as_text())?;
        }
    }
    Ok(())
}

fn write_table(
    sheet: &mut Worksheet,
    headers: &[Cell],
    rows: &[Vec<Cell>],
    format: &Format,
) -> std::result::Result<(), XlsxError> {
    let names: Vec<String> = headers.iter().map(Cell::as_text).collect();
    write_headers(sheet, names.iter().map(String::as_str), format)?;
    for (i, cells) in rows.iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            write_cell(sheet, i as u32 + 1, col as u16, cell)?;
        }
    }
    Ok(())
}

fn write_pivot(
    sheet: &mut Worksheet,
    labels: &[String],
    rows: &[mrp_calc::pivot::PivotRow],
    format: &Format,
) -> std::result::Result<(), XlsxError> {
    write_headers(
        sheet,
        PIVOT_LEADING
            .iter()
            .copied()
            .chain(labels.iter().map(String::as_str)),
        format,
    )?;
    let offset = PIVOT_LEADING.len();
    for (i, pivot_row) in rows.iter().enumerate() {
        let row = i as u32 + 1;
        let key = &pivot_row.key;
        sheet.write_string(row, 0, key.component_id.as_str())?;
        sheet.write_string(row, 1, key.description.as_str())?;
        sheet.write_string(row, 2, pivot_row.mrp_controller.as_str())?;
        sheet.write_string(row, 3, key.uom.as_str())?;
        sheet.write_number(row, 4, to_f64(key.current_stock))?;
        sheet.write_string(row, 5, key.component_order_type.as_str())?;
        for (j, qty) in pivot_row.quantities.iter().enumerate() {
            sheet.write_number(row, (offset + j) as u16, to_f64(*qty))?;
        }
    }
    Ok(())
}
