//! 活頁簿讀取（calamine → [`Table`]）

use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx, XlsxError};
use chrono::{Duration, NaiveDateTime};
use mrp_core::calendar::excel_serial_to_date;
use mrp_core::{Cell, MrpError, Result, Table};
use std::io::Cursor;
use std::path::Path;

/// 讀取活頁簿的所有工作表
///
/// 每個工作表的第一列視為表頭。
pub fn read_workbook_bytes(bytes: &[u8]) -> Result<Vec<Table>> {
    tracing::debug!("讀取活頁簿：{} bytes", bytes.len());

    let mut workbook = open_workbook_from_rs::<Xlsx<_>, _>(Cursor::new(bytes)).map_err(
        |e: XlsxError| {
            tracing::error!("無法開啟活頁簿: {:?}", e);
            MrpError::Workbook(e.to_string())
        },
    )?;

    let mut tables = Vec::new();
    for sheet_name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| MrpError::Workbook(format!("{}: {}", sheet_name, e)))?;
        tracing::debug!(
            "工作表 {} 尺寸: {}x{}",
            sheet_name,
            range.height(),
            range.width()
        );
        tables.push(range_to_table(&sheet_name, &range));
    }

    Ok(tables)
}

/// 由路徑讀取活頁簿
pub fn read_workbook_path(path: &Path) -> Result<Vec<Table>> {
    let bytes = std::fs::read(path)?;
    read_workbook_bytes(&bytes)
}

fn range_to_table(name: &str, range: &Range<Data>) -> Table {
    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|row| row.iter().map(data_to_cell).collect())
        .unwrap_or_default();
    let mut table = Table::new(name, headers);
    for row in rows {
        let cells: Vec<Cell> = row.iter().map(data_to_cell).collect();
        if cells.iter().all(Cell::is_blank) {
            continue;
        }
        table.push_row(cells);
    }
    table
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => serial_to_datetime(dt.as_f64())
            .map(Cell::DateTime)
            .unwrap_or(Cell::Number(dt.as_f64())),
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(Cell::DateTime)
            .unwrap_or_else(|| Cell::Text(s.clone())),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => {
            tracing::debug!("儲存格錯誤值 {:?}，視為空白", e);
            Cell::Empty
        }
    }
}

fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let date = excel_serial_to_date(serial)?;
    let seconds = (serial.fract() * 86_400.0).round() as i64;
    date.and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::seconds(seconds))
}

fn parse_iso_datetime(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
