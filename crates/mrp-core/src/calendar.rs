//! 計劃日期欄位解析

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::cell::Cell;

/// 匯出時日期欄位的預設標籤格式（例如 `01 Oct`）
pub const DATE_LABEL_FORMAT: &str = "%d %b";

/// 匯出檔名使用的日期戳記格式（例如 `19_Oct_2026`）
pub const ARCHIVE_DATE_FORMAT: &str = "%d_%b_%Y";

/// 試算表序號上限（9999-12-31）
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%m/%d/%Y", "%d-%b-%Y", "%d %b %Y", "%Y/%m/%d"];

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// 試算表日期序號轉日期（1900 系統，基準日 1899-12-30）
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_EXCEL_SERIAL {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// 解析計劃表的日期表頭
///
/// 支援試算表日期儲存格、日期序號以及常見文字格式，無法解析時回傳 `None`。
pub fn parse_date_header(header: &Cell) -> Option<NaiveDate> {
    match header {
        Cell::DateTime(dt) => Some(dt.date()),
        Cell::Number(serial) => excel_serial_to_date(*serial),
        Cell::Text(text) => parse_date_text(text.trim()),
        Cell::Empty => None,
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// 格式化日期欄位標籤
pub fn format_date_label(date: NaiveDate, format: &str) -> String {
    date.format(format).to_string()
}

/// 匯出檔名日期戳記
pub fn archive_date_stamp(date: NaiveDate) -> String {
    date.format(ARCHIVE_DATE_FORMAT).to_string()
}
