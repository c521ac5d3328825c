//! 試算表儲存格與表格模型

use chrono::NaiveDateTime;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static EMPTY_CELL: Cell = Cell::Empty;

/// 儲存格值
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// 建立文字儲存格
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// 空白或只有空白字元
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 以文字呈現（整數不帶小數點，避免料號變成 `1000123.0`）
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) => format_number(*n),
            Cell::DateTime(dt) => {
                if dt.time() == chrono::NaiveTime::MIN {
                    dt.date().to_string()
                } else {
                    dt.to_string()
                }
            }
        }
    }

    /// 轉換為數量
    ///
    /// 空白視為 0；無法解析的文字與日期回傳 `None`。
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Cell::Empty => Some(Decimal::ZERO),
            Cell::Number(n) => Decimal::from_f64(*n),
            Cell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Some(Decimal::ZERO);
                }
                Decimal::from_str(&trimmed.replace(',', "")).ok()
            }
            Cell::DateTime(_) => None,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// 工作表（第一列為表頭）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    /// 工作表名稱
    pub name: String,

    /// 表頭儲存格（日期欄位的表頭可能是日期或序號）
    pub headers: Vec<Cell>,

    /// 資料列
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// 建立空白表格
    pub fn new(name: impl Into<String>, headers: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    /// 以文字表頭建立表格
    pub fn with_columns(name: impl Into<String>, columns: &[&str]) -> Self {
        Self::new(name, columns.iter().map(|c| Cell::text(*c)).collect())
    }

    /// 建構器模式：設置資料列
    pub fn with_rows(mut self, rows: Vec<Vec<Cell>>) -> Self {
        self.rows = rows;
        self
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// 沒有任何資料列
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// 表頭文字
    pub fn header_names(&self) -> Vec<String> {
        self.headers.iter().map(Cell::as_text).collect()
    }

    /// 依名稱尋找欄位索引（忽略前後空白）
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim();
        self.headers.iter().position(|h| match h {
            Cell::Text(s) => s.trim() == wanted,
            _ => false,
        })
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// 取得儲存格，超出範圍回傳空白
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// 依欄位名稱取得儲存格
    pub fn value(&self, row: usize, column: &str) -> Option<&Cell> {
        self.column_index(column).map(|col| self.cell(row, col))
    }

    /// 重新命名欄位
    pub fn rename_column(&mut self, col: usize, name: &str) {
        if let Some(header) = self.headers.get_mut(col) {
            *header = Cell::text(name);
        }
    }

    /// 新增欄位，所有資料列填入預設值
    pub fn add_column(&mut self, name: &str, default: Cell) {
        let width = self.headers.len();
        self.headers.push(Cell::text(name));
        for row in &mut self.rows {
            row.resize(width, Cell::Empty);
            row.push(default.clone());
        }
    }

    /// 欄位不存在時才新增
    pub fn ensure_column(&mut self, name: &str, default: Cell) -> bool {
        if self.has_column(name) {
            return false;
        }
        self.add_column(name, default);
        true
    }

    /// 取出整欄文字值
    pub fn column_texts(&self, column: &str) -> Vec<String> {
        match self.column_index(column) {
            Some(col) => (0..self.height())
                .map(|row| self.cell(row, col).as_text())
                .collect(),
            None => Vec::new(),
        }
    }
}
