//! # MRP IO
//!
//! 活頁簿讀取、輸入驗證與結果匯出

pub mod export;
pub mod loader;
pub mod workbook;

// Re-export 主要類型
pub use export::{archive_file_name, ExportArchive, ResultExporter};
pub use loader::{WorkbookLoader, COMPONENT_SHEET, CONTROLLER_SHEETS, PLAN_SHEET};
pub use workbook::{read_workbook_bytes, read_workbook_path};
