//! 可恢復的問題記錄

use serde::{Deserialize, Serialize};

use crate::MrpError;

/// MRP 警告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MrpWarning {
    /// 相關對象（欄位名稱、料號等）
    pub subject: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl MrpWarning {
    pub fn new(subject: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            subject,
            message,
            severity,
        }
    }

    pub fn info(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Info)
    }

    pub fn warning(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Warning)
    }

    pub fn error(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Error)
    }

    /// 由可恢復的錯誤建立警告
    pub fn from_error(subject: String, error: &MrpError) -> Self {
        Self::warning(subject, error.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}
