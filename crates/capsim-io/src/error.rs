//! 匯入 / 匯出錯誤類型

use thiserror::Error;

/// 匯入 / 匯出錯誤
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 檔案 =====
    #[error("檔案不存在: {0}")]
    FileNotFound(String),

    #[error("檔案格式不支援: {0}（僅支援 .xlsx/.xlsm/.xls/.ods、CSV 目錄）")]
    UnsupportedFormat(String),

    #[error("檔案讀寫失敗: {0}")]
    FileReadError(String),

    // ===== 解析 =====
    #[error("Excel 解析失敗: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失敗: {0}")]
    CsvParseError(String),

    #[error("工作表 {sheet} 不存在於 {source_path}")]
    SheetNotFound { sheet: String, source_path: String },

    #[error("工作表 {0} 沒有表頭")]
    EmptySheet(String),

    #[error("JSON 解析失敗: {0}")]
    JsonError(String),

    #[error("配置無效: {0}")]
    InvalidConfig(String),

    // ===== 匯出 =====
    #[error("匯出失敗: {0}")]
    ExportError(String),
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::JsonError(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for ImportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ImportError::ExportError(err.to_string())
    }
}

/// Result 類型別名
pub type ImportResult<T> = Result<T, ImportError>;
