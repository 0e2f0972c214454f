//! # Capsim I/O
//!
//! 參考工作簿匯入（xlsx / CSV 目錄）、情境與配置檔、結果匯出

pub mod error;
pub mod export;
pub mod scenario_file;
pub mod workbook;

// Re-export 主要類型
pub use error::{ImportError, ImportResult};
pub use export::{ExportFormat, ResultExporter};
pub use scenario_file::{load_config, load_scenario, save_config, save_scenario};
pub use workbook::{SheetNames, WorkbookLoader};
