//! 參考工作簿匯入
//!
//! 支援兩種來源：
//! - Excel 工作簿（三張工作表依名稱讀取）
//! - CSV 目錄（每張工作表一個 `<工作表名>.csv`）
//!
//! 匯入層只負責把儲存格轉成字串表格，欄位辨識與型別轉換由計算管線處理。

use calamine::{open_workbook_auto, Data, Range, Reader};
use capsim_calc::ReferenceTables;
use capsim_core::RawTable;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

use crate::error::{ImportError, ImportResult};

/// 參考工作表名稱
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetNames {
    /// 報價量
    pub quotes: String,
    /// 途程表
    pub routing: String,
    /// 產能計劃
    pub capacity: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            quotes: "1_RFQ_DadosVendas".to_string(),
            routing: "2_LN_DadosExportados".to_string(),
            capacity: "3_Industrial_Plan_Idash".to_string(),
        }
    }
}

impl SheetNames {
    pub fn new(
        quotes: impl Into<String>,
        routing: impl Into<String>,
        capacity: impl Into<String>,
    ) -> Self {
        Self {
            quotes: quotes.into(),
            routing: routing.into(),
            capacity: capacity.into(),
        }
    }
}

/// 參考工作簿載入器
#[derive(Debug, Clone, Default)]
pub struct WorkbookLoader {
    sheet_names: SheetNames,
}

impl WorkbookLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：自訂工作表名稱
    pub fn with_sheet_names(mut self, sheet_names: SheetNames) -> Self {
        self.sheet_names = sheet_names;
        self
    }

    pub fn sheet_names(&self) -> &SheetNames {
        &self.sheet_names
    }

    /// 依路徑自動選擇：目錄 → CSV，檔案 → Excel
    pub fn load<P: AsRef<Path>>(&self, path: P) -> ImportResult<ReferenceTables> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        if path.is_dir() {
            self.load_csv_dir(path)
        } else {
            self.load_excel(path)
        }
    }

    /// 讀取 Excel 工作簿
    pub fn load_excel<P: AsRef<Path>>(&self, path: P) -> ImportResult<ReferenceTables> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if !matches!(ext.as_str(), "xlsx" | "xlsm" | "xls" | "ods") {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        tracing::info!("讀取參考工作簿: {}", path.display());
        let mut workbook = open_workbook_auto(path)?;
        let available = workbook.sheet_names();

        let mut read_sheet = |name: &str| -> ImportResult<RawTable> {
            if !available.iter().any(|s| s == name) {
                return Err(ImportError::SheetNotFound {
                    sheet: name.to_string(),
                    source_path: path.display().to_string(),
                });
            }
            let range = workbook.worksheet_range(name)?;
            range_to_table(name, &range)
        };

        let tables = ReferenceTables::new(
            read_sheet(&self.sheet_names.quotes)?,
            read_sheet(&self.sheet_names.routing)?,
            read_sheet(&self.sheet_names.capacity)?,
        );
        log_loaded(&tables);
        Ok(tables)
    }

    /// 讀取 CSV 目錄（`<工作表名>.csv`）
    pub fn load_csv_dir<P: AsRef<Path>>(&self, dir: P) -> ImportResult<ReferenceTables> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(ImportError::FileNotFound(dir.display().to_string()));
        }

        tracing::info!("讀取參考 CSV 目錄: {}", dir.display());
        let read_sheet = |name: &str| -> ImportResult<RawTable> {
            let file = dir.join(format!("{}.csv", name));
            if !file.exists() {
                return Err(ImportError::SheetNotFound {
                    sheet: name.to_string(),
                    source_path: dir.display().to_string(),
                });
            }
            read_csv_table(name, &file)
        };

        let tables = ReferenceTables::new(
            read_sheet(&self.sheet_names.quotes)?,
            read_sheet(&self.sheet_names.routing)?,
            read_sheet(&self.sheet_names.capacity)?,
        );
        log_loaded(&tables);
        Ok(tables)
    }
}

/// 讀取單一 CSV 檔為表格
pub fn read_csv_table(name: &str, path: &Path) -> ImportResult<RawTable> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // 允許行長度不一致
        .from_reader(file);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ImportError::EmptySheet(name.to_string()));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Vec<String> = record.iter().map(|v| v.to_string()).collect();

        // 略過完全空白的行
        if row.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        rows.push(row);
    }

    Ok(RawTable::new(name, headers, rows))
}

/// Excel 範圍轉表格（第一個非空白行為表頭）
pub fn range_to_table(name: &str, range: &Range<Data>) -> ImportResult<RawTable> {
    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<String>>())
        .filter(|row| row.iter().any(|v| !v.trim().is_empty()));

    let headers = rows
        .next()
        .ok_or_else(|| ImportError::EmptySheet(name.to_string()))?;

    Ok(RawTable::new(name, headers, rows.collect()))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::Error(_) => String::new(),
        other => other.to_string(),
    }
}

fn log_loaded(tables: &ReferenceTables) {
    tracing::debug!(
        "參考表格: {} {} 行, {} {} 行, {} {} 行",
        tables.quotes.name,
        tables.quotes.len(),
        tables.routing.name,
        tables.routing.len(),
        tables.capacity.name,
        tables.capacity.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_csv(dir: &Path, name: &str, content: &str) {
        let mut file = File::create(dir.join(format!("{}.csv", name))).unwrap();
        write!(file, "{}", content).unwrap();
    }

    fn write_reference_dir(dir: &Path) {
        write_csv(dir, "1_RFQ_DadosVendas", "RFQ,Project,2026\nQ1,Alpha,1000\n,,\n");
        write_csv(dir, "2_LN_DadosExportados", "Item,Work Center,Rate\nQ1,WC1,10\n");
        write_csv(
            dir,
            "3_Industrial_Plan_Idash",
            "WC,Machines,OEE,Required 2026,Planned 2026\nWC1,2,85,0,50\n",
        );
    }

    #[test]
    fn test_load_csv_dir() {
        let dir = TempDir::new().unwrap();
        write_reference_dir(dir.path());

        let tables = WorkbookLoader::new().load(dir.path()).unwrap();

        assert_eq!(tables.quotes.name, "1_RFQ_DadosVendas");
        assert_eq!(tables.quotes.headers, vec!["RFQ", "Project", "2026"]);
        // 空白行已略過
        assert_eq!(tables.quotes.len(), 1);
        assert_eq!(tables.routing.rows[0], vec!["Q1", "WC1", "10"]);
        assert_eq!(tables.capacity.len(), 1);
    }

    #[test]
    fn test_missing_sheet_in_csv_dir() {
        let dir = TempDir::new().unwrap();
        write_reference_dir(dir.path());

        let loader = WorkbookLoader::new().with_sheet_names(SheetNames::new(
            "1_RFQ_DadosVendas",
            "routing",
            "3_Industrial_Plan_Idash",
        ));
        let err = loader.load_csv_dir(dir.path()).unwrap_err();

        assert!(matches!(err, ImportError::SheetNotFound { ref sheet, .. } if sheet == "routing"));
    }

    #[test]
    fn test_missing_path() {
        let err = WorkbookLoader::new()
            .load("/nonexistent/reference.xlsx")
            .unwrap_err();
        assert!(matches!(err, ImportError::FileNotFound(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reference.txt");
        File::create(&path).unwrap();

        let err = WorkbookLoader::new().load(&path).unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(ref ext) if ext == "txt"));
    }

    #[test]
    fn test_flexible_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quotes.csv");
        let mut file = File::create(&path).unwrap();
        write!(file, "RFQ,2026,2027\nQ1,5\nQ2,1,2,extra\n").unwrap();

        let table = read_csv_table("quotes", &path).unwrap();

        assert_eq!(table.rows[0], vec!["Q1", "5"]);
        assert_eq!(RawTable::cell(&table.rows[0], 2), "");
        assert_eq!(table.rows[1].len(), 4);
    }
}
