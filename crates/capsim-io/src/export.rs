//! 模擬結果匯出（Excel / CSV）

use capsim_calc::{ReportTable, SimulationResult};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::path::Path;

use crate::error::{ImportError, ImportResult};

/// 匯出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Excel 工作簿（評估、需求模擬、需求明細、摘要）
    Xlsx,
    /// 評估表 CSV
    Csv,
}

impl ExportFormat {
    /// 依副檔名判斷
    pub fn from_path(path: &Path) -> ImportResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "xlsx" => Ok(ExportFormat::Xlsx),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

struct ExcelFormats {
    header: Format,
    text: Format,
    integer: Format,
    number: Format,
    invest: Format,
}

impl ExcelFormats {
    fn new() -> Self {
        Self {
            header: Format::new()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_background_color(0x4472C4)
                .set_font_color(0xFFFFFF)
                .set_border(FormatBorder::Thin),
            text: Format::new().set_border(FormatBorder::Thin),
            integer: Format::new().set_num_format("0").set_border(FormatBorder::Thin),
            number: Format::new()
                .set_num_format("#,##0.00")
                .set_border(FormatBorder::Thin),
            invest: Format::new()
                .set_bold()
                .set_background_color(0xFF6B6B)
                .set_border(FormatBorder::Thin),
        }
    }
}

/// 結果匯出器
pub struct ResultExporter {
    /// 顯示用小數位數
    decimals: u32,
}

impl ResultExporter {
    pub fn new(decimals: u32) -> Self {
        Self { decimals }
    }

    /// 依副檔名匯出
    pub fn export<P: AsRef<Path>>(&self, path: P, result: &SimulationResult) -> ImportResult<()> {
        let path = path.as_ref();
        match ExportFormat::from_path(path)? {
            ExportFormat::Xlsx => self.export_xlsx(path, result),
            ExportFormat::Csv => self.export_csv(path, result),
        }
    }

    /// 報表清單（工作表順序）
    pub fn reports(&self, result: &SimulationResult) -> Vec<ReportTable> {
        vec![
            result.assessment_table(self.decimals),
            result.demand_simulation_table(self.decimals),
            result.demand_detail_table(self.decimals),
            result.summary_table(),
        ]
    }

    /// 匯出 Excel 工作簿
    pub fn export_xlsx(&self, path: &Path, result: &SimulationResult) -> ImportResult<()> {
        let buffer = self.to_xlsx_buffer(result)?;
        std::fs::write(path, buffer)?;
        tracing::info!("結果已匯出: {}", path.display());
        Ok(())
    }

    /// 產生 Excel 內容
    pub fn to_xlsx_buffer(&self, result: &SimulationResult) -> ImportResult<Vec<u8>> {
        let formats = ExcelFormats::new();
        let mut workbook = Workbook::new();

        for report in self.reports(result) {
            let sheet = workbook.add_worksheet();
            write_report(sheet, &report, &formats)?;
        }

        Ok(workbook.save_to_buffer()?)
    }

    /// 匯出評估表 CSV
    pub fn export_csv(&self, path: &Path, result: &SimulationResult) -> ImportResult<()> {
        let mut writer = csv::Writer::from_path(path)?;
        write_csv(&mut writer, &result.assessment_table(self.decimals))?;
        writer.flush()?;
        tracing::info!("結果已匯出: {}", path.display());
        Ok(())
    }
}

/// 報表寫入 CSV
pub fn write_csv<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    report: &ReportTable,
) -> ImportResult<()> {
    writer.write_record(&report.headers)?;
    for row in &report.rows {
        writer.write_record(row)?;
    }
    Ok(())
}

fn write_report(sheet: &mut Worksheet, report: &ReportTable, formats: &ExcelFormats) -> ImportResult<()> {
    sheet.set_name(&report.name)?;

    for (col, header) in report.headers.iter().enumerate() {
        sheet.write_with_format(0, col as u16, header.as_str(), &formats.header)?;
        let width = header.chars().count().clamp(10, 40);
        sheet.set_column_width(col as u16, width as f64)?;
    }
    sheet.set_freeze_panes(1, 0)?;

    let identifier_columns: Vec<bool> = report
        .headers
        .iter()
        .map(|h| IDENTIFIER_COLUMNS.contains(&h.as_str()))
        .collect();

    for (idx, row) in report.rows.iter().enumerate() {
        let row_num = (idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let is_identifier = identifier_columns.get(col).copied().unwrap_or(false);
            let col = col as u16;
            if cell == "INVEST" {
                sheet.write_with_format(row_num, col, cell.as_str(), &formats.invest)?;
            } else if let Some(number) = numeric_cell(cell).filter(|_| !is_identifier) {
                let format = if cell.contains('.') {
                    &formats.number
                } else {
                    &formats.integer
                };
                sheet.write_with_format(row_num, col, number, format)?;
            } else {
                sheet.write_with_format(row_num, col, cell.as_str(), &formats.text)?;
            }
        }
    }

    Ok(())
}

/// 識別碼欄位一律寫成文字（保留前導零）
const IDENTIFIER_COLUMNS: &[&str] = &["Quotes", "Quote", "Work Center", "Metric"];

/// 渲染後的數值欄（只含數字、小數點與負號）
fn numeric_cell(cell: &str) -> Option<f64> {
    if cell.is_empty() || !cell.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '-') {
        return None;
    }
    cell.parse().ok()
}
