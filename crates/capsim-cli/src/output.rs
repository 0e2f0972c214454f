//! 終端輸出

use anyhow::Result;
use capsim_calc::{ExecutiveSummary, SimulationResult, SimulationWarning, WarningSeverity};
use capsim_core::{InvestmentAssessment, YearRange};
use serde::Serialize;

/// JSON 輸出內容
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub run_id: String,
    pub years: YearRange,
    pub summary: ExecutiveSummary,
    pub assessments: &'a [InvestmentAssessment],
    pub warnings: &'a [SimulationWarning],
}

impl<'a> JsonReport<'a> {
    pub fn new(result: &'a SimulationResult) -> Self {
        Self {
            run_id: result.run_id.to_string(),
            years: result.years,
            summary: result.summary(),
            assessments: &result.assessments,
            warnings: &result.warnings,
        }
    }
}

/// 輸出 JSON
pub fn render_json(result: &SimulationResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(&JsonReport::new(result))?)
}

/// 輸出文字報表（評估表 + 摘要 + 警告）
pub fn render_text(result: &SimulationResult, decimals: u32) -> String {
    let summary = result.summary();
    let mut out = String::new();

    out.push_str(&format!(
        "模擬年度 {}-{}，情境報價 {} 筆\n\n",
        result.years.first, result.years.last, summary.quotes_in_scenario
    ));

    if result.assessments.is_empty() {
        out.push_str("（沒有符合條件的工作中心）\n");
    } else {
        out.push_str(&result.assessment_table(decimals).render_text());
        out.push('\n');
    }

    out.push('\n');
    out.push_str(&result.summary_table().render_text());
    out.push('\n');

    let invest: Vec<&str> = result
        .invest_work_centers()
        .iter()
        .map(|a| a.work_center_id.as_str())
        .collect();
    if !invest.is_empty() {
        out.push_str(&format!("\n需要投資: {}\n", invest.join(", ")));
    }

    if !result.warnings.is_empty() {
        out.push_str("\n警告:\n");
        for warning in &result.warnings {
            let marker = match warning.severity {
                WarningSeverity::Info => "i",
                WarningSeverity::Warning => "!",
            };
            out.push_str(&format!("  {} {}\n", marker, warning));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use capsim_calc::{ReferenceTables, SimulationPipeline};
    use capsim_core::{RawTable, Scenario};

    fn result(show_only_affected: bool) -> SimulationResult {
        let tables = ReferenceTables::new(
            RawTable::from_rows("quotes", &["RFQ", "2026"], &[&["Q1", "1000"], &["Q2", "5"]]),
            RawTable::from_rows("routing", &["Item", "Work Center", "Rate"], &[&["Q1", "WC1", "10"]]),
            RawTable::from_rows(
                "capacity",
                &["WC", "Machines", "OEE", "Required 2026", "Planned 2026"],
                &[&["WC1", "2", "85", "0", "50"], &["WC2", "1", "85", "0", "50"]],
            ),
        );
        let scenario = Scenario::new()
            .with_quotes(["Q1", "Q2"])
            .with_show_only_affected(show_only_affected);
        SimulationPipeline::with_default_config(tables)
            .run(&scenario)
            .unwrap()
    }

    #[test]
    fn test_render_text() {
        let text = render_text(&result(false), 2);

        assert!(text.contains("模擬年度 2025-2026"));
        assert!(text.contains("Required Machines 2026"));
        assert!(text.contains("需要投資: WC1"));
        // Q2 沒有途程
        assert!(text.contains("Q2"));
    }

    #[test]
    fn test_render_json() {
        let json = render_json(&result(true)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["summary"]["work_centers_invest"], 1);
        assert_eq!(value["assessments"].as_array().unwrap().len(), 1);
        assert_eq!(value["assessments"][0]["overall_status"], "INVEST");
        assert_eq!(value["warnings"][0]["severity"], "info");
    }
}
