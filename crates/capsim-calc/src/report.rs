//! 報表渲染（評估表、需求明細、需求模擬、執行摘要）
//!
//! 計算結果保持精確值，只在渲染時依 `display_decimals` 四捨五入。

use capsim_core::{InvestmentAssessment, YearRange};
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::Table;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::demand::DemandDetail;
use crate::{ExecutiveSummary, SimulationResult};

/// 字串化的報表（匯出與終端輸出共用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportTable {
    /// 報表名稱（匯出時作為工作表名）
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 依表頭取欄位索引
    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// 終端表格輸出（依顯示寬度對齊，支援全形字元）
    pub fn render_text(&self) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(&self.headers);
        for row in &self.rows {
            table.add_row(row);
        }
        table.to_string()
    }
}

/// 依小數位數渲染數值（四捨五入，固定位數）
pub fn format_decimal(value: Decimal, decimals: u32) -> String {
    let mut rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(decimals);
    rounded.to_string()
}

/// 投資評估表
pub struct AssessmentTable;

impl AssessmentTable {
    pub const NAME: &'static str = "Assessment";

    /// 表頭：固定欄 + 各年度所需機台 + 各年度計劃產能 + 各年度狀態
    pub fn headers(years: &YearRange) -> Vec<String> {
        let mut headers: Vec<String> = [
            "Quotes",
            "Overall Status",
            "Work Center",
            "Existing Machines",
            "OEE",
        ]
        .iter()
        .map(|h| h.to_string())
        .collect();

        headers.extend(years.years().map(|y| format!("Required Machines {}", y)));
        headers.extend(years.years().map(|y| format!("Planned Capacity {}", y)));
        headers.extend(years.years().map(|y| format!("Status {}", y)));
        headers
    }

    pub fn build(
        assessments: &[InvestmentAssessment],
        years: &YearRange,
        decimals: u32,
    ) -> ReportTable {
        let mut table = ReportTable::new(Self::NAME, Self::headers(years));

        for assessment in assessments {
            let mut row = vec![
                assessment.quote_context.join(", "),
                assessment.overall_status.to_string(),
                assessment.display_name(),
                assessment.existing_machines.to_string(),
                format_decimal(assessment.oee, decimals),
            ];

            // 缺年度以零值評估渲染
            let year_values = || years.years().map(|y| assessment.year(y).copied().unwrap_or_default());
            row.extend(year_values().map(|y| format_decimal(y.required_machines, decimals)));
            row.extend(year_values().map(|y| format_decimal(y.planned_capacity, decimals)));
            row.extend(year_values().map(|y| y.status.to_string()));

            table.push_row(row);
        }

        table
    }
}

/// 需求明細表（年度量 / 產出率）
pub struct DemandDetailTable;

impl DemandDetailTable {
    pub const NAME: &'static str = "Demand Detail";

    pub fn build(details: &[DemandDetail], decimals: u32) -> ReportTable {
        let headers = ["Quote", "Work Center", "Year", "Volume", "Rate", "Demand"]
            .iter()
            .map(|h| h.to_string())
            .collect();
        let mut table = ReportTable::new(Self::NAME, headers);

        for detail in details {
            table.push_row(vec![
                detail.quote_id.clone(),
                detail.work_center.clone(),
                detail.year.to_string(),
                format_decimal(detail.volume, decimals),
                format_decimal(detail.rate, decimals),
                format_decimal(detail.demand, decimals),
            ]);
        }

        table
    }
}

/// 需求模擬表（既有需求 + 報價需求 = 模擬總需求）
pub struct DemandSimulationTable;

impl DemandSimulationTable {
    pub const NAME: &'static str = "Demand Simulation";

    pub fn build(
        assessments: &[InvestmentAssessment],
        years: &YearRange,
        decimals: u32,
    ) -> ReportTable {
        let headers = [
            "Work Center",
            "Year",
            "Baseline Required",
            "Quote Demand",
            "Total Demand",
            "Planned Capacity",
            "Effective Capacity",
        ]
        .iter()
        .map(|h| h.to_string())
        .collect();
        let mut table = ReportTable::new(Self::NAME, headers);

        for assessment in assessments {
            for year in years.years() {
                let Some(values) = assessment.year(year) else {
                    continue;
                };
                table.push_row(vec![
                    assessment.work_center_id.clone(),
                    year.to_string(),
                    format_decimal(values.baseline_required, decimals),
                    format_decimal(values.incremental_demand, decimals),
                    format_decimal(values.total_demand(), decimals),
                    format_decimal(values.planned_capacity, decimals),
                    format_decimal(values.effective_capacity, decimals),
                ]);
            }
        }

        table
    }
}

/// 執行摘要表
pub struct SummaryTable;

impl SummaryTable {
    pub const NAME: &'static str = "Summary";

    pub fn build(summary: &ExecutiveSummary) -> ReportTable {
        let mut table = ReportTable::new(
            Self::NAME,
            vec!["Metric".to_string(), "Value".to_string()],
        );
        let rows = [
            ("Quotes in Scenario", summary.quotes_in_scenario),
            ("Work Centers Assessed", summary.work_centers_assessed),
            ("Work Centers Affected", summary.work_centers_affected),
            ("Work Centers Requiring Investment", summary.work_centers_invest),
        ];
        for (metric, value) in rows {
            table.push_row(vec![metric.to_string(), value.to_string()]);
        }
        table
    }
}

impl SimulationResult {
    /// 投資評估表
    pub fn assessment_table(&self, decimals: u32) -> ReportTable {
        AssessmentTable::build(&self.assessments, &self.years, decimals)
    }

    /// 需求明細表
    pub fn demand_detail_table(&self, decimals: u32) -> ReportTable {
        DemandDetailTable::build(&self.demand.details, decimals)
    }

    /// 需求模擬表
    pub fn demand_simulation_table(&self, decimals: u32) -> ReportTable {
        DemandSimulationTable::build(&self.assessments, &self.years, decimals)
    }

    /// 執行摘要表
    pub fn summary_table(&self) -> ReportTable {
        SummaryTable::build(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capsim_core::{InvestmentStatus, YearAssessment};
    use rstest::rstest;
    use std::collections::BTreeMap;
    use unicode_width::UnicodeWidthStr;

    fn assessment() -> InvestmentAssessment {
        let mut years = BTreeMap::new();
        years.insert(
            2026,
            YearAssessment {
                baseline_required: Decimal::ZERO,
                incremental_demand: Decimal::from(100),
                planned_capacity: Decimal::from(80),
                effective_capacity: Decimal::from(68),
                required_machines: Decimal::new(25, 1),
                status: InvestmentStatus::Invest,
            },
        );
        InvestmentAssessment {
            work_center_id: "WC1".to_string(),
            work_center_name: "Press".to_string(),
            existing_machines: 2,
            oee: Decimal::from(85),
            years,
            overall_status: InvestmentStatus::Invest,
            affected: true,
            quote_context: vec!["Q1".to_string(), "Q2".to_string()],
        }
    }

    #[rstest]
    #[case(Decimal::new(25, 1), 2, "2.50")]
    #[case(Decimal::new(12345, 3), 2, "12.35")]
    #[case(Decimal::new(-5, 1), 0, "-1")]
    #[case(Decimal::from(4), 0, "4")]
    #[case(Decimal::new(1, 3), 2, "0.00")]
    fn test_format_decimal(#[case] value: Decimal, #[case] decimals: u32, #[case] expected: &str) {
        assert_eq!(format_decimal(value, decimals), expected);
    }

    #[test]
    fn test_assessment_table_headers() {
        let headers = AssessmentTable::headers(&YearRange::new(2025, 2026));
        assert_eq!(
            headers,
            vec![
                "Quotes",
                "Overall Status",
                "Work Center",
                "Existing Machines",
                "OEE",
                "Required Machines 2025",
                "Required Machines 2026",
                "Planned Capacity 2025",
                "Planned Capacity 2026",
                "Status 2025",
                "Status 2026",
            ]
        );
    }

    #[test]
    fn test_assessment_table_rows() {
        let table = AssessmentTable::build(&[assessment()], &YearRange::new(2026, 2026), 2);

        assert_eq!(table.len(), 1);
        assert_eq!(
            table.rows[0],
            vec!["Q1, Q2", "INVEST", "WC1 - Press", "2", "85.00", "2.50", "80.00", "INVEST"]
        );
    }

    #[test]
    fn test_missing_year_renders_zero() {
        let table = AssessmentTable::build(&[assessment()], &YearRange::new(2025, 2026), 1);
        let col = table.column("Required Machines 2025").unwrap();
        assert_eq!(table.rows[0][col], "0.0");
        let status = table.column("Status 2025").unwrap();
        assert_eq!(table.rows[0][status], "OK");
    }

    #[test]
    fn test_demand_simulation_table() {
        let table = DemandSimulationTable::build(&[assessment()], &YearRange::new(2026, 2026), 0);
        assert_eq!(table.rows[0], vec!["WC1", "2026", "0", "100", "100", "80", "68"]);
    }

    #[test]
    fn test_summary_table() {
        let summary = ExecutiveSummary {
            quotes_in_scenario: 3,
            work_centers_assessed: 5,
            work_centers_affected: 2,
            work_centers_invest: 1,
        };
        let table = SummaryTable::build(&summary);
        assert_eq!(table.len(), 4);
        assert_eq!(table.rows[3], vec!["Work Centers Requiring Investment", "1"]);
    }

    #[test]
    fn test_render_text_aligns_wide_characters() {
        let mut table = ReportTable::new(
            "t",
            vec!["Work Center".to_string(), "OEE".to_string()],
        );
        table.push_row(vec!["WC1 - 沖壓線".to_string(), "85".to_string()]);
        table.push_row(vec!["WC2 - Press".to_string(), "90".to_string()]);

        let text = table.render_text();
        let widths: Vec<usize> = text.lines().map(UnicodeWidthStr::width).collect();

        assert!(text.contains("WC1 - 沖壓線"));
        assert!(text.contains("WC2 - Press"));
        assert!(widths.len() >= 4);
        assert!(widths.iter().all(|w| *w == widths[0]));
    }
}
