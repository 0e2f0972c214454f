//! # Capsim Calculation Engine
//!
//! 產能模擬計算管線：
//! 報價量正規化 → 途程表正規化 → 需求分配 → 產能整合與投資判定

pub mod capacity_plan;
pub mod column_mapping;
pub mod demand;
pub mod investment;
pub mod pipeline;
pub mod quote_normalizer;
pub mod report;
pub mod routing_normalizer;

// Re-export 主要類型
pub use capacity_plan::{CapacityPlan, CapacityPlanLoader};
pub use column_mapping::{CapacityLayout, ColumnMapping};
pub use demand::{DemandDetail, DemandDistribution, DemandDistributor};
pub use investment::InvestmentClassifier;
pub use pipeline::{ReferenceTables, SimulationPipeline};
pub use quote_normalizer::{NormalizedQuotes, QuoteNormalizer};
pub use report::{
    format_decimal, AssessmentTable, DemandDetailTable, DemandSimulationTable, ReportTable,
    SummaryTable,
};
pub use routing_normalizer::{NormalizedRouting, RoutingNormalizer};

use capsim_core::{InvestmentAssessment, Stage, YearRange};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// 模擬計算結果
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// 執行ID（僅供日誌追蹤）
    pub run_id: Uuid,

    /// 模擬年度範圍
    pub years: YearRange,

    /// 投資評估（依工作中心ID排序）
    pub assessments: Vec<InvestmentAssessment>,

    /// 需求分配明細
    pub demand: DemandDistribution,

    /// 情境中的報價（選定 + 假設）
    pub quote_ids: Vec<String>,

    /// 警告信息
    pub warnings: Vec<SimulationWarning>,

    /// 計算時間
    pub calculated_at: DateTime<Utc>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl SimulationResult {
    /// 創建空的計算結果
    pub fn empty(years: YearRange) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            years,
            assessments: Vec::new(),
            demand: DemandDistribution::default(),
            quote_ids: Vec::new(),
            warnings: Vec::new(),
            calculated_at: Utc::now(),
            calculation_time_ms: None,
        }
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: SimulationWarning) {
        self.warnings.push(warning);
    }

    /// 執行摘要
    pub fn summary(&self) -> ExecutiveSummary {
        ExecutiveSummary {
            quotes_in_scenario: self.quote_ids.len(),
            work_centers_assessed: self.assessments.len(),
            work_centers_affected: self.assessments.iter().filter(|a| a.affected).count(),
            work_centers_invest: self
                .assessments
                .iter()
                .filter(|a| a.requires_investment())
                .count(),
        }
    }

    /// 需要投資的工作中心
    pub fn invest_work_centers(&self) -> Vec<&InvestmentAssessment> {
        self.assessments
            .iter()
            .filter(|a| a.requires_investment())
            .collect()
    }
}

/// 執行摘要
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ExecutiveSummary {
    /// 情境中的報價數
    pub quotes_in_scenario: usize,
    /// 輸出的工作中心數
    pub work_centers_assessed: usize,
    /// 受影響的工作中心數
    pub work_centers_affected: usize,
    /// 需要投資的工作中心數
    pub work_centers_invest: usize,
}

/// 模擬警告
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SimulationWarning {
    pub stage: Stage,
    pub subject: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl SimulationWarning {
    pub fn new(stage: Stage, subject: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            stage,
            subject,
            message,
            severity,
        }
    }

    pub fn info(stage: Stage, subject: String, message: String) -> Self {
        Self::new(stage, subject, message, WarningSeverity::Info)
    }

    pub fn warning(stage: Stage, subject: String, message: String) -> Self {
        Self::new(stage, subject, message, WarningSeverity::Warning)
    }
}

impl std::fmt::Display for SimulationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.stage, self.subject, self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningSeverity {
    Info,
    Warning,
}
