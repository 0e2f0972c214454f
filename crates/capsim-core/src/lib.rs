//! # Capsim Core
//!
//! 產能模擬核心資料模型與類型定義

pub mod assessment;
pub mod capacity;
pub mod config;
pub mod quote;
pub mod routing;
pub mod scenario;
pub mod table;

// Re-export 主要類型
pub use assessment::{IncrementalDemand, InvestmentAssessment, InvestmentStatus, YearAssessment};
pub use capacity::{CapacityYear, WorkCenterCapacity};
pub use config::{CapacityColumns, ColumnRule, RoutingField, SimulationConfig};
pub use quote::{HypotheticalQuote, Quote, YearRange};
pub use routing::{HypotheticalRouting, RoutingEntry};
pub use scenario::Scenario;
pub use table::RawTable;

use std::fmt;

/// 管線階段（用於錯誤訊息定位）
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// 報價量正規化
    QuoteVolumes,
    /// 途程表正規化
    Routing,
    /// 需求分配
    Demand,
    /// 產能整合與投資判定
    Capacity,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::QuoteVolumes => "報價量正規化",
            Stage::Routing => "途程表正規化",
            Stage::Demand => "需求分配",
            Stage::Capacity => "產能整合",
        };
        f.write_str(name)
    }
}

/// 產能模擬錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum CapsimError {
    #[error("[{stage}] 表格 {table} 缺少必要欄位: {}", missing.join(", "))]
    Schema {
        stage: Stage,
        table: String,
        missing: Vec<String>,
    },

    #[error("[{stage}] 篩選後無資料: {detail}")]
    EmptySelection { stage: Stage, detail: String },

    #[error("[需求分配] 報價 {quote_id} 於工作中心 {work_center} 的產出率無效: {rate}")]
    Division {
        quote_id: String,
        work_center: String,
        rate: String,
    },

    #[error("[{stage}] 工作中心 {work_center} 於 {year} 年數值溢位")]
    Overflow {
        stage: Stage,
        work_center: String,
        year: i32,
    },

    #[error("無效的輸入: {0}")]
    InvalidInput(String),

    #[error("其他錯誤: {0}")]
    Other(String),
}

impl CapsimError {
    /// 建立欄位缺失錯誤
    pub fn schema(stage: Stage, table: impl Into<String>, missing: Vec<String>) -> Self {
        Self::Schema {
            stage,
            table: table.into(),
            missing,
        }
    }

    /// 建立數值溢位錯誤
    pub fn overflow(stage: Stage, work_center: impl Into<String>, year: i32) -> Self {
        Self::Overflow {
            stage,
            work_center: work_center.into(),
            year,
        }
    }

    /// 錯誤發生的階段（非管線錯誤回傳 None）
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Schema { stage, .. }
            | Self::EmptySelection { stage, .. }
            | Self::Overflow { stage, .. } => Some(*stage),
            Self::Division { .. } => Some(Stage::Demand),
            Self::InvalidInput(_) | Self::Other(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CapsimError>;
