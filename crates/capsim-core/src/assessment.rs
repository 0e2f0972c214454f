//! 增量需求與投資評估模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::{CapsimError, Stage};

/// 投資判定
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InvestmentStatus {
    /// 產能足夠
    #[default]
    Ok,
    /// 需要投資（增加機台）
    Invest,
}

impl InvestmentStatus {
    /// 所需機台是否超過現有機台
    pub fn classify(required_machines: Decimal, existing_machines: Decimal) -> Self {
        if required_machines > existing_machines {
            Self::Invest
        } else {
            Self::Ok
        }
    }

    /// 任一年度需投資即為需投資
    pub fn overall<I: IntoIterator<Item = Self>>(statuses: I) -> Self {
        if statuses.into_iter().any(|s| s == Self::Invest) {
            Self::Invest
        } else {
            Self::Ok
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Invest => "INVEST",
        }
    }
}

impl fmt::Display for InvestmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 增量需求（單一工作中心，依年度彙總）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncrementalDemand {
    /// 工作中心ID
    pub work_center: String,

    /// 年度 → 所需工時/件數
    pub years: BTreeMap<i32, Decimal>,

    /// 貢獻需求的報價
    pub quotes: BTreeSet<String>,
}

impl IncrementalDemand {
    /// 創建空的增量需求
    pub fn new(work_center: impl Into<String>) -> Self {
        Self {
            work_center: work_center.into(),
            years: BTreeMap::new(),
            quotes: BTreeSet::new(),
        }
    }

    /// 累加某年度需求，溢位時回報 `Overflow`
    pub fn add(&mut self, year: i32, demand: Decimal) -> crate::Result<()> {
        let total = self.years.entry(year).or_insert(Decimal::ZERO);
        *total = total
            .checked_add(demand)
            .ok_or_else(|| CapsimError::overflow(Stage::Demand, self.work_center.clone(), year))?;
        Ok(())
    }

    /// 取得年度需求（缺值為零）
    pub fn demand(&self, year: i32) -> Decimal {
        self.years.get(&year).copied().unwrap_or(Decimal::ZERO)
    }

    /// 是否有任一年度需求為正
    pub fn is_positive(&self) -> bool {
        self.years.values().any(|d| *d > Decimal::ZERO)
    }
}

/// 單一年度的評估結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearAssessment {
    /// 既有需求產能（自然需求）
    pub baseline_required: Decimal,

    /// 本次報價帶來的增量需求
    pub incremental_demand: Decimal,

    /// 計劃產能
    pub planned_capacity: Decimal,

    /// 有效產能（計劃產能 × OEE，僅供參考）
    pub effective_capacity: Decimal,

    /// 所需機台數（連續值，不取整）
    pub required_machines: Decimal,

    /// 年度判定
    pub status: InvestmentStatus,
}

impl YearAssessment {
    /// 模擬總需求 = 自然需求 + 報價需求（溢位時取上限）
    pub fn total_demand(&self) -> Decimal {
        self.baseline_required.saturating_add(self.incremental_demand)
    }
}

/// 投資評估記錄（每個工作中心一筆，每次完整重算）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestmentAssessment {
    /// 工作中心ID
    pub work_center_id: String,

    /// 工作中心名稱
    pub work_center_name: String,

    /// 現有機台數
    pub existing_machines: u32,

    /// OEE
    pub oee: Decimal,

    /// 年度 → 評估
    pub years: BTreeMap<i32, YearAssessment>,

    /// 整體判定
    pub overall_status: InvestmentStatus,

    /// 是否受本次報價選擇影響
    pub affected: bool,

    /// 影響此工作中心的報價（排序）
    pub quote_context: Vec<String>,
}

impl InvestmentAssessment {
    /// 是否需要投資
    pub fn requires_investment(&self) -> bool {
        self.overall_status == InvestmentStatus::Invest
    }

    /// 需要投資的年度
    pub fn invest_years(&self) -> Vec<i32> {
        self.years
            .iter()
            .filter(|(_, y)| y.status == InvestmentStatus::Invest)
            .map(|(year, _)| *year)
            .collect()
    }

    /// 取得年度評估
    pub fn year(&self, year: i32) -> Option<&YearAssessment> {
        self.years.get(&year)
    }

    /// 顯示名稱（名稱與ID相同時只顯示ID）
    pub fn display_name(&self) -> String {
        if self.work_center_name.is_empty() || self.work_center_name == self.work_center_id {
            self.work_center_id.clone()
        } else {
            format!("{} - {}", self.work_center_id, self.work_center_name)
        }
    }
}
