//! 工作中心產能模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::quote::YearRange;
use crate::{CapsimError, Stage};

/// 單一年度的產能基準
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityYear {
    /// 既有需求產能（與本次報價選擇無關）
    pub required: Decimal,

    /// 計劃產能（現有機台與 OEE 下可用產能）
    pub planned: Decimal,
}

impl CapacityYear {
    pub fn new(required: Decimal, planned: Decimal) -> Self {
        Self { required, planned }
    }
}

/// 工作中心產能記錄（模擬期間唯讀）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkCenterCapacity {
    /// 工作中心ID（正規化後，唯一）
    pub id: String,

    /// 顯示名稱
    pub name: String,

    /// 現有機台數
    pub existing_machines: u32,

    /// OEE（百分比或比例，依原始資料）
    pub oee: Decimal,

    /// 年度 → 產能基準
    pub years: BTreeMap<i32, CapacityYear>,
}

impl WorkCenterCapacity {
    /// 創建新的產能記錄（名稱預設為ID）
    pub fn new(id: impl Into<String>, existing_machines: u32) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            existing_machines,
            oee: Decimal::ZERO,
            years: BTreeMap::new(),
        }
    }

    /// 建構器模式：設置名稱
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 建構器模式：設置 OEE
    pub fn with_oee(mut self, oee: Decimal) -> Self {
        self.oee = oee;
        self
    }

    /// 建構器模式：設置年度產能
    pub fn with_year(mut self, year: i32, required: Decimal, planned: Decimal) -> Self {
        self.years.insert(year, CapacityYear::new(required, planned));
        self
    }

    /// 取得年度產能（缺值為零）
    pub fn year(&self, year: i32) -> CapacityYear {
        self.years.get(&year).copied().unwrap_or_default()
    }

    /// OEE 比例：大於 1 視為百分比
    pub fn oee_fraction(&self) -> Decimal {
        if self.oee > Decimal::ONE {
            self.oee / Decimal::ONE_HUNDRED
        } else {
            self.oee
        }
    }

    /// 有效產能 = 計劃產能 × OEE（僅供參考，不參與投資判定）
    pub fn effective_capacity(&self, year: i32) -> crate::Result<Decimal> {
        self.year(year)
            .planned
            .checked_mul(self.oee_fraction())
            .ok_or_else(|| CapsimError::overflow(Stage::Capacity, self.id.clone(), year))
    }

    /// 補齊年度範圍（補零），並移除範圍外年度
    pub fn conform_to(&mut self, range: &YearRange) {
        self.years.retain(|year, _| range.contains(*year));
        for year in range.years() {
            self.years.entry(year).or_default();
        }
    }
}
