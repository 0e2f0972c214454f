//! 報價（RFQ）模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 模擬年度範圍（含首尾）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    /// 起始年度（含前期基準年）
    pub first: i32,
    /// 結束年度
    pub last: i32,
}

impl YearRange {
    /// 創建新的年度範圍
    pub fn new(first: i32, last: i32) -> Self {
        Self {
            first: first.min(last),
            last: first.max(last),
        }
    }

    /// 由報價表年度欄推導，向前延伸 `lookback` 年作為前期基準
    pub fn from_quote_years(years: &[i32], lookback: u32) -> Option<Self> {
        let min = *years.iter().min()?;
        let max = *years.iter().max()?;
        Some(Self::new(min - lookback as i32, max))
    }

    /// 所有年度（遞增）
    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.first..=self.last
    }

    /// 是否包含該年度
    pub fn contains(&self, year: i32) -> bool {
        year >= self.first && year <= self.last
    }

    /// 年度數量
    pub fn year_count(&self) -> usize {
        self.years().count()
    }
}

/// 報價（單次模擬有效）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// 報價識別碼
    pub id: String,

    /// 專案標籤
    pub project: Option<String>,

    /// 年度 → 預測量（缺值為零）
    pub volumes: BTreeMap<i32, Decimal>,

    /// 是否為使用者自訂的假設報價
    pub hypothetical: bool,
}

impl Quote {
    /// 創建新的報價
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            project: None,
            volumes: BTreeMap::new(),
            hypothetical: false,
        }
    }

    /// 建構器模式：設置專案
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// 建構器模式：設置年度量
    pub fn with_volume(mut self, year: i32, volume: Decimal) -> Self {
        self.volumes.insert(year, volume);
        self
    }

    /// 建構器模式：標記為假設報價
    pub fn as_hypothetical(mut self) -> Self {
        self.hypothetical = true;
        self
    }

    /// 取得年度量（缺值為零）
    pub fn volume(&self, year: i32) -> Decimal {
        self.volumes.get(&year).copied().unwrap_or(Decimal::ZERO)
    }

    /// 補齊年度範圍內缺少的年度（補零），並移除範圍外年度
    pub fn conform_to(&mut self, range: &YearRange) {
        self.volumes.retain(|year, _| range.contains(*year));
        for year in range.years() {
            self.volumes.entry(year).or_insert(Decimal::ZERO);
        }
    }

    /// 是否有任一年度預測量為正
    pub fn has_volume(&self) -> bool {
        self.volumes.values().any(|v| *v > Decimal::ZERO)
    }
}

/// 使用者自訂的假設報價
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HypotheticalQuote {
    /// 報價識別碼（不需存在於報價表）
    pub id: String,

    /// 專案標籤
    pub project: Option<String>,

    /// 年度 → 預測量
    pub volumes: BTreeMap<i32, Decimal>,

    /// 途程文字：每行一筆 `工作中心;產出率`
    pub routing_text: String,
}

impl HypotheticalQuote {
    /// 創建新的假設報價
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// 建構器模式：設置專案
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// 建構器模式：設置年度量
    pub fn with_volume(mut self, year: i32, volume: Decimal) -> Self {
        self.volumes.insert(year, volume);
        self
    }

    /// 建構器模式：設置途程文字
    pub fn with_routing_text(mut self, text: impl Into<String>) -> Self {
        self.routing_text = text.into();
        self
    }

    /// 轉換為報價（負值視為零）
    pub fn to_quote(&self) -> Quote {
        let volumes = self
            .volumes
            .iter()
            .map(|(year, volume)| (*year, (*volume).max(Decimal::ZERO)))
            .collect();

        Quote {
            id: self.id.trim().to_string(),
            project: self.project.clone(),
            volumes,
            hypothetical: true,
        }
    }
}
