//! 途程模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 途程項目（報價 → 工作中心，產出率）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingEntry {
    /// 報價識別碼
    pub quote_id: String,

    /// 工作中心（正規化後）
    pub work_center: String,

    /// 產出率（件/小時，必為正）
    pub rate: Decimal,
}

impl RoutingEntry {
    /// 創建新的途程項目
    pub fn new(quote_id: impl Into<String>, work_center: impl Into<String>, rate: Decimal) -> Self {
        Self {
            quote_id: quote_id.into(),
            work_center: work_center.into(),
            rate,
        }
    }

    /// 產出率是否可用於除法
    pub fn has_valid_rate(&self) -> bool {
        self.rate > Decimal::ZERO
    }
}

/// 使用者自訂的假設途程（結構化輸入）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HypotheticalRouting {
    pub quote_id: String,
    pub work_center: String,
    pub rate: Decimal,
}

impl HypotheticalRouting {
    pub fn new(quote_id: impl Into<String>, work_center: impl Into<String>, rate: Decimal) -> Self {
        Self {
            quote_id: quote_id.into(),
            work_center: work_center.into(),
            rate,
        }
    }
}
