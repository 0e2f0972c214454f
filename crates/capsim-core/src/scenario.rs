//! 模擬情境（單次請求的選擇狀態）

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::quote::HypotheticalQuote;
use crate::routing::HypotheticalRouting;
use crate::{CapsimError, Result};

/// 模擬情境
///
/// 每次請求獨立傳入管線，不存在任何行程層級的共享狀態。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// 選定的報價識別碼
    pub selected_quote_ids: BTreeSet<String>,

    /// 假設報價
    pub hypothetical_quotes: Vec<HypotheticalQuote>,

    /// 結構化的假設途程
    pub hypothetical_routing: Vec<HypotheticalRouting>,

    /// 只輸出受影響的工作中心
    pub show_only_affected: bool,
}

impl Scenario {
    /// 創建空情境
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：加入報價（空白忽略，重複忽略）
    pub fn with_quote(mut self, quote_id: impl AsRef<str>) -> Self {
        self.add_quote(quote_id);
        self
    }

    /// 建構器模式：加入多個報價
    pub fn with_quotes<I, S>(mut self, quote_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in quote_ids {
            self.add_quote(id);
        }
        self
    }

    /// 建構器模式：加入假設報價
    pub fn with_hypothetical_quote(mut self, quote: HypotheticalQuote) -> Self {
        self.hypothetical_quotes.push(quote);
        self
    }

    /// 建構器模式：加入結構化假設途程
    pub fn with_hypothetical_routing(mut self, routing: HypotheticalRouting) -> Self {
        self.hypothetical_routing.push(routing);
        self
    }

    /// 建構器模式：設置是否只顯示受影響工作中心
    pub fn with_show_only_affected(mut self, only_affected: bool) -> Self {
        self.show_only_affected = only_affected;
        self
    }

    /// 加入報價
    pub fn add_quote(&mut self, quote_id: impl AsRef<str>) -> bool {
        let id = quote_id.as_ref().trim();
        if id.is_empty() {
            return false;
        }
        self.selected_quote_ids.insert(id.to_string())
    }

    /// 移除報價
    pub fn remove_quote(&mut self, quote_id: &str) -> bool {
        self.selected_quote_ids.remove(quote_id.trim())
    }

    /// 清空選擇
    pub fn clear(&mut self) {
        self.selected_quote_ids.clear();
        self.hypothetical_quotes.clear();
        self.hypothetical_routing.clear();
    }

    /// 假設報價識別碼
    pub fn hypothetical_ids(&self) -> BTreeSet<String> {
        self.hypothetical_quotes
            .iter()
            .map(|q| q.id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect()
    }

    /// 本次模擬的所有報價識別碼（選定 + 假設）
    pub fn active_quote_ids(&self) -> BTreeSet<String> {
        let mut ids = self.selected_quote_ids.clone();
        ids.extend(self.hypothetical_ids());
        ids
    }

    /// 情境是否沒有任何報價
    pub fn is_empty(&self) -> bool {
        self.selected_quote_ids.is_empty() && self.hypothetical_ids().is_empty()
    }

    /// 從 JSON 讀取情境
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| CapsimError::InvalidInput(format!("情境 JSON 格式錯誤: {}", e)))
    }

    /// 序列化為 JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| CapsimError::Other(e.to_string()))
    }
}
