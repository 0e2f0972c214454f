//! 模擬配置模型

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CapsimError, Result};

/// 途程表的標準欄位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingField {
    /// 報價識別碼
    QuoteId,
    /// 工作中心
    WorkCenter,
    /// 產出率
    Rate,
}

impl fmt::Display for RoutingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoutingField::QuoteId => "quote_id",
            RoutingField::WorkCenter => "work_center",
            RoutingField::Rate => "rate",
        };
        f.write_str(name)
    }
}

/// 欄位對應規則：表頭包含任一關鍵字即對應到該欄位
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRule {
    pub field: RoutingField,
    pub tokens: Vec<String>,
}

impl ColumnRule {
    pub fn new(field: RoutingField, tokens: &[&str]) -> Self {
        Self {
            field,
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// 已清理（大寫）的表頭是否符合此規則
    pub fn matches(&self, cleaned_header: &str) -> bool {
        self.tokens
            .iter()
            .any(|token| cleaned_header.contains(&token.to_uppercase()))
    }
}

/// 產能表欄位別名
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityColumns {
    /// 工作中心ID（精確比對）
    pub work_center_id: Vec<String>,

    /// 工作中心名稱（可選）
    pub work_center_name: Vec<String>,

    /// 現有機台數
    pub existing_machines: Vec<String>,

    /// OEE
    pub oee: Vec<String>,

    /// 年度欄中代表既有需求產能的關鍵字（優先判斷）
    pub required_tokens: Vec<String>,

    /// 年度欄中代表計劃產能的關鍵字
    pub planned_tokens: Vec<String>,

    /// 含這些關鍵字的年度欄不參與分類（例如有效產能）
    pub excluded_tokens: Vec<String>,
}

impl Default for CapacityColumns {
    fn default() -> Self {
        Self {
            work_center_id: strings(&[
                "WC",
                "WORK CENTER",
                "WC ID",
                "WORK CENTER ID",
                "CENTRO DE TRABALHO",
            ]),
            work_center_name: strings(&[
                "WC NAME",
                "WORK CENTER NAME",
                "NAME",
                "DESCRIPTION",
                "DESCRICAO",
            ]),
            existing_machines: strings(&[
                "MACHINES",
                "EXISTING MACHINES",
                "MAQUINAS",
                "QTY MACHINES",
            ]),
            oee: strings(&["OEE", "OEE (%)", "OEE %"]),
            required_tokens: strings(&["REQUIRED", "REQ", "NECESS", "DEMAND"]),
            planned_tokens: strings(&["PLANNED", "PLAN", "CAPACITY", "CAPACIDADE"]),
            excluded_tokens: strings(&["EFFECTIVE", "EFETIVA", "EFETIVO"]),
        }
    }
}

/// 模擬參數配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// 工作中心標準前綴
    pub work_center_prefix: String,

    /// 前期基準年數（報價年度向前延伸）
    pub baseline_lookback_years: u32,

    /// 報價識別碼欄位優先順序（精確比對）
    pub quote_id_aliases: Vec<String>,

    /// 專案欄位別名
    pub project_aliases: Vec<String>,

    /// 途程表欄位對應規則（依序套用）
    pub routing_columns: Vec<ColumnRule>,

    /// 產能表欄位別名
    pub capacity_columns: CapacityColumns,

    /// 顯示用小數位數
    pub display_decimals: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            work_center_prefix: "WC".to_string(),
            baseline_lookback_years: 1,
            quote_id_aliases: strings(&["RFQ", "LINK", "QUOTE", "QUOTE ID", "ID"]),
            project_aliases: strings(&["PROJECT", "PROJETO", "PROJ"]),
            routing_columns: vec![
                ColumnRule::new(RoutingField::QuoteId, &["ITEM", "RFQ", "ARTIGO", "QUOTE"]),
                ColumnRule::new(
                    RoutingField::WorkCenter,
                    &[
                        "WORK CENTER",
                        "WORKCENTER",
                        "CENTRO DE TRABALHO",
                        "CENTRO TRABALHO",
                        "WC",
                    ],
                ),
                ColumnRule::new(RoutingField::Rate, &["RATE", "TAXA"]),
            ],
            capacity_columns: CapacityColumns::default(),
            display_decimals: 2,
        }
    }
}

impl SimulationConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置工作中心前綴
    pub fn with_work_center_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.work_center_prefix = prefix.into();
        self
    }

    /// 建構器模式：設置前期基準年數
    pub fn with_baseline_lookback_years(mut self, years: u32) -> Self {
        self.baseline_lookback_years = years;
        self
    }

    /// 建構器模式：設置報價識別碼欄位優先順序
    pub fn with_quote_id_aliases(mut self, aliases: &[&str]) -> Self {
        self.quote_id_aliases = strings(aliases);
        self
    }

    /// 建構器模式：設置途程欄位規則
    pub fn with_routing_columns(mut self, rules: Vec<ColumnRule>) -> Self {
        self.routing_columns = rules;
        self
    }

    /// 建構器模式：設置顯示小數位數
    pub fn with_display_decimals(mut self, decimals: u32) -> Self {
        self.display_decimals = decimals;
        self
    }

    /// 工作中心ID正規化：去空白、轉大寫、補前綴
    ///
    /// 途程表與產能表都必須經過此轉換後才能比對。
    pub fn canonical_work_center(&self, raw: &str) -> Option<String> {
        let id: String = raw
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
            .collect::<String>()
            .to_uppercase();

        if id.is_empty() {
            return None;
        }

        let prefix = self.work_center_prefix.trim().to_uppercase();
        if prefix.is_empty() || id.starts_with(&prefix) {
            Some(id)
        } else {
            Some(format!("{}{}", prefix, id))
        }
    }

    /// 檢查配置是否可用
    pub fn validate(&self) -> Result<()> {
        if self.quote_id_aliases.is_empty() {
            return Err(CapsimError::InvalidInput(
                "報價識別碼欄位別名不可為空".to_string(),
            ));
        }

        for field in [RoutingField::QuoteId, RoutingField::WorkCenter, RoutingField::Rate] {
            let covered = self
                .routing_columns
                .iter()
                .any(|rule| rule.field == field && !rule.tokens.is_empty());
            if !covered {
                return Err(CapsimError::InvalidInput(format!(
                    "途程欄位 {} 沒有對應規則",
                    field
                )));
            }
        }

        if self.capacity_columns.work_center_id.is_empty() {
            return Err(CapsimError::InvalidInput(
                "工作中心欄位別名不可為空".to_string(),
            ));
        }

        Ok(())
    }

    /// 從 JSON 讀取配置（缺少的欄位使用預設值）
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CapsimError::InvalidInput(format!("配置 JSON 格式錯誤: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
