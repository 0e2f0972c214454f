//! 原始表格模型（工作表解析後的行列資料）

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::OnceLock;

/// 原始表格
///
/// 由外部匯入層產生，核心只讀取，不修改。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    /// 表格名稱（工作表名）
    pub name: String,

    /// 表頭（原始字串，未清理）
    pub headers: Vec<String>,

    /// 資料行
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// 創建新的表格
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// 建構器模式：從字串切片建立（測試與示例用）
    pub fn from_rows(name: &str, headers: &[&str], rows: &[&[&str]]) -> Self {
        Self::new(
            name,
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    /// 清理後的表頭
    pub fn cleaned_headers(&self) -> Vec<String> {
        self.headers.iter().map(|h| clean_header(h)).collect()
    }

    /// 依清理後的名稱精確查找欄位
    pub fn find_column(&self, name: &str) -> Option<usize> {
        let target = clean_header(name);
        self.cleaned_headers().iter().position(|h| *h == target)
    }

    /// 讀取儲存格（越界視為空白）
    pub fn cell<'a>(row: &'a [String], index: usize) -> &'a str {
        row.get(index).map(|c| c.trim()).unwrap_or("")
    }

    /// 行數
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 是否無資料行
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 清理表頭：去除換行、不斷行空白，壓縮空白並轉大寫
pub fn clean_header(raw: &str) -> String {
    raw.replace(['\n', '\r', '\t', '\u{a0}'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// 純數字表頭視為年度欄
pub fn year_from_header(header: &str) -> Option<i32> {
    let cleaned = clean_header(header);
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    cleaned.parse().ok()
}

/// 四位數年度（前後不得緊接其他數字）
fn year_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?:^|[^0-9])([0-9]{4})(?:[^0-9]|$)").ok())
        .as_ref()
}

/// 從表頭中擷取四位數年度（例如 "PLANNED 2026"）
pub fn embedded_year(header: &str) -> Option<i32> {
    year_pattern()?.captures(header)?.get(1)?.as_str().parse().ok()
}

/// 數值轉換
///
/// 接受 `%` 結尾、千分位空白，以及無小數點時的小數逗號；
/// 無法解析回傳 None，由呼叫端決定補零或排除。
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let mut text: String = raw
        .trim()
        .trim_end_matches('%')
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .collect();

    if text.is_empty() {
        return None;
    }

    if text.contains(',') {
        if text.contains('.') {
            text = text.replace(',', "");
        } else {
            text = text.replace(',', ".");
        }
    }

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}
