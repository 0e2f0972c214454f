//! 途程表正規化

use capsim_core::table::parse_decimal;
use capsim_core::{RawTable, RoutingEntry, Scenario, SimulationConfig, Stage};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

use crate::column_mapping::ColumnMapping;
use crate::SimulationWarning;

/// 假設途程文字的分隔符號
pub const HYPOTHETICAL_SEPARATOR: char = ';';

/// 正規化後的途程表
#[derive(Debug, Clone, Default)]
pub struct NormalizedRouting {
    /// 途程項目（產出率皆為正，工作中心已正規化）
    pub entries: Vec<RoutingEntry>,

    /// 診斷訊息
    pub warnings: Vec<SimulationWarning>,
}

impl NormalizedRouting {
    /// 出現在途程中的工作中心
    pub fn work_centers(&self) -> BTreeSet<String> {
        self.entries.iter().map(|e| e.work_center.clone()).collect()
    }

    /// 某報價的途程
    pub fn for_quote<'a>(&'a self, quote_id: &'a str) -> impl Iterator<Item = &'a RoutingEntry> {
        self.entries.iter().filter(move |e| e.quote_id == quote_id)
    }
}

/// 途程表正規化器
pub struct RoutingNormalizer;

impl RoutingNormalizer {
    /// 正規化途程表並合併假設途程
    ///
    /// 缺少識別碼/工作中心/產出率的行、產出率非數值或非正的行一律排除。
    pub fn normalize(
        table: &RawTable,
        scenario: &Scenario,
        config: &SimulationConfig,
    ) -> capsim_core::Result<NormalizedRouting> {
        let mapping = ColumnMapping::resolve(table, &config.routing_columns)?;
        let active_ids = scenario.active_quote_ids();

        let mut result = NormalizedRouting::default();
        let mut incomplete_rows = 0usize;
        let mut invalid_rates = 0usize;

        for row in &table.rows {
            let quote_id = RawTable::cell(row, mapping.quote_id);
            let raw_work_center = RawTable::cell(row, mapping.work_center);
            let raw_rate = RawTable::cell(row, mapping.rate);

            if quote_id.is_empty() || raw_work_center.is_empty() || raw_rate.is_empty() {
                incomplete_rows += 1;
                continue;
            }
            if !active_ids.contains(quote_id) {
                continue;
            }

            let rate = match parse_decimal(raw_rate) {
                Some(rate) if rate > Decimal::ZERO => rate,
                _ => {
                    invalid_rates += 1;
                    continue;
                }
            };

            let Some(work_center) = config.canonical_work_center(raw_work_center) else {
                incomplete_rows += 1;
                continue;
            };

            result
                .entries
                .push(RoutingEntry::new(quote_id, work_center, rate));
        }

        if incomplete_rows > 0 {
            tracing::debug!("途程表略過 {} 筆不完整的行", incomplete_rows);
        }
        if invalid_rates > 0 {
            result.warnings.push(SimulationWarning::info(
                Stage::Routing,
                table.name.clone(),
                format!("{} 筆選定報價的途程產出率無效，已排除", invalid_rates),
            ));
        }

        let from_table = result.entries.len();

        for hypothetical in &scenario.hypothetical_quotes {
            let quote_id = hypothetical.id.trim();
            if quote_id.is_empty() {
                continue;
            }
            let (entries, warnings) =
                Self::parse_hypothetical_routing(quote_id, &hypothetical.routing_text, config);
            result.entries.extend(entries);
            result.warnings.extend(warnings);
        }

        for routing in &scenario.hypothetical_routing {
            let quote_id = routing.quote_id.trim();
            if !active_ids.contains(quote_id) {
                result.warnings.push(SimulationWarning::warning(
                    Stage::Routing,
                    quote_id.to_string(),
                    "假設途程所屬報價不在本次情境中，已略過".to_string(),
                ));
                continue;
            }
            match config.canonical_work_center(&routing.work_center) {
                Some(work_center) if routing.rate > Decimal::ZERO => {
                    result
                        .entries
                        .push(RoutingEntry::new(quote_id, work_center, routing.rate));
                }
                _ => result.warnings.push(SimulationWarning::warning(
                    Stage::Routing,
                    quote_id.to_string(),
                    format!(
                        "假設途程 {:?} 產出率 {} 無效，已略過",
                        routing.work_center, routing.rate
                    ),
                )),
            }
        }

        for warning in &result.warnings {
            tracing::warn!("{}", warning);
        }
        tracing::debug!(
            "途程正規化完成: 途程表 {} 筆, 假設途程 {} 筆",
            from_table,
            result.entries.len() - from_table
        );

        Ok(result)
    }

    /// 解析假設途程文字（每行 `工作中心;產出率`）
    ///
    /// 寬鬆解析：空行與缺少分隔符號的行直接略過，不中止模擬；
    /// 產出率無效的行略過並回報警告。
    pub fn parse_hypothetical_routing(
        quote_id: &str,
        text: &str,
        config: &SimulationConfig,
    ) -> (Vec<RoutingEntry>, Vec<SimulationWarning>) {
        let mut entries = Vec::new();
        let mut warnings = Vec::new();

        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let Some((raw_work_center, raw_rate)) = line.split_once(HYPOTHETICAL_SEPARATOR) else {
                tracing::debug!("假設途程第 {} 行缺少分隔符號，略過: {:?}", line_no + 1, line);
                continue;
            };

            let work_center = config.canonical_work_center(raw_work_center);
            let rate = parse_decimal(raw_rate).filter(|r| *r > Decimal::ZERO);

            match (work_center, rate) {
                (Some(work_center), Some(rate)) => {
                    entries.push(RoutingEntry::new(quote_id, work_center, rate));
                }
                _ => warnings.push(SimulationWarning::warning(
                    Stage::Routing,
                    quote_id.to_string(),
                    format!("假設途程第 {} 行無效，已略過: {:?}", line_no + 1, line),
                )),
            }
        }

        (entries, warnings)
    }
}
