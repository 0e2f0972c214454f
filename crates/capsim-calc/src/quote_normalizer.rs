//! 報價量正規化

use capsim_core::table::{parse_decimal, year_from_header};
use capsim_core::{
    CapsimError, Quote, RawTable, Scenario, SimulationConfig, Stage, YearRange,
};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

use crate::column_mapping::resolve_alias;
use crate::SimulationWarning;

/// 正規化後的報價表
#[derive(Debug, Clone)]
pub struct NormalizedQuotes {
    /// 模擬年度範圍（後續各階段共用）
    pub years: YearRange,

    /// 報價（依ID排序，年度已補齊）
    pub quotes: Vec<Quote>,

    /// 診斷訊息
    pub warnings: Vec<SimulationWarning>,
}

impl NormalizedQuotes {
    /// 所有報價ID
    pub fn ids(&self) -> BTreeSet<String> {
        self.quotes.iter().map(|q| q.id.clone()).collect()
    }

    /// 依ID查找
    pub fn get(&self, id: &str) -> Option<&Quote> {
        self.quotes.iter().find(|q| q.id == id)
    }
}

/// 報價量正規化器
pub struct QuoteNormalizer;

impl QuoteNormalizer {
    /// 正規化報價表
    ///
    /// 只保留選定報價與所有假設報價；缺值或非數值的年度量視為零。
    pub fn normalize(
        table: &RawTable,
        scenario: &Scenario,
        config: &SimulationConfig,
    ) -> capsim_core::Result<NormalizedQuotes> {
        let headers = table.cleaned_headers();
        let mut warnings = Vec::new();

        let id_col = resolve_alias(&headers, &config.quote_id_aliases).ok_or_else(|| {
            CapsimError::schema(
                Stage::QuoteVolumes,
                &table.name,
                vec![format!("quote_id ({})", config.quote_id_aliases.join(" / "))],
            )
        })?;
        let project_col = resolve_alias(&headers, &config.project_aliases);

        let mut year_cols: Vec<(i32, usize)> = headers
            .iter()
            .enumerate()
            .filter_map(|(idx, h)| year_from_header(h).map(|year| (year, idx)))
            .collect();
        year_cols.sort();
        year_cols.dedup_by_key(|(year, _)| *year);

        let quote_years: Vec<i32> = year_cols.iter().map(|(year, _)| *year).collect();
        let years = YearRange::from_quote_years(&quote_years, config.baseline_lookback_years)
            .ok_or_else(|| {
                CapsimError::schema(Stage::QuoteVolumes, &table.name, vec!["year columns".to_string()])
            })?;

        tracing::debug!(
            "報價表: 識別碼欄 {:?}, 年度 {:?}, 模擬範圍 {}-{}",
            table.headers[id_col],
            quote_years,
            years.first,
            years.last
        );

        let mut quotes: BTreeMap<String, Quote> = BTreeMap::new();

        for row in &table.rows {
            let id = RawTable::cell(row, id_col);
            if id.is_empty() || !scenario.selected_quote_ids.contains(id) {
                continue;
            }
            if quotes.contains_key(id) {
                warnings.push(SimulationWarning::warning(
                    Stage::QuoteVolumes,
                    id.to_string(),
                    "報價表中重複出現，僅採用第一筆".to_string(),
                ));
                continue;
            }

            let mut quote = Quote::new(id);
            if let Some(col) = project_col {
                let project = RawTable::cell(row, col);
                if !project.is_empty() {
                    quote = quote.with_project(project);
                }
            }

            for (year, col) in &year_cols {
                let volume = parse_decimal(RawTable::cell(row, *col)).unwrap_or(Decimal::ZERO);
                if volume < Decimal::ZERO {
                    warnings.push(SimulationWarning::warning(
                        Stage::QuoteVolumes,
                        id.to_string(),
                        format!("{} 年預測量為負值 ({})，以零計", year, volume),
                    ));
                }
                quote = quote.with_volume(*year, volume.max(Decimal::ZERO));
            }

            quote.conform_to(&years);
            quotes.insert(id.to_string(), quote);
        }

        for id in &scenario.selected_quote_ids {
            if !quotes.contains_key(id) {
                warnings.push(SimulationWarning::warning(
                    Stage::QuoteVolumes,
                    id.clone(),
                    "選定的報價不存在於報價表".to_string(),
                ));
            }
        }

        for hypothetical in &scenario.hypothetical_quotes {
            let mut quote = hypothetical.to_quote();
            if quote.id.is_empty() {
                warnings.push(SimulationWarning::warning(
                    Stage::QuoteVolumes,
                    "(hypothetical)".to_string(),
                    "假設報價缺少識別碼，已略過".to_string(),
                ));
                continue;
            }

            let outside: Vec<i32> = quote
                .volumes
                .keys()
                .copied()
                .filter(|year| !years.contains(*year))
                .collect();
            if !outside.is_empty() {
                warnings.push(SimulationWarning::warning(
                    Stage::QuoteVolumes,
                    quote.id.clone(),
                    format!("年度 {:?} 超出模擬範圍，已忽略", outside),
                ));
            }

            quote.conform_to(&years);
            if quotes.insert(quote.id.clone(), quote).is_some() {
                warnings.push(SimulationWarning::warning(
                    Stage::QuoteVolumes,
                    hypothetical.id.trim().to_string(),
                    "假設報價覆蓋了報價表中的同名報價".to_string(),
                ));
            }
        }

        if quotes.is_empty() {
            return Err(CapsimError::EmptySelection {
                stage: Stage::QuoteVolumes,
                detail: format!(
                    "選定的 {} 筆報價皆不存在於 {}，且沒有假設報價",
                    scenario.selected_quote_ids.len(),
                    table.name
                ),
            });
        }

        for warning in &warnings {
            tracing::warn!("{}", warning);
        }
        tracing::debug!("報價正規化完成: {} 筆", quotes.len());

        Ok(NormalizedQuotes {
            years,
            quotes: quotes.into_values().collect(),
            warnings,
        })
    }
}
