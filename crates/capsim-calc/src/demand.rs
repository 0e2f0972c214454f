//! 需求分配
//!
//! 報價 × 途程（依報價ID內連接），逐年計算 `需求 = 年度量 / 產出率`，
//! 再依工作中心彙總。

use capsim_core::{CapsimError, IncrementalDemand, Quote, RoutingEntry, YearRange};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// 需求明細（報價 × 工作中心 × 年度）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemandDetail {
    pub quote_id: String,
    pub work_center: String,
    pub year: i32,
    /// 年度預測量
    pub volume: Decimal,
    /// 產出率
    pub rate: Decimal,
    /// 所需工時/件數
    pub demand: Decimal,
}

/// 需求分配結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemandDistribution {
    /// 工作中心 → 增量需求（途程中的每個工作中心都有，年度已補齊；
    /// `quotes` 只記錄有預測量的報價）
    pub by_work_center: BTreeMap<String, IncrementalDemand>,

    /// 明細
    pub details: Vec<DemandDetail>,

    /// 沒有任何途程的報價（不產生需求）
    pub unrouted_quotes: Vec<String>,
}

impl DemandDistribution {
    /// 取得工作中心的增量需求
    pub fn get(&self, work_center: &str) -> Option<&IncrementalDemand> {
        self.by_work_center.get(work_center)
    }

    /// 取得工作中心某年度的增量需求（無則為零）
    pub fn demand(&self, work_center: &str, year: i32) -> Decimal {
        self.get(work_center)
            .map(|d| d.demand(year))
            .unwrap_or(Decimal::ZERO)
    }
}

/// 需求分配器
pub struct DemandDistributor;

impl DemandDistributor {
    /// 分配需求
    ///
    /// 產出率必須為正（由途程正規化保證）；若不成立即回報 `Division` 錯誤，
    /// 不產生無限大或未定義的需求。
    pub fn distribute(
        quotes: &[Quote],
        routing: &[RoutingEntry],
        years: &YearRange,
    ) -> capsim_core::Result<DemandDistribution> {
        let quote_map: HashMap<&str, &Quote> = quotes.iter().map(|q| (q.id.as_str(), q)).collect();
        let mut result = DemandDistribution::default();

        for entry in routing {
            let aggregate = result
                .by_work_center
                .entry(entry.work_center.clone())
                .or_insert_with(|| {
                    let mut demand = IncrementalDemand::new(entry.work_center.clone());
                    demand.years = years.years().map(|year| (year, Decimal::ZERO)).collect();
                    demand
                });

            let Some(quote) = quote_map.get(entry.quote_id.as_str()) else {
                continue;
            };

            if !entry.has_valid_rate() {
                return Err(CapsimError::Division {
                    quote_id: entry.quote_id.clone(),
                    work_center: entry.work_center.clone(),
                    rate: entry.rate.to_string(),
                });
            }

            if quote.has_volume() {
                aggregate.quotes.insert(quote.id.clone());
            }

            for year in years.years() {
                let volume = quote.volume(year);
                let demand = volume.checked_div(entry.rate).ok_or_else(|| CapsimError::Division {
                    quote_id: entry.quote_id.clone(),
                    work_center: entry.work_center.clone(),
                    rate: entry.rate.to_string(),
                })?;

                aggregate.add(year, demand)?;
                result.details.push(DemandDetail {
                    quote_id: quote.id.clone(),
                    work_center: entry.work_center.clone(),
                    year,
                    volume,
                    rate: entry.rate,
                    demand,
                });
            }
        }

        result.unrouted_quotes = quotes
            .iter()
            .filter(|q| !routing.iter().any(|r| r.quote_id == q.id))
            .map(|q| q.id.clone())
            .collect();

        if !result.unrouted_quotes.is_empty() {
            tracing::debug!("無途程的報價（不產生需求）: {:?}", result.unrouted_quotes);
        }
        tracing::debug!(
            "需求分配完成: {} 個工作中心, {} 筆明細",
            result.by_work_center.len(),
            result.details.len()
        );

        Ok(result)
    }
}
