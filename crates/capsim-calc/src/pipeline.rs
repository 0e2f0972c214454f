//! 產能模擬主管線

use capsim_core::{RawTable, Scenario, SimulationConfig, Stage};

use crate::capacity_plan::CapacityPlanLoader;
use crate::demand::DemandDistributor;
use crate::investment::InvestmentClassifier;
use crate::quote_normalizer::QuoteNormalizer;
use crate::routing_normalizer::RoutingNormalizer;
use crate::{SimulationResult, SimulationWarning};

/// 參考表格（報價表、途程表、產能計劃表）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceTables {
    pub quotes: RawTable,
    pub routing: RawTable,
    pub capacity: RawTable,
}

impl ReferenceTables {
    pub fn new(quotes: RawTable, routing: RawTable, capacity: RawTable) -> Self {
        Self {
            quotes,
            routing,
            capacity,
        }
    }
}

/// 模擬管線
///
/// 參考表格載入後不再變動；每次 `run` 只依當次情境計算，不累積狀態。
pub struct SimulationPipeline {
    /// 模擬配置
    config: SimulationConfig,

    /// 參考表格
    tables: ReferenceTables,
}

impl SimulationPipeline {
    /// 創建新的模擬管線
    pub fn new(config: SimulationConfig, tables: ReferenceTables) -> Self {
        Self { config, tables }
    }

    /// 使用預設配置
    pub fn with_default_config(tables: ReferenceTables) -> Self {
        Self::new(SimulationConfig::default(), tables)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    /// 主模擬入口
    pub fn run(&self, scenario: &Scenario) -> capsim_core::Result<SimulationResult> {
        tracing::info!(
            "開始產能模擬：選定報價 {} 筆，假設報價 {} 筆，假設途程 {} 筆",
            scenario.selected_quote_ids.len(),
            scenario.hypothetical_quotes.len(),
            scenario.hypothetical_routing.len()
        );

        let start_time = std::time::Instant::now();

        // Step 1: 報價量正規化
        tracing::debug!("Step 1: 報價量正規化");
        let quotes = QuoteNormalizer::normalize(&self.tables.quotes, scenario, &self.config)?;
        let years = quotes.years;
        tracing::debug!("報價數量: {}, 年度範圍: {}-{}", quotes.quotes.len(), years.first, years.last);

        // Step 2: 途程表正規化
        tracing::debug!("Step 2: 途程表正規化");
        let routing = RoutingNormalizer::normalize(&self.tables.routing, scenario, &self.config)?;
        tracing::debug!("途程項目: {}", routing.entries.len());

        // Step 3: 需求分配
        tracing::debug!("Step 3: 需求分配");
        let demand = DemandDistributor::distribute(&quotes.quotes, &routing.entries, &years)?;

        // Step 4: 產能整合與投資判定
        tracing::debug!("Step 4: 產能整合與投資判定");
        let plan = CapacityPlanLoader::load(&self.tables.capacity, &years, &self.config)?;
        let assessments = InvestmentClassifier::assess(&plan.work_centers, &demand, &years)?;
        let unmatched = InvestmentClassifier::unmatched_work_centers(&plan.work_centers, &demand);

        let mut result = SimulationResult::empty(years);
        result.quote_ids = quotes.quotes.iter().map(|q| q.id.clone()).collect();

        result.warnings.extend(quotes.warnings);
        result.warnings.extend(routing.warnings);
        for quote_id in &demand.unrouted_quotes {
            result.add_warning(SimulationWarning::info(
                Stage::Demand,
                quote_id.clone(),
                "報價沒有任何途程，不產生需求".to_string(),
            ));
        }
        result.warnings.extend(plan.warnings);
        for work_center in unmatched {
            let warning = SimulationWarning::warning(
                Stage::Capacity,
                work_center,
                "工作中心有增量需求但不在產能計劃中，無法評估".to_string(),
            );
            tracing::warn!("{}", warning);
            result.add_warning(warning);
        }

        result.assessments =
            InvestmentClassifier::filter_affected(assessments, scenario.show_only_affected);
        result.demand = demand;
        result.calculation_time_ms = Some(start_time.elapsed().as_millis());

        tracing::info!("產能模擬完成，耗時 {:?}", start_time.elapsed());
        tracing::info!(
            "工作中心: {} 個，需要投資: {} 個",
            result.assessments.len(),
            result.invest_work_centers().len()
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capsim_core::{CapsimError, HypotheticalQuote, InvestmentStatus};
    use rust_decimal::Decimal;

    fn tables() -> ReferenceTables {
        ReferenceTables::new(
            RawTable::from_rows(
                "1_RFQ_DadosVendas",
                &["RFQ", "Project", "2026", "2027"],
                &[
                    &["Q1", "Alpha", "1000", "0"],
                    &["Q2", "Beta", "400", "400"],
                ],
            ),
            RawTable::from_rows(
                "2_LN_DadosExportados",
                &["Item", "Work Center", "Rate"],
                &[&["Q1", "WC1", "10"], &["Q3", "WC2", "10"]],
            ),
            RawTable::from_rows(
                "3_Industrial_Plan_Idash",
                &[
                    "WC",
                    "Machines",
                    "OEE",
                    "Required 2026",
                    "Planned 2026",
                    "Required 2027",
                    "Planned 2027",
                ],
                &[
                    &["WC1", "2", "85", "0", "50", "0", "50"],
                    &["WC2", "1", "85", "10", "100", "10", "100"],
                ],
            ),
        )
    }

    #[test]
    fn test_run_pipeline() {
        let pipeline = SimulationPipeline::with_default_config(tables());
        let scenario = Scenario::new().with_quotes(["Q1", "Q2"]);

        let result = pipeline.run(&scenario).unwrap();

        assert_eq!(result.quote_ids, vec!["Q1", "Q2"]);
        assert_eq!(result.assessments.len(), 2);

        let wc1 = &result.assessments[0];
        assert_eq!(wc1.work_center_id, "WC1");
        assert_eq!(wc1.year(2026).unwrap().required_machines, Decimal::from(4));
        assert_eq!(wc1.overall_status, InvestmentStatus::Invest);
        assert!(wc1.affected);

        let wc2 = &result.assessments[1];
        assert!(!wc2.affected);
        assert_eq!(wc2.overall_status, InvestmentStatus::Ok);

        // Q2 沒有途程
        assert!(result
            .warnings
            .iter()
            .any(|w| w.stage == Stage::Demand && w.subject == "Q2"));
        assert!(result.calculation_time_ms.is_some());
    }

    #[test]
    fn test_show_only_affected() {
        let pipeline = SimulationPipeline::with_default_config(tables());
        let scenario = Scenario::new()
            .with_quotes(["Q1", "Q2"])
            .with_show_only_affected(true);

        let result = pipeline.run(&scenario).unwrap();

        assert_eq!(result.assessments.len(), 1);
        assert_eq!(result.assessments[0].work_center_id, "WC1");
        assert_eq!(result.summary().work_centers_invest, 1);
    }

    #[test]
    fn test_hypothetical_work_center_outside_plan_warns() {
        let pipeline = SimulationPipeline::with_default_config(tables());
        let scenario = Scenario::new().with_hypothetical_quote(
            HypotheticalQuote::new("HYP1")
                .with_volume(2027, Decimal::from(500))
                .with_routing_text("WC9;5"),
        );

        let result = pipeline.run(&scenario).unwrap();

        assert_eq!(result.demand.demand("WC9", 2027), Decimal::from(100));
        assert!(result
            .warnings
            .iter()
            .any(|w| w.stage == Stage::Capacity && w.subject == "WC9"));
        assert!(result.assessments.iter().all(|a| !a.affected));
    }

    #[test]
    fn test_empty_selection_is_fatal() {
        let pipeline = SimulationPipeline::with_default_config(tables());
        let err = pipeline
            .run(&Scenario::new().with_quote("Q404"))
            .unwrap_err();
        assert_eq!(err.stage(), Some(Stage::QuoteVolumes));
    }

    #[test]
    fn test_schema_error_propagates() {
        let mut broken = tables();
        broken.routing = RawTable::from_rows("routing", &["Item", "Rate"], &[]);
        let pipeline = SimulationPipeline::with_default_config(broken);

        let err = pipeline.run(&Scenario::new().with_quote("Q1")).unwrap_err();
        assert!(matches!(err, CapsimError::Schema { stage: Stage::Routing, .. }));
    }

    #[test]
    fn test_runs_are_idempotent() {
        let pipeline = SimulationPipeline::with_default_config(tables());
        let scenario = Scenario::new().with_quotes(["Q1", "Q2"]);

        let first = pipeline.run(&scenario).unwrap();
        let second = pipeline.run(&scenario).unwrap();

        assert_eq!(first.assessments, second.assessments);
        assert_eq!(first.demand, second.demand);
        assert_eq!(first.warnings, second.warnings);
    }
}
