//! 產能整合與投資判定

use capsim_core::{
    CapsimError, InvestmentAssessment, InvestmentStatus, Stage, WorkCenterCapacity,
    YearAssessment, YearRange,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::demand::DemandDistribution;

/// 投資判定器
pub struct InvestmentClassifier;

impl InvestmentClassifier {
    /// 所需機台數
    ///
    /// `((既有需求 + 增量需求) / 計劃產能) × 現有機台數`。
    /// 計劃產能為零或缺值時所需機台定義為零，判定為 OK。結果不取整。
    /// 超出 `Decimal` 範圍時回傳 `None`。
    pub fn required_machines(
        baseline_required: Decimal,
        incremental_demand: Decimal,
        planned_capacity: Decimal,
        existing_machines: u32,
    ) -> Option<Decimal> {
        if planned_capacity <= Decimal::ZERO {
            return Some(Decimal::ZERO);
        }
        baseline_required
            .checked_add(incremental_demand)?
            .checked_div(planned_capacity)?
            .checked_mul(Decimal::from(existing_machines))
    }

    /// 評估單一工作中心
    pub fn assess_work_center(
        capacity: &WorkCenterCapacity,
        demand: &DemandDistribution,
        years: &YearRange,
    ) -> capsim_core::Result<InvestmentAssessment> {
        let incremental = demand.get(&capacity.id);
        let existing = Decimal::from(capacity.existing_machines);

        let mut year_assessments = BTreeMap::new();
        for year in years.years() {
            let base = capacity.year(year);
            let incremental_demand = incremental
                .map(|d| d.demand(year))
                .unwrap_or(Decimal::ZERO);
            let required_machines = Self::required_machines(
                base.required,
                incremental_demand,
                base.planned,
                capacity.existing_machines,
            )
            .ok_or_else(|| CapsimError::overflow(Stage::Capacity, capacity.id.clone(), year))?;

            year_assessments.insert(
                year,
                YearAssessment {
                    baseline_required: base.required,
                    incremental_demand,
                    planned_capacity: base.planned,
                    effective_capacity: capacity.effective_capacity(year)?,
                    required_machines,
                    status: InvestmentStatus::classify(required_machines, existing),
                },
            );
        }

        let overall_status = InvestmentStatus::overall(year_assessments.values().map(|y| y.status));
        let affected = year_assessments
            .values()
            .any(|y| y.incremental_demand > Decimal::ZERO);
        let quote_context = incremental
            .map(|d| d.quotes.iter().cloned().collect())
            .unwrap_or_default();

        Ok(InvestmentAssessment {
            work_center_id: capacity.id.clone(),
            work_center_name: capacity.name.clone(),
            existing_machines: capacity.existing_machines,
            oee: capacity.oee,
            years: year_assessments,
            overall_status,
            affected,
            quote_context,
        })
    }

    /// 以產能計劃左連接增量需求，產生全部評估
    ///
    /// 沒有需求的工作中心仍以既有基準評估。
    pub fn assess(
        capacities: &[WorkCenterCapacity],
        demand: &DemandDistribution,
        years: &YearRange,
    ) -> capsim_core::Result<Vec<InvestmentAssessment>> {
        let mut assessments = capacities
            .iter()
            .map(|capacity| Self::assess_work_center(capacity, demand, years))
            .collect::<capsim_core::Result<Vec<_>>>()?;
        assessments.sort_by(|a, b| a.work_center_id.cmp(&b.work_center_id));
        Ok(assessments)
    }

    /// 有需求但不在產能計劃中的工作中心（需求無法評估）
    pub fn unmatched_work_centers(
        capacities: &[WorkCenterCapacity],
        demand: &DemandDistribution,
    ) -> Vec<String> {
        demand
            .by_work_center
            .values()
            .filter(|d| d.is_positive())
            .filter(|d| !capacities.iter().any(|c| c.id == d.work_center))
            .map(|d| d.work_center.clone())
            .collect()
    }

    /// 只保留受影響的工作中心
    pub fn filter_affected(
        assessments: Vec<InvestmentAssessment>,
        only_affected: bool,
    ) -> Vec<InvestmentAssessment> {
        if !only_affected {
            return assessments;
        }
        assessments.into_iter().filter(|a| a.affected).collect()
    }
}
