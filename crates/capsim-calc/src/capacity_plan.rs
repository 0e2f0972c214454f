//! 產能計劃表載入

use capsim_core::table::parse_decimal;
use capsim_core::{RawTable, SimulationConfig, Stage, WorkCenterCapacity, YearRange};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::column_mapping::CapacityLayout;
use crate::SimulationWarning;

/// 產能計劃（依工作中心ID排序）
#[derive(Debug, Clone, Default)]
pub struct CapacityPlan {
    pub work_centers: Vec<WorkCenterCapacity>,
    pub warnings: Vec<SimulationWarning>,
}

impl CapacityPlan {
    /// 依ID查找
    pub fn get(&self, id: &str) -> Option<&WorkCenterCapacity> {
        self.work_centers.iter().find(|wc| wc.id == id)
    }
}

/// 產能計劃載入器
pub struct CapacityPlanLoader;

impl CapacityPlanLoader {
    /// 載入產能計劃表，年度依模擬範圍補齊（缺值為零）
    pub fn load(
        table: &RawTable,
        years: &YearRange,
        config: &SimulationConfig,
    ) -> capsim_core::Result<CapacityPlan> {
        let layout = CapacityLayout::resolve(table, &config.capacity_columns)?;
        let mut warnings = Vec::new();

        let missing_years: Vec<i32> = years
            .years()
            .filter(|year| !layout.planned.contains_key(year))
            .collect();
        if !missing_years.is_empty() {
            warnings.push(SimulationWarning::warning(
                Stage::Capacity,
                table.name.clone(),
                format!("缺少年度 {:?} 的計劃產能，視為零（判定為 OK）", missing_years),
            ));
        }

        let mut work_centers: BTreeMap<String, WorkCenterCapacity> = BTreeMap::new();

        for row in &table.rows {
            let Some(id) = config.canonical_work_center(RawTable::cell(row, layout.work_center_id))
            else {
                continue;
            };
            if work_centers.contains_key(&id) {
                warnings.push(SimulationWarning::warning(
                    Stage::Capacity,
                    id,
                    "產能表中重複出現，僅採用第一筆".to_string(),
                ));
                continue;
            }

            let name = layout
                .work_center_name
                .map(|col| RawTable::cell(row, col))
                .filter(|name| !name.is_empty())
                .unwrap_or(id.as_str())
                .to_string();

            let machines = parse_decimal(RawTable::cell(row, layout.existing_machines))
                .map(|m| m.max(Decimal::ZERO).trunc())
                .and_then(|m| m.to_u32())
                .unwrap_or(0);

            let oee = parse_decimal(RawTable::cell(row, layout.oee)).unwrap_or(Decimal::ZERO);

            let mut capacity = WorkCenterCapacity::new(id.clone(), machines)
                .with_name(name)
                .with_oee(oee);

            for year in years.years() {
                let required = Self::year_value(row, layout.required.get(&year));
                let planned = Self::year_value(row, layout.planned.get(&year));
                capacity = capacity.with_year(year, required, planned);
            }
            capacity.conform_to(years);

            work_centers.insert(id, capacity);
        }

        if work_centers.is_empty() {
            warnings.push(SimulationWarning::warning(
                Stage::Capacity,
                table.name.clone(),
                "產能表沒有任何工作中心".to_string(),
            ));
        }

        for warning in &warnings {
            tracing::warn!("{}", warning);
        }
        tracing::debug!("產能計劃載入完成: {} 個工作中心", work_centers.len());

        Ok(CapacityPlan {
            work_centers: work_centers.into_values().collect(),
            warnings,
        })
    }

    fn year_value(row: &[String], column: Option<&usize>) -> Decimal {
        column
            .and_then(|col| parse_decimal(RawTable::cell(row, *col)))
            .unwrap_or(Decimal::ZERO)
    }
}
