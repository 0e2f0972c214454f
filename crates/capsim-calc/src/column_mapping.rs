//! 欄位對應
//!
//! 將來源表頭對應到標準欄位。所有比對都在 [`clean_header`] 之後進行；
//! 無法對應的必要欄位一律回報 `Schema` 錯誤，不做進一步猜測。

use capsim_core::table::{clean_header, embedded_year};
use capsim_core::{CapacityColumns, CapsimError, ColumnRule, RawTable, RoutingField, Stage};
use std::collections::{BTreeMap, HashMap, HashSet};

/// 依優先順序精確比對別名，回傳第一個符合的欄位索引
pub fn resolve_alias(cleaned_headers: &[String], aliases: &[String]) -> Option<usize> {
    aliases.iter().find_map(|alias| {
        let target = clean_header(alias);
        cleaned_headers.iter().position(|h| *h == target)
    })
}

/// 途程表欄位對應結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    pub quote_id: usize,
    pub work_center: usize,
    pub rate: usize,
}

impl ColumnMapping {
    /// 依規則表解析途程表欄位
    ///
    /// 規則依序套用，每個標準欄位取第一個尚未被佔用且包含關鍵字的表頭。
    pub fn resolve(table: &RawTable, rules: &[ColumnRule]) -> capsim_core::Result<Self> {
        let headers = table.cleaned_headers();
        let mut claimed: HashSet<usize> = HashSet::new();
        let mut resolved: HashMap<RoutingField, usize> = HashMap::new();

        for rule in rules {
            if resolved.contains_key(&rule.field) {
                continue;
            }

            let found = headers
                .iter()
                .enumerate()
                .find(|(idx, header)| !claimed.contains(idx) && rule.matches(header))
                .map(|(idx, _)| idx);

            if let Some(idx) = found {
                tracing::debug!("途程欄位 {} → {:?}", rule.field, table.headers[idx]);
                claimed.insert(idx);
                resolved.insert(rule.field, idx);
            }
        }

        let lookup = |field: RoutingField| resolved.get(&field).copied();
        match (
            lookup(RoutingField::QuoteId),
            lookup(RoutingField::WorkCenter),
            lookup(RoutingField::Rate),
        ) {
            (Some(quote_id), Some(work_center), Some(rate)) => Ok(Self {
                quote_id,
                work_center,
                rate,
            }),
            _ => {
                let missing = [RoutingField::QuoteId, RoutingField::WorkCenter, RoutingField::Rate]
                    .into_iter()
                    .filter(|field| !resolved.contains_key(field))
                    .map(|field| field.to_string())
                    .collect();
                Err(CapsimError::schema(Stage::Routing, &table.name, missing))
            }
        }
    }
}

/// 產能表欄位配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityLayout {
    pub work_center_id: usize,
    pub work_center_name: Option<usize>,
    pub existing_machines: usize,
    pub oee: usize,

    /// 年度 → 既有需求產能欄
    pub required: BTreeMap<i32, usize>,

    /// 年度 → 計劃產能欄
    pub planned: BTreeMap<i32, usize>,
}

impl CapacityLayout {
    /// 解析產能表欄位
    pub fn resolve(table: &RawTable, columns: &CapacityColumns) -> capsim_core::Result<Self> {
        let headers = table.cleaned_headers();
        let mut missing = Vec::new();

        let work_center_id = resolve_alias(&headers, &columns.work_center_id);
        if work_center_id.is_none() {
            missing.push("work_center_id".to_string());
        }
        let existing_machines = resolve_alias(&headers, &columns.existing_machines);
        if existing_machines.is_none() {
            missing.push("existing_machines".to_string());
        }
        let oee = resolve_alias(&headers, &columns.oee);
        if oee.is_none() {
            missing.push("oee".to_string());
        }
        let work_center_name = resolve_alias(&headers, &columns.work_center_name);

        let fixed: HashSet<usize> = [work_center_id, work_center_name, existing_machines, oee]
            .into_iter()
            .flatten()
            .collect();

        let mut required = BTreeMap::new();
        let mut planned = BTreeMap::new();

        for (idx, header) in headers.iter().enumerate() {
            if fixed.contains(&idx) {
                continue;
            }
            let Some(year) = embedded_year(header) else {
                continue;
            };

            if contains_any(header, &columns.excluded_tokens) {
                tracing::debug!("產能表年度欄已排除: {:?}", table.headers[idx]);
            } else if contains_any(header, &columns.required_tokens) {
                required.entry(year).or_insert(idx);
            } else if contains_any(header, &columns.planned_tokens) {
                planned.entry(year).or_insert(idx);
            } else {
                tracing::debug!("產能表年度欄無法分類，略過: {:?}", table.headers[idx]);
            }
        }

        if required.is_empty() && planned.is_empty() {
            missing.push("capacity year columns".to_string());
        }

        match (work_center_id, existing_machines, oee) {
            (Some(work_center_id), Some(existing_machines), Some(oee)) if missing.is_empty() => {
                Ok(Self {
                    work_center_id,
                    work_center_name,
                    existing_machines,
                    oee,
                    required,
                    planned,
                })
            }
            _ => Err(CapsimError::schema(Stage::Capacity, &table.name, missing)),
        }
    }

    /// 表格中出現的所有年度
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.required.keys().chain(self.planned.keys()).copied().collect();
        years.sort_unstable();
        years.dedup();
        years
    }
}

fn contains_any(header: &str, tokens: &[String]) -> bool {
    tokens.iter().any(|t| header.contains(&t.to_uppercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use capsim_core::SimulationConfig;

    #[test]
    fn test_resolve_alias_priority() {
        let headers = vec!["ID".to_string(), "LINK".to_string(), "RFQ".to_string()];
        let aliases = vec!["RFQ".to_string(), "LINK".to_string()];
        assert_eq!(resolve_alias(&headers, &aliases), Some(2));

        let aliases = vec!["QUOTE".to_string()];
        assert_eq!(resolve_alias(&headers, &aliases), None);
    }

    #[test]
    fn test_routing_mapping_with_messy_headers() {
        let table = RawTable::from_rows(
            "routing",
            &["Item\nCode", "Work\u{a0}Center", "Description", "Rate\n(pcs/h)"],
            &[],
        );

        let mapping =
            ColumnMapping::resolve(&table, &SimulationConfig::new().routing_columns).unwrap();

        assert_eq!(mapping.quote_id, 0);
        assert_eq!(mapping.work_center, 1);
        assert_eq!(mapping.rate, 3);
    }

    #[test]
    fn test_routing_mapping_lists_missing_fields() {
        let table = RawTable::from_rows("routing", &["Item", "Description"], &[]);

        let err = ColumnMapping::resolve(&table, &SimulationConfig::new().routing_columns)
            .unwrap_err();

        match err {
            CapsimError::Schema { stage, missing, .. } => {
                assert_eq!(stage, Stage::Routing);
                assert_eq!(missing, vec!["work_center".to_string(), "rate".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_routing_header_claimed_once() {
        // "RFQ" 欄同時含 ITEM 類關鍵字，不能再被工作中心規則使用
        let table = RawTable::from_rows("routing", &["RFQ", "WC", "Taxa"], &[]);
        let mapping =
            ColumnMapping::resolve(&table, &SimulationConfig::new().routing_columns).unwrap();
        assert_eq!((mapping.quote_id, mapping.work_center, mapping.rate), (0, 1, 2));
    }

    #[test]
    fn test_capacity_layout() {
        let table = RawTable::from_rows(
            "capacity",
            &[
                "WC",
                "WC Name",
                "Machines",
                "OEE (%)",
                "Required 2026",
                "Planned Capacity 2026",
                "Required 2027",
                "Planned Capacity 2027",
                "Notes 2026",
            ],
            &[],
        );

        let layout = CapacityLayout::resolve(&table, &CapacityColumns::default()).unwrap();

        assert_eq!(layout.work_center_id, 0);
        assert_eq!(layout.work_center_name, Some(1));
        assert_eq!(layout.existing_machines, 2);
        assert_eq!(layout.oee, 3);
        assert_eq!(layout.required.get(&2026), Some(&4));
        assert_eq!(layout.planned.get(&2027), Some(&7));
        assert_eq!(layout.years(), vec![2026, 2027]);
    }

    #[test]
    fn test_effective_capacity_column_is_not_planned() {
        let table = RawTable::from_rows(
            "capacity",
            &[
                "WC",
                "Machines",
                "OEE",
                "Necessidade 2026",
                "Capacidade Efetiva 2026",
                "Capacidade 2026",
                "Effective Capacity 2027",
                "Planned 2027",
            ],
            &[],
        );

        let layout = CapacityLayout::resolve(&table, &CapacityColumns::default()).unwrap();

        assert_eq!(layout.required.get(&2026), Some(&3));
        assert_eq!(layout.planned.get(&2026), Some(&5));
        assert_eq!(layout.planned.get(&2027), Some(&7));
    }

    #[test]
    fn test_capacity_layout_missing_fields() {
        let table = RawTable::from_rows("capacity", &["WC", "Notes"], &[]);

        let err = CapacityLayout::resolve(&table, &CapacityColumns::default()).unwrap_err();

        match err {
            CapsimError::Schema { stage, missing, .. } => {
                assert_eq!(stage, Stage::Capacity);
                assert_eq!(
                    missing,
                    vec![
                        "existing_machines".to_string(),
                        "oee".to_string(),
                        "capacity year columns".to_string()
                    ]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
