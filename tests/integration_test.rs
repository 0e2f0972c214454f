//! 集成測試

use capsim::{
    CapsimError, HypotheticalQuote, InvestmentStatus, RawTable, ReferenceTables, Scenario,
    SimulationConfig, SimulationPipeline, Stage, WorkbookLoader,
};
use proptest::prelude::*;
use rstest::rstest;
use rust_decimal::Decimal;

fn quotes_table(rows: &[&[&str]]) -> RawTable {
    RawTable::from_rows("1_RFQ_DadosVendas", &["RFQ", "Project", "2026", "2027"], rows)
}

fn routing_table(rows: &[&[&str]]) -> RawTable {
    RawTable::from_rows(
        "2_LN_DadosExportados",
        &["Item", "Work Center", "Operation", "Rate"],
        rows,
    )
}

fn capacity_table(planned_2026: &str) -> RawTable {
    RawTable::from_rows(
        "3_Industrial_Plan_Idash",
        &[
            "WC",
            "WC Name",
            "Machines",
            "OEE",
            "Required 2026",
            "Planned 2026",
            "Required 2027",
            "Planned 2027",
        ],
        &[
            &["WC1", "Press", "2", "85", "0", planned_2026, "0", "100"],
            &["WC2", "Lathe", "1", "90", "20", "100", "20", "100"],
        ],
    )
}

fn pipeline(planned_2026: &str) -> SimulationPipeline {
    SimulationPipeline::with_default_config(ReferenceTables::new(
        quotes_table(&[
            &["Q1", "Alpha", "1000", "0"],
            &["Q2", "Beta", "800", "800"],
        ]),
        routing_table(&[&["Q1", "WC1", "10", "10"]]),
        capacity_table(planned_2026),
    ))
}

#[rstest]
#[case::over_capacity("50", Decimal::from(4), InvestmentStatus::Invest)]
#[case::within_capacity("200", Decimal::from(1), InvestmentStatus::Ok)]
#[case::no_planned_capacity("0", Decimal::ZERO, InvestmentStatus::Ok)]
fn test_investment_classification(
    #[case] planned_2026: &str,
    #[case] expected_machines: Decimal,
    #[case] expected_status: InvestmentStatus,
) {
    // 1000 件 / 產出率 10 = 100，現有 2 台
    let result = pipeline(planned_2026)
        .run(&Scenario::new().with_quote("Q1"))
        .unwrap();

    let wc1 = result
        .assessments
        .iter()
        .find(|a| a.work_center_id == "WC1")
        .unwrap();
    let year = wc1.year(2026).unwrap();

    assert_eq!(year.incremental_demand, Decimal::from(100));
    assert_eq!(year.required_machines, expected_machines);
    assert_eq!(year.status, expected_status);
    assert_eq!(wc1.overall_status, expected_status);
    assert!(wc1.affected);
    assert_eq!(wc1.quote_context, vec!["Q1".to_string()]);
}

#[test]
fn test_overflowing_capacity_plan_is_error() {
    let overflowing = SimulationPipeline::with_default_config(ReferenceTables::new(
        quotes_table(&[&["Q1", "Alpha", "1000", "0"]]),
        routing_table(&[&["Q1", "WC1", "10", "10"]]),
        RawTable::from_rows(
            "3_Industrial_Plan_Idash",
            &["WC", "Machines", "OEE", "Required 2026", "Planned 2026"],
            &[&["WC1", "2", "85", "70000000000000000000000000000", "0.5"]],
        ),
    ));

    match overflowing.run(&Scenario::new().with_quote("Q1")).unwrap_err() {
        CapsimError::Overflow {
            stage,
            work_center,
            year,
        } => {
            assert_eq!(stage, Stage::Capacity);
            assert_eq!(work_center, "WC1");
            assert_eq!(year, 2026);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_quote_without_routing_contributes_nothing() {
    let with_q2 = pipeline("50")
        .run(&Scenario::new().with_quotes(["Q1", "Q2"]))
        .unwrap();
    let without_q2 = pipeline("50").run(&Scenario::new().with_quote("Q1")).unwrap();

    assert_eq!(with_q2.assessments, without_q2.assessments);
    assert!(with_q2
        .assessments
        .iter()
        .all(|a| !a.quote_context.contains(&"Q2".to_string())));
}

#[test]
fn test_hypothetical_quote_uses_same_join() {
    let config = SimulationConfig::new();
    let capacity = RawTable::from_rows(
        "3_Industrial_Plan_Idash",
        &["WC", "Machines", "OEE", "Required 2027", "Planned 2027"],
        &[&["WC9", "1", "80", "0", "50"]],
    );

    let hypothetical = SimulationPipeline::new(
        config.clone(),
        ReferenceTables::new(
            quotes_table(&[&["Q1", "Alpha", "1000", "0"]]),
            routing_table(&[]),
            capacity.clone(),
        ),
    )
    .run(&Scenario::new().with_hypothetical_quote(
        HypotheticalQuote::new("HYP1")
            .with_volume(2027, Decimal::from(500))
            .with_routing_text("WC9;5\nmalformed line"),
    ))
    .unwrap();

    let real = SimulationPipeline::new(
        config,
        ReferenceTables::new(
            quotes_table(&[&["HYP1", "", "0", "500"]]),
            routing_table(&[&["HYP1", "WC9", "10", "5"]]),
            capacity,
        ),
    )
    .run(&Scenario::new().with_quote("HYP1"))
    .unwrap();

    assert_eq!(hypothetical.demand.demand("WC9", 2027), Decimal::from(100));
    assert_eq!(hypothetical.assessments, real.assessments);
    assert_eq!(
        hypothetical.assessments[0].year(2027).unwrap().status,
        InvestmentStatus::Invest
    );
}

#[test]
fn test_show_only_affected() {
    let scenario = Scenario::new()
        .with_quote("Q1")
        .with_show_only_affected(true);

    let result = pipeline("50").run(&scenario).unwrap();

    assert_eq!(result.assessments.len(), 1);
    assert_eq!(result.summary().work_centers_affected, 1);
}

#[test]
fn test_every_year_in_range_is_assessed() {
    let result = pipeline("50").run(&Scenario::new().with_quote("Q1")).unwrap();

    assert_eq!(result.years.first, 2025);
    assert_eq!(result.years.last, 2027);
    for assessment in &result.assessments {
        assert_eq!(assessment.years.len(), 3);
    }
}

#[test]
fn test_error_taxonomy() {
    let empty = pipeline("50")
        .run(&Scenario::new().with_quote("Q404"))
        .unwrap_err();
    assert!(matches!(
        empty,
        CapsimError::EmptySelection {
            stage: Stage::QuoteVolumes,
            ..
        }
    ));

    let broken = SimulationPipeline::with_default_config(ReferenceTables::new(
        quotes_table(&[&["Q1", "Alpha", "1000", "0"]]),
        RawTable::from_rows("2_LN_DadosExportados", &["Item", "Machine"], &[]),
        capacity_table("50"),
    ));
    match broken.run(&Scenario::new().with_quote("Q1")).unwrap_err() {
        CapsimError::Schema { stage, missing, .. } => {
            assert_eq!(stage, Stage::Routing);
            assert_eq!(missing, vec!["work_center", "rate"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_reference_from_csv_directory() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("1_RFQ_DadosVendas.csv"),
        "LINK,Projeto,2026\nQ1,Alpha,\"1000,5\"\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("2_LN_DadosExportados.csv"),
        "Artigo,Centro de Trabalho,Taxa\nQ1,1001,\"0,5\"\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("3_Industrial_Plan_Idash.csv"),
        "WC,Machines,OEE (%),Required 2026,Planned 2026\n1001,1,85%,0,4000\n",
    )
    .unwrap();

    let tables = WorkbookLoader::new().load(dir.path()).unwrap();
    let result = SimulationPipeline::with_default_config(tables)
        .run(&Scenario::new().with_quote("Q1"))
        .unwrap();

    let wc = &result.assessments[0];
    assert_eq!(wc.work_center_id, "WC1001");
    assert_eq!(wc.year(2026).unwrap().incremental_demand, Decimal::from(2001));
    assert_eq!(wc.overall_status, InvestmentStatus::Ok);
}

#[test]
fn test_scenario_json_round_trip() {
    let scenario = Scenario::new()
        .with_quotes(["Q1", "Q2"])
        .with_hypothetical_quote(HypotheticalQuote::new("HYP1").with_volume(2027, Decimal::ONE));

    let json = serde_json::to_string(&scenario).unwrap();
    let loaded: Scenario = serde_json::from_str(&json).unwrap();

    assert_eq!(loaded, scenario);
}

proptest! {
    #[test]
    fn runs_are_idempotent(volume in 0u32..1_000_000, planned in 0u32..10_000) {
        let volume = volume.to_string();
        let planned = planned.to_string();
        let pipeline = SimulationPipeline::with_default_config(ReferenceTables::new(
            quotes_table(&[&["Q1", "Alpha", volume.as_str(), "0"]]),
            routing_table(&[&["Q1", "WC1", "10", "7"]]),
            capacity_table(planned.as_str()),
        ));
        let scenario = Scenario::new().with_quote("Q1");

        let first = pipeline.run(&scenario).unwrap();
        let second = pipeline.run(&scenario).unwrap();

        prop_assert_eq!(
            serde_json::to_string(&first.assessments).unwrap(),
            serde_json::to_string(&second.assessments).unwrap()
        );
    }

    #[test]
    fn negative_volumes_never_reduce_demand(volume in -1_000_000i64..1_000_000) {
        let volume = volume.to_string();
        let pipeline = SimulationPipeline::with_default_config(ReferenceTables::new(
            quotes_table(&[&["Q1", "Alpha", volume.as_str(), "0"]]),
            routing_table(&[&["Q1", "WC1", "10", "10"]]),
            capacity_table("50"),
        ));

        let result = pipeline.run(&Scenario::new().with_quote("Q1")).unwrap();

        for assessment in &result.assessments {
            for year in assessment.years.values() {
                prop_assert!(year.incremental_demand >= Decimal::ZERO);
            }
        }
    }
}
