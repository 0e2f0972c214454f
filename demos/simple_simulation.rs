//! 簡單產能模擬示例

use capsim::{
    HypotheticalQuote, RawTable, ReferenceTables, Scenario, SimulationPipeline,
};
use rust_decimal::Decimal;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== 簡單產能模擬示例 ===\n");

    // 參考表格（通常由 WorkbookLoader 從工作簿讀取）
    let tables = ReferenceTables::new(
        RawTable::from_rows(
            "1_RFQ_DadosVendas",
            &["RFQ", "Project", "2026", "2027", "2028"],
            &[
                &["RFQ_100", "Bracket", "12000", "15000", "15000"],
                &["RFQ_101", "Housing", "4000", "6000", "8000"],
            ],
        ),
        RawTable::from_rows(
            "2_LN_DadosExportados",
            &["Item", "Work Center", "Operation", "Rate"],
            &[
                &["RFQ_100", "1001", "10", "60"],
                &["RFQ_100", "1002", "20", "120"],
                &["RFQ_101", "1002", "10", "40"],
            ],
        ),
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
                "Required 2028",
                "Planned 2028",
            ],
            &[
                &["1001", "Stamping", "2", "85", "150", "400", "150", "400", "150", "400"],
                &["1002", "Welding", "3", "80", "100", "300", "100", "300", "100", "300"],
                &["1003", "Painting", "1", "90", "50", "200", "50", "200", "50", "200"],
            ],
        ),
    );

    // 情境：兩筆報價 + 一筆假設報價
    let scenario = Scenario::new()
        .with_quotes(["RFQ_100", "RFQ_101"])
        .with_hypothetical_quote(
            HypotheticalQuote::new("NEW_PART")
                .with_project("Cover")
                .with_volume(2027, Decimal::from(9000))
                .with_volume(2028, Decimal::from(9000))
                .with_routing_text("1003;50"),
        );

    println!("情境報價:");
    for id in scenario.active_quote_ids() {
        println!("  - {}", id);
    }

    let pipeline = SimulationPipeline::with_default_config(tables);
    let result = pipeline.run(&scenario)?;

    println!("\n投資評估:");
    println!("{}", result.assessment_table(2).render_text());

    println!("\n需求模擬:");
    println!("{}", result.demand_simulation_table(1).render_text());

    let summary = result.summary();
    println!(
        "\n摘要: 報價 {} 筆, 受影響工作中心 {} 個, 需要投資 {} 個",
        summary.quotes_in_scenario, summary.work_centers_affected, summary.work_centers_invest
    );

    for assessment in result.invest_work_centers() {
        println!(
            "  - {} ({}): 年度 {:?}",
            assessment.work_center_id,
            assessment.work_center_name,
            assessment.invest_years()
        );
    }

    Ok(())
}
