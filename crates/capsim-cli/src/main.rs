//! capsim - RFQ 產能投資模擬命令列工具
//!
//! 讀取參考工作簿（報價量、途程表、產能計劃），依選定報價與假設報價
//! 計算各工作中心的增量需求與投資判定。

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

mod cli;
mod logging;
mod output;

use capsim_calc::SimulationPipeline;
use capsim_core::{Scenario, SimulationConfig};
use capsim_io::{load_config, load_scenario, save_scenario, ResultExporter, WorkbookLoader};
use cli::{Args, OutputFormat};

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.log_level.as_deref());

    run(&args)
}

fn run(args: &Args) -> Result<()> {
    // 配置：檔案 → 命令列覆蓋
    let mut config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("無法讀取配置檔 {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(decimals) = args.decimals {
        config = config.with_display_decimals(decimals);
    }
    let decimals = config.display_decimals;

    // 情境：檔案 → 命令列補充
    let base = match &args.scenario {
        Some(path) => load_scenario(path)
            .with_context(|| format!("無法讀取情境檔 {}", path.display()))?,
        None => Scenario::new(),
    };
    let scenario = args.apply_to(base)?;
    if scenario.is_empty() {
        bail!("沒有選定任何報價：請使用 --rfq、--hypothetical 或 --scenario");
    }

    if let Some(path) = &args.save_scenario {
        save_scenario(path, &scenario)
            .with_context(|| format!("無法儲存情境檔 {}", path.display()))?;
    }

    let tables = WorkbookLoader::new()
        .with_sheet_names(args.sheet_names())
        .load(&args.reference)
        .with_context(|| format!("無法讀取參考資料 {}", args.reference.display()))?;

    let pipeline = SimulationPipeline::new(config, tables);
    let result = pipeline.run(&scenario).context("產能模擬失敗")?;
    info!("執行 {} 完成", result.run_id);

    match args.format {
        OutputFormat::Table => print!("{}", output::render_text(&result, decimals)),
        OutputFormat::Json => println!("{}", output::render_json(&result)?),
    }

    if let Some(path) = &args.output {
        ResultExporter::new(decimals)
            .export(path, &result)
            .with_context(|| format!("無法匯出結果 {}", path.display()))?;
    }

    Ok(())
}
