//! 命令列參數

use anyhow::{anyhow, bail, Context, Result};
use capsim_core::table::parse_decimal;
use capsim_core::{HypotheticalQuote, HypotheticalRouting, Scenario};
use capsim_io::SheetNames;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// capsim 命令列參數
#[derive(Parser, Debug)]
#[command(name = "capsim")]
#[command(about = "RFQ 產能投資模擬：報價需求 → 工作中心 → 投資判定")]
#[command(version)]
pub struct Args {
    /// 參考工作簿（.xlsx）或 CSV 目錄
    #[arg(short, long, env = "CAPSIM_REFERENCE")]
    pub reference: PathBuf,

    /// 選定的報價ID（可重複）
    #[arg(short = 'q', long = "rfq", value_name = "ID")]
    pub rfq: Vec<String>,

    /// 情境檔（JSON）
    #[arg(short, long)]
    pub scenario: Option<PathBuf>,

    /// 假設報價 `ID:年度=量,年度=量`
    #[arg(long = "hypothetical", value_name = "ID:YEAR=QTY")]
    pub hypothetical: Vec<String>,

    /// 假設途程 `ID=工作中心;產出率`
    #[arg(long = "route", value_name = "ID=WC;RATE")]
    pub route: Vec<String>,

    /// 只輸出受影響的工作中心
    #[arg(long)]
    pub only_affected: bool,

    /// 模擬配置檔（JSON）
    #[arg(short, long, env = "CAPSIM_CONFIG")]
    pub config: Option<PathBuf>,

    /// 顯示用小數位數（覆蓋配置檔）
    #[arg(long)]
    pub decimals: Option<u32>,

    /// 報價量工作表名稱
    #[arg(long)]
    pub quotes_sheet: Option<String>,

    /// 途程表工作表名稱
    #[arg(long)]
    pub routing_sheet: Option<String>,

    /// 產能計劃工作表名稱
    #[arg(long)]
    pub capacity_sheet: Option<String>,

    /// 輸出格式
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// 匯出結果（.xlsx 或 .csv）
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 儲存本次情境（JSON）
    #[arg(long)]
    pub save_scenario: Option<PathBuf>,

    /// 日誌層級（覆蓋 RUST_LOG）
    #[arg(long)]
    pub log_level: Option<String>,
}

/// 終端輸出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

impl Args {
    /// 工作表名稱（未指定者用預設值）
    pub fn sheet_names(&self) -> SheetNames {
        let mut names = SheetNames::default();
        if let Some(name) = &self.quotes_sheet {
            names.quotes = name.clone();
        }
        if let Some(name) = &self.routing_sheet {
            names.routing = name.clone();
        }
        if let Some(name) = &self.capacity_sheet {
            names.capacity = name.clone();
        }
        names
    }

    /// 以命令列參數補充情境
    pub fn apply_to(&self, mut scenario: Scenario) -> Result<Scenario> {
        scenario = scenario.with_quotes(&self.rfq);

        for arg in &self.hypothetical {
            let quote = parse_hypothetical(arg)
                .with_context(|| format!("假設報價格式錯誤: {:?}", arg))?;
            scenario = scenario.with_hypothetical_quote(quote);
        }
        for arg in &self.route {
            let routing =
                parse_route(arg).with_context(|| format!("假設途程格式錯誤: {:?}", arg))?;
            scenario = scenario.with_hypothetical_routing(routing);
        }
        if self.only_affected {
            scenario = scenario.with_show_only_affected(true);
        }

        Ok(scenario)
    }
}

/// 解析 `ID:年度=量,年度=量`
pub fn parse_hypothetical(arg: &str) -> Result<HypotheticalQuote> {
    let (id, volumes) = arg
        .split_once(':')
        .ok_or_else(|| anyhow!("缺少 ':' 分隔"))?;
    let id = id.trim();
    if id.is_empty() {
        bail!("缺少報價ID");
    }

    let mut quote = HypotheticalQuote::new(id);
    for pair in volumes.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (year, volume) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("年度量 {:?} 缺少 '='", pair))?;
        let year: i32 = year
            .trim()
            .parse()
            .with_context(|| format!("年度 {:?} 不是整數", year))?;
        let volume =
            parse_decimal(volume).ok_or_else(|| anyhow!("預測量 {:?} 不是數值", volume))?;
        quote = quote.with_volume(year, volume);
    }

    Ok(quote)
}

/// 解析 `ID=工作中心;產出率`
pub fn parse_route(arg: &str) -> Result<HypotheticalRouting> {
    let (id, line) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("缺少 '=' 分隔"))?;
    let (work_center, rate) = line
        .split_once(';')
        .ok_or_else(|| anyhow!("缺少 ';' 分隔"))?;
    let rate = parse_decimal(rate).ok_or_else(|| anyhow!("產出率 {:?} 不是數值", rate))?;

    Ok(HypotheticalRouting::new(id.trim(), work_center.trim(), rate))
}
