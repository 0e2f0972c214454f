//! 情境與配置檔（JSON）

use capsim_core::{Scenario, SimulationConfig};
use std::fs;
use std::path::Path;

use crate::error::{ImportError, ImportResult};

/// 讀取情境檔
pub fn load_scenario<P: AsRef<Path>>(path: P) -> ImportResult<Scenario> {
    let json = read_existing(path.as_ref())?;
    let scenario: Scenario = serde_json::from_str(&json)?;
    tracing::debug!(
        "讀取情境: 選定報價 {} 筆, 假設報價 {} 筆",
        scenario.selected_quote_ids.len(),
        scenario.hypothetical_quotes.len()
    );
    Ok(scenario)
}

/// 儲存情境檔（僅在明確要求時呼叫）
pub fn save_scenario<P: AsRef<Path>>(path: P, scenario: &Scenario) -> ImportResult<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(scenario)?;
    fs::write(path, json)?;
    tracing::info!("情境已儲存: {}", path.display());
    Ok(())
}

/// 讀取模擬配置（缺少的欄位使用預設值）
pub fn load_config<P: AsRef<Path>>(path: P) -> ImportResult<SimulationConfig> {
    let json = read_existing(path.as_ref())?;
    let config: SimulationConfig = serde_json::from_str(&json)?;
    config
        .validate()
        .map_err(|e| ImportError::InvalidConfig(e.to_string()))?;
    Ok(config)
}

/// 儲存模擬配置
pub fn save_config<P: AsRef<Path>>(path: P, config: &SimulationConfig) -> ImportResult<()> {
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)?;
    Ok(())
}

fn read_existing(path: &Path) -> ImportResult<String> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(fs::read_to_string(path)?)
}
