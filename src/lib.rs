//! # Capsim
//!
//! RFQ 產能投資模擬：將選定報價（含假設報價）的年度預測量，經途程表
//! 分配到各工作中心，與產能計劃比對後判定是否需要新增機台。
//!
//! ```no_run
//! use capsim::{Scenario, SimulationPipeline, WorkbookLoader};
//!
//! let tables = WorkbookLoader::new().load("reference.xlsx")?;
//! let pipeline = SimulationPipeline::with_default_config(tables);
//! let result = pipeline.run(&Scenario::new().with_quote("RFQ_1"))?;
//! println!("{}", result.assessment_table(2).render_text());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use capsim_calc;
pub use capsim_core;
pub use capsim_io;

pub use capsim_calc::{
    ExecutiveSummary, ReferenceTables, ReportTable, SimulationPipeline, SimulationResult,
    SimulationWarning, WarningSeverity,
};
pub use capsim_core::{
    CapsimError, HypotheticalQuote, HypotheticalRouting, InvestmentAssessment, InvestmentStatus,
    RawTable, Scenario, SimulationConfig, Stage, YearRange,
};
pub use capsim_io::{ImportError, ResultExporter, SheetNames, WorkbookLoader};
