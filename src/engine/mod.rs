// ==========================================
// 组件库存公平分配系统 - 引擎层
// ==========================================
// 职责: 库存视图 / 库存合并 / BOM 展开 / 需求预测 / 公平分配 / 报表
// 红线: 引擎不读写文件（run_from_files 除外,仅委托导入层）
// 红线: 所有非致命问题必须进入 DQ 报告
// ==========================================

pub mod bom;
pub mod error;
pub mod fair_allocator;
pub mod forecast;
pub mod inventory;
pub mod orchestrator;
pub mod product_builder;
pub mod report_builder;
pub mod stock_merger;

// 重导出核心引擎
pub use bom::{BomExpander, BomLookup, BomMapping};
pub use error::{EngineError, EngineResult};
pub use fair_allocator::{AllocationOutcome, FairAllocator};
pub use forecast::DemandForecaster;
pub use inventory::InventoryViewBuilder;
pub use orchestrator::{
    verify, AllocationInputs, AllocationOrchestrator, AllocationRun, RunSummary, TableSource,
};
pub use product_builder::ProductBuilder;
pub use report_builder::ReportBuilder;
pub use stock_merger::{MergedStock, StockMerger};
