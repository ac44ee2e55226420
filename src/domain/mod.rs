// ==========================================
// 组件库存公平分配系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、报表行
// 红线: 不含文件读写逻辑,不含引擎逻辑
// ==========================================

pub mod product;
pub mod quality;
pub mod report;
pub mod stock;
pub mod table;
pub mod types;

// 重导出核心类型
pub use product::{BomRecord, ComponentSet, DemandRecord, Extras, Product};
pub use quality::{DqReport, DqSummary, DqViolation};
pub use report::{AllocationReports, AllocationRow, StockRow, UsageRow};
pub use stock::StockPool;
pub use table::{CellValue, NumericCell, OutputTable, RawRow, RawTable};
pub use types::{DqLevel, ProductType, StockKeyMode, StockSource};
