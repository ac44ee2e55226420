// ==========================================
// 组件库存公平分配系统 - 核心库
// ==========================================
// 职责: 需求表 + 暂存表 + BOM 表 → 公平轮转分配 → 三张报表
// 系统定位: 批处理计算（单线程,无持久化）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 导入层 - 外部表格
pub mod importer;

// 引擎层 - 分配规则
pub mod engine;

// 配置层 - 列名 / 工作表 / 聚合键
pub mod config;

// 导出层 - 报表写出
pub mod exporter;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{DqLevel, ProductType, StockKeyMode, StockSource};

// 领域实体
pub use domain::{
    AllocationReports, CellValue, ComponentSet, DqReport, DqViolation, Product, RawTable,
    StockPool,
};

// 引擎
pub use engine::{
    AllocationInputs, AllocationOrchestrator, AllocationRun, EngineError, EngineResult,
    FairAllocator, RunSummary, TableSource,
};

// 配置
pub use config::AllocationConfig;

// 导入
pub use importer::{ImportError, ImportResult, UniversalFileParser};

// 导出
pub use exporter::ReportWriter;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "组件库存公平分配系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
