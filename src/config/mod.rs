// ==========================================
// 组件库存公平分配系统 - 配置层
// ==========================================
// 职责: 分配运行配置（显式传入引擎入口）
// 存储: JSON 文件 / 默认值
// ==========================================

pub mod allocation_config;

// 重导出核心配置
pub use allocation_config::{
    AllocationConfig, BomColumns, DemandColumns, OutputConfig, SheetConfig, CONFIG_PATH_ENV,
    MAX_FORECAST_COLUMNS,
};
