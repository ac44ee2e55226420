// ==========================================
// 组件库存公平分配系统 - 引擎错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::importer::error::ImportError;
use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    // ===== 输入错误 =====
    #[error(transparent)]
    Import(#[from] ImportError),

    // ===== 运行后审计 =====
    #[error("库存守恒被破坏 (组件 {component}): 初始 {initial}, 剩余 {remaining}, 消耗合计 {used}")]
    ConservationViolated {
        component: String,
        initial: u64,
        remaining: u64,
        used: u64,
    },

    #[error("分配超出目标 (产品 {product}): 已分配 {allocated} > 目标 {target}")]
    TargetExceeded {
        product: String,
        allocated: u64,
        target: u64,
    },

    #[error("消耗了库存池外的组件 (产品 {product}): {component}")]
    UnknownComponentUsed { product: String, component: String },

    // ===== 输出错误 =====
    #[error("报表写出失败: {0}")]
    Export(String),
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Export(err.to_string())
    }
}

impl From<csv::Error> for EngineError {
    fn from(err: csv::Error) -> Self {
        EngineError::Export(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for EngineError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        EngineError::Export(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Export(err.to_string())
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
