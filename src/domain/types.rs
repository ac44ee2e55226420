// ==========================================
// 组件库存公平分配系统 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 产品类型 (Product Type)
// ==========================================
// BOM: 按配方消耗基础组件; Non-BOM: 自身即库存组件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductType {
    #[serde(rename = "BOM")]
    Bom,
    #[serde(rename = "Non-BOM")]
    NonBom,
}

impl ProductType {
    pub fn from_flag(is_bom: bool) -> Self {
        if is_bom {
            ProductType::Bom
        } else {
            ProductType::NonBom
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductType::Bom => write!(f, "BOM"),
            ProductType::NonBom => write!(f, "Non-BOM"),
        }
    }
}

// ==========================================
// 库存来源 (Stock Source)
// ==========================================
// StageOnly: 仅存在于暂存表、主表未跟踪的组件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StockSource {
    Replenishment,
    StageOnly,
}

impl fmt::Display for StockSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockSource::Replenishment => write!(f, "Replenishment"),
            StockSource::StageOnly => write!(f, "StageOnly"),
        }
    }
}

// ==========================================
// 库存聚合键 (Stock Key Mode)
// ==========================================
// 基础组件库存按哪一列聚合; 同一次运行内全局一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockKeyMode {
    #[default]
    ProductId,   // 按产品编码
    Description, // 按产品描述
}

impl fmt::Display for StockKeyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockKeyMode::ProductId => write!(f, "product_id"),
            StockKeyMode::Description => write!(f, "description"),
        }
    }
}

impl std::str::FromStr for StockKeyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "product_id" | "id" => Ok(StockKeyMode::ProductId),
            "description" | "name" => Ok(StockKeyMode::Description),
            other => Err(format!("未知的库存聚合键: {}", other)),
        }
    }
}

// ==========================================
// 数据质量级别 (DQ Level)
// ==========================================
// 引擎内不存在阻断级别: 阻断问题直接以错误返回
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DqLevel {
    Warning, // 警告（值被替换或产品不可分配）
    Info,    // 提示（行被跳过）
}

impl fmt::Display for DqLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DqLevel::Warning => write!(f, "WARNING"),
            DqLevel::Info => write!(f, "INFO"),
        }
    }
}
