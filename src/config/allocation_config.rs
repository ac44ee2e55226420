// ==========================================
// 组件库存公平分配系统 - 分配配置
// ==========================================
// 职责: 工作表名 / 列名 / 库存聚合键 / 输出文件名
// 存储: JSON 文件（可选）,缺省值即原始表格约定
// 红线: 引擎入口显式接收配置,不读全局常量
// ==========================================

use crate::domain::types::StockKeyMode;
use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// 配置文件路径环境变量
pub const CONFIG_PATH_ENV: &str = "FAIR_ALLOCATION_CONFIG";

/// 预测信号列上限
pub const MAX_FORECAST_COLUMNS: usize = 4;

/// 工作簿 sheet 名长度上限（报表表名同时用作 sheet 名）
pub const MAX_SHEET_NAME_CHARS: usize = 31;

// ==========================================
// SheetConfig - 工作表名
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub replenishment: String,
    pub staging: String,
    pub bom: String,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            replenishment: "Replenishment".to_string(),
            staging: "Stage".to_string(),
            bom: "BOM".to_string(),
        }
    }
}

// ==========================================
// DemandColumns - 需求表列名
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemandColumns {
    pub is_bom: String,
    pub product_id: String,
    pub description: String,
    pub stock_on_hand: String,
    pub forecasts: Vec<String>,
}

impl Default for DemandColumns {
    fn default() -> Self {
        Self {
            is_bom: "Is_BOM".to_string(),
            product_id: "productId".to_string(),
            description: "Description".to_string(),
            stock_on_hand: "inventory_wh_bp".to_string(),
            forecasts: vec![
                "model_a_oos_suggested_qty".to_string(),
                "model_b_oos_suggested_qty".to_string(),
                "model_c_oos_suggested_qty".to_string(),
                "model_new_oos_suggested_qty".to_string(),
            ],
        }
    }
}

impl DemandColumns {
    /// 基础组件库存的聚合列
    pub fn key_column(&self, mode: StockKeyMode) -> &str {
        match mode {
            StockKeyMode::ProductId => &self.product_id,
            StockKeyMode::Description => &self.description,
        }
    }
}

// ==========================================
// BomColumns - BOM 表列名
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BomColumns {
    pub product_id: String,
    pub component_id: String,
    pub component_description: String,
    pub quantity: String,
}

impl Default for BomColumns {
    fn default() -> Self {
        Self {
            product_id: "Product ID".to_string(),
            component_id: "Component Product ID".to_string(),
            component_description: "Component Description".to_string(),
            quantity: "Quantity".to_string(),
        }
    }
}

impl BomColumns {
    /// 组件键所在列（与库存聚合键一致）
    pub fn component_column(&self, mode: StockKeyMode) -> &str {
        match mode {
            StockKeyMode::ProductId => &self.component_id,
            StockKeyMode::Description => &self.component_description,
        }
    }
}

// ==========================================
// OutputConfig - 输出文件名
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub allocation_table: String,
    pub stock_table: String,
    pub usage_table: String,
    pub summary_file: String,
    pub workbook_file: String, // 三张报表合并为一个工作簿（每表一个 sheet）
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            allocation_table: "Product_Allocation".to_string(),
            stock_table: "Stock_Report".to_string(),
            usage_table: "Component_Usage".to_string(),
            summary_file: "run_summary.json".to_string(),
            workbook_file: "fair_allocation.xlsx".to_string(),
        }
    }
}

// ==========================================
// AllocationConfig - 分配配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    pub sheets: SheetConfig,
    pub demand_columns: DemandColumns,
    pub bom_columns: BomColumns,
    pub stock_key: StockKeyMode,
    pub output: OutputConfig,
}

impl AllocationConfig {
    /// 从 JSON 文件读取配置（缺省字段取默认值）并校验
    pub fn load<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ImportError::ConfigReadError {
            key: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: AllocationConfig =
            serde_json::from_str(&content).map_err(|e| ImportError::ConfigReadError {
                key: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// 按约定位置查找配置文件
    ///
    /// 顺序:
    /// 1) 显式路径
    /// 2) 环境变量 FAIR_ALLOCATION_CONFIG
    /// 3) 用户配置目录/fair-allocation/config.json（存在时）
    pub fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }

        dirs::config_dir()
            .map(|dir| dir.join("fair-allocation").join("config.json"))
            .filter(|p| p.exists())
    }

    /// 解析路径并加载; 找不到配置文件时使用默认值
    pub fn load_or_default(explicit: Option<&Path>) -> ImportResult<Self> {
        match Self::resolve_path(explicit) {
            Some(path) => {
                tracing::info!(path = %path.display(), "加载分配配置");
                Self::load(path)
            }
            None => {
                tracing::info!("未找到配置文件,使用默认配置");
                Ok(Self::default())
            }
        }
    }

    /// 校验配置
    pub fn validate(&self) -> ImportResult<()> {
        let named = [
            ("sheets.replenishment", &self.sheets.replenishment),
            ("sheets.staging", &self.sheets.staging),
            ("sheets.bom", &self.sheets.bom),
            ("demand_columns.is_bom", &self.demand_columns.is_bom),
            ("demand_columns.product_id", &self.demand_columns.product_id),
            ("demand_columns.description", &self.demand_columns.description),
            ("demand_columns.stock_on_hand", &self.demand_columns.stock_on_hand),
            ("bom_columns.product_id", &self.bom_columns.product_id),
            ("bom_columns.component_id", &self.bom_columns.component_id),
            (
                "bom_columns.component_description",
                &self.bom_columns.component_description,
            ),
            ("bom_columns.quantity", &self.bom_columns.quantity),
            ("output.allocation_table", &self.output.allocation_table),
            ("output.stock_table", &self.output.stock_table),
            ("output.usage_table", &self.output.usage_table),
            ("output.summary_file", &self.output.summary_file),
            ("output.workbook_file", &self.output.workbook_file),
        ];
        for (key, value) in named {
            if value.trim().is_empty() {
                return Err(ImportError::ConfigValueError {
                    key: key.to_string(),
                    value: value.clone(),
                    message: "不能为空".to_string(),
                });
            }
        }

        let tables = [
            ("output.allocation_table", &self.output.allocation_table),
            ("output.stock_table", &self.output.stock_table),
            ("output.usage_table", &self.output.usage_table),
        ];
        for (key, value) in tables {
            if value.chars().count() > MAX_SHEET_NAME_CHARS {
                return Err(ImportError::ConfigValueError {
                    key: key.to_string(),
                    value: value.clone(),
                    message: format!("表名最多 {} 个字符", MAX_SHEET_NAME_CHARS),
                });
            }
        }

        let forecasts = &self.demand_columns.forecasts;
        if forecasts.len() > MAX_FORECAST_COLUMNS {
            return Err(ImportError::ConfigValueError {
                key: "demand_columns.forecasts".to_string(),
                value: forecasts.join(","),
                message: format!("预测列最多 {} 个", MAX_FORECAST_COLUMNS),
            });
        }

        let mut seen = HashSet::new();
        for column in forecasts {
            if column.trim().is_empty() || !seen.insert(column.trim().to_lowercase()) {
                return Err(ImportError::ConfigValueError {
                    key: "demand_columns.forecasts".to_string(),
                    value: column.clone(),
                    message: "预测列名为空或重复".to_string(),
                });
            }
        }

        Ok(())
    }
}
