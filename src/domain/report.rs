// ==========================================
// 组件库存公平分配系统 - 报表领域模型
// ==========================================
// 三张输出表: 分配明细 / 库存报表 / 组件消耗
// ==========================================

use crate::domain::product::Extras;
use crate::domain::table::{CellValue, OutputTable};
use crate::domain::types::{ProductType, StockSource};
use serde::Serialize;

// ==========================================
// AllocationRow - 分配明细行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationRow {
    pub product_id: Option<String>,
    pub product: Option<String>,
    pub product_type: ProductType,
    pub forecast: i64,
    pub allocated: u64,
    pub components_used: String,
    #[serde(skip)]
    pub extras: Extras,
}

// ==========================================
// StockRow - 库存报表行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockRow {
    pub component_id: String,
    pub initial_stock: u64,
    pub remaining_stock: u64,
    pub source: StockSource,
}

impl StockRow {
    pub fn consumed(&self) -> u64 {
        self.initial_stock.saturating_sub(self.remaining_stock)
    }
}

// ==========================================
// UsageRow - 组件消耗行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageRow {
    pub component_id: String,
    pub product_id: Option<String>,
    pub product: Option<String>,
    pub qty_used: u64,
    pub total_used_component: u64,
}

// ==========================================
// AllocationReports - 报表集合
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationReports {
    pub allocation: Vec<AllocationRow>,
    pub stock: Vec<StockRow>,
    pub usage: Vec<UsageRow>,
    /// 透传列（需求表表头顺序）
    #[serde(skip)]
    pub passthrough_columns: Vec<String>,
}

pub const ALLOCATION_COLUMNS: [&str; 6] = [
    "Product_ID",
    "Product",
    "Type",
    "Forecast",
    "Allocated",
    "Components_Used",
];

pub const STOCK_COLUMNS: [&str; 4] = ["Component_ID", "Initial_Stock", "Remaining_Stock", "Source"];

pub const USAGE_COLUMNS: [&str; 5] = [
    "Component_ID",
    "Product_ID",
    "Product",
    "Qty_Used",
    "Total_Used_Component",
];

impl AllocationReports {
    /// 分配明细表（固定列 + 透传列; 与固定列同名的透传列不重复输出）
    pub fn allocation_table(&self, name: &str) -> OutputTable {
        let passthrough: Vec<&String> = self
            .passthrough_columns
            .iter()
            .filter(|c| !ALLOCATION_COLUMNS.contains(&c.as_str()))
            .collect();

        let mut headers: Vec<String> = ALLOCATION_COLUMNS.iter().map(|c| c.to_string()).collect();
        headers.extend(passthrough.iter().map(|c| c.to_string()));

        let rows = self
            .allocation
            .iter()
            .map(|row| {
                let mut cells = vec![
                    CellValue::from(row.product_id.clone()),
                    CellValue::from(row.product.clone()),
                    CellValue::Text(row.product_type.to_string()),
                    CellValue::Int(row.forecast),
                    CellValue::from(row.allocated),
                    CellValue::text(row.components_used.as_str()),
                ];
                for column in &passthrough {
                    let value = row
                        .extras
                        .iter()
                        .find(|(k, _)| k == *column)
                        .map(|(_, v)| v.clone())
                        .unwrap_or_default();
                    cells.push(value);
                }
                cells
            })
            .collect();

        OutputTable {
            name: name.to_string(),
            headers,
            rows,
        }
    }

    pub fn stock_table(&self, name: &str) -> OutputTable {
        OutputTable {
            name: name.to_string(),
            headers: STOCK_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: self
                .stock
                .iter()
                .map(|row| {
                    vec![
                        CellValue::Text(row.component_id.clone()),
                        CellValue::from(row.initial_stock),
                        CellValue::from(row.remaining_stock),
                        CellValue::Text(row.source.to_string()),
                    ]
                })
                .collect(),
        }
    }

    pub fn usage_table(&self, name: &str) -> OutputTable {
        OutputTable {
            name: name.to_string(),
            headers: USAGE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: self
                .usage
                .iter()
                .map(|row| {
                    vec![
                        CellValue::Text(row.component_id.clone()),
                        CellValue::from(row.product_id.clone()),
                        CellValue::from(row.product.clone()),
                        CellValue::from(row.qty_used),
                        CellValue::from(row.total_used_component),
                    ]
                })
                .collect(),
        }
    }
}
