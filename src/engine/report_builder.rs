// ==========================================
// 组件库存公平分配系统 - 报表构建
// ==========================================
// 输入: 最终产品状态 + 初始库存 + 剩余库存
// 输出: 分配明细 / 库存报表 / 组件消耗
// ==========================================

use crate::domain::product::Product;
use crate::domain::report::{AllocationReports, AllocationRow, StockRow, UsageRow};
use crate::domain::stock::StockPool;
use crate::engine::stock_merger::MergedStock;
use std::collections::HashMap;

pub struct ReportBuilder;

impl ReportBuilder {
    /// 构建三张报表
    ///
    /// # 参数
    /// - `products`: 分配后的产品（保持输入顺序）
    /// - `initial`: 合并后的初始库存（含来源信息）
    /// - `remaining`: 分配结束时的工作池
    /// - `passthrough_columns`: 需求表表头（透传列）
    pub fn build(
        &self,
        products: &[Product],
        initial: &MergedStock,
        remaining: &StockPool,
        passthrough_columns: Vec<String>,
    ) -> AllocationReports {
        AllocationReports {
            allocation: self.allocation_rows(products),
            stock: self.stock_rows(initial, remaining),
            usage: self.usage_rows(products),
            passthrough_columns,
        }
    }

    fn allocation_rows(&self, products: &[Product]) -> Vec<AllocationRow> {
        products
            .iter()
            .map(|p| AllocationRow {
                product_id: p.product_id.clone(),
                product: p.product.clone(),
                product_type: p.product_type,
                forecast: p.forecast,
                allocated: p.allocated,
                components_used: p.components_used.to_string(),
                extras: p.extras.clone(),
            })
            .collect()
    }

    fn stock_rows(&self, initial: &MergedStock, remaining: &StockPool) -> Vec<StockRow> {
        initial
            .pool
            .iter()
            .map(|(key, quantity)| StockRow {
                component_id: key.to_string(),
                initial_stock: quantity,
                remaining_stock: remaining.available(key),
                source: initial.source(key),
            })
            .collect()
    }

    fn usage_rows(&self, products: &[Product]) -> Vec<UsageRow> {
        let mut totals: HashMap<&str, u64> = HashMap::new();
        for (key, quantity) in products.iter().flat_map(|p| p.components_used.iter()) {
            *totals.entry(key).or_insert(0) += quantity;
        }

        products
            .iter()
            .flat_map(|p| {
                let totals = &totals;
                p.components_used
                    .iter()
                    .filter(|(_, quantity)| *quantity > 0)
                    .map(move |(key, quantity)| UsageRow {
                        component_id: key.to_string(),
                        product_id: p.product_id.clone(),
                        product: p.product.clone(),
                        qty_used: quantity,
                        total_used_component: totals.get(key).copied().unwrap_or(0),
                    })
            })
            .collect()
    }
}
