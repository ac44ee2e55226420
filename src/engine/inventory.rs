// ==========================================
// 组件库存公平分配系统 - 库存视图构建
// ==========================================
// 输入: 需求记录（主表或暂存表）
// 输出: 基础组件库存池（按聚合键求和）
// ==========================================

use crate::domain::product::DemandRecord;
use crate::domain::quality::DqReport;
use crate::domain::stock::StockPool;
use crate::domain::types::StockKeyMode;

pub struct InventoryViewBuilder {
    key_mode: StockKeyMode,
}

impl InventoryViewBuilder {
    pub fn new(key_mode: StockKeyMode) -> Self {
        Self { key_mode }
    }

    /// 记录的聚合键
    pub fn key_of<'r>(&self, record: &'r DemandRecord) -> Option<&'r str> {
        match self.key_mode {
            StockKeyMode::ProductId => record.product_id.as_deref(),
            StockKeyMode::Description => record.description.as_deref(),
        }
    }

    /// 构建库存池
    ///
    /// 规则:
    /// 1) 仅复合标志明确为假的行（无法识别的标志不计入库存）
    /// 2) 聚合键缺失的行丢弃（提示）
    /// 3) 重复键求和
    pub fn build(&self, records: &[DemandRecord], table: &str, dq: &mut DqReport) -> StockPool {
        let mut pool = StockPool::new();

        for record in records.iter().filter(|r| r.is_stock_row()) {
            match self.key_of(record) {
                Some(key) => pool.add(key, record.stock_on_hand),
                None => dq.info(
                    table,
                    record.row_number,
                    None,
                    &self.key_mode.to_string(),
                    "基础组件行缺少聚合键,不计入库存",
                ),
            }
        }

        tracing::debug!(
            table,
            key_mode = %self.key_mode,
            components = pool.len(),
            total = pool.total(),
            "库存视图构建完成"
        );
        pool
    }
}
