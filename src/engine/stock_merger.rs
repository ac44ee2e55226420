// ==========================================
// 组件库存公平分配系统 - 库存合并
// ==========================================
// 红线: 主表已跟踪的组件永不被暂存表覆盖
// 用途: 暂存库存仅作为主表未跟踪组件的后备池
// ==========================================

use crate::domain::stock::StockPool;
use crate::domain::types::StockSource;
use std::collections::HashSet;

// ==========================================
// MergedStock - 合并结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedStock {
    pub pool: StockPool,
    pub stage_only: HashSet<String>,
}

impl MergedStock {
    /// 组件来源
    pub fn source(&self, key: &str) -> StockSource {
        if self.stage_only.contains(key) {
            StockSource::StageOnly
        } else {
            StockSource::Replenishment
        }
    }
}

pub struct StockMerger;

impl StockMerger {
    /// 合并主库存与暂存库存
    ///
    /// # 参数
    /// - `primary`: 主表库存（全部保留）
    /// - `staging`: 暂存库存（仅补充主表缺失的键）
    ///
    /// # 返回
    /// 合并库存池（主表键在前,暂存独有键按暂存表顺序追加）+ 暂存独有键集合
    pub fn merge(&self, primary: StockPool, staging: &StockPool) -> MergedStock {
        let mut pool = primary;
        let mut stage_only = HashSet::new();

        for (key, quantity) in staging.iter() {
            if pool.insert_if_absent(key, quantity) {
                stage_only.insert(key.to_string());
            }
        }

        tracing::debug!(
            components = pool.len(),
            stage_only = stage_only.len(),
            "库存合并完成"
        );
        MergedStock { pool, stage_only }
    }
}
