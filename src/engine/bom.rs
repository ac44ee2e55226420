// ==========================================
// 组件库存公平分配系统 - BOM 展开器
// ==========================================
// 输入: BOM 记录（复合键, 组件键, 单位用量）
// 输出: 复合键 → 组件用量映射
// ==========================================

use crate::domain::product::{BomRecord, ComponentSet};
use crate::domain::quality::DqReport;
use crate::domain::table::NumericCell;
use crate::importer::data_cleaner::DataCleaner;
use std::collections::HashMap;

// ==========================================
// BomMapping - 配方映射
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BomMapping {
    recipes: HashMap<String, ComponentSet>,
}

/// 配方查询结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BomLookup<'a> {
    /// 有有效组件
    Found(&'a ComponentSet),
    /// BOM 表中有该复合键,但无有效组件行
    Empty,
    /// BOM 表中没有该复合键
    Missing,
}

impl BomMapping {
    pub fn lookup(&self, product_id: &str) -> BomLookup<'_> {
        match self.recipes.get(product_id) {
            Some(set) if !set.is_empty() => BomLookup::Found(set),
            Some(_) => BomLookup::Empty,
            None => BomLookup::Missing,
        }
    }

    /// 配方（缺失 → 空集）
    pub fn components(&self, product_id: &str) -> ComponentSet {
        self.recipes.get(product_id).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

pub struct BomExpander {
    cleaner: DataCleaner,
}

impl Default for BomExpander {
    fn default() -> Self {
        Self::new()
    }
}

impl BomExpander {
    pub fn new() -> Self {
        Self {
            cleaner: DataCleaner,
        }
    }

    /// 按复合键分组构建配方
    ///
    /// 跳过（提示）:
    /// - 复合键 / 组件键 / 用量缺失
    /// - 用量无法解析或截断后 <= 0
    ///
    /// 同组重复组件: 后出现的行覆盖（警告）
    pub fn expand(&self, records: &[BomRecord], table: &str, dq: &mut DqReport) -> BomMapping {
        let mut recipes: HashMap<String, ComponentSet> = HashMap::new();

        for record in records {
            let Some(product_id) = record.product_id.as_deref() else {
                dq.info(table, record.row_number, None, "product_id", "BOM 行缺少复合键,跳过");
                continue;
            };
            let Some(component) = record.component.as_deref() else {
                dq.info(
                    table,
                    record.row_number,
                    Some(product_id),
                    "component",
                    "BOM 行缺少组件键,跳过",
                );
                continue;
            };

            let quantity = match &record.quantity {
                NumericCell::Absent => {
                    dq.info(
                        table,
                        record.row_number,
                        Some(product_id),
                        "quantity",
                        "BOM 行缺少用量,跳过",
                    );
                    continue;
                }
                NumericCell::Malformed(raw) => {
                    // 组内无有效行时仍登记空配方
                    recipes.entry(product_id.to_string()).or_default();
                    dq.info(
                        table,
                        record.row_number,
                        Some(product_id),
                        "quantity",
                        format!("BOM 用量无法解析 ({}),跳过", raw),
                    );
                    continue;
                }
                NumericCell::Value(v) => self.cleaner.truncate(*v),
            };

            let recipe = recipes.entry(product_id.to_string()).or_default();
            if quantity <= 0 {
                dq.info(
                    table,
                    record.row_number,
                    Some(product_id),
                    "quantity",
                    format!("BOM 用量非正 ({}),跳过", quantity),
                );
                continue;
            }

            if let Some(previous) = recipe.insert(component, quantity as u64) {
                dq.warning(
                    table,
                    record.row_number,
                    Some(product_id),
                    "component",
                    format!(
                        "组件 {} 在同一 BOM 中重复 (原用量 {}),以后出现的行为准",
                        component, previous
                    ),
                );
            }
        }

        tracing::debug!(table, composites = recipes.len(), "BOM 展开完成");
        BomMapping { recipes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bom(product: Option<&str>, component: Option<&str>, quantity: NumericCell) -> BomRecord {
        BomRecord {
            row_number: 2,
            product_id: product.map(str::to_string),
            component: component.map(str::to_string),
            quantity,
        }
    }

    #[test]
    fn test_expand_groups_by_composite() {
        let records = vec![
            bom(Some("P"), Some("Y"), NumericCell::Value(2.0)),
            bom(Some("Q"), Some("Y"), NumericCell::Value(1.0)),
            bom(Some("P"), Some("Z"), NumericCell::Value(1.9)),
        ];
        let mut dq = DqReport::new();

        let mapping = BomExpander::new().expand(&records, "BOM", &mut dq);

        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.components("P").to_string(), "Y:2; Z:1");
        assert_eq!(mapping.components("Q").to_string(), "Y:1");
        assert!(dq.is_empty());
    }

    #[test]
    fn test_invalid_rows_skipped() {
        let records = vec![
            bom(Some("P"), None, NumericCell::Value(2.0)),
            bom(None, Some("Y"), NumericCell::Value(2.0)),
            bom(Some("P"), Some("Y"), NumericCell::Absent),
            bom(Some("P"), Some("Z"), NumericCell::Value(0.5)),
            bom(Some("P"), Some("W"), NumericCell::Value(-1.0)),
            bom(Some("R"), Some("W"), NumericCell::Malformed("two".to_string())),
        ];
        let mut dq = DqReport::new();

        let mapping = BomExpander::new().expand(&records, "BOM", &mut dq);

        // P 只有非正用量行 → 空配方; R 只有无法解析的行 → 空配方
        assert_eq!(mapping.lookup("P"), BomLookup::Empty);
        assert_eq!(mapping.lookup("R"), BomLookup::Empty);
        assert_eq!(mapping.lookup("X"), BomLookup::Missing);
        assert_eq!(dq.summary().info, 6);
    }

    #[test]
    fn test_duplicate_component_last_wins() {
        let records = vec![
            bom(Some("P"), Some("Y"), NumericCell::Value(2.0)),
            bom(Some("P"), Some("Y"), NumericCell::Value(3.0)),
        ];
        let mut dq = DqReport::new();

        let mapping = BomExpander::new().expand(&records, "BOM", &mut dq);

        assert_eq!(mapping.components("P").get("Y"), Some(3));
        assert_eq!(dq.summary().warning, 1);
    }

    #[test]
    fn test_missing_composite_maps_to_empty_set() {
        let mapping = BomMapping::default();
        assert!(mapping.components("nope").is_empty());
    }
}
