// ==========================================
// 组件库存公平分配系统 - 产品构建
// ==========================================
// 输入: 主表需求记录 + BOM 映射
// 输出: 产品列表（顺序 = 主表行顺序）
// ==========================================

use crate::domain::product::{ComponentSet, DemandRecord, Product};
use crate::domain::quality::DqReport;
use crate::engine::bom::{BomLookup, BomMapping};
use crate::engine::forecast::DemandForecaster;
use crate::engine::inventory::InventoryViewBuilder;

pub struct ProductBuilder<'a> {
    bom: &'a BomMapping,
    keys: &'a InventoryViewBuilder,
    forecaster: DemandForecaster,
}

impl<'a> ProductBuilder<'a> {
    pub fn new(bom: &'a BomMapping, keys: &'a InventoryViewBuilder) -> Self {
        Self {
            bom,
            keys,
            forecaster: DemandForecaster,
        }
    }

    pub fn build(&self, records: Vec<DemandRecord>, table: &str, dq: &mut DqReport) -> Vec<Product> {
        records
            .into_iter()
            .map(|record| self.build_one(record, table, dq))
            .collect()
    }

    fn build_one(&self, record: DemandRecord, table: &str, dq: &mut DqReport) -> Product {
        let forecast = self.forecaster.median(&record.forecasts);
        let components = if record.is_composite() {
            self.resolve_recipe(&record, table, dq)
        } else {
            match self.keys.key_of(&record) {
                Some(key) => ComponentSet::single(key),
                None => {
                    dq.warning(
                        table,
                        record.row_number,
                        record.description.as_deref(),
                        "components",
                        "非 BOM 产品缺少库存键,不可分配",
                    );
                    ComponentSet::new()
                }
            }
        };

        Product {
            row_number: record.row_number,
            product_type: record.product_type(),
            product_id: record.product_id,
            product: record.description,
            forecast,
            target: self.forecaster.target(forecast),
            components,
            allocated: 0,
            components_used: ComponentSet::new(),
            extras: record.extras,
        }
    }

    fn resolve_recipe(&self, record: &DemandRecord, table: &str, dq: &mut DqReport) -> ComponentSet {
        let key = record.product_id.as_deref();
        let lookup = key
            .map(|id| self.bom.lookup(id))
            .unwrap_or(BomLookup::Missing);

        match lookup {
            BomLookup::Found(set) => set.clone(),
            BomLookup::Empty => {
                dq.warning(
                    table,
                    record.row_number,
                    key,
                    "components",
                    "BOM 中无有效组件行,产品不可分配",
                );
                ComponentSet::new()
            }
            BomLookup::Missing => {
                dq.warning(
                    table,
                    record.row_number,
                    key.or(record.description.as_deref()),
                    "components",
                    "BOM 表中没有该复合产品,产品不可分配",
                );
                ComponentSet::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::BomRecord;
    use crate::domain::table::NumericCell;
    use crate::domain::types::{ProductType, StockKeyMode};
    use crate::engine::bom::BomExpander;

    fn record(is_bom: bool, id: &str, forecasts: Vec<Option<f64>>) -> DemandRecord {
        DemandRecord {
            row_number: 2,
            is_bom: Some(is_bom),
            product_id: Some(id.to_string()),
            description: Some(format!("{} desc", id)),
            stock_on_hand: 0,
            forecasts,
            extras: Vec::new(),
        }
    }

    fn mapping() -> BomMapping {
        let mut dq = DqReport::new();
        BomExpander::new().expand(
            &[BomRecord {
                row_number: 2,
                product_id: Some("KIT".to_string()),
                component: Some("Y".to_string()),
                quantity: NumericCell::Value(2.0),
            }],
            "BOM",
            &mut dq,
        )
    }

    #[test]
    fn test_non_bom_uses_self_key() {
        let bom = mapping();
        let keys = InventoryViewBuilder::new(StockKeyMode::ProductId);
        let mut dq = DqReport::new();

        let products = ProductBuilder::new(&bom, &keys).build(
            vec![record(false, "X", vec![Some(-3.0)])],
            "demand",
            &mut dq,
        );

        let p = &products[0];
        assert_eq!(p.product_type, ProductType::NonBom);
        assert_eq!(p.components.to_string(), "X:1");
        assert_eq!(p.forecast, -3);
        assert_eq!(p.target, 3);
        assert_eq!(p.product.as_deref(), Some("X desc"));
    }

    #[test]
    fn test_unknown_flag_builds_non_bom_product() {
        let bom = mapping();
        let keys = InventoryViewBuilder::new(StockKeyMode::ProductId);
        let mut dq = DqReport::new();
        let mut unknown = record(false, "U", vec![Some(4.0)]);
        unknown.is_bom = None;

        let products = ProductBuilder::new(&bom, &keys).build(vec![unknown], "demand", &mut dq);

        assert_eq!(products[0].product_type, ProductType::NonBom);
        assert_eq!(products[0].components.to_string(), "U:1");
    }

    #[test]
    fn test_description_mode_self_key() {
        let bom = mapping();
        let keys = InventoryViewBuilder::new(StockKeyMode::Description);
        let mut dq = DqReport::new();

        let products =
            ProductBuilder::new(&bom, &keys).build(vec![record(false, "X", vec![])], "demand", &mut dq);

        assert_eq!(products[0].components.to_string(), "X desc:1");
    }

    #[test]
    fn test_bom_product_resolves_recipe() {
        let bom = mapping();
        let keys = InventoryViewBuilder::new(StockKeyMode::ProductId);
        let mut dq = DqReport::new();

        let products = ProductBuilder::new(&bom, &keys).build(
            vec![record(true, "KIT", vec![]), record(true, "GHOST", vec![])],
            "demand",
            &mut dq,
        );

        assert_eq!(products[0].components.to_string(), "Y:2");
        assert!(products[1].components.is_empty());
        let warnings: Vec<_> = dq.by_field("components").collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].key.as_deref(), Some("GHOST"));
    }
}
