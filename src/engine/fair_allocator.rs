// ==========================================
// 组件库存公平分配系统 - 公平轮转分配引擎
// ==========================================
// 红线: 单次授予为原子操作（全部组件扣减或全部不扣减）
// 红线: Allocated 不超过 Target; 库存永不为负
// ==========================================
// 职责: 按输入顺序逐轮为每个产品授予 1 个单位,直到一整轮无进展
// 输入: 产品列表（会被修改）+ 合并库存池（按值转移）
// 输出: 剩余库存池 + 轮次数
// ==========================================

use crate::domain::product::Product;
use crate::domain::stock::StockPool;
use tracing::instrument;

/// 分配结果
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationOutcome {
    pub remaining: StockPool,
    /// 轮次数（含最后一轮无进展的轮次）
    pub passes: u64,
    /// 授予的单位总数
    pub grants: u64,
}

pub struct FairAllocator {
    // 无状态引擎
}

impl Default for FairAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl FairAllocator {
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 轮转分配
    ///
    /// 规则:
    /// 1) 每轮按输入顺序遍历产品
    /// 2) 仍有未满足需求、配方非空且库存足够的产品获得 1 个单位
    /// 3) 一整轮无任何授予时结束
    ///
    /// # 参数
    /// - `products`: 产品列表（Allocated / ComponentsUsed 会被更新）
    /// - `stock`: 合并后的库存池
    ///
    /// # 返回
    /// 剩余库存 + 轮次统计
    #[instrument(skip(self, products, stock), fields(
        products = products.len(),
        components = stock.len(),
        total_stock = stock.total()
    ))]
    pub fn allocate(&self, products: &mut [Product], stock: StockPool) -> AllocationOutcome {
        let mut pool = stock;
        let mut passes = 0u64;
        let mut grants = 0u64;

        loop {
            passes += 1;
            let mut granted_this_pass = 0u64;

            for product in products.iter_mut() {
                if product.has_remaining_target() && self.can_grant_one(product, &pool) {
                    self.grant_one(product, &mut pool);
                    granted_this_pass += 1;
                }
            }

            tracing::debug!(pass = passes, granted = granted_this_pass, "分配轮次完成");
            if granted_this_pass == 0 {
                break;
            }
            grants += granted_this_pass;
        }

        tracing::info!(passes, grants, remaining = pool.total(), "公平分配完成");
        AllocationOutcome {
            remaining: pool,
            passes,
            grants,
        }
    }

    /// 当前库存能否支撑再生产 1 个单位
    ///
    /// 空配方永远返回 false
    pub fn can_grant_one(&self, product: &Product, pool: &StockPool) -> bool {
        product.is_allocatable()
            && product
                .components
                .iter()
                .all(|(key, quantity)| pool.available(key) >= quantity)
    }

    /// 授予 1 个单位（调用前须已通过 can_grant_one）
    fn grant_one(&self, product: &mut Product, pool: &mut StockPool) {
        for (key, quantity) in product.components.iter() {
            let consumed = pool.consume(key, quantity);
            debug_assert!(consumed.is_some(), "库存校验后扣减失败: {}", key);
            product.components_used.add(key, quantity);
        }
        product.allocated += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::ComponentSet;
    use crate::domain::types::ProductType;

    fn product(id: &str, target: u64, components: &[(&str, u64)]) -> Product {
        Product {
            row_number: 2,
            product_id: Some(id.to_string()),
            product: Some(id.to_string()),
            product_type: if components.len() == 1 && components[0].0 == id {
                ProductType::NonBom
            } else {
                ProductType::Bom
            },
            forecast: target as i64,
            target,
            components: components.iter().copied().collect(),
            allocated: 0,
            components_used: ComponentSet::new(),
            extras: Vec::new(),
        }
    }

    fn pool(entries: &[(&str, u64)]) -> StockPool {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_shared_component_split_fairly() {
        let mut products = vec![
            product("A", 3, &[("X", 1)]),
            product("B", 2, &[("X", 1)]),
        ];

        let outcome = FairAllocator::new().allocate(&mut products, pool(&[("X", 4)]));

        assert_eq!(products[0].allocated, 2);
        assert_eq!(products[1].allocated, 2);
        assert_eq!(outcome.remaining.available("X"), 0);
        assert_eq!(outcome.grants, 4);
    }

    #[test]
    fn test_bom_product_limited_by_scarcest_component() {
        let mut products = vec![product("P", 3, &[("Y", 2), ("Z", 1)])];

        let outcome =
            FairAllocator::new().allocate(&mut products, pool(&[("Y", 5), ("Z", 10)]));

        assert_eq!(products[0].allocated, 2);
        assert_eq!(products[0].components_used.to_string(), "Y:4; Z:2");
        assert_eq!(outcome.remaining.available("Y"), 1);
        assert_eq!(outcome.remaining.available("Z"), 8);
    }

    #[test]
    fn test_empty_components_never_allocated() {
        let mut products = vec![product("E", 5, &[])];

        let outcome = FairAllocator::new().allocate(&mut products, pool(&[("X", 10)]));

        assert_eq!(products[0].allocated, 0);
        assert!(products[0].components_used.is_empty());
        assert_eq!(outcome.remaining.available("X"), 10);
        assert_eq!(outcome.passes, 1);
    }

    #[test]
    fn test_untracked_component_blocks_grant() {
        let mut products = vec![product("P", 2, &[("X", 1), ("GHOST", 1)])];

        let outcome = FairAllocator::new().allocate(&mut products, pool(&[("X", 10)]));

        assert_eq!(products[0].allocated, 0);
        assert_eq!(outcome.remaining.available("X"), 10);
        assert!(!outcome.remaining.contains("GHOST"));
    }

    #[test]
    fn test_round_robin_prefers_input_order_on_last_unit() {
        // 3 个产品竞争 5 个单位: 第二轮只剩 2 个,前两个产品得到
        let mut products = vec![
            product("A", 10, &[("X", 1)]),
            product("B", 10, &[("X", 1)]),
            product("C", 10, &[("X", 1)]),
        ];

        FairAllocator::new().allocate(&mut products, pool(&[("X", 5)]));

        let allocated: Vec<u64> = products.iter().map(|p| p.allocated).collect();
        assert_eq!(allocated, vec![2, 2, 1]);
    }

    #[test]
    fn test_big_consumer_does_not_starve_others() {
        // P 单位用量大,但每轮只拿 1 个单位
        let mut products = vec![
            product("P", 10, &[("X", 3)]),
            product("Q", 10, &[("X", 1)]),
        ];

        FairAllocator::new().allocate(&mut products, pool(&[("X", 8)]));

        // 轮1: P(5 剩) Q(4 剩); 轮2: P(1 剩) Q(0 剩); 轮3: 无进展
        assert_eq!(products[0].allocated, 2);
        assert_eq!(products[1].allocated, 2);
    }

    #[test]
    fn test_passes_bounded_by_total_target() {
        let mut products = vec![
            product("A", 3, &[("X", 1)]),
            product("B", 1, &[("Y", 1)]),
            product("Z", 0, &[("X", 1)]),
        ];

        let outcome =
            FairAllocator::new().allocate(&mut products, pool(&[("X", 100), ("Y", 100)]));

        let total_target: u64 = products.iter().map(|p| p.target).sum();
        assert!(outcome.passes <= total_target + 1);
        assert_eq!(products[0].allocated, 3);
        assert_eq!(products[1].allocated, 1);
        assert_eq!(products[2].allocated, 0);
        assert_eq!(outcome.passes, 4);
    }

    #[test]
    fn test_no_products_terminates_immediately() {
        let outcome = FairAllocator::new().allocate(&mut [], pool(&[("X", 1)]));
        assert_eq!(outcome.passes, 1);
        assert_eq!(outcome.grants, 0);
    }
}
