// ==========================================
// 组件库存公平分配系统 - 产品领域模型
// ==========================================
// 职责: 需求行（产品）/ 组件配方 / 透传字段
// 红线: Allocated 单调不减且不超过 Target
// ==========================================

use crate::domain::table::{CellValue, NumericCell};
use crate::domain::types::ProductType;
use serde::{Serialize, Serializer};
use std::fmt;

// ==========================================
// ComponentSet - 组件数量映射
// ==========================================
// 有序映射: 组件键 → 数量,迭代顺序 = 首次插入顺序
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentSet {
    entries: Vec<(String, u64)>,
}

impl ComponentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 单组件配方（Non-BOM 产品: {自身: 1}）
    pub fn single(key: &str) -> Self {
        let mut set = Self::new();
        set.insert(key, 1);
        set
    }

    /// 设置数量（已存在则覆盖,位置不变）
    ///
    /// # 返回
    /// 被覆盖的旧值
    pub fn insert(&mut self, key: &str, quantity: u64) -> Option<u64> {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, q)) => Some(std::mem::replace(q, quantity)),
            None => {
                self.entries.push((key.to_string(), quantity));
                None
            }
        }
    }

    /// 累加数量
    pub fn add(&mut self, key: &str, quantity: u64) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, q)) => *q = q.saturating_add(quantity),
            None => self.entries.push((key.to_string(), quantity)),
        }
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, q)| *q)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(k, q)| (k.as_str(), *q))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<K: AsRef<str>> FromIterator<(K, u64)> for ComponentSet {
    fn from_iter<I: IntoIterator<Item = (K, u64)>>(iter: I) -> Self {
        let mut set = ComponentSet::new();
        for (key, quantity) in iter {
            set.insert(key.as_ref(), quantity);
        }
        set
    }
}

/// 渲染为 `key:qty; key:qty`
impl fmt::Display for ComponentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, quantity)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}:{}", key, quantity)?;
        }
        Ok(())
    }
}

impl Serialize for ComponentSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

// ==========================================
// Extras - 透传字段
// ==========================================
// 原始行的全部列,按表头顺序; 引擎不解释其内容
pub type Extras = Vec<(String, CellValue)>;

// ==========================================
// DemandRecord - 需求表映射记录
// ==========================================
// 字段映射后的中间结构（尚未计算预测/配方）
#[derive(Debug, Clone, PartialEq)]
pub struct DemandRecord {
    pub row_number: usize,
    pub is_bom: Option<bool>,            // None: 标志无法识别
    pub product_id: Option<String>,      // 已规范化
    pub description: Option<String>,     // 展示名（描述键模式下已规范化）
    pub stock_on_hand: u64,              // 已强制转换
    pub forecasts: Vec<Option<f64>>,     // 与配置的预测列同序
    pub extras: Extras,
}

impl DemandRecord {
    /// 复合标志明确为真
    pub fn is_composite(&self) -> bool {
        self.is_bom == Some(true)
    }

    /// 复合标志明确为假（唯一计入库存的行）
    pub fn is_stock_row(&self) -> bool {
        self.is_bom == Some(false)
    }

    /// 产品类型（无法识别的标志按非 BOM）
    pub fn product_type(&self) -> ProductType {
        ProductType::from_flag(self.is_composite())
    }
}

// ==========================================
// BomRecord - BOM 表映射记录
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct BomRecord {
    pub row_number: usize,
    pub product_id: Option<String>,
    pub component: Option<String>,
    pub quantity: NumericCell,
}

// ==========================================
// Product - 需求产品
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub row_number: usize,
    pub product_id: Option<String>,
    pub product: Option<String>,          // 显示名称
    pub product_type: ProductType,
    pub forecast: i64,                    // 预测中位数（有符号）
    pub target: u64,                      // |forecast|
    pub components: ComponentSet,         // 单位产品的组件需求
    pub allocated: u64,
    pub components_used: ComponentSet,    // 累计消耗
    #[serde(skip)]
    pub extras: Extras,
}

impl Product {
    /// 是否还有未满足的需求
    pub fn has_remaining_target(&self) -> bool {
        self.allocated < self.target
    }

    /// 配方为空的产品永远不可分配
    pub fn is_allocatable(&self) -> bool {
        !self.components.is_empty()
    }

    /// 展示用标签（编码优先,其次名称）
    pub fn label(&self) -> &str {
        self.product_id
            .as_deref()
            .or(self.product.as_deref())
            .unwrap_or("<unknown>")
    }
}
