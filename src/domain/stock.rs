// ==========================================
// 组件库存公平分配系统 - 库存池领域模型
// ==========================================
// 红线: 组件键唯一; 数量非负
// 用途: 初始快照 + 工作池（分配过程中被消耗）
// ==========================================

use serde::{Serialize, Serializer};
use std::collections::HashMap;

// ==========================================
// StockPool - 库存池
// ==========================================
// 保持插入顺序,保证报表输出可复现
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockPool {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl StockPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// 可用数量（未跟踪的组件视为 0）
    pub fn available(&self, key: &str) -> u64 {
        self.index
            .get(key)
            .map(|&i| self.entries[i].1)
            .unwrap_or(0)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// 累加数量（重复键求和）
    pub fn add(&mut self, key: &str, quantity: u64) {
        match self.index.get(key) {
            Some(&i) => {
                let entry = &mut self.entries[i].1;
                *entry = entry.saturating_add(quantity);
            }
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), quantity));
            }
        }
    }

    /// 仅当键不存在时插入
    ///
    /// # 返回
    /// - `true`: 新增
    /// - `false`: 已存在,原值保持不变
    pub fn insert_if_absent(&mut self, key: &str, quantity: u64) -> bool {
        if self.contains(key) {
            return false;
        }
        self.add(key, quantity);
        true
    }

    /// 扣减数量
    ///
    /// # 返回
    /// - `Some(remaining)`: 扣减成功
    /// - `None`: 未跟踪或数量不足（池不变）
    pub fn consume(&mut self, key: &str, quantity: u64) -> Option<u64> {
        let &i = self.index.get(key)?;
        let remaining = self.entries[i].1.checked_sub(quantity)?;
        self.entries[i].1 = remaining;
        Some(remaining)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(k, q)| (k.as_str(), *q))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |acc, (_, q)| acc.saturating_add(*q))
    }
}

impl<K: AsRef<str>> FromIterator<(K, u64)> for StockPool {
    fn from_iter<I: IntoIterator<Item = (K, u64)>>(iter: I) -> Self {
        let mut pool = StockPool::new();
        for (key, quantity) in iter {
            pool.add(key.as_ref(), quantity);
        }
        pool
    }
}

impl Serialize for StockPool {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}
