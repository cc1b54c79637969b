use std::collections::BTreeMap;

use crate::models::item::{Item, Purity};

/// 按纯度分组、按溢价升序排列的采集结果
#[derive(Debug, Clone, Default)]
pub struct RankedResultSet {
    by_purity: BTreeMap<Purity, Vec<Item>>,
    pages_visited: usize,
}

impl RankedResultSet {
    pub fn new() -> Self {
        let mut by_purity = BTreeMap::new();
        for purity in Purity::ALL {
            by_purity.insert(purity, Vec::new());
        }
        Self {
            by_purity,
            pages_visited: 0,
        }
    }

    /// 合并一页的结果（不去重，保持采集顺序）
    pub fn merge_page(&mut self, items: Vec<Item>) {
        self.pages_visited += 1;
        for item in items {
            self.by_purity.entry(item.purity).or_default().push(item);
        }
    }

    /// 每个纯度分组内按溢价升序排序（稳定排序）
    pub fn rank(&mut self) {
        for items in self.by_purity.values_mut() {
            items.sort_by(|a, b| {
                a.effective_premium_percent
                    .total_cmp(&b.effective_premium_percent)
            });
        }
    }

    pub fn items(&self, purity: Purity) -> &[Item] {
        self.by_purity
            .get(&purity)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 前 `n` 个溢价最低的商品
    pub fn top(&self, purity: Purity, n: usize) -> &[Item] {
        let items = self.items(purity);
        &items[..n.min(items.len())]
    }

    pub fn total_items(&self) -> usize {
        self.by_purity.values().map(Vec::len).sum()
    }

    pub fn pages_visited(&self) -> usize {
        self.pages_visited
    }
}
