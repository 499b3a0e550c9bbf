use std::collections::HashMap;

use roaring::RoaringBitmap;

use crate::core::facet_key;

/// 文档位置：记录在 append-only `records` 中的下标
pub type DocId = u32;

/// 单个 facet 的倒排索引：facet key → DocId posting
///
/// DocId 随插入单调递增，因此 posting 的迭代顺序就是插入顺序。
#[derive(Clone, Debug, Default)]
pub struct FacetIndex {
    postings: HashMap<String, RoaringBitmap>,
}

impl FacetIndex {
    pub fn insert(&mut self, value: &str, doc: DocId) {
        self.postings
            .entry(facet_key(value))
            .or_default()
            .insert(doc);
    }

    /// 未知取值返回 None（调用方按空集处理）
    pub fn get(&self, value: &str) -> Option<&RoaringBitmap> {
        self.postings.get(&facet_key(value))
    }

    /// 不同 key 的数量
    pub fn key_count(&self) -> usize {
        self.postings.len()
    }
}

/// 多 posting 求交：从最短的开始，结果为空时提前结束
///
/// 空输入返回 None（表示“无过滤”，区别于“过滤后为空”）。
pub fn intersect(mut postings: Vec<&RoaringBitmap>) -> Option<RoaringBitmap> {
    postings.sort_by_key(|b| b.len());
    let mut iter = postings.into_iter();
    let mut acc = iter.next()?.clone();
    for b in iter {
        acc &= b;
        if acc.is_empty() {
            break;
        }
    }
    Some(acc)
}
