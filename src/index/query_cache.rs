use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::core::Location;

/// 缓存 key：规范化后的 (facet 过滤, 分页) 元组
///
/// - facet 取值使用索引 key（大小写/Unicode 形式无关），缺省为空串
/// - limit/offset 为 0 与缺省等价（均为 no-op），统一为 None
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub country: String,
    pub city: String,
    pub category: String,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// 有界结果缓存：FIFO 近似淘汰
///
/// 写入前若已满，整批淘汰最早写入的一半；写入后条目数不超过 capacity。
pub struct QueryCache {
    entries: HashMap<QueryKey, Arc<Vec<Location>>>,
    order: VecDeque<QueryKey>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl QueryCache {
    pub fn with_capacity(cap: usize) -> Self {
        let capacity = cap.max(1);
        Self {
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&mut self, key: &QueryKey) -> Option<Arc<Vec<Location>>> {
        match self.entries.get(key) {
            Some(v) => {
                self.hits += 1;
                Some(v.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: QueryKey, value: Arc<Vec<Location>>) {
        if self.entries.contains_key(&key) {
            self.entries.insert(key, value);
            return;
        }

        if self.entries.len() >= self.capacity {
            let evict = (self.capacity / 2).max(1);
            for old in self.order.drain(..evict.min(self.order.len())) {
                self.entries.remove(&old);
            }
            tracing::debug!(
                "Query cache full, evicted {} entries ({} remain)",
                evict,
                self.entries.len()
            );
        }

        self.order.push_back(key.clone());
        self.entries.insert(key, value);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(city: &str, offset: Option<usize>) -> QueryKey {
        QueryKey {
            city: city.to_string(),
            offset,
            ..Default::default()
        }
    }

    #[test]
    fn never_exceeds_capacity_after_write() {
        let mut cache = QueryCache::with_capacity(10);
        for i in 0..57 {
            cache.insert(key(&format!("c{}", i), None), Arc::new(Vec::new()));
            assert!(cache.len() <= cache.capacity());
        }
        assert!(!cache.is_empty());
    }

    #[test]
    fn pagination_is_part_of_the_key() {
        let mut cache = QueryCache::with_capacity(4);
        cache.insert(key("paris", None), Arc::new(Vec::new()));
        assert!(cache.get(&key("paris", None)).is_some());
        assert!(cache.get(&key("paris", Some(2))).is_none());
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn overwrite_does_not_grow_order() {
        let mut cache = QueryCache::with_capacity(2);
        for _ in 0..5 {
            cache.insert(key("paris", None), Arc::new(Vec::new()));
        }
        assert_eq!(cache.len(), 1);
        cache.insert(key("rome", None), Arc::new(Vec::new()));
        cache.insert(key("oslo", None), Arc::new(Vec::new()));
        assert!(cache.len() <= 2);
        assert!(cache.get(&key("oslo", None)).is_some());
    }

    #[test]
    fn clear_empties() {
        let mut cache = QueryCache::with_capacity(3);
        cache.insert(key("a", None), Arc::new(Vec::new()));
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get(&key("a", None)).is_none());
    }
}
