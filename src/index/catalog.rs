use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use roaring::RoaringBitmap;

use crate::core::{facet_key, Location, NewLocation};
use crate::error::{CatalogError, Result};
use crate::index::facet::{intersect, DocId, FacetIndex};
use crate::index::query_cache::{QueryCache, QueryKey};
use crate::stats::CatalogStats;
use crate::storage::CsvSource;

pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// facet 过滤条件；空串等同于缺省
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filter {
    pub city: Option<String>,
    pub category: Option<String>,
    pub country: Option<String>,
}

impl Filter {
    pub fn city(mut self, v: &str) -> Self {
        self.city = Some(v.to_string());
        self
    }

    pub fn category(mut self, v: &str) -> Self {
        self.category = Some(v.to_string());
        self
    }

    pub fn country(mut self, v: &str) -> Self {
        self.country = Some(v.to_string());
        self
    }

    fn city_value(&self) -> Option<&str> {
        non_empty(&self.city)
    }

    fn category_value(&self) -> Option<&str> {
        non_empty(&self.category)
    }

    fn country_value(&self) -> Option<&str> {
        non_empty(&self.country)
    }

    pub fn is_empty(&self) -> bool {
        self.city_value().is_none()
            && self.category_value().is_none()
            && self.country_value().is_none()
    }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

/// offset 先于 limit；0 与缺省都是 no-op
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Page {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl Page {
    pub fn new(limit: Option<usize>, offset: Option<usize>) -> Self {
        Self {
            limit: limit.filter(|&n| n > 0),
            offset: offset.filter(|&n| n > 0),
        }
    }

    fn apply<I: Iterator>(self, iter: I) -> impl Iterator<Item = I::Item> {
        iter.skip(self.offset.unwrap_or(0))
            .take(self.limit.unwrap_or(usize::MAX))
    }
}

fn id_space_exhausted() -> CatalogError {
    CatalogError::InvalidLocation("id space exhausted".to_string())
}

/// 记录 + 主键 + 三个 facet 倒排，作为一个整体在同一把锁下变更
#[derive(Default)]
struct CatalogState {
    records: Vec<Location>,
    by_id: HashMap<u64, DocId>,
    by_city: FacetIndex,
    by_category: FacetIndex,
    by_country: FacetIndex,
    next_id: u64,
}

impl CatalogState {
    fn from_records(records: Vec<Location>) -> Result<Self> {
        let mut st = Self::default();
        for loc in records {
            st.push(loc)?;
        }
        let max_id = st.records.iter().map(|l| l.id).max().unwrap_or(0);
        st.next_id = max_id
            .max(st.records.len() as u64)
            .checked_add(1)
            .ok_or_else(id_space_exhausted)?;
        Ok(st)
    }

    fn push(&mut self, loc: Location) -> Result<()> {
        if self.by_id.contains_key(&loc.id) {
            return Err(CatalogError::DuplicateId(loc.id));
        }
        let doc: DocId = self
            .records
            .len()
            .try_into()
            .map_err(|_| CatalogError::InvalidLocation("catalog is full".to_string()))?;

        self.by_city.insert(&loc.city, doc);
        self.by_category.insert(&loc.category, doc);
        self.by_country.insert(&loc.country, doc);
        self.by_id.insert(loc.id, doc);
        self.records.push(loc);
        Ok(())
    }

    /// None：无过滤（全集）；Some：求交后的 DocId 集合
    fn matching_docs(&self, filter: &Filter) -> Option<RoaringBitmap> {
        let empty = RoaringBitmap::new();
        let mut postings: Vec<&RoaringBitmap> = Vec::with_capacity(3);
        if let Some(city) = filter.city_value() {
            postings.push(self.by_city.get(city).unwrap_or(&empty));
        }
        if let Some(country) = filter.country_value() {
            postings.push(self.by_country.get(country).unwrap_or(&empty));
        }
        if let Some(category) = filter.category_value() {
            postings.push(self.by_category.get(category).unwrap_or(&empty));
        }
        intersect(postings)
    }

    fn get(&self, id: u64) -> Option<&Location> {
        self.by_id
            .get(&id)
            .and_then(|&doc| self.records.get(doc as usize))
    }
}

/// 目录索引：加载一次，之后服务只读查询与追加插入
///
/// 并发：state 读写锁 + cache 互斥锁，加锁顺序固定为 state → cache。
/// 查询在整个 “查缓存 → 计算 → 回填” 过程中持有 state 读锁，
/// 因此插入（写锁 + 清缓存）不会与回填交错出过期条目。
pub struct Catalog {
    state: RwLock<CatalogState>,
    cache: Mutex<QueryCache>,
}

impl Catalog {
    pub fn empty(cache_capacity: usize) -> Self {
        Self {
            state: RwLock::new(CatalogState {
                next_id: 1,
                ..Default::default()
            }),
            cache: Mutex::new(QueryCache::with_capacity(cache_capacity)),
        }
    }

    /// 从已解析的记录构建（id 重复时报错）
    pub fn from_records(records: Vec<Location>, cache_capacity: usize) -> Result<Self> {
        let state = CatalogState::from_records(records)?;
        Ok(Self {
            state: RwLock::new(state),
            cache: Mutex::new(QueryCache::with_capacity(cache_capacity)),
        })
    }

    /// 启动加载：
    /// - 数据源不存在：warn，空目录启动
    /// - 任一行失败 / id 重复：error，整体回退为空目录（不做逐行跳过）
    pub fn load(path: &Path, cache_capacity: usize) -> Self {
        if !path.exists() {
            tracing::warn!("Location source not found at {:?}, starting empty", path);
            return Self::empty(cache_capacity);
        }

        let loaded = CsvSource::read_path(path)
            .and_then(|records| Self::from_records(records, cache_capacity));
        match loaded {
            Ok(catalog) => {
                {
                    let st = catalog.state.read();
                    tracing::info!(
                        "Loaded {} locations from {:?} ({} countries, {} cities, {} categories)",
                        st.records.len(),
                        path,
                        st.by_country.key_count(),
                        st.by_city.key_count(),
                        st.by_category.key_count()
                    );
                }
                catalog
            }
            Err(e) => {
                tracing::error!("Failed to load locations from {:?}: {}", path, e);
                Self::empty(cache_capacity)
            }
        }
    }

    fn cache_key(filter: &Filter, page: Page) -> QueryKey {
        let key = |v: Option<&str>| v.map(facet_key).unwrap_or_default();
        QueryKey {
            country: key(filter.country_value()),
            city: key(filter.city_value()),
            category: key(filter.category_value()),
            limit: page.limit,
            offset: page.offset,
        }
    }

    /// 过滤 + 分页查询，结果保持插入顺序
    ///
    /// 仅带过滤条件的查询会进缓存；key 含分页参数，不同页互不复用。
    pub fn query(&self, filter: &Filter, page: Page) -> Arc<Vec<Location>> {
        let page = Page::new(page.limit, page.offset);
        let st = self.state.read();

        if filter.is_empty() {
            return Arc::new(page.apply(st.records.iter()).cloned().collect());
        }

        let key = Self::cache_key(filter, page);
        if let Some(hit) = self.cache.lock().get(&key) {
            tracing::debug!("Query cache hit: {:?} ({} results)", key, hit.len());
            return hit;
        }

        let docs = st.matching_docs(filter).unwrap_or_default();
        let result: Arc<Vec<Location>> = Arc::new(
            page.apply(docs.iter())
                .filter_map(|doc| st.records.get(doc as usize))
                .cloned()
                .collect(),
        );

        self.cache.lock().insert(key, result.clone());
        result
    }

    /// 过滤后的总数（忽略分页，不走缓存）
    pub fn count(&self, filter: &Filter) -> usize {
        let st = self.state.read();
        match st.matching_docs(filter) {
            Some(docs) => docs.len() as usize,
            None => st.records.len(),
        }
    }

    pub fn get(&self, id: u64) -> Option<Location> {
        self.state.read().get(id).cloned()
    }

    /// 追加新记录：分配 next_id，同步更新全部索引，并清空结果缓存
    pub fn insert(&self, new: NewLocation) -> Result<Location> {
        new.validate()?;

        let mut st = self.state.write();
        let id = st.next_id;
        // 先确认下一个 id 可用，再落库；否则 next_id 回绕会与已有 id 冲突
        let next = id.checked_add(1).ok_or_else(id_space_exhausted)?;
        let loc = new.into_location(id);
        st.push(loc.clone())?;
        st.next_id = next;

        self.cache.lock().clear();
        tracing::debug!("Inserted location {} ({:?}, {:?})", id, loc.city, loc.country);
        Ok(loc)
    }

    /// 去重排序的城市列表（原始大小写）；country 大小写不敏感
    pub fn cities(&self, country: Option<&str>) -> Vec<String> {
        let st = self.state.read();
        let cities: BTreeSet<String> = match country.filter(|c| !c.is_empty()) {
            Some(c) => st
                .by_country
                .get(c)
                .map(|docs| {
                    docs.iter()
                        .filter_map(|doc| st.records.get(doc as usize))
                        .map(|l| l.city.clone())
                        .collect()
                })
                .unwrap_or_default(),
            None => st.records.iter().map(|l| l.city.clone()).collect(),
        };
        cities.into_iter().collect()
    }

    pub fn categories(&self) -> Vec<String> {
        self.distinct(|l| &l.category)
    }

    pub fn countries(&self) -> Vec<String> {
        self.distinct(|l| &l.country)
    }

    fn distinct(&self, field: impl Fn(&Location) -> &String) -> Vec<String> {
        let st = self.state.read();
        let set: BTreeSet<String> = st.records.iter().map(field).cloned().collect();
        set.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CatalogStats {
        let st = self.state.read();
        let cache = self.cache.lock();
        CatalogStats {
            location_count: st.records.len(),
            city_count: st.by_city.key_count(),
            country_count: st.by_country.key_count(),
            category_count: st.by_category.key_count(),
            next_id: st.next_id,
            cache_entries: cache.len(),
            cache_capacity: cache.capacity(),
            cache_hits: cache.hits(),
            cache_misses: cache.misses(),
        }
    }
}
