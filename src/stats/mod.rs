use std::fmt;

use serde::Serialize;

/// 目录统计（某一时刻的快照）
#[derive(Clone, Debug, Default, Serialize)]
pub struct CatalogStats {
    /// 记录总数
    pub location_count: usize,
    /// 各 facet 不同 key 数量（按索引 key 计，大小写无关）
    pub city_count: usize,
    pub country_count: usize,
    pub category_count: usize,
    /// 下一个待分配 id
    pub next_id: u64,
    /// 结果缓存
    pub cache_entries: usize,
    pub cache_capacity: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl CatalogStats {
    pub fn cache_hit_ratio(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

impl fmt::Display for CatalogStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "╔══════════════════════════════════════════════════╗")?;
        writeln!(f, "║           Roamy Catalog Report                   ║")?;
        writeln!(f, "╠══════════════════════════════════════════════════╣")?;
        writeln!(
            f,
            "║ locations:      {:>10}                       ║",
            self.location_count
        )?;
        writeln!(
            f,
            "║ next id:        {:>10}                       ║",
            self.next_id
        )?;
        writeln!(f, "╠──────────────────────────────────────────────────╣")?;
        writeln!(f, "║ Facet Index:                                     ║")?;
        writeln!(
            f,
            "║   countries:    {:>10}                       ║",
            self.country_count
        )?;
        writeln!(
            f,
            "║   cities:       {:>10}                       ║",
            self.city_count
        )?;
        writeln!(
            f,
            "║   categories:   {:>10}                       ║",
            self.category_count
        )?;
        writeln!(f, "╠──────────────────────────────────────────────────╣")?;
        writeln!(f, "║ Query Cache:                                     ║")?;
        writeln!(
            f,
            "║   entries:      {:>10} / {:<10}          ║",
            self.cache_entries, self.cache_capacity
        )?;
        writeln!(
            f,
            "║   hit ratio:    {:>10.2}                       ║",
            self.cache_hit_ratio()
        )?;
        writeln!(f, "╚══════════════════════════════════════════════════╝")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_ratio_handles_zero_lookups() {
        let s = CatalogStats::default();
        assert_eq!(s.cache_hit_ratio(), 0.0);

        let s = CatalogStats {
            cache_hits: 3,
            cache_misses: 1,
            ..Default::default()
        };
        assert!((s.cache_hit_ratio() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn report_mentions_counts() {
        let s = CatalogStats {
            location_count: 500,
            ..Default::default()
        };
        let text = s.to_string();
        assert!(text.contains("500"));
        assert!(text.contains("Query Cache"));
    }
}
