use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::{CatalogError, Result};

pub const RATING_MIN: f64 = 0.0;
pub const RATING_MAX: f64 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TourismLink {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// 目录实体（POI）
///
/// - `id` 一经分配不可变，全集合唯一
/// - `category` 入库时统一转小写；city / country 保留原始大小写用于展示
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub city: String,
    pub country: String,
    pub coordinates: Coordinates,
    pub category: String,
    pub rating: Option<f64>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub tourism_links: Vec<TourismLink>,
    pub address: Option<String>,
    pub opening_hours: Option<String>,
    pub price_range: Option<String>,
}

/// 创建请求：除 `id` 外的全部字段
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewLocation {
    pub name: String,
    pub description: String,
    pub city: String,
    pub country: String,
    pub coordinates: Coordinates,
    pub category: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tourism_links: Vec<TourismLink>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<String>,
    #[serde(default)]
    pub price_range: Option<String>,
}

impl NewLocation {
    pub fn validate(&self) -> Result<()> {
        if let Some(rating) = self.rating {
            check_rating(rating)?;
        }
        Ok(())
    }

    /// 绑定 id 生成实体（category 在这里统一小写）
    pub fn into_location(self, id: u64) -> Location {
        Location {
            id,
            name: self.name,
            description: self.description,
            city: self.city,
            country: self.country,
            coordinates: self.coordinates,
            category: self.category.to_lowercase(),
            rating: self.rating,
            image_url: self.image_url,
            tourism_links: self.tourism_links,
            address: self.address,
            opening_hours: self.opening_hours,
            price_range: self.price_range,
        }
    }
}

pub fn check_rating(rating: f64) -> Result<()> {
    if (RATING_MIN..=RATING_MAX).contains(&rating) {
        Ok(())
    } else {
        Err(CatalogError::InvalidLocation(format!(
            "rating {} outside [{}, {}]",
            rating, RATING_MIN, RATING_MAX
        )))
    }
}

/// facet 索引 key：NFC 规范化后小写（组合/分解两种写法落到同一 posting）
pub fn facet_key(value: &str) -> String {
    value.nfc().collect::<String>().to_lowercase()
}
