use serde::Deserialize;

use crate::index::{Filter, Page};
use crate::query::error::ApiError;

/// `GET /api/locations` 查询参数
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LocationParams {
    pub city: Option<String>,
    pub category: Option<String>,
    pub country: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl LocationParams {
    /// limit 必须 >= 1（offset 为无符号，解析阶段已保证 >= 0）
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.limit == Some(0) {
            return Err(ApiError::Unprocessable(
                "limit: ensure this value is greater than or equal to 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn filter(&self) -> Filter {
        Filter {
            city: self.city.clone(),
            category: self.category.clone(),
            country: self.country.clone(),
        }
    }

    pub fn page(&self) -> Page {
        Page::new(self.limit, self.offset)
    }
}

/// `GET /api/locations/count` 查询参数（不含分页）
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CountParams {
    pub city: Option<String>,
    pub category: Option<String>,
    pub country: Option<String>,
}

impl CountParams {
    pub fn filter(&self) -> Filter {
        Filter {
            city: self.city.clone(),
            category: self.category.clone(),
            country: self.country.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CityParams {
    pub country: Option<String>,
}
