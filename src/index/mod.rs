pub mod catalog;
pub mod facet;
pub mod query_cache;

pub use catalog::{Catalog, Filter, Page, DEFAULT_CACHE_CAPACITY};
pub use facet::{intersect, DocId, FacetIndex};
pub use query_cache::{QueryCache, QueryKey};
