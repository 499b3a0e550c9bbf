pub mod csv_source;

pub use csv_source::{parse_tourism_links, CsvSource};
